use crate::domain::model::{Record, SftpTarget, TsvBuffer};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Opens transfer sessions against an SFTP destination. One connect per
/// upload attempt, so an injectable implementation can count attempts.
pub trait TransferConnector: Send + Sync {
    type Session: TransferSession;

    fn connect(
        &self,
        target: &SftpTarget,
    ) -> impl std::future::Future<Output = Result<Self::Session>> + Send;
}

/// One authenticated session. Must be closed on every exit path.
pub trait TransferSession: Send {
    fn write_file(
        &mut self,
        remote_path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    fn list_dir(
        &mut self,
        remote_dir: &str,
    ) -> impl std::future::Future<Output = Result<Vec<String>>> + Send;

    fn close(&mut self) -> impl std::future::Future<Output = Result<()>> + Send;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<Record>>;
    async fn transform(&self, records: Vec<Record>) -> Result<TsvBuffer>;
    async fn load(&self, buffer: TsvBuffer) -> Result<()>;
}
