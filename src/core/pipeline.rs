use crate::core::fetch::ApiFetcher;
use crate::core::transform::{filter_to_tsv, FilterRule};
use crate::core::upload::{RetryPolicy, SftpUploader};
use crate::domain::model::{Record, SftpTarget, TsvBuffer};
use crate::domain::ports::{Pipeline, TransferConnector};
use crate::utils::error::Result;

/// 具體管道：API 取數 → 過濾成 TSV → SFTP 上傳
pub struct ApiToSftpPipeline<C: TransferConnector> {
    api_url: String,
    fetcher: ApiFetcher,
    filter: FilterRule,
    uploader: SftpUploader<C>,
    target: SftpTarget,
}

impl<C: TransferConnector> ApiToSftpPipeline<C> {
    pub fn new(
        api_url: impl Into<String>,
        target: SftpTarget,
        connector: C,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            api_url: api_url.into(),
            fetcher: ApiFetcher::new(),
            filter: FilterRule::default(),
            uploader: SftpUploader::new(connector, policy),
            target,
        }
    }

    /// 換掉預設的 price > 50 過濾規則
    pub fn with_filter(mut self, filter: FilterRule) -> Self {
        self.filter = filter;
        self
    }
}

#[async_trait::async_trait]
impl<C: TransferConnector> Pipeline for ApiToSftpPipeline<C> {
    async fn extract(&self) -> Result<Vec<Record>> {
        self.fetcher.fetch(&self.api_url).await
    }

    async fn transform(&self, records: Vec<Record>) -> Result<TsvBuffer> {
        filter_to_tsv(&records, &self.filter)
    }

    async fn load(&self, mut buffer: TsvBuffer) -> Result<()> {
        self.uploader.upload(&self.target, &mut buffer).await
    }
}
