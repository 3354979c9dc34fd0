use std::time::Duration;

use crate::domain::model::{SftpTarget, TsvBuffer};
use crate::domain::ports::{TransferConnector, TransferSession};
use crate::utils::error::{PipelineError, Result};

/// Directory listed after a successful write so the upload shows up in the logs.
pub const UPLOAD_VERIFY_DIR: &str = "/upload";

/// 重試策略：總嘗試次數與固定間隔
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_secs(5),
        }
    }
}

/// 第三階段：帶重試的 SFTP 上傳
pub struct SftpUploader<C: TransferConnector> {
    connector: C,
    policy: RetryPolicy,
}

impl<C: TransferConnector> SftpUploader<C> {
    pub fn new(connector: C, policy: RetryPolicy) -> Self {
        Self { connector, policy }
    }

    /// Uploads the whole buffer to `target.remote_path`, retrying the full
    /// connect-write-verify cycle on failure. The buffer is rewound at the
    /// start of every attempt, so a retry always resends the complete
    /// payload.
    pub async fn upload(&self, target: &SftpTarget, buffer: &mut TsvBuffer) -> Result<()> {
        let attempts = self.policy.attempts.max(1);
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            buffer.rewind();
            let payload = buffer.read_remaining();

            match self.try_once(target, &payload).await {
                Ok(()) => {
                    log_verification_hint(target);
                    return Ok(());
                }
                Err(e) => {
                    tracing::error!("❌ Upload attempt {} failed: {}", attempt, e);
                    last_error = e.to_string();
                    if attempt < attempts {
                        tracing::info!(
                            "🔄 Retrying in {} seconds...",
                            self.policy.delay.as_secs()
                        );
                        tokio::time::sleep(self.policy.delay).await;
                    }
                }
            }
        }

        tracing::error!("❌ All {} attempts failed. Giving up.", attempts);
        Err(PipelineError::UploadRetryError {
            attempts,
            last_error,
        })
    }

    /// One connect → write → list → close cycle. The session is closed on
    /// every exit path. Listing is a visibility check only: once the write
    /// has succeeded, a listing failure degrades to a warning instead of
    /// failing the attempt.
    async fn try_once(&self, target: &SftpTarget, payload: &[u8]) -> Result<()> {
        let mut session = self.connector.connect(target).await?;

        let written = session.write_file(&target.remote_path, payload).await;
        if written.is_ok() {
            tracing::info!("✅ File successfully uploaded to: {}", target.remote_path);
            match session.list_dir(UPLOAD_VERIFY_DIR).await {
                Ok(files) => {
                    tracing::info!("📂 Files currently in the {} directory:", UPLOAD_VERIFY_DIR);
                    for file in &files {
                        tracing::info!(" - {}", file);
                    }
                }
                Err(e) => {
                    // 列目錄只是檢查用，寫入成功就不重傳
                    tracing::warn!(
                        "⚠️ Could not list {} after upload: {}",
                        UPLOAD_VERIFY_DIR,
                        e
                    );
                }
            }
        }

        match session.close().await {
            Ok(()) => tracing::info!("✅ Transport connection closed."),
            Err(e) => tracing::warn!("⚠️ Failed to close SFTP session cleanly: {}", e),
        }

        written
    }
}

/// 密碼刻意不輸出
fn log_verification_hint(target: &SftpTarget) {
    tracing::info!("🔍 To manually verify the uploaded file:");
    tracing::info!(
        "1. Connect to the SFTP server: {}:{}",
        target.host,
        target.port
    );
    tracing::info!(
        "2. Log in as '{}' with the configured password.",
        target.username
    );
    tracing::info!(
        "3. Navigate to the {} directory to view the uploaded file.",
        UPLOAD_VERIFY_DIR
    );
}
