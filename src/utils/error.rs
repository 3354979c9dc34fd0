use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Failed to connect to the API: {0}")]
    ConnectionError(reqwest::Error),

    #[error("HTTP error occurred: {status}")]
    HttpError { status: reqwest::StatusCode },

    #[error("Failed to parse API response: {message}")]
    ParseError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("SFTP authentication failed: {message}")]
    AuthError { message: String },

    #[error("SFTP transfer failed: {message}")]
    TransferError { message: String },

    #[error("Upload failed after {attempts} attempts: {last_error}")]
    UploadRetryError { attempts: u32, last_error: String },

    #[error("Missing required environment variable: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid config value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// 管道階段，用於決定最終日誌訊息與退出碼
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Config,
    Fetch,
    Transform,
    Upload,
}

impl PipelineError {
    pub fn stage(&self) -> PipelineStage {
        match self {
            PipelineError::ConnectionError(_)
            | PipelineError::HttpError { .. }
            | PipelineError::ParseError { .. } => PipelineStage::Fetch,
            PipelineError::ValidationError { .. } | PipelineError::ProcessingError { .. } => {
                PipelineStage::Transform
            }
            PipelineError::AuthError { .. }
            | PipelineError::TransferError { .. }
            | PipelineError::UploadRetryError { .. } => PipelineStage::Upload,
            PipelineError::MissingConfigError { .. }
            | PipelineError::InvalidConfigValueError { .. }
            | PipelineError::IoError(_) => PipelineStage::Config,
        }
    }

    /// Each failure stage maps to its own process exit status.
    pub fn exit_code(&self) -> i32 {
        match self.stage() {
            PipelineStage::Config => 1,
            PipelineStage::Fetch => 2,
            PipelineStage::Transform => 3,
            PipelineStage::Upload => 4,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
