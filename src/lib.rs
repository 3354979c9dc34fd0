pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::SshConnector;
pub use config::PipelineConfig;
pub use crate::core::{etl::EtlEngine, pipeline::ApiToSftpPipeline};
pub use utils::error::{PipelineError, PipelineStage, Result};
