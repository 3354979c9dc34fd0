pub mod etl;
pub mod fetch;
pub mod pipeline;
pub mod transform;
pub mod upload;

pub use crate::domain::model::{Record, SftpTarget, TsvBuffer};
pub use crate::domain::ports::{Pipeline, TransferConnector, TransferSession};
pub use crate::utils::error::Result;
