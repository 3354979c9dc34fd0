// Adapters layer: concrete implementations for external systems.

pub mod sftp;

pub use sftp::SshConnector;
