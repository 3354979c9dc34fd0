use std::io::Write;
use std::net::TcpStream;
use std::path::Path;

use ssh2::Session;

use crate::domain::model::SftpTarget;
use crate::domain::ports::{TransferConnector, TransferSession};
use crate::utils::error::{PipelineError, Result};

/// Opens password-authenticated SFTP sessions via libssh2. The handshake
/// and file operations are synchronous calls run inline; the pipeline is a
/// one-shot batch job, so nothing else contends for the runtime.
#[derive(Default)]
pub struct SshConnector;

impl SshConnector {
    pub fn new() -> Self {
        Self
    }
}

impl TransferConnector for SshConnector {
    type Session = SshSession;

    async fn connect(&self, target: &SftpTarget) -> Result<SshSession> {
        let tcp = TcpStream::connect((target.host.as_str(), target.port)).map_err(|e| {
            transfer_error(&format!("connect {}:{}", target.host, target.port), e)
        })?;

        let mut session = Session::new().map_err(|e| transfer_error("session init", e))?;
        session.set_tcp_stream(tcp);
        session
            .handshake()
            .map_err(|e| transfer_error("SSH handshake", e))?;

        session
            .userauth_password(&target.username, &target.password)
            .map_err(|e| PipelineError::AuthError {
                message: e.to_string(),
            })?;
        if !session.authenticated() {
            return Err(PipelineError::AuthError {
                message: format!("server rejected credentials for '{}'", target.username),
            });
        }

        let sftp = session
            .sftp()
            .map_err(|e| transfer_error("open SFTP channel", e))?;

        tracing::debug!("SFTP session established with {}:{}", target.host, target.port);
        Ok(SshSession { session, sftp })
    }
}

/// 一條已認證的 SFTP 連線；斷線由 close 負責，Drop 僅作保底
pub struct SshSession {
    session: Session,
    sftp: ssh2::Sftp,
}

impl TransferSession for SshSession {
    async fn write_file(&mut self, remote_path: &str, data: &[u8]) -> Result<()> {
        // Sftp::create truncates an existing remote file, so a retried
        // upload never appends to a partial one.
        let mut remote_file = self
            .sftp
            .create(Path::new(remote_path))
            .map_err(|e| transfer_error(&format!("create {}", remote_path), e))?;
        remote_file
            .write_all(data)
            .map_err(|e| transfer_error(&format!("write {}", remote_path), e))?;
        Ok(())
    }

    async fn list_dir(&mut self, remote_dir: &str) -> Result<Vec<String>> {
        let entries = self
            .sftp
            .readdir(Path::new(remote_dir))
            .map_err(|e| transfer_error(&format!("list {}", remote_dir), e))?;

        let names = entries
            .iter()
            .filter_map(|(path, _stat)| path.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .collect();
        Ok(names)
    }

    async fn close(&mut self) -> Result<()> {
        self.session
            .disconnect(None, "pipeline finished", None)
            .map_err(|e| transfer_error("disconnect", e))?;
        Ok(())
    }
}

fn transfer_error(step: &str, e: impl std::fmt::Display) -> PipelineError {
    PipelineError::TransferError {
        message: format!("{}: {}", step, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_to_closed_port_is_transfer_error() {
        // Grab a port with nothing listening on it.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let connector = SshConnector::new();
        let target = SftpTarget {
            host: "127.0.0.1".to_string(),
            port,
            username: "demo".to_string(),
            password: "secret".to_string(),
            remote_path: "/upload/report.txt".to_string(),
        };

        match connector.connect(&target).await {
            Err(PipelineError::TransferError { message }) => {
                assert!(message.contains("connect 127.0.0.1"));
            }
            Err(other) => panic!("expected TransferError, got {:?}", other),
            Ok(_) => panic!("expected the connection to fail"),
        }
    }
}
