//! Process transport: a child process on a pseudo-terminal.

use std::io::{Read, Write};
use std::thread;

use log::{debug, trace, warn};
use portable_pty::{Child, CommandBuilder, MasterPty, PtySize, native_pty_system};
use tokio::sync::mpsc;

use super::Transport;
use super::config::SpawnConfig;
use crate::error::{ChannelError, Result, TransportError};

/// Bytes read from the PTY per syscall.
const READ_CHUNK: usize = 8192;

/// A spawned shell or remote-login process attached to a PTY.
///
/// Output is read by a background thread and forwarded over an unbounded
/// channel; the channel closes when the process side of the PTY goes away.
pub struct ProcessTransport {
    /// Writer for the master side of the PTY.
    writer: Box<dyn Write + Send>,

    /// Output chunks from the reader thread.
    output_rx: mpsc::UnboundedReceiver<Vec<u8>>,

    /// The child process.
    child: Box<dyn Child + Send + Sync>,

    /// Held so the PTY stays open for the child's lifetime.
    _master: Box<dyn MasterPty + Send>,

    /// Command line used to spawn the child.
    command_line: String,

    /// Set once `close()` has run.
    closed: bool,
}

impl ProcessTransport {
    /// Spawn the configured target on a fresh PTY.
    pub fn spawn(config: &SpawnConfig) -> Result<Self> {
        let command_line = config.target.command_line();
        let argv = config.target.argv();

        let pair = native_pty_system()
            .openpty(PtySize {
                rows: config.terminal_height,
                cols: config.terminal_width,
                pixel_width: 0,
                pixel_height: 0,
            })
            .map_err(|e| TransportError::Pty(e.to_string()))?;

        let mut cmd = CommandBuilder::from_argv(argv.iter().map(Into::into).collect());
        for (key, value) in &config.env {
            cmd.env(key, value);
        }
        if let Ok(cwd) = std::env::current_dir() {
            cmd.cwd(cwd);
        }

        let child = pair
            .slave
            .spawn_command(cmd)
            .map_err(|e| TransportError::Spawn {
                command: command_line.clone(),
                message: e.to_string(),
            })?;

        // Only the child keeps the slave side; EOF on the master depends on it
        drop(pair.slave);

        let writer = pair
            .master
            .take_writer()
            .map_err(|e| TransportError::Pty(e.to_string()))?;
        let mut reader = pair
            .master
            .try_clone_reader()
            .map_err(|e| TransportError::Pty(e.to_string()))?;

        let (tx, output_rx) = mpsc::unbounded_channel::<Vec<u8>>();

        thread::Builder::new()
            .name("orc-pty-reader".to_string())
            .spawn(move || {
                let mut buf = [0u8; READ_CHUNK];
                loop {
                    match reader.read(&mut buf) {
                        Ok(0) => break,
                        Ok(n) => {
                            if tx.send(buf[..n].to_vec()).is_err() {
                                break;
                            }
                        }
                        Err(ref e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                        Err(e) => {
                            // Linux reports EIO on the master once the child has exited
                            trace!("PTY reader stopped: {}", e);
                            break;
                        }
                    }
                }
            })
            .map_err(TransportError::Io)?;

        debug!(
            "spawned '{}' (pid {:?})",
            command_line,
            child.process_id()
        );

        Ok(Self {
            writer,
            output_rx,
            child,
            _master: pair.master,
            command_line,
            closed: false,
        })
    }

    /// The command line this transport was spawned with.
    pub fn command_line(&self) -> &str {
        &self.command_line
    }

    /// OS process id of the child, if known.
    pub fn process_id(&self) -> Option<u32> {
        self.child.process_id()
    }

    fn terminate(&mut self) -> std::io::Result<()> {
        if let Ok(Some(status)) = self.child.try_wait() {
            debug!("'{}' already exited: {:?}", self.command_line, status);
            return Ok(());
        }
        self.child.kill()?;
        self.child.wait()?;
        Ok(())
    }
}

impl Transport for ProcessTransport {
    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        if self.closed {
            return Err(ChannelError::Closed.into());
        }
        self.writer.write_all(data).map_err(ChannelError::Io)?;
        self.writer.flush().map_err(ChannelError::Io)?;
        Ok(())
    }

    async fn read_chunk(&mut self) -> Option<Vec<u8>> {
        self.output_rx.recv().await
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        debug!("closing '{}'", self.command_line);
        // Left open on failure so a later close or drop retries the kill
        self.terminate().map_err(TransportError::Io)?;
        self.closed = true;
        self.output_rx.close();
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Drop for ProcessTransport {
    fn drop(&mut self) {
        if !self.closed {
            self.closed = true;
            if let Err(e) = self.terminate() {
                warn!("failed to kill '{}' on drop: {}", self.command_line, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::SpawnTarget;

    #[test]
    fn test_spawn_missing_program_fails() {
        let config = SpawnConfig::new(SpawnTarget::Local {
            shell: "/nonexistent/orc-shell".to_string(),
        });
        let err = ProcessTransport::spawn(&config).err().expect("spawn should fail");
        assert!(matches!(
            err,
            crate::Error::Transport(TransportError::Spawn { .. })
        ));
    }

    #[tokio::test]
    async fn test_local_shell_round_trip() {
        let config = SpawnConfig::new(SpawnTarget::local());
        let mut transport = ProcessTransport::spawn(&config).unwrap();
        assert!(transport.process_id().is_some());

        transport.write_all(b"echo transport-ok\n").unwrap();
        let mut seen = Vec::new();
        let found = tokio::time::timeout(std::time::Duration::from_secs(10), async {
            while let Some(chunk) = transport.read_chunk().await {
                seen.extend_from_slice(&chunk);
                if String::from_utf8_lossy(&seen).contains("transport-ok") {
                    return true;
                }
            }
            false
        })
        .await
        .unwrap_or(false);
        assert!(found, "output: {:?}", String::from_utf8_lossy(&seen));

        transport.close().unwrap();
        assert!(transport.is_closed());
        assert!(transport.close().is_ok());
        assert!(transport.write_all(b"echo again\n").is_err());
    }

    #[tokio::test]
    async fn test_close_after_child_exited() {
        let config = SpawnConfig::new(SpawnTarget::local());
        let mut transport = ProcessTransport::spawn(&config).unwrap();

        transport.write_all(b"exit\n").unwrap();
        let drained = tokio::time::timeout(std::time::Duration::from_secs(10), async {
            while transport.read_chunk().await.is_some() {}
        })
        .await;
        assert!(drained.is_ok());
        assert!(!transport.is_closed());

        transport.close().unwrap();
        assert!(transport.is_closed());
        assert!(transport.read_chunk().await.is_none());
    }
}
