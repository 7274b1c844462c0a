//! In-memory transport and writers for unit tests.

use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use crate::error::{ChannelError, Result};
use crate::transport::Transport;

type Responder = Box<dyn FnMut(&str) -> Option<String> + Send>;

/// A transport whose output is scripted by the test.
pub(crate) struct ScriptedTransport {
    output_rx: mpsc::UnboundedReceiver<Vec<u8>>,
    pending: VecDeque<Vec<u8>>,
    responder: Option<Responder>,
    written: Arc<Mutex<Vec<u8>>>,
    closed: Arc<AtomicBool>,
}

/// Test-side handle of a [`ScriptedTransport`].
///
/// Dropping the handle ends the transport's output stream.
pub(crate) struct ScriptHandle {
    output: mpsc::UnboundedSender<Vec<u8>>,
    written: Arc<Mutex<Vec<u8>>>,
    closed: Arc<AtomicBool>,
}

pub(crate) fn scripted() -> (ScriptedTransport, ScriptHandle) {
    let (tx, rx) = mpsc::unbounded_channel();
    let written = Arc::new(Mutex::new(Vec::new()));
    let closed = Arc::new(AtomicBool::new(false));
    (
        ScriptedTransport {
            output_rx: rx,
            pending: VecDeque::new(),
            responder: None,
            written: written.clone(),
            closed: closed.clone(),
        },
        ScriptHandle {
            output: tx,
            written,
            closed,
        },
    )
}

/// A scripted transport that answers every written line through `respond`.
pub(crate) fn responding<F>(respond: F) -> (ScriptedTransport, ScriptHandle)
where
    F: FnMut(&str) -> Option<String> + Send + 'static,
{
    let (mut transport, handle) = scripted();
    transport.responder = Some(Box::new(respond));
    (transport, handle)
}

/// Pretend to be a shell that echoes input and runs `echo`.
pub(crate) fn echo_shell(line: &str) -> Option<String> {
    let line = line.trim_end();
    let output = line.strip_prefix("echo ").unwrap_or("");
    Some(format!("{}\r\n{}\r\n$ ", line, output))
}

impl ScriptHandle {
    pub(crate) fn push(&self, text: &str) {
        self.push_bytes(text.as_bytes());
    }

    pub(crate) fn push_bytes(&self, data: &[u8]) {
        let _ = self.output.send(data.to_vec());
    }

    pub(crate) fn written(&self) -> String {
        String::from_utf8_lossy(&self.written.lock().unwrap()).into_owned()
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Transport for ScriptedTransport {
    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        if self.is_closed() {
            return Err(ChannelError::Closed.into());
        }
        self.written.lock().unwrap().extend_from_slice(data);
        if let Some(respond) = self.responder.as_mut() {
            if let Some(reply) = respond(&String::from_utf8_lossy(data)) {
                self.pending.push_back(reply.into_bytes());
            }
        }
        Ok(())
    }

    async fn read_chunk(&mut self) -> Option<Vec<u8>> {
        if let Some(chunk) = self.pending.pop_front() {
            return Some(chunk);
        }
        self.output_rx.recv().await
    }

    fn close(&mut self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// A `Write` sink whose contents the test can read back.
#[derive(Clone, Default)]
pub(crate) struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub(crate) fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
