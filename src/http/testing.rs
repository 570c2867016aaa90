//! In-memory transport for unit tests.
//!
//! Incoming bytes are delivered as a script of chunks. A peek or receive never
//! crosses a chunk boundary, which models data arriving in separate TCP
//! segments. Once the script is exhausted the peer counts as closed.

use super::error::HttpError;
use super::transport::{Connect, Transport};

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

#[derive(Debug, Default)]
pub(crate) struct ScriptedTransport {
    chunks: VecDeque<Vec<u8>>,
    pub(crate) sent: Vec<u8>,
    live: bool,
}

impl ScriptedTransport {
    pub(crate) fn new(chunks: Vec<Vec<u8>>) -> Self {
        Self {
            chunks: chunks.into_iter().filter(|c| !c.is_empty()).collect(),
            sent: Vec::new(),
            live: true,
        }
    }

    /// Splits `bytes` into pieces of `size` bytes.
    pub(crate) fn chunked(bytes: &[u8], size: usize) -> Self {
        Self::new(bytes.chunks(size).map(<[u8]>::to_vec).collect())
    }

    fn take(&mut self, buf: &mut [u8], consume: bool) -> Result<usize, HttpError> {
        if !self.live {
            return Err(HttpError::StaleConnection);
        }
        let Some(front) = self.chunks.front_mut() else {
            self.live = false;
            return Err(HttpError::Closed);
        };
        let n = buf.len().min(front.len());
        buf[..n].copy_from_slice(&front[..n]);
        if consume {
            front.drain(..n);
            if front.is_empty() {
                self.chunks.pop_front();
            }
        }
        Ok(n)
    }
}

impl Transport for ScriptedTransport {
    fn send(&mut self, bytes: &[u8]) -> Result<(), HttpError> {
        if !self.live {
            return Err(HttpError::StaleConnection);
        }
        self.sent.extend_from_slice(bytes);
        Ok(())
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<usize, HttpError> {
        self.take(buf, true)
    }

    fn peek(&mut self, buf: &mut [u8]) -> Result<usize, HttpError> {
        self.take(buf, false)
    }

    fn close(&mut self) {
        self.live = false;
    }

    fn is_live(&self) -> bool {
        self.live
    }
}

/// Hands out one scripted transport per connect, recording every request sent.
#[derive(Debug, Default, Clone)]
pub(crate) struct ScriptedConnector {
    scripts: Rc<RefCell<VecDeque<Vec<Vec<u8>>>>>,
    pub(crate) connects: Rc<RefCell<usize>>,
}

impl ScriptedConnector {
    pub(crate) fn new(scripts: Vec<Vec<Vec<u8>>>) -> Self {
        Self {
            scripts: Rc::new(RefCell::new(scripts.into())),
            connects: Rc::new(RefCell::new(0)),
        }
    }

    pub(crate) fn connect_count(&self) -> usize {
        *self.connects.borrow()
    }
}

impl Connect for ScriptedConnector {
    type Transport = ScriptedTransport;

    fn connect(&self, host: &str, port: u16) -> Result<ScriptedTransport, HttpError> {
        *self.connects.borrow_mut() += 1;
        self.scripts
            .borrow_mut()
            .pop_front()
            .map(ScriptedTransport::new)
            .ok_or_else(|| HttpError::Connect {
                host: host.to_string(),
                port,
                source: None,
            })
    }
}
