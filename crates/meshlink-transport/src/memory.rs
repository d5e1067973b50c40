use std::collections::VecDeque;

use crate::error::{Result, TransportError};
use crate::traits::SerialLink;

/// In-memory serial link.
///
/// Bytes queued with [`MemoryLink::push_inbound`] are what the radio "sent";
/// everything the bridge writes accumulates in the outbound buffer.
#[derive(Debug, Default)]
pub struct MemoryLink {
    inbound: VecDeque<u8>,
    outbound: Vec<u8>,
    fail_writes: bool,
}

impl MemoryLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes as if they had arrived from the radio.
    pub fn push_inbound(&mut self, bytes: &[u8]) {
        self.inbound.extend(bytes.iter().copied());
    }

    /// Bytes written so far, without clearing them.
    pub fn outbound(&self) -> &[u8] {
        &self.outbound
    }

    /// Take and clear everything written so far.
    pub fn take_outbound(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.outbound)
    }

    /// Number of inbound bytes not yet consumed.
    pub fn pending_inbound(&self) -> usize {
        self.inbound.len()
    }

    /// Make subsequent writes fail with [`TransportError::Closed`].
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }
}

impl SerialLink for MemoryLink {
    fn available(&mut self) -> Result<usize> {
        Ok(self.inbound.len())
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        Ok(self.inbound.pop_front())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        if self.fail_writes {
            return Err(TransportError::Closed);
        }
        self.outbound.extend_from_slice(bytes);
        Ok(())
    }
}
