use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::Result;

/// Non-blocking, byte-oriented serial link to the radio.
///
/// Reads never wait for data: `available` reports what is buffered right now
/// and `read_byte` returns `None` once the buffer is drained. Writes are
/// bounded synchronous emissions.
pub trait SerialLink {
    /// Number of received bytes that can be read without blocking.
    fn available(&mut self) -> Result<usize>;

    /// Read one byte, or `None` if nothing is buffered.
    fn read_byte(&mut self) -> Result<Option<u8>>;

    /// Write all of `bytes` to the link.
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()>;

    /// Flush any bytes buffered by the link implementation.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<L: SerialLink + ?Sized> SerialLink for Box<L> {
    fn available(&mut self) -> Result<usize> {
        (**self).available()
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        (**self).read_byte()
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).write_bytes(bytes)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

/// Monotonic millisecond clock.
pub trait Clock {
    /// Milliseconds since an arbitrary, fixed origin. Never decreases.
    fn now_ms(&self) -> u64;
}

/// Power-control output driving the radio's enable line.
pub trait PowerLine {
    /// Drive the line high (`true`, radio powered) or low.
    fn digital_write(&mut self, high: bool);
}

/// Placeholder for hosts without a power-control line.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPowerLine;

impl PowerLine for NoPowerLine {
    fn digital_write(&mut self, _high: bool) {}
}

/// Power line that only latches the last written level.
///
/// Clones share the latch, so a test or simulator can keep a handle and
/// observe what the bridge drove.
#[derive(Debug, Clone, Default)]
pub struct PowerLatch {
    level: Arc<AtomicBool>,
}

impl PowerLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last level written to the line.
    pub fn is_high(&self) -> bool {
        self.level.load(Ordering::SeqCst)
    }
}

impl PowerLine for PowerLatch {
    fn digital_write(&mut self, high: bool) {
        self.level.store(high, Ordering::SeqCst);
    }
}
