//! Host capabilities consumed by the meshlink radio bridge.
//!
//! The protocol engine never talks to a UART, a timer or a GPIO directly.
//! It is handed three narrow capabilities instead:
//! - [`SerialLink`]: byte-oriented, non-blocking serial I/O
//! - [`Clock`]: a monotonic millisecond clock
//! - [`PowerLine`]: the radio's power-control output
//!
//! This is the lowest layer of meshlink. In-memory doubles ([`MemoryLink`],
//! [`ManualClock`]) live here too so every layer above can be exercised
//! without hardware.

pub mod clock;
pub mod error;
pub mod memory;
pub mod traits;

#[cfg(unix)]
pub mod tty;

pub use clock::{ManualClock, MonotonicClock};
pub use error::{Result, TransportError};
pub use memory::MemoryLink;
pub use traits::{Clock, NoPowerLine, PowerLatch, PowerLine, SerialLink};

#[cfg(unix)]
pub use tty::TtyLink;
