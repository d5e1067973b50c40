use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::os::fd::AsRawFd;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{Result, TransportError};
use crate::traits::SerialLink;

/// Baud rate used by Meshtastic firmware on its serial API port.
pub const DEFAULT_BAUD: u32 = 115_200;

const RX_CHUNK_SIZE: usize = 256;

/// Longest a single write waits for the driver to accept more bytes.
pub const WRITE_STALL_TIMEOUT_MS: i32 = 1_000;

/// Raw, non-blocking POSIX serial device (e.g. `/dev/ttyUSB0`).
///
/// The device is opened with `O_NONBLOCK`, switched to raw mode and given
/// `VMIN = VTIME = 0`, so reads return immediately with whatever the driver
/// has buffered.
pub struct TtyLink {
    file: File,
    path: PathBuf,
    rx: [u8; RX_CHUNK_SIZE],
    rx_start: usize,
    rx_end: usize,
}

impl TtyLink {
    /// Open a serial device at [`DEFAULT_BAUD`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_baud(path, DEFAULT_BAUD)
    }

    /// Open a serial device at an explicit baud rate.
    pub fn open_with_baud(path: impl AsRef<Path>, baud: u32) -> Result<Self> {
        let speed = baud_constant(baud)?;
        let path = path.as_ref().to_path_buf();

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NOCTTY | libc::O_NONBLOCK)
            .open(&path)
            .map_err(|source| TransportError::Open {
                path: path.clone(),
                source,
            })?;

        configure_raw(&file, speed).map_err(|source| TransportError::Configure {
            path: path.clone(),
            source,
        })?;

        info!(?path, baud, "opened serial device");
        Ok(Self {
            file,
            path,
            rx: [0; RX_CHUNK_SIZE],
            rx_start: 0,
            rx_end: 0,
        })
    }

    /// Path of the opened device.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn fill(&mut self) -> Result<()> {
        if self.rx_start < self.rx_end {
            return Ok(());
        }
        self.rx_start = 0;
        self.rx_end = 0;

        loop {
            match self.file.read(&mut self.rx) {
                Ok(n) => {
                    self.rx_end = n;
                    return Ok(());
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => return Ok(()),
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }
}

impl SerialLink for TtyLink {
    fn available(&mut self) -> Result<usize> {
        self.fill()?;
        Ok(self.rx_end - self.rx_start)
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        self.fill()?;
        if self.rx_start == self.rx_end {
            return Ok(None);
        }
        let byte = self.rx[self.rx_start];
        self.rx_start += 1;
        Ok(Some(byte))
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        write_all_bounded(&mut self.file, bytes, WRITE_STALL_TIMEOUT_MS)?;
        debug!(len = bytes.len(), "wrote to serial device");
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        loop {
            match self.file.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }
}

impl std::fmt::Debug for TtyLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtyLink")
            .field("path", &self.path)
            .field("buffered", &(self.rx_end - self.rx_start))
            .finish()
    }
}

/// Write all of `bytes` to a non-blocking descriptor, waiting up to
/// `timeout_ms` each time the driver stops accepting data.
fn write_all_bounded(file: &mut File, bytes: &[u8], timeout_ms: i32) -> Result<()> {
    let mut offset = 0usize;
    while offset < bytes.len() {
        match file.write(&bytes[offset..]) {
            Ok(0) => return Err(TransportError::Closed),
            Ok(n) => offset += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) if err.kind() == ErrorKind::WouldBlock => {
                if !wait_writable(file, timeout_ms)? {
                    warn!(written = offset, len = bytes.len(), timeout_ms, "serial write stalled");
                    return Err(TransportError::Io(std::io::Error::new(
                        ErrorKind::TimedOut,
                        "serial device stopped accepting data",
                    )));
                }
            }
            Err(err) => return Err(TransportError::Io(err)),
        }
    }
    Ok(())
}

/// Returns `false` when `timeout_ms` passes without the descriptor becoming
/// writable.
fn wait_writable(file: &File, timeout_ms: i32) -> std::io::Result<bool> {
    let mut pollfd = libc::pollfd {
        fd: file.as_raw_fd(),
        events: libc::POLLOUT,
        revents: 0,
    };
    loop {
        // SAFETY: `pollfd` is a valid, writable array of one entry and its
        // descriptor is kept open by `file` for the duration of the call.
        let ready = unsafe { libc::poll(&mut pollfd, 1, timeout_ms) };
        if ready < 0 {
            let err = std::io::Error::last_os_error();
            if err.kind() == ErrorKind::Interrupted {
                continue;
            }
            return Err(err);
        }
        return Ok(ready > 0);
    }
}

fn baud_constant(baud: u32) -> Result<libc::speed_t> {
    let speed = match baud {
        9_600 => libc::B9600,
        19_200 => libc::B19200,
        38_400 => libc::B38400,
        57_600 => libc::B57600,
        115_200 => libc::B115200,
        230_400 => libc::B230400,
        other => return Err(TransportError::UnsupportedBaud(other)),
    };
    Ok(speed)
}

fn configure_raw(file: &File, speed: libc::speed_t) -> std::io::Result<()> {
    let fd = file.as_raw_fd();

    // SAFETY: `termios` is a plain C struct; an all-zero value is a valid
    // placeholder that `tcgetattr` overwrites on success.
    let mut tio: libc::termios = unsafe { std::mem::zeroed() };

    // SAFETY: `fd` is an open descriptor owned by `file` and `tio` is a valid,
    // writable `termios` for the duration of each call below.
    unsafe {
        if libc::tcgetattr(fd, &mut tio) != 0 {
            return Err(std::io::Error::last_os_error());
        }
        libc::cfmakeraw(&mut tio);
        tio.c_cc[libc::VMIN] = 0;
        tio.c_cc[libc::VTIME] = 0;
        if libc::cfsetispeed(&mut tio, speed) != 0 || libc::cfsetospeed(&mut tio, speed) != 0 {
            return Err(std::io::Error::last_os_error());
        }
        if libc::tcsetattr(fd, libc::TCSANOW, &tio) != 0 {
            return Err(std::io::Error::last_os_error());
        }
    }
    Ok(())
}
