use tracing::{trace, warn};

use crate::codec::{MAX_PAYLOAD, START1, START2};
use crate::error::FrameError;

/// Receive-side synchronization state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramerState {
    WaitStart1,
    WaitStart2,
    WaitLenMsb,
    WaitLenLsb,
    WaitPayload,
}

/// Counters describing what the framer has seen since it was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FramerStats {
    /// Complete frames emitted.
    pub frames: u64,
    /// Bytes dropped while hunting for a start marker.
    pub discarded_bytes: u64,
    /// Headers dropped for declaring a length outside `1..=512`.
    pub rejected_lengths: u64,
}

/// Byte-at-a-time frame synchronizer.
///
/// Consumes one byte per [`push`](SerialFramer::push) and hands back a
/// borrowed view of the payload when a frame completes. The payload lives in
/// a fixed 512-byte arena that is reused for every frame, so the framer never
/// allocates and may be fed across as many ticks as needed.
pub struct SerialFramer {
    state: FramerState,
    len: usize,
    count: usize,
    buf: [u8; MAX_PAYLOAD],
    stats: FramerStats,
}

impl SerialFramer {
    pub fn new() -> Self {
        Self {
            state: FramerState::WaitStart1,
            len: 0,
            count: 0,
            buf: [0; MAX_PAYLOAD],
            stats: FramerStats::default(),
        }
    }

    /// Feed one byte. Returns the payload when this byte completes a frame.
    pub fn push(&mut self, byte: u8) -> Option<&[u8]> {
        match self.state {
            FramerState::WaitStart1 => {
                if byte == START1 {
                    self.state = FramerState::WaitStart2;
                } else {
                    self.stats.discarded_bytes += 1;
                }
            }
            FramerState::WaitStart2 => {
                if byte == START2 {
                    self.state = FramerState::WaitLenMsb;
                } else {
                    // The mismatching byte is not re-examined as a new START1.
                    self.stats.discarded_bytes += 2;
                    self.state = FramerState::WaitStart1;
                }
            }
            FramerState::WaitLenMsb => {
                self.len = usize::from(byte) << 8;
                self.state = FramerState::WaitLenLsb;
            }
            FramerState::WaitLenLsb => {
                self.len |= usize::from(byte);
                if self.len == 0 || self.len > MAX_PAYLOAD {
                    let err = FrameError::InvalidLength(self.len);
                    warn!(error = %err, "discarding frame header");
                    self.stats.rejected_lengths += 1;
                    self.state = FramerState::WaitStart1;
                } else {
                    self.count = 0;
                    self.state = FramerState::WaitPayload;
                }
            }
            FramerState::WaitPayload => {
                self.buf[self.count] = byte;
                self.count += 1;
                if self.count == self.len {
                    self.state = FramerState::WaitStart1;
                    self.stats.frames += 1;
                    trace!(len = self.len, "frame complete");
                    return Some(&self.buf[..self.len]);
                }
            }
        }
        None
    }

    /// Payload of the most recently completed frame.
    ///
    /// Only meaningful right after [`push`](SerialFramer::push) returned a
    /// frame; the next header overwrites it.
    pub fn last_frame(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Feed a run of bytes, calling `on_frame` for every completed frame.
    pub fn push_slice(&mut self, bytes: &[u8], mut on_frame: impl FnMut(&[u8])) {
        for &byte in bytes {
            if let Some(frame) = self.push(byte) {
                on_frame(frame);
            }
        }
    }

    /// Drop any partially received frame and hunt for a new start marker.
    pub fn reset(&mut self) {
        self.state = FramerState::WaitStart1;
        self.len = 0;
        self.count = 0;
    }

    /// Current synchronization state.
    pub fn state(&self) -> FramerState {
        self.state
    }

    /// Counters since creation.
    pub fn stats(&self) -> FramerStats {
        self.stats
    }
}

impl Default for SerialFramer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SerialFramer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialFramer")
            .field("state", &self.state)
            .field("len", &self.len)
            .field("count", &self.count)
            .field("stats", &self.stats)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;

    use super::*;
    use crate::codec::encode_frame;

    fn collect(framer: &mut SerialFramer, bytes: &[u8]) -> Vec<Vec<u8>> {
        let mut frames = Vec::new();
        framer.push_slice(bytes, |frame| frames.push(frame.to_vec()));
        frames
    }

    #[test]
    fn single_frame() {
        let mut framer = SerialFramer::new();
        let frames = collect(
            &mut framer,
            &[0x94, 0xC3, 0x00, 0x05, 0x10, 0x11, 0x12, 0x13, 0x14],
        );
        assert_eq!(frames, vec![vec![0x10, 0x11, 0x12, 0x13, 0x14]]);
        assert_eq!(framer.state(), FramerState::WaitStart1);
        assert_eq!(framer.stats().frames, 1);
    }

    #[test]
    fn zero_length_is_rejected() {
        let mut framer = SerialFramer::new();
        let frames = collect(&mut framer, &[0x94, 0xC3, 0x00, 0x00]);
        assert!(frames.is_empty());
        assert_eq!(framer.state(), FramerState::WaitStart1);
        assert_eq!(framer.stats().rejected_lengths, 1);
    }

    #[test]
    fn oversized_length_is_rejected() {
        let mut framer = SerialFramer::new();
        let frames = collect(&mut framer, &[0x94, 0xC3, 0x02, 0x01]);
        assert!(frames.is_empty());
        assert_eq!(framer.state(), FramerState::WaitStart1);
    }

    #[test]
    fn payload_after_rejected_header_is_not_a_frame() {
        let mut framer = SerialFramer::new();
        let frames = collect(&mut framer, &[0x94, 0xC3, 0x02, 0x01, 0xAA, 0xBB]);
        assert!(frames.is_empty());
        assert_eq!(framer.state(), FramerState::WaitStart1);
    }

    #[test]
    fn leading_noise_is_discarded() {
        let mut framer = SerialFramer::new();
        let mut wire = b"INFO | boot log line\r\n".to_vec();
        wire.extend_from_slice(&[0x94, 0xC3, 0x00, 0x01, 0x42]);

        let frames = collect(&mut framer, &wire);
        assert_eq!(frames, vec![vec![0x42]]);
        assert!(framer.stats().discarded_bytes >= 22);
    }

    #[test]
    fn start2_mismatch_does_not_reexamine_byte() {
        let mut framer = SerialFramer::new();
        // The second 0x94 is consumed as the START2 mismatch, so the frame
        // that follows it is not recognized.
        let frames = collect(&mut framer, &[0x94, 0x94, 0xC3, 0x00, 0x01, 0x42]);
        assert!(frames.is_empty());
    }

    #[test]
    fn frame_split_across_pushes() {
        let mut framer = SerialFramer::new();
        let mut wire = BytesMut::new();
        encode_frame(b"split", &mut wire).unwrap();

        let (head, tail) = wire.split_at(3);
        assert!(collect(&mut framer, head).is_empty());
        assert_eq!(framer.state(), FramerState::WaitLenLsb);
        assert_eq!(collect(&mut framer, tail), vec![b"split".to_vec()]);
    }

    #[test]
    fn back_to_back_frames() {
        let mut framer = SerialFramer::new();
        let mut wire = BytesMut::new();
        encode_frame(b"first", &mut wire).unwrap();
        encode_frame(b"second", &mut wire).unwrap();

        let frames = collect(&mut framer, &wire);
        assert_eq!(frames, vec![b"first".to_vec(), b"second".to_vec()]);
    }

    #[test]
    fn max_size_frame() {
        let mut framer = SerialFramer::new();
        let payload = vec![0x5A; MAX_PAYLOAD];
        let mut wire = BytesMut::new();
        encode_frame(&payload, &mut wire).unwrap();

        assert_eq!(collect(&mut framer, &wire), vec![payload]);
    }

    #[test]
    fn reset_drops_partial_frame() {
        let mut framer = SerialFramer::new();
        assert!(collect(&mut framer, &[0x94, 0xC3, 0x00, 0x03, 0x01]).is_empty());
        framer.reset();
        assert_eq!(framer.state(), FramerState::WaitStart1);
        assert_eq!(
            collect(&mut framer, &[0x94, 0xC3, 0x00, 0x01, 0x07]),
            vec![vec![0x07]]
        );
    }
}
