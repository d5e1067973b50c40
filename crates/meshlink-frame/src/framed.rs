use bytes::BytesMut;
use meshlink_transport::SerialLink;
use tracing::debug;

use crate::codec::{encode_frame, HEADER_SIZE, MAX_PAYLOAD, WAKE_SEQUENCE};
use crate::error::Result;
use crate::framer::SerialFramer;

/// A [`SerialLink`] with framing on both directions.
///
/// Outbound payloads are wrapped in a frame header; inbound bytes are drained
/// without blocking and pushed through a [`SerialFramer`].
pub struct FramedLink<L> {
    inner: L,
    framer: SerialFramer,
    tx: BytesMut,
}

impl<L: SerialLink> FramedLink<L> {
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            framer: SerialFramer::new(),
            tx: BytesMut::with_capacity(HEADER_SIZE + MAX_PAYLOAD),
        }
    }

    /// Encode and write one frame.
    pub fn send(&mut self, payload: &[u8]) -> Result<()> {
        self.tx.clear();
        encode_frame(payload, &mut self.tx)?;
        self.inner.write_bytes(&self.tx)?;
        self.inner.flush()?;
        debug!(len = payload.len(), "sent frame");
        Ok(())
    }

    /// Write the 32-byte wake sequence.
    pub fn send_wake(&mut self) -> Result<()> {
        self.inner.write_bytes(&WAKE_SEQUENCE)?;
        self.inner.flush()?;
        debug!(len = WAKE_SEQUENCE.len(), "sent wake sequence");
        Ok(())
    }

    /// Drain available bytes until a frame completes.
    ///
    /// Returns `Ok(None)` once the link has nothing more buffered; a partial
    /// frame stays in the framer for the next call.
    pub fn poll_frame(&mut self) -> Result<Option<&[u8]>> {
        while self.inner.available()? > 0 {
            let Some(byte) = self.inner.read_byte()? else {
                break;
            };
            if self.framer.push(byte).is_some() {
                return Ok(Some(self.framer.last_frame()));
            }
        }
        Ok(None)
    }

    /// Drop any partially received frame.
    pub fn reset_framer(&mut self) {
        self.framer.reset();
    }

    /// Receive-side framer.
    pub fn framer(&self) -> &SerialFramer {
        &self.framer
    }

    /// Borrow the underlying link.
    pub fn get_ref(&self) -> &L {
        &self.inner
    }

    /// Mutably borrow the underlying link.
    pub fn get_mut(&mut self) -> &mut L {
        &mut self.inner
    }

    /// Consume the framed link and return the inner link.
    pub fn into_inner(self) -> L {
        self.inner
    }
}

impl<L> std::fmt::Debug for FramedLink<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FramedLink")
            .field("framer", &self.framer)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use meshlink_transport::{MemoryLink, TransportError};

    use super::*;
    use crate::error::FrameError;
    use crate::framer::FramerState;

    #[test]
    fn send_writes_header_and_payload() {
        let mut link = FramedLink::new(MemoryLink::new());
        link.send(&[0x18, 0x01]).unwrap();
        assert_eq!(
            link.get_mut().take_outbound(),
            vec![0x94, 0xC3, 0x00, 0x02, 0x18, 0x01]
        );
    }

    #[test]
    fn send_wake_writes_32_wake_bytes() {
        let mut link = FramedLink::new(MemoryLink::new());
        link.send_wake().unwrap();
        assert_eq!(link.get_ref().outbound(), &[0xC3; 32]);
    }

    #[test]
    fn oversized_send_produces_no_traffic() {
        let mut link = FramedLink::new(MemoryLink::new());
        let err = link.send(&[0u8; MAX_PAYLOAD + 1]).unwrap_err();
        assert!(matches!(err, FrameError::PayloadTooLarge { .. }));
        assert!(link.get_ref().outbound().is_empty());
    }

    #[test]
    fn transport_failure_is_wrapped() {
        let mut link = FramedLink::new(MemoryLink::new());
        link.get_mut().set_fail_writes(true);
        let err = link.send(b"x").unwrap_err();
        assert!(matches!(err, FrameError::Transport(TransportError::Closed)));
    }

    #[test]
    fn poll_returns_frames_one_at_a_time() {
        let mut link = FramedLink::new(MemoryLink::new());
        link.get_mut()
            .push_inbound(&[0x94, 0xC3, 0x00, 0x01, 0xAA, 0x94, 0xC3, 0x00, 0x01, 0xBB]);

        assert_eq!(link.poll_frame().unwrap(), Some(&[0xAA][..]));
        assert_eq!(link.poll_frame().unwrap(), Some(&[0xBB][..]));
        assert_eq!(link.poll_frame().unwrap(), None);
    }

    #[test]
    fn partial_frame_survives_between_polls() {
        let mut link = FramedLink::new(MemoryLink::new());
        link.get_mut().push_inbound(&[0x94, 0xC3, 0x00, 0x02, 0x01]);
        assert_eq!(link.poll_frame().unwrap(), None);
        assert_eq!(link.framer().state(), FramerState::WaitPayload);

        link.get_mut().push_inbound(&[0x02]);
        assert_eq!(link.poll_frame().unwrap(), Some(&[0x01, 0x02][..]));
    }

    #[test]
    fn reset_framer_discards_partial_frame() {
        let mut link = FramedLink::new(MemoryLink::new());
        link.get_mut().push_inbound(&[0x94, 0xC3, 0x00, 0x02, 0x01]);
        assert_eq!(link.poll_frame().unwrap(), None);

        link.reset_framer();
        link.get_mut().push_inbound(&[0x94, 0xC3, 0x00, 0x01, 0x09]);
        assert_eq!(link.poll_frame().unwrap(), Some(&[0x09][..]));
    }
}
