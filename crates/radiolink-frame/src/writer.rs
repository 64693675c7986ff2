use std::io::{ErrorKind, Write};

use tracing::trace;

use crate::codec::{encode_header, priming_sequence};
use crate::error::{FrameError, Result};

/// Writes framed packets to any `Write` stream.
///
/// The writer only borrows payloads; it never takes ownership of a caller's
/// buffer, whether the write succeeds or fails. It is not synchronized:
/// callers sharing one writer must serialize calls so that a header and its
/// payload are never interleaved with another frame.
pub struct FrameWriter<T> {
    inner: T,
}

impl<T: Write> FrameWriter<T> {
    /// Create a new frame writer.
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Write `payload`, preceded by a header when `include_header` is set,
    /// then flush the stream.
    ///
    /// A header write failure is reported as [`FrameError::HeaderWrite`] and
    /// nothing of the payload is written; a payload failure is reported as
    /// [`FrameError::PayloadWrite`].
    pub fn write_packet(&mut self, payload: &[u8], include_header: bool) -> Result<()> {
        if include_header {
            let header = encode_header(payload.len())?;
            write_all(&mut self.inner, &header).map_err(FrameError::HeaderWrite)?;
        }

        write_all(&mut self.inner, payload).map_err(FrameError::PayloadWrite)?;
        trace!(len = payload.len(), include_header, "packet written");

        self.flush()
    }

    /// Frame and send a payload.
    pub fn send(&mut self, payload: &[u8]) -> Result<()> {
        self.write_packet(payload, true)
    }

    /// Send bytes without a header.
    pub fn write_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.write_packet(bytes, false)
    }

    /// Send the resynchronization run of first markers.
    pub fn prime(&mut self) -> Result<()> {
        self.write_raw(&priming_sequence())
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

fn write_all<W: Write>(inner: &mut W, bytes: &[u8]) -> std::io::Result<()> {
    let mut offset = 0usize;
    while offset < bytes.len() {
        match inner.write(&bytes[offset..]) {
            Ok(0) => return Err(std::io::Error::from(ErrorKind::WriteZero)),
            Ok(n) => offset += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            // A serial port reports a full output queue as a write timeout.
            Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
            Err(err) if err.kind() == ErrorKind::TimedOut => continue,
            Err(err) => return Err(err),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::codec::{Packet, MARKER_1, MARKER_2, MAX_PACKET_SIZE, PRIMING_LEN};
    use crate::handler::FrameEvent;
    use crate::reader::FrameReader;

    fn written(writer: FrameWriter<Cursor<Vec<u8>>>) -> Vec<u8> {
        writer.into_inner().into_inner()
    }

    #[test]
    fn write_framed_packet() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::new()));
        writer.write_packet(&[0xAA, 0xBB, 0xCC], true).unwrap();

        assert_eq!(
            written(writer),
            vec![MARKER_1, MARKER_2, 0x00, 0x03, 0xAA, 0xBB, 0xCC]
        );
    }

    #[test]
    fn write_without_header() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::new()));
        writer.write_packet(b"raw", false).unwrap();
        assert_eq!(written(writer), b"raw".to_vec());
    }

    #[test]
    fn prime_writes_first_markers() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::new()));
        writer.prime().unwrap();
        assert_eq!(written(writer), vec![MARKER_1; PRIMING_LEN]);
    }

    #[test]
    fn packet_too_large_rejected_before_writing() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::new()));
        let err = writer.send(&vec![0; MAX_PACKET_SIZE + 1]).unwrap_err();

        assert!(matches!(err, FrameError::PacketTooLarge { .. }));
        assert!(written(writer).is_empty());
    }

    #[test]
    fn header_failure_is_distinct() {
        let mut writer = FrameWriter::new(FailAfter::new(0));
        let err = writer.send(b"x").unwrap_err();
        assert!(matches!(err, FrameError::HeaderWrite(_)));
        assert!(writer.get_ref().data.is_empty());
    }

    #[test]
    fn payload_failure_is_distinct() {
        let mut writer = FrameWriter::new(FailAfter::new(4));
        let err = writer.send(b"payload").unwrap_err();
        assert!(matches!(err, FrameError::PayloadWrite(_)));
        assert_eq!(writer.get_ref().data.len(), 4);
    }

    #[test]
    fn short_write_is_failure() {
        let mut writer = FrameWriter::new(ZeroWriter);
        let err = writer.send(b"x").unwrap_err();
        assert!(matches!(err, FrameError::HeaderWrite(e) if e.kind() == ErrorKind::WriteZero));
    }

    #[test]
    fn partial_writes_complete() {
        let mut writer = FrameWriter::new(OneByteWriter::default());
        writer.send(b"slow").unwrap();
        assert_eq!(
            writer.get_ref().data,
            vec![MARKER_1, MARKER_2, 0x00, 0x04, b's', b'l', b'o', b'w']
        );
    }

    #[test]
    fn flush_propagates() {
        let sink = FlushTrackingWriter::default();
        let flag = Arc::clone(&sink.flushed);
        let mut writer = FrameWriter::new(sink);

        writer.send(b"x").unwrap();

        assert!(flag.load(Ordering::SeqCst));
    }

    #[test]
    fn flush_failure_surfaces_as_io() {
        let mut writer = FrameWriter::new(FlushFails);
        let err = writer.send(b"x").unwrap_err();
        assert!(matches!(err, FrameError::Io(_)));
    }

    #[test]
    fn handles_interrupted_write_and_flush() {
        let writer_impl = InterruptedWriteThenFlush {
            wrote_once: false,
            flush_interrupted: false,
            data: Vec::new(),
        };

        let mut writer = FrameWriter::new(writer_impl);
        writer.send(b"retry").unwrap();

        let inner = writer.into_inner();
        assert_eq!(inner.data.len(), 4 + 5);
    }

    #[test]
    fn write_timeout_mid_frame_is_retried() {
        let mut writer = FrameWriter::new(StallingWriter {
            stalls: 3,
            data: Vec::new(),
        });
        writer.send(b"queued").unwrap();

        assert_eq!(
            writer.get_ref().data,
            Packet::new(b"queued").unwrap().as_bytes()
        );
    }

    #[test]
    fn written_bytes_read_back() {
        let payload = b"\x08\x01\x12\x04ping".to_vec();
        let mut writer = FrameWriter::new(Cursor::new(Vec::new()));
        writer.send(&payload).unwrap();

        let mut reader = FrameReader::new(Cursor::new(written(writer))).unwrap();
        let event = loop {
            if let Some(event) = reader.step().unwrap() {
                break event;
            }
        };
        match event {
            FrameEvent::Packet(packet) => assert_eq!(packet.payload(), payload.as_slice()),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn accessors_and_into_inner() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));

        let _ = writer.get_ref();
        let _ = writer.get_mut();
        let _inner = writer.into_inner();
    }

    /// Accepts `limit` bytes, then fails every write.
    struct FailAfter {
        limit: usize,
        data: Vec<u8>,
    }

    impl FailAfter {
        fn new(limit: usize) -> Self {
            Self {
                limit,
                data: Vec::new(),
            }
        }
    }

    impl Write for FailAfter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            let room = self.limit - self.data.len();
            if room == 0 {
                return Err(std::io::Error::from(ErrorKind::BrokenPipe));
            }
            let n = room.min(buf.len());
            self.data.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct ZeroWriter;

    impl Write for ZeroWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct OneByteWriter {
        data: Vec<u8>,
    }

    impl Write for OneByteWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.data.push(buf[0]);
            Ok(1)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct FlushTrackingWriter {
        flushed: Arc<AtomicBool>,
    }

    impl Write for FlushTrackingWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.flushed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FlushFails;

    impl Write for FlushFails {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::from(ErrorKind::BrokenPipe))
        }
    }

    /// Accepts two bytes per call, timing out `stalls` times in between.
    struct StallingWriter {
        stalls: usize,
        data: Vec<u8>,
    }

    impl Write for StallingWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if !self.data.is_empty() && self.stalls > 0 {
                self.stalls -= 1;
                return Err(std::io::Error::from(ErrorKind::TimedOut));
            }
            let n = buf.len().min(2);
            self.data.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct InterruptedWriteThenFlush {
        wrote_once: bool,
        flush_interrupted: bool,
        data: Vec<u8>,
    }

    impl Write for InterruptedWriteThenFlush {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if !self.wrote_once {
                self.wrote_once = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            if !self.flush_interrupted {
                self.flush_interrupted = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            Ok(())
        }
    }
}
