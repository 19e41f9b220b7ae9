//! Response body decoration with a single canonical write path.
//!
//! # Responsibilities
//! - Wrap the underlying body sink for the lifetime of one response
//! - Funnel every write shape (single byte, whole buffer, sub-range) into
//!   one hook: [`WriteChunk::write_chunk`]
//! - Forward flush and close to the sink
//!
//! # Design Decisions
//! - The convenience writes are inherent methods on [`DecoratedStream`], so a
//!   hook cannot bypass the canonical path by overriding them
//! - `std::io::Write` is layered on `write_bytes`, which means `write!` and
//!   `write_all` reach the hook too
//! - Single writer: methods take `&mut self`, no internal locking

use std::io::{self, Write};

/// The one override point of a [`DecoratedStream`].
///
/// Every byte written through the decorator arrives here exactly once, as
/// `bytes[offset..offset + len]`, in call order. The range is validated before
/// the hook is invoked.
pub trait WriteChunk {
    fn write_chunk(
        &mut self,
        sink: &mut dyn Write,
        bytes: &[u8],
        offset: usize,
        len: usize,
    ) -> io::Result<()> {
        sink.write_all(&bytes[offset..offset + len])
    }
}

impl<T: WriteChunk + ?Sized> WriteChunk for Box<T> {
    fn write_chunk(
        &mut self,
        sink: &mut dyn Write,
        bytes: &[u8],
        offset: usize,
        len: usize,
    ) -> io::Result<()> {
        (**self).write_chunk(sink, bytes, offset, len)
    }
}

/// Hook that forwards bytes untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl WriteChunk for Passthrough {}

/// Hook that counts forwarded bytes and reports them as a metric.
#[derive(Debug, Default)]
pub struct ByteCounter {
    written: u64,
}

impl ByteCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn written(&self) -> u64 {
        self.written
    }
}

impl WriteChunk for ByteCounter {
    fn write_chunk(
        &mut self,
        sink: &mut dyn Write,
        bytes: &[u8],
        offset: usize,
        len: usize,
    ) -> io::Result<()> {
        sink.write_all(&bytes[offset..offset + len])?;
        self.written += len as u64;
        crate::observability::metrics::record_body_bytes(len);
        Ok(())
    }
}

/// Decorates an underlying sink so all writes pass through a [`WriteChunk`].
#[derive(Debug)]
pub struct DecoratedStream<W, C = Passthrough> {
    sink: Option<W>,
    chunk: C,
    single: [u8; 1],
    closed: bool,
}

impl<W: Write, C: WriteChunk> DecoratedStream<W, C> {
    /// Decorate a sink.
    pub fn new(sink: W, chunk: C) -> Self {
        Self {
            sink: Some(sink),
            chunk,
            single: [0],
            closed: false,
        }
    }

    /// Create a decorator whose sink is supplied later with [`bind`](Self::bind).
    pub fn unbound(chunk: C) -> Self {
        Self {
            sink: None,
            chunk,
            single: [0],
            closed: false,
        }
    }

    /// Attach the underlying sink. Fails if one is already bound.
    pub fn bind(&mut self, sink: W) -> io::Result<()> {
        if self.sink.is_some() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "stream decorator is already bound to a sink",
            ));
        }
        self.sink = Some(sink);
        Ok(())
    }

    pub fn is_bound(&self) -> bool {
        self.sink.is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// The canonical write: `bytes[offset..offset + len]`.
    pub fn write_range(&mut self, bytes: &[u8], offset: usize, len: usize) -> io::Result<()> {
        match offset.checked_add(len) {
            Some(end) if end <= bytes.len() => {}
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!(
                        "write range {offset}+{len} out of bounds for buffer of {}",
                        bytes.len()
                    ),
                ))
            }
        }
        if self.closed {
            return Err(closed_error());
        }
        let sink = self.sink.as_mut().ok_or_else(unbound_error)?;
        self.chunk.write_chunk(sink, bytes, offset, len)
    }

    /// Write a whole buffer through [`write_range`](Self::write_range).
    pub fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.write_range(bytes, 0, bytes.len())
    }

    /// Write one byte through [`write_range`](Self::write_range).
    pub fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        self.single[0] = byte;
        let single = self.single;
        self.write_range(&single, 0, 1)
    }

    /// Flush the sink and refuse further writes. Closing twice is a no-op.
    ///
    /// `io::Write` has no close of its own: flushing is the sink's close, and
    /// the sink itself is released by [`into_inner`](Self::into_inner) or drop.
    pub fn close(&mut self) -> io::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.open_sink()?.flush()?;
        self.closed = true;
        Ok(())
    }

    pub fn chunk(&self) -> &C {
        &self.chunk
    }

    pub fn chunk_mut(&mut self) -> &mut C {
        &mut self.chunk
    }

    pub fn sink(&self) -> Option<&W> {
        self.sink.as_ref()
    }

    /// Release the underlying sink.
    pub fn into_inner(self) -> Option<W> {
        self.sink
    }

    fn open_sink(&mut self) -> io::Result<&mut W> {
        if self.closed {
            return Err(closed_error());
        }
        self.sink.as_mut().ok_or_else(unbound_error)
    }
}

fn closed_error() -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "stream decorator is closed")
}

fn unbound_error() -> io::Error {
    io::Error::new(
        io::ErrorKind::NotConnected,
        "stream decorator has no underlying sink",
    )
}

impl<W: Write, C: WriteChunk> Write for DecoratedStream<W, C> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_bytes(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.open_sink()?.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records what reaches the hook, separately from what reaches the sink.
    #[derive(Default)]
    struct Recorder {
        seen: Vec<u8>,
        calls: usize,
    }

    impl WriteChunk for Recorder {
        fn write_chunk(
            &mut self,
            sink: &mut dyn Write,
            bytes: &[u8],
            offset: usize,
            len: usize,
        ) -> io::Result<()> {
            self.calls += 1;
            self.seen.extend_from_slice(&bytes[offset..offset + len]);
            sink.write_all(&bytes[offset..offset + len])
        }
    }

    #[test]
    fn every_write_shape_reaches_the_hook_in_order() {
        let mut stream = DecoratedStream::new(Vec::new(), Recorder::default());

        stream.write_byte(b'<').unwrap();
        stream.write_bytes(b"feed").unwrap();
        stream.write_range(b"xx id='7' yy", 2, 7).unwrap();
        stream.write_byte(b'/').unwrap();
        write!(stream, ">{}", 42).unwrap();
        stream.write_all(b"!").unwrap();

        let expected = b"<feed id='7'/>42!".to_vec();
        assert_eq!(stream.chunk().seen, expected);
        assert_eq!(stream.into_inner().unwrap(), expected);
    }

    #[test]
    fn random_write_mixes_reach_the_hook_intact() {
        for seed in 0..200 {
            let mut rng = fastrand::Rng::with_seed(seed);
            let mut stream = DecoratedStream::new(Vec::new(), Recorder::default());
            let mut expected = Vec::new();

            for _ in 0..rng.usize(0..40) {
                let buffer: Vec<u8> = (0..rng.usize(0..16)).map(|_| rng.u8(..)).collect();
                match rng.u8(0..4) {
                    0 => {
                        let byte = rng.u8(..);
                        stream.write_byte(byte).unwrap();
                        expected.push(byte);
                    }
                    1 => {
                        stream.write_bytes(&buffer).unwrap();
                        expected.extend_from_slice(&buffer);
                    }
                    2 => {
                        let offset = rng.usize(0..=buffer.len());
                        let len = rng.usize(0..=buffer.len() - offset);
                        stream.write_range(&buffer, offset, len).unwrap();
                        expected.extend_from_slice(&buffer[offset..offset + len]);
                    }
                    _ => {
                        stream.write_all(&buffer).unwrap();
                        expected.extend_from_slice(&buffer);
                    }
                }
            }

            assert_eq!(stream.chunk().seen, expected, "seed {seed}");
            assert_eq!(stream.into_inner().unwrap(), expected, "seed {seed}");
        }
    }

    #[test]
    fn single_byte_is_one_chunk_of_length_one() {
        let mut stream = DecoratedStream::new(Vec::new(), Recorder::default());
        stream.write_byte(0xff).unwrap();
        stream.write_byte(0x00).unwrap();
        assert_eq!(stream.chunk().calls, 2);
        assert_eq!(stream.chunk().seen, vec![0xff, 0x00]);
    }

    #[test]
    fn empty_buffer_is_a_zero_length_chunk() {
        let mut stream = DecoratedStream::new(Vec::new(), Recorder::default());
        stream.write_bytes(b"").unwrap();
        assert_eq!(stream.chunk().calls, 1);
        assert!(stream.chunk().seen.is_empty());
    }

    #[test]
    fn out_of_range_write_is_rejected_before_the_hook() {
        let mut stream = DecoratedStream::new(Vec::new(), Recorder::default());
        let err = stream.write_range(b"abc", 2, 2).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        let err = stream.write_range(b"abc", usize::MAX, 2).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert_eq!(stream.chunk().calls, 0);
    }

    #[test]
    fn unbound_stream_fails_until_bound() {
        let mut stream: DecoratedStream<Vec<u8>, Passthrough> =
            DecoratedStream::unbound(Passthrough);
        assert!(!stream.is_bound());
        let err = stream.write_bytes(b"data").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotConnected);

        stream.bind(Vec::new()).unwrap();
        stream.write_bytes(b"data").unwrap();
        let err = stream.bind(Vec::new()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(stream.sink().unwrap(), b"data");
    }

    #[test]
    fn writes_after_close_fail() {
        let mut stream = DecoratedStream::new(Vec::new(), Passthrough);
        stream.write_bytes(b"done").unwrap();
        stream.close().unwrap();
        stream.close().unwrap();
        assert!(stream.is_closed());
        let err = stream.write_byte(b'x').unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(stream.into_inner().unwrap(), b"done");
    }

    /// Sink that counts flushes.
    #[derive(Default)]
    struct FlushCounter {
        data: Vec<u8>,
        flushes: usize,
    }

    impl Write for FlushCounter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.flushes += 1;
            Ok(())
        }
    }

    #[test]
    fn close_flushes_the_sink_once() {
        let mut stream = DecoratedStream::new(FlushCounter::default(), Passthrough);
        stream.write_bytes(b"<feed/>").unwrap();
        assert_eq!(stream.sink().unwrap().flushes, 0);

        stream.close().unwrap();
        stream.close().unwrap();
        assert_eq!(stream.sink().unwrap().flushes, 1);
        assert_eq!(stream.flush().unwrap_err().kind(), io::ErrorKind::BrokenPipe);

        let sink = stream.into_inner().unwrap();
        assert_eq!(sink.data, b"<feed/>");
    }

    #[test]
    fn byte_counter_counts_all_shapes() {
        let mut stream = DecoratedStream::new(Vec::new(), ByteCounter::new());
        stream.write_byte(1).unwrap();
        stream.write_bytes(&[2, 3, 4]).unwrap();
        stream.write_range(&[5, 6, 7, 8], 1, 2).unwrap();
        assert_eq!(stream.chunk().written(), 6);
    }
}
