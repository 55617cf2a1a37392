use std::cmp;
use std::io;

use log::{debug, trace};

use crate::error::{Error, ErrorKind, Result};

/// The default size of a fresh buffer, in bytes.
pub const DEFAULT_CAPACITY: usize = 4 * 1024;

/// The default upper bound on the buffer, and therefore on a single token.
pub const DEFAULT_MAX_TOKEN_SIZE: usize = 64 * 1024;

/// A growable window over input that has been read but not yet consumed.
///
/// Bytes in `buf[start..end]` are unconsumed. Capacity starts small and is
/// doubled on demand, but never beyond `max`. A token that does not fit in a
/// buffer of `max` bytes cannot be scanned.
#[derive(Debug)]
pub struct Buffer {
    buf: Vec<u8>,
    start: usize,
    end: usize,
    max: usize,
    eof: bool,
}

impl Buffer {
    /// Create a buffer with the given initial and maximum capacity.
    ///
    /// Both sizes must be non-zero. The initial capacity is clamped to the
    /// maximum.
    pub fn new(capacity: usize, max: usize) -> Buffer {
        debug_assert!(capacity > 0 && max > 0);
        Buffer {
            buf: vec![0; cmp::min(capacity, max)],
            start: 0,
            end: 0,
            max: max,
            eof: false,
        }
    }

    /// The unconsumed bytes.
    #[inline]
    pub fn window(&self) -> &[u8] {
        &self.buf[self.start..self.end]
    }

    /// The number of unconsumed bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether the source reported the end of its input.
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.eof
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn max(&self) -> usize {
        self.max
    }

    /// Mark `n` bytes at the front of the window as consumed.
    #[inline]
    pub fn consume(&mut self, n: usize) {
        debug_assert!(n <= self.len());
        self.start += n;
        if self.start == self.end {
            self.start = 0;
            self.end = 0;
        }
    }

    /// Read more input from `rdr` into the tail of the buffer.
    ///
    /// Unconsumed bytes are moved to the front first when that frees enough
    /// room. If the buffer is still full it is doubled. A read of zero bytes
    /// marks the end of input.
    pub fn fill<R: io::Read>(&mut self, rdr: &mut R) -> Result<()> {
        let cap = self.buf.len();
        if self.start > 0 && (self.end == cap || self.start > cap / 2) {
            trace!(
                "shifting {} unconsumed bytes from offset {}",
                self.len(),
                self.start
            );
            self.buf.copy_within(self.start..self.end, 0);
            self.end -= self.start;
            self.start = 0;
        }
        if self.end == cap {
            if cap >= self.max {
                // A pending token of exactly `max` bytes is fine if nothing
                // follows it.
                if read_retrying(rdr, &mut [0u8; 1])? == 0 {
                    trace!("source exhausted with a full buffer");
                    self.eof = true;
                    return Ok(());
                }
                return Err(Error::new(ErrorKind::TokenTooLong {
                    max: self.max,
                }));
            }
            let grown = cmp::min(cap.saturating_mul(2), self.max);
            debug!("growing scan buffer from {} to {} bytes", cap, grown);
            self.buf.resize(grown, 0);
        }
        match read_retrying(rdr, &mut self.buf[self.end..])? {
            0 => {
                trace!("source exhausted with {} bytes pending", self.len());
                self.eof = true;
            }
            n => self.end += n,
        }
        Ok(())
    }

    /// Forget all buffered input and the end of input flag.
    ///
    /// The allocation is kept.
    pub fn reset(&mut self) {
        self.start = 0;
        self.end = 0;
        self.eof = false;
    }
}

fn read_retrying<R: io::Read>(rdr: &mut R, buf: &mut [u8]) -> Result<usize> {
    loop {
        match rdr.read(buf) {
            Ok(n) => return Ok(n),
            Err(ref err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => return Err(Error::from(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use crate::error::ErrorKind;

    use super::Buffer;

    /// A source that hands out at most `n` bytes per read and is interrupted
    /// before every successful read.
    struct Stingy<'a> {
        data: &'a [u8],
        n: usize,
        interrupt: bool,
    }

    impl<'a> io::Read for Stingy<'a> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.interrupt = !self.interrupt;
            if self.interrupt {
                return Err(io::Error::new(io::ErrorKind::Interrupted, "again"));
            }
            let n = self.n.min(buf.len()).min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    #[test]
    fn fill_reads_until_eof() {
        let mut rdr = &b"abcdef"[..];
        let mut buf = Buffer::new(4, 16);
        buf.fill(&mut rdr).unwrap();
        assert_eq!(buf.window(), b"abcd");
        buf.fill(&mut rdr).unwrap();
        assert_eq!(buf.window(), b"abcdef");
        assert_eq!(buf.capacity(), 8);
        assert!(!buf.is_eof());
        buf.fill(&mut rdr).unwrap();
        assert!(buf.is_eof());
        assert_eq!(buf.window(), b"abcdef");
    }

    #[test]
    fn consumed_bytes_are_reclaimed_before_growing() {
        let mut rdr = &b"abcdefgh"[..];
        let mut buf = Buffer::new(4, 4);
        buf.fill(&mut rdr).unwrap();
        buf.consume(3);
        buf.fill(&mut rdr).unwrap();
        assert_eq!(buf.window(), b"defg");
        assert_eq!(buf.capacity(), 4);
    }

    #[test]
    fn full_buffer_at_max_is_too_long() {
        let mut rdr = &b"abcdefgh"[..];
        let mut buf = Buffer::new(2, 4);
        buf.fill(&mut rdr).unwrap();
        buf.fill(&mut rdr).unwrap();
        assert_eq!(buf.window(), b"abcd");
        let err = buf.fill(&mut rdr).unwrap_err();
        match *err.kind() {
            ErrorKind::TokenTooLong { max } => assert_eq!(max, 4),
            ref kind => panic!("unexpected error: {:?}", kind),
        }
    }

    #[test]
    fn full_buffer_at_max_then_eof() {
        let mut rdr = Stingy { data: b"abcd", n: 4, interrupt: false };
        let mut buf = Buffer::new(4, 4);
        buf.fill(&mut rdr).unwrap();
        assert_eq!(buf.window(), b"abcd");
        assert!(!buf.is_eof());
        buf.fill(&mut rdr).unwrap();
        assert!(buf.is_eof());
        assert_eq!(buf.window(), b"abcd");
    }

    #[test]
    fn initial_capacity_clamped_to_max() {
        let buf = Buffer::new(100, 10);
        assert_eq!(buf.capacity(), 10);
        assert_eq!(buf.max(), 10);
    }

    #[test]
    fn interrupted_reads_are_retried() {
        let mut rdr = Stingy { data: b"xyz", n: 1, interrupt: false };
        let mut buf = Buffer::new(8, 8);
        while !buf.is_eof() {
            buf.fill(&mut rdr).unwrap();
        }
        assert_eq!(buf.window(), b"xyz");
    }

    #[test]
    fn consuming_everything_rewinds() {
        let mut rdr = &b"ab"[..];
        let mut buf = Buffer::new(4, 4);
        buf.fill(&mut rdr).unwrap();
        buf.consume(2);
        assert!(buf.is_empty());
        assert_eq!(buf.len(), 0);
        buf.reset();
        assert!(!buf.is_eof());
    }
}
