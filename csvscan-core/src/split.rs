use core::fmt;

use crate::error::ParseError;

/// The unconsumed input handed to a split function.
///
/// A window is a view of the bytes that a scanner has read but not yet
/// consumed. A split function inspects the window with `as_bytes` and, once it
/// has recognized something, commits consumption of a prefix with `advance`.
/// Bytes that are not consumed are presented again, possibly with more input
/// appended, on the next call.
#[derive(Debug)]
pub struct Window<'a> {
    data: &'a [u8],
    consumed: usize,
}

impl<'a> Window<'a> {
    /// Create a window over the given unconsumed bytes.
    pub fn new(data: &'a [u8]) -> Window<'a> {
        Window { data: data, consumed: 0 }
    }

    /// The bytes in this window that have not been consumed.
    pub fn as_bytes(&self) -> &'a [u8] {
        let data = self.data;
        &data[self.consumed..]
    }

    /// The number of bytes in this window that have not been consumed.
    pub fn len(&self) -> usize {
        self.data.len() - self.consumed
    }

    /// Returns true if and only if every byte in this window was consumed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The total number of bytes consumed through this window.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Consume `n` bytes from the front of this window.
    ///
    /// This fails when `n` is larger than the number of unconsumed bytes. A
    /// failure here is a bug in the split function, not a problem with the
    /// data being scanned.
    pub fn advance(&mut self, n: usize) -> Result<(), AdvanceError> {
        let available = self.len();
        if n > available {
            return Err(AdvanceError { requested: n, available: available });
        }
        self.consumed += n;
        Ok(())
    }
}

/// The result of asking a split function for one token.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SplitResult<T> {
    /// A complete token was found.
    Token(T),
    /// No token could be produced from the current window.
    ///
    /// If the split function consumed part of the window (for example, a
    /// comment line), the scanner calls it again right away. Otherwise the
    /// scanner reads more input before trying again.
    NeedMore,
}

/// A routine that carves tokens out of a growing window of input.
///
/// This is the seam between a scanner, which knows how to manage buffers and
/// read from a source, and a token format, which knows where tokens begin and
/// end. Implementations must be resumable: when `NeedMore` is returned
/// without consuming anything, the next call sees the same bytes at the front
/// of the window and must make the same decisions about them.
pub trait Split {
    /// The type of token produced.
    type Token;

    /// Produce at most one token from `window`.
    ///
    /// `at_eof` is true when no more input will ever be appended to the
    /// window.
    fn split(
        &mut self,
        window: &mut Window,
        at_eof: bool,
    ) -> Result<SplitResult<Self::Token>, SplitError>;

    /// Reset any state carried between calls to `split`.
    ///
    /// Scanners call this when they are rebound to a new source.
    fn reset(&mut self) {}
}

/// An error returned by a split function.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SplitError {
    /// The input could not be tokenized.
    Parse(ParseError),
    /// The split function tried to consume more than it was given.
    Advance(AdvanceError),
}

impl From<ParseError> for SplitError {
    fn from(err: ParseError) -> SplitError {
        SplitError::Parse(err)
    }
}

impl From<AdvanceError> for SplitError {
    fn from(err: AdvanceError) -> SplitError {
        SplitError::Advance(err)
    }
}

impl fmt::Display for SplitError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            SplitError::Parse(ref err) => write!(f, "{}", err),
            SplitError::Advance(ref err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for SplitError {}

/// A split function asked to consume more bytes than its window holds.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AdvanceError {
    requested: usize,
    available: usize,
}

impl AdvanceError {
    /// The number of bytes the split function tried to consume.
    pub fn requested(&self) -> usize {
        self.requested
    }

    /// The number of unconsumed bytes that were in the window.
    pub fn available(&self) -> usize {
        self.available
    }
}

impl fmt::Display for AdvanceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "split function advanced {} bytes beyond input of {} bytes",
            self.requested, self.available
        )
    }
}

impl std::error::Error for AdvanceError {}
