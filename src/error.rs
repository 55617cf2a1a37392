use std::error;
use std::fmt;
use std::io;
use std::result;

use csvscan_core::{AdvanceError, ConfigError, ParseError, SplitError};

/// A type alias for `Result<T, csvscan::Error>`.
pub type Result<T> = result::Result<T, Error>;

/// An error that can occur when scanning, reading or writing CSV data.
///
/// Every error is fatal for the call that produced it: no partial field is
/// ever returned, and the scanner does not skip past the problem on its own.
#[derive(Debug)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub(crate) fn new(kind: ErrorKind) -> Error {
        Error(Box::new(kind))
    }

    /// Return the specific type of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.0
    }

    /// Unwrap this error into its underlying type.
    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    /// Returns true if this is an I/O error.
    ///
    /// If this is true, the underlying `ErrorKind` is guaranteed to be
    /// `ErrorKind::Io`.
    pub fn is_io_error(&self) -> bool {
        match *self.0 {
            ErrorKind::Io(_) => true,
            _ => false,
        }
    }

    /// The line on which this error occurred, if available.
    pub fn line(&self) -> Option<u64> {
        match *self.0 {
            ErrorKind::Parse(ref err) => Some(err.line()),
            _ => None,
        }
    }
}

/// The specific type of an error.
#[derive(Debug)]
pub enum ErrorKind {
    /// An I/O error that occurred while reading or writing CSV data.
    Io(io::Error),
    /// The scanner, reader or writer was configured inconsistently.
    Config {
        /// A description of the problem.
        msg: String,
    },
    /// The CSV data is malformed.
    Parse(ParseError),
    /// A single token did not fit in the largest buffer the scanner is
    /// allowed to allocate.
    TokenTooLong {
        /// The maximum token size, in bytes.
        max: usize,
    },
    /// A split function consumed more input than it was given.
    ///
    /// This indicates a bug in the split function.
    Advance(AdvanceError),
    /// A row was accessed in a way it does not support.
    Column(ColumnError),
    /// A field could not be converted to the type requested.
    Value {
        /// The index of the field, starting at 0.
        index: usize,
        /// The field's text.
        value: String,
        /// The reason the conversion failed.
        msg: String,
    },
    /// A field cannot be written without quoting, but quoting is disabled.
    Unwritable {
        /// The reason the field cannot be written.
        msg: &'static str,
    },
}

/// An error accessing a field of the current row.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ColumnError {
    /// There is no current row.
    NoRow,
    /// The index is past the last field of the current row.
    OutOfBounds {
        /// The index requested, starting at 0.
        index: usize,
        /// The number of fields in the current row.
        len: usize,
    },
    /// A column was requested by name, but no headers are known.
    NoHeaders,
    /// No header has the label requested.
    UnknownLabel(String),
    /// No header has the index requested.
    UnknownIndex(usize),
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::new(ErrorKind::Io(err))
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> io::Error {
        io::Error::new(io::ErrorKind::Other, err)
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Error {
        Error::new(ErrorKind::Parse(err))
    }
}

impl From<SplitError> for Error {
    fn from(err: SplitError) -> Error {
        match err {
            SplitError::Parse(err) => Error::new(ErrorKind::Parse(err)),
            SplitError::Advance(err) => Error::new(ErrorKind::Advance(err)),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Error {
        Error::new(ErrorKind::Config { msg: err.to_string() })
    }
}

impl From<ColumnError> for Error {
    fn from(err: ColumnError) -> Error {
        Error::new(ErrorKind::Column(err))
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self.0 {
            ErrorKind::Io(ref err) => Some(err),
            ErrorKind::Parse(ref err) => Some(err),
            ErrorKind::Advance(ref err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self.0 {
            ErrorKind::Io(ref err) => write!(f, "{}", err),
            ErrorKind::Config { ref msg } => {
                write!(f, "CSV configuration error: {}", msg)
            }
            ErrorKind::Parse(ref err) => write!(f, "CSV parse error: {}", err),
            ErrorKind::TokenTooLong { max } => write!(
                f,
                "CSV error: token too long (maximum token size is {} bytes)",
                max
            ),
            ErrorKind::Advance(ref err) => write!(f, "CSV error: {}", err),
            ErrorKind::Column(ref err) => write!(f, "CSV error: {}", err),
            ErrorKind::Value { index, ref value, ref msg } => write!(
                f,
                "CSV error: field {} ({:?}) could not be converted: {}",
                index, value, msg
            ),
            ErrorKind::Unwritable { msg } => {
                write!(f, "CSV write error: {}", msg)
            }
        }
    }
}

impl fmt::Display for ColumnError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ColumnError::NoRow => write!(f, "no current row"),
            ColumnError::OutOfBounds { index, len } => write!(
                f,
                "index out of bounds: field {} requested, row has {} fields",
                index, len
            ),
            ColumnError::NoHeaders => write!(f, "no headers"),
            ColumnError::UnknownLabel(ref label) => {
                write!(f, "no such column {:?}", label)
            }
            ColumnError::UnknownIndex(index) => {
                write!(f, "no header for column {}", index)
            }
        }
    }
}

impl error::Error for ColumnError {}
