use core::fmt;

/// An error that occurs when input cannot be tokenized as CSV.
///
/// Every parse error carries the line and column (the 1-based field index
/// within its row) at which the problem was detected.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseError {
    kind: ParseErrorKind,
    line: u64,
    column: u64,
}

/// The specific type of a parse error.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParseErrorKind {
    /// A closing quote was followed by something other than a separator, a
    /// line terminator or another quote.
    UnescapedQuote {
        /// The quote byte in use.
        quote: u8,
    },
    /// The input ended inside a quoted field.
    ///
    /// The position reported is where the field started.
    UnterminatedQuote,
    /// A field is not valid UTF-8.
    InvalidUtf8 {
        /// The length of the longest valid UTF-8 prefix of the field.
        valid_up_to: usize,
    },
}

impl ParseError {
    pub(crate) fn new(kind: ParseErrorKind, line: u64, column: u64) -> ParseError {
        ParseError { kind: kind, line: line, column: column }
    }

    /// Return the specific type of this error.
    pub fn kind(&self) -> &ParseErrorKind {
        &self.kind
    }

    /// The line on which this error was detected.
    pub fn line(&self) -> u64 {
        self.line
    }

    /// The column (field index within the row, starting at 1) on which this
    /// error was detected.
    pub fn column(&self) -> u64 {
        self.column
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            ParseErrorKind::UnescapedQuote { quote } => write!(
                f,
                "unescaped {} character at line {}, column {}",
                quote as char, self.line, self.column
            ),
            ParseErrorKind::UnterminatedQuote => write!(
                f,
                "non-terminated quoted field at line {}, column {}",
                self.line, self.column
            ),
            ParseErrorKind::InvalidUtf8 { valid_up_to } => write!(
                f,
                "invalid UTF-8 at line {}, column {} near byte index {}",
                self.line, self.column, valid_up_to
            ),
        }
    }
}

impl std::error::Error for ParseError {}

/// An invalid tokenizer configuration.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ConfigError {
    /// The separator is `\n` or `\r`.
    SeparatorIsTerminator,
    /// The separator is the same byte as the quote while quoting is enabled.
    SeparatorIsQuote,
    /// The comment marker is `\n`, `\r` or the separator.
    InvalidCommentMarker(u8),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ConfigError::SeparatorIsTerminator => {
                write!(f, "separator cannot be a line terminator")
            }
            ConfigError::SeparatorIsQuote => {
                write!(f, "separator cannot be the quote character")
            }
            ConfigError::InvalidCommentMarker(b) => {
                write!(f, "invalid comment marker: {:?}", b as char)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
