use std::borrow::Cow;

use bstr::ByteSlice;
use memchr::{memchr, memchr2};

use crate::error::{ConfigError, ParseError, ParseErrorKind};
use crate::split::{Split, SplitError, SplitResult, Window};

/// Position bookkeeping carried from one field to the next.
///
/// This is the only state a tokenizer keeps between calls to `split`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Session {
    line: u64,
    column: u64,
    end_of_row: bool,
}

impl Default for Session {
    fn default() -> Session {
        Session { line: 1, column: 0, end_of_row: true }
    }
}

impl Session {
    /// The current line, starting at 1.
    ///
    /// This is incremented for every line feed consumed, including those
    /// inside quoted fields and comment lines.
    pub fn line(&self) -> u64 {
        self.line
    }

    /// The column of the most recent field, starting at 1.
    ///
    /// This is `0` before any field has been produced.
    pub fn column(&self) -> u64 {
        self.column
    }

    /// Whether the most recent field was terminated by a line terminator
    /// (or the end of input) rather than by a separator.
    pub fn is_end_of_row(&self) -> bool {
        self.end_of_row
    }
}

/// Builds a CSV tokenizer with various configuration knobs.
///
/// The separator and quoting mode are fixed once a `Tokenizer` is built.
/// Trimming, the comment marker and empty line skipping may still be changed
/// on the tokenizer itself.
#[derive(Debug, Default)]
pub struct TokenizerBuilder {
    tok: Tokenizer,
}

impl TokenizerBuilder {
    /// Create a new builder.
    pub fn new() -> TokenizerBuilder {
        TokenizerBuilder::default()
    }

    /// Build a CSV tokenizer from this configuration.
    ///
    /// This fails when the separator, quote and comment marker conflict with
    /// each other or with the line terminators.
    pub fn build(&self) -> Result<Tokenizer, ConfigError> {
        let tok = self.tok.clone();
        if tok.delimiter == b'\n' || tok.delimiter == b'\r' {
            return Err(ConfigError::SeparatorIsTerminator);
        }
        if tok.quoting && tok.delimiter == tok.quote {
            return Err(ConfigError::SeparatorIsQuote);
        }
        if let Some(c) = tok.comment {
            if c == b'\n' || c == b'\r' || c == tok.delimiter {
                return Err(ConfigError::InvalidCommentMarker(c));
            }
        }
        Ok(tok)
    }

    /// The field separator to use when tokenizing.
    ///
    /// The default is `b','`.
    pub fn delimiter(&mut self, delimiter: u8) -> &mut TokenizerBuilder {
        self.tok.delimiter = delimiter;
        self
    }

    /// Whether fields may be enclosed in quotes.
    ///
    /// When enabled (the default), a field starting with the quote character
    /// may contain separators, line terminators and doubled quotes. When
    /// disabled, quotes are ordinary data and fields can never contain a
    /// separator or a line feed.
    pub fn quoting(&mut self, yes: bool) -> &mut TokenizerBuilder {
        self.tok.quoting = yes;
        self
    }

    /// The quote character to use when quoting is enabled.
    ///
    /// The default is `b'"'`.
    pub fn quote(&mut self, quote: u8) -> &mut TokenizerBuilder {
        self.tok.quote = quote;
        self
    }

    /// Whether to strip surrounding whitespace from unquoted fields.
    ///
    /// This is disabled by default.
    pub fn trim(&mut self, yes: bool) -> &mut TokenizerBuilder {
        self.tok.trim = yes;
        self
    }

    /// The byte marking a comment line, if any.
    ///
    /// A row starting with this byte is discarded up to and including the
    /// next line feed. The default is `None`.
    pub fn comment(&mut self, comment: Option<u8>) -> &mut TokenizerBuilder {
        self.tok.comment = comment;
        self
    }

    /// Whether rows made of a single empty, unquoted field are skipped.
    ///
    /// This is enabled by default.
    pub fn skip_empty_lines(&mut self, yes: bool) -> &mut TokenizerBuilder {
        self.tok.skip_empty_lines = yes;
        self
    }
}

/// A split function for CSV data.
///
/// Each call to `split` produces at most one field. Whether that field ended
/// its row is reported by `is_end_of_row`.
///
/// The grammar resembles [RFC 4180](https://tools.ietf.org/html/rfc4180):
///
/// * Rows end with `\n` or `\r\n`. A bare `\r` inside an unquoted field is
///   data.
/// * When quoting is enabled, a field that begins with a quote runs until a
///   closing quote followed by a separator or a line terminator. Inside it,
///   two consecutive quotes stand for one literal quote. A closing quote
///   followed by anything else is an error.
/// * A quote that appears anywhere other than at the start of a field is
///   ordinary data.
/// * Comment lines, when enabled, are dropped entirely.
#[derive(Clone, Debug)]
pub struct Tokenizer {
    delimiter: u8,
    quoting: bool,
    quote: u8,
    trim: bool,
    comment: Option<u8>,
    skip_empty_lines: bool,
    session: Session,
}

impl Default for Tokenizer {
    fn default() -> Tokenizer {
        Tokenizer {
            delimiter: b',',
            quoting: true,
            quote: b'"',
            trim: false,
            comment: None,
            skip_empty_lines: true,
            session: Session::default(),
        }
    }
}

/// A field located in the window but not yet materialized.
#[derive(Debug)]
struct Found {
    start: usize,
    end: usize,
    consumed: usize,
    end_of_row: bool,
    lines: u64,
    /// The number of doubled quotes, if the field was quoted.
    escapes: Option<usize>,
}

#[derive(Debug)]
enum Scan {
    Field(Found),
    Skip { consumed: usize, lines: u64 },
    NeedMore,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Quoted {
    Inside,
    Closing,
    ClosingCr,
}

impl Tokenizer {
    /// Create a tokenizer with the default configuration.
    pub fn new() -> Tokenizer {
        Tokenizer::default()
    }

    /// The current position of this tokenizer.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The current line, starting at 1.
    pub fn line(&self) -> u64 {
        self.session.line
    }

    /// The column of the most recent field, starting at 1.
    pub fn column(&self) -> u64 {
        self.session.column
    }

    /// Whether the most recent field ended its row.
    pub fn is_end_of_row(&self) -> bool {
        self.session.end_of_row
    }

    /// The field separator.
    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    /// Whether quoted fields are recognized.
    pub fn is_quoting(&self) -> bool {
        self.quoting
    }

    /// Enable or disable trimming of unquoted fields.
    pub fn set_trim(&mut self, yes: bool) {
        self.trim = yes;
    }

    /// Set the comment marker and return the previous one.
    ///
    /// `None` disables comments.
    pub fn set_comment_marker(&mut self, comment: Option<u8>) -> Option<u8> {
        std::mem::replace(&mut self.comment, comment)
    }

    /// Enable or disable skipping of empty lines.
    pub fn set_skip_empty_lines(&mut self, yes: bool) {
        self.skip_empty_lines = yes;
    }

    fn split_field(
        &mut self,
        window: &mut Window,
        at_eof: bool,
    ) -> Result<SplitResult<String>, SplitError> {
        let data = window.as_bytes();
        let found = match self.scan(data, at_eof)? {
            Scan::NeedMore => return Ok(SplitResult::NeedMore),
            Scan::Skip { consumed, lines } => {
                window.advance(consumed)?;
                self.session.line += lines;
                return Ok(SplitResult::NeedMore);
            }
            Scan::Field(found) => found,
        };
        let field = self.finish(data, &found)?;
        window.advance(found.consumed)?;
        self.session.line += found.lines;
        self.session.end_of_row = found.end_of_row;
        Ok(match field {
            Some(field) => SplitResult::Token(field),
            None => SplitResult::NeedMore,
        })
    }

    fn scan(&self, data: &[u8], at_eof: bool) -> Result<Scan, ParseError> {
        if data.is_empty() {
            if !at_eof || self.session.end_of_row {
                return Ok(Scan::NeedMore);
            }
            // A separator right before the end of input.
            return Ok(Scan::Field(Found {
                start: 0,
                end: 0,
                consumed: 0,
                end_of_row: true,
                lines: 0,
                escapes: None,
            }));
        }
        if self.quoting && data[0] == self.quote {
            self.scan_quoted(data, at_eof)
        } else if self.session.end_of_row && self.comment == Some(data[0]) {
            Ok(scan_comment(data, at_eof))
        } else {
            Ok(self.scan_unquoted(data, at_eof))
        }
    }

    fn scan_quoted(&self, data: &[u8], at_eof: bool) -> Result<Scan, ParseError> {
        let field = |end, consumed, end_of_row, lines, escapes| {
            Scan::Field(Found {
                start: 1,
                end: end,
                consumed: consumed,
                end_of_row: end_of_row,
                lines: lines,
                escapes: Some(escapes),
            })
        };
        let mut state = Quoted::Inside;
        let (mut lines, mut escapes) = (0, 0);
        let mut i = 1;
        while i < data.len() {
            match state {
                Quoted::Inside => {
                    match memchr2(self.quote, b'\n', &data[i..]) {
                        None => break,
                        Some(offset) => {
                            i += offset;
                            if data[i] == self.quote {
                                state = Quoted::Closing;
                            } else {
                                lines += 1;
                            }
                        }
                    }
                }
                Quoted::Closing => {
                    let b = data[i];
                    if b == self.quote {
                        escapes += 1;
                        state = Quoted::Inside;
                    } else if b == self.delimiter {
                        return Ok(field(i - 1, i + 1, false, lines, escapes));
                    } else if b == b'\n' {
                        return Ok(field(i - 1, i + 1, true, lines + 1, escapes));
                    } else if b == b'\r' {
                        state = Quoted::ClosingCr;
                    } else {
                        return Err(self.unescaped_quote(lines));
                    }
                }
                Quoted::ClosingCr => {
                    if data[i] == b'\n' {
                        return Ok(field(i - 2, i + 1, true, lines + 1, escapes));
                    }
                    return Err(self.unescaped_quote(lines));
                }
            }
            i += 1;
        }
        if !at_eof {
            return Ok(Scan::NeedMore);
        }
        let n = data.len();
        match state {
            Quoted::Closing => Ok(field(n - 1, n, true, lines, escapes)),
            Quoted::ClosingCr => Ok(field(n - 2, n, true, lines, escapes)),
            Quoted::Inside => Err(ParseError::new(
                ParseErrorKind::UnterminatedQuote,
                self.session.line,
                self.session.column,
            )),
        }
    }

    fn scan_unquoted(&self, data: &[u8], at_eof: bool) -> Scan {
        let field = |end, consumed, end_of_row, lines| {
            Scan::Field(Found {
                start: 0,
                end: end,
                consumed: consumed,
                end_of_row: end_of_row,
                lines: lines,
                escapes: None,
            })
        };
        match memchr2(self.delimiter, b'\n', data) {
            Some(i) if data[i] == self.delimiter => field(i, i + 1, false, 0),
            Some(i) => field(strip_cr(data, i), i + 1, true, 1),
            None if at_eof => field(strip_cr(data, data.len()), data.len(), true, 0),
            None => Scan::NeedMore,
        }
    }

    /// Materialize a field, or return `None` if it is an empty line that
    /// should be skipped.
    fn finish(
        &self,
        data: &[u8],
        found: &Found,
    ) -> Result<Option<String>, ParseError> {
        let raw = &data[found.start..found.end];
        let field: Cow<[u8]> = match found.escapes {
            None if self.trim => Cow::Borrowed(raw.trim()),
            None | Some(0) => Cow::Borrowed(raw),
            Some(n) => Cow::Owned(unescape(raw, self.quote, n)),
        };
        if self.skip_empty_lines
            && found.escapes.is_none()
            && found.end_of_row
            && field.is_empty()
            && self.session.column == 1
        {
            return Ok(None);
        }
        String::from_utf8(field.into_owned()).map(Some).map_err(|err| {
            let valid_up_to = err.utf8_error().valid_up_to();
            ParseError::new(
                ParseErrorKind::InvalidUtf8 { valid_up_to: valid_up_to },
                self.session.line,
                self.session.column,
            )
        })
    }

    fn unescaped_quote(&self, lines: u64) -> ParseError {
        ParseError::new(
            ParseErrorKind::UnescapedQuote { quote: self.quote },
            self.session.line + lines,
            self.session.column,
        )
    }
}

impl Split for Tokenizer {
    type Token = String;

    fn split(
        &mut self,
        window: &mut Window,
        at_eof: bool,
    ) -> Result<SplitResult<String>, SplitError> {
        let column = self.session.column;
        if self.session.end_of_row {
            self.session.column = 1;
        } else {
            self.session.column += 1;
        }
        let res = self.split_field(window, at_eof);
        // Columns only count fields that were actually produced.
        match res {
            Ok(SplitResult::Token(_)) => {}
            _ => self.session.column = column,
        }
        res
    }

    fn reset(&mut self) {
        self.session = Session::default();
    }
}

fn scan_comment(data: &[u8], at_eof: bool) -> Scan {
    match memchr(b'\n', data) {
        Some(i) => Scan::Skip { consumed: i + 1, lines: 1 },
        None if at_eof => Scan::Skip { consumed: data.len(), lines: 0 },
        None => Scan::NeedMore,
    }
}

fn strip_cr(data: &[u8], end: usize) -> usize {
    if end > 0 && data[end - 1] == b'\r' {
        end - 1
    } else {
        end
    }
}

/// Collapse every doubled quote in `raw` into a single quote.
///
/// Every quote in the body of a well formed quoted field is the first half
/// of a pair, so the byte after it can be dropped without looking at it.
fn unescape(raw: &[u8], quote: u8, escapes: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len() - escapes);
    let mut rest = raw;
    while let Some(i) = memchr(quote, rest) {
        out.extend_from_slice(&rest[..i + 1]);
        rest = &rest[i + 2..];
    }
    out.extend_from_slice(rest);
    out
}
