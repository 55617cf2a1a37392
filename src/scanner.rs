use std::fmt;
use std::io;
use std::mem;
use std::str::FromStr;

use csvscan_core::{Split, SplitResult, Tokenizer, TokenizerBuilder, Window};

use crate::buffer::{Buffer, DEFAULT_CAPACITY, DEFAULT_MAX_TOKEN_SIZE};
use crate::error::{Error, ErrorKind, Result};

/// Builds a scanner with various configuration knobs.
///
/// This builder covers both the buffer (how much memory a scanner may use)
/// and, for CSV scanners, the tokenizer (how fields are recognized).
///
/// # Example
///
/// ```
/// use csvscan::ScannerBuilder;
///
/// # fn example() -> csvscan::Result<()> {
/// let data = "# tab separated\nname\tcity\n  Boston \tUSA\n";
/// let mut scanner = ScannerBuilder::new()
///     .delimiter(b'\t')
///     .comment(Some(b'#'))
///     .trim(true)
///     .from_reader(data.as_bytes())?;
///
/// let mut row = vec![];
/// scanner.scan_row(&mut row)?;
/// assert_eq!(row, vec!["name", "city"]);
/// scanner.scan_row(&mut row)?;
/// assert_eq!(row, vec!["Boston", "USA"]);
/// assert_eq!(scanner.scan_row(&mut row)?, 0);
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
#[derive(Debug)]
pub struct ScannerBuilder {
    capacity: usize,
    max_token_size: usize,
    tok: TokenizerBuilder,
}

impl Default for ScannerBuilder {
    fn default() -> ScannerBuilder {
        ScannerBuilder {
            capacity: DEFAULT_CAPACITY,
            max_token_size: DEFAULT_MAX_TOKEN_SIZE,
            tok: TokenizerBuilder::new(),
        }
    }
}

impl ScannerBuilder {
    /// Create a new builder for configuring scanners.
    ///
    /// To convert a builder into a scanner, call one of the methods starting
    /// with `from_`.
    pub fn new() -> ScannerBuilder {
        ScannerBuilder::default()
    }

    /// Build a CSV scanner from this configuration that reads from `rdr`.
    ///
    /// This fails if the buffer sizes or the tokenizer settings are
    /// inconsistent.
    pub fn from_reader<R: io::Read>(&self, rdr: R) -> Result<CsvScanner<R>> {
        let tok = self.tok.build()?;
        self.from_split(rdr, tok)
    }

    /// Build a scanner that reads from `rdr` and carves tokens out of it
    /// with the given split function.
    ///
    /// Only the buffer settings of this builder apply.
    pub fn from_split<R: io::Read, S: Split>(
        &self,
        rdr: R,
        split: S,
    ) -> Result<Scanner<R, S>> {
        if self.max_token_size == 0 {
            return Err(config_error("maximum token size must be positive"));
        }
        if self.capacity == 0 {
            return Err(config_error("initial capacity must be positive"));
        }
        Ok(Scanner {
            rdr: rdr,
            split: split,
            buf: Buffer::new(self.capacity, self.max_token_size),
            token: None,
        })
    }

    /// The initial size of the scan buffer, in bytes.
    ///
    /// The buffer grows on demand. This is clamped to the maximum token
    /// size. The default is 4 KiB.
    pub fn initial_capacity(&mut self, capacity: usize) -> &mut ScannerBuilder {
        self.capacity = capacity;
        self
    }

    /// The largest token, in bytes, that a scanner will buffer.
    ///
    /// A token that does not fit makes `scan` fail with
    /// `ErrorKind::TokenTooLong`. For CSV, a token includes its quotes and
    /// its terminator, except that a final token running up to the end of
    /// input may fill the buffer exactly. The default is 64 KiB.
    pub fn max_token_size(&mut self, max: usize) -> &mut ScannerBuilder {
        self.max_token_size = max;
        self
    }

    /// The field delimiter to use when parsing CSV.
    ///
    /// The default is `b','`.
    pub fn delimiter(&mut self, delimiter: u8) -> &mut ScannerBuilder {
        self.tok.delimiter(delimiter);
        self
    }

    /// Enable or disable quoted fields.
    ///
    /// This is enabled by default.
    pub fn quoting(&mut self, yes: bool) -> &mut ScannerBuilder {
        self.tok.quoting(yes);
        self
    }

    /// The quote character to use when parsing CSV.
    ///
    /// The default is `b'"'`.
    pub fn quote(&mut self, quote: u8) -> &mut ScannerBuilder {
        self.tok.quote(quote);
        self
    }

    /// Whether leading and trailing whitespace is removed from unquoted
    /// fields.
    ///
    /// This is disabled by default.
    pub fn trim(&mut self, yes: bool) -> &mut ScannerBuilder {
        self.tok.trim(yes);
        self
    }

    /// The comment marker to use when parsing CSV.
    ///
    /// Lines starting with the marker are dropped. This is disabled by
    /// default.
    pub fn comment(&mut self, comment: Option<u8>) -> &mut ScannerBuilder {
        self.tok.comment(comment);
        self
    }

    /// Whether empty lines are skipped instead of read as one empty field.
    ///
    /// This is enabled by default.
    pub fn skip_empty_lines(&mut self, yes: bool) -> &mut ScannerBuilder {
        self.tok.skip_empty_lines(yes);
        self
    }
}

fn config_error(msg: &str) -> Error {
    Error::new(ErrorKind::Config { msg: msg.to_string() })
}

/// An incremental scanner that pulls tokens out of an `io::Read`.
///
/// The scanner owns a buffer of input that has been read but not consumed
/// and repeatedly hands it to a [`Split`](trait.Split.html) function. When
/// the split function needs more input than is buffered, the scanner reads
/// more, growing its buffer up to a fixed maximum. The split function never
/// sees the source itself.
///
/// A scanner does its own buffering, so wrapping the source in an
/// `io::BufReader` is unnecessary.
pub struct Scanner<R, S: Split> {
    rdr: R,
    split: S,
    buf: Buffer,
    token: Option<S::Token>,
}

impl<R, S> fmt::Debug for Scanner<R, S>
where
    S: Split + fmt::Debug,
    S::Token: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Scanner")
            .field("split", &self.split)
            .field("buf", &self.buf)
            .field("token", &self.token)
            .finish()
    }
}

impl<R: io::Read, S: Split> Scanner<R, S> {
    /// Create a scanner with the default buffer sizes.
    pub fn new(rdr: R, split: S) -> Scanner<R, S> {
        Scanner {
            rdr: rdr,
            split: split,
            buf: Buffer::new(DEFAULT_CAPACITY, DEFAULT_MAX_TOKEN_SIZE),
            token: None,
        }
    }

    /// Advance to the next token.
    ///
    /// This returns `true` when a token is available through `token` and
    /// `false` when the input is exhausted. Once `false` is returned,
    /// subsequent calls keep returning `false`.
    ///
    /// On error, nothing is consumed and no token is available.
    pub fn scan(&mut self) -> Result<bool> {
        self.token = None;
        loop {
            if !self.buf.is_empty() || self.buf.is_eof() {
                let at_eof = self.buf.is_eof();
                let mut window = Window::new(self.buf.window());
                let res = self.split.split(&mut window, at_eof)?;
                let consumed = window.consumed();
                self.buf.consume(consumed);
                match res {
                    SplitResult::Token(token) => {
                        self.token = Some(token);
                        return Ok(true);
                    }
                    SplitResult::NeedMore if consumed > 0 => continue,
                    SplitResult::NeedMore if at_eof => return Ok(false),
                    SplitResult::NeedMore => {}
                }
            }
            self.buf.fill(&mut self.rdr)?;
        }
    }

    /// The token produced by the most recent successful call to `scan`.
    pub fn token(&self) -> Option<&S::Token> {
        self.token.as_ref()
    }

    /// Take ownership of the token produced by the most recent successful
    /// call to `scan`.
    pub fn take_token(&mut self) -> Option<S::Token> {
        self.token.take()
    }

    /// Return the next unconsumed character without consuming it.
    ///
    /// This reads more input if nothing is buffered. `None` is returned only
    /// at the true end of input. Bytes that are not valid UTF-8 peek as
    /// `U+FFFD`.
    pub fn peek(&mut self) -> Result<Option<char>> {
        loop {
            let data = self.buf.window();
            if !data.is_empty() {
                let (ch, size) = bstr::decode_utf8(data);
                match ch {
                    Some(ch) => return Ok(Some(ch)),
                    // The window may end in the middle of a sequence.
                    None if size == data.len() && !self.buf.is_eof() => {}
                    None => return Ok(Some('\u{FFFD}')),
                }
            } else if self.buf.is_eof() {
                return Ok(None);
            }
            self.buf.fill(&mut self.rdr)?;
        }
    }

    /// Rebind this scanner to a new source and return the old one.
    ///
    /// Buffered input, the end of input flag and the split function's state
    /// are cleared. Configuration and the buffer allocation are kept.
    pub fn reset(&mut self, rdr: R) -> R {
        self.buf.reset();
        self.split.reset();
        self.token = None;
        mem::replace(&mut self.rdr, rdr)
    }

    /// The number of unconsumed bytes currently buffered.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// The current size of the scan buffer, in bytes.
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// The largest token this scanner can buffer, in bytes.
    pub fn max_token_size(&self) -> usize {
        self.buf.max()
    }
}

impl<R, S: Split> Scanner<R, S> {
    /// A reference to the split function.
    pub fn splitter(&self) -> &S {
        &self.split
    }

    /// A mutable reference to the split function.
    pub fn splitter_mut(&mut self) -> &mut S {
        &mut self.split
    }

    /// A reference to the underlying source.
    pub fn get_ref(&self) -> &R {
        &self.rdr
    }

    /// A mutable reference to the underlying source.
    ///
    /// Reading from the source directly skips past input the scanner has
    /// not seen, and is generally a mistake.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.rdr
    }

    /// Unwrap this scanner, returning the underlying source.
    ///
    /// Input that was buffered but not consumed is lost.
    pub fn into_inner(self) -> R {
        self.rdr
    }
}

/// A scanner that produces CSV fields.
pub type CsvScanner<R> = Scanner<R, Tokenizer>;

impl<R: io::Read> Scanner<R, Tokenizer> {
    /// Create a CSV scanner with the default configuration.
    ///
    /// Use a [`ScannerBuilder`](struct.ScannerBuilder.html) to change the
    /// delimiter, quoting, comments and so on.
    ///
    /// # Example
    ///
    /// ```
    /// use csvscan::CsvScanner;
    ///
    /// # fn example() -> csvscan::Result<()> {
    /// let mut scanner = CsvScanner::from_reader("a,\"b\nc\"\nd,e\n".as_bytes());
    /// let mut fields = vec![];
    /// while scanner.scan()? {
    ///     fields.push((scanner.line(), scanner.token_str().unwrap().to_string()));
    /// }
    /// assert_eq!(fields, vec![
    ///     (1, "a".to_string()),
    ///     (3, "b\nc".to_string()),
    ///     (3, "d".to_string()),
    ///     (4, "e".to_string()),
    /// ]);
    /// # Ok(())
    /// # }
    /// # example().unwrap();
    /// ```
    pub fn from_reader(rdr: R) -> CsvScanner<R> {
        Scanner::new(rdr, Tokenizer::new())
    }

    /// The most recently scanned field.
    pub fn token_str(&self) -> Option<&str> {
        self.token.as_ref().map(|s| &**s)
    }

    /// The line number, starting at 1, of the input position.
    ///
    /// After a field that ends its row is scanned, this already names the
    /// following line.
    pub fn line(&self) -> u64 {
        self.split.line()
    }

    /// The column, starting at 1, of the most recently scanned field.
    pub fn column(&self) -> u64 {
        self.split.column()
    }

    /// Whether the most recently scanned field is the last of its row.
    pub fn at_end_of_row(&self) -> bool {
        self.split.is_end_of_row()
    }

    /// Enable or disable trimming of unquoted fields from now on.
    pub fn set_trim(&mut self, yes: bool) {
        self.split.set_trim(yes);
    }

    /// Set the comment marker and return the previous one.
    ///
    /// This fails if the marker is a line terminator or the delimiter.
    pub fn set_comment_marker(&mut self, comment: Option<u8>) -> Result<Option<u8>> {
        if let Some(b) = comment {
            if b == b'\n' || b == b'\r' || b == self.split.delimiter() {
                return Err(Error::from(
                    csvscan_core::ConfigError::InvalidCommentMarker(b),
                ));
            }
        }
        Ok(self.split.set_comment_marker(comment))
    }

    /// Enable or disable skipping of empty lines from now on.
    pub fn set_skip_empty_lines(&mut self, yes: bool) {
        self.split.set_skip_empty_lines(yes);
    }

    /// Skip `n` rows without keeping their fields.
    ///
    /// This returns the number of rows actually skipped, which is less than
    /// `n` only when the input ran out.
    pub fn skip_rows(&mut self, n: u64) -> Result<u64> {
        let mut skipped = 0;
        while skipped < n {
            if !self.scan()? {
                break;
            }
            if self.at_end_of_row() {
                skipped += 1;
            }
        }
        Ok(skipped)
    }

    /// Scan the fields of the next row into `row`.
    ///
    /// `row` is cleared first. This returns the number of fields read, which
    /// is `0` only at the end of input.
    pub fn scan_row(&mut self, row: &mut Vec<String>) -> Result<usize> {
        row.clear();
        while self.scan()? {
            if let Some(field) = self.token.take() {
                row.push(field);
            }
            if self.at_end_of_row() {
                break;
            }
        }
        Ok(row.len())
    }

    /// Scan the next field and return it.
    ///
    /// `None` is returned at the end of input.
    pub fn scan_text(&mut self) -> Result<Option<String>> {
        if self.scan()? {
            Ok(self.token.take())
        } else {
            Ok(None)
        }
    }

    /// Scan the next field and parse it as a `T`.
    ///
    /// `None` is returned at the end of input. A field that does not parse
    /// is an `ErrorKind::Value` error.
    pub fn scan_parse<T>(&mut self) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        let field = match self.scan_text()? {
            None => return Ok(None),
            Some(field) => field,
        };
        let index = self.column().saturating_sub(1) as usize;
        parse_field(index, field).map(Some)
    }
}

/// Parse a field, reporting failure as a value error for `index`.
pub(crate) fn parse_field<T, F>(index: usize, field: F) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
    F: AsRef<str> + Into<String>,
{
    field.as_ref().parse().map_err(|err: T::Err| {
        Error::new(ErrorKind::Value {
            index: index,
            value: field.into(),
            msg: err.to_string(),
        })
    })
}

#[cfg(test)]
mod tests {
    use std::io;

    use csvscan_core::{
        ParseErrorKind, Split, SplitError, SplitResult, Window,
    };

    use crate::error::ErrorKind;

    use super::{CsvScanner, Scanner, ScannerBuilder};

    /// A source that returns one byte per read.
    struct OneByte<'a>(&'a [u8]);

    impl<'a> io::Read for OneByte<'a> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.0.is_empty() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.0[0];
            self.0 = &self.0[1..];
            Ok(1)
        }
    }

    /// Splits on spaces and claims to consume one byte more than it saw.
    struct Greedy;

    impl Split for Greedy {
        type Token = ();

        fn split(
            &mut self,
            window: &mut Window,
            _at_eof: bool,
        ) -> Result<SplitResult<()>, SplitError> {
            let n = window.len() + 1;
            window.advance(n)?;
            Ok(SplitResult::Token(()))
        }
    }

    /// Splits input into words separated by single spaces.
    struct Words;

    impl Split for Words {
        type Token = String;

        fn split(
            &mut self,
            window: &mut Window,
            at_eof: bool,
        ) -> Result<SplitResult<String>, SplitError> {
            let data = window.as_bytes();
            let (word, consumed) = match data.iter().position(|&b| b == b' ') {
                Some(i) => (&data[..i], i + 1),
                None if at_eof && !data.is_empty() => (data, data.len()),
                None => return Ok(SplitResult::NeedMore),
            };
            window.advance(consumed)?;
            if word.is_empty() {
                return Ok(SplitResult::NeedMore);
            }
            Ok(SplitResult::Token(String::from_utf8_lossy(word).into_owned()))
        }
    }

    fn fields<R: io::Read>(scanner: &mut CsvScanner<R>) -> Vec<String> {
        let mut fields = vec![];
        while scanner.scan().unwrap() {
            fields.push(scanner.take_token().unwrap());
        }
        fields
    }

    #[test]
    fn large_buffer() {
        let mut data = vec![b'x'; 4096 + 1024];
        data[4200] = b',';
        let mut scanner = ScannerBuilder::new()
            .initial_capacity(4096)
            .from_reader(&data[..])
            .unwrap();
        assert!(scanner.scan().unwrap());
        assert_eq!(scanner.token_str().unwrap().len(), 4200);
        assert!(!scanner.at_end_of_row());
        assert!(scanner.scan().unwrap());
        assert_eq!(scanner.token_str().unwrap().len(), 919);
        assert!(scanner.at_end_of_row());
        assert!(!scanner.scan().unwrap());
        assert_eq!(scanner.capacity(), 8192);
    }

    #[test]
    fn token_too_long() {
        let data = "abcdefghij,k\n";
        let mut scanner = ScannerBuilder::new()
            .initial_capacity(2)
            .max_token_size(8)
            .from_reader(data.as_bytes())
            .unwrap();
        let err = scanner.scan().unwrap_err();
        match *err.kind() {
            ErrorKind::TokenTooLong { max } => assert_eq!(max, 8),
            ref kind => panic!("unexpected error: {:?}", kind),
        }
        assert!(scanner.token().is_none());
    }

    #[test]
    fn token_fits_exactly() {
        // The field, its delimiter and the next byte fit in eight bytes.
        let data = "abcdef,k";
        let mut scanner = ScannerBuilder::new()
            .initial_capacity(1)
            .max_token_size(8)
            .from_reader(data.as_bytes())
            .unwrap();
        assert_eq!(fields(&mut scanner), vec!["abcdef", "k"]);
    }

    #[test]
    fn final_token_of_max_size() {
        let mut scanner = ScannerBuilder::new()
            .initial_capacity(8)
            .max_token_size(8)
            .from_reader("abcdefgh".as_bytes())
            .unwrap();
        assert_eq!(fields(&mut scanner), vec!["abcdefgh"]);
    }

    #[test]
    fn peek_sequence() {
        let mut scanner = CsvScanner::from_reader("a,b,c,d,e".as_bytes());
        assert!(scanner.scan().unwrap());
        assert_eq!(scanner.token_str(), Some("a"));
        for &expected in &["b", "c", "d", "e"] {
            let c = expected.chars().next().unwrap();
            assert_eq!(scanner.peek().unwrap(), Some(c));
            assert!(scanner.scan().unwrap());
            assert_eq!(scanner.token_str(), Some(expected));
        }
        assert_eq!(scanner.peek().unwrap(), None);
        assert!(!scanner.scan().unwrap());
    }

    #[test]
    fn peek_does_not_consume() {
        let mut scanner = CsvScanner::from_reader(OneByte("é,x".as_bytes()));
        assert_eq!(scanner.peek().unwrap(), Some('é'));
        assert_eq!(scanner.peek().unwrap(), Some('é'));
        assert_eq!(fields(&mut scanner), vec!["é", "x"]);
    }

    #[test]
    fn peek_invalid_utf8() {
        let mut scanner = CsvScanner::from_reader(&b"\xFFa"[..]);
        assert_eq!(scanner.peek().unwrap(), Some('\u{FFFD}'));
    }

    #[test]
    fn peek_empty() {
        let mut scanner = CsvScanner::from_reader(io::empty());
        assert_eq!(scanner.peek().unwrap(), None);
        assert!(!scanner.scan().unwrap());
    }

    #[test]
    fn exhausted_stays_exhausted() {
        let mut scanner = CsvScanner::from_reader("a\n".as_bytes());
        assert_eq!(fields(&mut scanner), vec!["a"]);
        assert!(!scanner.scan().unwrap());
        assert!(!scanner.scan().unwrap());
    }

    #[test]
    fn reset_rebinds_source() {
        let mut scanner = CsvScanner::from_reader("a,b\nc".as_bytes());
        assert!(scanner.scan().unwrap());
        assert!(scanner.scan().unwrap());
        assert_eq!(scanner.line(), 2);
        let old = scanner.reset("x\n".as_bytes());
        assert_eq!(old, b"");
        assert_eq!(scanner.line(), 1);
        assert_eq!(scanner.column(), 0);
        assert!(scanner.token().is_none());
        assert_eq!(fields(&mut scanner), vec!["x"]);
    }

    #[test]
    fn reset_keeps_configuration() {
        let mut scanner = ScannerBuilder::new()
            .delimiter(b';')
            .from_reader("a;b".as_bytes())
            .unwrap();
        scanner.set_trim(true);
        assert_eq!(fields(&mut scanner), vec!["a", "b"]);
        scanner.reset(" c ; d ".as_bytes());
        assert_eq!(fields(&mut scanner), vec!["c", "d"]);
    }

    #[test]
    fn skip_rows() {
        let data = "h1,h2\n#c\n\"x\ny\",z\n1,2\n";
        let mut scanner = ScannerBuilder::new()
            .comment(Some(b'#'))
            .from_reader(data.as_bytes())
            .unwrap();
        assert_eq!(scanner.skip_rows(2).unwrap(), 2);
        assert_eq!(scanner.line(), 5);
        assert_eq!(fields(&mut scanner), vec!["1", "2"]);
        assert_eq!(scanner.skip_rows(3).unwrap(), 0);
    }

    #[test]
    fn skip_rows_past_end() {
        let mut scanner = CsvScanner::from_reader("a\nb".as_bytes());
        assert_eq!(scanner.skip_rows(5).unwrap(), 2);
    }

    #[test]
    fn scan_rows() {
        let mut scanner = CsvScanner::from_reader("a,b,c\n\nd\ne,\n".as_bytes());
        let mut row = vec![];
        assert_eq!(scanner.scan_row(&mut row).unwrap(), 3);
        assert_eq!(row, vec!["a", "b", "c"]);
        assert_eq!(scanner.scan_row(&mut row).unwrap(), 1);
        assert_eq!(row, vec!["d"]);
        assert_eq!(scanner.scan_row(&mut row).unwrap(), 2);
        assert_eq!(row, vec!["e", ""]);
        assert_eq!(scanner.scan_row(&mut row).unwrap(), 0);
        assert!(row.is_empty());
    }

    #[test]
    fn scan_typed() {
        let mut scanner = CsvScanner::from_reader("1,2.5,x\n".as_bytes());
        assert_eq!(scanner.scan_parse::<i32>().unwrap(), Some(1));
        assert_eq!(scanner.scan_parse::<f64>().unwrap(), Some(2.5));
        let err = scanner.scan_parse::<u8>().unwrap_err();
        match *err.kind() {
            ErrorKind::Value { index, ref value, .. } => {
                assert_eq!(index, 2);
                assert_eq!(value, "x");
            }
            ref kind => panic!("unexpected error: {:?}", kind),
        }
        assert_eq!(scanner.scan_text().unwrap(), None);
    }

    #[test]
    fn parse_error_keeps_position() {
        let mut scanner = CsvScanner::from_reader("x\n\"a \"word\"".as_bytes());
        assert!(scanner.scan().unwrap());
        let err = scanner.scan().unwrap_err();
        assert_eq!(err.line(), Some(2));
        match *err.kind() {
            ErrorKind::Parse(ref err) => match *err.kind() {
                ParseErrorKind::UnescapedQuote { quote } => {
                    assert_eq!(quote, b'"')
                }
                ref kind => panic!("unexpected parse error: {:?}", kind),
            },
            ref kind => panic!("unexpected error: {:?}", kind),
        }
        assert_eq!(scanner.line(), 2);
        assert!(scanner.token().is_none());
    }

    #[test]
    fn repeated_parse_error_is_stable() {
        let mut scanner = CsvScanner::from_reader("a,\"x\"y\n".as_bytes());
        assert!(scanner.scan().unwrap());
        for _ in 0..3 {
            let err = scanner.scan().unwrap_err();
            match *err.kind() {
                ErrorKind::Parse(ref err) => {
                    assert_eq!((err.line(), err.column()), (1, 2));
                }
                ref kind => panic!("unexpected error: {:?}", kind),
            }
            assert_eq!((scanner.line(), scanner.column()), (1, 1));
            assert_eq!(scanner.peek().unwrap(), Some('"'));
        }
    }

    #[test]
    fn comment_marker_can_be_toggled() {
        let mut scanner = CsvScanner::from_reader("#a\nb\n".as_bytes());
        assert_eq!(scanner.set_comment_marker(Some(b'#')).unwrap(), None);
        assert!(scanner.scan().unwrap());
        assert_eq!(scanner.token_str(), Some("b"));
        assert_eq!(scanner.line(), 3);
        assert!(scanner.set_comment_marker(Some(b',')).is_err());
        assert!(scanner.set_comment_marker(Some(b'\n')).is_err());
    }

    #[test]
    fn comment_marker_swapped_mid_stream() {
        let mut scanner = CsvScanner::from_reader("#a\n#b\n".as_bytes());
        scanner.set_comment_marker(Some(b'#')).unwrap();
        let mut row = vec![];
        assert_eq!(scanner.set_comment_marker(None).unwrap(), Some(b'#'));
        scanner.scan_row(&mut row).unwrap();
        assert_eq!(row, vec!["#a"]);
    }

    #[test]
    fn one_byte_reads() {
        let data = "a,\"b\r\n\"\"c\"\r\n#x\n\nd\n";
        let mut one = ScannerBuilder::new()
            .initial_capacity(1)
            .comment(Some(b'#'))
            .from_reader(OneByte(data.as_bytes()))
            .unwrap();
        let mut all = ScannerBuilder::new()
            .comment(Some(b'#'))
            .from_reader(data.as_bytes())
            .unwrap();
        loop {
            let (a, b) = (one.scan().unwrap(), all.scan().unwrap());
            assert_eq!(a, b);
            if !a {
                break;
            }
            assert_eq!(one.token_str(), all.token_str());
            assert_eq!(one.line(), all.line());
            assert_eq!(one.column(), all.column());
            assert_eq!(one.at_end_of_row(), all.at_end_of_row());
        }
    }

    #[test]
    fn split_consuming_too_much() {
        let mut scanner = Scanner::new("abc".as_bytes(), Greedy);
        let err = scanner.scan().unwrap_err();
        match *err.kind() {
            ErrorKind::Advance(ref err) => {
                assert_eq!(err.requested(), 4);
                assert_eq!(err.available(), 3);
            }
            ref kind => panic!("unexpected error: {:?}", kind),
        }
        assert_eq!(scanner.buffered(), 3);
    }

    #[test]
    fn custom_split() {
        let mut scanner = ScannerBuilder::new()
            .initial_capacity(2)
            .from_split(OneByte(b"foo  bar baz"), Words)
            .unwrap();
        let mut words = vec![];
        while scanner.scan().unwrap() {
            words.push(scanner.take_token().unwrap());
        }
        assert_eq!(words, vec!["foo", "bar", "baz"]);
        assert!(scanner.get_ref().0.is_empty());
    }

    #[test]
    fn invalid_sizes() {
        assert!(ScannerBuilder::new()
            .max_token_size(0)
            .from_reader(io::empty())
            .is_err());
        assert!(ScannerBuilder::new()
            .initial_capacity(0)
            .from_reader(io::empty())
            .is_err());
        let err = ScannerBuilder::new()
            .delimiter(b'\n')
            .from_reader(io::empty())
            .unwrap_err();
        match *err.kind() {
            ErrorKind::Config { .. } => {}
            ref kind => panic!("unexpected error: {:?}", kind),
        }
    }
}
