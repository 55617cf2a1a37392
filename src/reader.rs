use std::collections::HashMap;
use std::fmt;
use std::io;
use std::str::FromStr;

use crate::error::{ColumnError, Error, Result};
use crate::scanner::{parse_field, CsvScanner, ScannerBuilder};

/// Builds a CSV reader with various configuration knobs.
///
/// This is a thin wrapper around a
/// [`ScannerBuilder`](struct.ScannerBuilder.html); every scanner setting is
/// available here too.
///
/// # Example
///
/// ```
/// use csvscan::ReaderBuilder;
///
/// # fn example() -> csvscan::Result<()> {
/// let data = "city;pop\nBoston;4628910\n";
/// let mut rdr = ReaderBuilder::new()
///     .delimiter(b';')
///     .from_reader(data.as_bytes())?;
/// rdr.read_headers(false)?;
/// assert!(rdr.next_row()?);
/// assert_eq!(rdr.get_by_name("city")?, "Boston");
/// assert_eq!(rdr.parse_by_name::<u64>("pop")?, 4628910);
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
#[derive(Debug, Default)]
pub struct ReaderBuilder {
    builder: ScannerBuilder,
}

impl ReaderBuilder {
    /// Create a new builder for configuring CSV readers.
    pub fn new() -> ReaderBuilder {
        ReaderBuilder::default()
    }

    /// Build a CSV reader from this configuration that reads from `rdr`.
    pub fn from_reader<R: io::Read>(&self, rdr: R) -> Result<Reader<R>> {
        Ok(Reader::from_scanner(self.builder.from_reader(rdr)?))
    }

    /// The field delimiter. The default is `b','`.
    pub fn delimiter(&mut self, delimiter: u8) -> &mut ReaderBuilder {
        self.builder.delimiter(delimiter);
        self
    }

    /// Enable or disable quoted fields. This is enabled by default.
    pub fn quoting(&mut self, yes: bool) -> &mut ReaderBuilder {
        self.builder.quoting(yes);
        self
    }

    /// The quote character. The default is `b'"'`.
    pub fn quote(&mut self, quote: u8) -> &mut ReaderBuilder {
        self.builder.quote(quote);
        self
    }

    /// Whether whitespace around unquoted fields is removed.
    pub fn trim(&mut self, yes: bool) -> &mut ReaderBuilder {
        self.builder.trim(yes);
        self
    }

    /// The comment marker. Comments are disabled by default.
    pub fn comment(&mut self, comment: Option<u8>) -> &mut ReaderBuilder {
        self.builder.comment(comment);
        self
    }

    /// Whether empty lines are skipped. This is enabled by default.
    pub fn skip_empty_lines(&mut self, yes: bool) -> &mut ReaderBuilder {
        self.builder.skip_empty_lines(yes);
        self
    }

    /// The initial size of the scan buffer, in bytes.
    pub fn initial_capacity(&mut self, capacity: usize) -> &mut ReaderBuilder {
        self.builder.initial_capacity(capacity);
        self
    }

    /// The largest field, in bytes, that can be read.
    pub fn max_token_size(&mut self, max: usize) -> &mut ReaderBuilder {
        self.builder.max_token_size(max);
        self
    }
}

/// A row oriented CSV reader.
///
/// A reader keeps one row at a time. `next_row` replaces it with the next
/// row of the input, and its fields are then available by index (starting
/// at `0`) or, once headers are known, by name.
///
/// Headers are never read implicitly. Call `read_headers` to take them from
/// the input, or `set_headers` to supply them.
///
/// # Example
///
/// ```
/// use csvscan::Reader;
///
/// # fn example() -> csvscan::Result<()> {
/// let data = "\
/// name,age
/// alice,30
/// bob,
/// ";
/// let mut rdr = Reader::from_reader(data.as_bytes());
/// rdr.read_headers(false)?;
/// let mut ages = vec![];
/// while rdr.next_row()? {
///     ages.push((rdr.get(0)?.to_string(), rdr.parse_opt::<u32>(1)?));
/// }
/// assert_eq!(ages, vec![
///     ("alice".to_string(), Some(30)),
///     ("bob".to_string(), None),
/// ]);
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
pub struct Reader<R> {
    scanner: CsvScanner<R>,
    row: Vec<String>,
    headers: Option<HashMap<String, usize>>,
}

impl<R> fmt::Debug for Reader<R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Reader")
            .field("row", &self.row)
            .field("headers", &self.headers)
            .finish()
    }
}

impl<R: io::Read> Reader<R> {
    /// Create a reader with the default configuration.
    pub fn from_reader(rdr: R) -> Reader<R> {
        Reader::from_scanner(CsvScanner::from_reader(rdr))
    }

    /// Create a reader on top of an already configured scanner.
    pub fn from_scanner(scanner: CsvScanner<R>) -> Reader<R> {
        Reader { scanner: scanner, row: vec![], headers: None }
    }

    /// Read the next row as the column labels.
    ///
    /// Every label maps to the index of its column. When a label repeats,
    /// the last column wins. This returns `false`, leaving the headers
    /// unchanged, when there is no row left.
    ///
    /// If `ignore_comment_marker` is set, the header row is read with
    /// comments disabled, so a header like `#id,name` is not dropped. The
    /// comment marker is restored afterwards, even on error.
    pub fn read_headers(&mut self, ignore_comment_marker: bool) -> Result<bool> {
        let mut labels = vec![];
        let res = if ignore_comment_marker {
            let marker = self.scanner.splitter_mut().set_comment_marker(None);
            let res = self.scanner.scan_row(&mut labels);
            self.scanner.splitter_mut().set_comment_marker(marker);
            res
        } else {
            self.scanner.scan_row(&mut labels)
        };
        if res? == 0 {
            return Ok(false);
        }
        let headers = labels.into_iter().enumerate().map(|(i, l)| (l, i));
        self.headers = Some(headers.collect());
        Ok(true)
    }

    /// Advance to the next row.
    ///
    /// This returns `false` at the end of input, in which case there is no
    /// current row. On error there is no current row either.
    pub fn next_row(&mut self) -> Result<bool> {
        match self.scanner.scan_row(&mut self.row) {
            Ok(n) => Ok(n > 0),
            Err(err) => {
                self.row.clear();
                Err(err)
            }
        }
    }

    /// An iterator over the remaining rows.
    ///
    /// Each row is returned as an owned vector of fields. The iterator stops
    /// after the first error.
    pub fn rows(&mut self) -> Rows<R> {
        Rows { rdr: self, done: false }
    }

    /// Skip `n` rows without keeping their fields, and return how many were
    /// actually skipped.
    ///
    /// There is no current row afterwards.
    pub fn skip_rows(&mut self, n: u64) -> Result<u64> {
        self.row.clear();
        self.scanner.skip_rows(n)
    }
}

impl<R> Reader<R> {
    /// Install column labels, mapping each label to a column index starting
    /// at `0`.
    ///
    /// # Example
    ///
    /// ```
    /// use csvscan::Reader;
    ///
    /// # fn example() -> csvscan::Result<()> {
    /// let mut rdr = Reader::from_reader("x,y\n".as_bytes());
    /// rdr.set_headers(vec![("first", 0), ("second", 1)]);
    /// rdr.next_row()?;
    /// assert_eq!(rdr.get_by_name("second")?, "y");
    /// # Ok(())
    /// # }
    /// # example().unwrap();
    /// ```
    pub fn set_headers<I, S>(&mut self, headers: I)
    where
        I: IntoIterator<Item = (S, usize)>,
        S: Into<String>,
    {
        let headers = headers.into_iter().map(|(l, i)| (l.into(), i));
        self.headers = Some(headers.collect());
    }

    /// The column labels, if any are known.
    pub fn headers(&self) -> Option<&HashMap<String, usize>> {
        self.headers.as_ref()
    }

    /// The fields of the current row.
    ///
    /// This is empty when there is no current row.
    pub fn row(&self) -> &[String] {
        &self.row
    }

    /// The number of fields in the current row.
    pub fn len(&self) -> usize {
        self.row.len()
    }

    /// Returns true if there is no current row.
    pub fn is_empty(&self) -> bool {
        self.row.is_empty()
    }

    /// The field at index `i` of the current row.
    pub fn get(&self, i: usize) -> Result<&str> {
        if self.row.is_empty() {
            return Err(Error::from(ColumnError::NoRow));
        }
        match self.row.get(i) {
            Some(field) => Ok(field),
            None => Err(Error::from(ColumnError::OutOfBounds {
                index: i,
                len: self.row.len(),
            })),
        }
    }

    /// The field at index `i`, or `None` if it is empty.
    pub fn get_opt(&self, i: usize) -> Result<Option<&str>> {
        let field = self.get(i)?;
        Ok(if field.is_empty() { None } else { Some(field) })
    }

    /// The field in the column labeled `label`.
    pub fn get_by_name(&self, label: &str) -> Result<&str> {
        self.get(self.find_column(label)?)
    }

    /// Parse the field at index `i`.
    pub fn parse<T>(&self, i: usize) -> Result<T>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        parse_field(i, self.get(i)?)
    }

    /// Parse the field at index `i`, or return `None` if it is empty.
    pub fn parse_opt<T>(&self, i: usize) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        match self.get_opt(i)? {
            None => Ok(None),
            Some(field) => parse_field(i, field).map(Some),
        }
    }

    /// Parse the field in the column labeled `label`.
    pub fn parse_by_name<T>(&self, label: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        self.parse(self.find_column(label)?)
    }

    /// The index of the column labeled `label`.
    pub fn find_column(&self, label: &str) -> Result<usize> {
        let headers = self.known_headers()?;
        match headers.get(label) {
            Some(&i) => Ok(i),
            None => {
                Err(Error::from(ColumnError::UnknownLabel(label.to_string())))
            }
        }
    }

    /// The label of the column at index `i`.
    pub fn column_label(&self, i: usize) -> Result<&str> {
        let headers = self.known_headers()?;
        match headers.iter().find(|&(_, &j)| j == i) {
            Some((label, _)) => Ok(label),
            None => Err(Error::from(ColumnError::UnknownIndex(i))),
        }
    }

    fn known_headers(&self) -> Result<&HashMap<String, usize>> {
        match self.headers {
            Some(ref headers) if !headers.is_empty() => Ok(headers),
            _ => Err(Error::from(ColumnError::NoHeaders)),
        }
    }

    /// The line number of the input position, starting at 1.
    pub fn line(&self) -> u64 {
        self.scanner.splitter().line()
    }

    /// A reference to the underlying scanner.
    pub fn scanner(&self) -> &CsvScanner<R> {
        &self.scanner
    }

    /// A mutable reference to the underlying scanner.
    ///
    /// This is how trimming, the comment marker and empty line skipping are
    /// changed mid-stream.
    pub fn scanner_mut(&mut self) -> &mut CsvScanner<R> {
        &mut self.scanner
    }

    /// Unwrap this reader, returning the underlying source.
    pub fn into_inner(self) -> R {
        self.scanner.into_inner()
    }
}

/// An iterator over the rows of a CSV reader.
///
/// The lifetime parameter `'r` refers to the lifetime of the underlying
/// reader.
pub struct Rows<'r, R: 'r> {
    rdr: &'r mut Reader<R>,
    done: bool,
}

impl<'r, R: io::Read> Iterator for Rows<'r, R> {
    type Item = Result<Vec<String>>;

    fn next(&mut self) -> Option<Result<Vec<String>>> {
        if self.done {
            return None;
        }
        let mut row = vec![];
        match self.rdr.scanner.scan_row(&mut row) {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(_) => Some(Ok(row)),
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
