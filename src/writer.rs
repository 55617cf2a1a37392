use std::io::{self, Write};

use bstr::ByteSlice;

use crate::error::{Error, ErrorKind, Result};

/// Builds a CSV writer with various configuration knobs.
///
/// # Example
///
/// ```
/// use csvscan::WriterBuilder;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut wtr = WriterBuilder::new()
///     .delimiter(b'\t')
///     .crlf(true)
///     .from_writer(vec![])?;
/// wtr.write_record(&["a", "b\tc"])?;
/// assert_eq!(wtr.into_inner()?, b"a\t\"b\tc\"\r\n");
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
#[derive(Debug)]
pub struct WriterBuilder {
    delimiter: u8,
    quoting: bool,
    quote: u8,
    crlf: bool,
    capacity: usize,
}

impl Default for WriterBuilder {
    fn default() -> WriterBuilder {
        WriterBuilder {
            delimiter: b',',
            quoting: true,
            quote: b'"',
            crlf: false,
            capacity: 8 * (1 << 10),
        }
    }
}

impl WriterBuilder {
    /// Create a new builder for configuring CSV writers.
    pub fn new() -> WriterBuilder {
        WriterBuilder::default()
    }

    /// Build a CSV writer from this configuration that writes to `wtr`.
    ///
    /// This fails if the delimiter is a line terminator, or if it is the
    /// quote character while quoting is enabled.
    pub fn from_writer<W: io::Write>(&self, wtr: W) -> Result<Writer<W>> {
        if self.delimiter == b'\n' || self.delimiter == b'\r' {
            return Err(Error::new(ErrorKind::Config {
                msg: "delimiter cannot be a line terminator".to_string(),
            }));
        }
        if self.quoting && self.delimiter == self.quote {
            return Err(Error::new(ErrorKind::Config {
                msg: "delimiter and quote must differ".to_string(),
            }));
        }
        Ok(Writer {
            wtr: io::BufWriter::with_capacity(self.capacity, wtr),
            delimiter: self.delimiter,
            quoting: self.quoting,
            quote: self.quote,
            crlf: self.crlf,
            fields: 0,
            last_empty: false,
        })
    }

    /// The field delimiter to use when writing CSV.
    ///
    /// The default is `b','`.
    pub fn delimiter(&mut self, delimiter: u8) -> &mut WriterBuilder {
        self.delimiter = delimiter;
        self
    }

    /// Enable or disable quoting.
    ///
    /// When enabled (the default), fields are quoted only when they contain
    /// the quote character, the delimiter or a line terminator. When
    /// disabled, writing a field that contains the delimiter or a line feed
    /// fails.
    pub fn quoting(&mut self, yes: bool) -> &mut WriterBuilder {
        self.quoting = yes;
        self
    }

    /// The quote character to use when writing CSV.
    ///
    /// The default is `b'"'`.
    pub fn quote(&mut self, quote: u8) -> &mut WriterBuilder {
        self.quote = quote;
        self
    }

    /// End rows with `\r\n` instead of `\n`.
    ///
    /// This is disabled by default.
    pub fn crlf(&mut self, yes: bool) -> &mut WriterBuilder {
        self.crlf = yes;
        self
    }

    /// The capacity of the internal output buffer, in bytes.
    pub fn buffer_capacity(&mut self, capacity: usize) -> &mut WriterBuilder {
        self.capacity = capacity;
        self
    }
}

/// A CSV writer.
///
/// Fields are written one at a time with the `write_*` methods and rows are
/// closed with `end_row`, or whole rows are written with `write_record`.
/// Output is buffered; call `flush` or `into_inner` to make sure everything
/// reaches the underlying writer.
///
/// One deviation from writing fields verbatim is that a row made of a
/// single empty field is written as `""` when quoting is enabled. Otherwise
/// it would be indistinguishable from an empty line, which readers skip.
///
/// # Example
///
/// ```
/// use csvscan::Writer;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut wtr = Writer::from_writer(vec![]);
/// wtr.write_field("price")?;
/// wtr.write_float(1.5f64)?;
/// wtr.write_integer(-7i32)?;
/// wtr.write_bool(true)?;
/// wtr.end_row()?;
/// wtr.write_record(&["say \"hi\"", ""])?;
/// wtr.write_record(&[""])?;
///
/// let data = String::from_utf8(wtr.into_inner()?)?;
/// assert_eq!(data, "price,1.5,-7,true\n\"say \"\"hi\"\"\",\n\"\"\n");
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
#[derive(Debug)]
pub struct Writer<W: io::Write> {
    wtr: io::BufWriter<W>,
    delimiter: u8,
    quoting: bool,
    quote: u8,
    crlf: bool,
    fields: usize,
    last_empty: bool,
}

impl<W: io::Write> Writer<W> {
    /// Create a CSV writer with the default configuration.
    pub fn from_writer(wtr: W) -> Writer<W> {
        Writer {
            wtr: io::BufWriter::new(wtr),
            delimiter: b',',
            quoting: true,
            quote: b'"',
            crlf: false,
            fields: 0,
            last_empty: false,
        }
    }

    /// Write one field of the current row.
    ///
    /// A delimiter is inserted before every field but the first of a row.
    pub fn write_field<T: AsRef<[u8]>>(&mut self, field: T) -> Result<()> {
        let field = field.as_ref();
        let quoted = self.needs_quotes(field)?;
        if self.fields > 0 {
            self.wtr.write_all(&[self.delimiter])?;
        }
        if quoted {
            self.write_quoted(field)?;
        } else {
            self.wtr.write_all(field)?;
        }
        self.fields += 1;
        self.last_empty = field.is_empty();
        Ok(())
    }

    /// Write an integer as one field of the current row.
    pub fn write_integer<I: itoa::Integer>(&mut self, n: I) -> Result<()> {
        let mut buf = itoa::Buffer::new();
        let field = buf.format(n);
        self.write_raw(field.as_bytes())
    }

    /// Write a floating point number as one field of the current row.
    ///
    /// The shortest representation that reads back as the same number is
    /// used.
    pub fn write_float<F: ryu::Float>(&mut self, n: F) -> Result<()> {
        let mut buf = ryu::Buffer::new();
        let field = buf.format(n);
        self.write_raw(field.as_bytes())
    }

    /// Write a boolean as one field of the current row.
    pub fn write_bool(&mut self, b: bool) -> Result<()> {
        self.write_raw(if b { &b"true"[..] } else { &b"false"[..] })
    }

    /// Terminate the current row.
    pub fn end_row(&mut self) -> Result<()> {
        if self.quoting && self.fields == 1 && self.last_empty {
            self.wtr.write_all(&[self.quote, self.quote])?;
        }
        if self.crlf {
            self.wtr.write_all(b"\r\n")?;
        } else {
            self.wtr.write_all(b"\n")?;
        }
        self.fields = 0;
        self.last_empty = false;
        Ok(())
    }

    /// Write every field in `record` and terminate the row.
    pub fn write_record<I, T>(&mut self, record: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        for field in record {
            self.write_field(field)?;
        }
        self.end_row()
    }

    /// Flush the internal buffer to the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.wtr.flush()
    }

    /// A reference to the underlying writer.
    pub fn get_ref(&self) -> &W {
        self.wtr.get_ref()
    }

    /// Flush the internal buffer and return the underlying writer.
    pub fn into_inner(
        self,
    ) -> ::std::result::Result<W, io::IntoInnerError<io::BufWriter<W>>> {
        self.wtr.into_inner()
    }

    /// Write a field that never needs quotes.
    fn write_raw(&mut self, field: &[u8]) -> Result<()> {
        if self.fields > 0 {
            self.wtr.write_all(&[self.delimiter])?;
        }
        self.wtr.write_all(field)?;
        self.fields += 1;
        self.last_empty = false;
        Ok(())
    }

    fn needs_quotes(&self, field: &[u8]) -> Result<bool> {
        if !self.quoting {
            if field.find_byte(self.delimiter).is_some() {
                return Err(unwritable("separator in value"));
            }
            if field.find_byte(b'\n').is_some() {
                return Err(unwritable("newline character in value"));
            }
            // Read back, a trailing CR would merge with the line terminator.
            if field.last() == Some(&b'\r') {
                return Err(unwritable("carriage return at end of value"));
            }
            return Ok(false);
        }
        let (delim, quote) = (self.delimiter, self.quote);
        Ok(field.iter().any(|&b| {
            b == delim || b == quote || b == b'\n' || b == b'\r'
        }))
    }

    fn write_quoted(&mut self, mut field: &[u8]) -> io::Result<()> {
        let q = self.quote;
        self.wtr.write_all(&[q])?;
        while let Some(i) = field.find_byte(q) {
            self.wtr.write_all(&field[..i + 1])?;
            self.wtr.write_all(&[q])?;
            field = &field[i + 1..];
        }
        self.wtr.write_all(field)?;
        self.wtr.write_all(&[q])
    }
}

fn unwritable(msg: &'static str) -> Error {
    Error::new(ErrorKind::Unwritable { msg: msg })
}
