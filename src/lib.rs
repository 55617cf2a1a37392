/*!
`csvscan` reads CSV one field at a time from any `io::Read`, using a single
bounded buffer.

The engine is [`Scanner`](struct.Scanner.html), which owns a growable window
over unconsumed input and hands it to a [`Split`](trait.Split.html) function
until a token comes out. [`CsvScanner`](type.CsvScanner.html) is a scanner
paired with the CSV [`Tokenizer`](struct.Tokenizer.html). A field can never
be larger than the scanner's maximum token size, so memory use stays bounded
no matter how the input is shaped.

On top of the scanner sit a row oriented [`Reader`](struct.Reader.html) with
header lookup and typed access, and a [`Writer`](struct.Writer.html) that
produces output the scanner reads back exactly.

# Example

```
use csvscan::CsvScanner;

# fn example() -> csvscan::Result<()> {
let data = "\
city,country
\"Boston, MA\",United States
Concord,United States
";
let mut scanner = CsvScanner::from_reader(data.as_bytes());
scanner.skip_rows(1)?;
let mut row = vec![];
while scanner.scan_row(&mut row)? > 0 {
    println!("{:?}", row);
}
# Ok(())
# }
# example().unwrap();
```
*/

#![deny(missing_docs)]

pub use csvscan_core::{
    AdvanceError, ConfigError, ParseError, ParseErrorKind, Session, Split,
    SplitError, SplitResult, Tokenizer, TokenizerBuilder, Window,
};

pub use crate::error::{ColumnError, Error, ErrorKind, Result};
pub use crate::reader::{Reader, ReaderBuilder, Rows};
pub use crate::scanner::{CsvScanner, Scanner, ScannerBuilder};
pub use crate::writer::{Writer, WriterBuilder};

mod buffer;
mod error;
mod reader;
mod scanner;
mod writer;
