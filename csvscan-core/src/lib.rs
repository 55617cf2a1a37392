/*!
`csvscan-core` provides the I/O free half of `csvscan`: the contract between
an incremental scanner and a token format, and a CSV tokenizer that
implements it.

A [`Split`](trait.Split.html) implementation is handed a
[`Window`](struct.Window.html) over input that has been read but not yet
consumed. It either produces one token and consumes the bytes that made it up,
or asks for more input. Because the window always starts at the first
unconsumed byte, a split function that asks for more input is simply called
again with a longer window; it never needs to remember partial progress.

[`Tokenizer`](struct.Tokenizer.html) is the CSV split function. It produces
one field per call and tracks the line, column and end-of-row state needed to
assemble rows and report errors.

# Example

This drives a tokenizer by hand over input that is entirely in memory. The
`csvscan` crate does the same thing over an arbitrary `io::Read`.

```
use csvscan_core::{Split, SplitResult, Tokenizer, Window};

let mut tok = Tokenizer::new();
let mut window = Window::new(b"a,\"b\"\"c\"\nd\n");
let mut fields = vec![];
while let SplitResult::Token(field) = tok.split(&mut window, true).unwrap() {
    fields.push((field, tok.is_end_of_row()));
}
assert_eq!(fields, vec![
    ("a".to_string(), false),
    ("b\"c".to_string(), true),
    ("d".to_string(), true),
]);
```
*/

#![deny(missing_docs)]

pub use crate::error::{ConfigError, ParseError, ParseErrorKind};
pub use crate::split::{AdvanceError, Split, SplitError, SplitResult, Window};
pub use crate::tokenizer::{Session, Tokenizer, TokenizerBuilder};

mod error;
mod split;
mod tokenizer;
