#![no_main]
use libfuzzer_sys::fuzz_target;

use csvscan::{ScannerBuilder, WriterBuilder};

fuzz_target!(|data: &[u8]| {
    // The first byte picks the buffer size, so growth and shifting are
    // exercised at every offset.
    let (capacity, data) = match data.split_first() {
        Some((&b, rest)) => (b as usize + 1, rest),
        None => return,
    };
    let mut scanner = match ScannerBuilder::new()
        .initial_capacity(capacity)
        .max_token_size(4096)
        .comment(Some(b'#'))
        .from_reader(data)
    {
        Ok(scanner) => scanner,
        Err(_) => return,
    };
    let mut rows = vec![];
    let mut row = vec![];
    loop {
        match scanner.scan_row(&mut row) {
            Ok(0) | Err(_) => break,
            Ok(_) => rows.push(row.clone()),
        }
    }

    // Whatever was read must survive a write and a second read unchanged.
    let mut wtr = WriterBuilder::new().from_writer(vec![]).unwrap();
    for row in &rows {
        wtr.write_record(row).unwrap();
    }
    let written = wtr.into_inner().unwrap();
    let mut again = ScannerBuilder::new().from_reader(&written[..]).unwrap();
    for expected in &rows {
        assert_eq!(again.scan_row(&mut row).unwrap(), expected.len());
        assert_eq!(&row, expected);
    }
    assert_eq!(again.scan_row(&mut row).unwrap(), 0);
});
