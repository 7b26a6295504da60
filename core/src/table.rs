use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str::FromStr;

/// One row of a source table. Columns are resolved by header name when the
/// header carries that name, otherwise by position.
pub struct Row<'a> {
    header: &'a HashMap<String, usize>,
    record: &'a StringRecord,
}

impl<'a> Row<'a> {
    pub fn get(&self, name: &str, pos: usize) -> Option<&'a str> {
        let i = self.header.get(name).copied().unwrap_or(pos);
        self.record.get(i)
    }

    /// Parses a trimmed numeric field; `None` marks the row as malformed.
    pub fn parse<T: FromStr>(&self, name: &str, pos: usize) -> Option<T> {
        self.get(name, pos)?.trim().parse().ok()
    }
}

/// Header-aware CSV reader that skips malformed rows instead of failing the scan.
pub struct Table<R> {
    reader: csv::Reader<R>,
    header: HashMap<String, usize>,
}

impl Table<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self> {
        let f = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        Self::from_reader(BufReader::new(f))
    }
}

impl<R: Read> Table<R> {
    pub fn from_reader(rdr: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new().flexible(true).has_headers(true).from_reader(rdr);
        let header = reader
            .headers()?
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim().to_string(), i))
            .collect();
        Ok(Self { reader, header })
    }

    /// Calls `f` for every row with at least `min_fields` columns. Rows that are
    /// too short or not valid UTF-8 are counted and skipped; I/O errors abort.
    /// Returns the number of rows handed to `f`.
    pub fn scan<F>(&mut self, min_fields: usize, mut f: F) -> Result<usize>
    where
        F: FnMut(&Row<'_>),
    {
        let mut record = StringRecord::new();
        let mut visited = 0usize;
        let mut skipped = 0usize;
        loop {
            match self.reader.read_record(&mut record) {
                Ok(true) => {
                    if record.len() < min_fields {
                        skipped += 1;
                        continue;
                    }
                    f(&Row { header: &self.header, record: &record });
                    visited += 1;
                }
                Ok(false) => break,
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(_) => skipped += 1,
            }
        }
        if skipped > 0 {
            tracing::debug!(skipped, "skipped malformed rows");
        }
        Ok(visited)
    }
}
