use crate::mapper::IdMapper;
use crate::table::Table;
use crate::Idx;
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::fs::{self, create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub struct OutputPaths {
    pub root: PathBuf,
}

impl OutputPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn movies(&self) -> PathBuf { self.root.join("movies.ndjson") }
    pub fn ratings(&self) -> PathBuf { self.root.join("ratings.ndjson") }
    pub fn users(&self) -> PathBuf { self.root.join("users.ndjson") }
    pub fn similarities(&self) -> PathBuf { self.root.join("similarities.ndjson") }
    pub fn password_log(&self) -> PathBuf { self.root.join("passwords_log.csv") }
}

/// Column names of a persisted key -> index table, e.g. ("movieId", "iIdx").
#[derive(Debug, Clone, Copy)]
pub struct MappingColumns {
    pub key: &'static str,
    pub idx: &'static str,
}

pub const ITEM_MAP_COLUMNS: MappingColumns = MappingColumns { key: "movieId", idx: "iIdx" };
pub const USER_MAP_COLUMNS: MappingColumns = MappingColumns { key: "userId", idx: "uIdx" };

pub fn load_mapping(path: &Path, cols: MappingColumns) -> Result<IdMapper> {
    let mut forward: HashMap<u32, Idx> = HashMap::new();
    Table::open(path)?.scan(2, |row| {
        if let (Some(key), Some(idx)) = (row.parse::<u32>(cols.key, 0), row.parse::<Idx>(cols.idx, 1)) {
            if key > 0 {
                forward.insert(key, idx);
            }
        }
    })?;
    Ok(IdMapper::from_map(forward))
}

/// Writes the mapping ordered by index. The table is written next to `path`
/// and renamed over it so a crash never leaves a truncated mapping behind.
pub fn save_mapping(path: &Path, mapper: &IdMapper, cols: MappingColumns) -> Result<()> {
    if let Some(dir) = path.parent() {
        create_dir_all(dir)?;
    }
    let mut rows: Vec<(u32, Idx)> = mapper.snapshot().into_iter().collect();
    rows.sort_unstable_by_key(|&(key, idx)| (idx, key));

    let tmp = path.with_extension("csv.tmp");
    {
        let mut w = csv::Writer::from_path(&tmp).with_context(|| format!("creating {}", tmp.display()))?;
        w.write_record([cols.key, cols.idx])?;
        for (key, idx) in rows {
            w.write_record([key.to_string(), idx.to_string()])?;
        }
        w.flush()?;
    }
    fs::rename(&tmp, path).with_context(|| format!("replacing {}", path.display()))?;
    Ok(())
}

/// Newline-delimited JSON output, one record per line.
pub struct NdjsonWriter<W: Write> {
    out: BufWriter<W>,
    written: usize,
}

impl NdjsonWriter<File> {
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(dir) = path.parent() {
            create_dir_all(dir)?;
        }
        let f = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        Ok(Self::new(f))
    }
}

impl<W: Write> NdjsonWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { out: BufWriter::new(inner), written: 0 }
    }

    pub fn write<T: Serialize>(&mut self, record: &T) -> Result<()> {
        serde_json::to_writer(&mut self.out, record)?;
        self.out.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    /// Flushes and returns the number of records written.
    pub fn finish(mut self) -> Result<usize> {
        self.out.flush()?;
        Ok(self.written)
    }
}
