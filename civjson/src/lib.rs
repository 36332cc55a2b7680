//! Raw parse trees for ruleset JSON files.
//!
//! This crate reads one data file into a `serde_json::Value` tree and exposes
//! it through [`RawDocumentIndex`]: the entries in file order, a lookup table
//! by `"name"`, and [`RawEntry`] accessors that take a default instead of
//! failing. It is the ground truth the data loader compares decoded objects
//! against.

mod entry;
mod error;

pub use entry::RawEntry;
pub use error::RawError;

use encoding_rs::UTF_8;
use encoding_rs_io::DecodeReaderBytesBuilder;
use serde_json::Value;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Reads a data file into a string.
///
/// Files are decoded as UTF-8 unless a byte order mark says otherwise; the
/// BOM itself is stripped so the JSON parser never sees it.
pub fn read_text(path: &Path) -> std::io::Result<String> {
    let file = File::open(path)?;
    let mut buf_reader = BufReader::new(
        DecodeReaderBytesBuilder::new()
            .encoding(Some(UTF_8))
            .bom_override(true)
            .strip_bom(true)
            .build(file),
    );
    let mut contents = String::new();
    buf_reader.read_to_string(&mut contents)?;
    Ok(contents)
}

/// An addressable parse tree of one category file.
///
/// Array documents expose their elements as entries; a single-object
/// document exposes itself as the only entry. The name table keeps the
/// *first* entry for every non-blank `"name"`.
#[derive(Debug, Clone)]
pub struct RawDocumentIndex {
    root: Value,
    by_name: HashMap<String, usize>,
}

impl RawDocumentIndex {
    pub fn parse(text: &str) -> Result<Self, RawError> {
        let root: Value = serde_json::from_str(text)?;
        Ok(Self::from_value(root))
    }

    pub fn open(path: &Path) -> Result<Self, RawError> {
        let text = read_text(path).map_err(|source| RawError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn from_value(root: Value) -> Self {
        let mut by_name = HashMap::new();
        for (index, entry) in entry_values(&root).iter().enumerate() {
            if let Some(name) = RawEntry::new(entry).name() {
                let first = *by_name.entry(name.to_string()).or_insert(index);
                if first != index {
                    log::debug!(
                        "Duplicate name '{}' at entry {}; lookups use entry {}",
                        name,
                        index,
                        first
                    );
                }
            }
        }
        Self { root, by_name }
    }

    pub fn root(&self) -> RawEntry<'_> {
        RawEntry::new(&self.root)
    }

    pub fn len(&self) -> usize {
        entry_values(&self.root).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries in file order.
    pub fn entries(&self) -> impl Iterator<Item = RawEntry<'_>> {
        entry_values(&self.root).iter().map(RawEntry::new)
    }

    /// The entry at `index` in file order.
    pub fn entry(&self, index: usize) -> Option<RawEntry<'_>> {
        entry_values(&self.root).get(index).map(RawEntry::new)
    }

    /// The first entry whose `"name"` equals `name`.
    pub fn by_name(&self, name: &str) -> Option<RawEntry<'_>> {
        self.by_name.get(name).and_then(|&index| self.entry(index))
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }
}

fn entry_values(root: &Value) -> &[Value] {
    match root {
        Value::Array(items) => items.as_slice(),
        Value::Object(_) => std::slice::from_ref(root),
        _ => &[],
    }
}
