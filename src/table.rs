//! Loader for the `conf/*.csv` reference tables.
//!
//! The tables are split on bare commas. Free-text documentation that itself
//! contains commas is wrapped in quotes and spans several columns, so it is
//! stitched back together by [`Row::docs`].

use log::info;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::{ImportError, ParseFailure, Result};

/// Marks an absent value in every table.
pub const SENTINEL: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// 1-based line number in the source file.
    pub line: usize,
    pub columns: Vec<String>,
}

impl Row {
    pub fn parse(line: usize, raw: &str) -> Self {
        let mut columns: Vec<String> = raw.split(',').map(str::to_string).collect();
        while columns.last().is_some_and(|c| c.is_empty()) {
            columns.pop();
        }
        Self { line, columns }
    }

    fn column(&self, path: &Path, index: usize) -> Result<&str> {
        self.columns.get(index).map(String::as_str).ok_or_else(|| {
            ImportError::parse(
                path,
                self.line,
                ParseFailure::MissingColumn {
                    index,
                    found: self.columns.len(),
                },
            )
        })
    }

    /// Documentation starting at column `start`, `None` when absent.
    pub fn docs(&self, path: &Path, start: usize) -> Result<Option<String>> {
        let Some(first) = self.columns.get(start) else {
            return Ok(None);
        };
        if !first.starts_with('"') {
            return Ok(present(first));
        }

        let joined = self.columns[start..].join(", ");
        let inner = &joined[1..];
        let end = inner.rfind('"').ok_or_else(|| {
            ImportError::parse(path, self.line, ParseFailure::UnterminatedQuote)
        })?;
        Ok(Some(inner[..end].to_string()))
    }
}

fn present(value: &str) -> Option<String> {
    (value != SENTINEL).then(|| value.to_string())
}

/// Reads every row of `path` after the first `skip` lines.
pub fn read_table(path: &Path, skip: usize) -> Result<Vec<Row>> {
    let file = File::open(path).map_err(|e| ImportError::resource(path, e))?;
    let mut rows = Vec::new();
    for (idx, line) in BufReader::new(file).lines().enumerate().skip(skip) {
        let line = line.map_err(|e| ImportError::resource(path, e))?;
        rows.push(Row::parse(idx + 1, &line));
    }
    Ok(rows)
}

/// Column positions of one member table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberColumns {
    pub key: usize,
    pub name: usize,
    pub docs: usize,
}

pub const FIELD_COLUMNS: MemberColumns = MemberColumns {
    key: 2,
    name: 6,
    docs: 7,
};

pub const METHOD_COLUMNS: MemberColumns = MemberColumns {
    key: 1,
    name: 4,
    docs: 5,
};

pub const CLASS_KEY_COLUMN: usize = 2;
pub const CLASS_DOCS_COLUMN: usize = 5;

/// Class documentation keyed by obfuscated class name.
#[derive(Debug, Clone, Default)]
pub struct ClassDocs {
    docs: HashMap<String, String>,
}

impl ClassDocs {
    pub fn from_rows(path: &Path, rows: &[Row]) -> Result<Self> {
        let mut docs = HashMap::new();
        for row in rows {
            // the key is only required once there is something to attach to it
            if let Some(doc) = row.docs(path, CLASS_DOCS_COLUMN)? {
                let key = row.column(path, CLASS_KEY_COLUMN)?;
                docs.insert(key.to_string(), doc);
            }
        }
        Ok(Self { docs })
    }

    pub fn load(path: &Path, skip: usize) -> Result<Self> {
        let table = Self::from_rows(path, &read_table(path, skip)?)?;
        info!("loaded {} class docs from {}", table.len(), path.display());
        Ok(table)
    }

    pub fn get(&self, class: &str) -> Option<&str> {
        self.docs.get(class).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

/// Renames and documentation of fields or methods, keyed by searge-style key.
#[derive(Debug, Clone, Default)]
pub struct MemberTable {
    names: HashMap<String, String>,
    docs: HashMap<String, String>,
}

impl MemberTable {
    pub fn from_rows(path: &Path, rows: &[Row], columns: MemberColumns) -> Result<Self> {
        let mut table = Self::default();
        for row in rows {
            let key = row.column(path, columns.key)?;
            if key == SENTINEL {
                continue;
            }
            if let Some(name) = present(row.column(path, columns.name)?) {
                table.names.insert(key.to_string(), name);
            }
            if let Some(doc) = row.docs(path, columns.docs)? {
                table.docs.insert(key.to_string(), doc);
            }
        }
        Ok(table)
    }

    pub fn load(path: &Path, skip: usize, columns: MemberColumns) -> Result<Self> {
        let table = Self::from_rows(path, &read_table(path, skip)?, columns)?;
        info!(
            "loaded {} names and {} docs from {}",
            table.names.len(),
            table.docs.len(),
            path.display()
        );
        Ok(table)
    }

    /// The rename target of `key`, or `key` itself when none is recorded.
    pub fn name_or_key<'a>(&'a self, key: &'a str) -> &'a str {
        self.names.get(key).map(String::as_str).unwrap_or(key)
    }

    pub fn docs(&self, key: &str) -> Option<&str> {
        self.docs.get(key).map(String::as_str)
    }

    pub fn name_count(&self) -> usize {
        self.names.len()
    }

    pub fn docs_count(&self) -> usize {
        self.docs.len()
    }
}

/// All three tables, loaded from their files.
#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub classes: ClassDocs,
    pub fields: MemberTable,
    pub methods: MemberTable,
}

#[derive(Debug, Clone)]
pub struct TableSource {
    pub path: PathBuf,
    pub header_rows: usize,
}

impl Tables {
    pub fn load(classes: &TableSource, fields: &TableSource, methods: &TableSource) -> Result<Self> {
        Ok(Self {
            classes: ClassDocs::load(&classes.path, classes.header_rows)?,
            fields: MemberTable::load(&fields.path, fields.header_rows, FIELD_COLUMNS)?,
            methods: MemberTable::load(&methods.path, methods.header_rows, METHOD_COLUMNS)?,
        })
    }
}
