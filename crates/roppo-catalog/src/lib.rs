// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod parse;

pub use parse::{parse_optional_int, parse_optional_number, parse_optional_text};

use roppo_app::{CatalogItem, CatalogItemId};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use thiserror::Error;

pub const APP_NAME: &str = "roppo";
pub const DEFAULT_CATALOG_FILE: &str = "会計監査六法一覧.csv";

pub const COLUMN_ID: &str = "ID";
pub const COLUMN_SECTION_ORDER: &str = "セクション内番号";
pub const COLUMN_SECTION_NAME: &str = "セクション名";
pub const COLUMN_TITLE: &str = "項目名";
pub const COLUMN_URL: &str = "URL";
pub const COLUMN_URL2: &str = "URL2";

pub const REQUIRED_COLUMNS: [&str; 6] = [
    COLUMN_ID,
    COLUMN_SECTION_ORDER,
    COLUMN_SECTION_NAME,
    COLUMN_TITLE,
    COLUMN_URL,
    COLUMN_URL2,
];

/// The catalog file is missing, unreadable, or not the expected table.
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("read catalog {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("parse catalog {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error(
        "catalog {} is missing required column(s) {}; the header must include {}",
        .path.display(),
        .missing.join(", "),
        REQUIRED_COLUMNS.join(", ")
    )]
    MissingColumns {
        path: PathBuf,
        missing: Vec<&'static str>,
    },
    #[error("catalog {} line {line}: URL is empty", .path.display())]
    EmptyUrl { path: PathBuf, line: u64 },
    #[error(
        "catalog {} line {line}: ID {id} already used on line {first_line}",
        .path.display()
    )]
    DuplicateId {
        path: PathBuf,
        line: u64,
        first_line: u64,
        id: CatalogItemId,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fingerprint {
    modified: Option<SystemTime>,
    len: u64,
}

impl Fingerprint {
    fn of(path: &Path) -> Option<Self> {
        let metadata = fs::metadata(path).ok()?;
        Some(Self {
            modified: metadata.modified().ok(),
            len: metadata.len(),
        })
    }
}

struct ColumnMap {
    id: usize,
    section_order: usize,
    section_name: usize,
    title: usize,
    url: usize,
    url2: usize,
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord, path: &Path) -> Result<Self, DataLoadError> {
        let positions = REQUIRED_COLUMNS.map(|name| {
            headers
                .iter()
                .position(|header| header.trim_start_matches('\u{feff}').trim() == name)
        });

        match positions {
            [
                Some(id),
                Some(section_order),
                Some(section_name),
                Some(title),
                Some(url),
                Some(url2),
            ] => Ok(Self {
                id,
                section_order,
                section_name,
                title,
                url,
                url2,
            }),
            _ => Err(DataLoadError::MissingColumns {
                path: path.to_path_buf(),
                missing: REQUIRED_COLUMNS
                    .into_iter()
                    .zip(positions)
                    .filter_map(|(name, position)| position.is_none().then_some(name))
                    .collect(),
            }),
        }
    }
}

/// Parses catalog CSV from any reader. `path` only labels errors.
pub fn parse_catalog<R: io::Read>(
    reader: R,
    path: &Path,
) -> Result<Vec<CatalogItem>, DataLoadError> {
    let parse_error = |source: csv::Error| DataLoadError::Parse {
        path: path.to_path_buf(),
        source,
    };

    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);
    let headers = csv_reader.headers().map_err(parse_error)?.clone();
    let columns = ColumnMap::from_headers(&headers, path)?;

    let mut items = Vec::new();
    let mut seen_ids: HashMap<CatalogItemId, u64> = HashMap::new();
    for (row, record) in csv_reader.records().enumerate() {
        let record = record.map_err(parse_error)?;
        let line = record
            .position()
            .map_or(row as u64 + 2, csv::Position::line);
        let cell = |index: usize| record.get(index).unwrap_or("");

        let raw_id = cell(columns.id);
        let id = parse_optional_int(raw_id).map(CatalogItemId::new);
        if id.is_none() && !raw_id.trim().is_empty() {
            tracing::debug!(line, value = raw_id, "non-numeric ID coerced to missing");
        }
        if let Some(id) = id
            && let Some(first_line) = seen_ids.insert(id, line)
        {
            return Err(DataLoadError::DuplicateId {
                path: path.to_path_buf(),
                line,
                first_line,
                id,
            });
        }

        let url = cell(columns.url).trim();
        if url.is_empty() {
            return Err(DataLoadError::EmptyUrl {
                path: path.to_path_buf(),
                line,
            });
        }

        items.push(CatalogItem {
            id,
            section_name: cell(columns.section_name).trim().to_owned(),
            section_order: parse_optional_number(cell(columns.section_order)),
            title: cell(columns.title).trim().to_owned(),
            url: url.to_owned(),
            url2: parse_optional_text(cell(columns.url2)),
            row,
        });
    }

    Ok(items)
}

/// Immutable, shareable catalog snapshot backed by a CSV file.
pub struct CatalogStore {
    path: PathBuf,
    items: Arc<[CatalogItem]>,
    fingerprint: Option<Fingerprint>,
}

impl CatalogStore {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DataLoadError> {
        let path = path.as_ref().to_path_buf();
        let fingerprint = Fingerprint::of(&path);
        let items = read_catalog(&path)?;
        tracing::info!(path = %path.display(), items = items.len(), "catalog loaded");
        Ok(Self {
            path,
            items: items.into(),
            fingerprint,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn items(&self) -> Arc<[CatalogItem]> {
        Arc::clone(&self.items)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: CatalogItemId) -> Option<&CatalogItem> {
        self.items.iter().find(|item| item.id == Some(id))
    }

    /// Forces the next [`refresh`](Self::refresh) to re-read the file.
    pub fn invalidate(&mut self) {
        self.fingerprint = None;
    }

    /// Re-reads the file when it changed since the last load. On failure the
    /// previous snapshot stays in place.
    pub fn refresh(&mut self) -> Result<bool, DataLoadError> {
        let current = Fingerprint::of(&self.path);
        if current.is_some() && current == self.fingerprint {
            tracing::debug!(path = %self.path.display(), "catalog unchanged");
            return Ok(false);
        }

        let items = read_catalog(&self.path)?;
        tracing::info!(
            path = %self.path.display(),
            items = items.len(),
            "catalog reloaded"
        );
        self.items = items.into();
        self.fingerprint = current;
        Ok(true)
    }
}

fn read_catalog(path: &Path) -> Result<Vec<CatalogItem>, DataLoadError> {
    let file = fs::File::open(path).map_err(|source| DataLoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_catalog(io::BufReader::new(file), path)
}

pub fn resolve_catalog_path(configured: Option<&str>, base_dir: &Path) -> PathBuf {
    let raw = configured.unwrap_or(DEFAULT_CATALOG_FILE);
    let path = PathBuf::from(raw);
    if path.is_absolute() {
        path
    } else {
        base_dir.join(path)
    }
}
