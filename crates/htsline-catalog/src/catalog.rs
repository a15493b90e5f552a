//! Immutable in-memory HTS classification catalog.
//!
//! The catalog is produced offline by an embedding build over the published
//! tariff schedule and persisted as JSONL, one record per line:
//!
//! ```text
//! {"htsno": "9401.61.0000", "description": "...", "general": "Free", "embedding": [..]}
//! ```
//!
//! Heading rows in the schedule carry no embedding; the build leaves them in
//! the file and the loader skips them. The catalog is loaded in full before
//! the first query and never mutated afterwards.

use std::collections::HashMap;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info, warn};

use htsline_core::{Error, HtsRecord, Result, Vector};

/// One line of the catalog file. `embedding` is optional on disk (heading
/// rows); records without it never enter the catalog.
#[derive(Debug, Deserialize)]
struct CatalogLine {
    htsno: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    general: String,
    embedding: Option<Vector>,
}

/// Immutable collection of classification records with unique codes and a
/// single shared embedding dimension.
#[derive(Debug, Default)]
pub struct Catalog {
    records: Vec<HtsRecord>,
    by_code: HashMap<String, usize>,
    dimension: usize,
}

impl Catalog {
    /// Load a catalog from a JSONL file.
    ///
    /// A missing or unreadable file, a malformed line, or records with
    /// inconsistent embedding dimensions are configuration errors. Lines
    /// without an embedding are skipped. Duplicate codes keep the first
    /// occurrence (schedule order).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| {
            Error::Config(format!("Cannot open catalog file {}: {}", path.display(), e))
        })?;

        let mut catalog = Self::default();
        let mut skipped = 0usize;

        for (line_no, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| {
                Error::Config(format!(
                    "Failed reading catalog line {}: {}",
                    line_no + 1,
                    e
                ))
            })?;
            if line.trim().is_empty() {
                continue;
            }

            let parsed: CatalogLine = serde_json::from_str(&line).map_err(|e| {
                Error::Config(format!("Malformed catalog line {}: {}", line_no + 1, e))
            })?;

            let Some(embedding) = parsed.embedding else {
                skipped += 1;
                continue;
            };

            catalog.push(HtsRecord {
                htsno: parsed.htsno,
                description: parsed.description,
                general: parsed.general,
                embedding,
            })?;
        }

        info!(
            subsystem = "catalog",
            result_count = catalog.len(),
            dimension = catalog.dimension,
            skipped,
            "Catalog loaded from {}",
            path.display()
        );
        if catalog.is_empty() {
            warn!(subsystem = "catalog", "Catalog is empty; searches will return no results");
        }

        Ok(catalog)
    }

    /// Build a catalog from already-materialized records (tests, embedded
    /// fixtures). Applies the same dimension and uniqueness rules as
    /// [`Catalog::load`].
    pub fn from_records(records: Vec<HtsRecord>) -> Result<Self> {
        let mut catalog = Self::default();
        for record in records {
            catalog.push(record)?;
        }
        Ok(catalog)
    }

    fn push(&mut self, record: HtsRecord) -> Result<()> {
        if self.records.is_empty() {
            self.dimension = record.embedding.len();
        } else if record.embedding.len() != self.dimension {
            return Err(Error::Config(format!(
                "Embedding dimension mismatch in catalog: {} has {} dims, expected {}",
                record.htsno,
                record.embedding.len(),
                self.dimension
            )));
        }

        if self.by_code.contains_key(&record.htsno) {
            debug!(hts_code = %record.htsno, "Duplicate catalog code; keeping first occurrence");
            return Ok(());
        }

        self.by_code.insert(record.htsno.clone(), self.records.len());
        self.records.push(record);
        Ok(())
    }

    /// Look up a record by its classification code.
    pub fn get(&self, hts_code: &str) -> Option<&HtsRecord> {
        self.by_code.get(hts_code).map(|&idx| &self.records[idx])
    }

    /// Iterate records in catalog (schedule) order.
    pub fn iter(&self) -> impl Iterator<Item = &HtsRecord> {
        self.records.iter()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the catalog holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Shared embedding dimension (0 for an empty catalog).
    pub fn dimension(&self) -> usize {
        self.dimension
    }
}
