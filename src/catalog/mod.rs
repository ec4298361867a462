//! Static registry of sample room photographs.
//!
//! The catalog is built once at startup and only ever read afterwards, so it
//! can be shared between concurrent pipeline runs behind an `Arc` without any
//! locking. Random selection takes the generator as an argument; pass a seeded
//! `StdRng` to make picks reproducible.

mod dataset;

use std::collections::HashSet;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

pub use dataset::DATASET_VERSION;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("image catalog is empty")]
    Empty,
    #[error("duplicate catalog record id: {0}")]
    DuplicateId(String),
    #[error("catalog record '{id}' has an invalid source locator: {locator}")]
    InvalidLocator { id: String, locator: String },
    #[error("no catalog record with id '{0}'")]
    UnknownId(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// One selectable sample image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub id: String,
    pub source_locator: String,
    pub description: String,
}

impl ImageRecord {
    pub fn new(
        id: impl Into<String>,
        source_locator: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source_locator: source_locator.into(),
            description: description.into(),
        }
    }
}

impl fmt::Display for ImageRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.description)
    }
}

/// Serializable view of the catalog for listings.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogListing<'a> {
    pub dataset_version: u32,
    pub records: &'a [ImageRecord],
}

#[derive(Debug, Clone)]
pub struct Catalog {
    records: Vec<ImageRecord>,
}

impl Catalog {
    /// Build a catalog, rejecting empty lists, duplicate ids and locators
    /// that are not absolute URLs.
    pub fn new(records: Vec<ImageRecord>) -> CatalogResult<Self> {
        if records.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert(record.id.as_str()) {
                return Err(CatalogError::DuplicateId(record.id.clone()));
            }
            if Url::parse(&record.source_locator).is_err() {
                return Err(CatalogError::InvalidLocator {
                    id: record.id.clone(),
                    locator: record.source_locator.clone(),
                });
            }
        }

        Ok(Self { records })
    }

    /// The compiled-in empty room dataset.
    pub fn builtin() -> CatalogResult<Self> {
        Self::new(dataset::records())
    }

    /// All records in their declared order.
    pub fn records(&self) -> &[ImageRecord] {
        &self.records
    }

    pub fn listing(&self) -> CatalogListing<'_> {
        CatalogListing {
            dataset_version: DATASET_VERSION,
            records: &self.records,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ImageRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn require(&self, id: &str) -> CatalogResult<&ImageRecord> {
        self.get(id).ok_or_else(|| CatalogError::UnknownId(id.to_string()))
    }

    /// Pick a record uniformly at random using the supplied generator.
    pub fn pick_random<R: Rng + ?Sized>(&self, rng: &mut R) -> CatalogResult<&ImageRecord> {
        if self.records.is_empty() {
            return Err(CatalogError::Empty);
        }
        let index = rng.random_range(0..self.records.len());
        Ok(&self.records[index])
    }

    /// Pick a record with the thread-local generator.
    pub fn pick_random_default(&self) -> CatalogResult<&ImageRecord> {
        self.pick_random(&mut rand::rng())
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a ImageRecord;
    type IntoIter = std::slice::Iter<'a, ImageRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
