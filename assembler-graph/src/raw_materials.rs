//! The set of items treated as externally supplied inputs

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{CalcError, Result};

/// Items that resolution stops at, whether or not a recipe exists for them.
///
/// Listing an item that has a recipe is allowed and is how partially
/// assembled goods (e.g. circuits from another production line) are fed in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawMaterials {
    items: HashSet<String>,
}

impl RawMaterials {
    /// Parse a newline-delimited list. Blank lines and `#` comments are skipped.
    pub fn parse(text: &str) -> Self {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .collect()
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| CalcError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let raw = Self::parse(&text);
        info!(items = raw.len(), path = %path.display(), "raw material list loaded");
        Ok(raw)
    }

    pub fn contains(&self, item: &str) -> bool {
        self.items.contains(item)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn insert(&mut self, item: &str) {
        self.items.insert(item.to_string());
    }
}

impl<S: AsRef<str>> FromIterator<S> for RawMaterials {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        RawMaterials {
            items: iter.into_iter().map(|s| s.as_ref().to_string()).collect(),
        }
    }
}
