//! Pincode → place-name lookup built from the India pincode directory CSV.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::parser::for_each_row;

/// Column holding the administrative sub-area name.
pub const AREA_NAME_COLUMN: &str = "Taluk";

/// Place-name value the directory uses for "unknown".
pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DirectoryEntry {
    pincode: String,
    #[serde(rename = "Taluk")]
    area_name: String,
}

/// Sorted, de-duplicated place names for each pincode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationIndex {
    entries: HashMap<String, Vec<String>>,
}

impl LocationIndex {
    /// Loads the index from the directory CSV at `path`.
    ///
    /// A missing file yields an empty index. Invalid UTF-8 is replaced
    /// rather than rejected.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(path = %path.display(), "Pincode file not found");
            return Ok(Self::default());
        }

        let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let content = String::from_utf8_lossy(&bytes);
        let index = Self::from_reader(content.as_bytes())
            .with_context(|| format!("parsing {}", path.display()))?;

        info!(pincodes = index.len(), "Loaded pincode locations");
        Ok(index)
    }

    /// Builds the index from CSV data with a header row.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut sets: HashMap<String, BTreeSet<String>> = HashMap::new();
        for_each_row(reader, |entry: DirectoryEntry| {
            insert(&mut sets, &entry.pincode, &entry.area_name);
        })?;

        debug!(pincodes = sets.len(), "Pincode directory parsed");
        Ok(Self::from_sets(sets))
    }

    fn from_sets(sets: HashMap<String, BTreeSet<String>>) -> Self {
        let entries = sets
            .into_iter()
            .map(|(code, names)| (code, names.into_iter().collect()))
            .collect();
        LocationIndex { entries }
    }

    /// Place names for `pincode`, empty if it is not in the directory.
    pub fn get(&self, pincode: &str) -> &[String] {
        self.entries.get(pincode).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for LocationIndex {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut sets = HashMap::new();
        for (code, name) in iter {
            insert(&mut sets, &code, &name);
        }
        Self::from_sets(sets)
    }
}

fn insert(sets: &mut HashMap<String, BTreeSet<String>>, code: &str, name: &str) {
    let code = code.trim();
    let name = name.trim();
    if code.is_empty() || name.is_empty() || name == NOT_AVAILABLE {
        return;
    }
    sets.entry(code.to_string())
        .or_default()
        .insert(name.to_string());
}
