//! Translation lookup
//!
//! Catalogs are JSON documents of nested objects. Keys are the dotted paths
//! to string leaves, and values may contain `{{ name }}` placeholders:
//!
//! ```json
//! { "error": { "url": { "not": { "found": "Not found" } } },
//!   "userManagement": { "created": "User {{ param }} created" } }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value;
use thiserror::Error;

/// Interpolation parameters.
pub type Params = BTreeMap<String, String>;

static PLACEHOLDER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([\w.-]+)\s*\}\}").ok());

/// Errors loading a translation catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("catalog root must be a JSON object")]
    NotAnObject,
}

/// Key to display text.
pub trait Translate {
    /// Translate `key`, interpolating `params`.
    ///
    /// Unknown keys yield `fallback` if given, else
    /// `translation-not-found[key]`.
    fn translate(&self, key: &str, params: &Params, fallback: Option<&str>) -> String;
}

impl<T: Translate + ?Sized> Translate for &T {
    fn translate(&self, key: &str, params: &Params, fallback: Option<&str>) -> String {
        (**self).translate(key, params, fallback)
    }
}

/// Flat key/value translation catalog
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: HashMap<String, String>,
}

impl Catalog {
    /// Empty catalog; every lookup falls back.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let value: Value = serde_json::from_str(json)?;
        let Value::Object(root) = value else {
            return Err(CatalogError::NotAnObject);
        };

        let mut catalog = Self::new();
        for (key, value) in root {
            catalog.flatten(key, value);
        }
        Ok(catalog)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::from_json_str(&json)?;
        tracing::debug!(path = %path.display(), keys = catalog.len(), "loaded catalog");
        Ok(catalog)
    }

    pub fn insert(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.entries.insert(key.into(), text.into());
    }

    pub fn with(mut self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(key, text);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn flatten(&mut self, prefix: String, value: Value) {
        match value {
            Value::Object(map) => {
                for (key, value) in map {
                    self.flatten(format!("{prefix}.{key}"), value);
                }
            }
            Value::String(text) => self.insert(prefix, text),
            Value::Null => {}
            other => self.insert(prefix, other.to_string()),
        }
    }
}

impl Translate for Catalog {
    fn translate(&self, key: &str, params: &Params, fallback: Option<&str>) -> String {
        match self.get(key) {
            Some(template) => interpolate(template, params),
            None => fallback
                .map(str::to_string)
                .unwrap_or_else(|| format!("translation-not-found[{key}]")),
        }
    }
}

/// Replace `{{ name }}` placeholders; unknown names are left as written.
pub fn interpolate(template: &str, params: &Params) -> String {
    let Some(placeholder) = PLACEHOLDER.as_ref() else {
        return template.to_string();
    };
    placeholder
        .replace_all(template, |caps: &Captures| match params.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Build params from `(name, value)` pairs.
pub fn params<const N: usize>(pairs: [(&str, String); N]) -> Params {
    pairs
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}
