//! Translator configuration
//!
//! Field names and sentinels depend on how the catalog index was built, so
//! they are configurable. A [`TranslatorConfigLayer`] holds the values one
//! source sets; layers merge in order and finalise over the defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Errors that can occur while loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error in {path}: {source}")]
    TomlParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl ConfigError {
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub const DEFAULT_ALL_DOCUMENTS: &str = "metafile:doc";
pub const DEFAULT_TYPE_FIELD: &str = "objectType";
pub const DEFAULT_IDENTIFIER_FIELD: &str = "identifier";
pub const DEFAULT_GEOMETRY_FIELD: &str = "BoundingBox";
pub const DEFAULT_CRS: &str = "EPSG:4326";
pub const DATE_LOWER_BOUND: &str = "00000101000000";
pub const DATE_UPPER_BOUND: &str = "30000101000000";
pub const NUMERIC_LOWER_BOUND: &str = "-2147483648";
pub const NUMERIC_UPPER_BOUND: &str = "2147483647";
pub const DEFAULT_SORT_SUFFIX: &str = "_sort";

fn default_date_fields() -> Vec<String> {
    [
        "CreationDate",
        "Modified",
        "PublicationDate",
        "RevisionDate",
        "TempExtent_begin",
        "TempExtent_end",
        "date",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// One configuration source; unset fields defer to earlier layers
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TranslatorConfigLayer {
    pub all_documents: Option<String>,
    pub type_field: Option<String>,
    pub identifier_field: Option<String>,
    pub default_geometry_field: Option<String>,
    pub default_crs: Option<String>,
    pub date_fields: Option<Vec<String>>,
    pub date_lower_bound: Option<String>,
    pub date_upper_bound: Option<String>,
    pub numeric_lower_bound: Option<String>,
    pub numeric_upper_bound: Option<String>,
    pub sort_suffix: Option<String>,
}

impl TranslatorConfigLayer {
    pub fn from_toml_str(source: &str, path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|source| ConfigError::TomlParse {
            path: path.into(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source, path)
    }

    pub fn merge(&mut self, other: Self) {
        if other.all_documents.is_some() {
            self.all_documents = other.all_documents;
        }
        if other.type_field.is_some() {
            self.type_field = other.type_field;
        }
        if other.identifier_field.is_some() {
            self.identifier_field = other.identifier_field;
        }
        if other.default_geometry_field.is_some() {
            self.default_geometry_field = other.default_geometry_field;
        }
        if other.default_crs.is_some() {
            self.default_crs = other.default_crs;
        }
        if other.date_fields.is_some() {
            self.date_fields = other.date_fields;
        }
        if other.date_lower_bound.is_some() {
            self.date_lower_bound = other.date_lower_bound;
        }
        if other.date_upper_bound.is_some() {
            self.date_upper_bound = other.date_upper_bound;
        }
        if other.numeric_lower_bound.is_some() {
            self.numeric_lower_bound = other.numeric_lower_bound;
        }
        if other.numeric_upper_bound.is_some() {
            self.numeric_upper_bound = other.numeric_upper_bound;
        }
        if other.sort_suffix.is_some() {
            self.sort_suffix = other.sort_suffix;
        }
    }

    pub fn finalize(self) -> Result<TranslatorConfig, ConfigError> {
        let config = TranslatorConfig {
            all_documents: self
                .all_documents
                .unwrap_or_else(|| DEFAULT_ALL_DOCUMENTS.to_string()),
            type_field: self
                .type_field
                .unwrap_or_else(|| DEFAULT_TYPE_FIELD.to_string()),
            identifier_field: self
                .identifier_field
                .unwrap_or_else(|| DEFAULT_IDENTIFIER_FIELD.to_string()),
            default_geometry_field: self
                .default_geometry_field
                .unwrap_or_else(|| DEFAULT_GEOMETRY_FIELD.to_string()),
            default_crs: self.default_crs.unwrap_or_else(|| DEFAULT_CRS.to_string()),
            date_fields: self.date_fields.unwrap_or_else(default_date_fields),
            date_lower_bound: self
                .date_lower_bound
                .unwrap_or_else(|| DATE_LOWER_BOUND.to_string()),
            date_upper_bound: self
                .date_upper_bound
                .unwrap_or_else(|| DATE_UPPER_BOUND.to_string()),
            numeric_lower_bound: self
                .numeric_lower_bound
                .unwrap_or_else(|| NUMERIC_LOWER_BOUND.to_string()),
            numeric_upper_bound: self
                .numeric_upper_bound
                .unwrap_or_else(|| NUMERIC_UPPER_BOUND.to_string()),
            sort_suffix: self
                .sort_suffix
                .unwrap_or_else(|| DEFAULT_SORT_SUFFIX.to_string()),
        };
        config.validate()?;
        Ok(config)
    }
}

fn parse_number(field: &str, value: &str) -> Result<f64, ConfigError> {
    match value.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(n),
        _ => Err(ConfigError::invalid_value(field, format!("{:?} is not a number", value))),
    }
}

/// Index field names and range sentinels used by the translator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranslatorConfig {
    /// Clause matching every document, the left side of a NOT
    pub all_documents: String,
    /// Field holding the record's type name
    pub type_field: String,
    pub identifier_field: String,
    /// Geometry field used when a spatial operator names no property
    pub default_geometry_field: String,
    pub default_crs: String,
    /// Fields whose values are compared as dates (local names)
    pub date_fields: Vec<String>,
    pub date_lower_bound: String,
    pub date_upper_bound: String,
    pub numeric_lower_bound: String,
    pub numeric_upper_bound: String,
    pub sort_suffix: String,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            all_documents: DEFAULT_ALL_DOCUMENTS.to_string(),
            type_field: DEFAULT_TYPE_FIELD.to_string(),
            identifier_field: DEFAULT_IDENTIFIER_FIELD.to_string(),
            default_geometry_field: DEFAULT_GEOMETRY_FIELD.to_string(),
            default_crs: DEFAULT_CRS.to_string(),
            date_fields: default_date_fields(),
            date_lower_bound: DATE_LOWER_BOUND.to_string(),
            date_upper_bound: DATE_UPPER_BOUND.to_string(),
            numeric_lower_bound: NUMERIC_LOWER_BOUND.to_string(),
            numeric_upper_bound: NUMERIC_UPPER_BOUND.to_string(),
            sort_suffix: DEFAULT_SORT_SUFFIX.to_string(),
        }
    }
}

impl TranslatorConfig {
    /// Load a single TOML file over the defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        TranslatorConfigLayer::load(path)?.finalize()
    }

    /// Merge layers in order (later wins) and finalise
    pub fn from_layers(
        layers: impl IntoIterator<Item = TranslatorConfigLayer>,
    ) -> Result<Self, ConfigError> {
        let mut merged = TranslatorConfigLayer::default();
        for layer in layers {
            merged.merge(layer);
        }
        merged.finalize()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("all_documents", &self.all_documents),
            ("type_field", &self.type_field),
            ("identifier_field", &self.identifier_field),
            ("default_geometry_field", &self.default_geometry_field),
            ("date_lower_bound", &self.date_lower_bound),
            ("date_upper_bound", &self.date_upper_bound),
            ("numeric_lower_bound", &self.numeric_lower_bound),
            ("numeric_upper_bound", &self.numeric_upper_bound),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::invalid_value(field, "must not be empty"));
            }
        }
        if self.date_lower_bound >= self.date_upper_bound {
            return Err(ConfigError::invalid_value(
                "date_lower_bound",
                "must sort before date_upper_bound",
            ));
        }
        let lower = parse_number("numeric_lower_bound", &self.numeric_lower_bound)?;
        let upper = parse_number("numeric_upper_bound", &self.numeric_upper_bound)?;
        if lower >= upper {
            return Err(ConfigError::invalid_value(
                "numeric_lower_bound",
                "must be less than numeric_upper_bound",
            ));
        }
        Ok(())
    }

    /// True if `field` (a local name) holds dates
    pub fn is_date_field(&self, field: &str) -> bool {
        self.date_fields
            .iter()
            .any(|f| f.eq_ignore_ascii_case(field))
    }
}
