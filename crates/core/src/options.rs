//! Parse options and their JSONC loader.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What to do with a line that cannot be placed in a record
/// (bad level, orphan, missing identifier, too deep).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MalformedLinePolicy {
    /// Drop the line silently.
    Skip,
    /// Drop the line and record a diagnostic.
    #[default]
    #[serde(alias = "warn")]
    CollectWarning,
    /// Stop at the first such line and return its error.
    Abort,
}

/// What to do when a record id has already been seen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicateIdPolicy {
    /// The later record replaces the earlier one, which keeps its position.
    #[default]
    Overwrite,
    /// The later record is discarded.
    KeepFirst,
    /// The later record is kept under `ID-2`, `ID-3`, ...
    AppendSuffix,
}

/// Options for [`parse`](crate::parse).
///
/// Deserializes from JSON with every field optional:
///
/// ```json
/// { "max_depth": 3, "on_malformed_line": "abort", "record_kinds": ["INDI"] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParseOptions {
    /// Deepest level accepted; `None` means unbounded.
    pub max_depth: Option<u32>,
    /// Handling of lines that cannot be placed.
    pub on_malformed_line: MalformedLinePolicy,
    /// Handling of repeated record ids.
    pub duplicate_id_policy: DuplicateIdPolicy,
    /// Inserted between tags when building a tag path.
    pub path_separator: String,
    /// Fail with `EmptyInput` when no record is produced.
    pub require_records: bool,
    /// Fold `CONT`/`CONC` lines into their parent's value.
    pub join_continuations: bool,
    /// Keep only records whose type is listed (e.g. `["INDI"]`).
    pub record_kinds: Option<Vec<String>>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: None,
            on_malformed_line: MalformedLinePolicy::CollectWarning,
            duplicate_id_policy: DuplicateIdPolicy::Overwrite,
            path_separator: String::new(),
            require_records: false,
            join_continuations: false,
            record_kinds: None,
        }
    }
}

impl ParseOptions {
    /// Check invariants that serde cannot express.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.max_depth == Some(0) {
            return Err(OptionsError::InvalidField {
                field: "max_depth".into(),
                reason: "must be at least 1 (level-0 lines only start records)".into(),
            });
        }
        if let Some(kinds) = &self.record_kinds {
            if kinds.is_empty() {
                return Err(OptionsError::InvalidField {
                    field: "record_kinds".into(),
                    reason: "must list at least one record type; omit it to keep all".into(),
                });
            }
            if let Some(i) = kinds.iter().position(|k| k.trim().is_empty()) {
                return Err(OptionsError::InvalidField {
                    field: format!("record_kinds[{i}]"),
                    reason: "must not be empty".into(),
                });
            }
        }
        Ok(())
    }

    /// Whether records of type `kind` pass the `record_kinds` filter.
    pub fn keeps_kind(&self, kind: &str) -> bool {
        self.record_kinds
            .as_ref()
            .is_none_or(|kinds| kinds.iter().any(|k| k == kind))
    }
}

/// Errors that can occur when loading parse options.
#[derive(Debug, Error)]
pub enum OptionsError {
    /// JSON deserialization failed.
    #[error("invalid options JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A field value is out of its valid range.
    #[error("invalid {field}: {reason}")]
    InvalidField {
        /// Name of the offending field.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Load and validate options from a JSONC document.
///
/// Comments and trailing commas are accepted; unknown keys are rejected.
pub fn load_options_from_str(s: &str) -> Result<ParseOptions, OptionsError> {
    let json = gedcom_toolchain_jsonc_strip::jsonc_to_json(s);
    let options: ParseOptions = serde_json::from_str(&json)?;
    options.validate()?;
    Ok(options)
}
