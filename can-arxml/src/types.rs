//! Core types shared by the ARXML loaders
//!
//! This module defines the error type every loader stage reports through and
//! the value type used for signal initial values.

use crate::database::NamedValue;
use serde::Serialize;
use std::fmt;

/// Result type for loader operations
pub type Result<T> = std::result::Result<T, ArxmlError>;

/// Errors that abort an ARXML load
///
/// Every variant is fatal: a load that fails returns no partial database.
/// Recoverable anomalies (unknown compu-method categories, incomplete ECU
/// extract entries) are reported through the `log` facade instead.
#[derive(Debug, thiserror::Error)]
pub enum ArxmlError {
    #[error("Failed to parse XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed ARXML document: {0}")]
    MalformedDocument(String),

    #[error("Unsupported AUTOSAR version: {0}")]
    UnsupportedVersion(String),

    #[error("File contains multiple elements with path '{0}'")]
    DuplicatePath(String),

    #[error("Encountered dangling reference '{reference}'{}", .dest.as_ref().map(|d| format!(" (DEST={})", d)).unwrap_or_default())]
    DanglingReference {
        reference: String,
        dest: Option<String>,
    },

    #[error("Unknown reference base '{}' for relative ARXML reference '{reference}'", .base.as_deref().unwrap_or("<default>"))]
    UnresolvedReferenceBase {
        base: Option<String>,
        reference: String,
    },

    #[error("Multiple default reference bases specified for package '{0}'")]
    MultipleDefaultReferenceBases(String),

    #[error("Package '{package}' specifies multiple reference bases named '{name}'")]
    DuplicateReferenceBase { package: String, name: String },

    #[error("Ambiguous ARXML structure: {0}")]
    AmbiguousStructure(String),

    #[error("Inconsistent multiplexer definition: {0}")]
    InconsistentMultiplexing(String),

    #[error("Missing required element: {0}")]
    MissingElement(String),

    #[error("Invalid number '{0}'")]
    InvalidNumber(String),

    #[error("Unsupported ARXML construct: {0}")]
    Unsupported(String),
}

/// A signal value as stated in the database (initial values)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SignalValue {
    /// Raw integer value (identity scaling)
    Integer(i64),
    /// Physical value after scaling/offset
    Float(f64),
    /// Boolean literal (`true`/`false`)
    Boolean(bool),
    /// Value that names an entry of the signal's choice table
    Named(NamedValue),
}

impl fmt::Display for SignalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalValue::Integer(v) => write!(f, "{}", v),
            SignalValue::Float(v) => write!(f, "{}", v),
            SignalValue::Boolean(v) => write!(f, "{}", if *v { "true" } else { "false" }),
            SignalValue::Named(v) => write!(f, "{}", v.name),
        }
    }
}

impl SignalValue {
    /// Convert signal value to f64
    pub fn as_f64(&self) -> f64 {
        match self {
            SignalValue::Integer(v) => *v as f64,
            SignalValue::Float(v) => *v,
            SignalValue::Boolean(v) => {
                if *v {
                    1.0
                } else {
                    0.0
                }
            }
            SignalValue::Named(v) => v.value as f64,
        }
    }

    /// Convert signal value to i64 if possible
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SignalValue::Integer(v) => Some(*v),
            SignalValue::Float(v) if v.is_finite() => Some(*v as i64),
            SignalValue::Float(_) => None,
            SignalValue::Boolean(v) => Some(if *v { 1 } else { 0 }),
            SignalValue::Named(v) => Some(v.value),
        }
    }
}
