//! AUTOSAR schema version detection
//!
//! The schema version is encoded in the XML namespace of the `AUTOSAR` root
//! element:
//!
//! * `http://autosar.org/schema/r4.0` for AUTOSAR 4 (the URI never carries
//!   the minor release, so every AUTOSAR 4 document reports `4.0.0`)
//! * `http://autosar.org/3.2.1` for AUTOSAR 3
//! * `http://autosar.org/3.1.4.DAI.2` for the Daimler flavour of AUTOSAR 3

use crate::arxml::xml;
use crate::types::{ArxmlError, Result};
use regex::Regex;
use roxmltree::Node;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

static AUTOSAR4_NAMESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^http://autosar\.org/schema/r(4\.[0-9.]*)$").expect("valid regex"));
static AUTOSAR3_NAMESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^http://autosar\.org/(3\.[0-9.]*)$").expect("valid regex"));
static DAIMLER_NAMESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^http://autosar\.org/([0-9.]*)\.DAI\.[0-9]$").expect("valid regex"));
static VERSION_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]*)(?:\.([0-9]*))?(?:\.([0-9]*))?$").expect("valid regex"));
static RECOGNIZED_NAMESPACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^http://autosar\.org/(?:schema/r4|3|.*\.DAI\.[0-9])").expect("valid regex")
});

/// Schema flavour a document was written against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SchemaFamily {
    Autosar3,
    Autosar4,
    Daimler,
}

/// A `major.minor.patch` AUTOSAR version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct AutosarVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl AutosarVersion {
    pub const AUTOSAR4: AutosarVersion = AutosarVersion::new(4, 0, 0);

    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Lexicographic `>=` comparison; omitted components are not compared
    pub fn newer_or_equal(&self, major: u32, minor: Option<u32>, patch: Option<u32>) -> bool {
        if self.major != major {
            return self.major > major;
        }
        let Some(minor) = minor else {
            return true;
        };
        if self.minor != minor {
            return self.minor > minor;
        }
        match patch {
            Some(patch) => self.patch >= patch,
            None => true,
        }
    }

    pub fn is_autosar4(&self) -> bool {
        self.newer_or_equal(4, None, None)
    }
}

impl fmt::Display for AutosarVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Result of version detection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectedVersion {
    pub family: SchemaFamily,
    pub version: AutosarVersion,
}

/// Namespace URI of the `AUTOSAR` root element
pub fn root_namespace<'a>(root: Node<'a, '_>) -> Result<&'a str> {
    if !root.is_element() || root.tag_name().name() != "AUTOSAR" {
        return Err(ArxmlError::MalformedDocument(format!(
            "Expected root element tag 'AUTOSAR', but got '{}'",
            root.tag_name().name()
        )));
    }
    root.tag_name().namespace().ok_or_else(|| {
        ArxmlError::MalformedDocument("root element 'AUTOSAR' has no XML namespace".to_string())
    })
}

/// Detect the schema version of a document from its root element
pub fn detect(root: Node<'_, '_>) -> Result<DetectedVersion> {
    let namespace = root_namespace(root)?;
    let detected = detect_namespace(namespace)?;
    log::debug!(
        "Detected {:?} schema version {} from namespace '{}'",
        detected.family,
        detected.version,
        namespace
    );
    Ok(detected)
}

/// Detect the schema version from a namespace URI
pub fn detect_namespace(namespace: &str) -> Result<DetectedVersion> {
    let version_of = |pattern: &Regex| {
        pattern
            .captures(namespace)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str())
    };

    let (family, version) = if let Some(text) = version_of(&AUTOSAR4_NAMESPACE) {
        // validated, then normalized: the URI does not carry the minor release
        parse_version(text)?;
        (SchemaFamily::Autosar4, AutosarVersion::AUTOSAR4)
    } else if let Some(text) = version_of(&AUTOSAR3_NAMESPACE) {
        (SchemaFamily::Autosar3, parse_version(text)?)
    } else if let Some(text) = version_of(&DAIMLER_NAMESPACE) {
        (SchemaFamily::Daimler, parse_version(text)?)
    } else {
        return Err(ArxmlError::UnsupportedVersion(format!(
            "Unrecognized AUTOSAR XML namespace '{}'",
            namespace
        )));
    };

    if version.major != 3 && version.major != 4 {
        return Err(ArxmlError::UnsupportedVersion(format!(
            "Unsupported ARXML file format version {}. Only AUTOSAR versions 3 and 4 are supported.",
            version
        )));
    }

    Ok(DetectedVersion { family, version })
}

/// Loose namespace check used before choosing a loader
pub fn is_recognized_namespace(namespace: &str) -> bool {
    RECOGNIZED_NAMESPACE.is_match(namespace)
}

/// `major[.minor[.patch]]`; omitted components are zero
fn parse_version(text: &str) -> Result<AutosarVersion> {
    let invalid = || ArxmlError::UnsupportedVersion(format!("Could not parse AUTOSAR version '{}'", text));

    let captures = VERSION_TEXT.captures(text).ok_or_else(invalid)?;
    let component = |index: usize| -> Result<u32> {
        match captures.get(index) {
            Some(m) => m.as_str().parse().map_err(|_| invalid()),
            None => Ok(0),
        }
    };

    Ok(AutosarVersion::new(component(1)?, component(2)?, component(3)?))
}

/// True if the `AUTOSAR` root element carries `namespace`
pub(crate) fn root_has_namespace(root: Node<'_, '_>, namespace: &str) -> bool {
    xml::has_tag(root, namespace, "AUTOSAR")
}
