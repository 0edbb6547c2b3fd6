//! ARXML loading
//!
//! Two pipelines share this module:
//!
//! * [`SystemLoader`] for system descriptions (AUTOSAR 3, AUTOSAR 4 and the
//!   Daimler AUTOSAR 3 flavour), built on a path index of the document and a
//!   generic reference-following child locator
//! * [`EcuExtractLoader`] for ECU extracts, which carry ECUC configuration
//!   values instead of a network description
//!
//! [`load_document`] picks the pipeline and applies the [`LoaderConfig`].

mod compu;
mod ecu_extract;
mod index;
mod locate;
mod message;
mod pdu;
mod resolve;
mod schema;
mod signal;
mod system;
mod version;
mod xml;

pub use compu::{Scaling, SystemSignalProperties};
pub use ecu_extract::{is_ecu_extract, EcuExtractLoader, ECU_EXTRACT_NAMESPACE};
pub use index::ReferenceIndex;
pub use locate::{ChildLocator, PathAtom};
pub use pdu::PduLayout;
pub use schema::{SchemaPaths, AUTOSAR3_PATHS, AUTOSAR4_PATHS};
pub use system::SystemLoader;
pub use version::{
    detect_namespace, is_recognized_namespace, AutosarVersion, DetectedVersion, SchemaFamily,
};

use crate::config::LoaderConfig;
use crate::database::Database;
use crate::types::{ArxmlError, Result};
use roxmltree::{Document, ParsingOptions};
use std::path::Path;

/// Parse an ARXML file from disk
pub fn parse_arxml_file<P: AsRef<Path>>(path: P, config: &LoaderConfig) -> Result<Database> {
    let path = path.as_ref();
    log::info!("Parsing ARXML file: {:?}", path);

    let text = std::fs::read_to_string(path)?;
    let database = parse_arxml_str(&text, config)?;

    let stats = database.stats();
    log::info!(
        "ARXML parsing complete: {} messages, {} signals, {} buses",
        stats.num_messages,
        stats.num_signals,
        stats.num_buses
    );

    Ok(database)
}

/// Parse ARXML text
pub fn parse_arxml_str(text: &str, config: &LoaderConfig) -> Result<Database> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let document = Document::parse_with_options(text, options)?;
    load_document(&document, config)
}

/// Load a parsed ARXML document
pub fn load_document(document: &Document<'_>, config: &LoaderConfig) -> Result<Database> {
    let namespace = version::root_namespace(document.root_element())?;
    if !is_recognized_namespace(namespace) {
        return Err(ArxmlError::UnsupportedVersion(format!(
            "Unrecognized XML namespace '{}'",
            namespace
        )));
    }

    let database = if config.detect_ecu_extract && is_ecu_extract(document) {
        log::debug!("Loading document as ECU extract");
        EcuExtractLoader::new(document)?.load()?
    } else {
        SystemLoader::new(document)?.load()?
    };

    Ok(apply_config(database, config))
}

fn apply_config(database: Database, config: &LoaderConfig) -> Database {
    let messages = database
        .messages
        .into_iter()
        .filter(|message| config.should_keep_message(message.frame_id))
        .map(|mut message| {
            if config.sort_signals {
                message.signals.sort_by_key(|signal| signal.start);
            }
            message
        })
        .collect();

    Database { messages, ..database }
}
