//! CAN ARXML Library
//!
//! Loads AUTOSAR XML ("ARXML") network descriptions into a CAN database of
//! messages, signals, scaling and multiplexing information.
//!
//! # Architecture
//!
//! - Indexes every named element of the document by its AUTOSAR path
//! - Resolves absolute and package-relative references (reference bases)
//! - Supports AUTOSAR 3 and AUTOSAR 4 system descriptions and AUTOSAR 4 ECU
//!   extracts
//! - Flattens multiplexed PDUs into tagged signal lists
//!
//! The library does NOT:
//! - Validate documents against the AUTOSAR schemas
//! - Decode CAN frames or log files
//! - Load other database formats (DBC, KCD, SYM)
//!
//! # Example Usage
//!
//! ```no_run
//! use can_arxml::{parse_arxml_file, LoaderConfig};
//!
//! let config = LoaderConfig::new().with_sorted_signals(true);
//! let database = parse_arxml_file("system.arxml", &config).unwrap();
//!
//! for message in &database.messages {
//!     println!("{} (0x{:X}): {} signals", message.name, message.frame_id, message.signals.len());
//! }
//! ```

// Public modules
pub mod arxml;
pub mod config;
pub mod database;
pub mod numeric;
pub mod types;

// Re-export main types for convenience
pub use arxml::{
    is_ecu_extract, load_document, parse_arxml_file, parse_arxml_str, AutosarVersion,
    EcuExtractLoader, SystemLoader,
};
pub use config::LoaderConfig;
pub use database::{
    Bus, ByteOrder, Choices, Comments, Database, DatabaseStats, ExactScaling, Message,
    NamedValue, Signal,
};
pub use types::{ArxmlError, Result, SignalValue};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
