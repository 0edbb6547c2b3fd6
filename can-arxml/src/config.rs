//! Loader configuration types
//!
//! The loaders themselves have no tunables that change how a document is
//! interpreted; this configuration only shapes the returned database.

use serde::{Deserialize, Serialize};

/// Configuration for the ARXML loader
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Optional: only keep messages with these frame IDs
    #[serde(default)]
    pub message_filter: Option<Vec<u32>>,

    /// Sort the signals of every message by start bit
    #[serde(default)]
    pub sort_signals: bool,

    /// Route ECU extract documents to the ECU extract loader
    /// (false = always use the system description loader)
    #[serde(default = "default_true")]
    pub detect_ecu_extract: bool,
}

fn default_true() -> bool {
    true
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            message_filter: None,
            sort_signals: false,
            detect_ecu_extract: true,
        }
    }
}

impl LoaderConfig {
    /// Create a new loader configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set message filter
    pub fn with_message_filter(mut self, frame_ids: Vec<u32>) -> Self {
        self.message_filter = Some(frame_ids);
        self
    }

    /// Builder method: sort signals by start bit
    pub fn with_sorted_signals(mut self, enabled: bool) -> Self {
        self.sort_signals = enabled;
        self
    }

    /// Builder method: enable or disable ECU extract detection
    pub fn with_ecu_extract_detection(mut self, enabled: bool) -> Self {
        self.detect_ecu_extract = enabled;
        self
    }

    /// Check if a message ID should be kept
    pub fn should_keep_message(&self, frame_id: u32) -> bool {
        match &self.message_filter {
            Some(frame_ids) => frame_ids.contains(&frame_id),
            None => true,
        }
    }
}
