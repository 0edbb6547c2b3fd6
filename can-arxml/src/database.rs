//! CAN database produced by the ARXML loaders
//!
//! Messages and signals are built bottom-up by the loaders and are not
//! mutated afterwards; the [`Database`] is handed to the caller as a whole.

use crate::numeric::Rational;
use crate::types::SignalValue;
use serde::Serialize;
use std::collections::BTreeMap;

/// Language tag → text (from `DESC/L-2` elements)
pub type Comments = BTreeMap<String, String>;

/// Raw value → named value
pub type Choices = BTreeMap<i64, NamedValue>;

/// Byte order for signal extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ByteOrder {
    /// Little-endian (Intel format)
    #[default]
    LittleEndian,
    /// Big-endian (Motorola format)
    BigEndian,
}

/// Entry of a signal's value table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedValue {
    /// Raw value
    pub value: i64,
    /// Symbolic name (`VT` text)
    pub name: String,
    /// Optional per-language description of the value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<Comments>,
}

impl NamedValue {
    pub fn new(value: i64, name: impl Into<String>) -> Self {
        Self {
            value,
            name: name.into(),
            comments: None,
        }
    }

    pub fn with_comments(mut self, comments: Option<Comments>) -> Self {
        self.comments = comments;
        self
    }
}

/// Exact linear transfer function `phys = raw * scale + offset`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExactScaling {
    pub scale: Rational,
    pub offset: Rational,
}

impl ExactScaling {
    pub fn identity() -> Self {
        Self {
            scale: Rational::one(),
            offset: Rational::zero(),
        }
    }

    pub fn is_identity(&self) -> bool {
        self.scale.is_one() && self.offset.is_zero()
    }
}

/// A CAN signal definition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Signal {
    /// Signal name
    pub name: String,
    /// Start bit within the message
    pub start: u32,
    /// Length in bits
    pub length: u32,
    pub byte_order: ByteOrder,
    pub is_signed: bool,
    pub is_float: bool,
    /// Scale factor to convert raw value to physical value
    pub scale: f64,
    /// Offset to add after scaling
    pub offset: f64,
    /// `scale`/`offset` as exact fractions
    pub exact: ExactScaling,
    /// Minimum physical value
    pub minimum: Option<f64>,
    /// Maximum physical value
    pub maximum: Option<f64>,
    /// Engineering unit (e.g., "km/h", "°C", "V")
    pub unit: Option<String>,
    pub choices: Option<Choices>,
    pub comments: Option<Comments>,
    pub initial: Option<SignalValue>,
    /// Name of the selector signal this signal depends on
    pub multiplexer_signal: Option<String>,
    /// Selector values for which this signal is present
    pub multiplexer_ids: Option<Vec<i64>>,
    /// True if this signal is a multiplexer selector
    pub is_multiplexer: bool,
}

impl Signal {
    /// Create an unsigned, unscaled signal; remaining fields are filled in
    /// with struct update syntax by the loaders
    pub fn new(name: impl Into<String>, start: u32, length: u32, byte_order: ByteOrder) -> Self {
        Self {
            name: name.into(),
            start,
            length,
            byte_order,
            is_signed: false,
            is_float: false,
            scale: 1.0,
            offset: 0.0,
            exact: ExactScaling::identity(),
            minimum: None,
            maximum: None,
            unit: None,
            choices: None,
            comments: None,
            initial: None,
            multiplexer_signal: None,
            multiplexer_ids: None,
            is_multiplexer: false,
        }
    }

    /// Look up a choice by raw value
    pub fn choice(&self, raw: i64) -> Option<&NamedValue> {
        self.choices.as_ref().and_then(|choices| choices.get(&raw))
    }
}

/// A complete CAN message definition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    /// CAN message ID
    pub frame_id: u32,
    /// True for 29-bit identifiers
    pub is_extended_frame: bool,
    /// Message name
    pub name: String,
    /// Message size in bytes
    pub length: u32,
    /// All signals in this message
    pub signals: Vec<Signal>,
    /// Cycle time in milliseconds
    pub cycle_time: Option<u32>,
    pub comments: Option<Comments>,
    /// Name of the CAN cluster the message is triggered on
    pub bus_name: Option<String>,
}

impl Message {
    pub fn signal_by_name(&self, name: &str) -> Option<&Signal> {
        self.signals.iter().find(|s| s.name == name)
    }

    /// True if this message has multiplexed signals
    pub fn is_multiplexed(&self) -> bool {
        self.signals.iter().any(|s| s.is_multiplexer)
    }
}

/// A CAN bus (AUTOSAR CAN-CLUSTER)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bus {
    pub name: String,
    pub comments: Option<Comments>,
    /// Nominal baudrate in bit/s
    pub baudrate: Option<u32>,
    /// CAN-FD data phase baudrate in bit/s
    pub fd_baudrate: Option<u32>,
}

/// The loaded CAN database
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Database {
    pub messages: Vec<Message>,
    pub buses: Vec<Bus>,
    pub version: Option<String>,
}

impl Database {
    pub fn new(messages: Vec<Message>, buses: Vec<Bus>) -> Self {
        Self {
            messages,
            buses,
            version: None,
        }
    }

    /// Get a message by name
    pub fn message_by_name(&self, name: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.name == name)
    }

    /// Get the first message with the given frame ID
    pub fn message_by_frame_id(&self, frame_id: u32) -> Option<&Message> {
        self.messages.iter().find(|m| m.frame_id == frame_id)
    }

    /// Get database statistics
    pub fn stats(&self) -> DatabaseStats {
        DatabaseStats {
            num_messages: self.messages.len(),
            num_signals: self.messages.iter().map(|m| m.signals.len()).sum(),
            num_buses: self.buses.len(),
        }
    }
}

/// Database statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatabaseStats {
    /// Total number of message definitions
    pub num_messages: usize,
    /// Total number of signal definitions
    pub num_signals: usize,
    /// Total number of buses
    pub num_buses: usize,
}
