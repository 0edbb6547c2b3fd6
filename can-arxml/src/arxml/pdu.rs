//! PDU decomposition
//!
//! An ordinary PDU contributes the signals of its signal mappings. A
//! MULTIPLEXED-I-PDU additionally contributes a synthetic selector signal,
//! the signals of every dynamic part alternative (tagged with the selector
//! value they belong to) and the signals of its static parts. Nested PDUs
//! are decomposed recursively; the selector counter is threaded through so
//! that selector names stay unique within a frame.

use crate::arxml::locate::PathAtom;
use crate::arxml::system::SystemLoader;
use crate::database::{ByteOrder, Choices, Signal};
use crate::numeric;
use crate::types::{ArxmlError, Result, SignalValue};
use roxmltree::Node;

/// Signals and timing found in a PDU and everything nested in it
#[derive(Debug, Clone, PartialEq)]
pub struct PduLayout {
    /// Selector index to use for the next multiplexed PDU of the frame
    pub next_selector_index: u32,
    /// PDU length in bits
    pub bit_length: Option<u32>,
    pub signals: Vec<Signal>,
    /// Cycle time in milliseconds
    pub cycle_time: Option<u32>,
}

/// Signals contributed by the multiplexed part of a PDU
struct MultiplexedParts {
    next_selector_index: u32,
    signals: Vec<Signal>,
}

impl<'a, 'input> SystemLoader<'a, 'input> {
    /// Flatten `pdu` into a signal list
    pub(crate) fn decompose_pdu(
        &self,
        pdu: Node<'a, 'input>,
        frame_name: &str,
        next_selector_index: u32,
    ) -> Result<PduLayout> {
        let locator = self.locator();

        let bit_length = locator
            .unique_text(pdu, &[PathAtom::one("LENGTH")])?
            .map(numeric::parse_u32)
            .transpose()?;

        let cycle_time = locator
            .unique_text(pdu, self.paths.pdu_cycle_time)?
            .map(seconds_to_millis)
            .transpose()?;

        let mut signals = self.load_pdu_signals(pdu)?;
        let mut next_selector_index = next_selector_index;

        if self.index.is_tag(pdu, "MULTIPLEXED-I-PDU") {
            let parts = self.decompose_multiplexed_parts(pdu, frame_name, next_selector_index)?;
            next_selector_index = parts.next_selector_index;
            signals.extend(parts.signals);
        }

        Ok(PduLayout {
            next_selector_index,
            bit_length,
            signals,
            cycle_time,
        })
    }

    fn decompose_multiplexed_parts(
        &self,
        pdu: Node<'a, 'input>,
        frame_name: &str,
        selector_index: u32,
    ) -> Result<MultiplexedParts> {
        let locator = self.locator();

        let selector_start = numeric::parse_u32(locator.require_text(pdu, &[PathAtom::one("SELECTOR-FIELD-START-POSITION")])?)?;
        let selector_length = numeric::parse_u32(locator.require_text(pdu, &[PathAtom::one("SELECTOR-FIELD-LENGTH")])?)?;
        let selector_byte_order = match locator.unique_text(pdu, &[PathAtom::one("SELECTOR-FIELD-BYTE-ORDER")])? {
            None | Some("MOST-SIGNIFICANT-BYTE-LAST") => ByteOrder::LittleEndian,
            Some("MOST-SIGNIFICANT-BYTE-FIRST") => ByteOrder::BigEndian,
            Some(other) => {
                return Err(ArxmlError::MalformedDocument(format!(
                    "invalid SELECTOR-FIELD-BYTE-ORDER '{}' in '{}'",
                    other,
                    self.index.path_of(pdu).unwrap_or("")
                )));
            }
        };

        let selector_name = format!("{}_selector{}", frame_name, selector_index);
        let mut next_selector_index = selector_index + 1;
        let mut selector_choices = Choices::new();
        let mut selector_initial: Option<i64> = None;
        let mut dynamic_signals = Vec::new();

        for alternative in locator.children(&[pdu], self.paths.dynamic_alternatives)? {
            let code = numeric::parse_int(locator.require_text(alternative, &[PathAtom::one("SELECTOR-FIELD-CODE")])?)?;
            let alternative_pdu = locator
                .unique(alternative, &[PathAtom::one_ref("I-PDU")])?
                .ok_or_else(|| {
                    ArxmlError::MissingElement(format!(
                        "I-PDU of dynamic part alternative {} in '{}'",
                        code,
                        self.index.path_of(pdu).unwrap_or("")
                    ))
                })?;

            let layout = self.decompose_pdu(alternative_pdu, frame_name, next_selector_index)?;
            next_selector_index = layout.next_selector_index;

            let is_initial = locator
                .unique_text(alternative, &[PathAtom::one("INITIAL-DYNAMIC-PART")])?
                .is_some_and(|text| text == "true");
            if is_initial {
                if selector_initial.is_some() {
                    return Err(ArxmlError::AmbiguousStructure(format!(
                        "multiple initial dynamic parts for selector '{}'",
                        selector_name
                    )));
                }
                selector_initial = Some(code);
            }

            // every alternative repeats the selector field; it logically
            // belongs to the static part
            let (copies, rest): (Vec<Signal>, Vec<Signal>) =
                layout.signals.into_iter().partition(|s| s.start == selector_start);

            let copy = match <[Signal; 1]>::try_from(copies) {
                Ok([copy]) => copy,
                Err(copies) => {
                    return Err(ArxmlError::InconsistentMultiplexing(format!(
                        "dynamic part {} of '{}' has {} signals at selector position {}, expected 1",
                        code,
                        selector_name,
                        copies.len(),
                        selector_start
                    )));
                }
            };
            if copy.length != selector_length {
                return Err(ArxmlError::InconsistentMultiplexing(format!(
                    "selector copy '{}' is {} bits long, selector field is {}",
                    copy.name, copy.length, selector_length
                )));
            }
            if let Some(choices) = copy.choices {
                selector_choices.extend(choices);
            }

            // signals already claimed by a nested selector keep their tagging
            dynamic_signals.extend(rest.into_iter().map(|signal| {
                if signal.multiplexer_signal.is_some() {
                    signal
                } else {
                    Signal {
                        multiplexer_signal: Some(selector_name.clone()),
                        multiplexer_ids: Some(vec![code]),
                        ..signal
                    }
                }
            }));
        }

        let mut static_signals = Vec::new();
        for static_pdu in locator.children(&[pdu], self.paths.static_parts)? {
            let layout = self.decompose_pdu(static_pdu, frame_name, next_selector_index)?;
            next_selector_index = layout.next_selector_index;
            static_signals.extend(layout.signals);
        }

        let selector = Signal {
            choices: Some(selector_choices),
            initial: selector_initial.map(SignalValue::Integer),
            is_multiplexer: true,
            ..Signal::new(selector_name, selector_start, selector_length, selector_byte_order)
        };

        let mut signals = Vec::with_capacity(1 + dynamic_signals.len() + static_signals.len());
        signals.push(selector);
        signals.extend(dynamic_signals);
        signals.extend(static_signals);

        Ok(MultiplexedParts {
            next_selector_index,
            signals,
        })
    }

    /// Signals of the ordinary signal mappings of a PDU
    fn load_pdu_signals(&self, pdu: Node<'a, 'input>) -> Result<Vec<Signal>> {
        let locator = self.locator();
        let mut signals = Vec::new();

        for path in self.paths.signal_mappings {
            for mapping in locator.children(&[pdu], path)? {
                if let Some(signal) = self.load_signal(mapping)? {
                    signals.push(signal);
                }
            }
        }

        Ok(signals)
    }
}

/// Convert a time period in seconds to whole milliseconds (truncating)
fn seconds_to_millis(text: &str) -> Result<u32> {
    let millis = (numeric::parse_float(text)? * 1000.0).trunc();
    if !(0.0..=u32::MAX as f64).contains(&millis) {
        return Err(ArxmlError::InvalidNumber(text.trim().to_string()));
    }
    Ok(millis as u32)
}
