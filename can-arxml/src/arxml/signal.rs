//! Signal extraction from signal-to-PDU mappings

use crate::arxml::compu::SystemSignalProperties;
use crate::arxml::locate::PathAtom;
use crate::arxml::schema;
use crate::arxml::system::SystemLoader;
use crate::arxml::xml;
use crate::database::{ByteOrder, Signal};
use crate::numeric;
use crate::types::{ArxmlError, Result, SignalValue};
use roxmltree::Node;

impl<'a, 'input> SystemLoader<'a, 'input> {
    /// Build the signal of an I-SIGNAL-TO-I-PDU-MAPPING
    ///
    /// Returns `None` for mappings of signal groups, which carry no I-SIGNAL
    /// or refer to a system signal group.
    pub(crate) fn load_signal(&self, mapping: Node<'a, 'input>) -> Result<Option<Signal>> {
        let locator = self.locator();

        let Some(i_signal) = locator.unique(mapping, self.paths.mapped_signal)? else {
            log::debug!(
                "Skipping signal mapping '{}' without signal (signal group)",
                self.index.path_of(mapping).unwrap_or("")
            );
            return Ok(None);
        };

        let system_signal = locator.unique(i_signal, schema::SYSTEM_SIGNAL)?;
        if let Some(system_signal) = system_signal {
            if !self.index.is_tag(system_signal, "SYSTEM-SIGNAL") {
                log::debug!(
                    "Skipping '{}': refers to a {}",
                    self.index.path_of(i_signal).unwrap_or(""),
                    system_signal.tag_name().name()
                );
                return Ok(None);
            }
        }

        let name = locator.short_name(i_signal)?.to_string();
        let start = numeric::parse_u32(locator.require_text(mapping, &[PathAtom::one("START-POSITION")])?)?;
        let length = self.signal_length(i_signal, system_signal, &name)?;
        let byte_order = match locator.unique_text(mapping, &[PathAtom::one("PACKING-BYTE-ORDER")])? {
            Some("MOST-SIGNIFICANT-BYTE-FIRST") => ByteOrder::BigEndian,
            _ => ByteOrder::LittleEndian,
        };
        let (is_signed, is_float) = self.signal_type(i_signal)?;

        let properties = match system_signal {
            Some(system_signal) => self.load_system_signal(system_signal, is_float)?,
            None => SystemSignalProperties::default(),
        };

        let initial = self
            .initial_value_text(i_signal, system_signal)?
            .map(|text| interpret_initial_value(text, is_float, &properties))
            .transpose()?;

        let scaling = properties.scaling;
        Ok(Some(Signal {
            is_signed,
            is_float,
            scale: scaling.exact.scale.to_f64(),
            offset: scaling.exact.offset.to_f64(),
            exact: scaling.exact,
            minimum: scaling.minimum,
            maximum: scaling.maximum,
            unit: properties.unit,
            choices: scaling.choices,
            comments: properties.comments,
            initial,
            ..Signal::new(name, start, length, byte_order)
        }))
    }

    /// Signal length in bits; AUTOSAR 3 may state it on the system signal
    fn signal_length(&self, i_signal: Node<'a, 'input>, system_signal: Option<Node<'a, 'input>>, name: &str) -> Result<u32> {
        let locator = self.locator();
        let length_path = &[PathAtom::one("LENGTH")];

        if let Some(text) = locator.unique_text(i_signal, length_path)? {
            return numeric::parse_u32(text);
        }

        if !self.version().is_autosar4() {
            if let Some(system_signal) = system_signal {
                if let Some(text) = locator.unique_text(system_signal, length_path)? {
                    return numeric::parse_u32(text);
                }
            }
        }

        Err(ArxmlError::MissingElement(format!("LENGTH of signal '{}'", name)))
    }

    /// `(is_signed, is_float)` from the base type encoding
    fn signal_type(&self, i_signal: Node<'a, 'input>) -> Result<(bool, bool)> {
        let locator = self.locator();

        let Some(base_type) = locator.unique(i_signal, schema::BASE_TYPE)? else {
            return Ok((false, false));
        };

        let encoding = locator.unique_text(base_type, schema::BASE_TYPE_ENCODING)?.ok_or_else(|| {
            ArxmlError::MissingElement(format!(
                "BASE-TYPE-ENCODING in base type '{}'",
                xml::short_name(base_type, self.index.namespace()).unwrap_or("")
            ))
        })?;

        Ok(match encoding {
            // two's complement, one's complement, sign magnitude
            "2C" | "1C" | "SM" => (true, false),
            "IEEE754" => (false, true),
            _ => (false, false),
        })
    }

    /// Initial value text: AUTOSAR 4 states it on the I-SIGNAL, AUTOSAR 3
    /// refers to a literal from the system signal
    fn initial_value_text(
        &self,
        i_signal: Node<'a, 'input>,
        system_signal: Option<Node<'a, 'input>>,
    ) -> Result<Option<&'a str>> {
        let locator = self.locator();

        if self.version().is_autosar4() {
            for path in self.paths.init_value {
                if let Some(text) = locator.unique_text(i_signal, path)? {
                    return Ok(Some(text));
                }
            }
            return Ok(None);
        }

        let Some(system_signal) = system_signal else {
            return Ok(None);
        };
        let namespace = self.index.namespace();
        let Some(reference) = xml::child(system_signal, namespace, "INIT-VALUE-REF") else {
            return Ok(None);
        };

        let literal = self.index.resolve(
            system_signal,
            xml::text(reference),
            reference.attribute("DEST"),
            reference.attribute("BASE"),
        )?;

        Ok(literal
            .and_then(|literal| xml::child(literal, namespace, "VALUE"))
            .map(xml::text))
    }
}

/// Interpret initial value text
///
/// A raw value naming a choice yields that choice; float signals are scaled;
/// `true`/`false` are booleans; anything else must be an integer, which is
/// scaled unless the scaling is the identity.
fn interpret_initial_value(text: &str, is_float: bool, properties: &SystemSignalProperties) -> Result<SignalValue> {
    let scaling = &properties.scaling;
    let raw = numeric::parse_int(text).ok();

    if let (Some(raw), Some(choices)) = (raw, &scaling.choices) {
        if let Some(choice) = choices.get(&raw) {
            return Ok(SignalValue::Named(choice.clone()));
        }
    }

    let scale = scaling.exact.scale.to_f64();
    let offset = scaling.exact.offset.to_f64();

    if is_float {
        return Ok(SignalValue::Float(numeric::parse_float(text)? * scale + offset));
    }

    let lowered = text.trim().to_ascii_lowercase();
    if lowered == "true" {
        return Ok(SignalValue::Boolean(true));
    }
    if lowered == "false" {
        return Ok(SignalValue::Boolean(false));
    }

    let raw = raw.ok_or_else(|| ArxmlError::InvalidNumber(text.trim().to_string()))?;
    if scaling.exact.is_identity() {
        Ok(SignalValue::Integer(raw))
    } else {
        Ok(SignalValue::Float(raw as f64 * scale + offset))
    }
}
