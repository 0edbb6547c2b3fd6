//! ECU extract loader
//!
//! ECU extracts describe the communication stack configuration of a single
//! ECU (ECUC values of the `Com` and `CanIf` modules) instead of the network.
//! Messages are the `ComIPdu` containers of the `Com` configuration; their
//! CAN identifiers and lengths come from the matching `CanIf` PDU
//! configuration.

use crate::arxml::version;
use crate::arxml::xml;
use crate::database::{ByteOrder, Database, Message, Signal};
use crate::types::{ArxmlError, Result};
use roxmltree::{Document, Node};

/// ECU extracts are only defined for AUTOSAR 4
pub const ECU_EXTRACT_NAMESPACE: &str = "http://autosar.org/schema/r4.0";

/// One step of a lookup: child tag plus optional SHORT-NAME filter
#[derive(Debug, Clone, Copy)]
struct Step<'s> {
    tag: &'s str,
    short_name: Option<&'s str>,
}

impl<'s> Step<'s> {
    const fn tag(tag: &'s str) -> Self {
        Self { tag, short_name: None }
    }

    const fn named(tag: &'s str, short_name: &'s str) -> Self {
        Self {
            tag,
            short_name: Some(short_name),
        }
    }
}

const VALUE_COLLECTION: &[Step<'static>] = &[
    Step::tag("AR-PACKAGES"),
    Step::tag("AR-PACKAGE"),
    Step::tag("ELEMENTS"),
    Step::tag("ECUC-VALUE-COLLECTION"),
];

const MODULE_CONFIGURATION_REFS: &[Step<'static>] = &[
    Step::tag("ECUC-VALUES"),
    Step::tag("ECUC-MODULE-CONFIGURATION-VALUES-REF-CONDITIONAL"),
    Step::tag("ECUC-MODULE-CONFIGURATION-VALUES-REF"),
];

/// CAN identifier, DLC and identifier type parameters of a CanIf PDU
struct CanIfParameters {
    can_id: &'static str,
    dlc: &'static str,
    can_id_type: &'static str,
}

const CAN_IF_TX: CanIfParameters = CanIfParameters {
    can_id: "CanIfTxPduCanId",
    dlc: "CanIfTxPduDlc",
    can_id_type: "CanIfTxPduCanIdType",
};

const CAN_IF_RX: CanIfParameters = CanIfParameters {
    can_id: "CanIfRxPduCanId",
    dlc: "CanIfRxPduDlc",
    can_id_type: "CanIfRxPduCanIdType",
};

/// True if the document carries an ECUC value collection
pub fn is_ecu_extract(document: &Document<'_>) -> bool {
    find_first(document.root_element(), ECU_EXTRACT_NAMESPACE, VALUE_COLLECTION).is_some()
}

/// Loader for ECU extract documents
pub struct EcuExtractLoader<'a, 'input> {
    root: Node<'a, 'input>,
}

impl<'a, 'input> EcuExtractLoader<'a, 'input> {
    pub fn new(document: &'a Document<'input>) -> Result<Self> {
        let root = document.root_element();
        if !version::root_has_namespace(root, ECU_EXTRACT_NAMESPACE) {
            return Err(ArxmlError::MalformedDocument(format!(
                "Expected root element tag {{{}}}AUTOSAR, but got {{{}}}{}",
                ECU_EXTRACT_NAMESPACE,
                root.tag_name().namespace().unwrap_or(""),
                root.tag_name().name()
            )));
        }
        Ok(Self { root })
    }

    pub fn load(&self) -> Result<Database> {
        let collection = self.find_first(self.root, VALUE_COLLECTION).ok_or_else(|| {
            ArxmlError::MissingElement("ECUC-VALUE-COLLECTION".to_string())
        })?;

        let com_refs: Vec<&str> = self
            .find_all(collection, MODULE_CONFIGURATION_REFS)
            .into_iter()
            .map(xml::text)
            .filter(|reference| reference.ends_with("/Com"))
            .collect();

        let com_ref = match com_refs.as_slice() {
            [com_ref] => *com_ref,
            other => {
                return Err(ArxmlError::AmbiguousStructure(format!(
                    "Expected 1 /Com, but got {}",
                    other.len()
                )));
            }
        };

        let com_config = self.find_com_config(com_ref).ok_or_else(|| {
            ArxmlError::MissingElement(format!("ComConfig of module configuration '{}'", com_ref))
        })?;

        let mut messages = Vec::new();
        for container in com_config.children().filter(|c| c.is_element()) {
            let Some(definition) = self.child_text(container, "DEFINITION-REF") else {
                log::debug!("Skipping Com container without DEFINITION-REF");
                continue;
            };
            if !definition.ends_with("ComIPdu") {
                continue;
            }

            if let Some(message) = self.load_message(container)? {
                messages.push(message);
            }
        }

        log::info!("Loaded {} messages from ECU extract", messages.len());

        Ok(Database::new(messages, Vec::new()))
    }

    fn load_message(&self, com_i_pdu: Node<'a, 'input>) -> Result<Option<Message>> {
        let name = self.short_name(com_i_pdu)?;

        let direction = self
            .parameter_values(com_i_pdu)?
            .into_iter()
            .find(|(parameter, _)| *parameter == "ComIPduDirection")
            .map(|(_, value)| value);

        let com_pdu_id_ref = self
            .reference_values(com_i_pdu)?
            .into_iter()
            .find(|(reference, _)| *reference == "ComPduIdRef")
            .map(|(_, value)| value)
            .ok_or_else(|| ArxmlError::MissingElement(format!("ComPduIdRef reference of '{}'", name)))?;

        let parameters = match direction {
            Some("SEND") => &CAN_IF_TX,
            Some("RECEIVE") => &CAN_IF_RX,
            other => {
                return Err(ArxmlError::Unsupported(format!(
                    "Direction {} of '{}' not supported",
                    other.unwrap_or("<none>"),
                    name
                )));
            }
        };

        let frame = self.load_frame_parameters(com_pdu_id_ref, parameters)?;

        let Some(frame_id) = frame.frame_id else {
            log::warn!("No frame id found for message {}.", name);
            return Ok(None);
        };
        let Some(is_extended_frame) = frame.is_extended_frame else {
            log::warn!("No frame type found for message {}.", name);
            return Ok(None);
        };
        let Some(length) = frame.length else {
            log::warn!("No length found for message {}.", name);
            return Ok(None);
        };

        let mut signals = Vec::new();
        let signal_refs = self.find_all(com_i_pdu, &[Step::tag("REFERENCE-VALUES"), Step::tag("ECUC-REFERENCE-VALUE")]);
        for reference in signal_refs {
            let is_signal_ref = self
                .child_text(reference, "DEFINITION-REF")
                .is_some_and(|definition| definition.ends_with("ComIPduSignalRef"));
            if !is_signal_ref {
                continue;
            }
            let Some(target) = self.child_text(reference, "VALUE-REF") else {
                continue;
            };
            if let Some(signal) = self.load_signal(target)? {
                signals.push(signal);
            }
        }

        Ok(Some(Message {
            frame_id,
            is_extended_frame,
            name: name.to_string(),
            length,
            signals,
            cycle_time: None,
            comments: None,
            bus_name: None,
        }))
    }

    fn load_frame_parameters(&self, com_pdu_id_ref: &str, names: &CanIfParameters) -> Result<FrameParameters> {
        let mut frame = FrameParameters::default();

        let Some(pdu_cfg) = self.find_can_if_pdu_cfg(com_pdu_id_ref)? else {
            return Ok(frame);
        };

        for (parameter, value) in self.parameter_values(pdu_cfg)? {
            if parameter == names.can_id {
                frame.frame_id = Some(parse_decimal(value)?);
            } else if parameter == names.dlc {
                frame.length = Some(parse_decimal(value)?);
            } else if parameter == names.can_id_type {
                frame.is_extended_frame = Some(value == "EXTENDED_CAN");
            }
        }

        Ok(frame)
    }

    fn load_signal(&self, reference: &str) -> Result<Option<Signal>> {
        let Some(container) = self.find_com_container(reference) else {
            return Ok(None);
        };
        let name = self.short_name(container)?;

        let mut bit_position = None;
        let mut length = None;
        let mut byte_order = None;
        let mut is_signed = false;
        let mut is_float = false;

        for (parameter, value) in self.parameter_values(container)? {
            match parameter {
                "ComBitPosition" => bit_position = Some(parse_decimal(value)?),
                "ComBitSize" => length = Some(parse_decimal(value)?),
                "ComSignalEndianness" => {
                    byte_order = match value {
                        "BIG_ENDIAN" => Some(ByteOrder::BigEndian),
                        // opaque data is laid out byte by byte
                        "LITTLE_ENDIAN" | "OPAQUE" => Some(ByteOrder::LittleEndian),
                        other => {
                            log::warn!("Unknown endianness {} for signal {}.", other, name);
                            None
                        }
                    }
                }
                "ComSignalType" => match value {
                    "SINT8" | "SINT16" | "SINT32" | "SINT64" => is_signed = true,
                    "FLOAT32" | "FLOAT64" => is_float = true,
                    _ => {}
                },
                _ => {}
            }
        }

        let Some(start) = bit_position else {
            log::warn!("No bit position found for signal {}.", name);
            return Ok(None);
        };
        let Some(length) = length else {
            log::warn!("No bit size found for signal {}.", name);
            return Ok(None);
        };
        let Some(byte_order) = byte_order else {
            log::warn!("No endianness found for signal {}.", name);
            return Ok(None);
        };

        Ok(Some(Signal {
            is_signed,
            is_float,
            ..Signal::new(name, start, length, byte_order)
        }))
    }

    /// `SUB-CONTAINERS` of the `ComConfig` container of the Com module
    fn find_com_config(&self, module_ref: &str) -> Option<Node<'a, 'input>> {
        let package = package_name(module_ref);
        let mut steps = com_config_steps(package).to_vec();
        steps.push(Step::tag("SUB-CONTAINERS"));
        self.find_first(self.root, &steps)
    }

    /// ComConfig sub-container named after the last segment of `reference`
    fn find_com_container(&self, reference: &str) -> Option<Node<'a, 'input>> {
        let package = package_name(reference);
        let container = reference.rsplit('/').next().unwrap_or("");
        let mut steps = com_config_steps(package).to_vec();
        steps.push(Step::tag("SUB-CONTAINERS"));
        steps.push(Step::named("ECUC-CONTAINER-VALUE", container));
        self.find_first(self.root, &steps)
    }

    /// CanIf Tx/Rx PDU configuration that refers to `com_pdu_id_ref`
    fn find_can_if_pdu_cfg(&self, com_pdu_id_ref: &str) -> Result<Option<Node<'a, 'input>>> {
        let package = package_name(com_pdu_id_ref);
        let steps = [
            Step::tag("AR-PACKAGES"),
            Step::named("AR-PACKAGE", package),
            Step::tag("ELEMENTS"),
            Step::named("ECUC-MODULE-CONFIGURATION-VALUES", "CanIf"),
            Step::tag("CONTAINERS"),
            Step::named("ECUC-CONTAINER-VALUE", "CanIfInitCfg"),
            Step::tag("SUB-CONTAINERS"),
            Step::tag("ECUC-CONTAINER-VALUE"),
        ];

        for pdu_cfg in self.find_all(self.root, &steps) {
            let Some(definition) = self.child_text(pdu_cfg, "DEFINITION-REF") else {
                continue;
            };
            let expected_reference = if definition.ends_with("CanIfTxPduCfg") {
                "CanIfTxPduRef"
            } else if definition.ends_with("CanIfRxPduCfg") {
                "CanIfRxPduRef"
            } else {
                continue;
            };

            let refers_to_pdu = self
                .reference_values(pdu_cfg)?
                .into_iter()
                .any(|(reference, value)| reference == expected_reference && value == com_pdu_id_ref);
            if refers_to_pdu {
                return Ok(Some(pdu_cfg));
            }
        }

        Ok(None)
    }

    /// `(parameter name, value)` pairs of a container's PARAMETER-VALUES
    fn parameter_values(&self, container: Node<'a, 'input>) -> Result<Vec<(&'a str, &'a str)>> {
        self.definition_values(container, "PARAMETER-VALUES", "VALUE")
    }

    /// `(reference name, target)` pairs of a container's REFERENCE-VALUES
    fn reference_values(&self, container: Node<'a, 'input>) -> Result<Vec<(&'a str, &'a str)>> {
        self.definition_values(container, "REFERENCE-VALUES", "VALUE-REF")
    }

    fn definition_values(
        &self,
        container: Node<'a, 'input>,
        list_tag: &str,
        value_tag: &str,
    ) -> Result<Vec<(&'a str, &'a str)>> {
        let list = xml::child(container, ECU_EXTRACT_NAMESPACE, list_tag).ok_or_else(|| {
            ArxmlError::MissingElement(format!(
                "{} of '{}'",
                list_tag,
                xml::short_name(container, ECU_EXTRACT_NAMESPACE).unwrap_or("")
            ))
        })?;

        let mut values = Vec::new();
        for entry in list.children().filter(|c| c.is_element()) {
            let (Some(definition), Some(value)) = (
                self.child_text(entry, "DEFINITION-REF"),
                self.child_text(entry, value_tag),
            ) else {
                log::debug!("Skipping {} entry without DEFINITION-REF or {}", list_tag, value_tag);
                continue;
            };
            let name = definition.rsplit('/').next().unwrap_or(definition);
            values.push((name, value));
        }

        Ok(values)
    }

    fn child_text(&self, node: Node<'a, 'input>, tag: &str) -> Option<&'a str> {
        xml::child(node, ECU_EXTRACT_NAMESPACE, tag).map(xml::text)
    }

    fn short_name(&self, node: Node<'a, 'input>) -> Result<&'a str> {
        xml::short_name(node, ECU_EXTRACT_NAMESPACE).ok_or_else(|| {
            ArxmlError::MissingElement(format!("SHORT-NAME of {}", node.tag_name().name()))
        })
    }

    fn find_first(&self, node: Node<'a, 'input>, steps: &[Step<'_>]) -> Option<Node<'a, 'input>> {
        find_first(node, ECU_EXTRACT_NAMESPACE, steps)
    }

    fn find_all(&self, node: Node<'a, 'input>, steps: &[Step<'_>]) -> Vec<Node<'a, 'input>> {
        find_all(node, ECU_EXTRACT_NAMESPACE, steps)
    }
}

/// Identification of the CAN frame behind a Com PDU
#[derive(Debug, Default)]
struct FrameParameters {
    frame_id: Option<u32>,
    length: Option<u32>,
    is_extended_frame: Option<bool>,
}

/// Steps down to the `ComConfig` container of the Com module in `package`
fn com_config_steps(package: &str) -> [Step<'_>; 6] {
    [
        Step::tag("AR-PACKAGES"),
        Step::named("AR-PACKAGE", package),
        Step::tag("ELEMENTS"),
        Step::named("ECUC-MODULE-CONFIGURATION-VALUES", "Com"),
        Step::tag("CONTAINERS"),
        Step::named("ECUC-CONTAINER-VALUE", "ComConfig"),
    ]
}

/// First path segment of an absolute reference (`/Pkg/...` → `Pkg`)
fn package_name(reference: &str) -> &str {
    reference.split('/').nth(1).unwrap_or("")
}

fn parse_decimal(value: &str) -> Result<u32> {
    value
        .trim()
        .parse()
        .map_err(|_| ArxmlError::InvalidNumber(value.trim().to_string()))
}

/// All elements reached along `steps`, in document order
fn find_all<'a, 'input>(node: Node<'a, 'input>, namespace: &str, steps: &[Step<'_>]) -> Vec<Node<'a, 'input>> {
    let mut current = vec![node];
    for step in steps {
        current = current
            .iter()
            .flat_map(|n| n.children())
            .filter(|child| {
                xml::has_tag(*child, namespace, step.tag)
                    && step
                        .short_name
                        .map_or(true, |name| xml::short_name(*child, namespace) == Some(name))
            })
            .collect();
        if current.is_empty() {
            break;
        }
    }
    current
}

fn find_first<'a, 'input>(node: Node<'a, 'input>, namespace: &str, steps: &[Step<'_>]) -> Option<Node<'a, 'input>> {
    find_all(node, namespace, steps).into_iter().next()
}
