//! Message extraction from CAN frame triggerings

use crate::arxml::locate::PathAtom;
use crate::arxml::schema;
use crate::arxml::system::SystemLoader;
use crate::arxml::xml;
use crate::database::{Comments, Message};
use crate::numeric;
use crate::types::{ArxmlError, Result};
use roxmltree::Node;

/// Language assumed for `L-2` elements without an `L` attribute
const DEFAULT_LANGUAGE: &str = "EN";

/// First selector signal of a frame is `<frame>_selector1`
const FIRST_SELECTOR_INDEX: u32 = 1;

impl<'a, 'input> SystemLoader<'a, 'input> {
    /// Build the message described by a CAN-FRAME-TRIGGERING
    pub(crate) fn load_message(&self, triggering: Node<'a, 'input>, bus_name: Option<&str>) -> Result<Message> {
        let locator = self.locator();

        let frame = locator.unique(triggering, schema::TRIGGERED_FRAME)?.ok_or_else(|| {
            ArxmlError::MissingElement(format!(
                "FRAME of frame triggering '{}'",
                self.index.path_of(triggering).unwrap_or("")
            ))
        })?;

        let name = locator.short_name(frame)?.to_string();
        let frame_id = numeric::parse_u32(locator.require_text(triggering, &[PathAtom::one("IDENTIFIER")])?)?;
        let length = numeric::parse_u32(locator.require_text(frame, &[PathAtom::one("FRAME-LENGTH")])?)?;
        let is_extended_frame = locator
            .unique_text(triggering, &[PathAtom::one("CAN-ADDRESSING-MODE")])?
            .is_some_and(|mode| mode == "EXTENDED");
        let comments = self.load_comments(frame)?;

        // CAN frames carry exactly one PDU
        let mut pdus = locator.children(&[frame], schema::FRAME_PDUS)?;
        let pdu = match pdus.len() {
            0 => {
                return Err(ArxmlError::MissingElement(format!("PDU of frame '{}'", name)));
            }
            1 => pdus.remove(0),
            n => {
                return Err(ArxmlError::Unsupported(format!(
                    "frame '{}' carries {} PDUs, CAN frames carry exactly one",
                    name, n
                )));
            }
        };

        let layout = self.decompose_pdu(pdu, &name, FIRST_SELECTOR_INDEX)?;

        Ok(Message {
            frame_id,
            is_extended_frame,
            name,
            length,
            signals: layout.signals,
            cycle_time: layout.cycle_time,
            comments,
            bus_name: bus_name.map(str::to_string),
        })
    }

    /// Per-language descriptions from `DESC/L-2`
    pub(crate) fn load_comments(&self, node: Node<'a, 'input>) -> Result<Option<Comments>> {
        let mut comments = Comments::new();

        for l2 in self.locator().children(&[node], schema::COMMENTS)? {
            let language = l2.attribute("L").unwrap_or(DEFAULT_LANGUAGE);
            comments.insert(language.to_string(), xml::text(l2).to_string());
        }

        Ok(if comments.is_empty() { None } else { Some(comments) })
    }
}
