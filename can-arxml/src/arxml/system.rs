//! System description loader
//!
//! Walks the AR-PACKAGE hierarchy of a system description (or any other
//! document that contains CAN clusters) and collects the buses and messages
//! of every package. The extraction steps below the package level live in
//! the sibling modules as further `impl SystemLoader` blocks.

use crate::arxml::index::ReferenceIndex;
use crate::arxml::locate::{ChildLocator, PathAtom};
use crate::arxml::schema::{self, SchemaPaths};
use crate::arxml::version::{self, AutosarVersion, DetectedVersion};
use crate::arxml::xml;
use crate::database::{Bus, Database, Message};
use crate::numeric;
use crate::types::Result;
use roxmltree::{Document, Node};

/// Loader for AUTOSAR 3 and AUTOSAR 4 system descriptions
pub struct SystemLoader<'a, 'input> {
    pub(crate) detected: DetectedVersion,
    pub(crate) paths: &'static SchemaPaths,
    pub(crate) index: ReferenceIndex<'a, 'input>,
}

/// Buses and messages collected from a package subtree
#[derive(Debug, Default)]
struct PackageContents {
    buses: Vec<Bus>,
    messages: Vec<Message>,
}

impl<'a, 'input> SystemLoader<'a, 'input> {
    /// Detect the schema version and index the document
    pub fn new(document: &'a Document<'input>) -> Result<Self> {
        let root = document.root_element();
        let detected = version::detect(root)?;
        let namespace = version::root_namespace(root)?;
        let index = ReferenceIndex::build(document, namespace)?;

        Ok(Self {
            detected,
            paths: schema::paths_for(&detected.version),
            index,
        })
    }

    pub fn version(&self) -> AutosarVersion {
        self.detected.version
    }

    pub fn index(&self) -> &ReferenceIndex<'a, 'input> {
        &self.index
    }

    pub(crate) fn locator(&self) -> ChildLocator<'_, 'a, 'input> {
        ChildLocator::new(&self.index)
    }

    /// Extract all buses and messages of the document
    pub fn load(&self) -> Result<Database> {
        let root = self.index.document().root_element();
        let namespace = self.index.namespace();

        let contents = match xml::child(root, namespace, self.paths.root_packages) {
            Some(package_list) => self.load_package_list(package_list)?,
            None => {
                log::warn!("Document has no {} element", self.paths.root_packages);
                PackageContents::default()
            }
        };

        log::info!(
            "Loaded {} messages on {} buses (AUTOSAR {})",
            contents.messages.len(),
            contents.buses.len(),
            self.detected.version
        );

        Ok(Database {
            messages: contents.messages,
            buses: contents.buses,
            version: None,
        })
    }

    fn load_package_list(&self, package_list: Node<'a, 'input>) -> Result<PackageContents> {
        let mut contents = PackageContents::default();

        for package in package_list.children().filter(|c| self.index.is_tag(*c, "AR-PACKAGE")) {
            let mut package_contents = self.load_package(package)?;
            contents.buses.append(&mut package_contents.buses);
            contents.messages.append(&mut package_contents.messages);

            if let Some(sub_packages) = xml::child(package, self.index.namespace(), self.paths.sub_packages) {
                let mut nested = self.load_package_list(sub_packages)?;
                contents.buses.append(&mut nested.buses);
                contents.messages.append(&mut nested.messages);
            }
        }

        Ok(contents)
    }

    fn load_package(&self, package: Node<'a, 'input>) -> Result<PackageContents> {
        let locator = self.locator();
        let mut contents = PackageContents::default();

        for cluster in locator.children(&[package], self.paths.can_clusters)? {
            let bus = self.load_bus(cluster)?;

            for triggering in locator.children(&[cluster], self.paths.frame_triggerings)? {
                let message = self.load_message(triggering, Some(&bus.name))?;
                log::debug!(
                    "Loaded message '{}' (0x{:X}) with {} signals",
                    message.name,
                    message.frame_id,
                    message.signals.len()
                );
                contents.messages.push(message);
            }

            contents.buses.push(bus);
        }

        if !contents.messages.is_empty() {
            log::debug!(
                "Package '{}': {} messages",
                self.index.path_of(package).unwrap_or(""),
                contents.messages.len()
            );
        }

        Ok(contents)
    }

    fn load_bus(&self, cluster: Node<'a, 'input>) -> Result<Bus> {
        let locator = self.locator();
        let name = locator.short_name(cluster)?.to_string();

        let baudrate = self.first_number(cluster, self.paths.baudrate)?;
        let fd_baudrate = match self.paths.fd_baudrate {
            Some(path) => self.first_number(cluster, path)?,
            None => None,
        };

        Ok(Bus {
            name,
            comments: self.load_comments(cluster)?,
            baudrate,
            fd_baudrate,
        })
    }

    /// First value reached along a multi-valued path (cluster variants)
    ///
    /// Bus metadata is informational, so unparsable text is logged and
    /// treated as absent.
    fn first_number(&self, node: Node<'a, 'input>, path: &[PathAtom]) -> Result<Option<u32>> {
        let values = self.locator().children(&[node], path)?;
        let Some(value) = values.first() else {
            return Ok(None);
        };

        match numeric::parse_u32(xml::text(*value)) {
            Ok(number) => Ok(Some(number)),
            Err(e) => {
                log::warn!(
                    "Ignoring {} of '{}': {}",
                    value.tag_name().name(),
                    self.index.path_of(node).unwrap_or(""),
                    e
                );
                Ok(None)
            }
        }
    }
}
