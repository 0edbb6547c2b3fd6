//! Element locations that differ between AUTOSAR 3 and AUTOSAR 4
//!
//! Extractors never spell out version-specific paths themselves; they look
//! them up in the [`SchemaPaths`] table selected for the document.

use crate::arxml::locate::PathAtom;
use crate::arxml::version::AutosarVersion;

type Path = &'static [PathAtom];

/// Location table for one schema generation
#[derive(Debug)]
pub struct SchemaPaths {
    /// Package container directly below the root element
    pub root_packages: &'static str,
    /// Package container nested in a package
    pub sub_packages: &'static str,
    /// CAN clusters of a package
    pub can_clusters: Path,
    /// Frame triggerings of a CAN cluster
    pub frame_triggerings: Path,
    /// Nominal baudrate of a CAN cluster
    pub baudrate: Path,
    /// CAN-FD data phase baudrate of a CAN cluster (AUTOSAR 4 only)
    pub fd_baudrate: Option<Path>,
    /// Cycle time of a PDU in seconds
    pub pdu_cycle_time: Path,
    /// Signal mapping containers of a PDU
    pub signal_mappings: &'static [Path],
    /// Dynamic part alternatives of a multiplexed PDU
    pub dynamic_alternatives: Path,
    /// Static part PDUs of a multiplexed PDU
    pub static_parts: Path,
    /// Signal referenced by a signal mapping
    pub mapped_signal: Path,
    /// Compu method of a system signal
    pub compu_method: Path,
    /// Initial value text of an I-SIGNAL, tried in order (AUTOSAR 4)
    pub init_value: &'static [Path],
}

const AUTOSAR4_FD_BAUDRATE: Path = &[
    PathAtom::one("CAN-CLUSTER-VARIANTS"),
    PathAtom::many_ref("CAN-CLUSTER-CONDITIONAL"),
    PathAtom::one("CAN-FD-BAUDRATE"),
];

pub static AUTOSAR4_PATHS: SchemaPaths = SchemaPaths {
    root_packages: "AR-PACKAGES",
    sub_packages: "AR-PACKAGES",
    can_clusters: &[PathAtom::one("ELEMENTS"), PathAtom::many_ref("CAN-CLUSTER")],
    frame_triggerings: &[
        PathAtom::one("CAN-CLUSTER-VARIANTS"),
        PathAtom::many_ref("CAN-CLUSTER-CONDITIONAL"),
        PathAtom::one("PHYSICAL-CHANNELS"),
        PathAtom::many_ref("CAN-PHYSICAL-CHANNEL"),
        PathAtom::one("FRAME-TRIGGERINGS"),
        PathAtom::many_ref("CAN-FRAME-TRIGGERING"),
    ],
    baudrate: &[
        PathAtom::one("CAN-CLUSTER-VARIANTS"),
        PathAtom::many_ref("CAN-CLUSTER-CONDITIONAL"),
        PathAtom::one("BAUDRATE"),
    ],
    fd_baudrate: Some(AUTOSAR4_FD_BAUDRATE),
    pdu_cycle_time: &[
        PathAtom::one("I-PDU-TIMING-SPECIFICATIONS"),
        PathAtom::one("I-PDU-TIMING"),
        PathAtom::one("TRANSMISSION-MODE-DECLARATION"),
        PathAtom::one("TRANSMISSION-MODE-TRUE-TIMING"),
        PathAtom::one("CYCLIC-TIMING"),
        PathAtom::one("TIME-PERIOD"),
        PathAtom::one("VALUE"),
    ],
    // regular PDUs use I-SIGNAL-TO-PDU-MAPPINGS, network management PDUs
    // I-SIGNAL-TO-I-PDU-MAPPINGS
    signal_mappings: &[
        &[
            PathAtom::one("I-SIGNAL-TO-PDU-MAPPINGS"),
            PathAtom::many_ref("I-SIGNAL-TO-I-PDU-MAPPING"),
        ],
        &[
            PathAtom::one("I-SIGNAL-TO-I-PDU-MAPPINGS"),
            PathAtom::many_ref("I-SIGNAL-TO-I-PDU-MAPPING"),
        ],
    ],
    dynamic_alternatives: &[
        PathAtom::one("DYNAMIC-PARTS"),
        PathAtom::many("DYNAMIC-PART"),
        PathAtom::one("DYNAMIC-PART-ALTERNATIVES"),
        PathAtom::many("DYNAMIC-PART-ALTERNATIVE"),
    ],
    static_parts: &[
        PathAtom::one("STATIC-PARTS"),
        PathAtom::many("STATIC-PART"),
        PathAtom::one_ref("I-PDU"),
    ],
    mapped_signal: &[PathAtom::one_ref("I-SIGNAL")],
    compu_method: &[
        PathAtom::one_ref("PHYSICAL-PROPS"),
        PathAtom::one("SW-DATA-DEF-PROPS-VARIANTS"),
        PathAtom::one_ref("SW-DATA-DEF-PROPS-CONDITIONAL"),
        PathAtom::one_ref("COMPU-METHOD"),
    ],
    init_value: &[
        &[
            PathAtom::one("INIT-VALUE"),
            PathAtom::one("NUMERICAL-VALUE-SPECIFICATION"),
            PathAtom::one("VALUE"),
        ],
        &[
            PathAtom::one("INIT-VALUE"),
            PathAtom::one("CONSTANT-REFERENCE"),
            PathAtom::one_ref("CONSTANT"),
            PathAtom::one("VALUE-SPEC"),
            PathAtom::one("NUMERICAL-VALUE-SPECIFICATION"),
            PathAtom::one("VALUE"),
        ],
    ],
};

pub static AUTOSAR3_PATHS: SchemaPaths = SchemaPaths {
    root_packages: "TOP-LEVEL-PACKAGES",
    sub_packages: "SUB-PACKAGES",
    can_clusters: &[PathAtom::one("ELEMENTS"), PathAtom::many_ref("CAN-CLUSTER")],
    frame_triggerings: &[
        PathAtom::one("PHYSICAL-CHANNELS"),
        PathAtom::many_ref("PHYSICAL-CHANNEL"),
        // the AUTOSAR 3.2 XSD really spells it with a double S
        PathAtom::one("FRAME-TRIGGERINGSS"),
        PathAtom::many_ref("CAN-FRAME-TRIGGERING"),
    ],
    baudrate: &[PathAtom::one("SPEED")],
    fd_baudrate: None,
    pdu_cycle_time: &[
        PathAtom::one("I-PDU-TIMING-SPECIFICATION"),
        PathAtom::one("CYCLIC-TIMING"),
        PathAtom::one("REPEATING-TIME"),
        PathAtom::one("VALUE"),
    ],
    signal_mappings: &[
        &[
            PathAtom::one("SIGNAL-TO-PDU-MAPPINGS"),
            PathAtom::many_ref("I-SIGNAL-TO-I-PDU-MAPPING"),
        ],
        &[
            PathAtom::one("I-SIGNAL-TO-I-PDU-MAPPINGS"),
            PathAtom::many_ref("I-SIGNAL-TO-I-PDU-MAPPING"),
        ],
    ],
    dynamic_alternatives: &[
        PathAtom::one("DYNAMIC-PART"),
        PathAtom::one("DYNAMIC-PART-ALTERNATIVES"),
        PathAtom::many("DYNAMIC-PART-ALTERNATIVE"),
    ],
    static_parts: &[PathAtom::one("STATIC-PART"), PathAtom::one_ref("I-PDU")],
    mapped_signal: &[PathAtom::one_ref("SIGNAL")],
    compu_method: &[
        PathAtom::one_ref("DATA-TYPE"),
        PathAtom::one("SW-DATA-DEF-PROPS"),
        PathAtom::one_ref("COMPU-METHOD"),
    ],
    init_value: &[],
};

/// Frame referenced by a frame triggering
pub const TRIGGERED_FRAME: Path = &[PathAtom::one_ref("FRAME")];

/// PDUs carried by a frame
pub const FRAME_PDUS: Path = &[
    PathAtom::one("PDU-TO-FRAME-MAPPINGS"),
    PathAtom::many_ref("PDU-TO-FRAME-MAPPING"),
    PathAtom::many_ref("PDU"),
];

pub const COMMENTS: Path = &[PathAtom::one("DESC"), PathAtom::many("L-2")];

pub const SYSTEM_SIGNAL: Path = &[PathAtom::one_ref("SYSTEM-SIGNAL")];

pub const BASE_TYPE: Path = &[
    PathAtom::one_ref("NETWORK-REPRESENTATION-PROPS"),
    PathAtom::one("SW-DATA-DEF-PROPS-VARIANTS"),
    PathAtom::one_ref("SW-DATA-DEF-PROPS-CONDITIONAL"),
    PathAtom::one_ref("BASE-TYPE"),
];

pub const BASE_TYPE_ENCODING: Path = &[PathAtom::one_ref("BASE-TYPE-ENCODING")];

pub const SYSTEM_SIGNAL_UNIT: Path = &[
    PathAtom::one("PHYSICAL-PROPS"),
    PathAtom::one("SW-DATA-DEF-PROPS-VARIANTS"),
    PathAtom::one_ref("SW-DATA-DEF-PROPS-CONDITIONAL"),
    PathAtom::one_ref("UNIT"),
    PathAtom::one("DISPLAY-NAME"),
];

pub const COMPU_METHOD_UNIT: Path = &[PathAtom::one_ref("UNIT"), PathAtom::one("DISPLAY-NAME")];

/// All scales of a TEXTTABLE or SCALE_LINEAR_AND_TEXTTABLE compu method
pub const COMPU_SCALES: Path = &[
    PathAtom::one_ref("COMPU-INTERNAL-TO-PHYS"),
    PathAtom::one("COMPU-SCALES"),
    PathAtom::many_ref("COMPU-SCALE"),
];

/// The single scale of a LINEAR compu method
pub const LINEAR_COMPU_SCALE: Path = &[
    PathAtom::one("COMPU-INTERNAL-TO-PHYS"),
    PathAtom::one("COMPU-SCALES"),
    PathAtom::one_ref("COMPU-SCALE"),
];

pub const COMPU_CONST_TEXT: Path = &[PathAtom::one_ref("COMPU-CONST"), PathAtom::one("VT")];
pub const COMPU_RATIONAL_COEFFS: Path = &[PathAtom::one_ref("COMPU-RATIONAL-COEFFS")];
pub const COMPU_NUMERATOR: Path = &[PathAtom::one_ref("COMPU-NUMERATOR"), PathAtom::many_ref("V")];
pub const COMPU_DENOMINATOR: Path = &[PathAtom::one_ref("COMPU-DENOMINATOR"), PathAtom::many_ref("V")];

/// Location table for a schema version
pub fn paths_for(version: &AutosarVersion) -> &'static SchemaPaths {
    if version.is_autosar4() {
        &AUTOSAR4_PATHS
    } else {
        &AUTOSAR3_PATHS
    }
}
