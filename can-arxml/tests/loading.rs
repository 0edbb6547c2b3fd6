// End-to-end loading of ARXML documents
use can_arxml::numeric::Rational;
use can_arxml::{
    parse_arxml_file, parse_arxml_str, ArxmlError, ByteOrder, Database, LoaderConfig, SignalValue,
};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

fn data_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data").join(name)
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn load(name: &str) -> Database {
    init_logging();
    parse_arxml_file(data_path(name), &LoaderConfig::default()).unwrap()
}

/// Minimal AUTOSAR 4 document around the given packages
fn ar4(packages: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<AUTOSAR xmlns="http://autosar.org/schema/r4.0"><AR-PACKAGES>{}</AR-PACKAGES></AUTOSAR>"#,
        packages
    )
}

/// Cluster with a single frame triggering
fn cluster(frame_ref: &str) -> String {
    format!(
        r#"<AR-PACKAGE><SHORT-NAME>Cluster</SHORT-NAME><ELEMENTS>
  <CAN-CLUSTER><SHORT-NAME>Can</SHORT-NAME><CAN-CLUSTER-VARIANTS><CAN-CLUSTER-CONDITIONAL>
    <PHYSICAL-CHANNELS><CAN-PHYSICAL-CHANNEL><SHORT-NAME>Channel</SHORT-NAME><FRAME-TRIGGERINGS>
      <CAN-FRAME-TRIGGERING><SHORT-NAME>Triggering</SHORT-NAME>
        <FRAME-REF DEST="CAN-FRAME">{}</FRAME-REF>
        <IDENTIFIER>100</IDENTIFIER>
      </CAN-FRAME-TRIGGERING>
    </FRAME-TRIGGERINGS></CAN-PHYSICAL-CHANNEL></PHYSICAL-CHANNELS>
  </CAN-CLUSTER-CONDITIONAL></CAN-CLUSTER-VARIANTS></CAN-CLUSTER>
</ELEMENTS></AR-PACKAGE>"#,
        frame_ref
    )
}

/// Frame `F` carrying the PDU `/Pdus/<pdu>`
fn frame(pdu: &str) -> String {
    format!(
        r#"<AR-PACKAGE><SHORT-NAME>Frames</SHORT-NAME><ELEMENTS>
  <CAN-FRAME><SHORT-NAME>F</SHORT-NAME><FRAME-LENGTH>8</FRAME-LENGTH>
    <PDU-TO-FRAME-MAPPINGS><PDU-TO-FRAME-MAPPING><SHORT-NAME>M</SHORT-NAME>
      <PDU-REF>/Pdus/{}</PDU-REF>
    </PDU-TO-FRAME-MAPPING></PDU-TO-FRAME-MAPPINGS>
  </CAN-FRAME>
</ELEMENTS></AR-PACKAGE>"#,
        pdu
    )
}

/// I-SIGNAL-I-PDU mapping `(signal, start)` pairs
fn signal_pdu(name: &str, mappings: &[(&str, u32)]) -> String {
    let mappings: String = mappings
        .iter()
        .map(|(signal, start)| {
            format!(
                "<I-SIGNAL-TO-I-PDU-MAPPING><SHORT-NAME>{signal}Mapping</SHORT-NAME>\
                 <I-SIGNAL-REF DEST=\"I-SIGNAL\">/Signals/{signal}</I-SIGNAL-REF>\
                 <START-POSITION>{start}</START-POSITION></I-SIGNAL-TO-I-PDU-MAPPING>"
            )
        })
        .collect();
    format!(
        "<I-SIGNAL-I-PDU><SHORT-NAME>{}</SHORT-NAME><I-SIGNAL-TO-PDU-MAPPINGS>{}</I-SIGNAL-TO-PDU-MAPPINGS></I-SIGNAL-I-PDU>",
        name, mappings
    )
}

/// MULTIPLEXED-I-PDU; alternatives are `(pdu, code, initial)`
fn multiplexed_pdu(name: &str, selector: (u32, u32), alternatives: &[(&str, i64, bool)], static_pdu: Option<&str>) -> String {
    let alternatives: String = alternatives
        .iter()
        .map(|(pdu, code, initial)| {
            format!(
                "<DYNAMIC-PART-ALTERNATIVE><I-PDU-REF>/Pdus/{pdu}</I-PDU-REF>\
                 <INITIAL-DYNAMIC-PART>{initial}</INITIAL-DYNAMIC-PART>\
                 <SELECTOR-FIELD-CODE>{code}</SELECTOR-FIELD-CODE></DYNAMIC-PART-ALTERNATIVE>"
            )
        })
        .collect();
    let static_part = static_pdu
        .map(|pdu| {
            format!(
                "<STATIC-PARTS><STATIC-PART><SHORT-NAME>{name}Static</SHORT-NAME>\
                 <I-PDU-REF>/Pdus/{pdu}</I-PDU-REF></STATIC-PART></STATIC-PARTS>"
            )
        })
        .unwrap_or_default();
    format!(
        "<MULTIPLEXED-I-PDU><SHORT-NAME>{name}</SHORT-NAME>\
         <DYNAMIC-PARTS><DYNAMIC-PART><SHORT-NAME>{name}Dynamic</SHORT-NAME>\
         <DYNAMIC-PART-ALTERNATIVES>{alternatives}</DYNAMIC-PART-ALTERNATIVES></DYNAMIC-PART></DYNAMIC-PARTS>\
         <SELECTOR-FIELD-LENGTH>{}</SELECTOR-FIELD-LENGTH>\
         <SELECTOR-FIELD-START-POSITION>{}</SELECTOR-FIELD-START-POSITION>{static_part}</MULTIPLEXED-I-PDU>",
        selector.1, selector.0
    )
}

/// Plain I-SIGNALs of the given `(name, length)`
fn signals(signals: &[(&str, u32)]) -> String {
    let elements: String = signals
        .iter()
        .map(|(name, length)| format!("<I-SIGNAL><SHORT-NAME>{name}</SHORT-NAME><LENGTH>{length}</LENGTH></I-SIGNAL>"))
        .collect();
    format!("<AR-PACKAGE><SHORT-NAME>Signals</SHORT-NAME><ELEMENTS>{}</ELEMENTS></AR-PACKAGE>", elements)
}

/// Frame `F` with signal `A` (16 bits at bit 0) scaled by a compu method
/// of `category` made of the given COMPU-SCALE elements
fn scaled_signal(category: &str, compu_scales: &str) -> String {
    ar4(&format!(
        r#"{}{}{}
<AR-PACKAGE><SHORT-NAME>Signals</SHORT-NAME><ELEMENTS>
  <I-SIGNAL><SHORT-NAME>A</SHORT-NAME><LENGTH>16</LENGTH>
    <SYSTEM-SIGNAL-REF DEST="SYSTEM-SIGNAL">/SystemSignals/A</SYSTEM-SIGNAL-REF>
  </I-SIGNAL>
</ELEMENTS></AR-PACKAGE>
<AR-PACKAGE><SHORT-NAME>SystemSignals</SHORT-NAME><ELEMENTS>
  <SYSTEM-SIGNAL><SHORT-NAME>A</SHORT-NAME><PHYSICAL-PROPS><SW-DATA-DEF-PROPS-VARIANTS>
    <SW-DATA-DEF-PROPS-CONDITIONAL>
      <COMPU-METHOD-REF DEST="COMPU-METHOD">/CompuMethods/A</COMPU-METHOD-REF>
    </SW-DATA-DEF-PROPS-CONDITIONAL>
  </SW-DATA-DEF-PROPS-VARIANTS></PHYSICAL-PROPS></SYSTEM-SIGNAL>
</ELEMENTS></AR-PACKAGE>
<AR-PACKAGE><SHORT-NAME>CompuMethods</SHORT-NAME><ELEMENTS>
  <COMPU-METHOD><SHORT-NAME>A</SHORT-NAME><CATEGORY>{}</CATEGORY>
    <COMPU-INTERNAL-TO-PHYS><COMPU-SCALES>{}</COMPU-SCALES></COMPU-INTERNAL-TO-PHYS>
  </COMPU-METHOD>
</ELEMENTS></AR-PACKAGE>"#,
        cluster("/Frames/F"),
        frame("P"),
        pdus(&[signal_pdu("P", &[("A", 0)])]),
        category,
        compu_scales
    ))
}

/// COMPU-SCALE with `phys = (offset + scale * raw) / 1`
fn linear_scale(limits: Option<(&str, &str)>, offset: &str, scale: &str) -> String {
    let limits = limits
        .map(|(lower, upper)| format!("<LOWER-LIMIT>{lower}</LOWER-LIMIT><UPPER-LIMIT>{upper}</UPPER-LIMIT>"))
        .unwrap_or_default();
    format!(
        "<COMPU-SCALE>{limits}<COMPU-RATIONAL-COEFFS>\
         <COMPU-NUMERATOR><V>{offset}</V><V>{scale}</V></COMPU-NUMERATOR>\
         <COMPU-DENOMINATOR><V>1</V></COMPU-DENOMINATOR>\
         </COMPU-RATIONAL-COEFFS></COMPU-SCALE>"
    )
}

/// The ECU extract fixture with `from` replaced by `to`
fn patched_ecu_extract(from: &str, to: &str) -> String {
    let text = fs::read_to_string(data_path("ecu-extract-4.arxml")).unwrap();
    assert!(text.contains(from), "fixture does not contain {:?}", from);
    text.replace(from, to)
}

fn pdus(pdus: &[String]) -> String {
    format!("<AR-PACKAGE><SHORT-NAME>Pdus</SHORT-NAME><ELEMENTS>{}</ELEMENTS></AR-PACKAGE>", pdus.concat())
}

#[test]
fn test_autosar4_buses() {
    let database = load("system-4.arxml");

    assert_eq!(database.buses.len(), 1);
    let bus = &database.buses[0];
    assert_eq!(bus.name, "Body");
    assert_eq!(bus.baudrate, Some(500_000));
    assert_eq!(bus.fd_baudrate, Some(2_000_000));
    assert_eq!(bus.comments.as_ref().unwrap()["EN"], "Body CAN");
    assert!(database.version.is_none());
}

#[test]
fn test_autosar4_message() {
    let database = load("system-4.arxml");
    assert_eq!(database.messages.len(), 2);

    let message = &database.messages[0];
    assert_eq!(message.name, "EngineStatus");
    assert_eq!(message.frame_id, 291);
    assert!(!message.is_extended_frame);
    assert_eq!(message.length, 8);
    assert_eq!(message.cycle_time, Some(100));
    assert_eq!(message.bus_name.as_deref(), Some("Body"));

    let comments = message.comments.as_ref().unwrap();
    assert_eq!(comments["EN"], "Engine state");
    assert_eq!(comments["DE"], "Motorzustand");

    // the signal group mapping contributes nothing
    let names: Vec<&str> = message.signals.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["EngineSpeed", "GearState", "Temperature"]);
    assert!(!message.is_multiplexed());
}

#[test]
fn test_autosar4_linear_signal() {
    let database = load("system-4.arxml");
    let signal = database.messages[0].signal_by_name("EngineSpeed").unwrap();

    assert_eq!(signal.start, 0);
    assert_eq!(signal.length, 8);
    assert_eq!(signal.byte_order, ByteOrder::LittleEndian);
    assert!(!signal.is_signed);
    assert!(!signal.is_float);
    assert_eq!(signal.scale, 2.0);
    assert_eq!(signal.offset, 10.0);
    assert_eq!(signal.minimum, Some(10.0));
    assert_eq!(signal.maximum, Some(210.0));
    assert_eq!(signal.unit.as_deref(), Some("rpm"));
    assert_eq!(signal.initial, Some(SignalValue::Float(20.0)));
    assert_eq!(signal.comments.as_ref().unwrap()["EN"], "Engine speed");
    assert!(signal.choices.is_none());
}

#[test]
fn test_autosar4_texttable_signal() {
    let database = load("system-4.arxml");
    let signal = database.messages[0].signal_by_name("GearState").unwrap();

    assert_eq!(signal.length, 4);
    assert_eq!(signal.minimum, Some(0.0));
    assert_eq!(signal.maximum, Some(2.0));
    // NoUnit is not a unit
    assert!(signal.unit.is_none());
    assert!(signal.exact.is_identity());

    let choices = signal.choices.as_ref().unwrap();
    assert_eq!(choices.len(), 3);
    assert_eq!(choices[&0].name, "Neutral");
    assert_eq!(choices[&2].name, "Second");
    assert_eq!(choices[&1].comments.as_ref().unwrap()["EN"], "First gear engaged");

    // initial value through a constant specification
    match signal.initial.as_ref().unwrap() {
        SignalValue::Named(named) => {
            assert_eq!(named.value, 1);
            assert_eq!(named.name, "First");
        }
        other => panic!("expected named initial value, got {:?}", other),
    }
}

#[test]
fn test_autosar4_relative_references() {
    let database = load("system-4.arxml");
    let signal = database.messages[0].signal_by_name("Temperature").unwrap();

    assert_eq!(signal.start, 23);
    assert_eq!(signal.length, 16);
    assert_eq!(signal.byte_order, ByteOrder::BigEndian);
    assert!(signal.is_signed);

    assert_eq!(signal.exact.scale, Rational::new(1, 10).unwrap());
    assert_eq!(signal.exact.offset, Rational::from_integer(-40));
    assert_eq!(signal.offset, -40.0);
    assert!(signal.minimum.is_none());
    // the unit of the compu method is used when the system signal has none
    assert_eq!(signal.unit.as_deref(), Some("degC"));
    assert!(signal.initial.is_none());
}

#[test]
fn test_autosar4_multiplexed_message() {
    let database = load("system-4.arxml");
    let message = database.message_by_frame_id(0x18FF_0010).unwrap();

    assert_eq!(message.name, "Diagnostics");
    assert!(message.is_extended_frame);
    assert!(message.cycle_time.is_none());
    assert!(message.is_multiplexed());

    let names: Vec<&str> = message.signals.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["Diagnostics_selector1", "ErrorCount", "OperatingHours", "AliveCounter"]);

    let selector = &message.signals[0];
    assert!(selector.is_multiplexer);
    assert_eq!(selector.start, 0);
    assert_eq!(selector.length, 8);
    assert_eq!(selector.initial, Some(SignalValue::Integer(0)));
    let choices = selector.choices.as_ref().unwrap();
    assert_eq!(choices[&0].name, "Errors");
    assert_eq!(choices[&1].name, "Hours");

    let errors = &message.signals[1];
    assert_eq!(errors.multiplexer_signal.as_deref(), Some("Diagnostics_selector1"));
    assert_eq!(errors.multiplexer_ids, Some(vec![0]));

    let hours = &message.signals[2];
    assert_eq!(hours.multiplexer_ids, Some(vec![1]));
    assert!(hours.is_float);
    // unsupported compu category falls back to identity
    assert!(hours.exact.is_identity());

    let counter = &message.signals[3];
    assert!(counter.multiplexer_signal.is_none());
    assert_eq!(counter.start, 56);
}

#[test]
fn test_autosar3_system() {
    let database = load("system-3.arxml");

    assert_eq!(database.buses.len(), 1);
    assert_eq!(database.buses[0].name, "Chassis");
    assert_eq!(database.buses[0].baudrate, Some(250_000));
    assert!(database.buses[0].fd_baudrate.is_none());

    assert_eq!(database.messages.len(), 1);
    let message = &database.messages[0];
    assert_eq!(message.name, "WheelSpeeds");
    assert_eq!(message.frame_id, 0x10);
    assert!(message.is_extended_frame);
    assert_eq!(message.length, 4);
    assert_eq!(message.cycle_time, Some(50));
    assert_eq!(message.comments.as_ref().unwrap()["EN"], "Wheel speeds");

    let front_left = &message.signals[0];
    assert_eq!(front_left.name, "FrontLeft");
    assert_eq!(front_left.start, 7);
    assert_eq!(front_left.length, 12);
    assert_eq!(front_left.byte_order, ByteOrder::BigEndian);
    assert_eq!(front_left.scale, 0.1);
    assert_eq!(front_left.unit.as_deref(), Some("km/h"));
    let initial = front_left.initial.as_ref().unwrap().as_f64();
    assert!((initial - 10.0).abs() < 1e-9);

    let front_right = &message.signals[1];
    assert_eq!(front_right.byte_order, ByteOrder::LittleEndian);
    assert!(front_right.initial.is_none());
}

#[test]
fn test_ecu_extract() {
    let database = load("ecu-extract-4.arxml");

    // MirrorCommand has no CAN identifier and is skipped
    assert_eq!(database.messages.len(), 1);
    assert!(database.buses.is_empty());

    let message = &database.messages[0];
    assert_eq!(message.name, "DoorStatus");
    assert_eq!(message.frame_id, 801);
    assert_eq!(message.length, 8);
    assert!(!message.is_extended_frame);
    assert!(message.bus_name.is_none());

    // the reference to a removed signal container is ignored
    assert_eq!(message.signals.len(), 2);
    let door_open = &message.signals[0];
    assert_eq!(door_open.name, "DoorOpen");
    assert_eq!((door_open.start, door_open.length), (0, 1));
    assert_eq!(door_open.byte_order, ByteOrder::LittleEndian);

    let window = &message.signals[1];
    assert_eq!(window.name, "WindowPosition");
    assert_eq!((window.start, window.length), (15, 16));
    assert_eq!(window.byte_order, ByteOrder::BigEndian);
    assert!(window.is_signed);
}

#[test]
fn test_ecu_extract_detection_disabled() {
    let config = LoaderConfig::new().with_ecu_extract_detection(false);
    let database = parse_arxml_file(data_path("ecu-extract-4.arxml"), &config).unwrap();
    assert!(database.messages.is_empty());
}

#[test]
fn test_message_filter_and_sorting() {
    let config = LoaderConfig::new()
        .with_message_filter(vec![0x18FF_0010])
        .with_sorted_signals(true);
    let database = parse_arxml_file(data_path("system-4.arxml"), &config).unwrap();

    assert_eq!(database.messages.len(), 1);
    let starts: Vec<u32> = database.messages[0].signals.iter().map(|s| s.start).collect();
    assert_eq!(starts, [0, 8, 8, 56]);
    // buses are not filtered
    assert_eq!(database.buses.len(), 1);
}

#[test]
fn test_load_from_temporary_file_with_bom() {
    let text = ar4(&format!(
        "{}{}{}{}",
        cluster("/Frames/F"),
        frame("P"),
        pdus(&[signal_pdu("P", &[("A", 0)])]),
        signals(&[("A", 8)])
    ));

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all("\u{feff}".as_bytes()).unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file.flush().unwrap();

    let database = parse_arxml_file(file.path(), &LoaderConfig::default()).unwrap();
    assert_eq!(database.messages.len(), 1);
    assert_eq!(database.messages[0].frame_id, 100);
    assert_eq!(database.messages[0].signals[0].initial, None);
}

#[test]
fn test_missing_file() {
    let err = parse_arxml_file(data_path("does-not-exist.arxml"), &LoaderConfig::default()).unwrap_err();
    assert!(matches!(err, ArxmlError::Io(_)));
}

#[test]
fn test_nested_multiplexing() {
    let text = ar4(&format!(
        "{}{}{}{}",
        cluster("/Frames/F"),
        frame("Outer"),
        pdus(&[
            multiplexed_pdu("Outer", (0, 4), &[("Inner", 3, false)], None),
            multiplexed_pdu("Inner", (4, 4), &[("Leaf", 7, false)], Some("InnerStatic")),
            signal_pdu("Leaf", &[("InnerSelector", 4), ("LeafValue", 8)]),
            signal_pdu("InnerStatic", &[("OuterSelector", 0)]),
        ]),
        signals(&[("InnerSelector", 4), ("OuterSelector", 4), ("LeafValue", 8)])
    ));

    let database = parse_arxml_str(&text, &LoaderConfig::default()).unwrap();
    let message = &database.messages[0];

    let names: Vec<&str> = message.signals.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["F_selector1", "F_selector2", "LeafValue"]);

    let inner = &message.signals[1];
    assert!(inner.is_multiplexer);
    assert_eq!(inner.start, 4);
    assert_eq!(inner.multiplexer_signal.as_deref(), Some("F_selector1"));
    assert_eq!(inner.multiplexer_ids, Some(vec![3]));

    let leaf = &message.signals[2];
    assert_eq!(leaf.multiplexer_signal.as_deref(), Some("F_selector2"));
    assert_eq!(leaf.multiplexer_ids, Some(vec![7]));

    // no initial dynamic part declared
    assert!(message.signals[0].initial.is_none());
}

#[test]
fn test_multiple_initial_dynamic_parts() {
    let text = ar4(&format!(
        "{}{}{}{}",
        cluster("/Frames/F"),
        frame("Mux"),
        pdus(&[
            multiplexed_pdu("Mux", (0, 8), &[("A", 0, true), ("B", 1, true)], None),
            signal_pdu("A", &[("Selector", 0)]),
            signal_pdu("B", &[("Selector", 0)]),
        ]),
        signals(&[("Selector", 8)])
    ));

    let err = parse_arxml_str(&text, &LoaderConfig::default()).unwrap_err();
    assert!(matches!(err, ArxmlError::AmbiguousStructure(_)));
}

#[test]
fn test_alternative_without_selector_copy() {
    let text = ar4(&format!(
        "{}{}{}{}",
        cluster("/Frames/F"),
        frame("Mux"),
        pdus(&[
            multiplexed_pdu("Mux", (0, 8), &[("A", 0, true)], None),
            signal_pdu("A", &[("Value", 8)]),
        ]),
        signals(&[("Value", 8)])
    ));

    let err = parse_arxml_str(&text, &LoaderConfig::default()).unwrap_err();
    assert!(matches!(err, ArxmlError::InconsistentMultiplexing(_)));
}

#[test]
fn test_dangling_frame_reference() {
    let text = ar4(&cluster("/Frames/Missing"));

    match parse_arxml_str(&text, &LoaderConfig::default()).unwrap_err() {
        ArxmlError::DanglingReference { reference, dest } => {
            assert_eq!(reference, "/Frames/Missing");
            assert_eq!(dest.as_deref(), Some("CAN-FRAME"));
        }
        other => panic!("expected dangling reference, got {:?}", other),
    }
}

#[test]
fn test_frame_without_pdu() {
    let text = ar4(&format!(
        "{}<AR-PACKAGE><SHORT-NAME>Frames</SHORT-NAME><ELEMENTS>\
           <CAN-FRAME><SHORT-NAME>F</SHORT-NAME><FRAME-LENGTH>8</FRAME-LENGTH></CAN-FRAME>\
         </ELEMENTS></AR-PACKAGE>",
        cluster("/Frames/F")
    ));

    let err = parse_arxml_str(&text, &LoaderConfig::default()).unwrap_err();
    assert!(matches!(err, ArxmlError::MissingElement(_)));
}

#[test]
fn test_signal_without_length() {
    let text = ar4(&format!(
        "{}{}{}<AR-PACKAGE><SHORT-NAME>Signals</SHORT-NAME><ELEMENTS>\
           <I-SIGNAL><SHORT-NAME>A</SHORT-NAME></I-SIGNAL>\
         </ELEMENTS></AR-PACKAGE>",
        cluster("/Frames/F"),
        frame("P"),
        pdus(&[signal_pdu("P", &[("A", 0)])])
    ));

    let err = parse_arxml_str(&text, &LoaderConfig::default()).unwrap_err();
    assert!(matches!(err, ArxmlError::MissingElement(_)));
}

#[test]
fn test_duplicate_paths_are_rejected() {
    let text = ar4(&signals(&[("A", 8), ("A", 8)]));

    let err = parse_arxml_str(&text, &LoaderConfig::default()).unwrap_err();
    assert!(matches!(err, ArxmlError::DuplicatePath(path) if path == "/Signals/A"));
}

#[test]
fn test_json_export() {
    let database = load("system-4.arxml");
    let json = serde_json::to_value(&database).unwrap();

    let signal = &json["messages"][0]["signals"][0];
    assert_eq!(signal["name"], "EngineSpeed");
    assert_eq!(signal["byte_order"], "little_endian");
    assert_eq!(signal["initial"], 20.0);
    assert_eq!(json["buses"][0]["baudrate"], 500_000);
}

#[test]
fn test_linear_coefficients_with_full_precision() {
    init_logging();
    let scale = "0.1000000000000000055511151231257827021181583404541015625";
    let text = scaled_signal("LINEAR", &linear_scale(None, "0", scale));

    let database = parse_arxml_str(&text, &LoaderConfig::default()).unwrap();
    let signal = &database.messages[0].signals[0];
    assert_eq!(signal.exact.scale, Rational::parse_decimal(scale).unwrap());
    assert!((signal.scale - 0.1).abs() < 1e-15);
    assert_eq!(signal.offset, 0.0);
}

#[test]
fn test_linear_coefficients_with_large_exponent() {
    let text = scaled_signal("LINEAR", &linear_scale(None, "1E40", "3"));

    let database = parse_arxml_str(&text, &LoaderConfig::default()).unwrap();
    let signal = &database.messages[0].signals[0];
    assert_eq!(signal.exact.offset.to_string(), format!("1{}", "0".repeat(40)));
    assert!((signal.offset / 1e40 - 1.0).abs() < 1e-12);
    assert_eq!(signal.exact.scale, Rational::from_integer(3));
}

#[test]
fn test_scale_linear_and_texttable() {
    let compu_scales = format!(
        "{}{}<COMPU-SCALE><LOWER-LIMIT>254</LOWER-LIMIT><UPPER-LIMIT>254</UPPER-LIMIT>\
         <COMPU-CONST><VT>Error</VT></COMPU-CONST></COMPU-SCALE>",
        linear_scale(Some(("10", "100")), "0", "1"),
        linear_scale(Some(("101", "200")), "0", "3"),
    );
    let text = scaled_signal("SCALE_LINEAR_AND_TEXTTABLE", &compu_scales);

    let database = parse_arxml_str(&text, &LoaderConfig::default()).unwrap();
    let signal = &database.messages[0].signals[0];

    // the last linear scale wins
    assert_eq!(signal.scale, 3.0);
    assert_eq!(signal.offset, 0.0);
    assert_eq!(signal.minimum, Some(10.0));
    assert_eq!(signal.maximum, Some(600.0));

    let choices = signal.choices.as_ref().unwrap();
    assert_eq!(choices.len(), 1);
    assert_eq!(choices[&254].name, "Error");
}

#[test]
fn test_unparsable_baudrate_is_ignored() {
    let text = ar4(&format!(
        "{}{}{}{}",
        cluster("/Frames/F").replace(
            "<CAN-CLUSTER-CONDITIONAL>",
            "<CAN-CLUSTER-CONDITIONAL><BAUDRATE>fast</BAUDRATE>"
        ),
        frame("P"),
        pdus(&[signal_pdu("P", &[("A", 0)])]),
        signals(&[("A", 8)])
    ));

    let database = parse_arxml_str(&text, &LoaderConfig::default()).unwrap();
    assert_eq!(database.buses.len(), 1);
    assert_eq!(database.buses[0].baudrate, None);
    assert_eq!(database.messages.len(), 1);
}

#[test]
fn test_frame_with_two_pdus() {
    let text = ar4(&format!(
        "{}<AR-PACKAGE><SHORT-NAME>Frames</SHORT-NAME><ELEMENTS>\
           <CAN-FRAME><SHORT-NAME>F</SHORT-NAME><FRAME-LENGTH>8</FRAME-LENGTH><PDU-TO-FRAME-MAPPINGS>\
             <PDU-TO-FRAME-MAPPING><SHORT-NAME>M1</SHORT-NAME><PDU-REF>/Pdus/P</PDU-REF></PDU-TO-FRAME-MAPPING>\
             <PDU-TO-FRAME-MAPPING><SHORT-NAME>M2</SHORT-NAME><PDU-REF>/Pdus/Q</PDU-REF></PDU-TO-FRAME-MAPPING>\
           </PDU-TO-FRAME-MAPPINGS></CAN-FRAME>\
         </ELEMENTS></AR-PACKAGE>{}{}",
        cluster("/Frames/F"),
        pdus(&[signal_pdu("P", &[("A", 0)]), signal_pdu("Q", &[("B", 0)])]),
        signals(&[("A", 8), ("B", 8)])
    ));

    let err = parse_arxml_str(&text, &LoaderConfig::default()).unwrap_err();
    assert!(matches!(err, ArxmlError::Unsupported(_)));
}

#[test]
fn test_ecu_extract_unsupported_direction() {
    let text = patched_ecu_extract("<VALUE>RECEIVE</VALUE>", "<VALUE>BIDIRECTIONAL</VALUE>");

    let err = parse_arxml_str(&text, &LoaderConfig::default()).unwrap_err();
    assert!(matches!(err, ArxmlError::Unsupported(message) if message.contains("BIDIRECTIONAL")));
}

#[test]
fn test_ecu_extract_signal_without_bit_size_is_skipped() {
    let text = patched_ecu_extract("<VALUE>16</VALUE>", "");

    let database = parse_arxml_str(&text, &LoaderConfig::default()).unwrap();
    let message = &database.messages[0];
    let names: Vec<&str> = message.signals.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["DoorOpen"]);
}

#[test]
fn test_ecu_extract_send_message_without_can_id_is_skipped() {
    let text = patched_ecu_extract(
        "CanIfTxPduCfg/CanIfTxPduCanId</DEFINITION-REF>",
        "CanIfTxPduCfg/CanIfTxPduUserId</DEFINITION-REF>",
    );

    let database = parse_arxml_str(&text, &LoaderConfig::default()).unwrap();
    assert!(database.messages.is_empty());
}
