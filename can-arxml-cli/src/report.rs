//! Text rendering of loaded databases

use can_arxml::{ByteOrder, Database, Message, Signal};
use std::io::{self, Write};
use std::path::Path;

/// Render one loaded file as an indented text listing
pub fn write_text<W: Write>(out: &mut W, path: &Path, database: &Database, show_choices: bool) -> io::Result<()> {
    let stats = database.stats();
    writeln!(out, "{}", path.display())?;
    writeln!(
        out,
        "  {} buses, {} messages, {} signals",
        stats.num_buses, stats.num_messages, stats.num_signals
    )?;

    for bus in &database.buses {
        write!(out, "  Bus {}", bus.name)?;
        if let Some(baudrate) = bus.baudrate {
            write!(out, " ({} baud", baudrate)?;
            if let Some(fd_baudrate) = bus.fd_baudrate {
                write!(out, ", FD {} baud", fd_baudrate)?;
            }
            write!(out, ")")?;
        }
        writeln!(out)?;
    }

    for message in &database.messages {
        write_message(out, message, show_choices)?;
    }

    Ok(())
}

fn write_message<W: Write>(out: &mut W, message: &Message, show_choices: bool) -> io::Result<()> {
    write!(
        out,
        "  Message {} 0x{:X} ({}), {} bytes",
        message.name,
        message.frame_id,
        if message.is_extended_frame { "extended" } else { "standard" },
        message.length
    )?;
    if let Some(cycle_time) = message.cycle_time {
        write!(out, ", every {} ms", cycle_time)?;
    }
    if let Some(bus_name) = &message.bus_name {
        write!(out, ", on {}", bus_name)?;
    }
    writeln!(out)?;

    for signal in &message.signals {
        write_signal(out, signal, show_choices)?;
    }

    Ok(())
}

fn write_signal<W: Write>(out: &mut W, signal: &Signal, show_choices: bool) -> io::Result<()> {
    let byte_order = match signal.byte_order {
        ByteOrder::LittleEndian => "LE",
        ByteOrder::BigEndian => "BE",
    };
    let kind = if signal.is_float {
        "float"
    } else if signal.is_signed {
        "signed"
    } else {
        "unsigned"
    };

    write!(
        out,
        "    {:<32} {:>3}|{:<2} {} {}",
        signal.name, signal.start, signal.length, byte_order, kind
    )?;

    if !signal.exact.is_identity() {
        write!(out, " = raw * {} + {}", signal.exact.scale, signal.exact.offset)?;
    }
    if signal.minimum.is_some() || signal.maximum.is_some() {
        let bound = |value: Option<f64>| value.map(|v| v.to_string()).unwrap_or_default();
        write!(out, " [{}..{}]", bound(signal.minimum), bound(signal.maximum))?;
    }
    if let Some(unit) = &signal.unit {
        write!(out, " {}", unit)?;
    }
    if let Some(initial) = &signal.initial {
        write!(out, " init={}", initial)?;
    }
    if signal.is_multiplexer {
        write!(out, " (multiplexer)")?;
    }
    if let (Some(multiplexer), Some(ids)) = (&signal.multiplexer_signal, &signal.multiplexer_ids) {
        let ids: Vec<String> = ids.iter().map(i64::to_string).collect();
        write!(out, " (when {} = {})", multiplexer, ids.join(","))?;
    }
    writeln!(out)?;

    if show_choices {
        if let Some(choices) = &signal.choices {
            for (value, named) in choices {
                writeln!(out, "      {} = {}", value, named.name)?;
            }
        }
    }

    Ok(())
}
