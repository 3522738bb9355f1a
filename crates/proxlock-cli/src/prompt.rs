//! Interactive settings editing.
//!
//! Reads one line per field; an empty answer keeps the current value.
//! Generic over the reader and writer so it can be driven from tests.

use std::io::{self, BufRead, Write};

use proxlock_core::{Settings, MAX_DURATION_SECS};

/// Ask `question` and return the trimmed answer, or `None` for an empty
/// line or end of input.
///
/// # Errors
///
/// Returns an error if reading or writing fails.
pub fn ask<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    question: &str,
) -> io::Result<Option<String>> {
    write!(output, "{question} : ")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let answer = line.trim();
    Ok((!answer.is_empty()).then(|| answer.to_string()))
}

/// Walk through the editable fields and return the updated settings.
///
/// The target address is not editable here; `scan` sets it.
///
/// # Errors
///
/// Returns an error if reading or writing fails.
pub fn edit_settings<R: BufRead, W: Write>(
    current: &Settings,
    input: &mut R,
    output: &mut W,
) -> io::Result<Settings> {
    let mut settings = current.clone();

    let question = format!("Lock command (current: {})", settings.lock_command);
    if let Some(command) = ask(input, output, &question)? {
        settings.lock_command = command;
    }

    let question = format!("Unlock command (current: {})", settings.unlock_command);
    if let Some(command) = ask(input, output, &question)? {
        settings.unlock_command = command;
    }

    let question = format!(
        "Time interval between checks in seconds (current: {})",
        settings.poll_interval_secs
    );
    if let Some(answer) = ask(input, output, &question)? {
        settings.poll_interval_secs = parse_secs(&answer, settings.poll_interval_secs, output)?;
    }

    let question = format!(
        "Bluetooth device discovery time (current: {})",
        settings.discover_secs
    );
    if let Some(answer) = ask(input, output, &question)? {
        settings.discover_secs = parse_secs(&answer, settings.discover_secs, output)?;
    }

    Ok(settings)
}

fn parse_secs<W: Write>(answer: &str, current: u64, output: &mut W) -> io::Result<u64> {
    match answer.parse::<u64>() {
        Ok(secs) if (1..=MAX_DURATION_SECS).contains(&secs) => Ok(secs),
        _ => {
            writeln!(
                output,
                "Invalid value '{answer}': expected 1 to {MAX_DURATION_SECS} seconds, keeping {current}"
            )?;
            Ok(current)
        }
    }
}
