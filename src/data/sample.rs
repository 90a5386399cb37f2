//! Telemetry samples and the device line parser.
//!
//! The device emits one status line per communication period:
//!
//! ```text
//! Estado: 0, Temp: 23.5°C, Fan: 40%, Time: 120345
//! ```
//!
//! Lines that do not follow this template are rejected without error.
//! Garbled and partial lines are routine on a serial link.

use std::borrow::Cow;

use chrono::{DateTime, Local};
use serde::Serialize;

const STATE_PREFIX: &str = "Estado: ";
const TEMP_PREFIX: &str = ", Temp: ";
const FAN_PREFIX: &str = "°C, Fan: ";
const TIME_PREFIX: &str = "%, Time: ";

/// System state reported by the device firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SystemState {
    Idle,
    Warning,
    Critical,
    Error,
}

impl SystemState {
    /// Map a raw state code to a known state.
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(SystemState::Idle),
            1 => Some(SystemState::Warning),
            2 => Some(SystemState::Critical),
            3 => Some(SystemState::Error),
            _ => None,
        }
    }

    /// Returns the display label.
    pub fn label(&self) -> &'static str {
        match self {
            SystemState::Idle => "IDLE",
            SystemState::Warning => "WARNING",
            SystemState::Critical => "CRITICAL",
            SystemState::Error => "ERROR",
        }
    }
}

/// Display label for a raw state code, `State N` for unknown codes.
pub fn state_label(code: u32) -> Cow<'static, str> {
    match SystemState::from_code(code) {
        Some(state) => Cow::Borrowed(state.label()),
        None => Cow::Owned(format!("State {}", code)),
    }
}

/// One accepted telemetry reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    /// Device milliseconds since boot.
    pub timestamp: u64,
    /// Raw state code, kept verbatim even when unknown.
    pub state: u32,
    /// Degrees Celsius.
    pub temperature: f64,
    /// Fan duty in percent.
    pub fan_speed: u32,
    /// Host wall clock at the moment the line was accepted.
    pub host_received_at: DateTime<Local>,
}

impl Sample {
    /// Known state for this sample, if the code is in range.
    pub fn system_state(&self) -> Option<SystemState> {
        SystemState::from_code(self.state)
    }

    /// Render this sample in the device wire format.
    pub fn to_wire_line(&self) -> String {
        format!(
            "{}{}{}{}{}{}{}{}",
            STATE_PREFIX,
            self.state,
            TEMP_PREFIX,
            self.temperature,
            FAN_PREFIX,
            self.fan_speed,
            TIME_PREFIX,
            self.timestamp
        )
    }
}

/// Parse one device line into a [`Sample`].
///
/// Returns `None` for anything that is not a status line. The template is
/// matched from the start of the trimmed line; trailing text after the
/// timestamp digits is ignored.
pub fn parse(line: &str) -> Option<Sample> {
    let rest = line.trim().strip_prefix(STATE_PREFIX)?;
    let (state, rest) = split_leading(rest, |c| c.is_ascii_digit())?;
    let rest = rest.strip_prefix(TEMP_PREFIX)?;
    let (temperature, rest) = split_leading(rest, |c| c.is_ascii_digit() || c == '.')?;
    let rest = rest.strip_prefix(FAN_PREFIX)?;
    let (fan_speed, rest) = split_leading(rest, |c| c.is_ascii_digit())?;
    let rest = rest.strip_prefix(TIME_PREFIX)?;
    let (timestamp, _) = split_leading(rest, |c| c.is_ascii_digit())?;

    Some(Sample {
        timestamp: timestamp.parse().ok()?,
        state: state.parse().ok()?,
        temperature: temperature.parse().ok()?,
        fan_speed: fan_speed.parse().ok()?,
        host_received_at: Local::now(),
    })
}

/// Split off the longest non-empty prefix whose chars satisfy `accept`.
fn split_leading(s: &str, accept: impl Fn(char) -> bool) -> Option<(&str, &str)> {
    let end = s.find(|c: char| !accept(c)).unwrap_or(s.len());
    if end == 0 {
        return None;
    }
    Some(s.split_at(end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_line() {
        let sample = parse("Estado: 1, Temp: 25.7°C, Fan: 60%, Time: 123456").unwrap();
        assert_eq!(sample.state, 1);
        assert_eq!(sample.temperature, 25.7);
        assert_eq!(sample.fan_speed, 60);
        assert_eq!(sample.timestamp, 123456);
        assert_eq!(sample.system_state(), Some(SystemState::Warning));
    }

    #[test]
    fn test_parse_trims_line_endings() {
        let sample = parse("  Estado: 0, Temp: 20.0°C, Fan: 10%, Time: 1000\r\n").unwrap();
        assert_eq!(sample.timestamp, 1000);
        assert_eq!(sample.temperature, 20.0);
    }

    #[test]
    fn test_parse_integer_temperature() {
        let sample = parse("Estado: 2, Temp: 29°C, Fan: 100%, Time: 5").unwrap();
        assert_eq!(sample.temperature, 29.0);
    }

    #[test]
    fn test_parse_keeps_unknown_state() {
        let sample = parse("Estado: 7, Temp: 21.0°C, Fan: 0%, Time: 42").unwrap();
        assert_eq!(sample.state, 7);
        assert_eq!(sample.system_state(), None);
        assert_eq!(state_label(sample.state), "State 7");
    }

    #[test]
    fn test_parse_ignores_trailing_text() {
        let sample = parse("Estado: 0, Temp: 20.0°C, Fan: 10%, Time: 1000 extra").unwrap();
        assert_eq!(sample.timestamp, 1000);
    }

    #[test]
    fn test_parse_rejects_malformed_lines() {
        let rejected = [
            "",
            "   ",
            "Sistema de Monitoreo iniciado",
            "Estado: 0, Temp: 20.0°C, Fan: 10%",
            "Estado: 0, Temp: 20.0°C, Time: 1000",
            "Estado: x, Temp: 20.0°C, Fan: 10%, Time: 1000",
            "Estado: 0, Temp: abc°C, Fan: 10%, Time: 1000",
            "Estado: 0, Temp: 20.0C, Fan: 10%, Time: 1000",
            "Estado: 0, Temp: 20.0°C, Fan: 10, Time: 1000",
            "Estado: 0, Temp: 1.2.3°C, Fan: 10%, Time: 1000",
            "Estado: 0, Temp: -5.0°C, Fan: 10%, Time: 1000",
            "Estado: 0, Temp: 20.0°C, Fan: 10%, Time: ",
            "xEstado: 0, Temp: 20.0°C, Fan: 10%, Time: 1000",
            "do: 0, Temp: 20.0°C, Fan: 10%, Time: 1000",
        ];
        for line in rejected {
            assert!(parse(line).is_none(), "expected rejection for {:?}", line);
        }
    }

    #[test]
    fn test_parse_rejects_overflowing_fields() {
        assert!(parse("Estado: 99999999999, Temp: 20.0°C, Fan: 10%, Time: 1").is_none());
        assert!(parse("Estado: 0, Temp: 20.0°C, Fan: 10%, Time: 999999999999999999999").is_none());
    }

    #[test]
    fn test_wire_line_reparses_to_same_fields() {
        let original = parse("Estado: 3, Temp: 31.25°C, Fan: 85%, Time: 98765").unwrap();
        let reparsed = parse(&original.to_wire_line()).unwrap();

        assert_eq!(reparsed.state, original.state);
        assert_eq!(reparsed.temperature, original.temperature);
        assert_eq!(reparsed.fan_speed, original.fan_speed);
        assert_eq!(reparsed.timestamp, original.timestamp);
    }

    #[test]
    fn test_state_labels() {
        assert_eq!(state_label(0), "IDLE");
        assert_eq!(state_label(1), "WARNING");
        assert_eq!(state_label(2), "CRITICAL");
        assert_eq!(state_label(3), "ERROR");
        assert_eq!(state_label(4), "State 4");
    }
}
