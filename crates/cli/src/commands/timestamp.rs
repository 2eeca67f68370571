//! Timestamp parsing command.

use serde_json::Value as JsonValue;

use onboarding_core::timestamp::{
    DISPLAY_DATE_TIME, parse_flexible, to_date_input_string, to_display_string, to_input_string,
};
use onboarding_core::{CanonicalTimestamp, TemporalValue};

/// Every rendering of a parsed value.
#[derive(Debug, PartialEq, Eq)]
pub struct ParsedTimestamp {
    pub canonical: Option<CanonicalTimestamp>,
    pub display: String,
    pub input: String,
    pub date_input: String,
}

/// Interpret a command-line argument: JSON objects are decoded, anything else
/// is treated as text.
fn temporal_from_arg(value: &str) -> TemporalValue {
    if value.trim_start().starts_with('{')
        && let Ok(json) = serde_json::from_str::<JsonValue>(value)
    {
        return TemporalValue::from(json);
    }
    TemporalValue::from(value)
}

fn describe(value: &str, pattern: Option<&str>) -> ParsedTimestamp {
    let canonical = parse_flexible(temporal_from_arg(value));
    ParsedTimestamp {
        canonical,
        display: to_display_string(canonical, pattern.unwrap_or(DISPLAY_DATE_TIME)),
        input: to_input_string(canonical),
        date_input: to_date_input_string(canonical),
    }
}

/// Parse `value` and print its canonical, display and input forms.
pub fn parse(value: &str, pattern: Option<&str>) {
    let parsed = describe(value, pattern);

    #[allow(clippy::print_stdout)]
    {
        match parsed.canonical {
            Some(ts) => {
                println!(
                    "canonical:  {{\"seconds\": {}, \"nanoseconds\": {}}}",
                    ts.seconds(),
                    ts.nanoseconds()
                );
                println!("utc:        {ts}");
            }
            None => println!("canonical:  (unrecognised)"),
        }
        println!("display:    {}", parsed.display);
        println!("input:      {}", parsed.input);
        println!("date input: {}", parsed.date_input);
    }
}
