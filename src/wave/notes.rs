use std::collections::BTreeMap;

use super::model::NoteValue;

/// Parse the notes blob into a `key → value` map.
///
/// The blob is `key:value` lines separated by carriage returns.  Undecodable
/// bytes are replaced rather than rejected, a line without a colon becomes a
/// key with an empty value, later lines overwrite earlier ones and the empty
/// key is dropped.
pub fn parse_notes(raw: &[u8]) -> BTreeMap<String, NoteValue> {
    let text = String::from_utf8_lossy(raw);
    let mut notes = BTreeMap::new();

    for line in text.split('\r').map(str::trim) {
        let (key, value) = match line.split_once(':') {
            Some((key, value)) => (key, coerce_value(value)),
            None => (line, NoteValue::Text(String::new())),
        };
        notes.insert(key.to_string(), value);
    }

    notes.remove("");
    notes
}

/// Turn a note value string into an integer, float or text.
///
/// Purely alphabetic tokens (after an optional sign) stay text, so `NaN`,
/// `inf` and `-Infinity` never become floats: spreadsheet and analysis tools
/// downstream choke on them.
pub fn coerce_value(s: &str) -> NoteValue {
    let s = s.trim();
    let unsigned = s.strip_prefix(&['+', '-'][..]).unwrap_or(s);

    if !unsigned.is_empty() && unsigned.chars().all(char::is_alphabetic) {
        return NoteValue::Text(s.to_string());
    }
    if let Ok(i) = s.parse::<i64>() {
        return NoteValue::Int(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return NoteValue::Float(f);
    }
    NoteValue::Text(s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> NoteValue {
        NoteValue::Text(s.to_string())
    }

    #[test]
    fn coerces_integers_and_floats() {
        assert_eq!(coerce_value("123"), NoteValue::Int(123));
        assert_eq!(coerce_value("-42"), NoteValue::Int(-42));
        assert_eq!(coerce_value("1.5"), NoteValue::Float(1.5));
        assert_eq!(coerce_value(" 2e3 "), NoteValue::Float(2000.0));
    }

    #[test]
    fn keeps_non_finite_tokens_as_text() {
        assert_eq!(coerce_value("NaN"), text("NaN"));
        assert_eq!(coerce_value("-inf"), text("-inf"));
        assert_eq!(coerce_value("+Infinity"), text("+Infinity"));
        assert_eq!(coerce_value("abc"), text("abc"));
    }

    #[test]
    fn empty_and_odd_values_stay_text() {
        assert_eq!(coerce_value(""), text(""));
        assert_eq!(coerce_value("-"), text("-"));
        assert_eq!(coerce_value("12 V"), text("12 V"));
        assert_eq!(coerce_value("  volts "), text("volts"));
    }

    #[test]
    fn parses_key_value_lines() {
        let notes = parse_notes(b"A:1\rB:2.5\rC:hello\r");
        assert_eq!(notes.len(), 3);
        assert_eq!(notes["A"], NoteValue::Int(1));
        assert_eq!(notes["B"], NoteValue::Float(2.5));
        assert_eq!(notes["C"], text("hello"));
    }

    #[test]
    fn empty_blob_gives_empty_map() {
        assert!(parse_notes(b"").is_empty());
        assert!(parse_notes(b"\r\r  \r").is_empty());
    }

    #[test]
    fn last_duplicate_key_wins() {
        let notes = parse_notes(b"K:1\rK:2\rK:three");
        assert_eq!(notes.len(), 1);
        assert_eq!(notes["K"], text("three"));
    }

    #[test]
    fn line_without_colon_becomes_key() {
        let notes = parse_notes(b"Header line\rX:1");
        assert_eq!(notes["Header line"], text(""));
        assert_eq!(notes["X"], NoteValue::Int(1));
    }

    #[test]
    fn splits_on_first_colon_only() {
        let notes = parse_notes(b"Time: 12:30:05\r");
        assert_eq!(notes["Time"], text("12:30:05"));
    }

    #[test]
    fn empty_key_is_removed() {
        let notes = parse_notes(b":orphan\rA:1");
        assert!(!notes.contains_key(""));
        assert_eq!(notes.len(), 1);
    }

    #[test]
    fn invalid_utf8_is_replaced_not_rejected() {
        let notes = parse_notes(b"Bad:\xff\xfe\rGood:7\r");
        assert_eq!(notes["Good"], NoteValue::Int(7));
        assert_eq!(notes["Bad"], text("\u{fffd}\u{fffd}"));
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let notes = parse_notes(b"  Scan Rate: 1.0  \r\n Points:512\r\n");
        assert_eq!(notes["Scan Rate"], NoteValue::Float(1.0));
        assert_eq!(notes["Points"], NoteValue::Int(512));
    }
}
