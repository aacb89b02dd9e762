//! Record construction and identifier generation

use serde::Serialize;
use uuid::Uuid;

/// Zero-padded width of the line number inside a record id
pub const RECORD_ID_WIDTH: usize = 12;

/// Length of a generated source name
pub const RANDOM_NAME_LEN: usize = 10;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Structured form of one line, as seen by the transformation hook
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub text: String,
    pub filename: String,
    pub line_number: u64,
    pub record_id: String,
}

impl Record {
    pub fn build(source_name: &str, line_number: u64, text: String) -> Self {
        Self {
            record_id: record_id(source_name, line_number),
            text,
            filename: source_name.to_string(),
            line_number,
        }
    }
}

/// Stable id for a line: `{source}-{line_number:012}`
///
/// Numbers wider than [`RECORD_ID_WIDTH`] digits are written in full, so ids
/// past 999_999_999_999 are longer and only sort correctly against ids of the
/// same length.
pub fn record_id(source_name: &str, line_number: u64) -> String {
    format!(
        "{}-{:0width$}",
        source_name,
        line_number,
        width = RECORD_ID_WIDTH
    )
}

/// Random name for a nameless source such as stdin
///
/// [`RANDOM_NAME_LEN`] characters of lowercase base 36.
pub fn random_source_name() -> String {
    let mut bits = Uuid::new_v4().as_u128();
    let mut name = String::with_capacity(RANDOM_NAME_LEN);
    for _ in 0..RANDOM_NAME_LEN {
        name.push(BASE36[(bits % 36) as usize] as char);
        bits /= 36;
    }
    name
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_is_zero_padded() {
        assert_eq!(record_id("f", 1), "f-000000000001");
        assert_eq!(record_id("data.txt", 42), "data.txt-000000000042");
    }

    #[test]
    fn test_record_id_grows_past_pad_width() {
        assert_eq!(record_id("f", 999_999_999_999), "f-999999999999");
        assert_eq!(record_id("f", 1_000_000_000_000), "f-1000000000000");
    }

    #[test]
    fn test_build_fills_every_field() {
        let record = Record::build("f", 3, "c".to_string());
        assert_eq!(record.text, "c");
        assert_eq!(record.filename, "f");
        assert_eq!(record.line_number, 3);
        assert_eq!(record.record_id, "f-000000000003");
    }

    #[test]
    fn test_record_serializes_with_hook_field_names() {
        let record = Record::build("f", 1, "a".to_string());
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "text": "a",
                "filename": "f",
                "lineNumber": 1,
                "recordId": "f-000000000001"
            })
        );
    }

    #[test]
    fn test_random_source_name_shape() {
        let name = random_source_name();
        assert_eq!(name.len(), RANDOM_NAME_LEN);
        assert!(name
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_random_source_names_differ() {
        assert_ne!(random_source_name(), random_source_name());
    }
}
