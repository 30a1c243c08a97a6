//! UUID utilities
//!
//! Every row id in the jukebox schema is a UUIDv4 stored as TEXT.

use uuid::Uuid;

/// Generate a new UUIDv4
pub fn generate() -> Uuid {
    Uuid::new_v4()
}

/// Generate a new UUIDv4 in its canonical hyphenated string form
pub fn generate_string() -> String {
    Uuid::new_v4().to_string()
}

/// Parse UUID from string
pub fn parse(s: &str) -> Result<Uuid, uuid::Error> {
    Uuid::parse_str(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_string_parses_back() {
        let id = generate_string();
        assert_eq!(id.len(), 36);
        assert!(parse(&id).is_ok());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse("not-a-uuid").is_err());
    }
}
