//! Sanitizing user-supplied names and codes.

use cardroom_protocol::RoomCode;

use crate::{RoomConfig, RoomError};

/// Cleans a display name.
///
/// Trims, keeps at most `name_max_chars` characters, then drops anything
/// that is not a letter, digit, space, `_` or `-`. Falls back to the
/// configured default when nothing is left.
pub fn sanitize_name(raw: Option<&str>, config: &RoomConfig) -> String {
    let name: String = raw
        .unwrap_or_default()
        .trim()
        .chars()
        .take(config.name_max_chars)
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '_' | '-'))
        .collect();
    if name.is_empty() { config.default_name.clone() } else { name }
}

/// Cleans a room code typed by a user.
///
/// # Errors
/// [`RoomError::InvalidInput`] when no letter or digit survives.
pub fn sanitize_code(raw: Option<&str>) -> Result<RoomCode, RoomError> {
    let raw = raw.unwrap_or_default();
    RoomCode::parse(raw).ok_or_else(|| RoomError::InvalidInput(format!("invalid room code {raw:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_keeps_allowed_characters() {
        let config = RoomConfig::default();
        assert_eq!(sanitize_name(Some("  Ana_B-1 <script> "), &config), "Ana_B-1 script");
        assert_eq!(sanitize_name(Some("Zoë Łukasz"), &config), "Zoë Łukasz");
    }

    #[test]
    fn test_name_is_capped() {
        let config = RoomConfig::default();
        let long = "x".repeat(40);
        assert_eq!(sanitize_name(Some(&long), &config).chars().count(), 24);
    }

    #[test]
    fn test_name_defaults_when_empty() {
        let config = RoomConfig::default();
        assert_eq!(sanitize_name(None, &config), "Player");
        assert_eq!(sanitize_name(Some("   "), &config), "Player");
        assert_eq!(sanitize_name(Some("!!!"), &config), "Player");
    }

    #[test]
    fn test_code_sanitizes_or_rejects() {
        assert_eq!(sanitize_code(Some(" k3z-q9a ")).unwrap().as_str(), "K3ZQ9A");
        assert!(matches!(sanitize_code(Some("--")), Err(RoomError::InvalidInput(_))));
        assert!(matches!(sanitize_code(None), Err(RoomError::InvalidInput(_))));
    }
}
