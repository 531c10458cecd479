//! Validation helpers for DTOs and identity fields.

use validator::ValidationError;

/// Symbols allowed in room codes. Visually ambiguous glyphs (`0/O/1/I`) are
/// excluded so codes survive being read aloud or copied by hand.
pub const ROOM_CODE_ALPHABET: &[u8; 32] = b"23456789ABCDEFGHJKLMNPQRSTUVWXYZ";

/// Length of every room code.
pub const ROOM_CODE_LENGTH: usize = 6;

const USERNAME_MAX_CHARS: usize = 20;

/// Validates that a username is between 1 and 20 characters.
///
/// # Examples
///
/// ```ignore
/// validate_username("alice")  // Ok
/// validate_username("")       // Err - empty
/// ```
pub fn validate_username(name: &str) -> Result<(), ValidationError> {
    let chars = name.chars().count();
    if chars == 0 || chars > USERNAME_MAX_CHARS {
        let mut err = ValidationError::new("username_length");
        err.message = Some(
            format!("username must be 1..={USERNAME_MAX_CHARS} characters (got {chars})").into(),
        );
        return Err(err);
    }

    Ok(())
}

/// Validates that a candidate room code is 6 characters from the code
/// alphabet. Callers are expected to uppercase the input first; lookups are
/// case-insensitive with the uppercase form canonical.
pub fn validate_room_code(code: &str) -> Result<(), ValidationError> {
    if code.len() != ROOM_CODE_LENGTH
        || !code.bytes().all(|b| ROOM_CODE_ALPHABET.contains(&b))
    {
        let mut err = ValidationError::new("room_code_format");
        err.message = Some("room codes are 6 characters from the code alphabet".into());
        return Err(err);
    }

    Ok(())
}

/// Canonical form used for registry keys and comparisons.
pub fn normalize_room_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_bounds() {
        assert!(validate_username("a").is_ok());
        assert!(validate_username("abcdefghijklmnopqrst").is_ok()); // 20 chars
        assert!(validate_username("").is_err());
        assert!(validate_username("abcdefghijklmnopqrstu").is_err()); // 21 chars
    }

    #[test]
    fn username_counts_characters_not_bytes() {
        // 20 Hangul syllables are 60 bytes but still a legal username.
        assert!(validate_username(&"가".repeat(20)).is_ok());
        assert!(validate_username(&"가".repeat(21)).is_err());
    }

    #[test]
    fn room_code_alphabet_excludes_ambiguous_glyphs() {
        for banned in [b'0', b'O', b'1', b'I'] {
            assert!(!ROOM_CODE_ALPHABET.contains(&banned));
        }
        assert_eq!(ROOM_CODE_ALPHABET.len(), 32);
    }

    #[test]
    fn room_code_format() {
        assert!(validate_room_code("AB23CD").is_ok());
        assert!(validate_room_code("ab23cd").is_err()); // not normalized
        assert!(validate_room_code("AB23C").is_err()); // too short
        assert!(validate_room_code("AB23C0").is_err()); // banned glyph
    }

    #[test]
    fn normalization_uppercases_and_trims() {
        assert_eq!(normalize_room_code(" ab23cd "), "AB23CD");
    }
}
