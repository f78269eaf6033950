//! Definition-time validation passes and shared identifier checks.

pub mod naming;

use crate::error::DefinitionError;

/// Maximum length for entity names and field identifiers.
pub const MAX_NAME_LEN: usize = 64;

/// Ensure a field or index identifier is non-empty, ASCII word characters
/// only, and within the maximum length.
pub(crate) fn validate_ident(kind: &'static str, ident: &str) -> Result<(), DefinitionError> {
    let invalid = |reason: String| DefinitionError::InvalidName {
        kind,
        name: ident.to_string(),
        reason,
    };

    if ident.is_empty() {
        return Err(invalid("name is empty".to_string()));
    }
    if ident.len() > MAX_NAME_LEN {
        return Err(invalid(format!("exceeds max length {MAX_NAME_LEN}")));
    }
    if !ident
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
    {
        return Err(invalid(
            "only ASCII letters, digits, '_' and '-' are allowed".to_string(),
        ));
    }

    Ok(())
}

/// Ensure a derived entity name is non-empty, ASCII, and within the
/// maximum length.
pub(crate) fn validate_entity_name(name: &str) -> Result<(), DefinitionError> {
    let invalid = |reason: String| DefinitionError::InvalidName {
        kind: "entity",
        name: name.to_string(),
        reason,
    };

    if name.is_empty() {
        return Err(invalid("entity name is empty".to_string()));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(invalid(format!("exceeds max length {MAX_NAME_LEN}")));
    }
    if !name.is_ascii() {
        return Err(invalid("entity name must be ASCII".to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_and_punctuated_identifiers() {
        assert!(validate_ident("field", "").is_err());
        assert!(validate_ident("field", "has space").is_err());
        assert!(validate_ident("field", "a#b").is_err());
    }

    #[test]
    fn accepts_word_identifiers() {
        assert!(validate_ident("field", "created_at").is_ok());
        assert!(validate_ident("index", "email-index").is_ok());
    }

    #[test]
    fn entity_names_must_be_ascii_and_short() {
        assert!(validate_entity_name("order").is_ok());
        assert!(validate_entity_name("ordré").is_err());
        assert!(validate_entity_name(&"x".repeat(MAX_NAME_LEN + 1)).is_err());
    }
}
