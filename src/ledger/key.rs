//! Key Codec
//!
//! Builds ledger keys from entity identifiers. Pure functions, no state.
//!
//! Two key shapes exist:
//! - simple keys: identifier parts joined with `:` (an event lives under its bare id)
//! - composite keys: `\0objectType\0attr1\0attr2\0`, which sort together and can be
//!   range-scanned by any leading subset of attributes

use thiserror::Error;

/// Delimiter of composite key components
pub const COMPOSITE_KEY_DELIMITER: char = '\u{0000}';

/// Highest Unicode code point, used as the exclusive upper bound of prefix scans
pub const MAX_UNICODE_RUNE: char = '\u{10FFFF}';

const SPLIT_KEY_SEPARATOR: &str = ":";

/// Errors raised while building or parsing keys
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("object type must not be empty")]
    EmptyObjectType,

    #[error("key must not be empty")]
    EmptyKey,

    #[error("key component {0:?} contains a reserved character")]
    ReservedCharacter(String),

    #[error("simple key {0:?} must not start with the composite key delimiter")]
    LeadingDelimiter(String),
}

/// Join key parts into a simple key
pub fn make_key(parts: &[&str]) -> Result<String, KeyError> {
    let key = parts.join(SPLIT_KEY_SEPARATOR);
    validate_simple_key(&key)?;
    Ok(key)
}

/// Check that a key can be stored as a simple (non-composite) key
pub fn validate_simple_key(key: &str) -> Result<(), KeyError> {
    if key.is_empty() {
        return Err(KeyError::EmptyKey);
    }
    if key.starts_with(COMPOSITE_KEY_DELIMITER) {
        return Err(KeyError::LeadingDelimiter(key.to_string()));
    }
    Ok(())
}

/// Build a composite key from an object type and its attributes
pub fn create_composite_key(object_type: &str, attributes: &[&str]) -> Result<String, KeyError> {
    if object_type.is_empty() {
        return Err(KeyError::EmptyObjectType);
    }
    validate_component(object_type)?;

    let mut key = String::with_capacity(
        2 + object_type.len() + attributes.iter().map(|a| a.len() + 1).sum::<usize>(),
    );
    key.push(COMPOSITE_KEY_DELIMITER);
    key.push_str(object_type);
    key.push(COMPOSITE_KEY_DELIMITER);

    for attribute in attributes {
        validate_component(attribute)?;
        key.push_str(attribute);
        key.push(COMPOSITE_KEY_DELIMITER);
    }

    Ok(key)
}

/// Exclusive upper bound for a prefix scan starting at `prefix`
pub fn prefix_end(prefix: &str) -> String {
    let mut end = String::with_capacity(prefix.len() + 4);
    end.push_str(prefix);
    end.push(MAX_UNICODE_RUNE);
    end
}

fn validate_component(component: &str) -> Result<(), KeyError> {
    if component.contains(COMPOSITE_KEY_DELIMITER) || component.contains(MAX_UNICODE_RUNE) {
        return Err(KeyError::ReservedCharacter(component.escape_debug().to_string()));
    }
    Ok(())
}
