//! Identity key derivation
//!
//! Source and destination user documents do not share field names, so users
//! are compared through a canonical [`IdentityKey`]: the first present
//! non-empty identifier field wins as an `Id` key, otherwise the email
//! field gives an `Email` key. A key's kind participates in equality: an
//! `Id("x")` never matches an `Email("x")` even though the values agree.

use std::fmt;

use mongodb::bson::{Bson, Document};

/// Canonical, comparable identity of a user record.
///
/// Ordering is derived (`Id` < `Email` < `Unknown`) and determines the
/// output order of missing-user reports.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IdentityKey {
    /// Matched by primary identifier.
    Id(String),
    /// Matched by email, used only when no identifier field is present.
    Email(String),
    /// The record carried neither an identifier nor an email. Only
    /// possible for corrupt source data; kept as a distinct sentinel so it
    /// cannot collide with a real identifier or email value.
    Unknown,
}

impl IdentityKey {
    /// The kind tag of this key.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            IdentityKey::Id(_) => "id",
            IdentityKey::Email(_) => "email",
            IdentityKey::Unknown => "unknown",
        }
    }

    /// The value of this key; empty for [`IdentityKey::Unknown`].
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            IdentityKey::Id(v) | IdentityKey::Email(v) => v,
            IdentityKey::Unknown => "",
        }
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityKey::Unknown => write!(f, "unknown"),
            other => write!(f, "{}: {}", other.kind(), other.value()),
        }
    }
}

/// Derive the identity key of a user document.
///
/// Scans `id_fields` in order and takes the first present non-empty scalar
/// as an `Id` key; falls back to `email_field`, and finally to
/// [`IdentityKey::Unknown`]. Never fails.
///
/// The field lists differ per schema and the asymmetry is deliberate:
/// source records try `user` then `username` before `useremail`,
/// destination records try only `user_id` before `user_email`.
#[must_use]
pub fn derive_key(record: &Document, id_fields: &[&str], email_field: &str) -> IdentityKey {
    for field in id_fields {
        if let Some(value) = scalar_str(record, field) {
            return IdentityKey::Id(value);
        }
    }
    match scalar_str(record, email_field) {
        Some(value) => IdentityKey::Email(value),
        None => IdentityKey::Unknown,
    }
}

/// Read a field as a non-empty string, stringifying numeric scalars.
/// Empty strings and non-scalar values count as absent.
fn scalar_str(doc: &Document, field: &str) -> Option<String> {
    match doc.get(field)? {
        Bson::String(s) if !s.is_empty() => Some(s.clone()),
        Bson::Int32(n) => Some(n.to_string()),
        Bson::Int64(n) => Some(n.to_string()),
        Bson::Double(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    const SOURCE_IDS: &[&str] = &["user", "username"];

    #[test]
    fn test_id_takes_precedence_over_email() {
        let rec = doc! { "user": "u1", "useremail": "u1@example.com" };
        assert_eq!(
            derive_key(&rec, SOURCE_IDS, "useremail"),
            IdentityKey::Id("u1".to_string())
        );
    }

    #[test]
    fn test_id_field_order_respected() {
        let rec = doc! { "username": "alt", "user": "primary" };
        assert_eq!(
            derive_key(&rec, SOURCE_IDS, "useremail"),
            IdentityKey::Id("primary".to_string())
        );

        let rec = doc! { "username": "alt" };
        assert_eq!(
            derive_key(&rec, SOURCE_IDS, "useremail"),
            IdentityKey::Id("alt".to_string())
        );
    }

    #[test]
    fn test_empty_id_falls_through_to_email() {
        let rec = doc! { "user": "", "useremail": "u1@example.com" };
        assert_eq!(
            derive_key(&rec, SOURCE_IDS, "useremail"),
            IdentityKey::Email("u1@example.com".to_string())
        );
    }

    #[test]
    fn test_numeric_id_is_stringified() {
        let rec = doc! { "user": 42_i32 };
        assert_eq!(
            derive_key(&rec, SOURCE_IDS, "useremail"),
            IdentityKey::Id("42".to_string())
        );
    }

    #[test]
    fn test_missing_everything_is_unknown() {
        let rec = doc! { "tenant": "t1" };
        assert_eq!(
            derive_key(&rec, SOURCE_IDS, "useremail"),
            IdentityKey::Unknown
        );

        // Empty email is treated as absent too.
        let rec = doc! { "useremail": "" };
        assert_eq!(
            derive_key(&rec, SOURCE_IDS, "useremail"),
            IdentityKey::Unknown
        );
    }

    #[test]
    fn test_kind_never_crosses() {
        // Same textual value, different kinds: never equal.
        assert_ne!(
            IdentityKey::Id("x".to_string()),
            IdentityKey::Email("x".to_string())
        );
        assert_ne!(IdentityKey::Id(String::new()), IdentityKey::Unknown);
    }

    #[test]
    fn test_ordering_for_deterministic_reports() {
        let mut keys = vec![
            IdentityKey::Unknown,
            IdentityKey::Email("a".to_string()),
            IdentityKey::Id("b".to_string()),
            IdentityKey::Id("a".to_string()),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                IdentityKey::Id("a".to_string()),
                IdentityKey::Id("b".to_string()),
                IdentityKey::Email("a".to_string()),
                IdentityKey::Unknown,
            ]
        );
    }

    #[test]
    fn test_kind_and_value_accessors() {
        assert_eq!(IdentityKey::Id("u".to_string()).kind(), "id");
        assert_eq!(IdentityKey::Email("e".to_string()).kind(), "email");
        assert_eq!(IdentityKey::Unknown.kind(), "unknown");
        assert_eq!(IdentityKey::Unknown.value(), "");
        assert_eq!(IdentityKey::Email("e".to_string()).value(), "e");
    }
}
