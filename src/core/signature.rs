//! Structural signatures of identifiers.
//!
//! The dataset itself defines what a valid VAT or company number looks like.
//! A signature captures an identifier's shape (letters, digits, punctuation and
//! length) so it can be compared against the shapes seen in other records.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Shape of an identifier such as `LT123456789` → `LT|11|LLDDDDDDDDD`.
///
/// Equality is structural, so a prefix can never collide with a length
/// or shape the way concatenated strings can.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FormatSignature {
    /// Uppercased two-letter country prefix, when the identifier starts with two letters.
    pub prefix: Option<String>,
    /// Length in characters.
    pub length: usize,
    /// `L` for letters, `D` for digits, anything else kept verbatim.
    pub shape: String,
}

impl FormatSignature {
    /// Signature of a VAT number, including its country prefix.
    pub fn vat_number(value: &str) -> Self {
        let mut chars = value.chars();
        let prefix = match (chars.next(), chars.next()) {
            (Some(a), Some(b)) if a.is_alphabetic() && b.is_alphabetic() => {
                Some(format!("{a}{b}").to_uppercase())
            }
            _ => None,
        };
        Self {
            prefix,
            ..Self::company_number(value)
        }
    }

    /// Signature of a company number. The prefix component is never set.
    pub fn company_number(value: &str) -> Self {
        Self {
            prefix: None,
            length: value.chars().count(),
            shape: shape_of(value),
        }
    }
}

impl fmt::Display for FormatSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(prefix) = &self.prefix {
            write!(f, "{prefix}|")?;
        }
        write!(f, "{}|{}", self.length, self.shape)
    }
}

fn shape_of(value: &str) -> String {
    value
        .chars()
        .map(|c| {
            if c.is_ascii_digit() {
                'D'
            } else if c.is_alphabetic() {
                'L'
            } else {
                c
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vat_signature_with_prefix() {
        let sig = FormatSignature::vat_number("LT123456789");
        assert_eq!(sig.prefix.as_deref(), Some("LT"));
        assert_eq!(sig.length, 11);
        assert_eq!(sig.to_string(), "LT|11|LLDDDDDDDDD");
    }

    #[test]
    fn vat_prefix_is_uppercased() {
        assert_eq!(
            FormatSignature::vat_number("lt123456789"),
            FormatSignature::vat_number("LT987654321")
        );
    }

    #[test]
    fn vat_signature_without_prefix() {
        let sig = FormatSignature::vat_number("123456789");
        assert_eq!(sig.prefix, None);
        assert_eq!(sig.to_string(), "9|DDDDDDDDD");
        // one leading letter is not a prefix
        assert_eq!(FormatSignature::vat_number("L12").prefix, None);
    }

    #[test]
    fn different_prefixes_do_not_match() {
        assert_ne!(
            FormatSignature::vat_number("LT123456789"),
            FormatSignature::vat_number("LV123456789")
        );
    }

    #[test]
    fn punctuation_kept_in_shape() {
        let sig = FormatSignature::company_number("HRB 12-34");
        assert_eq!(sig.prefix, None);
        assert_eq!(sig.to_string(), "9|LLL DD-DD");
    }

    #[test]
    fn company_signature_ignores_prefix() {
        assert_eq!(
            FormatSignature::company_number("AB1234"),
            FormatSignature::company_number("CD5678")
        );
    }
}
