//! Rowan language implementation for REFIT
//!
//! This module implements the `rowan::Language` trait, which connects our
//! `SyntaxKind` enum to Rowan's generic CST infrastructure.

use rowan::Language;

use super::SyntaxKind;

/// Zero-sized marker tying [`SyntaxKind`] to rowan's tree types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RefitLanguage;

impl Language for RefitLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        SyntaxKind::from_raw(raw.0).unwrap_or_else(|| {
            tracing::warn!("Unknown syntax kind: {}", raw.0);
            SyntaxKind::Error
        })
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_roundtrip() {
        let kinds = [
            SyntaxKind::Whitespace,
            SyntaxKind::ReturnKw,
            SyntaxKind::Ident,
            SyntaxKind::Semicolon,
            SyntaxKind::Root,
            SyntaxKind::ConditionalExpr,
        ];

        for &kind in &kinds {
            let raw = RefitLanguage::kind_to_raw(kind);
            let back = RefitLanguage::kind_from_raw(raw);
            assert_eq!(kind, back, "Roundtrip failed for {kind:?}");
        }
    }

    #[test]
    fn test_unknown_raw_maps_to_error() {
        assert_eq!(
            RefitLanguage::kind_from_raw(rowan::SyntaxKind(u16::MAX)),
            SyntaxKind::Error
        );
    }
}
