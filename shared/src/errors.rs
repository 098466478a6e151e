//! Classification and localisation of backend errors
//!
//! The API answers with a machine code, but errors raised inside Postgres
//! (the no-mixing trigger, constraint checks) only carry a message. Both are
//! matched against known markers here so every consumer picks the same
//! user-facing text.

use serde::{Deserialize, Serialize};

use crate::ledger::{INSUFFICIENT_STOCK_MARKER, MIXING_MARKER};
use crate::types::Language;

/// Message fragments that identify a mixing rejection
const MIXING_FRAGMENTS: &[&str] = &[MIXING_MARKER, "შერევა", "სხვა ლოტი"];

/// Message fragments that identify a negative-stock rejection
const INSUFFICIENT_STOCK_FRAGMENTS: &[&str] = &[
    INSUFFICIENT_STOCK_MARKER,
    "არასაკმარისი",
    "insufficient stock",
];

/// What went wrong, from the user's point of view
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BackendErrorKind {
    /// Session missing or expired; the user must sign in again
    SessionExpired,
    Forbidden,
    Validation,
    NotFound,
    Duplicate,
    /// Destination bin already holds another lot
    Mixing,
    /// Not enough stock in the source bin
    InsufficientStock,
    /// The record is still referenced (lots, works, sales...)
    DeleteBlocked,
    Network,
    Generic,
}

impl BackendErrorKind {
    /// Classify from an API error code and/or a raw message
    pub fn classify(code: Option<&str>, message: &str) -> Self {
        if let Some(kind) = code.and_then(Self::from_code) {
            if kind != BackendErrorKind::Generic {
                return kind;
            }
        }
        Self::from_message(message)
    }

    pub fn from_code(code: &str) -> Option<Self> {
        let kind = match code {
            "UNAUTHORIZED" | "INVALID_TOKEN" | "TOKEN_EXPIRED" => BackendErrorKind::SessionExpired,
            "INSUFFICIENT_PERMISSIONS" | "FORBIDDEN" => BackendErrorKind::Forbidden,
            "VALIDATION_ERROR" => BackendErrorKind::Validation,
            "NOT_FOUND" => BackendErrorKind::NotFound,
            "DUPLICATE_ENTRY" => BackendErrorKind::Duplicate,
            c if c == MIXING_MARKER => BackendErrorKind::Mixing,
            c if c == INSUFFICIENT_STOCK_MARKER => BackendErrorKind::InsufficientStock,
            "DELETE_BLOCKED" => BackendErrorKind::DeleteBlocked,
            "DATABASE_ERROR" | "INTERNAL_ERROR" | "CONFLICT" => BackendErrorKind::Generic,
            _ => return None,
        };
        Some(kind)
    }

    /// Match known fragments in a raw error message
    pub fn from_message(message: &str) -> Self {
        let lower = message.to_lowercase();
        if MIXING_FRAGMENTS
            .iter()
            .any(|f| lower.contains(&f.to_lowercase()))
        {
            BackendErrorKind::Mixing
        } else if INSUFFICIENT_STOCK_FRAGMENTS
            .iter()
            .any(|f| lower.contains(&f.to_lowercase()))
        {
            BackendErrorKind::InsufficientStock
        } else {
            BackendErrorKind::Generic
        }
    }

    /// Text shown to the user
    pub fn message(&self, language: Language) -> &'static str {
        match (self, language) {
            (BackendErrorKind::SessionExpired, Language::Georgian) => "სესია ამოიწურა, გთხოვთ, თავიდან შეხვიდეთ",
            (BackendErrorKind::SessionExpired, Language::English) => "Your session has expired, please sign in again",
            (BackendErrorKind::Forbidden, Language::Georgian) => "ამ მოქმედების შესრულების უფლება არ გაქვთ",
            (BackendErrorKind::Forbidden, Language::English) => "You do not have permission to perform this action",
            (BackendErrorKind::Validation, Language::Georgian) => "შეამოწმეთ შეყვანილი მონაცემები",
            (BackendErrorKind::Validation, Language::English) => "Please check the entered data",
            (BackendErrorKind::NotFound, Language::Georgian) => "ჩანაწერი ვერ მოიძებნა",
            (BackendErrorKind::NotFound, Language::English) => "Record not found",
            (BackendErrorKind::Duplicate, Language::Georgian) => "ასეთი ჩანაწერი უკვე არსებობს",
            (BackendErrorKind::Duplicate, Language::English) => "Such a record already exists",
            (BackendErrorKind::Mixing, Language::Georgian) => {
                "ამ ბინში უკვე ინახება სხვა ლოტი. ლოტების შერევა დაუშვებელია, აირჩიეთ სხვა ბინი"
            }
            (BackendErrorKind::Mixing, Language::English) => {
                "This bin already holds another lot. Lots cannot be mixed, choose another bin"
            }
            (BackendErrorKind::InsufficientStock, Language::Georgian) => "ბინში არასაკმარისი მარაგია",
            (BackendErrorKind::InsufficientStock, Language::English) => "Not enough stock in the bin",
            (BackendErrorKind::DeleteBlocked, Language::Georgian) => {
                "წაშლა შეუძლებელია: ჩანაწერს სხვა მონაცემები უკავშირდება"
            }
            (BackendErrorKind::DeleteBlocked, Language::English) => {
                "Cannot delete: other records still reference this one"
            }
            (BackendErrorKind::Network, Language::Georgian) => "სერვერთან კავშირი ვერ დამყარდა",
            (BackendErrorKind::Network, Language::English) => "Could not reach the server",
            (BackendErrorKind::Generic, Language::Georgian) => "შენახვა ვერ მოხერხდა",
            (BackendErrorKind::Generic, Language::English) => "Saving failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_wins_over_message() {
        let kind = BackendErrorKind::classify(Some("NOT_FOUND"), "BIN_MIXING somewhere");
        assert_eq!(kind, BackendErrorKind::NotFound);
    }

    #[test]
    fn generic_code_falls_back_to_message() {
        let kind = BackendErrorKind::classify(
            Some("DATABASE_ERROR"),
            "ERROR: BIN_MIXING: ბინში სხვა ლოტის შერევა დაუშვებელია",
        );
        assert_eq!(kind, BackendErrorKind::Mixing);
    }

    #[test]
    fn georgian_fragments_are_recognised() {
        assert_eq!(
            BackendErrorKind::from_message("ლოტების შერევა აკრძალულია"),
            BackendErrorKind::Mixing
        );
        assert_eq!(
            BackendErrorKind::from_message("არასაკმარისი მარაგი"),
            BackendErrorKind::InsufficientStock
        );
        assert_eq!(
            BackendErrorKind::from_message("Insufficient Stock for lot"),
            BackendErrorKind::InsufficientStock
        );
        assert_eq!(BackendErrorKind::from_message("timeout"), BackendErrorKind::Generic);
    }

    #[test]
    fn every_kind_has_both_languages() {
        let kinds = [
            BackendErrorKind::SessionExpired,
            BackendErrorKind::Forbidden,
            BackendErrorKind::Validation,
            BackendErrorKind::NotFound,
            BackendErrorKind::Duplicate,
            BackendErrorKind::Mixing,
            BackendErrorKind::InsufficientStock,
            BackendErrorKind::DeleteBlocked,
            BackendErrorKind::Network,
            BackendErrorKind::Generic,
        ];
        for kind in kinds {
            assert!(!kind.message(Language::Georgian).is_empty());
            assert_ne!(kind.message(Language::Georgian), kind.message(Language::English));
        }
    }
}
