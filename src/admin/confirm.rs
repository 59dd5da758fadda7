//! Delete-all confirmation flow
//!
//! Wiping the catalog takes two steps: acknowledging the warning, then typing
//! the confirmation phrase exactly.

use crate::services::DELETE_ALL_CONFIRMATION;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfirmationError {
    #[error("The warning has not been acknowledged")]
    NotAcknowledged,

    #[error("Type \"{}\" to confirm", DELETE_ALL_CONFIRMATION)]
    Mismatch,
}

/// Confirmation dialog state for deleting every product
#[derive(Debug, Clone)]
pub struct DeleteAllConfirmation {
    total: i64,
    acknowledged: bool,
}

impl DeleteAllConfirmation {
    /// `total` is the current product count shown in the warning
    pub fn new(total: i64) -> Self {
        Self {
            total,
            acknowledged: false,
        }
    }

    pub fn warning(&self) -> String {
        format!(
            "This will permanently delete all {} products and their images. This cannot be undone.",
            self.total
        )
    }

    pub fn prompt(&self) -> String {
        format!("Type \"{}\" to confirm:", DELETE_ALL_CONFIRMATION)
    }

    pub fn acknowledge(&mut self) {
        self.acknowledged = true;
    }

    pub fn is_acknowledged(&self) -> bool {
        self.acknowledged
    }

    /// Check the typed phrase; the match is exact (case and spacing)
    pub fn verify(&self, typed: &str) -> Result<&'static str, ConfirmationError> {
        if !self.acknowledged {
            return Err(ConfirmationError::NotAcknowledged);
        }
        if typed != DELETE_ALL_CONFIRMATION {
            return Err(ConfirmationError::Mismatch);
        }
        Ok(DELETE_ALL_CONFIRMATION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_acknowledgement() {
        let confirmation = DeleteAllConfirmation::new(3);
        assert_eq!(
            confirmation.verify(DELETE_ALL_CONFIRMATION),
            Err(ConfirmationError::NotAcknowledged)
        );
    }

    #[test]
    fn test_phrase_must_match_exactly() {
        let mut confirmation = DeleteAllConfirmation::new(3);
        confirmation.acknowledge();

        for typed in ["delete all products", "DELETE ALL PRODUCTS ", "DELETE  ALL PRODUCTS", ""] {
            assert_eq!(confirmation.verify(typed), Err(ConfirmationError::Mismatch), "{:?}", typed);
        }
        assert_eq!(confirmation.verify("DELETE ALL PRODUCTS"), Ok(DELETE_ALL_CONFIRMATION));
    }

    #[test]
    fn test_messages() {
        let confirmation = DeleteAllConfirmation::new(42);
        assert!(confirmation.warning().contains("all 42 products"));
        assert!(confirmation.prompt().contains("\"DELETE ALL PRODUCTS\""));
        assert!(!confirmation.is_acknowledged());
    }
}
