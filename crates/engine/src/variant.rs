//! Transaction variants and the rules that derive them.
//!
//! A variant is never stored. The form derives it from the current
//! account/payee/split selection with [`resolve_variant`], the server derives
//! it from persisted columns with [`persisted_variant`].

use std::fmt;

use crate::Account;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TransactionVariant {
    #[default]
    Standard,
    OffBudget,
    Transfer,
    Split,
}

impl TransactionVariant {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::OffBudget => "off_budget",
            Self::Transfer => "transfer",
            Self::Split => "split",
        }
    }

    /// Only standard rows pick a category directly.
    pub fn allows_category(self) -> bool {
        matches!(self, Self::Standard)
    }

    /// Label shown in place of the category when the category can not be picked.
    pub fn category_label(self) -> Option<&'static str> {
        match self {
            Self::Standard => None,
            Self::OffBudget => Some("Off-Budget"),
            Self::Transfer => Some("Transfer"),
            Self::Split => Some("Split"),
        }
    }
}

impl fmt::Display for TransactionVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Variant of a row being edited.
///
/// Precedence: an off-budget account wins, then a transfer target, then a
/// non-empty split list. A missing account counts as on-budget.
pub fn resolve_variant(
    account: Option<&Account>,
    transfer_account: Option<&Account>,
    split_count: usize,
) -> TransactionVariant {
    if account.is_some_and(|account| account.off_budget) {
        TransactionVariant::OffBudget
    } else if transfer_account.is_some() {
        TransactionVariant::Transfer
    } else if split_count > 0 {
        TransactionVariant::Split
    } else {
        TransactionVariant::Standard
    }
}

/// Variant of a stored row.
///
/// A transfer between an on-budget and an off-budget account is not a transfer
/// from the budget's point of view: the on-budget side behaves like a
/// standard row and the off-budget side like an off-budget one.
pub fn persisted_variant(
    account: &Account,
    transfer_account: Option<&Account>,
    is_split: bool,
) -> TransactionVariant {
    if is_split {
        return TransactionVariant::Split;
    }
    if transfer_account.is_some_and(|other| other.off_budget == account.off_budget) {
        return TransactionVariant::Transfer;
    }
    if account.off_budget {
        TransactionVariant::OffBudget
    } else {
        TransactionVariant::Standard
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn account(off_budget: bool) -> Account {
        Account {
            id: Uuid::new_v4(),
            name: "Checking".to_string(),
            off_budget,
        }
    }

    #[test]
    fn off_budget_account_wins() {
        let off = account(true);
        let other = account(false);
        assert_eq!(
            resolve_variant(Some(&off), Some(&other), 2),
            TransactionVariant::OffBudget
        );
    }

    #[test]
    fn transfer_beats_split() {
        let checking = account(false);
        let savings = account(false);
        assert_eq!(
            resolve_variant(Some(&checking), Some(&savings), 3),
            TransactionVariant::Transfer
        );
    }

    #[test]
    fn splits_then_standard() {
        let checking = account(false);
        assert_eq!(
            resolve_variant(Some(&checking), None, 1),
            TransactionVariant::Split
        );
        assert_eq!(
            resolve_variant(Some(&checking), None, 0),
            TransactionVariant::Standard
        );
        assert_eq!(resolve_variant(None, None, 0), TransactionVariant::Standard);
    }

    #[test]
    fn persisted_transfer_needs_matching_budget_side() {
        let checking = account(false);
        let savings = account(false);
        let house = account(true);

        assert_eq!(
            persisted_variant(&checking, Some(&savings), false),
            TransactionVariant::Transfer
        );
        assert_eq!(
            persisted_variant(&checking, Some(&house), false),
            TransactionVariant::Standard
        );
        assert_eq!(
            persisted_variant(&house, Some(&checking), false),
            TransactionVariant::OffBudget
        );
        assert_eq!(
            persisted_variant(&checking, None, true),
            TransactionVariant::Split
        );
    }

    #[test]
    fn labels() {
        assert_eq!(TransactionVariant::Standard.category_label(), None);
        assert_eq!(
            TransactionVariant::OffBudget.category_label(),
            Some("Off-Budget")
        );
        assert_eq!(TransactionVariant::Transfer.category_label(), Some("Transfer"));
        assert_eq!(TransactionVariant::Split.category_label(), Some("Split"));
    }
}
