//! Transaction form state.
//!
//! The form never renders anything. It keeps the selections a user makes,
//! re-derives the [`TransactionVariant`] after every change that can affect
//! it, and describes the controls (category, account and payee options) a
//! renderer should show.

use api_types::{
    account::Account,
    category::AssociatedCategory,
    payee::Payee,
    transaction::{
        Split, SplitNew, Transaction, TransactionNew, TransactionUpdate,
        TransactionVariant as ApiVariant,
    },
};
use chrono::NaiveDate;
use engine::{Amount, TransactionVariant, resolve_variant};
use thiserror::Error;
use uuid::Uuid;

/// Largest magnitude the amount input accepts, in whole units.
pub const MAX_INPUT: i64 = 9_999_999_999;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("{0} is required.")]
    Required(&'static str),
    #[error("Split {}: {field} is required.", .index + 1)]
    SplitRequired { index: usize, field: &'static str },
    #[error("Cannot transfer to the same account.")]
    SelfTransfer,
    #[error("Category can not be set: {0}.")]
    CategoryDisabled(&'static str),
    #[error("Only standard transactions can be split.")]
    SplitNotAllowed,
    #[error("{0}")]
    Amount(String),
}

fn amount_to_wire(amount: Amount) -> Result<api_types::Amount, FormError> {
    let cents = amount
        .to_minor()
        .map_err(|err| FormError::Amount(err.to_string()))?;
    Ok(api_types::Amount::new(cents, -2))
}

fn amount_from_wire(amount: api_types::Amount) -> Result<Amount, FormError> {
    Amount::from_parts(amount.coefficient, amount.exponent)
        .map_err(|err| FormError::Amount(err.to_string()))
}

pub fn variant_from_wire(variant: ApiVariant) -> TransactionVariant {
    match variant {
        ApiVariant::Standard => TransactionVariant::Standard,
        ApiVariant::OffBudget => TransactionVariant::OffBudget,
        ApiVariant::Transfer => TransactionVariant::Transfer,
        ApiVariant::Split => TransactionVariant::Split,
    }
}

fn engine_account(account: &Account) -> engine::Account {
    engine::Account {
        id: account.id,
        name: account.name.clone(),
        off_budget: account.off_budget,
    }
}

/// Money text field that holds on to its last valid value.
///
/// Accepts an optional sign, digits with optional `,` separators and at most
/// two decimals, within `±MAX_INPUT`. Anything else is refused and the
/// previous value stays. Blank text clears the value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AmountInput {
    text: String,
    value: Option<Amount>,
}

impl AmountInput {
    pub fn with_value(amount: Amount) -> Self {
        Self {
            text: amount.raw_display(),
            value: Some(amount),
        }
    }

    fn parse(text: &str) -> Option<Amount> {
        let cleaned: String = text.chars().filter(|c| *c != ',').collect();
        let amount = cleaned.parse::<Amount>().ok()?;
        let max = Amount::from_minor(MAX_INPUT * 100);
        (amount.has_max_precision(2) && amount.abs() <= max).then_some(amount)
    }

    /// Returns `false` when the text was refused.
    pub fn input(&mut self, text: &str) -> bool {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            self.text.clear();
            self.value = None;
            return true;
        }

        match Self::parse(trimmed) {
            Some(amount) => {
                self.text = trimmed.to_string();
                self.value = Some(amount);
                true
            }
            None => false,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn value(&self) -> Option<Amount> {
        self.value
    }

    /// Value as shown once the field loses focus, e.g. `-10,035.00`.
    pub fn formatted(&self) -> String {
        self.value
            .map(|amount| amount.display().replacen('$', "", 1))
            .unwrap_or_default()
    }

    /// Hint under the field. `None` for blank and zero.
    pub fn helper(&self) -> Option<String> {
        let amount = self.value?;
        if amount.is_positive() {
            Some(format!("You've received {}", amount.display()))
        } else if amount.is_negative() {
            Some(format!("You've spent {}", amount.abs().display()))
        } else {
            None
        }
    }
}

/// What the payee field points at: a payee, or another account to transfer to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PayeeChoice {
    Payee(Payee),
    Account(Account),
}

impl PayeeChoice {
    pub fn label(&self) -> &str {
        match self {
            Self::Payee(payee) => &payee.name,
            Self::Account(account) => &account.name,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryControl {
    pub enabled: bool,
    pub label: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectOption<T> {
    pub value: T,
    pub label: String,
    pub disabled: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SplitRow {
    pub category: Option<AssociatedCategory>,
    pub amount: AmountInput,
    pub notes: String,
}

/// Update request for an existing row.
#[derive(Clone, Debug)]
pub struct TransactionEdit {
    pub id: Uuid,
    pub update: TransactionUpdate,
}

/// Add/edit transaction form.
///
/// `date`, `amount` and `notes` do not influence the variant and are edited
/// directly. Everything else goes through the `select_*` and split methods.
#[derive(Clone, Debug, Default)]
pub struct TransactionForm {
    account: Option<Account>,
    payee: Option<PayeeChoice>,
    category: Option<AssociatedCategory>,
    splits: Vec<SplitRow>,
    variant: TransactionVariant,
    pub date: Option<NaiveDate>,
    pub amount: AmountInput,
    pub notes: String,
}

impl TransactionForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a stored row for editing. The variant is the stored one until
    /// the first change.
    pub fn from_transaction(transaction: &Transaction, splits: &[Split]) -> Result<Self, FormError> {
        let payee = match (&transaction.transfer_account, &transaction.payee) {
            (Some(account), _) => Some(PayeeChoice::Account(account.clone())),
            (None, Some(payee)) => Some(PayeeChoice::Payee(payee.clone())),
            (None, None) => None,
        };

        let splits = splits
            .iter()
            .map(|split| {
                Ok(SplitRow {
                    category: Some(split.category.clone()),
                    amount: AmountInput::with_value(amount_from_wire(split.amount)?),
                    notes: split.notes.clone().unwrap_or_default(),
                })
            })
            .collect::<Result<Vec<_>, FormError>>()?;

        Ok(Self {
            account: Some(transaction.account.clone()),
            payee,
            category: transaction.category.clone(),
            splits,
            variant: variant_from_wire(transaction.variant),
            date: Some(transaction.date),
            amount: AmountInput::with_value(amount_from_wire(transaction.amount)?),
            notes: transaction.notes.clone().unwrap_or_default(),
        })
    }

    pub fn variant(&self) -> TransactionVariant {
        self.variant
    }

    pub fn account(&self) -> Option<&Account> {
        self.account.as_ref()
    }

    pub fn payee(&self) -> Option<&PayeeChoice> {
        self.payee.as_ref()
    }

    pub fn category(&self) -> Option<&AssociatedCategory> {
        self.category.as_ref()
    }

    pub fn splits(&self) -> &[SplitRow] {
        &self.splits
    }

    /// Split rows are edited in place; their fields never change the variant.
    pub fn split_mut(&mut self, index: usize) -> Option<&mut SplitRow> {
        self.splits.get_mut(index)
    }

    /// Account chosen in the payee field, if any.
    pub fn transfer_account(&self) -> Option<&Account> {
        match &self.payee {
            Some(PayeeChoice::Account(account)) => Some(account),
            _ => None,
        }
    }

    pub fn select_account(&mut self, account: Option<Account>) -> Result<(), FormError> {
        if let (Some(account), Some(target)) = (&account, self.transfer_account())
            && account.id == target.id
        {
            return Err(FormError::SelfTransfer);
        }

        self.account = account;
        self.refresh();
        Ok(())
    }

    pub fn select_payee(&mut self, payee: Option<PayeeChoice>) -> Result<(), FormError> {
        if let (Some(PayeeChoice::Account(target)), Some(account)) = (&payee, &self.account)
            && account.id == target.id
        {
            return Err(FormError::SelfTransfer);
        }

        self.payee = payee;
        self.refresh();
        Ok(())
    }

    pub fn select_category(
        &mut self,
        category: Option<AssociatedCategory>,
    ) -> Result<(), FormError> {
        if category.is_some()
            && let Some(label) = self.variant.category_label()
        {
            return Err(FormError::CategoryDisabled(label));
        }

        self.category = category;
        Ok(())
    }

    /// Splits need an on-budget account and no transfer target.
    pub fn add_split(&mut self) -> Result<(), FormError> {
        let off_budget = self.account.as_ref().is_some_and(|account| account.off_budget);
        if off_budget || self.transfer_account().is_some() {
            return Err(FormError::SplitNotAllowed);
        }

        self.splits.push(SplitRow::default());
        self.refresh();
        Ok(())
    }

    pub fn remove_split(&mut self, index: usize) -> Option<SplitRow> {
        if index >= self.splits.len() {
            return None;
        }

        let removed = self.splits.remove(index);
        self.refresh();
        Some(removed)
    }

    fn refresh(&mut self) {
        let account = self.account.as_ref().map(engine_account);
        let transfer = self.transfer_account().map(engine_account);
        let next = resolve_variant(account.as_ref(), transfer.as_ref(), self.splits.len());
        if next != TransactionVariant::Split {
            self.splits.clear();
        }
        if next == self.variant {
            return;
        }

        if !next.allows_category() {
            self.category = None;
        }
        tracing::trace!(from = %self.variant, to = %next, "transaction form variant changed");
        self.variant = next;
    }

    pub fn category_control(&self) -> CategoryControl {
        match self.variant.category_label() {
            Some(label) => CategoryControl {
                enabled: false,
                label: label.to_string(),
            },
            None => CategoryControl {
                enabled: true,
                label: self
                    .category
                    .as_ref()
                    .map(|category| category.name.clone())
                    .unwrap_or_default(),
            },
        }
    }

    /// Accounts for the account field. The current transfer target is disabled.
    pub fn account_options(&self, accounts: &[Account]) -> Vec<SelectOption<Account>> {
        let target = self.transfer_account().map(|account| account.id);
        accounts
            .iter()
            .map(|account| SelectOption {
                value: account.clone(),
                label: account.name.clone(),
                disabled: target == Some(account.id),
            })
            .collect()
    }

    /// Payees followed by the accounts that can be transferred to. The
    /// selected account is disabled.
    pub fn payee_options(
        &self,
        payees: &[Payee],
        accounts: &[Account],
    ) -> Vec<SelectOption<PayeeChoice>> {
        let selected = self.account.as_ref().map(|account| account.id);
        let payees = payees.iter().map(|payee| SelectOption {
            value: PayeeChoice::Payee(payee.clone()),
            label: payee.name.clone(),
            disabled: false,
        });
        let accounts = accounts.iter().map(|account| SelectOption {
            value: PayeeChoice::Account(account.clone()),
            label: account.name.clone(),
            disabled: selected == Some(account.id),
        });
        payees.chain(accounts).collect()
    }

    fn split_requests(&self) -> Result<Vec<SplitNew>, FormError> {
        if self.variant != TransactionVariant::Split {
            return Ok(Vec::new());
        }

        self.splits
            .iter()
            .enumerate()
            .map(|(index, split)| {
                let category = split.category.as_ref().ok_or(FormError::SplitRequired {
                    index,
                    field: "Category",
                })?;
                let amount = split.amount.value().ok_or(FormError::SplitRequired {
                    index,
                    field: "Amount",
                })?;
                Ok(SplitNew {
                    category_id: Some(category.id),
                    amount: Some(amount_to_wire(amount)?),
                    notes: Some(split.notes.clone()).filter(|notes| !notes.is_empty()),
                })
            })
            .collect()
    }

    pub fn to_create_request(&self) -> Result<TransactionNew, FormError> {
        let account = self.account.as_ref().ok_or(FormError::Required("Account"))?;
        let date = self.date.ok_or(FormError::Required("Date"))?;
        let amount = self.amount.value().ok_or(FormError::Required("Amount"))?;
        if self
            .transfer_account()
            .is_some_and(|target| target.id == account.id)
        {
            return Err(FormError::SelfTransfer);
        }

        let payee_id = match &self.payee {
            Some(PayeeChoice::Payee(payee)) => Some(payee.id),
            _ => None,
        };
        let category_id = self
            .category
            .as_ref()
            .filter(|_| self.variant.allows_category())
            .map(|category| category.id);

        Ok(TransactionNew {
            account_id: Some(account.id),
            category_id,
            payee_id,
            amount: Some(amount_to_wire(amount)?),
            date: Some(date),
            notes: Some(self.notes.clone()).filter(|notes| !notes.is_empty()),
            splits: self.split_requests()?,
            transfer_account_id: self.transfer_account().map(|account| account.id),
        })
    }

    /// The transfer side of a stored row is fixed, so only the shared fields
    /// are sent.
    pub fn to_update_request(&self, id: Uuid) -> Result<TransactionEdit, FormError> {
        let new = self.to_create_request()?;
        Ok(TransactionEdit {
            id,
            update: TransactionUpdate {
                account_id: new.account_id,
                category_id: new.category_id,
                payee_id: new.payee_id,
                amount: new.amount,
                date: new.date,
                notes: new.notes,
                splits: new.splits,
            },
        })
    }
}
