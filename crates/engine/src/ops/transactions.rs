use std::collections::HashMap;

use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{
    Account, Amount, Category, EngineError, Payee, ResultEngine, Transaction, accounts,
    categories, payees, transactions,
    util::{Validator, normalize_optional_text},
    variant::persisted_variant,
};

use super::Engine;

mod list;
mod write;

const MAX_NOTES_CHARS: usize = 255;

/// One split row of a transaction being written.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SplitParams {
    pub category_id: Option<Uuid>,
    pub amount: Option<Amount>,
    pub notes: Option<String>,
}

/// Input of create and update.
///
/// `transfer_account_id` is only read on create: a row can not become or stop
/// being a transfer afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionParams {
    pub account_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub payee_id: Option<Uuid>,
    pub amount: Option<Amount>,
    pub date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub splits: Vec<SplitParams>,
    pub transfer_account_id: Option<Uuid>,
}

struct ValidSplit {
    category_id: Uuid,
    amount: i64,
    notes: Option<String>,
}

struct ValidParams {
    account_id: Uuid,
    category_id: Option<Uuid>,
    payee_id: Option<Uuid>,
    amount: i64,
    date: NaiveDate,
    notes: Option<String>,
    splits: Vec<ValidSplit>,
}

impl TransactionParams {
    /// Field-level checks that need no database access.
    fn validate(&self) -> ResultEngine<ValidParams> {
        let notes = normalize_optional_text(self.notes.as_deref());

        let mut validator = Validator::new();
        validator.required("Account ID", self.account_id);
        validator.required("Amount", self.amount);
        validator.max_precision("Amount", self.amount);
        validator.required("Date", self.date);
        validator.max_chars("Notes", notes.as_deref(), MAX_NOTES_CHARS);

        for split in &self.splits {
            validator.required("Category ID", split.category_id);
            validator.required("Amount", split.amount);
            validator.max_precision("Amount", split.amount);
            validator.max_chars("Notes", split.notes.as_deref(), MAX_NOTES_CHARS);
        }
        validator.finish()?;

        let (Some(account_id), Some(amount), Some(date)) = (self.account_id, self.amount, self.date)
        else {
            return Err(EngineError::Invalid(
                "Account ID, Amount and Date are required.".to_string(),
            ));
        };

        let mut splits = Vec::with_capacity(self.splits.len());
        for split in &self.splits {
            let (Some(category_id), Some(split_amount)) = (split.category_id, split.amount) else {
                return Err(EngineError::Invalid(
                    "Category ID and Amount are required.".to_string(),
                ));
            };
            splits.push(ValidSplit {
                category_id,
                amount: split_amount.to_minor()?,
                notes: normalize_optional_text(split.notes.as_deref()),
            });
        }

        let amount = amount.to_minor()?;
        let split_total: Amount = splits
            .iter()
            .map(|split| Amount::from_minor(split.amount))
            .sum();
        if !splits.is_empty() && split_total != Amount::from_minor(amount) {
            return Err(EngineError::Invalid(
                "Splits must sum to transaction.".to_string(),
            ));
        }

        Ok(ValidParams {
            account_id,
            category_id: self.category_id,
            payee_id: self.payee_id,
            amount,
            date,
            notes,
            splits,
        })
    }
}

/// Accounts, categories and payees of a budget, keyed by id.
struct BudgetLookup {
    accounts: HashMap<Uuid, Account>,
    categories: HashMap<Uuid, Category>,
    payees: HashMap<Uuid, Payee>,
}

impl BudgetLookup {
    async fn load<C: ConnectionTrait>(db: &C, budget_id: Uuid) -> ResultEngine<Self> {
        let accounts = accounts::Entity::find()
            .filter(accounts::Column::BudgetId.eq(budget_id))
            .all(db)
            .await?
            .iter()
            .map(|model| (model.id, Account::from(model)))
            .collect();
        let categories = categories::Entity::find()
            .filter(categories::Column::BudgetId.eq(budget_id))
            .all(db)
            .await?
            .iter()
            .map(|model| (model.id, Category::from(model)))
            .collect();
        let payees = payees::Entity::find()
            .filter(payees::Column::BudgetId.eq(budget_id))
            .all(db)
            .await?
            .iter()
            .map(|model| (model.id, Payee::from(model)))
            .collect();

        Ok(Self {
            accounts,
            categories,
            payees,
        })
    }

    fn account_ids(&self) -> Vec<Uuid> {
        self.accounts.keys().copied().collect()
    }

    fn account(&self, id: Uuid) -> ResultEngine<&Account> {
        self.accounts
            .get(&id)
            .ok_or_else(|| EngineError::Invalid("Invalid Account ID".to_string()))
    }

    fn category(&self, id: Uuid) -> ResultEngine<&Category> {
        self.categories
            .get(&id)
            .ok_or_else(|| EngineError::Invalid("Invalid Category ID".to_string()))
    }

    fn payee(&self, id: Uuid) -> ResultEngine<&Payee> {
        self.payees
            .get(&id)
            .ok_or_else(|| EngineError::Invalid("Invalid Payee ID".to_string()))
    }

    /// Builds the public view of a stored row.
    fn transaction(
        &self,
        row: &transactions::Model,
        transfer_account_id: Option<Uuid>,
    ) -> ResultEngine<Transaction> {
        let account = self
            .accounts
            .get(&row.account_id)
            .cloned()
            .ok_or_else(|| EngineError::KeyNotFound("account".to_string()))?;
        let transfer_account =
            transfer_account_id.and_then(|id| self.accounts.get(&id).cloned());
        let variant = persisted_variant(&account, transfer_account.as_ref(), row.is_split);

        Ok(Transaction {
            id: row.id,
            variant,
            category: row
                .category_id
                .and_then(|id| self.categories.get(&id).cloned()),
            payee: row.payee_id.and_then(|id| self.payees.get(&id).cloned()),
            amount: Amount::from_minor(row.amount),
            date: row.date,
            notes: row.notes.clone(),
            transfer_id: row.transfer_id,
            account,
            transfer_account,
        })
    }
}

impl Engine {
    /// Loads a top-level row of the budget. Split children are not addressable.
    async fn require_transaction<C: ConnectionTrait>(
        db: &C,
        lookup: &BudgetLookup,
        transaction_id: Uuid,
    ) -> ResultEngine<transactions::Model> {
        transactions::Entity::find_by_id(transaction_id)
            .filter(transactions::Column::AccountId.is_in(lookup.account_ids()))
            .filter(transactions::Column::SplitId.is_null())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("transaction".to_string()))
    }

    /// Account of the mirror row of a transfer.
    async fn transfer_account_id<C: ConnectionTrait>(
        db: &C,
        row: &transactions::Model,
    ) -> ResultEngine<Option<Uuid>> {
        let Some(transfer_id) = row.transfer_id else {
            return Ok(None);
        };
        Ok(transactions::Entity::find_by_id(transfer_id)
            .one(db)
            .await?
            .map(|mirror| mirror.account_id))
    }
}
