use std::collections::HashSet;

use chrono::NaiveDate;
use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Account, EngineError, ResultEngine, TransactionVariant, ops::BudgetAuth, transactions,
    variant::persisted_variant,
};

use super::{BudgetLookup, Engine, TransactionParams, ValidParams, ValidSplit};
use crate::ops::{new_id, with_tx};

/// Checks the references of `params` against the budget and returns the variant.
fn check_references(
    lookup: &BudgetLookup,
    params: &ValidParams,
    account: &Account,
    transfer_account: Option<&Account>,
) -> ResultEngine<TransactionVariant> {
    if let Some(category_id) = params.category_id {
        lookup.category(category_id)?;
    }
    if let Some(payee_id) = params.payee_id {
        lookup.payee(payee_id)?;
    }
    for split in &params.splits {
        lookup.category(split.category_id)?;
    }

    if let Some(other) = transfer_account {
        if other.id == account.id {
            return Err(EngineError::Invalid("Invalid Transfer Account".to_string()));
        }
        if params.payee_id.is_some() {
            return Err(EngineError::Invalid(
                "cannot set a payee on transfer".to_string(),
            ));
        }
        if !params.splits.is_empty() {
            return Err(EngineError::Invalid("cannot split a transfer".to_string()));
        }
    }

    let variant = persisted_variant(account, transfer_account, !params.splits.is_empty());
    if params.category_id.is_some() && !variant.allows_category() {
        return Err(EngineError::Invalid(
            "category can only be set on standard transaction".to_string(),
        ));
    }
    Ok(variant)
}

impl Engine {
    /// Creates a transaction and returns its id.
    ///
    /// - with `transfer_account_id`: a mirror row with the negated amount is
    ///   booked on the other account, both rows point at each other;
    /// - with splits: the row becomes a split parent without category and one
    ///   child row is booked per split.
    pub async fn create_transaction(
        &self,
        auth: &BudgetAuth,
        params: TransactionParams,
    ) -> ResultEngine<Uuid> {
        let valid = params.validate()?;

        with_tx!(self, |db_tx| {
            let lookup = BudgetLookup::load(&db_tx, auth.budget_id()).await?;
            let account = lookup.account(valid.account_id)?.clone();
            let transfer_account = match params.transfer_account_id {
                Some(id) => Some(
                    lookup
                        .accounts
                        .get(&id)
                        .cloned()
                        .ok_or_else(|| EngineError::Invalid("Invalid Transfer Account".to_string()))?,
                ),
                None => None,
            };
            check_references(&lookup, &valid, &account, transfer_account.as_ref())?;

            let id = new_id();
            let mirror_id = transfer_account.as_ref().map(|_| new_id());
            let category_id = if valid.splits.is_empty() {
                valid.category_id
            } else {
                None
            };

            transactions::ActiveModel {
                id: ActiveValue::Set(id),
                account_id: ActiveValue::Set(account.id),
                category_id: ActiveValue::Set(category_id),
                payee_id: ActiveValue::Set(valid.payee_id),
                transfer_id: ActiveValue::Set(mirror_id),
                split_id: ActiveValue::Set(None),
                is_split: ActiveValue::Set(!valid.splits.is_empty()),
                amount: ActiveValue::Set(valid.amount),
                date: ActiveValue::Set(valid.date),
                notes: ActiveValue::Set(valid.notes.clone()),
            }
            .insert(&db_tx)
            .await?;

            if let (Some(other), Some(mirror_id)) = (&transfer_account, mirror_id) {
                transactions::ActiveModel {
                    id: ActiveValue::Set(mirror_id),
                    account_id: ActiveValue::Set(other.id),
                    category_id: ActiveValue::Set(None),
                    payee_id: ActiveValue::Set(None),
                    transfer_id: ActiveValue::Set(Some(id)),
                    split_id: ActiveValue::Set(None),
                    is_split: ActiveValue::Set(false),
                    amount: ActiveValue::Set(-valid.amount),
                    date: ActiveValue::Set(valid.date),
                    notes: ActiveValue::Set(valid.notes.clone()),
                }
                .insert(&db_tx)
                .await?;
            }

            Self::insert_splits(&db_tx, id, account.id, valid.date, &valid.splits).await?;
            Self::touch_months(&db_tx, auth, &valid, category_id).await?;

            tracing::debug!(transaction = %id, "created transaction");
            Ok(id)
        })
    }

    /// Rewrites a transaction.
    ///
    /// A transfer keeps its other account; the mirror row follows the new
    /// amount (negated), date and notes. Split children are replaced.
    pub async fn update_transaction(
        &self,
        auth: &BudgetAuth,
        transaction_id: Uuid,
        params: TransactionParams,
    ) -> ResultEngine<()> {
        let valid = params.validate()?;

        with_tx!(self, |db_tx| {
            let lookup = BudgetLookup::load(&db_tx, auth.budget_id()).await?;
            let existing = Self::require_transaction(&db_tx, &lookup, transaction_id).await?;
            let account = lookup.account(valid.account_id)?.clone();
            let transfer_account = Self::transfer_account_id(&db_tx, &existing)
                .await?
                .and_then(|id| lookup.accounts.get(&id).cloned());
            check_references(&lookup, &valid, &account, transfer_account.as_ref())?;

            let category_id = if valid.splits.is_empty() {
                valid.category_id
            } else {
                None
            };

            let mut active: transactions::ActiveModel = existing.clone().into();
            active.account_id = ActiveValue::Set(account.id);
            active.category_id = ActiveValue::Set(category_id);
            active.payee_id = ActiveValue::Set(valid.payee_id);
            active.is_split = ActiveValue::Set(!valid.splits.is_empty());
            active.amount = ActiveValue::Set(valid.amount);
            active.date = ActiveValue::Set(valid.date);
            active.notes = ActiveValue::Set(valid.notes.clone());
            active.update(&db_tx).await?;

            if let Some(mirror_id) = existing.transfer_id
                && let Some(mirror) = transactions::Entity::find_by_id(mirror_id)
                    .one(&db_tx)
                    .await?
            {
                let mut mirror: transactions::ActiveModel = mirror.into();
                mirror.amount = ActiveValue::Set(-valid.amount);
                mirror.date = ActiveValue::Set(valid.date);
                mirror.notes = ActiveValue::Set(valid.notes.clone());
                mirror.update(&db_tx).await?;
            }

            transactions::Entity::delete_many()
                .filter(transactions::Column::SplitId.eq(existing.id))
                .exec(&db_tx)
                .await?;
            Self::insert_splits(&db_tx, existing.id, account.id, valid.date, &valid.splits)
                .await?;
            Self::touch_months(&db_tx, auth, &valid, category_id).await?;

            Ok(())
        })
    }

    /// Deletes rows of the budget with their transfer mirrors and split
    /// children. Ids of other budgets are ignored.
    pub async fn delete_transactions(
        &self,
        auth: &BudgetAuth,
        transaction_ids: &[Uuid],
    ) -> ResultEngine<()> {
        if transaction_ids.is_empty() {
            return Ok(());
        }

        with_tx!(self, |db_tx| {
            let lookup = BudgetLookup::load(&db_tx, auth.budget_id()).await?;
            let rows = transactions::Entity::find()
                .filter(transactions::Column::Id.is_in(transaction_ids.iter().copied()))
                .filter(transactions::Column::AccountId.is_in(lookup.account_ids()))
                .all(&db_tx)
                .await?;

            let mut ids: HashSet<Uuid> = HashSet::new();
            for row in &rows {
                ids.insert(row.id);
                if let Some(mirror_id) = row.transfer_id {
                    ids.insert(mirror_id);
                }
            }
            let ids: Vec<Uuid> = ids.into_iter().collect();

            transactions::Entity::delete_many()
                .filter(transactions::Column::SplitId.is_in(ids.clone()))
                .exec(&db_tx)
                .await?;
            let deleted = transactions::Entity::delete_many()
                .filter(transactions::Column::Id.is_in(ids))
                .exec(&db_tx)
                .await?;

            tracing::debug!(rows = deleted.rows_affected, "deleted transactions");
            Ok(())
        })
    }

    async fn insert_splits(
        db_tx: &DatabaseTransaction,
        parent_id: Uuid,
        account_id: Uuid,
        date: NaiveDate,
        splits: &[ValidSplit],
    ) -> ResultEngine<()> {
        for split in splits {
            transactions::ActiveModel {
                id: ActiveValue::Set(new_id()),
                account_id: ActiveValue::Set(account_id),
                category_id: ActiveValue::Set(Some(split.category_id)),
                payee_id: ActiveValue::Set(None),
                transfer_id: ActiveValue::Set(None),
                split_id: ActiveValue::Set(Some(parent_id)),
                is_split: ActiveValue::Set(false),
                amount: ActiveValue::Set(split.amount),
                date: ActiveValue::Set(date),
                notes: ActiveValue::Set(split.notes.clone()),
            }
            .insert(db_tx)
            .await?;
        }
        Ok(())
    }

    /// Makes sure the month of a categorized row exists, so its activity
    /// shows up against an assignment row.
    async fn touch_months(
        db_tx: &DatabaseTransaction,
        auth: &BudgetAuth,
        params: &ValidParams,
        category_id: Option<Uuid>,
    ) -> ResultEngine<()> {
        if category_id.is_some() || !params.splits.is_empty() {
            Self::get_or_create_month(db_tx, auth.budget_id(), params.date).await?;
        }
        Ok(())
    }
}
