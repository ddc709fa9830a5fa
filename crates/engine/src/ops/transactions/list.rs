use std::collections::HashMap;

use sea_orm::{QueryFilter, QueryOrder, prelude::*};
use uuid::Uuid;

use crate::{
    Amount, EngineError, ResultEngine, Split, Transaction, ops::BudgetAuth, transactions,
};

use super::{BudgetLookup, Engine};

impl Engine {
    /// Top-level rows of the budget, newest first. Split children are left out.
    pub async fn transactions(&self, auth: &BudgetAuth) -> ResultEngine<Vec<Transaction>> {
        let lookup = BudgetLookup::load(&self.database, auth.budget_id()).await?;
        let rows = transactions::Entity::find()
            .filter(transactions::Column::AccountId.is_in(lookup.account_ids()))
            .filter(transactions::Column::SplitId.is_null())
            .order_by_desc(transactions::Column::Date)
            .order_by_asc(transactions::Column::Id)
            .all(&self.database)
            .await?;

        // Both sides of a transfer belong to the budget, so mirrors are in `rows`.
        let account_of: HashMap<Uuid, Uuid> =
            rows.iter().map(|row| (row.id, row.account_id)).collect();

        rows.iter()
            .map(|row| {
                let transfer_account_id = row
                    .transfer_id
                    .and_then(|id| account_of.get(&id).copied());
                lookup.transaction(row, transfer_account_id)
            })
            .collect()
    }

    pub async fn transaction(
        &self,
        auth: &BudgetAuth,
        transaction_id: Uuid,
    ) -> ResultEngine<Transaction> {
        let lookup = BudgetLookup::load(&self.database, auth.budget_id()).await?;
        let row = Self::require_transaction(&self.database, &lookup, transaction_id).await?;
        let transfer_account_id = Self::transfer_account_id(&self.database, &row).await?;
        lookup.transaction(&row, transfer_account_id)
    }

    /// Split rows of a transaction. Empty for rows that are not split.
    pub async fn splits(&self, auth: &BudgetAuth, transaction_id: Uuid) -> ResultEngine<Vec<Split>> {
        let lookup = BudgetLookup::load(&self.database, auth.budget_id()).await?;
        let parent = Self::require_transaction(&self.database, &lookup, transaction_id).await?;

        let children = transactions::Entity::find()
            .filter(transactions::Column::SplitId.eq(parent.id))
            .order_by_asc(transactions::Column::Id)
            .all(&self.database)
            .await?;

        children
            .into_iter()
            .map(|child| {
                let category = child
                    .category_id
                    .and_then(|id| lookup.categories.get(&id).cloned())
                    .ok_or_else(|| EngineError::KeyNotFound("split category".to_string()))?;
                Ok(Split {
                    id: child.id,
                    category,
                    amount: Amount::from_minor(child.amount),
                    notes: child.notes,
                })
            })
            .collect()
    }
}
