use std::collections::HashMap;

use sea_orm::{ActiveValue, QueryFilter, QueryOrder, QuerySelect, prelude::*, sea_query::Expr};
use uuid::Uuid;

use crate::{
    Account, AccountBalance, Amount, EngineError, ResultEngine, accounts, transactions,
    util::Validator,
};

use super::{BudgetAuth, Engine, new_id};

impl Engine {
    pub async fn create_account(
        &self,
        auth: &BudgetAuth,
        name: &str,
        off_budget: bool,
    ) -> ResultEngine<Account> {
        let name = name.trim();
        let mut validator = Validator::new();
        if validator.required_text("Name", name) {
            validator.max_chars("Name", Some(name), 255);
        }
        validator.finish()?;

        let model = accounts::ActiveModel {
            id: ActiveValue::Set(new_id()),
            budget_id: ActiveValue::Set(auth.budget_id()),
            name: ActiveValue::Set(name.to_string()),
            off_budget: ActiveValue::Set(off_budget),
        }
        .insert(&self.database)
        .await?;

        Ok(Account::from(&model))
    }

    /// Accounts of the budget with their balances, by name.
    pub async fn accounts(&self, auth: &BudgetAuth) -> ResultEngine<Vec<AccountBalance>> {
        let models = self.account_models(auth).await?;
        let ids: Vec<Uuid> = models.iter().map(|model| model.id).collect();

        // Split children are excluded: their parent already carries the total.
        let balances: HashMap<Uuid, i64> = transactions::Entity::find()
            .select_only()
            .column(transactions::Column::AccountId)
            .column_as(Expr::col(transactions::Column::Amount).sum(), "balance")
            .filter(transactions::Column::AccountId.is_in(ids))
            .filter(transactions::Column::SplitId.is_null())
            .group_by(transactions::Column::AccountId)
            .into_tuple::<(Uuid, i64)>()
            .all(&self.database)
            .await?
            .into_iter()
            .collect();

        Ok(models
            .iter()
            .map(|model| AccountBalance {
                account: Account::from(model),
                balance: Amount::from_minor(balances.get(&model.id).copied().unwrap_or(0)),
            })
            .collect())
    }

    /// Accounts a transaction can be booked on or transferred to.
    pub async fn transactable_accounts(&self, auth: &BudgetAuth) -> ResultEngine<Vec<Account>> {
        Ok(self
            .account_models(auth)
            .await?
            .iter()
            .map(Account::from)
            .collect())
    }

    pub async fn account(&self, auth: &BudgetAuth, account_id: Uuid) -> ResultEngine<Account> {
        Self::find_account_in_budget(&self.database, auth.budget_id(), account_id)
            .await?
            .map(|model| Account::from(&model))
            .ok_or_else(|| EngineError::KeyNotFound("account".to_string()))
    }

    async fn account_models(&self, auth: &BudgetAuth) -> ResultEngine<Vec<accounts::Model>> {
        accounts::Entity::find()
            .filter(accounts::Column::BudgetId.eq(auth.budget_id()))
            .order_by_asc(accounts::Column::Name)
            .all(&self.database)
            .await
            .map_err(Into::into)
    }
}
