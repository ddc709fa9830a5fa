use chrono::Utc;
use sea_orm::{ActiveValue, JoinType, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Budget, ResultEngine, budget_users, budgets, categories, category_groups, month_categories,
    months::{self, first_of_month},
    util::Validator,
};

use super::{Engine, new_id, with_tx};

const INCOME_NAME: &str = "Income";

impl Engine {
    /// Creates a budget owned by `user_id`.
    ///
    /// The budget starts with the current month and an income group holding
    /// a single "Income" category.
    pub async fn create_budget(&self, user_id: Uuid, name: &str) -> ResultEngine<Budget> {
        let name = name.trim();
        let mut validator = Validator::new();
        if validator.required_text("Name", name) {
            validator.max_chars("Name", Some(name), 255);
        }
        validator.finish()?;

        let month_date = first_of_month(Utc::now().date_naive())?;

        with_tx!(self, |db_tx| {
            let budget = budgets::ActiveModel {
                id: ActiveValue::Set(new_id()),
                name: ActiveValue::Set(name.to_string()),
            }
            .insert(&db_tx)
            .await?;

            budget_users::ActiveModel {
                budget_id: ActiveValue::Set(budget.id),
                user_id: ActiveValue::Set(user_id),
            }
            .insert(&db_tx)
            .await?;

            let month = months::ActiveModel {
                id: ActiveValue::Set(new_id()),
                budget_id: ActiveValue::Set(budget.id),
                date: ActiveValue::Set(month_date),
                carryover: ActiveValue::Set(0),
            }
            .insert(&db_tx)
            .await?;

            let group = category_groups::ActiveModel {
                id: ActiveValue::Set(new_id()),
                budget_id: ActiveValue::Set(budget.id),
                name: ActiveValue::Set(INCOME_NAME.to_string()),
                is_income: ActiveValue::Set(true),
            }
            .insert(&db_tx)
            .await?;

            let category = categories::ActiveModel {
                id: ActiveValue::Set(new_id()),
                budget_id: ActiveValue::Set(budget.id),
                group_id: ActiveValue::Set(group.id),
                name: ActiveValue::Set(INCOME_NAME.to_string()),
            }
            .insert(&db_tx)
            .await?;

            month_categories::ActiveModel {
                id: ActiveValue::Set(new_id()),
                month_id: ActiveValue::Set(month.id),
                category_id: ActiveValue::Set(category.id),
                amount: ActiveValue::Set(0),
            }
            .insert(&db_tx)
            .await?;

            tracing::info!(budget = %budget.id, "created budget");
            Ok(Budget::from(budget))
        })
    }

    /// Budgets `user_id` is a member of, by name.
    pub async fn budgets(&self, user_id: Uuid) -> ResultEngine<Vec<Budget>> {
        let models = budgets::Entity::find()
            .join(JoinType::InnerJoin, budgets::Relation::BudgetUsers.def())
            .filter(budget_users::Column::UserId.eq(user_id))
            .order_by_asc(budgets::Column::Name)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Budget::from).collect())
    }

    pub async fn budget(&self, user_id: Uuid, budget_id: Uuid) -> ResultEngine<Budget> {
        let model = Self::require_member(&self.database, user_id, budget_id).await?;
        Ok(Budget::from(model))
    }
}
