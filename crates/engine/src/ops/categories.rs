use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Category, CategoryGroup, EngineError, ResultEngine, categories, category_groups,
    month_categories, months, util::Validator,
};

use super::{BudgetAuth, Engine, new_id, with_tx};

fn validate_name(name: &str) -> ResultEngine<()> {
    let mut validator = Validator::new();
    if validator.required_text("Name", name) {
        validator.max_chars("Name", Some(name), 255);
    }
    validator.finish()
}

impl Engine {
    /// Adds a category to a group of the budget.
    ///
    /// Every month that already exists gets an empty assignment row for it.
    pub async fn create_category(
        &self,
        auth: &BudgetAuth,
        group_id: Option<Uuid>,
        name: &str,
    ) -> ResultEngine<Category> {
        let name = name.trim();
        let mut validator = Validator::new();
        validator.required("Group ID", group_id);
        if validator.required_text("Name", name) {
            validator.max_chars("Name", Some(name), 255);
        }
        validator.finish()?;
        let Some(group_id) = group_id else {
            return Err(EngineError::Invalid("Group ID is required.".to_string()));
        };

        with_tx!(self, |db_tx| {
            if Self::find_group_in_budget(&db_tx, auth.budget_id(), group_id)
                .await?
                .is_none()
            {
                return Err(EngineError::Invalid("Invalid Group ID.".to_string()));
            }

            let category = categories::ActiveModel {
                id: ActiveValue::Set(new_id()),
                budget_id: ActiveValue::Set(auth.budget_id()),
                group_id: ActiveValue::Set(group_id),
                name: ActiveValue::Set(name.to_string()),
            }
            .insert(&db_tx)
            .await?;

            let existing_months = months::Entity::find()
                .filter(months::Column::BudgetId.eq(auth.budget_id()))
                .all(&db_tx)
                .await?;
            for month in existing_months {
                month_categories::ActiveModel {
                    id: ActiveValue::Set(new_id()),
                    month_id: ActiveValue::Set(month.id),
                    category_id: ActiveValue::Set(category.id),
                    amount: ActiveValue::Set(0),
                }
                .insert(&db_tx)
                .await?;
            }

            Ok(Category::from(&category))
        })
    }

    pub async fn create_category_group(
        &self,
        auth: &BudgetAuth,
        name: &str,
    ) -> ResultEngine<CategoryGroup> {
        let name = name.trim();
        validate_name(name)?;

        let model = category_groups::ActiveModel {
            id: ActiveValue::Set(new_id()),
            budget_id: ActiveValue::Set(auth.budget_id()),
            name: ActiveValue::Set(name.to_string()),
            is_income: ActiveValue::Set(false),
        }
        .insert(&self.database)
        .await?;

        Ok(CategoryGroup {
            id: model.id,
            name: model.name,
            is_income: model.is_income,
            categories: Vec::new(),
        })
    }

    /// All groups of the budget with their categories, both by name.
    pub async fn category_groups(&self, auth: &BudgetAuth) -> ResultEngine<Vec<CategoryGroup>> {
        let groups = category_groups::Entity::find()
            .filter(category_groups::Column::BudgetId.eq(auth.budget_id()))
            .order_by_asc(category_groups::Column::Name)
            .all(&self.database)
            .await?;
        let categories = categories::Entity::find()
            .filter(categories::Column::BudgetId.eq(auth.budget_id()))
            .order_by_asc(categories::Column::Name)
            .all(&self.database)
            .await?;

        Ok(groups
            .into_iter()
            .map(|group| CategoryGroup {
                categories: categories
                    .iter()
                    .filter(|category| category.group_id == group.id)
                    .map(Category::from)
                    .collect(),
                id: group.id,
                name: group.name,
                is_income: group.is_income,
            })
            .collect())
    }

    pub async fn category(&self, auth: &BudgetAuth, category_id: Uuid) -> ResultEngine<Category> {
        Self::find_category_in_budget(&self.database, auth.budget_id(), category_id)
            .await?
            .map(|model| Category::from(&model))
            .ok_or_else(|| EngineError::KeyNotFound("category".to_string()))
    }

    pub async fn category_group(
        &self,
        auth: &BudgetAuth,
        group_id: Uuid,
    ) -> ResultEngine<CategoryGroup> {
        let group = Self::find_group_in_budget(&self.database, auth.budget_id(), group_id)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("category group".to_string()))?;
        let categories = categories::Entity::find()
            .filter(categories::Column::GroupId.eq(group.id))
            .order_by_asc(categories::Column::Name)
            .all(&self.database)
            .await?;

        Ok(CategoryGroup {
            id: group.id,
            name: group.name,
            is_income: group.is_income,
            categories: categories.iter().map(Category::from).collect(),
        })
    }

    /// Ids of the categories inside the budget's income group.
    pub(super) async fn income_category_ids<C: ConnectionTrait>(
        db: &C,
        budget_id: Uuid,
    ) -> ResultEngine<Vec<Uuid>> {
        let groups: Vec<Uuid> = category_groups::Entity::find()
            .filter(category_groups::Column::BudgetId.eq(budget_id))
            .filter(category_groups::Column::IsIncome.eq(true))
            .all(db)
            .await?
            .into_iter()
            .map(|group| group.id)
            .collect();

        Ok(categories::Entity::find()
            .filter(categories::Column::GroupId.is_in(groups))
            .all(db)
            .await?
            .into_iter()
            .map(|category| category.id)
            .collect())
    }
}
