use std::collections::HashMap;

use chrono::NaiveDate;
use sea_orm::{ActiveValue, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Amount, EngineError, Month, MonthCategory, ResultEngine, accounts, categories,
    month_categories,
    months::{self, first_of_month, next_month, previous_month},
    transactions,
    util::Validator,
};

use super::{BudgetAuth, Engine, new_id, with_tx};

/// Sums cents as decimals so large stored values can not overflow.
fn sum_minor<'a>(values: impl Iterator<Item = &'a i64>) -> Amount {
    values.map(|cents| Amount::from_minor(*cents)).sum()
}

impl Engine {
    /// Returns the month containing `date`, creating it when missing.
    ///
    /// The previous month is created as well so its carryover can be read.
    pub async fn month_for_date(&self, auth: &BudgetAuth, date: NaiveDate) -> ResultEngine<Month> {
        let date = first_of_month(date)?;
        with_tx!(self, |db_tx| {
            let month = Self::get_or_create_month(&db_tx, auth.budget_id(), date).await?;
            Self::month_details(&db_tx, month).await
        })
    }

    pub async fn month(&self, auth: &BudgetAuth, month_id: Uuid) -> ResultEngine<Month> {
        with_tx!(self, |db_tx| {
            let month = Self::require_month(&db_tx, auth, month_id).await?;
            Self::ensure_month_categories(&db_tx, &month).await?;
            Self::month_details(&db_tx, month).await
        })
    }

    /// Sets how much of the month's money is held back for the next month.
    pub async fn update_month(
        &self,
        auth: &BudgetAuth,
        month_id: Uuid,
        carryover: Option<Amount>,
    ) -> ResultEngine<()> {
        let mut validator = Validator::new();
        validator.required("Carryover", carryover);
        validator.positive("Carryover", carryover);
        validator.max_precision("Carryover", carryover);
        validator.finish()?;
        let carryover = carryover.unwrap_or(Amount::ZERO).to_minor()?;

        let month = Self::require_month(&self.database, auth, month_id).await?;
        let mut active: months::ActiveModel = month.into();
        active.carryover = ActiveValue::Set(carryover);
        active.update(&self.database).await?;
        Ok(())
    }

    /// Assigns `amount` to a category for the month.
    pub async fn set_category_amount(
        &self,
        auth: &BudgetAuth,
        month_id: Uuid,
        category_id: Option<Uuid>,
        amount: Option<Amount>,
    ) -> ResultEngine<()> {
        let mut validator = Validator::new();
        validator.required("Category ID", category_id);
        validator.required("Amount", amount);
        validator.non_zero("Amount", amount);
        validator.positive("Amount", amount);
        validator.max_precision("Amount", amount);
        validator.finish()?;
        let (Some(category_id), Some(amount)) = (category_id, amount) else {
            return Err(EngineError::Invalid("Category ID and Amount are required.".to_string()));
        };
        let amount = amount.to_minor()?;

        with_tx!(self, |db_tx| {
            let month = Self::require_month(&db_tx, auth, month_id).await?;
            if Self::find_category_in_budget(&db_tx, auth.budget_id(), category_id)
                .await?
                .is_none()
            {
                return Err(EngineError::Invalid("Invalid Category ID".to_string()));
            }

            let model = Self::get_or_create_month_category(&db_tx, month.id, category_id).await?;
            let mut active: month_categories::ActiveModel = model.into();
            active.amount = ActiveValue::Set(amount);
            active.update(&db_tx).await?;
            Ok(())
        })
    }

    async fn require_month<C: ConnectionTrait>(
        db: &C,
        auth: &BudgetAuth,
        month_id: Uuid,
    ) -> ResultEngine<months::Model> {
        months::Entity::find_by_id(month_id)
            .filter(months::Column::BudgetId.eq(auth.budget_id()))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("month".to_string()))
    }

    /// Finds or creates the month starting on `date`, with a row for every category.
    pub(super) async fn get_or_create_month<C: ConnectionTrait>(
        db: &C,
        budget_id: Uuid,
        date: NaiveDate,
    ) -> ResultEngine<months::Model> {
        let date = first_of_month(date)?;
        let existing = months::Entity::find()
            .filter(months::Column::BudgetId.eq(budget_id))
            .filter(months::Column::Date.eq(date))
            .one(db)
            .await?;

        let month = match existing {
            Some(month) => month,
            None => {
                months::ActiveModel {
                    id: ActiveValue::Set(new_id()),
                    budget_id: ActiveValue::Set(budget_id),
                    date: ActiveValue::Set(date),
                    carryover: ActiveValue::Set(0),
                }
                .insert(db)
                .await?
            }
        };

        Self::ensure_month_categories(db, &month).await?;
        Ok(month)
    }

    async fn ensure_month_categories<C: ConnectionTrait>(
        db: &C,
        month: &months::Model,
    ) -> ResultEngine<()> {
        let categories = categories::Entity::find()
            .filter(categories::Column::BudgetId.eq(month.budget_id))
            .all(db)
            .await?;
        for category in categories {
            Self::get_or_create_month_category(db, month.id, category.id).await?;
        }
        Ok(())
    }

    pub(super) async fn get_or_create_month_category<C: ConnectionTrait>(
        db: &C,
        month_id: Uuid,
        category_id: Uuid,
    ) -> ResultEngine<month_categories::Model> {
        if let Some(model) = month_categories::Entity::find()
            .filter(month_categories::Column::MonthId.eq(month_id))
            .filter(month_categories::Column::CategoryId.eq(category_id))
            .one(db)
            .await?
        {
            return Ok(model);
        }

        month_categories::ActiveModel {
            id: ActiveValue::Set(new_id()),
            month_id: ActiveValue::Set(month_id),
            category_id: ActiveValue::Set(category_id),
            amount: ActiveValue::Set(0),
        }
        .insert(db)
        .await
        .map_err(Into::into)
    }

    /// Computes the month totals.
    ///
    /// - `income`: this month's rows in income categories
    /// - `budgetable`: income + carried over - carryover - assigned
    /// - per category `available`: everything assigned and spent up to the
    ///   end of this month
    async fn month_details<C: ConnectionTrait>(
        db: &C,
        month: months::Model,
    ) -> ResultEngine<Month> {
        let previous =
            Self::get_or_create_month(db, month.budget_id, previous_month(month.date)?).await?;
        let end = next_month(month.date)?;

        let this_month_rows = month_categories::Entity::find()
            .filter(month_categories::Column::MonthId.eq(month.id))
            .all(db)
            .await?;

        let earlier_months: Vec<Uuid> = months::Entity::find()
            .filter(months::Column::BudgetId.eq(month.budget_id))
            .filter(months::Column::Date.lt(month.date))
            .all(db)
            .await?
            .into_iter()
            .map(|model| model.id)
            .collect();
        let mut assigned_before: HashMap<Uuid, Amount> = HashMap::new();
        for row in month_categories::Entity::find()
            .filter(month_categories::Column::MonthId.is_in(earlier_months))
            .all(db)
            .await?
        {
            *assigned_before.entry(row.category_id).or_default() += Amount::from_minor(row.amount);
        }

        let account_ids: Vec<Uuid> = accounts::Entity::find()
            .filter(accounts::Column::BudgetId.eq(month.budget_id))
            .all(db)
            .await?
            .into_iter()
            .map(|account| account.id)
            .collect();
        let categorized = transactions::Entity::find()
            .filter(transactions::Column::AccountId.is_in(account_ids))
            .filter(transactions::Column::CategoryId.is_not_null())
            .filter(transactions::Column::Date.lt(end))
            .all(db)
            .await?;

        let income_ids = Self::income_category_ids(db, month.budget_id).await?;
        let mut activity_before: HashMap<Uuid, Amount> = HashMap::new();
        let mut activity: HashMap<Uuid, Amount> = HashMap::new();
        let mut income = Amount::ZERO;
        for row in &categorized {
            let Some(category_id) = row.category_id else {
                continue;
            };
            let amount = Amount::from_minor(row.amount);
            if row.date < month.date {
                *activity_before.entry(category_id).or_default() += amount;
            } else {
                *activity.entry(category_id).or_default() += amount;
                if income_ids.contains(&category_id) {
                    income += amount;
                }
            }
        }

        let assigned = sum_minor(this_month_rows.iter().map(|row| &row.amount));
        let carryover = Amount::from_minor(month.carryover);
        let carried_over = Amount::from_minor(previous.carryover);

        let categories = this_month_rows
            .iter()
            .map(|row| {
                let assigned = Amount::from_minor(row.amount);
                let activity = activity.get(&row.category_id).copied().unwrap_or_default();
                let available = assigned_before
                    .get(&row.category_id)
                    .copied()
                    .unwrap_or_default()
                    + activity_before
                        .get(&row.category_id)
                        .copied()
                        .unwrap_or_default()
                    + assigned
                    + activity;
                MonthCategory {
                    id: row.id,
                    category_id: row.category_id,
                    assigned,
                    activity,
                    available,
                }
            })
            .collect();

        Ok(Month {
            id: month.id,
            date: month.date,
            budgetable: income + carried_over - carryover - assigned,
            carryover,
            income,
            assigned,
            carried_over,
            categories,
        })
    }
}
