//! Budget months. A month is identified by its first day.

use chrono::{Datelike, NaiveDate};
use sea_orm::entity::prelude::*;
use uuid::Uuid;

use crate::{Amount, EngineError, ResultEngine};

/// A month with its computed totals.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Month {
    pub id: Uuid,
    pub date: NaiveDate,
    /// Money left to assign.
    pub budgetable: Amount,
    /// Money held back for the next month.
    pub carryover: Amount,
    pub income: Amount,
    pub assigned: Amount,
    /// Carryover of the previous month.
    pub carried_over: Amount,
    pub categories: Vec<MonthCategory>,
}

/// Per-category figures of a month.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonthCategory {
    pub id: Uuid,
    pub category_id: Uuid,
    pub assigned: Amount,
    pub activity: Amount,
    pub available: Amount,
}

/// Normalizes a date to the first day of its month.
pub fn first_of_month(date: NaiveDate) -> ResultEngine<NaiveDate> {
    date.with_day(1)
        .ok_or_else(|| EngineError::Invalid(format!("invalid month date {date}")))
}

/// First day of the previous month.
pub fn previous_month(date: NaiveDate) -> ResultEngine<NaiveDate> {
    let first = first_of_month(date)?;
    first
        .pred_opt()
        .and_then(|last_day| last_day.with_day(1))
        .ok_or_else(|| EngineError::Invalid(format!("no month before {date}")))
}

/// First day of the next month.
pub fn next_month(date: NaiveDate) -> ResultEngine<NaiveDate> {
    let first = first_of_month(date)?;
    let (year, month) = if first.month() == 12 {
        (first.year() + 1, 1)
    } else {
        (first.year(), first.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| EngineError::Invalid(format!("no month after {date}")))
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "months")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub budget_id: Uuid,
    pub date: Date,
    /// Cents held back for the next month.
    pub carryover: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::budgets::Entity",
        from = "Column::BudgetId",
        to = "super::budgets::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Budget,
    #[sea_orm(has_many = "super::month_categories::Entity")]
    MonthCategories,
}

impl Related<super::budgets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budget.def()
    }
}

impl Related<super::month_categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MonthCategories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_navigation() {
        assert_eq!(first_of_month(date(2022, 5, 17)).unwrap(), date(2022, 5, 1));
        assert_eq!(previous_month(date(2022, 5, 17)).unwrap(), date(2022, 4, 1));
        assert_eq!(previous_month(date(2022, 1, 31)).unwrap(), date(2021, 12, 1));
        assert_eq!(next_month(date(2022, 12, 3)).unwrap(), date(2023, 1, 1));
    }
}
