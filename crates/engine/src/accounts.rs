//! The module contains `Account` and its table.

use sea_orm::entity::prelude::*;
use uuid::Uuid;

/// A place where money is kept.
///
/// Off-budget accounts (a mortgage, a retirement fund) are tracked but their
/// rows never touch category activity.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub off_budget: bool,
}

impl From<&Model> for Account {
    fn from(model: &Model) -> Self {
        Self {
            id: model.id,
            name: model.name.clone(),
            off_budget: model.off_budget,
        }
    }
}

/// Account plus the sum of its rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountBalance {
    pub account: Account,
    pub balance: crate::Amount,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub budget_id: Uuid,
    pub name: String,
    pub off_budget: bool,
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
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::budgets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budget.def()
    }
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
