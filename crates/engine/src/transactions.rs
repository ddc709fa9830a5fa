//! The module contains `Transaction`, `Split` and the transactions table.
//!
//! One table holds every row kind:
//!
//! - a transfer is two rows pointing at each other through `transfer_id`;
//! - a split is a parent row with `is_split` set and no category, plus one
//!   child row per split pointing at the parent through `split_id`.

use chrono::NaiveDate;
use sea_orm::entity::prelude::*;
use uuid::Uuid;

use crate::{Account, Amount, Category, Payee, TransactionVariant};

/// A transaction as shown to users.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub id: Uuid,
    pub variant: TransactionVariant,
    pub account: Account,
    pub category: Option<Category>,
    pub payee: Option<Payee>,
    pub amount: Amount,
    pub date: NaiveDate,
    pub notes: Option<String>,
    /// Mirror row of a transfer.
    pub transfer_id: Option<Uuid>,
    pub transfer_account: Option<Account>,
}

/// One child row of a split transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Split {
    pub id: Uuid,
    pub category: Category,
    pub amount: Amount,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub account_id: Uuid,
    pub category_id: Option<Uuid>,
    pub payee_id: Option<Uuid>,
    pub transfer_id: Option<Uuid>,
    pub split_id: Option<Uuid>,
    pub is_split: bool,
    /// Signed amount in cents.
    pub amount: i64,
    pub date: Date,
    pub notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Account,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
