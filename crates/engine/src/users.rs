//! Users table.
//!
//! Passwords are kept as argon2id PHC strings, never in clear.

use sea_orm::entity::prelude::*;
use uuid::Uuid;

/// Public view of a user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
}

impl From<Model> for User {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub username: String,
    pub password_hash: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::budget_users::Entity")]
    BudgetUsers,
}

impl Related<super::budget_users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BudgetUsers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
