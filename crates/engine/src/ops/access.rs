use sea_orm::{ConnectionTrait, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, accounts, budget_users, budgets, categories, category_groups,
    payees,
};

use super::Engine;

/// Proof that a user may act on a budget.
///
/// Only [`Engine::budget_auth`] builds one, so every budget-scoped operation
/// taking a `&BudgetAuth` runs after the membership check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BudgetAuth {
    user_id: Uuid,
    budget_id: Uuid,
}

impl BudgetAuth {
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn budget_id(&self) -> Uuid {
        self.budget_id
    }
}

/// Generates a `find_*_in_budget` lookup for a budget-scoped entity.
macro_rules! impl_find_in_budget {
    ($find_fn:ident, $entity:ident) => {
        pub(super) async fn $find_fn<C: ConnectionTrait>(
            db: &C,
            budget_id: Uuid,
            target_id: Uuid,
        ) -> ResultEngine<Option<$entity::Model>> {
            $entity::Entity::find_by_id(target_id)
                .filter($entity::Column::BudgetId.eq(budget_id))
                .one(db)
                .await
                .map_err(Into::into)
        }
    };
}

impl Engine {
    impl_find_in_budget!(find_account_in_budget, accounts);
    impl_find_in_budget!(find_category_in_budget, categories);
    impl_find_in_budget!(find_group_in_budget, category_groups);
    impl_find_in_budget!(find_payee_in_budget, payees);

    /// Checks that `user_id` belongs to `budget_id`.
    ///
    /// Budgets the user is not a member of are reported as missing.
    pub async fn budget_auth(&self, user_id: Uuid, budget_id: Uuid) -> ResultEngine<BudgetAuth> {
        Self::require_member(&self.database, user_id, budget_id).await?;
        Ok(BudgetAuth { user_id, budget_id })
    }

    pub(super) async fn require_member<C: ConnectionTrait>(
        db: &C,
        user_id: Uuid,
        budget_id: Uuid,
    ) -> ResultEngine<budgets::Model> {
        let member = budget_users::Entity::find_by_id((budget_id, user_id))
            .one(db)
            .await?
            .is_some();
        if !member {
            return Err(EngineError::KeyNotFound("budget".to_string()));
        }

        budgets::Entity::find_by_id(budget_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("budget".to_string()))
    }
}
