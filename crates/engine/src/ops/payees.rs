use sea_orm::{ActiveValue, QueryFilter, QueryOrder, prelude::*};
use uuid::Uuid;

use crate::{EngineError, Payee, ResultEngine, payees, util::Validator};

use super::{BudgetAuth, Engine, new_id};

impl Engine {
    pub async fn create_payee(&self, auth: &BudgetAuth, name: &str) -> ResultEngine<Payee> {
        let name = name.trim();
        let mut validator = Validator::new();
        if validator.required_text("Name", name) {
            validator.max_chars("Name", Some(name), 255);
        }
        validator.finish()?;

        let model = payees::ActiveModel {
            id: ActiveValue::Set(new_id()),
            budget_id: ActiveValue::Set(auth.budget_id()),
            name: ActiveValue::Set(name.to_string()),
        }
        .insert(&self.database)
        .await?;

        Ok(Payee::from(&model))
    }

    pub async fn payees(&self, auth: &BudgetAuth) -> ResultEngine<Vec<Payee>> {
        let models = payees::Entity::find()
            .filter(payees::Column::BudgetId.eq(auth.budget_id()))
            .order_by_asc(payees::Column::Name)
            .all(&self.database)
            .await?;
        Ok(models.iter().map(Payee::from).collect())
    }

    pub async fn payee(&self, auth: &BudgetAuth, payee_id: Uuid) -> ResultEngine<Payee> {
        Self::find_payee_in_budget(&self.database, auth.budget_id(), payee_id)
            .await?
            .map(|model| Payee::from(&model))
            .ok_or_else(|| EngineError::KeyNotFound("payee".to_string()))
    }
}
