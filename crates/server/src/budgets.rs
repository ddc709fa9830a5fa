//! Budgets API endpoints. These only need a logged-in user.

use api_types::{
    Created, Data,
    budget::{Budget, BudgetNew},
};
use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    ServerError,
    server::{CurrentUser, ServerState},
};

fn map_budget(budget: engine::Budget) -> Budget {
    Budget {
        id: budget.id,
        name: budget.name,
    }
}

pub async fn create(
    Extension(current): Extension<CurrentUser>,
    State(state): State<ServerState>,
    payload: Result<Json<BudgetNew>, JsonRejection>,
) -> Result<(StatusCode, Json<Data<Created>>), ServerError> {
    let Json(payload) = payload?;
    let budget = state
        .engine
        .create_budget(current.user.id, &payload.name)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(Data::new(Created { id: budget.id })),
    ))
}

pub async fn list(
    Extension(current): Extension<CurrentUser>,
    State(state): State<ServerState>,
) -> Result<Json<Data<Vec<Budget>>>, ServerError> {
    let budgets = state
        .engine
        .budgets(current.user.id)
        .await?
        .into_iter()
        .map(map_budget)
        .collect();

    Ok(Json(Data::new(budgets)))
}

pub async fn get(
    Extension(current): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
) -> Result<Json<Data<Budget>>, ServerError> {
    let budget = state.engine.budget(current.user.id, budget_id).await?;
    Ok(Json(Data::new(map_budget(budget))))
}
