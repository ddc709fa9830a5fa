use api_types::{
    Created, Data,
    payee::{Payee, PayeeNew},
};
use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use engine::BudgetAuth;
use uuid::Uuid;

use crate::{ServerError, mapping, server::ServerState};

pub async fn create(
    Extension(auth): Extension<BudgetAuth>,
    State(state): State<ServerState>,
    payload: Result<Json<PayeeNew>, JsonRejection>,
) -> Result<(StatusCode, Json<Data<Created>>), ServerError> {
    let Json(payload) = payload?;
    let payee = state.engine.create_payee(&auth, &payload.name).await?;

    Ok((
        StatusCode::CREATED,
        Json(Data::new(Created { id: payee.id })),
    ))
}

pub async fn list(
    Extension(auth): Extension<BudgetAuth>,
    State(state): State<ServerState>,
) -> Result<Json<Data<Vec<Payee>>>, ServerError> {
    let payees = state
        .engine
        .payees(&auth)
        .await?
        .into_iter()
        .map(mapping::payee)
        .collect();

    Ok(Json(Data::new(payees)))
}

pub async fn get(
    Extension(auth): Extension<BudgetAuth>,
    State(state): State<ServerState>,
    Path(payee_id): Path<Uuid>,
) -> Result<Json<Data<Payee>>, ServerError> {
    let payee = state.engine.payee(&auth, payee_id).await?;
    Ok(Json(Data::new(mapping::payee(payee))))
}
