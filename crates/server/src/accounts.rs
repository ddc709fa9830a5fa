//! Accounts API endpoints.

use api_types::{
    Created, Data,
    account::{Account, AccountNew, AccountWithBalance},
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
    payload: Result<Json<AccountNew>, JsonRejection>,
) -> Result<(StatusCode, Json<Data<Created>>), ServerError> {
    let Json(payload) = payload?;
    let account = state
        .engine
        .create_account(&auth, &payload.name, payload.off_budget)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(Data::new(Created { id: account.id })),
    ))
}

pub async fn list(
    Extension(auth): Extension<BudgetAuth>,
    State(state): State<ServerState>,
) -> Result<Json<Data<Vec<AccountWithBalance>>>, ServerError> {
    let accounts = state
        .engine
        .accounts(&auth)
        .await?
        .into_iter()
        .map(|row| {
            Ok(AccountWithBalance {
                id: row.account.id,
                name: row.account.name,
                balance: mapping::amount_out(row.balance)?,
                off_budget: row.account.off_budget,
            })
        })
        .collect::<Result<Vec<_>, ServerError>>()?;

    Ok(Json(Data::new(accounts)))
}

pub async fn transactable(
    Extension(auth): Extension<BudgetAuth>,
    State(state): State<ServerState>,
) -> Result<Json<Data<Vec<Account>>>, ServerError> {
    let accounts = state
        .engine
        .transactable_accounts(&auth)
        .await?
        .into_iter()
        .map(mapping::account)
        .collect();

    Ok(Json(Data::new(accounts)))
}

pub async fn get(
    Extension(auth): Extension<BudgetAuth>,
    State(state): State<ServerState>,
    Path(account_id): Path<Uuid>,
) -> Result<Json<Data<Account>>, ServerError> {
    let account = state.engine.account(&auth, account_id).await?;
    Ok(Json(Data::new(mapping::account(account))))
}
