//! Transactions API endpoints

use api_types::{
    Created, Data,
    transaction::{
        Split, SplitNew, Transaction, TransactionDelete, TransactionNew, TransactionUpdate,
    },
};
use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use engine::{BudgetAuth, SplitParams, TransactionParams};
use uuid::Uuid;

use crate::{ServerError, mapping, server::ServerState};

fn map_transaction(tx: engine::Transaction) -> Result<Transaction, ServerError> {
    Ok(Transaction {
        id: tx.id,
        variant: mapping::variant(tx.variant),
        account: mapping::account(tx.account),
        category: tx.category.map(mapping::associated_category),
        payee: tx.payee.map(mapping::payee),
        amount: mapping::amount_out(tx.amount)?,
        date: tx.date,
        notes: tx.notes,
        transfer_id: tx.transfer_id,
        transfer_account: tx.transfer_account.map(mapping::account),
    })
}

fn map_split(split: engine::Split) -> Result<Split, ServerError> {
    Ok(Split {
        id: split.id,
        category: mapping::associated_category(split.category),
        amount: mapping::amount_out(split.amount)?,
        notes: split.notes,
    })
}

fn split_params(splits: Vec<SplitNew>) -> Result<Vec<SplitParams>, ServerError> {
    splits
        .into_iter()
        .map(|split| {
            Ok(SplitParams {
                category_id: split.category_id,
                amount: mapping::optional_amount_in(split.amount)?,
                notes: split.notes,
            })
        })
        .collect()
}

fn params_from_new(payload: TransactionNew) -> Result<TransactionParams, ServerError> {
    Ok(TransactionParams {
        account_id: payload.account_id,
        category_id: payload.category_id,
        payee_id: payload.payee_id,
        amount: mapping::optional_amount_in(payload.amount)?,
        date: payload.date,
        notes: payload.notes,
        splits: split_params(payload.splits)?,
        transfer_account_id: payload.transfer_account_id,
    })
}

/// The other side of a transfer is fixed at creation.
fn params_from_update(payload: TransactionUpdate) -> Result<TransactionParams, ServerError> {
    Ok(TransactionParams {
        account_id: payload.account_id,
        category_id: payload.category_id,
        payee_id: payload.payee_id,
        amount: mapping::optional_amount_in(payload.amount)?,
        date: payload.date,
        notes: payload.notes,
        splits: split_params(payload.splits)?,
        transfer_account_id: None,
    })
}

pub async fn create(
    Extension(auth): Extension<BudgetAuth>,
    State(state): State<ServerState>,
    payload: Result<Json<TransactionNew>, JsonRejection>,
) -> Result<(StatusCode, Json<Data<Created>>), ServerError> {
    let Json(payload) = payload?;
    let params = params_from_new(payload)?;
    let id = state.engine.create_transaction(&auth, params).await?;

    Ok((StatusCode::CREATED, Json(Data::new(Created { id }))))
}

pub async fn update(
    Extension(auth): Extension<BudgetAuth>,
    State(state): State<ServerState>,
    Path(transaction_id): Path<Uuid>,
    payload: Result<Json<TransactionUpdate>, JsonRejection>,
) -> Result<StatusCode, ServerError> {
    let Json(payload) = payload?;
    let params = params_from_update(payload)?;
    state
        .engine
        .update_transaction(&auth, transaction_id, params)
        .await?;

    Ok(StatusCode::OK)
}

pub async fn delete(
    Extension(auth): Extension<BudgetAuth>,
    State(state): State<ServerState>,
    payload: Result<Json<TransactionDelete>, JsonRejection>,
) -> Result<StatusCode, ServerError> {
    let Json(payload) = payload?;
    state
        .engine
        .delete_transactions(&auth, &payload.ids)
        .await?;

    Ok(StatusCode::OK)
}

/// Top-level transactions of the budget, newest first.
pub async fn list(
    Extension(auth): Extension<BudgetAuth>,
    State(state): State<ServerState>,
) -> Result<Json<Data<Vec<Transaction>>>, ServerError> {
    let transactions = state
        .engine
        .transactions(&auth)
        .await?
        .into_iter()
        .map(map_transaction)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(Data::new(transactions)))
}

pub async fn get(
    Extension(auth): Extension<BudgetAuth>,
    State(state): State<ServerState>,
    Path(transaction_id): Path<Uuid>,
) -> Result<Json<Data<Transaction>>, ServerError> {
    let transaction = state.engine.transaction(&auth, transaction_id).await?;
    Ok(Json(Data::new(map_transaction(transaction)?)))
}

pub async fn splits(
    Extension(auth): Extension<BudgetAuth>,
    State(state): State<ServerState>,
    Path(transaction_id): Path<Uuid>,
) -> Result<Json<Data<Vec<Split>>>, ServerError> {
    let splits = state
        .engine
        .splits(&auth, transaction_id)
        .await?
        .into_iter()
        .map(map_split)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(Data::new(splits)))
}
