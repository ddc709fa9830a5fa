//! Budget months API endpoints.
//!
//! `GET /months/{month}` takes either a date (`2022-05-01`, any day of the
//! month) or the id of an existing month.

use api_types::{
    Data,
    month::{Month, MonthCategory, MonthCategoryUpdate, MonthUpdate},
};
use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::NaiveDate;
use engine::{BudgetAuth, EngineError};
use uuid::Uuid;

use crate::{ServerError, mapping, server::ServerState};

fn map_month(month: engine::Month) -> Result<Month, ServerError> {
    let categories = month
        .categories
        .into_iter()
        .map(|row| {
            Ok(MonthCategory {
                id: row.id,
                assigned: mapping::amount_out(row.assigned)?,
                activity: mapping::amount_out(row.activity)?,
                available: mapping::amount_out(row.available)?,
                category_id: row.category_id,
            })
        })
        .collect::<Result<Vec<_>, ServerError>>()?;

    Ok(Month {
        id: month.id,
        date: month.date,
        budgetable: mapping::amount_out(month.budgetable)?,
        carryover: mapping::amount_out(month.carryover)?,
        income: mapping::amount_out(month.income)?,
        assigned: mapping::amount_out(month.assigned)?,
        carried_over: mapping::amount_out(month.carried_over)?,
        categories,
    })
}

fn month_id(raw: &str) -> Result<Uuid, ServerError> {
    Uuid::parse_str(raw).map_err(|_| EngineError::KeyNotFound("month".to_string()).into())
}

pub async fn get(
    Extension(auth): Extension<BudgetAuth>,
    State(state): State<ServerState>,
    Path(month): Path<String>,
) -> Result<Json<Data<Month>>, ServerError> {
    let month = if let Ok(date) = NaiveDate::parse_from_str(&month, "%Y-%m-%d") {
        state.engine.month_for_date(&auth, date).await?
    } else if let Ok(id) = Uuid::parse_str(&month) {
        state.engine.month(&auth, id).await?
    } else {
        return Err(EngineError::Invalid(format!("Invalid month `{month}`.")).into());
    };

    Ok(Json(Data::new(map_month(month)?)))
}

pub async fn update(
    Extension(auth): Extension<BudgetAuth>,
    State(state): State<ServerState>,
    Path(month): Path<String>,
    payload: Result<Json<MonthUpdate>, JsonRejection>,
) -> Result<StatusCode, ServerError> {
    let Json(payload) = payload?;
    let carryover = mapping::optional_amount_in(payload.carryover)?;
    state
        .engine
        .update_month(&auth, month_id(&month)?, carryover)
        .await?;

    Ok(StatusCode::OK)
}

/// Assigns an amount to a category for the month.
pub async fn set_category(
    Extension(auth): Extension<BudgetAuth>,
    State(state): State<ServerState>,
    Path(month): Path<String>,
    payload: Result<Json<MonthCategoryUpdate>, JsonRejection>,
) -> Result<StatusCode, ServerError> {
    let Json(payload) = payload?;
    let amount = mapping::optional_amount_in(payload.amount)?;
    state
        .engine
        .set_category_amount(&auth, month_id(&month)?, payload.category_id, amount)
        .await?;

    Ok(StatusCode::OK)
}
