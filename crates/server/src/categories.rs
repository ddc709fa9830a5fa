//! Categories and category groups API endpoints.

use api_types::{
    Created, Data,
    category::{Category, CategoryGroup, CategoryGroupNew, CategoryNew},
};
use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use engine::BudgetAuth;
use uuid::Uuid;

use crate::{ServerError, mapping, server::ServerState};

fn map_category(category: engine::Category) -> Category {
    Category {
        id: category.id,
        name: category.name,
        group_id: category.group_id,
    }
}

fn map_group(group: engine::CategoryGroup) -> CategoryGroup {
    CategoryGroup {
        id: group.id,
        name: group.name,
        is_income: group.is_income,
        categories: group
            .categories
            .into_iter()
            .map(mapping::associated_category)
            .collect(),
    }
}

pub async fn create(
    Extension(auth): Extension<BudgetAuth>,
    State(state): State<ServerState>,
    payload: Result<Json<CategoryNew>, JsonRejection>,
) -> Result<(StatusCode, Json<Data<Created>>), ServerError> {
    let Json(payload) = payload?;
    let category = state
        .engine
        .create_category(&auth, payload.group_id, &payload.name)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(Data::new(Created { id: category.id })),
    ))
}

pub async fn create_group(
    Extension(auth): Extension<BudgetAuth>,
    State(state): State<ServerState>,
    payload: Result<Json<CategoryGroupNew>, JsonRejection>,
) -> Result<(StatusCode, Json<Data<Created>>), ServerError> {
    let Json(payload) = payload?;
    let group = state
        .engine
        .create_category_group(&auth, &payload.name)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(Data::new(Created { id: group.id })),
    ))
}

/// Every group of the budget with its categories.
pub async fn list(
    Extension(auth): Extension<BudgetAuth>,
    State(state): State<ServerState>,
) -> Result<Json<Data<Vec<CategoryGroup>>>, ServerError> {
    let groups = state
        .engine
        .category_groups(&auth)
        .await?
        .into_iter()
        .map(map_group)
        .collect();

    Ok(Json(Data::new(groups)))
}

pub async fn get(
    Extension(auth): Extension<BudgetAuth>,
    State(state): State<ServerState>,
    Path(category_id): Path<Uuid>,
) -> Result<Json<Data<Category>>, ServerError> {
    let category = state.engine.category(&auth, category_id).await?;
    Ok(Json(Data::new(map_category(category))))
}

pub async fn get_group(
    Extension(auth): Extension<BudgetAuth>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<Data<CategoryGroup>>, ServerError> {
    let group = state.engine.category_group(&auth, group_id).await?;
    Ok(Json(Data::new(map_group(group))))
}
