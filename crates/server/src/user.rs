//! Registration, login and the session cookie.

use api_types::user::{Credentials, User};
use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};

use crate::{
    ServerError,
    server::{CurrentUser, SESSION_COOKIE, ServerState},
};

fn session_cookie(value: String, max_age: time::Duration) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .http_only(true)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(max_age)
        .build()
}

pub async fn register(
    State(state): State<ServerState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<StatusCode, ServerError> {
    let Json(payload) = payload?;
    let user = state
        .engine
        .register(&payload.username, &payload.password)
        .await?;

    tracing::info!(user = %user.id, "user registered");
    Ok(StatusCode::OK)
}

pub async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<(CookieJar, StatusCode), ServerError> {
    let Json(payload) = payload?;
    let (_, session) = state
        .engine
        .login(&payload.username, &payload.password)
        .await?;

    let cookie = session_cookie(
        session.id,
        time::Duration::days(engine::SESSION_TTL_DAYS),
    );
    Ok((jar.add(cookie), StatusCode::OK))
}

pub async fn logout(
    Extension(current): Extension<CurrentUser>,
    State(state): State<ServerState>,
    jar: CookieJar,
) -> (CookieJar, StatusCode) {
    state.engine.logout(&current.session_id).await;
    let expired = session_cookie(String::new(), time::Duration::ZERO);
    (jar.add(expired), StatusCode::OK)
}

pub async fn me(Extension(current): Extension<CurrentUser>) -> Json<User> {
    Json(User {
        id: current.user.id,
        username: current.user.username,
    })
}
