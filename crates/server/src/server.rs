use axum::{
    Extension, Router,
    extract::{Request, State},
    http::{HeaderName, HeaderValue},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    extract::CookieJar,
    headers::{Error as HeaderError, Header},
};
use engine::{Engine, EngineError, User};
use uuid::Uuid;

use std::sync::Arc;

use crate::{ServerError, accounts, budgets, categories, months, payees, transactions, user};

/// Name of the cookie carrying the session id.
pub const SESSION_COOKIE: &str = "session_id";

static BUDGET_ID_HEADER: HeaderName = HeaderName::from_static("budget-id");

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// The logged-in user of a request, set by [`authenticate`].
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub user: User,
    pub session_id: String,
}

/// `TypedHeader` for the budget a request works on.
///
/// Budget-scoped requests must contain a "Budget-ID" entry in the header.
#[derive(Debug)]
struct BudgetIdHeader(Uuid);

impl Header for BudgetIdHeader {
    fn name() -> &'static HeaderName {
        &BUDGET_ID_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, HeaderError>
    where
        Self: Sized,
        I: Iterator<Item = &'i HeaderValue>,
    {
        let value = values.next().ok_or_else(HeaderError::invalid)?;
        let Ok(value) = value.to_str() else {
            return Err(HeaderError::invalid());
        };
        let Ok(value) = Uuid::parse_str(value.trim()) else {
            return Err(HeaderError::invalid());
        };

        Ok(BudgetIdHeader(value))
    }

    fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
        match HeaderValue::from_str(&self.0.to_string()) {
            Ok(value) => values.extend(std::iter::once(value)),
            Err(_) => tracing::error!("failed to encode budget-id header"),
        }
    }
}

async fn authenticate(
    jar: CookieJar,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let session_id = jar
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| EngineError::Unauthorized("Not authenticated".to_string()))?;

    let user = state.engine.user_for_session(&session_id).await?;

    request
        .extensions_mut()
        .insert(CurrentUser { user, session_id });
    Ok(next.run(request).await)
}

/// Resolves the "Budget-ID" header to a [`engine::BudgetAuth`].
///
/// A missing or malformed header and a budget the user is not a member of
/// all answer 404.
async fn budget_scope(
    Extension(current): Extension<CurrentUser>,
    budget_header: Option<TypedHeader<BudgetIdHeader>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let TypedHeader(BudgetIdHeader(budget_id)) =
        budget_header.ok_or_else(|| EngineError::KeyNotFound("budget".to_string()))?;

    let auth = state.engine.budget_auth(current.user.id, budget_id).await?;

    request.extensions_mut().insert(auth);
    Ok(next.run(request).await)
}

async fn health_check() -> &'static str {
    "ok"
}

pub(crate) fn router(state: ServerState) -> Router {
    let budget_scoped = Router::new()
        .route("/accounts", get(accounts::list).post(accounts::create))
        .route("/accounts/transactable", get(accounts::transactable))
        .route("/accounts/{account_id}", get(accounts::get))
        .route("/categories", get(categories::list).post(categories::create))
        .route("/categories/groups", post(categories::create_group))
        .route("/categories/groups/{group_id}", get(categories::get_group))
        .route("/categories/{category_id}", get(categories::get))
        .route("/payees", get(payees::list).post(payees::create))
        .route("/payees/{payee_id}", get(payees::get))
        .route("/months/{month}", get(months::get).put(months::update))
        .route("/months/{month}/categories", post(months::set_category))
        .route(
            "/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route("/transactions/delete", post(transactions::delete))
        .route(
            "/transactions/{transaction_id}",
            get(transactions::get).put(transactions::update),
        )
        .route(
            "/transactions/{transaction_id}/splits",
            get(transactions::splits),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), budget_scope));

    let authenticated = Router::new()
        .route("/user/me", get(user::me))
        .route("/user/logout", post(user::logout))
        .route("/budgets", get(budgets::list).post(budgets::create))
        .route("/budgets/{budget_id}", get(budgets::get))
        .merge(budget_scoped)
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate));

    let api = Router::new()
        .route("/user/register", post(user::register))
        .route("/user/login", post(user::login))
        .merge(authenticated);

    Router::new()
        .route("/health-check", get(health_check))
        .nest("/api/v1", api)
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Method, StatusCode, header},
    };
    use http_body_util::BodyExt;
    use migration::MigratorTrait;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;

    async fn test_router() -> Router {
        let db = sea_orm::Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        let engine = Engine::builder()
            .database(db)
            .password_params(engine::PasswordParams::new(8, 1, 1, None).unwrap())
            .build()
            .await
            .unwrap();
        router(ServerState {
            engine: Arc::new(engine),
        })
    }

    async fn send(
        router: &Router,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        budget: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Option<String>, Value) {
        let mut builder = axum::http::Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        if let Some(budget) = budget {
            builder = builder.header("Budget-ID", budget);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .map(|value| value.to_str().unwrap().to_string());
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, set_cookie, json)
    }

    /// Registers and logs in `alice`, returning the cookie header value.
    async fn login(router: &Router) -> String {
        let credentials = json!({"username": "alice", "password": "password"});
        let (status, _, _) = send(
            router,
            Method::POST,
            "/api/v1/user/register",
            None,
            None,
            Some(credentials.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, set_cookie, _) = send(
            router,
            Method::POST,
            "/api/v1/user/login",
            None,
            None,
            Some(credentials),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let set_cookie = set_cookie.unwrap();
        assert!(set_cookie.contains("HttpOnly"));
        assert!(set_cookie.contains("SameSite=Strict"));
        set_cookie.split(';').next().unwrap().to_string()
    }

    async fn create_budget(router: &Router, cookie: &str) -> String {
        let (status, _, body) = send(
            router,
            Method::POST,
            "/api/v1/budgets",
            Some(cookie),
            None,
            Some(json!({"name": "Home"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["data"]["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn health_check_is_public() {
        let router = test_router().await;
        let (status, _, _) = send(&router, Method::GET, "/health-check", None, None, None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn requests_without_session_are_rejected() {
        let router = test_router().await;
        let (status, _, body) =
            send(&router, Method::GET, "/api/v1/budgets", None, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "unauthorized");

        let (status, _, _) = send(
            &router,
            Method::GET,
            "/api/v1/user/me",
            Some("session_id=forged"),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn login_session_reaches_me_until_logout() {
        let router = test_router().await;
        let cookie = login(&router).await;

        let (status, _, body) =
            send(&router, Method::GET, "/api/v1/user/me", Some(&cookie), None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "alice");

        let (status, set_cookie, _) = send(
            &router,
            Method::POST,
            "/api/v1/user/logout",
            Some(&cookie),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(set_cookie.unwrap().contains("Max-Age=0"));

        let (status, _, _) =
            send(&router, Method::GET, "/api/v1/user/me", Some(&cookie), None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let router = test_router().await;
        login(&router).await;
        let (status, _, body) = send(
            &router,
            Method::POST,
            "/api/v1/user/login",
            None,
            None,
            Some(json!({"username": "alice", "password": "nope"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid username or password");
    }

    #[tokio::test]
    async fn budget_header_is_required() {
        let router = test_router().await;
        let cookie = login(&router).await;
        create_budget(&router, &cookie).await;

        let (status, _, body) =
            send(&router, Method::GET, "/api/v1/accounts", Some(&cookie), None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "not_found");

        let (status, _, _) = send(
            &router,
            Method::GET,
            "/api/v1/accounts",
            Some(&cookie),
            Some(&Uuid::new_v4().to_string()),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_json_is_400() {
        let router = test_router().await;
        let request = axum::http::Request::builder()
            .method(Method::POST)
            .uri("/api/v1/user/register")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"username\": "))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], "unprocessable");
    }

    #[tokio::test]
    async fn transaction_round_trip_over_http() {
        let router = test_router().await;
        let cookie = login(&router).await;
        let budget = create_budget(&router, &cookie).await;
        let budget = Some(budget.as_str());

        let (status, _, body) = send(
            &router,
            Method::POST,
            "/api/v1/accounts",
            Some(&cookie),
            budget,
            Some(json!({"name": "Checking", "offBudget": false})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let account_id = body["data"]["id"].as_str().unwrap().to_string();

        let (status, _, body) = send(
            &router,
            Method::POST,
            "/api/v1/transactions",
            Some(&cookie),
            budget,
            Some(json!({
                "account_id": account_id,
                "amount": "10.78",
                "date": "2022-10-14",
                "notes": "Test notes",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let transaction_id = body["data"]["id"].as_str().unwrap().to_string();

        let (status, _, body) = send(
            &router,
            Method::GET,
            "/api/v1/transactions",
            Some(&cookie),
            budget,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let row = &body["data"][0];
        assert_eq!(row["id"], transaction_id.as_str());
        assert_eq!(row["variant"], "standard");
        assert_eq!(row["account"]["name"], "Checking");
        assert_eq!(row["amount"], json!({"coefficient": 1078, "exponent": -2}));
        assert_eq!(row["date"], "2022-10-14");
        assert_eq!(row["transferID"], Value::Null);

        let (status, _, body) = send(
            &router,
            Method::GET,
            "/api/v1/accounts",
            Some(&cookie),
            budget,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["data"][0]["balance"],
            json!({"coefficient": 1078, "exponent": -2})
        );

        let (status, _, body) = send(
            &router,
            Method::POST,
            "/api/v1/transactions",
            Some(&cookie),
            budget,
            Some(json!({"account_id": account_id, "amount": {"coefficient": 1001, "exponent": -3}, "date": "2022-10-14"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "Amount must have at most 2 decimal points.");

        let (status, _, _) = send(
            &router,
            Method::POST,
            "/api/v1/transactions/delete",
            Some(&cookie),
            budget,
            Some(json!({"ids": [transaction_id]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, _, body) = send(
            &router,
            Method::GET,
            "/api/v1/transactions",
            Some(&cookie),
            budget,
            None,
        )
        .await;
        assert_eq!(body["data"], json!([]));
    }

    #[tokio::test]
    async fn months_by_date_and_id() {
        let router = test_router().await;
        let cookie = login(&router).await;
        let budget = create_budget(&router, &cookie).await;
        let budget = Some(budget.as_str());

        let (status, _, body) = send(
            &router,
            Method::GET,
            "/api/v1/months/2022-05-17",
            Some(&cookie),
            budget,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["date"], "2022-05-01");
        let month_id = body["data"]["id"].as_str().unwrap().to_string();

        let (status, _, _) = send(
            &router,
            Method::PUT,
            &format!("/api/v1/months/{month_id}"),
            Some(&cookie),
            budget,
            Some(json!({"carryover": "12.5"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _, body) = send(
            &router,
            Method::GET,
            &format!("/api/v1/months/{month_id}"),
            Some(&cookie),
            budget,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["data"]["carryover"],
            json!({"coefficient": 1250, "exponent": -2})
        );
        assert_eq!(
            body["data"]["budgetable"],
            json!({"coefficient": -1250, "exponent": -2})
        );
    }
}
