//! HTTP client for the Beans API plus the plain state objects a frontend
//! renders: the transaction form and the session/selection stores.

use api_types::{
    Created, Data, ErrorResponse,
    account::{Account, AccountNew, AccountWithBalance},
    budget::{Budget, BudgetNew},
    category::{Category, CategoryGroup, CategoryGroupNew, CategoryNew},
    month::{Month, MonthCategoryUpdate, MonthUpdate},
    payee::{Payee, PayeeNew},
    transaction::{Split, Transaction, TransactionDelete, TransactionNew, TransactionUpdate},
    user::{Credentials, User},
};
use chrono::NaiveDate;
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

pub use error::{ClientError, Result};

mod error;
pub mod form;
pub mod state;

const BUDGET_ID_HEADER: &str = "Budget-ID";

/// Converts a wire amount into an [`engine::Amount`].
pub fn amount_from_wire(amount: api_types::Amount) -> Result<engine::Amount> {
    engine::Amount::from_parts(amount.coefficient, amount.exponent)
        .map_err(|err| ClientError::Unknown(err.to_string()))
}

/// Currency string of a wire amount, e.g. `{-1061, -2}` gives `-$10.61`.
pub fn format_amount(amount: api_types::Amount) -> Result<String> {
    amount_from_wire(amount).map(engine::Amount::display)
}

/// Session-holding API client.
///
/// The session cookie set by login is kept in the client's own cookie store,
/// so clones share nothing but the underlying connection pool and cookies.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
    budget_id: Option<Uuid>,
}

impl Client {
    /// `base_url` is the server root, e.g. `http://127.0.0.1:8000`.
    pub fn new(base_url: &str) -> Result<Self> {
        let root = Url::parse(base_url)
            .map_err(|err| ClientError::Unknown(format!("invalid base_url: {err}")))?;
        let base_url = root
            .join("api/v1/")
            .map_err(|err| ClientError::Unknown(format!("invalid base_url: {err}")))?;
        let http = reqwest::Client::builder().cookie_store(true).build()?;

        Ok(Self {
            base_url,
            http,
            budget_id: None,
        })
    }

    /// Budget sent in the `Budget-ID` header of budget-scoped calls.
    pub fn select_budget(&mut self, budget_id: Option<Uuid>) {
        self.budget_id = budget_id;
    }

    pub fn budget_id(&self) -> Option<Uuid> {
        self.budget_id
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let endpoint = self
            .base_url
            .join(path)
            .map_err(|err| ClientError::Unknown(format!("invalid endpoint {path}: {err}")))?;

        let builder = self.http.request(method, endpoint);
        Ok(match self.budget_id {
            Some(budget_id) => builder.header(BUDGET_ID_HEADER, budget_id.to_string()),
            None => builder,
        })
    }

    async fn checked(res: Response) -> Result<Response> {
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }

        let message = res.json::<ErrorResponse>().await.ok().map(|err| err.error);
        let err = ClientError::from_response(status, message);
        tracing::debug!("request failed with {status}: {err}");
        Err(err)
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let res = self.request(Method::GET, path)?.send().await?;
        let Data { data } = Self::checked(res).await?.json::<Data<T>>().await?;
        Ok(data)
    }

    async fn create<B: Serialize>(&self, path: &str, body: &B) -> Result<Uuid> {
        let res = self.request(Method::POST, path)?.json(body).send().await?;
        let Data { data: Created { id } } =
            Self::checked(res).await?.json::<Data<Created>>().await?;
        Ok(id)
    }

    async fn submit<B: Serialize>(&self, method: Method, path: &str, body: &B) -> Result<()> {
        let res = self.request(method, path)?.json(body).send().await?;
        Self::checked(res).await?;
        Ok(())
    }

    pub async fn health_check(&self) -> Result<()> {
        let endpoint = self
            .base_url
            .join("/health-check")
            .map_err(|err| ClientError::Unknown(err.to_string()))?;
        let res = self.http.get(endpoint).send().await?;
        Self::checked(res).await?;
        Ok(())
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<()> {
        let credentials = Credentials {
            username: username.to_string(),
            password: password.to_string(),
        };
        self.submit(Method::POST, "user/register", &credentials)
            .await
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        let credentials = Credentials {
            username: username.to_string(),
            password: password.to_string(),
        };
        self.submit(Method::POST, "user/login", &credentials).await
    }

    pub async fn logout(&self) -> Result<()> {
        let res = self.request(Method::POST, "user/logout")?.send().await?;
        Self::checked(res).await?;
        Ok(())
    }

    pub async fn me(&self) -> Result<User> {
        let res = self.request(Method::GET, "user/me")?.send().await?;
        Ok(Self::checked(res).await?.json::<User>().await?)
    }

    pub async fn budgets(&self) -> Result<Vec<Budget>> {
        self.fetch("budgets").await
    }

    pub async fn budget(&self, budget_id: Uuid) -> Result<Budget> {
        self.fetch(&format!("budgets/{budget_id}")).await
    }

    pub async fn create_budget(&self, name: &str) -> Result<Uuid> {
        let body = BudgetNew {
            name: name.to_string(),
        };
        self.create("budgets", &body).await
    }

    pub async fn accounts(&self) -> Result<Vec<AccountWithBalance>> {
        self.fetch("accounts").await
    }

    pub async fn transactable_accounts(&self) -> Result<Vec<Account>> {
        self.fetch("accounts/transactable").await
    }

    pub async fn account(&self, account_id: Uuid) -> Result<Account> {
        self.fetch(&format!("accounts/{account_id}")).await
    }

    pub async fn create_account(&self, name: &str, off_budget: bool) -> Result<Uuid> {
        let body = AccountNew {
            name: name.to_string(),
            off_budget,
        };
        self.create("accounts", &body).await
    }

    pub async fn category_groups(&self) -> Result<Vec<CategoryGroup>> {
        self.fetch("categories").await
    }

    pub async fn category(&self, category_id: Uuid) -> Result<Category> {
        self.fetch(&format!("categories/{category_id}")).await
    }

    pub async fn category_group(&self, group_id: Uuid) -> Result<CategoryGroup> {
        self.fetch(&format!("categories/groups/{group_id}")).await
    }

    pub async fn create_category(&self, group_id: Uuid, name: &str) -> Result<Uuid> {
        let body = CategoryNew {
            group_id: Some(group_id),
            name: name.to_string(),
        };
        self.create("categories", &body).await
    }

    pub async fn create_category_group(&self, name: &str) -> Result<Uuid> {
        let body = CategoryGroupNew {
            name: name.to_string(),
        };
        self.create("categories/groups", &body).await
    }

    pub async fn payees(&self) -> Result<Vec<Payee>> {
        self.fetch("payees").await
    }

    pub async fn payee(&self, payee_id: Uuid) -> Result<Payee> {
        self.fetch(&format!("payees/{payee_id}")).await
    }

    pub async fn create_payee(&self, name: &str) -> Result<Uuid> {
        let body = PayeeNew {
            name: name.to_string(),
        };
        self.create("payees", &body).await
    }

    /// Month containing `date`, created on first access.
    pub async fn month_for_date(&self, date: NaiveDate) -> Result<Month> {
        self.fetch(&format!("months/{}", date.format("%Y-%m-%d")))
            .await
    }

    pub async fn month(&self, month_id: Uuid) -> Result<Month> {
        self.fetch(&format!("months/{month_id}")).await
    }

    pub async fn update_month(&self, month_id: Uuid, carryover: api_types::Amount) -> Result<()> {
        let body = MonthUpdate {
            carryover: Some(carryover),
        };
        self.submit(Method::PUT, &format!("months/{month_id}"), &body)
            .await
    }

    pub async fn set_category_amount(
        &self,
        month_id: Uuid,
        category_id: Uuid,
        amount: api_types::Amount,
    ) -> Result<()> {
        let body = MonthCategoryUpdate {
            category_id: Some(category_id),
            amount: Some(amount),
        };
        self.submit(Method::POST, &format!("months/{month_id}/categories"), &body)
            .await
    }

    pub async fn transactions(&self) -> Result<Vec<Transaction>> {
        self.fetch("transactions").await
    }

    pub async fn transaction(&self, transaction_id: Uuid) -> Result<Transaction> {
        self.fetch(&format!("transactions/{transaction_id}")).await
    }

    pub async fn splits(&self, transaction_id: Uuid) -> Result<Vec<Split>> {
        self.fetch(&format!("transactions/{transaction_id}/splits"))
            .await
    }

    pub async fn create_transaction(&self, body: &TransactionNew) -> Result<Uuid> {
        self.create("transactions", body).await
    }

    pub async fn update_transaction(
        &self,
        transaction_id: Uuid,
        body: &TransactionUpdate,
    ) -> Result<()> {
        self.submit(Method::PUT, &format!("transactions/{transaction_id}"), body)
            .await
    }

    pub async fn delete_transactions(&self, ids: &[Uuid]) -> Result<()> {
        let body = TransactionDelete { ids: ids.to_vec() };
        self.submit(Method::POST, "transactions/delete", &body)
            .await
    }
}
