use argon2::Params;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::{ResultEngine, SessionStore};

mod access;
mod accounts;
mod budgets;
mod categories;
mod months;
mod payees;
mod transactions;
mod users;

pub use access::BudgetAuth;
pub use transactions::{SplitParams, TransactionParams};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Budgeting engine: every read and write of budget data goes through here.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    sessions: SessionStore,
    password_params: Params,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Login sessions handed out by [`Engine::login`].
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }
}

fn new_id() -> Uuid {
    Uuid::new_v4()
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    password_params: Option<Params>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Override the argon2 cost parameters used for new password hashes.
    pub fn password_params(mut self, params: Params) -> EngineBuilder {
        self.password_params = Some(params);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            sessions: SessionStore::default(),
            password_params: self.password_params.unwrap_or_default(),
        })
    }
}
