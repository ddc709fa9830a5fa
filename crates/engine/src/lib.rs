//! Budgeting core: money amounts, transaction variants and the engine that
//! persists budgets, accounts, categories, payees, months and transactions.

pub use accounts::{Account, AccountBalance};
pub use amount::Amount;
pub use budgets::Budget;
pub use categories::Category;
pub use category_groups::CategoryGroup;
pub use error::EngineError;
pub use months::{Month, MonthCategory};
pub use ops::{BudgetAuth, Engine, EngineBuilder, SplitParams, TransactionParams};
pub use payees::Payee;
pub use sessions::{SESSION_TTL_DAYS, Session, SessionStore};
pub use transactions::{Split, Transaction};
pub use users::User;
pub use variant::{TransactionVariant, persisted_variant, resolve_variant};

pub use argon2::Params as PasswordParams;

mod accounts;
mod amount;
mod budget_users;
mod budgets;
mod categories;
mod category_groups;
mod error;
mod month_categories;
mod months;
mod ops;
mod payees;
mod sessions;
mod transactions;
mod users;
mod util;
mod variant;

type ResultEngine<T> = Result<T, EngineError>;
