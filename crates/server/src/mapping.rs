//! Conversions between engine values and their wire representation.

use api_types::{
    account::Account, category::AssociatedCategory, payee::Payee,
    transaction::TransactionVariant as ApiVariant,
};

use crate::ServerError;

/// Amounts leave the server in cents: `{"coefficient": cents, "exponent": -2}`.
pub fn amount_out(amount: engine::Amount) -> Result<api_types::Amount, ServerError> {
    Ok(api_types::Amount::new(amount.to_minor()?, -2))
}

pub fn amount_in(amount: api_types::Amount) -> Result<engine::Amount, ServerError> {
    Ok(engine::Amount::from_parts(
        amount.coefficient,
        amount.exponent,
    )?)
}

pub fn optional_amount_in(
    amount: Option<api_types::Amount>,
) -> Result<Option<engine::Amount>, ServerError> {
    amount.map(amount_in).transpose()
}

pub fn account(account: engine::Account) -> Account {
    Account {
        id: account.id,
        name: account.name,
        off_budget: account.off_budget,
    }
}

pub fn associated_category(category: engine::Category) -> AssociatedCategory {
    AssociatedCategory {
        id: category.id,
        name: category.name,
    }
}

pub fn payee(payee: engine::Payee) -> Payee {
    Payee {
        id: payee.id,
        name: payee.name,
    }
}

pub fn variant(variant: engine::TransactionVariant) -> ApiVariant {
    match variant {
        engine::TransactionVariant::Standard => ApiVariant::Standard,
        engine::TransactionVariant::OffBudget => ApiVariant::OffBudget,
        engine::TransactionVariant::Transfer => ApiVariant::Transfer,
        engine::TransactionVariant::Split => ApiVariant::Split,
    }
}
