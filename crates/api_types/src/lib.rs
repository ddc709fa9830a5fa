use std::{fmt, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, de};
use uuid::Uuid;

/// Success envelope used by every endpoint that returns a body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Data<T> {
    pub data: T,
}

impl<T> Data<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Returned by every create endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Created {
    pub id: Uuid,
}

/// Error envelope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default)]
    pub code: String,
}

/// Decimal amount on the wire: `coefficient * 10^exponent`.
///
/// Always serialized as `{"coefficient": .., "exponent": ..}`. Deserialization
/// also accepts a decimal string (`"10.78"`) or a JSON number (`10.78`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Amount {
    pub coefficient: i64,
    pub exponent: i32,
}

/// Error returned when a decimal string can not be read as an [`Amount`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseAmountError(String);

impl fmt::Display for ParseAmountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid amount: {}", self.0)
    }
}

impl std::error::Error for ParseAmountError {}

impl Amount {
    pub const fn new(coefficient: i64, exponent: i32) -> Self {
        Self {
            coefficient,
            exponent,
        }
    }
}

impl FromStr for Amount {
    type Err = ParseAmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let value =
            Decimal::from_str_exact(trimmed).map_err(|_| ParseAmountError(trimmed.to_string()))?;
        let coefficient = i64::try_from(value.mantissa())
            .map_err(|_| ParseAmountError(trimmed.to_string()))?;
        let exponent = -i32::try_from(value.scale())
            .map_err(|_| ParseAmountError(trimmed.to_string()))?;
        Ok(Self::new(coefficient, exponent))
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Parts { coefficient: i64, exponent: i32 },
            Text(String),
            Number(f64),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Parts {
                coefficient,
                exponent,
            } => Ok(Amount::new(coefficient, exponent)),
            Repr::Text(text) => text.parse().map_err(de::Error::custom),
            Repr::Number(number) => number.to_string().parse().map_err(de::Error::custom),
        }
    }
}

pub mod user {
    use super::*;

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct Credentials {
        #[serde(default)]
        pub username: String,
        #[serde(default)]
        pub password: String,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct User {
        pub id: Uuid,
        pub username: String,
    }
}

pub mod budget {
    use super::*;

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct BudgetNew {
        #[serde(default)]
        pub name: String,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Budget {
        pub id: Uuid,
        pub name: String,
    }
}

pub mod account {
    use super::*;

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AccountNew {
        #[serde(default)]
        pub name: String,
        #[serde(default)]
        pub off_budget: bool,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Account {
        pub id: Uuid,
        pub name: String,
        pub off_budget: bool,
    }

    /// Account row of the accounts list, with its running balance.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AccountWithBalance {
        pub id: Uuid,
        pub name: String,
        pub balance: Amount,
        pub off_budget: bool,
    }
}

pub mod category {
    use super::*;

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub group_id: Option<Uuid>,
        #[serde(default)]
        pub name: String,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct CategoryGroupNew {
        #[serde(default)]
        pub name: String,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct AssociatedCategory {
        pub id: Uuid,
        pub name: String,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Category {
        pub id: Uuid,
        pub name: String,
        pub group_id: Uuid,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CategoryGroup {
        pub id: Uuid,
        pub name: String,
        pub is_income: bool,
        pub categories: Vec<AssociatedCategory>,
    }
}

pub mod payee {
    use super::*;

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct PayeeNew {
        #[serde(default)]
        pub name: String,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Payee {
        pub id: Uuid,
        pub name: String,
    }
}

pub mod month {
    use chrono::NaiveDate;

    use super::*;

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct MonthUpdate {
        pub carryover: Option<Amount>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct MonthCategoryUpdate {
        pub category_id: Option<Uuid>,
        pub amount: Option<Amount>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct MonthCategory {
        pub id: Uuid,
        pub assigned: Amount,
        pub activity: Amount,
        pub available: Amount,
        pub category_id: Uuid,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Month {
        pub id: Uuid,
        pub date: NaiveDate,
        pub budgetable: Amount,
        pub carryover: Amount,
        pub income: Amount,
        pub assigned: Amount,
        pub carried_over: Amount,
        pub categories: Vec<MonthCategory>,
    }
}

pub mod transaction {
    use chrono::NaiveDate;

    use super::*;
    use crate::{account::Account, category::AssociatedCategory, payee::Payee};

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionVariant {
        Standard,
        OffBudget,
        Transfer,
        Split,
    }

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct SplitNew {
        pub category_id: Option<Uuid>,
        pub amount: Option<Amount>,
        pub notes: Option<String>,
    }

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub account_id: Option<Uuid>,
        pub category_id: Option<Uuid>,
        pub payee_id: Option<Uuid>,
        pub amount: Option<Amount>,
        pub date: Option<NaiveDate>,
        pub notes: Option<String>,
        #[serde(default)]
        pub splits: Vec<SplitNew>,
        #[serde(rename = "transferAccountID")]
        pub transfer_account_id: Option<Uuid>,
    }

    /// Update payload. The transfer side of a row can not be changed once created.
    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct TransactionUpdate {
        pub account_id: Option<Uuid>,
        pub category_id: Option<Uuid>,
        pub payee_id: Option<Uuid>,
        pub amount: Option<Amount>,
        pub date: Option<NaiveDate>,
        pub notes: Option<String>,
        #[serde(default)]
        pub splits: Vec<SplitNew>,
    }

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct TransactionDelete {
        #[serde(default)]
        pub ids: Vec<Uuid>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Transaction {
        pub id: Uuid,
        pub variant: TransactionVariant,
        pub account: Account,
        pub category: Option<AssociatedCategory>,
        pub payee: Option<Payee>,
        pub amount: Amount,
        pub date: NaiveDate,
        pub notes: Option<String>,
        #[serde(rename = "transferID")]
        pub transfer_id: Option<Uuid>,
        pub transfer_account: Option<Account>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Split {
        pub id: Uuid,
        pub category: AssociatedCategory,
        pub amount: Amount,
        pub notes: Option<String>,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use transaction::{TransactionNew, TransactionVariant};

    #[test]
    fn amount_serializes_as_parts() {
        let json = serde_json::to_value(Amount::new(-1061, -2)).unwrap();
        assert_eq!(json, serde_json::json!({"coefficient": -1061, "exponent": -2}));
    }

    #[test]
    fn amount_accepts_string_and_number() {
        let from_text: Amount = serde_json::from_str("\"10.78\"").unwrap();
        assert_eq!(from_text, Amount::new(1078, -2));

        let from_number: Amount = serde_json::from_str("10.5").unwrap();
        assert_eq!(from_number, Amount::new(105, -1));

        let from_int: Amount = serde_json::from_str("7").unwrap();
        assert_eq!(from_int, Amount::new(7, 0));
    }

    #[test]
    fn amount_rejects_garbage() {
        assert!(serde_json::from_str::<Amount>("\"ten\"").is_err());
        assert!("1.2.3".parse::<Amount>().is_err());
    }

    #[test]
    fn transaction_new_uses_wire_names() {
        let payload: TransactionNew = serde_json::from_value(serde_json::json!({
            "account_id": "6f0b3a3e-8a43-4b7a-9c79-4a0c8f2f3f0a",
            "amount": "10.78",
            "date": "2022-10-14",
            "transferAccountID": "9a4c3c1e-1e0a-4c8f-8a43-4b7a9c794a0c",
        }))
        .unwrap();

        assert!(payload.account_id.is_some());
        assert!(payload.transfer_account_id.is_some());
        assert!(payload.splits.is_empty());
        assert_eq!(payload.amount, Some(Amount::new(1078, -2)));
    }

    #[test]
    fn variant_is_snake_case() {
        let json = serde_json::to_string(&TransactionVariant::OffBudget).unwrap();
        assert_eq!(json, "\"off_budget\"");
    }
}
