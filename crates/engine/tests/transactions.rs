use chrono::NaiveDate;
use sea_orm::{Database, DatabaseConnection};

use engine::{
    Account, Amount, BudgetAuth, Category, Engine, EngineError, PasswordParams, SplitParams,
    TransactionParams, TransactionVariant,
};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .password_params(PasswordParams::new(8, 1, 1, None).unwrap())
        .build()
        .await
        .unwrap();
    (engine, db)
}

struct Fixture {
    engine: Engine,
    auth: BudgetAuth,
    checking: Account,
    savings: Account,
    house: Account,
    electric: Category,
    water: Category,
}

async fn fixture() -> Fixture {
    let (engine, _db) = engine_with_db().await;
    let user = engine.register("alice", "password").await.unwrap();
    let budget = engine.create_budget(user.id, "Home").await.unwrap();
    let auth = engine.budget_auth(user.id, budget.id).await.unwrap();

    let checking = engine.create_account(&auth, "Checking", false).await.unwrap();
    let savings = engine.create_account(&auth, "Savings", false).await.unwrap();
    let house = engine.create_account(&auth, "House", true).await.unwrap();

    let bills = engine.create_category_group(&auth, "Bills").await.unwrap();
    let electric = engine
        .create_category(&auth, Some(bills.id), "Electric")
        .await
        .unwrap();
    let water = engine
        .create_category(&auth, Some(bills.id), "Water")
        .await
        .unwrap();

    Fixture {
        engine,
        auth,
        checking,
        savings,
        house,
        electric,
        water,
    }
}

fn amount(text: &str) -> Amount {
    text.parse().unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn params(account: &Account, value: &str) -> TransactionParams {
    TransactionParams {
        account_id: Some(account.id),
        amount: Some(amount(value)),
        date: Some(date(2022, 10, 14)),
        ..TransactionParams::default()
    }
}

#[tokio::test]
async fn standard_transaction_is_listed_once() {
    let f = fixture().await;

    let id = f
        .engine
        .create_transaction(
            &f.auth,
            TransactionParams {
                category_id: Some(f.electric.id),
                notes: Some("Test notes".to_string()),
                ..params(&f.checking, "10.78")
            },
        )
        .await
        .unwrap();

    let list = f.engine.transactions(&f.auth).await.unwrap();
    assert_eq!(list.len(), 1);
    let tx = &list[0];
    assert_eq!(tx.id, id);
    assert_eq!(tx.variant, TransactionVariant::Standard);
    assert_eq!(tx.account, f.checking);
    assert_eq!(tx.category.as_ref().map(|c| c.name.as_str()), Some("Electric"));
    assert_eq!(tx.amount.display(), "$10.78");
    assert_eq!(tx.date, date(2022, 10, 14));
    assert_eq!(tx.notes.as_deref(), Some("Test notes"));
    assert!(tx.transfer_account.is_none());
}

#[tokio::test]
async fn transfer_creates_mirrored_rows() {
    let f = fixture().await;

    let id = f
        .engine
        .create_transaction(
            &f.auth,
            TransactionParams {
                transfer_account_id: Some(f.checking.id),
                ..params(&f.savings, "-10.78")
            },
        )
        .await
        .unwrap();

    let list = f.engine.transactions(&f.auth).await.unwrap();
    assert_eq!(list.len(), 2);
    assert!(list.iter().all(|tx| tx.variant == TransactionVariant::Transfer));

    let savings_side = list.iter().find(|tx| tx.id == id).unwrap();
    let checking_side = list.iter().find(|tx| tx.id != id).unwrap();
    assert_eq!(savings_side.amount.display(), "-$10.78");
    assert_eq!(checking_side.amount.display(), "$10.78");
    assert_eq!(savings_side.transfer_account.as_ref(), Some(&f.checking));
    assert_eq!(checking_side.transfer_account.as_ref(), Some(&f.savings));
    assert_eq!(savings_side.transfer_id, Some(checking_side.id));
    assert_eq!(checking_side.transfer_id, Some(savings_side.id));
    assert!(checking_side.category.is_none());
}

#[tokio::test]
async fn updating_a_transfer_updates_the_mirror() {
    let f = fixture().await;
    let id = f
        .engine
        .create_transaction(
            &f.auth,
            TransactionParams {
                transfer_account_id: Some(f.savings.id),
                ..params(&f.checking, "25")
            },
        )
        .await
        .unwrap();

    f.engine
        .update_transaction(
            &f.auth,
            id,
            TransactionParams {
                date: Some(date(2022, 11, 2)),
                notes: Some("moved".to_string()),
                ..params(&f.checking, "30.50")
            },
        )
        .await
        .unwrap();

    let tx = f.engine.transaction(&f.auth, id).await.unwrap();
    let mirror = f
        .engine
        .transaction(&f.auth, tx.transfer_id.unwrap())
        .await
        .unwrap();
    assert_eq!(mirror.account, f.savings);
    assert_eq!(mirror.amount, amount("-30.50"));
    assert_eq!(mirror.date, date(2022, 11, 2));
    assert_eq!(mirror.notes.as_deref(), Some("moved"));
}

#[tokio::test]
async fn transfer_rejects_payee_category_and_self() {
    let f = fixture().await;
    let payee = f.engine.create_payee(&f.auth, "Power Co").await.unwrap();

    let with_payee = f
        .engine
        .create_transaction(
            &f.auth,
            TransactionParams {
                transfer_account_id: Some(f.savings.id),
                payee_id: Some(payee.id),
                ..params(&f.checking, "5")
            },
        )
        .await;
    assert_eq!(
        with_payee,
        Err(EngineError::Invalid("cannot set a payee on transfer".to_string()))
    );

    let with_category = f
        .engine
        .create_transaction(
            &f.auth,
            TransactionParams {
                transfer_account_id: Some(f.savings.id),
                category_id: Some(f.electric.id),
                ..params(&f.checking, "5")
            },
        )
        .await;
    assert_eq!(
        with_category,
        Err(EngineError::Invalid(
            "category can only be set on standard transaction".to_string()
        ))
    );

    let to_self = f
        .engine
        .create_transaction(
            &f.auth,
            TransactionParams {
                transfer_account_id: Some(f.checking.id),
                ..params(&f.checking, "5")
            },
        )
        .await;
    assert_eq!(
        to_self,
        Err(EngineError::Invalid("Invalid Transfer Account".to_string()))
    );
}

#[tokio::test]
async fn transfer_into_off_budget_keeps_category() {
    let f = fixture().await;
    let id = f
        .engine
        .create_transaction(
            &f.auth,
            TransactionParams {
                transfer_account_id: Some(f.house.id),
                category_id: Some(f.electric.id),
                ..params(&f.checking, "-100")
            },
        )
        .await
        .unwrap();

    let tx = f.engine.transaction(&f.auth, id).await.unwrap();
    assert_eq!(tx.variant, TransactionVariant::Standard);
    assert_eq!(tx.category.map(|c| c.id), Some(f.electric.id));

    let mirror = f
        .engine
        .transaction(&f.auth, tx.transfer_id.unwrap())
        .await
        .unwrap();
    assert_eq!(mirror.variant, TransactionVariant::OffBudget);
    assert!(mirror.category.is_none());
}

#[tokio::test]
async fn off_budget_rows_reject_category() {
    let f = fixture().await;
    let result = f
        .engine
        .create_transaction(
            &f.auth,
            TransactionParams {
                category_id: Some(f.electric.id),
                ..params(&f.house, "12")
            },
        )
        .await;
    assert_eq!(
        result,
        Err(EngineError::Invalid(
            "category can only be set on standard transaction".to_string()
        ))
    );

    let id = f
        .engine
        .create_transaction(&f.auth, params(&f.house, "12"))
        .await
        .unwrap();
    let tx = f.engine.transaction(&f.auth, id).await.unwrap();
    assert_eq!(tx.variant, TransactionVariant::OffBudget);
}

#[tokio::test]
async fn split_parent_lists_without_children() {
    let f = fixture().await;
    let id = f
        .engine
        .create_transaction(
            &f.auth,
            TransactionParams {
                splits: vec![
                    SplitParams {
                        category_id: Some(f.electric.id),
                        amount: Some(amount("-6")),
                        notes: Some("power".to_string()),
                    },
                    SplitParams {
                        category_id: Some(f.water.id),
                        amount: Some(amount("-4.78")),
                        notes: None,
                    },
                ],
                ..params(&f.checking, "-10.78")
            },
        )
        .await
        .unwrap();

    let list = f.engine.transactions(&f.auth).await.unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].variant, TransactionVariant::Split);
    assert!(list[0].category.is_none());

    let splits = f.engine.splits(&f.auth, id).await.unwrap();
    assert_eq!(splits.len(), 2);
    let total: Amount = splits.iter().map(|split| split.amount).sum();
    assert_eq!(total, amount("-10.78"));
    assert!(splits.iter().any(|split| split.category == f.electric
        && split.notes.as_deref() == Some("power")));

    let balances = f.engine.accounts(&f.auth).await.unwrap();
    let checking = balances
        .iter()
        .find(|row| row.account.id == f.checking.id)
        .unwrap();
    assert_eq!(checking.balance, amount("-10.78"));
}

#[tokio::test]
async fn updating_splits_replaces_children() {
    let f = fixture().await;
    let id = f
        .engine
        .create_transaction(
            &f.auth,
            TransactionParams {
                splits: vec![
                    SplitParams {
                        category_id: Some(f.electric.id),
                        amount: Some(amount("-1")),
                        notes: None,
                    },
                    SplitParams {
                        category_id: Some(f.water.id),
                        amount: Some(amount("-1")),
                        notes: None,
                    },
                ],
                ..params(&f.checking, "-2")
            },
        )
        .await
        .unwrap();

    f.engine
        .update_transaction(
            &f.auth,
            id,
            TransactionParams {
                category_id: Some(f.water.id),
                ..params(&f.checking, "-2")
            },
        )
        .await
        .unwrap();

    let tx = f.engine.transaction(&f.auth, id).await.unwrap();
    assert_eq!(tx.variant, TransactionVariant::Standard);
    assert_eq!(tx.category, Some(f.water.clone()));
    assert!(f.engine.splits(&f.auth, id).await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_one_side_deletes_both() {
    let f = fixture().await;
    let id = f
        .engine
        .create_transaction(
            &f.auth,
            TransactionParams {
                transfer_account_id: Some(f.savings.id),
                ..params(&f.checking, "7")
            },
        )
        .await
        .unwrap();
    let mirror_id = f
        .engine
        .transaction(&f.auth, id)
        .await
        .unwrap()
        .transfer_id
        .unwrap();

    f.engine
        .delete_transactions(&f.auth, &[mirror_id])
        .await
        .unwrap();

    assert!(f.engine.transactions(&f.auth).await.unwrap().is_empty());
    assert_eq!(
        f.engine.transaction(&f.auth, id).await,
        Err(EngineError::KeyNotFound("transaction".to_string()))
    );
}

#[tokio::test]
async fn delete_ignores_other_budgets() {
    let f = fixture().await;
    let id = f
        .engine
        .create_transaction(&f.auth, params(&f.checking, "1"))
        .await
        .unwrap();

    let bob = f.engine.register("bob", "password").await.unwrap();
    let other = f.engine.create_budget(bob.id, "Other").await.unwrap();
    let other_auth = f.engine.budget_auth(bob.id, other.id).await.unwrap();

    f.engine
        .delete_transactions(&other_auth, &[id, Uuid::new_v4()])
        .await
        .unwrap();

    assert_eq!(f.engine.transactions(&f.auth).await.unwrap().len(), 1);
    assert!(f.engine.transaction(&other_auth, id).await.is_err());
}

#[tokio::test]
async fn foreign_references_are_invalid() {
    let f = fixture().await;

    let unknown_account = f
        .engine
        .create_transaction(
            &f.auth,
            TransactionParams {
                account_id: Some(Uuid::new_v4()),
                ..params(&f.checking, "1")
            },
        )
        .await;
    assert_eq!(
        unknown_account,
        Err(EngineError::Invalid("Invalid Account ID".to_string()))
    );

    let unknown_category = f
        .engine
        .create_transaction(
            &f.auth,
            TransactionParams {
                category_id: Some(Uuid::new_v4()),
                ..params(&f.checking, "1")
            },
        )
        .await;
    assert_eq!(
        unknown_category,
        Err(EngineError::Invalid("Invalid Category ID".to_string()))
    );

    let unknown_payee = f
        .engine
        .create_transaction(
            &f.auth,
            TransactionParams {
                payee_id: Some(Uuid::new_v4()),
                ..params(&f.checking, "1")
            },
        )
        .await;
    assert_eq!(
        unknown_payee,
        Err(EngineError::Invalid("Invalid Payee ID".to_string()))
    );
}

#[tokio::test]
async fn list_is_newest_first() {
    let f = fixture().await;
    for (day, value) in [(1, "1"), (20, "2"), (10, "3")] {
        f.engine
            .create_transaction(
                &f.auth,
                TransactionParams {
                    date: Some(date(2022, 10, day)),
                    ..params(&f.checking, value)
                },
            )
            .await
            .unwrap();
    }

    let days: Vec<NaiveDate> = f
        .engine
        .transactions(&f.auth)
        .await
        .unwrap()
        .into_iter()
        .map(|tx| tx.date)
        .collect();
    assert_eq!(days, vec![date(2022, 10, 20), date(2022, 10, 10), date(2022, 10, 1)]);
}
