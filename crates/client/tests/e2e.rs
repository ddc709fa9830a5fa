use api_types::{
    account::Account,
    category::AssociatedCategory,
    transaction::{Transaction, TransactionVariant},
};
use chrono::NaiveDate;
use client::{
    Client, ClientError, format_amount,
    form::{PayeeChoice, TransactionForm},
    state::{AuthState, AuthStatus, Selection},
};
use engine::{Engine, PasswordParams};
use migration::MigratorTrait;
use uuid::Uuid;

async fn spawn_server() -> String {
    let db = sea_orm::Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db)
        .password_params(PasswordParams::new(8, 1, 1, None).unwrap())
        .build()
        .await
        .unwrap();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = server::spawn_with_listener(engine, listener).unwrap();
    format!("http://{addr}")
}

struct Ledger {
    client: Client,
    checking: Account,
    savings: Account,
    electric: AssociatedCategory,
}

async fn ledger() -> Ledger {
    let base_url = spawn_server().await;
    let mut client = Client::new(&base_url).unwrap();
    client.health_check().await.unwrap();

    client.register("user", "password").await.unwrap();
    client.login("user", "password").await.unwrap();
    let budget_id = client.create_budget("Budget").await.unwrap();
    client.select_budget(Some(budget_id));

    let checking_id = client.create_account("Checking", false).await.unwrap();
    let savings_id = client.create_account("Savings", false).await.unwrap();
    let group_id = client.create_category_group("Bills").await.unwrap();
    let electric_id = client.create_category(group_id, "Electric").await.unwrap();

    Ledger {
        checking: client.account(checking_id).await.unwrap(),
        savings: client.account(savings_id).await.unwrap(),
        electric: AssociatedCategory {
            id: electric_id,
            name: "Electric".to_string(),
        },
        client,
    }
}

fn october_14() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(2022, 10, 14)
}

fn category_label(transaction: &Transaction) -> String {
    match transaction.variant {
        TransactionVariant::Transfer => "Transfer".to_string(),
        TransactionVariant::Split => "Split".to_string(),
        TransactionVariant::OffBudget => "Off-Budget".to_string(),
        TransactionVariant::Standard => transaction
            .category
            .as_ref()
            .map(|category| category.name.clone())
            .unwrap_or_default(),
    }
}

#[tokio::test]
async fn standard_transaction_shows_once() {
    let Ledger {
        client,
        checking,
        electric,
        ..
    } = ledger().await;

    let mut form = TransactionForm::new();
    form.date = october_14();
    form.select_account(Some(checking.clone())).unwrap();
    form.select_category(Some(electric.clone())).unwrap();
    assert!(form.amount.input("10.78"));
    form.notes = "Test notes".to_string();

    let id = client
        .create_transaction(&form.to_create_request().unwrap())
        .await
        .unwrap();

    let rows = client.transactions().await.unwrap();
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.id, id);
    assert_eq!(row.account, checking);
    assert_eq!(row.category.as_ref(), Some(&electric));
    assert_eq!(row.date, october_14().unwrap());
    assert_eq!(row.notes.as_deref(), Some("Test notes"));
    assert_eq!(format_amount(row.amount).unwrap(), "$10.78");
    assert_eq!(category_label(row), "Electric");
}

#[tokio::test]
async fn transfer_shows_both_sides() {
    let Ledger {
        client,
        checking,
        savings,
        ..
    } = ledger().await;

    let mut form = TransactionForm::new();
    form.date = october_14();
    form.select_account(Some(savings.clone())).unwrap();
    form.select_payee(Some(PayeeChoice::Account(checking.clone())))
        .unwrap();
    assert!(form.amount.input("10.78"));
    assert!(!form.category_control().enabled);

    client
        .create_transaction(&form.to_create_request().unwrap())
        .await
        .unwrap();

    let rows = client.transactions().await.unwrap();
    assert_eq!(rows.len(), 2);

    let mut shown = rows
        .iter()
        .map(|row| (format_amount(row.amount).unwrap(), category_label(row)))
        .collect::<Vec<_>>();
    shown.sort();
    assert_eq!(
        shown,
        vec![
            ("$10.78".to_string(), "Transfer".to_string()),
            ("-$10.78".to_string(), "Transfer".to_string()),
        ]
    );

    let savings_row = rows.iter().find(|row| row.account == savings).unwrap();
    let checking_row = rows.iter().find(|row| row.account == checking).unwrap();
    assert_eq!(savings_row.transfer_account.as_ref(), Some(&checking));
    assert_eq!(savings_row.transfer_id, Some(checking_row.id));
    assert_eq!(checking_row.transfer_id, Some(savings_row.id));
}

#[tokio::test]
async fn edited_split_replaces_rows() {
    let Ledger {
        client,
        checking,
        electric,
        ..
    } = ledger().await;

    let mut form = TransactionForm::new();
    form.date = october_14();
    form.select_account(Some(checking)).unwrap();
    assert!(form.amount.input("-30"));
    form.add_split().unwrap();
    form.add_split().unwrap();
    for index in 0..2 {
        let split = form.split_mut(index).unwrap();
        split.category = Some(electric.clone());
        assert!(split.amount.input("-15"));
    }
    let id = client
        .create_transaction(&form.to_create_request().unwrap())
        .await
        .unwrap();

    let stored = client.transaction(id).await.unwrap();
    let splits = client.splits(id).await.unwrap();
    assert_eq!(stored.variant, TransactionVariant::Split);
    assert_eq!(splits.len(), 2);

    let mut form = TransactionForm::from_transaction(&stored, &splits).unwrap();
    form.remove_split(1).unwrap();
    let split = form.split_mut(0).unwrap();
    assert!(split.amount.input("-30"));
    let edit = form.to_update_request(id).unwrap();
    client.update_transaction(edit.id, &edit.update).await.unwrap();

    let splits = client.splits(id).await.unwrap();
    assert_eq!(splits.len(), 1);
    assert_eq!(format_amount(splits[0].amount).unwrap(), "-$30.00");
    assert_eq!(client.transactions().await.unwrap().len(), 1);
}

#[tokio::test]
async fn validation_errors_are_shown_verbatim() {
    let Ledger {
        client, checking, ..
    } = ledger().await;

    let mut form = TransactionForm::new();
    form.date = october_14();
    form.select_account(Some(checking)).unwrap();
    assert!(form.amount.input("-30"));
    form.add_split().unwrap();
    let split = form.split_mut(0).unwrap();
    split.category = Some(AssociatedCategory {
        id: Uuid::new_v4(),
        name: "Gone".to_string(),
    });
    assert!(split.amount.input("-30"));

    let err = client
        .create_transaction(&form.to_create_request().unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Invalid { .. }));
    assert_eq!(err.message(), "Invalid Category ID");
}

#[tokio::test]
async fn selection_deletes_rows() {
    let Ledger {
        client,
        checking,
        electric,
        ..
    } = ledger().await;

    let mut ids = Vec::new();
    for amount in ["-1", "-2", "-3"] {
        let mut form = TransactionForm::new();
        form.date = october_14();
        form.select_account(Some(checking.clone())).unwrap();
        form.select_category(Some(electric.clone())).unwrap();
        assert!(form.amount.input(amount));
        ids.push(
            client
                .create_transaction(&form.to_create_request().unwrap())
                .await
                .unwrap(),
        );
    }

    let mut selection = Selection::default();
    selection.select_all(ids[..2].iter().copied());
    selection.delete_selected(&client).await.unwrap();
    assert!(selection.is_empty());

    let rows = client.transactions().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, ids[2]);
}

#[tokio::test]
async fn logout_requires_login_again() {
    let Ledger { client, .. } = ledger().await;

    let mut auth = AuthState::default();
    auth.refresh(&client).await;
    assert_eq!(auth.status(), AuthStatus::Authenticated);
    assert_eq!(auth.user().map(|user| user.username.as_str()), Some("user"));

    client.logout().await.unwrap();
    let err = client.transactions().await.unwrap_err();
    assert!(err.needs_login());

    auth.refresh(&client).await;
    assert_eq!(auth.status(), AuthStatus::Unauthenticated);
}

#[tokio::test]
async fn budgets_need_membership() {
    let Ledger { client, .. } = ledger().await;
    let budget_id = client.budget_id().unwrap();

    let mut other = client.clone();
    other.select_budget(Some(Uuid::new_v4()));
    let err = other.accounts().await.unwrap_err();
    assert_eq!(err.status().map(|status| status.as_u16()), Some(404));

    let budget = client.budget(budget_id).await.unwrap();
    assert_eq!(budget.name, "Budget");
    let accounts = client.accounts().await.unwrap();
    assert_eq!(accounts.len(), 2);
}
