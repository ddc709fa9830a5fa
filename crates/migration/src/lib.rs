pub use sea_orm_migration::prelude::*;

mod m20221001_000001_users;
mod m20221001_000002_budgets;
mod m20221001_000003_transactions;
mod m20221001_000004_months;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20221001_000001_users::Migration),
            Box::new(m20221001_000002_budgets::Migration),
            Box::new(m20221001_000003_transactions::Migration),
            Box::new(m20221001_000004_months::Migration),
        ]
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{ConnectionTrait, Database, Statement};

    use super::*;

    #[tokio::test]
    async fn up_then_down_leaves_no_tables() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();

        let manager = SchemaManager::new(&db);
        for table in [
            "users",
            "budgets",
            "budget_users",
            "accounts",
            "category_groups",
            "categories",
            "payees",
            "transactions",
            "months",
            "month_categories",
        ] {
            assert!(manager.has_table(table).await.unwrap(), "{table}");
        }

        Migrator::down(&db, None).await.unwrap();
        let rows = db
            .query_all(Statement::from_string(
                db.get_database_backend(),
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'transactions'",
            ))
            .await
            .unwrap();
        assert!(rows.is_empty());
    }
}
