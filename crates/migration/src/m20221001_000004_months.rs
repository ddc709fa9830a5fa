use sea_orm_migration::prelude::*;

use crate::m20221001_000002_budgets::{Budgets, Categories};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Months {
    Table,
    Id,
    BudgetId,
    Date,
    Carryover,
}

#[derive(Iden)]
enum MonthCategories {
    Table,
    Id,
    MonthId,
    CategoryId,
    Amount,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Months::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Months::Id).blob().not_null().primary_key())
                    .col(ColumnDef::new(Months::BudgetId).blob().not_null())
                    .col(ColumnDef::new(Months::Date).date().not_null())
                    .col(
                        ColumnDef::new(Months::Carryover)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-months-budget_id")
                            .from(Months::Table, Months::BudgetId)
                            .to(Budgets::Table, Budgets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One month row per budget and first day.
        manager
            .create_index(
                Index::create()
                    .name("idx-months-budget_id-date")
                    .table(Months::Table)
                    .col(Months::BudgetId)
                    .col(Months::Date)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MonthCategories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MonthCategories::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MonthCategories::MonthId).blob().not_null())
                    .col(ColumnDef::new(MonthCategories::CategoryId).blob().not_null())
                    .col(
                        ColumnDef::new(MonthCategories::Amount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-month_categories-month_id")
                            .from(MonthCategories::Table, MonthCategories::MonthId)
                            .to(Months::Table, Months::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-month_categories-category_id")
                            .from(MonthCategories::Table, MonthCategories::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-month_categories-month_id-category_id")
                    .table(MonthCategories::Table)
                    .col(MonthCategories::MonthId)
                    .col(MonthCategories::CategoryId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MonthCategories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Months::Table).to_owned())
            .await
    }
}
