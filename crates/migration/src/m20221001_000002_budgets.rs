//! Budgets and everything a budget owns directly: members, accounts,
//! category groups, categories and payees.

use sea_orm_migration::prelude::*;

use crate::m20221001_000001_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub(crate) enum Budgets {
    Table,
    Id,
    Name,
}

#[derive(Iden)]
enum BudgetUsers {
    Table,
    BudgetId,
    UserId,
}

#[derive(Iden)]
pub(crate) enum Accounts {
    Table,
    Id,
    BudgetId,
    Name,
    OffBudget,
}

#[derive(Iden)]
enum CategoryGroups {
    Table,
    Id,
    BudgetId,
    Name,
    IsIncome,
}

#[derive(Iden)]
pub(crate) enum Categories {
    Table,
    Id,
    BudgetId,
    GroupId,
    Name,
}

#[derive(Iden)]
pub(crate) enum Payees {
    Table,
    Id,
    BudgetId,
    Name,
}

/// Foreign key from `column` to `budgets.id`, cascading on delete.
fn budget_fk(table: impl IntoIden + 'static, column: impl IntoIden + 'static) -> ForeignKeyCreateStatement {
    ForeignKey::create()
        .from(table, column)
        .to(Budgets::Table, Budgets::Id)
        .on_delete(ForeignKeyAction::Cascade)
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Budgets::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Budgets::Id).blob().not_null().primary_key())
                    .col(ColumnDef::new(Budgets::Name).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BudgetUsers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(BudgetUsers::BudgetId).blob().not_null())
                    .col(ColumnDef::new(BudgetUsers::UserId).blob().not_null())
                    .primary_key(
                        Index::create()
                            .col(BudgetUsers::BudgetId)
                            .col(BudgetUsers::UserId),
                    )
                    .foreign_key(
                        budget_fk(BudgetUsers::Table, BudgetUsers::BudgetId)
                            .name("fk-budget_users-budget_id"),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-budget_users-user_id")
                            .from(BudgetUsers::Table, BudgetUsers::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-budget_users-user_id")
                    .table(BudgetUsers::Table)
                    .col(BudgetUsers::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Accounts::Id).blob().not_null().primary_key())
                    .col(ColumnDef::new(Accounts::BudgetId).blob().not_null())
                    .col(ColumnDef::new(Accounts::Name).string().not_null())
                    .col(
                        ColumnDef::new(Accounts::OffBudget)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        budget_fk(Accounts::Table, Accounts::BudgetId)
                            .name("fk-accounts-budget_id"),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CategoryGroups::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CategoryGroups::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CategoryGroups::BudgetId).blob().not_null())
                    .col(ColumnDef::new(CategoryGroups::Name).string().not_null())
                    .col(
                        ColumnDef::new(CategoryGroups::IsIncome)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        budget_fk(CategoryGroups::Table, CategoryGroups::BudgetId)
                            .name("fk-category_groups-budget_id"),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Categories::BudgetId).blob().not_null())
                    .col(ColumnDef::new(Categories::GroupId).blob().not_null())
                    .col(ColumnDef::new(Categories::Name).string().not_null())
                    .foreign_key(
                        budget_fk(Categories::Table, Categories::BudgetId)
                            .name("fk-categories-budget_id"),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-categories-group_id")
                            .from(Categories::Table, Categories::GroupId)
                            .to(CategoryGroups::Table, CategoryGroups::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Payees::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Payees::Id).blob().not_null().primary_key())
                    .col(ColumnDef::new(Payees::BudgetId).blob().not_null())
                    .col(ColumnDef::new(Payees::Name).string().not_null())
                    .foreign_key(
                        budget_fk(Payees::Table, Payees::BudgetId).name("fk-payees-budget_id"),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, table, column) in [
            (
                "idx-accounts-budget_id",
                Accounts::Table.into_iden(),
                Accounts::BudgetId.into_iden(),
            ),
            (
                "idx-categories-budget_id",
                Categories::Table.into_iden(),
                Categories::BudgetId.into_iden(),
            ),
            (
                "idx-payees-budget_id",
                Payees::Table.into_iden(),
                Payees::BudgetId.into_iden(),
            ),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Payees::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CategoryGroups::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BudgetUsers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Budgets::Table).to_owned())
            .await?;
        Ok(())
    }
}
