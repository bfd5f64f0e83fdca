//! Create `product` table.
//! Products belong to exactly one category; the FK restricts category deletes.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Product::Table)
                    .if_not_exists()
                    .col(pk_auto(Product::Id))
                    .col(string_len(Product::Name, 80).not_null())
                    .col(string_len_null(Product::Description, 300))
                    .col(decimal_len(Product::Price, 18, 2).not_null())
                    .col(integer(Product::Stock).not_null())
                    .col(timestamp_with_time_zone(Product::CreatedAt).not_null())
                    .col(integer(Product::CategoryId).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_category")
                            .from(Product::Table, Product::CategoryId)
                            .to(Category::Table, Category::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Product names are unique per category, not globally
        manager
            .create_index(
                Index::create()
                    .name("idx_product_category_name")
                    .table(Product::Table)
                    .col(Product::CategoryId)
                    .col(Product::Name)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Product::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Product {
    Table,
    Id,
    Name,
    Description,
    Price,
    Stock,
    CreatedAt,
    CategoryId,
}

#[derive(DeriveIden)]
enum Category { Table, Id }
