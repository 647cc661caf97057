//! Catalog reads and seeding on `PostgreSQL`.

use async_trait::async_trait;

use suds_core::{Money, ProductId};

use super::{CatalogStore, PgStore, RepositoryError};
use crate::models::Product;
use crate::search::{SearchQuery, query_builder};

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    price: Money,
    product_type: String,
    description: String,
    picture: Option<String>,
    featured: bool,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            price: row.price,
            product_type: row.product_type,
            description: row.description,
            picture: row.picture,
            featured: row.featured,
        }
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, price, product_type, description, picture, featured
            FROM storefront.product
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    async fn search_products(&self, query: &SearchQuery) -> Result<Vec<Product>, RepositoryError> {
        let mut builder = query_builder::build(query);
        let rows = builder
            .build_query_as::<ProductRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn upsert_product(&self, product: &Product) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO storefront.product
                (id, name, price, product_type, description, picture, featured)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                price = EXCLUDED.price,
                product_type = EXCLUDED.product_type,
                description = EXCLUDED.description,
                picture = EXCLUDED.picture,
                featured = EXCLUDED.featured
            ",
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(product.price)
        .bind(&product.product_type)
        .bind(&product.description)
        .bind(product.picture.as_deref())
        .bind(product.featured)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
