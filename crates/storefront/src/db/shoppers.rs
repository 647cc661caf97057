//! Shopper accounts on `PostgreSQL`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use suds_core::{Email, ShopperId};

use super::{PgStore, RepositoryError, ShopperStore, map_constraint};
use crate::models::{NewShopper, Shopper};

#[derive(sqlx::FromRow)]
struct ShopperRow {
    id: ShopperId,
    first_name: String,
    last_name: String,
    email: String,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct CredentialRow {
    #[sqlx(flatten)]
    shopper: ShopperRow,
    credential_digest: String,
}

impl TryFrom<ShopperRow> for Shopper {
    type Error = RepositoryError;

    fn try_from(row: ShopperRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        Ok(Self {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl ShopperStore for PgStore {
    async fn create_shopper(&self, shopper: &NewShopper) -> Result<Shopper, RepositoryError> {
        let row = sqlx::query_as::<_, ShopperRow>(
            r"
            INSERT INTO storefront.shopper (first_name, last_name, email, credential_digest)
            VALUES ($1, $2, $3, $4)
            RETURNING id, first_name, last_name, email, created_at
            ",
        )
        .bind(&shopper.first_name)
        .bind(&shopper.last_name)
        .bind(shopper.email.as_str())
        .bind(&shopper.credential_digest)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_constraint(e, "email already exists"))?;

        row.try_into()
    }

    async fn shopper_by_id(&self, id: ShopperId) -> Result<Option<Shopper>, RepositoryError> {
        let row = sqlx::query_as::<_, ShopperRow>(
            r"
            SELECT id, first_name, last_name, email, created_at
            FROM storefront.shopper
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Shopper::try_from).transpose()
    }

    async fn credentials_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<(Shopper, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, CredentialRow>(
            r"
            SELECT id, first_name, last_name, email, created_at, credential_digest
            FROM storefront.shopper
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some((r.shopper.try_into()?, r.credential_digest))),
            None => Ok(None),
        }
    }

    async fn delete_shopper(&self, id: ShopperId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // Blocks concurrent cart inserts, whose FK check takes KEY SHARE on
        // this row, until the shopper is gone.
        let locked = sqlx::query_scalar::<_, i32>(
            "SELECT id FROM storefront.shopper WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        if locked.is_none() {
            return Err(RepositoryError::NotFound);
        }

        // Line items go with their cart via ON DELETE CASCADE.
        sqlx::query(
            r"
            DELETE FROM storefront.cart
            WHERE shopper_id = $1 AND status = 'open'
            ",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
            UPDATE storefront.cart
            SET shopper_id = NULL
            WHERE shopper_id = $1 AND status = 'completed'
            ",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM storefront.shopper WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
