//! Contact requests on `PostgreSQL`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use suds_core::ContactRequestId;

use super::{ContactStore, PgStore, RepositoryError};
use crate::models::{ContactRequest, NewContactRequest};

#[derive(sqlx::FromRow)]
struct ContactRow {
    id: ContactRequestId,
    name: String,
    email: String,
    subject: String,
    message: String,
    created_at: DateTime<Utc>,
}

#[async_trait]
impl ContactStore for PgStore {
    async fn insert_contact_request(
        &self,
        request: &NewContactRequest,
    ) -> Result<ContactRequest, RepositoryError> {
        let row = sqlx::query_as::<_, ContactRow>(
            r"
            INSERT INTO storefront.contact_request (name, email, subject, message)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, subject, message, created_at
            ",
        )
        .bind(&request.name)
        .bind(&request.email)
        .bind(&request.subject)
        .bind(&request.message)
        .fetch_one(&self.pool)
        .await?;

        Ok(ContactRequest {
            id: row.id,
            name: row.name,
            email: row.email,
            subject: row.subject,
            message: row.message,
            created_at: row.created_at,
        })
    }
}
