use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    entities::contact_message::{ContactMessageInsert, StoredContactMessage},
    errors::AppError,
    repositories::sqlx_repo::SqlxContactMessageRepo,
};

/// Insert-only access to stored contact messages.
#[async_trait]
pub trait ContactMessageRepository: Send + Sync {
    async fn check_connection(&self) -> Result<(), AppError>;
    async fn create_contact_message(&self, msg: &ContactMessageInsert) -> Result<StoredContactMessage, AppError>;
}

#[async_trait]
impl<T> ContactMessageRepository for Arc<T>
where
    T: ContactMessageRepository + ?Sized,
{
    async fn check_connection(&self) -> Result<(), AppError> {
        (**self).check_connection().await
    }

    async fn create_contact_message(&self, msg: &ContactMessageInsert) -> Result<StoredContactMessage, AppError> {
        (**self).create_contact_message(msg).await
    }
}

impl SqlxContactMessageRepo {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SqlxContactMessageRepo { pool }
    }
}

#[async_trait]
impl ContactMessageRepository for SqlxContactMessageRepo {
    async fn check_connection(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(AppError::from)
    }

    async fn create_contact_message(&self, msg: &ContactMessageInsert) -> Result<StoredContactMessage, AppError> {
        let stored = sqlx::query_as::<_, StoredContactMessage>(
            r#"
            INSERT INTO contact_messages (name, email, message)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, message, created_at
            "#,
        )
        .bind(&msg.name)
        .bind(&msg.email)
        .bind(&msg.message)
        .fetch_one(&self.pool)
        .await?;

        Ok(stored)
    }
}
