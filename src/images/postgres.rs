use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use super::ImageStore;
use crate::errors::ImageError;
use crate::models::image::ImageAttachment;

/// Postgres-backed image store. Expects the `employee_images` table created
/// by `db::ensure_schema`.
pub struct PgImageStore {
    pool: PgPool,
}

impl PgImageStore {
    pub fn new(pool: PgPool) -> Self {
        PgImageStore { pool }
    }
}

fn attachment_from_row(row: &PgRow) -> Result<ImageAttachment, sqlx::Error> {
    Ok(ImageAttachment {
        emp_code: row.try_get("emp_code")?,
        content: row.try_get("content")?,
        mime_type: row.try_get("mime_type")?,
        uploaded_at: row.try_get::<DateTime<Utc>, _>("uploaded_at")?,
    })
}

#[async_trait]
impl ImageStore for PgImageStore {
    async fn put(&self, attachment: ImageAttachment) -> Result<(), ImageError> {
        sqlx::query(
            "INSERT INTO employee_images (emp_code, content, mime_type, uploaded_at) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (emp_code) DO UPDATE SET content = EXCLUDED.content, \
             mime_type = EXCLUDED.mime_type, uploaded_at = EXCLUDED.uploaded_at",
        )
        .bind(&attachment.emp_code)
        .bind(&attachment.content)
        .bind(&attachment.mime_type)
        .bind(attachment.uploaded_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, emp_code: &str) -> Result<Option<ImageAttachment>, ImageError> {
        let row = sqlx::query(
            "SELECT emp_code, content, mime_type, uploaded_at \
             FROM employee_images WHERE emp_code = $1",
        )
        .bind(emp_code)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(attachment_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn get_many(
        &self,
        emp_codes: &[String],
    ) -> Result<HashMap<String, ImageAttachment>, ImageError> {
        let rows = sqlx::query(
            "SELECT emp_code, content, mime_type, uploaded_at \
             FROM employee_images WHERE emp_code = ANY($1)",
        )
        .bind(emp_codes)
        .fetch_all(&self.pool)
        .await?;

        let mut attachments = HashMap::with_capacity(rows.len());
        for row in &rows {
            let attachment = attachment_from_row(row)?;
            attachments.insert(attachment.emp_code.clone(), attachment);
        }
        Ok(attachments)
    }

    async fn remove(&self, emp_code: &str) -> Result<bool, ImageError> {
        let result = sqlx::query("DELETE FROM employee_images WHERE emp_code = $1")
            .bind(emp_code)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
