use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq)]
pub struct ImageAttachment {
    pub emp_code: String,
    pub content: Vec<u8>,
    pub mime_type: String,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Serialize, Debug)]
pub struct ImageUploadResponse {
    pub success: bool,
    pub message: String,
    pub image_url: Option<String>,
}
