pub mod memory;
pub mod postgres;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use log::info;

use crate::config::ImagePolicy;
use crate::directory::store::RecordStore;
use crate::errors::ImageError;
use crate::models::employee::EmployeeRecord;
use crate::models::image::ImageAttachment;

pub use memory::MemoryImageStore;
pub use postgres::PgImageStore;

/// Backing store for employee photos, at most one per employee code.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Inserts or replaces the attachment for `attachment.emp_code`.
    async fn put(&self, attachment: ImageAttachment) -> Result<(), ImageError>;

    async fn get(&self, emp_code: &str) -> Result<Option<ImageAttachment>, ImageError>;

    /// Fetches the attachments of several employees in one round trip.
    /// Codes without an image are absent from the map.
    async fn get_many(
        &self,
        emp_codes: &[String],
    ) -> Result<HashMap<String, ImageAttachment>, ImageError>;

    /// Returns whether an attachment existed.
    async fn remove(&self, emp_code: &str) -> Result<bool, ImageError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageFormat {
    pub mime_type: &'static str,
}

/// Checks size first, then sniffs the content against the allowed formats
/// and finally decodes it.
pub fn validate(bytes: &[u8], policy: &ImagePolicy) -> Result<ImageFormat, ImageError> {
    if bytes.len() > policy.max_size_bytes {
        return Err(ImageError::TooLarge {
            max: policy.max_size_bytes,
        });
    }

    let kind = infer::get(bytes)
        .filter(|kind| kind.matcher_type() == infer::MatcherType::Image)
        .ok_or_else(|| {
            ImageError::InvalidFormat("content is not a recognised image".to_string())
        })?;

    if !policy.allowed_types.iter().any(|t| t == kind.mime_type()) {
        return Err(ImageError::InvalidFormat(format!(
            "{} is not allowed; expected one of {}",
            kind.mime_type(),
            policy.allowed_types.join(", ")
        )));
    }

    // A valid signature is not enough; the body must decode too.
    let format = image::ImageFormat::from_mime_type(kind.mime_type()).ok_or_else(|| {
        ImageError::InvalidFormat(format!("{} cannot be decoded", kind.mime_type()))
    })?;
    image::load_from_memory_with_format(bytes, format).map_err(|err| {
        ImageError::InvalidFormat(format!("{} content is corrupt: {}", kind.mime_type(), err))
    })?;

    Ok(ImageFormat {
        mime_type: kind.mime_type(),
    })
}

pub fn data_uri(mime_type: &str, content: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(content))
}

/// Ties image operations to the directory: every operation first checks that
/// the employee code exists in the current snapshot.
#[derive(Clone)]
pub struct ImageGateway {
    backend: Arc<dyn ImageStore>,
    policy: ImagePolicy,
}

impl ImageGateway {
    pub fn new(store: Arc<dyn ImageStore>, policy: ImagePolicy) -> Self {
        ImageGateway {
            backend: store,
            policy,
        }
    }

    pub fn policy(&self) -> &ImagePolicy {
        &self.policy
    }

    pub fn validate(&self, bytes: &[u8]) -> Result<ImageFormat, ImageError> {
        validate(bytes, &self.policy)
    }

    /// Validates and stores an upload, returning the data URI of the stored image.
    pub async fn upload(
        &self,
        records: &RecordStore,
        emp_code: &str,
        bytes: Vec<u8>,
    ) -> Result<String, ImageError> {
        ensure_employee(records, emp_code)?;
        let format = self.validate(&bytes)?;
        self.store(records, emp_code, bytes, format.mime_type).await
    }

    pub async fn store(
        &self,
        records: &RecordStore,
        emp_code: &str,
        bytes: Vec<u8>,
        mime_type: &str,
    ) -> Result<String, ImageError> {
        ensure_employee(records, emp_code)?;
        let uri = data_uri(mime_type, &bytes);
        let size = bytes.len();
        self.backend
            .put(ImageAttachment {
                emp_code: emp_code.to_string(),
                content: bytes,
                mime_type: mime_type.to_string(),
                uploaded_at: Utc::now(),
            })
            .await?;
        info!("Stored {} byte {} image for employee {}", size, mime_type, emp_code);
        Ok(uri)
    }

    pub async fn retrieve(
        &self,
        records: &RecordStore,
        emp_code: &str,
    ) -> Result<String, ImageError> {
        ensure_employee(records, emp_code)?;
        match self.backend.get(emp_code).await? {
            Some(attachment) => Ok(data_uri(&attachment.mime_type, &attachment.content)),
            None => Err(ImageError::ImageNotFound(emp_code.to_string())),
        }
    }

    pub async fn delete(&self, records: &RecordStore, emp_code: &str) -> Result<(), ImageError> {
        ensure_employee(records, emp_code)?;
        if self.backend.remove(emp_code).await? {
            info!("Deleted image for employee {}", emp_code);
            Ok(())
        } else {
            Err(ImageError::ImageNotFound(emp_code.to_string()))
        }
    }

    /// Overlays stored images onto records as data URIs. Records without an
    /// attachment keep whatever `image_url` the data source supplied.
    pub async fn enrich(
        &self,
        mut employees: Vec<EmployeeRecord>,
    ) -> Result<Vec<EmployeeRecord>, ImageError> {
        if employees.is_empty() {
            return Ok(employees);
        }

        let codes: Vec<String> = employees.iter().map(|e| e.emp_code.clone()).collect();
        let attachments = self.backend.get_many(&codes).await?;
        for employee in employees.iter_mut() {
            if let Some(attachment) = attachments.get(&employee.emp_code) {
                employee.image_url = Some(data_uri(&attachment.mime_type, &attachment.content));
            }
        }
        Ok(employees)
    }
}

fn ensure_employee(records: &RecordStore, emp_code: &str) -> Result<(), ImageError> {
    if records.contains(emp_code) {
        Ok(())
    } else {
        Err(ImageError::EmployeeNotFound(emp_code.to_string()))
    }
}
