use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::ImageStore;
use crate::errors::ImageError;
use crate::models::image::ImageAttachment;

/// Process-local image store, used when no database is configured.
/// Contents are lost on restart.
#[derive(Default)]
pub struct MemoryImageStore {
    images: RwLock<HashMap<String, ImageAttachment>>,
}

impl MemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> ImageError {
    ImageError::Store("image store lock poisoned".to_string())
}

#[async_trait]
impl ImageStore for MemoryImageStore {
    async fn put(&self, attachment: ImageAttachment) -> Result<(), ImageError> {
        let mut images = self.images.write().map_err(poisoned)?;
        images.insert(attachment.emp_code.clone(), attachment);
        Ok(())
    }

    async fn get(&self, emp_code: &str) -> Result<Option<ImageAttachment>, ImageError> {
        let images = self.images.read().map_err(poisoned)?;
        Ok(images.get(emp_code).cloned())
    }

    async fn get_many(
        &self,
        emp_codes: &[String],
    ) -> Result<HashMap<String, ImageAttachment>, ImageError> {
        let images = self.images.read().map_err(poisoned)?;
        Ok(emp_codes
            .iter()
            .filter_map(|code| images.get(code).map(|a| (code.clone(), a.clone())))
            .collect())
    }

    async fn remove(&self, emp_code: &str) -> Result<bool, ImageError> {
        let mut images = self.images.write().map_err(poisoned)?;
        Ok(images.remove(emp_code).is_some())
    }
}
