use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::directory::store::RecordStore;
use crate::errors::{AppError, ImageError};
use crate::images::ImageGateway;
use crate::models::image::ImageUploadResponse;
use crate::utils::multipart::read_file_part;

pub async fn upload_image(
    records: web::Data<RecordStore>,
    images: web::Data<ImageGateway>,
    emp_code: web::Path<String>,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let emp_code = emp_code.into_inner();

    // Unknown employees are rejected before the body is read.
    if !records.contains(&emp_code) {
        return Err(ImageError::EmployeeNotFound(emp_code).into());
    }

    let max = images.policy().max_size_bytes;
    let part = read_file_part(payload, "file", max)
        .await?
        .ok_or_else(|| AppError::ValidationFailed("Missing 'file' field".to_string()))?;

    if part.truncated {
        return Err(ImageError::TooLarge { max }.into());
    }

    let image_url = images.upload(&records, &emp_code, part.bytes).await?;

    Ok(HttpResponse::Ok().json(ImageUploadResponse {
        success: true,
        message: format!("Image uploaded successfully for employee {}", emp_code),
        image_url: Some(image_url),
    }))
}

pub async fn get_image(
    records: web::Data<RecordStore>,
    images: web::Data<ImageGateway>,
    emp_code: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let image_url = images.retrieve(&records, &emp_code.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "image_url": image_url })))
}

pub async fn delete_image(
    records: web::Data<RecordStore>,
    images: web::Data<ImageGateway>,
    emp_code: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let emp_code = emp_code.into_inner();
    images.delete(&records, &emp_code).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": format!("Image deleted successfully for employee {}", emp_code),
    })))
}
