use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::directory::query;
use crate::directory::store::RecordStore;
use crate::errors::AppError;
use crate::images::ImageGateway;

pub async fn get_department_employees(
    records: web::Data<RecordStore>,
    images: web::Data<ImageGateway>,
    department: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let department = department.into_inner();
    let snapshot = records.snapshot();
    let employees = images
        .enrich(query::department_employees(&snapshot.records, &department))
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "count": employees.len(),
        "employees": employees,
        "department": department,
    })))
}
