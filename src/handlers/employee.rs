use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use validator::Validate;

use crate::attendance;
use crate::directory::query;
use crate::directory::store::RecordStore;
use crate::errors::AppError;
use crate::images::ImageGateway;
use crate::models::employee::EmployeeField;
use crate::utils::validation::validate_payload;

#[derive(Deserialize, Validate)]
pub struct SearchParams {
    #[validate(length(max = 200))]
    q: Option<String>,
    #[validate(length(max = 64))]
    field: Option<String>,
}

pub async fn get_employees(
    records: web::Data<RecordStore>,
    images: web::Data<ImageGateway>,
) -> Result<HttpResponse, AppError> {
    let employees = images.enrich(records.all()).await?;
    Ok(HttpResponse::Ok().json(json!({ "employees": employees })))
}

pub async fn search_employees(
    records: web::Data<RecordStore>,
    images: web::Data<ImageGateway>,
    params: web::Query<SearchParams>,
) -> Result<HttpResponse, AppError> {
    validate_payload(&params.0)?;

    let snapshot = records.snapshot();
    // Only a missing or empty `q` browses; whitespace is a real search term.
    let q = params.q.as_deref().unwrap_or("");
    let field = params.field.as_deref().map(str::trim).filter(|f| !f.is_empty());

    let mut result = query::field_search(&snapshot.records, q, field);
    result.employees = images.enrich(result.employees).await?;

    Ok(HttpResponse::Ok().json(result))
}

/// Exact-match filter; every query parameter naming a searchable field is a
/// criterion, anything else is ignored.
pub async fn filter_employees(
    records: web::Data<RecordStore>,
    images: web::Data<ImageGateway>,
    params: web::Query<HashMap<String, String>>,
) -> Result<HttpResponse, AppError> {
    let criteria: HashMap<EmployeeField, String> = params
        .into_inner()
        .into_iter()
        .filter_map(|(key, value)| EmployeeField::searchable(&key).map(|field| (field, value)))
        .collect();

    let snapshot = records.snapshot();
    let employees = images.enrich(query::filter(&snapshot.records, &criteria)).await?;

    Ok(HttpResponse::Ok().json(json!({ "employees": employees })))
}

pub async fn get_attendance(
    records: web::Data<RecordStore>,
    emp_code: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let emp_code = emp_code.into_inner();
    let employee = records
        .find_by_code(&emp_code)
        .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))?;

    let attendance = attendance::generate(&employee.emp_code, &employee.emp_name);

    Ok(HttpResponse::Ok().json(json!({ "attendance": attendance })))
}
