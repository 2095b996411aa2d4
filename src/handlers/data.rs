use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::directory::index::AttributeIndex;
use crate::directory::loader::{DataSource, DirectoryLoader, ReloadOutcome};
use crate::directory::store::RecordStore;
use crate::errors::AppError;
use crate::utils::multipart::read_file_part;

pub async fn get_field_values(
    records: web::Data<RecordStore>,
    index: web::Data<AttributeIndex>,
) -> Result<HttpResponse, AppError> {
    let values = index.values(&records.snapshot());
    Ok(HttpResponse::Ok().json(&*values))
}

/// Reloads from the configured source. Source failures are absorbed by the
/// loader, so this always answers 200 and reports what is being served.
pub async fn refresh_data(
    records: web::Data<RecordStore>,
    loader: web::Data<DirectoryLoader>,
) -> Result<HttpResponse, AppError> {
    let report = loader.reload(&records).await;

    let message = match report.outcome {
        ReloadOutcome::Loaded => format!(
            "Data refreshed successfully. Loaded {} employees from {}.",
            report.count,
            report.source.as_str()
        ),
        ReloadOutcome::KeptPrevious => format!(
            "Refresh from {} failed. Serving {} employees from {}.",
            loader.source().kind().as_str(),
            report.count,
            report.source.as_str()
        ),
        ReloadOutcome::Fallback => format!(
            "Refresh from {} failed. Loaded {} employees from fallback data.",
            loader.source().kind().as_str(),
            report.count
        ),
        ReloadOutcome::Empty => format!(
            "Refresh from {} failed and no fallback data is available. 0 employees loaded.",
            loader.source().kind().as_str()
        ),
    };

    Ok(HttpResponse::Ok().json(json!({
        "message": message,
        "source": report.source,
        "count": report.count,
        "outcome": report.outcome,
        "error": report.error,
    })))
}

pub async fn upload_data(
    records: web::Data<RecordStore>,
    loader: web::Data<DirectoryLoader>,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let max = loader.upload_limit();
    let part = read_file_part(payload, "file", max)
        .await?
        .ok_or_else(|| AppError::ValidationFailed("Missing 'file' field".to_string()))?;

    if part.truncated {
        return Err(AppError::ValidationFailed(format!(
            "Data file exceeds the {} byte limit",
            max
        )));
    }

    let file_name = part.file_name.unwrap_or_else(|| "upload.csv".to_string());
    let report = loader.load_upload(&records, &file_name, &part.bytes).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": format!("Data uploaded successfully. Loaded {} employees.", report.count),
        "source": report.source,
        "count": report.count,
    })))
}

pub async fn get_data_source_info(
    records: web::Data<RecordStore>,
    loader: web::Data<DirectoryLoader>,
) -> Result<HttpResponse, AppError> {
    let snapshot = records.snapshot();
    let mut info = json!({
        "data_source": loader.source().kind(),
        "loaded_from": snapshot.source,
        "employees_count": snapshot.records.len(),
        "last_updated": snapshot.loaded_at.to_rfc3339(),
        "version": snapshot.version,
    });

    match loader.source() {
        DataSource::Excel { path } => {
            info["excel_file_path"] = json!(path.display().to_string());
            info["file_exists"] = json!(path.exists());
        }
        DataSource::Csv { path } => {
            info["csv_file_path"] = json!(path.display().to_string());
            info["file_exists"] = json!(path.exists());
        }
        DataSource::Sheets { url } => {
            info["sheets_url"] = json!(url.as_str());
        }
    }

    Ok(HttpResponse::Ok().json(info))
}
