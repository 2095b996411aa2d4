use std::collections::HashMap;
use std::io::Cursor;

use calamine::{DataType, Reader, Xlsx};
use log::{debug, warn};

use crate::errors::SourceError;
use crate::models::employee::{EmployeeField, EmployeeRecord};

/// Known spreadsheet headers and the canonical field each one feeds.
/// Headers are compared after trimming and upper-casing.
const COLUMN_MAPPING: [(&str, EmployeeField); 14] = [
    ("EMP ID", EmployeeField::EmpCode),
    ("EMP CODE", EmployeeField::EmpCode),
    ("EMP NAME", EmployeeField::EmpName),
    ("DEPARTMENT", EmployeeField::Department),
    ("LOCATION", EmployeeField::Location),
    ("GRADE", EmployeeField::Designation),
    ("DESIGNATION", EmployeeField::Designation),
    ("MOBILE", EmployeeField::Mobile),
    ("EXTENSION NUMBER", EmployeeField::ExtensionNumber),
    ("EMAIL ID", EmployeeField::Email),
    ("EMAIL", EmployeeField::Email),
    ("DATE OF JOINING", EmployeeField::JoiningDate),
    ("REPORTING MANAGER", EmployeeField::ReportingManager),
    ("IMAGE", EmployeeField::ImageUrl),
];

pub fn canonical_field(header: &str) -> Option<EmployeeField> {
    let header = header.trim().to_uppercase();
    COLUMN_MAPPING
        .iter()
        .find(|(raw, _)| *raw == header)
        .map(|(_, field)| *field)
}

/// Maps positional rows onto canonical records.
///
/// Unknown headers are ignored, short rows simply lack the trailing cells,
/// and rows missing any required field are dropped. When two rows share an
/// `emp_code` the later row replaces the earlier one in place.
pub fn map_rows<I>(headers: &[String], rows: I) -> Vec<EmployeeRecord>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let columns: Vec<Option<EmployeeField>> = headers.iter().map(|h| canonical_field(h)).collect();

    let mut records: Vec<EmployeeRecord> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for (line, row) in rows.into_iter().enumerate() {
        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let mut cells: HashMap<EmployeeField, String> = HashMap::new();
        for (field, cell) in columns.iter().zip(row.iter()) {
            let Some(field) = field else { continue };
            let value = cell.trim();
            if value.is_empty() {
                continue;
            }
            // With aliased headers (GRADE and DESIGNATION), the first populated column wins.
            cells.entry(*field).or_insert_with(|| value.to_string());
        }

        let Some(record) = build_record(cells) else {
            debug!("Dropping data row {}: missing required fields", line + 1);
            continue;
        };

        match positions.get(&record.emp_code).copied() {
            Some(index) => {
                warn!(
                    "Duplicate emp_code {} in data row {}; keeping the later row",
                    record.emp_code,
                    line + 1
                );
                records[index] = record;
            }
            None => {
                positions.insert(record.emp_code.clone(), records.len());
                records.push(record);
            }
        }
    }

    records
}

fn build_record(mut cells: HashMap<EmployeeField, String>) -> Option<EmployeeRecord> {
    if EmployeeField::REQUIRED.iter().any(|f| !cells.contains_key(f)) {
        return None;
    }
    let mut take = |field: EmployeeField| cells.remove(&field);
    Some(EmployeeRecord {
        emp_code: take(EmployeeField::EmpCode)?,
        emp_name: take(EmployeeField::EmpName)?,
        department: take(EmployeeField::Department)?,
        location: take(EmployeeField::Location)?,
        designation: take(EmployeeField::Designation)?,
        mobile: take(EmployeeField::Mobile)?,
        extension_number: take(EmployeeField::ExtensionNumber),
        email: take(EmployeeField::Email),
        joining_date: take(EmployeeField::JoiningDate),
        reporting_manager: take(EmployeeField::ReportingManager),
        image_url: take(EmployeeField::ImageUrl),
    })
}

/// Parses delimited text with a header row. Quoted fields may contain commas
/// and newlines; rows may be shorter or longer than the header.
pub fn parse_csv(text: &str) -> Result<Vec<EmployeeRecord>, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        match result {
            Ok(record) => rows.push(record.iter().map(|c| c.to_string()).collect()),
            Err(err) => warn!("Skipping unreadable CSV row: {}", err),
        }
    }

    Ok(map_rows(&headers, rows))
}

/// Reads the first worksheet of an `.xlsx` workbook. The first row is the header.
pub fn parse_xlsx(bytes: &[u8]) -> Result<Vec<EmployeeRecord>, SourceError> {
    let mut workbook = Xlsx::new(Cursor::new(bytes))
        .map_err(|err| SourceError::Workbook(format!("failed to open workbook: {}", err)))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| SourceError::Workbook("workbook has no sheets".to_string()))?;

    let range = match workbook.worksheet_range(&sheet_name) {
        Some(Ok(range)) => range,
        Some(Err(err)) => {
            return Err(SourceError::Workbook(format!(
                "failed to read sheet '{}': {}",
                sheet_name, err
            )))
        }
        None => return Err(SourceError::Workbook(format!("sheet '{}' is missing", sheet_name))),
    };

    let mut rows = range.rows().map(|row| row.iter().map(cell_text).collect::<Vec<String>>());
    let Some(headers) = rows.next() else {
        return Ok(Vec::new());
    };

    Ok(map_rows(&headers, rows))
}

fn cell_text(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.clone(),
        DataType::Int(v) => v.to_string(),
        // Employee codes and phone numbers usually arrive as floats.
        DataType::Float(v) if v.fract() == 0.0 && v.abs() < 1e15 => format!("{}", *v as i64),
        DataType::Float(v) => v.to_string(),
        DataType::Bool(b) => b.to_string(),
        DataType::DateTime(_) => cell
            .as_date()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        DataType::DateTimeIso(s) => s.split('T').next().unwrap_or_default().to_string(),
        DataType::Duration(v) => v.to_string(),
        DataType::DurationIso(s) => s.clone(),
        DataType::Error(_) | DataType::Empty => String::new(),
    }
}
