use serde::{Deserialize, Serialize};

/// Canonical employee record. Optional columns are `None` when the source
/// cell is missing or blank; they are never stored as empty strings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EmployeeRecord {
    pub emp_code: String,
    pub emp_name: String,
    pub department: String,
    pub location: String,
    pub designation: String,
    pub mobile: String,
    pub extension_number: Option<String>,
    pub email: Option<String>,
    pub joining_date: Option<String>,
    pub reporting_manager: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EmployeeField {
    EmpCode,
    EmpName,
    Department,
    Location,
    Designation,
    Mobile,
    ExtensionNumber,
    Email,
    JoiningDate,
    ReportingManager,
    ImageUrl,
}

impl EmployeeField {
    pub const ALL: [EmployeeField; 11] = [
        EmployeeField::EmpCode,
        EmployeeField::EmpName,
        EmployeeField::Department,
        EmployeeField::Location,
        EmployeeField::Designation,
        EmployeeField::Mobile,
        EmployeeField::ExtensionNumber,
        EmployeeField::Email,
        EmployeeField::JoiningDate,
        EmployeeField::ReportingManager,
        EmployeeField::ImageUrl,
    ];

    pub const REQUIRED: [EmployeeField; 6] = [
        EmployeeField::EmpCode,
        EmployeeField::EmpName,
        EmployeeField::Department,
        EmployeeField::Location,
        EmployeeField::Designation,
        EmployeeField::Mobile,
    ];

    /// Fields offered for autocomplete, filtering and dropdown values.
    pub const SEARCHABLE: [EmployeeField; 8] = [
        EmployeeField::EmpCode,
        EmployeeField::EmpName,
        EmployeeField::Department,
        EmployeeField::Location,
        EmployeeField::Designation,
        EmployeeField::Mobile,
        EmployeeField::ExtensionNumber,
        EmployeeField::Email,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EmployeeField::EmpCode => "emp_code",
            EmployeeField::EmpName => "emp_name",
            EmployeeField::Department => "department",
            EmployeeField::Location => "location",
            EmployeeField::Designation => "designation",
            EmployeeField::Mobile => "mobile",
            EmployeeField::ExtensionNumber => "extension_number",
            EmployeeField::Email => "email",
            EmployeeField::JoiningDate => "joining_date",
            EmployeeField::ReportingManager => "reporting_manager",
            EmployeeField::ImageUrl => "image_url",
        }
    }

    /// Key used by the field-values listing (`departments`, `emp_codes`, ...).
    pub fn plural_key(self) -> &'static str {
        match self {
            EmployeeField::EmpCode => "emp_codes",
            EmployeeField::EmpName => "emp_names",
            EmployeeField::Department => "departments",
            EmployeeField::Location => "locations",
            EmployeeField::Designation => "designations",
            EmployeeField::Mobile => "mobiles",
            EmployeeField::ExtensionNumber => "extension_numbers",
            EmployeeField::Email => "emails",
            EmployeeField::JoiningDate => "joining_dates",
            EmployeeField::ReportingManager => "reporting_managers",
            EmployeeField::ImageUrl => "image_urls",
        }
    }

    pub fn from_name(name: &str) -> Option<EmployeeField> {
        EmployeeField::ALL
            .into_iter()
            .find(|field| field.as_str() == name)
    }

    /// Like `from_name`, but only yields fields that can be searched on.
    pub fn searchable(name: &str) -> Option<EmployeeField> {
        EmployeeField::from_name(name).filter(|field| field.is_searchable())
    }

    pub fn is_searchable(self) -> bool {
        EmployeeField::SEARCHABLE.contains(&self)
    }
}

impl EmployeeRecord {
    pub fn get(&self, field: EmployeeField) -> Option<&str> {
        match field {
            EmployeeField::EmpCode => Some(self.emp_code.as_str()),
            EmployeeField::EmpName => Some(self.emp_name.as_str()),
            EmployeeField::Department => Some(self.department.as_str()),
            EmployeeField::Location => Some(self.location.as_str()),
            EmployeeField::Designation => Some(self.designation.as_str()),
            EmployeeField::Mobile => Some(self.mobile.as_str()),
            EmployeeField::ExtensionNumber => self.extension_number.as_deref(),
            EmployeeField::Email => self.email.as_deref(),
            EmployeeField::JoiningDate => self.joining_date.as_deref(),
            EmployeeField::ReportingManager => self.reporting_manager.as_deref(),
            EmployeeField::ImageUrl => self.image_url.as_deref(),
        }
    }

    /// Every populated field value, in canonical field order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        EmployeeField::ALL
            .into_iter()
            .filter_map(move |field| self.get(field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> EmployeeRecord {
        EmployeeRecord {
            emp_code: "81096".to_string(),
            emp_name: "ANIRUDH VERMA".to_string(),
            department: "IT".to_string(),
            location: "IFC".to_string(),
            designation: "IT EXECUTIVE".to_string(),
            mobile: "8929987500".to_string(),
            extension_number: Some("1001".to_string()),
            email: None,
            joining_date: None,
            reporting_manager: Some("CHANDAN".to_string()),
            image_url: None,
        }
    }

    #[test]
    fn field_names_round_trip() {
        for field in EmployeeField::ALL {
            assert_eq!(EmployeeField::from_name(field.as_str()), Some(field));
        }
        assert_eq!(EmployeeField::from_name("grade"), None);
    }

    #[test]
    fn only_listed_fields_are_searchable() {
        assert_eq!(
            EmployeeField::searchable("extension_number"),
            Some(EmployeeField::ExtensionNumber)
        );
        assert_eq!(EmployeeField::searchable("reporting_manager"), None);
        assert_eq!(EmployeeField::searchable("nope"), None);
    }

    #[test]
    fn values_skip_missing_optional_fields() {
        let record = record();
        let values: Vec<&str> = record.values().collect();
        assert_eq!(values.len(), 8);
        assert!(values.contains(&"CHANDAN"));
        assert!(values.contains(&"1001"));
    }

    #[test]
    fn absent_optional_fields_serialize_as_null() {
        let json = serde_json::to_value(record()).unwrap();
        assert!(json["email"].is_null());
        assert_eq!(json["extension_number"], "1001");
    }
}
