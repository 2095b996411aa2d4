use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceStatus {
    Present,
    Late,
    #[serde(rename = "Half Day")]
    HalfDay,
    Absent,
}

impl AttendanceStatus {
    pub const ALL: [AttendanceStatus; 4] = [
        AttendanceStatus::Present,
        AttendanceStatus::Late,
        AttendanceStatus::HalfDay,
        AttendanceStatus::Absent,
    ];
}

/// Synthetic attendance for a single day. Generated per request, never stored.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AttendanceRecord {
    pub emp_code: String,
    pub emp_name: String,
    pub date: String,
    pub check_in: String,
    pub check_out: Option<String>,
    pub status: AttendanceStatus,
    pub hours_worked: Option<f64>,
}
