use chrono::{Local, NaiveDate};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::attendance::{AttendanceRecord, AttendanceStatus};

const HALF_DAY_HOURS: f64 = 4.0;

/// Today's synthetic attendance for an employee. Each call draws afresh, so
/// repeated calls on the same day may disagree.
pub fn generate(emp_code: &str, emp_name: &str) -> AttendanceRecord {
    generate_with(&mut rand::thread_rng(), Local::now().date_naive(), emp_code, emp_name)
}

pub fn generate_with<R: Rng>(
    rng: &mut R,
    date: NaiveDate,
    emp_code: &str,
    emp_name: &str,
) -> AttendanceRecord {
    let status = *AttendanceStatus::ALL
        .choose(rng)
        .unwrap_or(&AttendanceStatus::Absent);

    let mut record = AttendanceRecord {
        emp_code: emp_code.to_string(),
        emp_name: emp_name.to_string(),
        date: date.format("%Y-%m-%d").to_string(),
        check_in: String::new(),
        check_out: Some(String::new()),
        status,
        hours_worked: Some(0.0),
    };

    if status == AttendanceStatus::Absent {
        return record;
    }

    let (in_hour, in_minute) = (rng.gen_range(8..=10), rng.gen_range(0..=59));
    record.check_in = clock(in_hour, in_minute);

    if status == AttendanceStatus::HalfDay {
        record.check_out = None;
        record.hours_worked = Some(HALF_DAY_HOURS);
        return record;
    }

    let (out_hour, out_minute) = (rng.gen_range(17..=20), rng.gen_range(0..=59));
    record.check_out = Some(clock(out_hour, out_minute));
    record.hours_worked = Some(hours_between(in_hour, in_minute, out_hour, out_minute));
    record
}

fn clock(hour: u32, minute: u32) -> String {
    format!("{:02}:{:02}", hour, minute)
}

/// Elapsed hours rounded to one decimal, never below zero.
fn hours_between(in_hour: u32, in_minute: u32, out_hour: u32, out_minute: u32) -> f64 {
    let hours = (out_hour as f64 - in_hour as f64) + (out_minute as f64 - in_minute as f64) / 60.0;
    ((hours * 10.0).round() / 10.0).max(0.0)
}
