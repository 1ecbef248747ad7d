use chrono::{NaiveDate, NaiveTime};

/// Row model for the attendance table. A record is open while `clock_out`
/// is NULL; at most one row exists per (employee_id, date).
#[derive(Debug, sqlx::FromRow)]
pub struct Attendance {
    pub id: i64,
    pub employee_id: i64,
    pub date: NaiveDate,
    pub clock_in: NaiveTime,
    pub clock_out: Option<NaiveTime>,
}
