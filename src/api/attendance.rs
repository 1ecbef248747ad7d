use actix_web::{HttpResponse, Responder, web};
use chrono::{Local, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::SqlitePool;
use tracing::info;
use utoipa::ToSchema;

use crate::errors::ApiError;
use crate::model::attendance::Attendance;
use crate::utils::datetime::{elapsed, to_display_format};

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClockRequest {
    #[schema(example = 1)]
    pub employee_id: i64,
}

/// One report row: an attendance record joined to its employee. Open
/// records carry empty clock-out and total fields.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportEntry {
    #[schema(example = "Sara Haddad")]
    pub name_en: String,
    #[schema(example = "05/01/2024")]
    pub date: String,
    #[schema(example = "09:00:00")]
    pub clock_in: String,
    #[schema(example = "17:30:15")]
    pub clock_out: String,
    #[schema(example = "08:30:15")]
    pub total_time: String,
}

#[derive(sqlx::FromRow)]
struct ReportRow {
    name_en: String,
    date: NaiveDate,
    clock_in: NaiveTime,
    clock_out: Option<NaiveTime>,
}

/// Date and time-of-day at the instant of the request, from the server
/// clock. Clients never supply these, so records cannot be backdated.
fn server_now() -> (NaiveDate, NaiveTime) {
    let now = Local::now().naive_local();
    let time = now.time().with_nanosecond(0).unwrap_or_else(|| now.time());
    (now.date(), time)
}

/// Opens today's record for the employee. The existence check and the
/// insert share one transaction, and the unique (employee_id, date) index
/// catches a concurrent duplicate that slips between them.
pub async fn record_clock_in(pool: &SqlitePool, employee_id: i64) -> Result<(), ApiError> {
    let (today, time) = server_now();

    let mut tx = pool.begin().await?;

    let employee_exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM employees WHERE id = ?)",
    )
    .bind(employee_id)
    .fetch_one(&mut *tx)
    .await?;

    if !employee_exists {
        return Err(ApiError::NotFound("Employee"));
    }

    let has_record = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM attendance WHERE employee_id = ? AND date = ?)",
    )
    .bind(employee_id)
    .bind(today)
    .fetch_one(&mut *tx)
    .await?;

    if has_record {
        return Err(ApiError::AlreadyClockedIn);
    }

    sqlx::query(
        r#"
        INSERT INTO attendance (employee_id, date, clock_in)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(employee_id)
    .bind(today)
    .bind(time)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return ApiError::AlreadyClockedIn;
            }
        }
        e.into()
    })?;

    tx.commit().await?;
    Ok(())
}

/// Closes today's open record for the employee. Closed is terminal for the
/// day; nothing reopens it.
pub async fn record_clock_out(pool: &SqlitePool, employee_id: i64) -> Result<(), ApiError> {
    let (today, time) = server_now();

    let mut tx = pool.begin().await?;

    let record = sqlx::query_as::<_, Attendance>(
        r#"
        SELECT id, employee_id, date, clock_in, clock_out
        FROM attendance
        WHERE employee_id = ? AND date = ?
        "#,
    )
    .bind(employee_id)
    .bind(today)
    .fetch_optional(&mut *tx)
    .await?;

    let record = match record {
        None => return Err(ApiError::NotClockedIn),
        Some(r) if r.clock_out.is_some() => return Err(ApiError::AlreadyClockedOut),
        Some(r) => r,
    };

    let result = sqlx::query(
        r#"
        UPDATE attendance
        SET clock_out = ?
        WHERE id = ? AND clock_out IS NULL
        "#,
    )
    .bind(time)
    .bind(record.id)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::AlreadyClockedOut);
    }

    tx.commit().await?;
    Ok(())
}

/// Attendance joined to employees, one row per record, oldest date first
/// then by employee name.
pub async fn fetch_report(pool: &SqlitePool) -> Result<Vec<ReportEntry>, ApiError> {
    let rows = sqlx::query_as::<_, ReportRow>(
        r#"
        SELECT e.name_en, a.date, a.clock_in, a.clock_out
        FROM attendance a
        JOIN employees e ON e.id = a.employee_id
        ORDER BY a.date ASC, e.name_en ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| ReportEntry {
            name_en: r.name_en,
            date: to_display_format(r.date),
            clock_in: r.clock_in.format("%H:%M:%S").to_string(),
            clock_out: r
                .clock_out
                .map(|t| t.format("%H:%M:%S").to_string())
                .unwrap_or_default(),
            total_time: elapsed(Some(r.clock_in), r.clock_out).unwrap_or_default(),
        })
        .collect())
}

/// Clock-in endpoint
#[utoipa::path(
    post,
    path = "/attendance/clock-in",
    request_body = ClockRequest,
    responses(
        (status = 200, description = "Clocked in", body = Object, example = json!({
            "message": "Clocked In"
        })),
        (status = 400, description = "Already clocked in today"),
        (status = 404, description = "Employee not found"),
        (status = 401, description = "Missing token"),
        (status = 403, description = "Invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn clock_in(
    pool: web::Data<SqlitePool>,
    body: web::Json<ClockRequest>,
) -> Result<impl Responder, ApiError> {
    record_clock_in(pool.get_ref(), body.employee_id).await?;

    info!(employee_id = body.employee_id, "Clocked in");

    Ok(HttpResponse::Ok().json(json!({ "message": "Clocked In" })))
}

/// Clock-out endpoint
#[utoipa::path(
    post,
    path = "/attendance/clock-out",
    request_body = ClockRequest,
    responses(
        (status = 200, description = "Clocked out", body = Object, example = json!({
            "message": "Clocked Out"
        })),
        (status = 400, description = "Not clocked in or already clocked out today"),
        (status = 401, description = "Missing token"),
        (status = 403, description = "Invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn clock_out(
    pool: web::Data<SqlitePool>,
    body: web::Json<ClockRequest>,
) -> Result<impl Responder, ApiError> {
    record_clock_out(pool.get_ref(), body.employee_id).await?;

    info!(employee_id = body.employee_id, "Clocked out");

    Ok(HttpResponse::Ok().json(json!({ "message": "Clocked Out" })))
}

/// Attendance report endpoint
#[utoipa::path(
    get,
    path = "/attendance/report",
    responses(
        (status = 200, description = "Joined attendance rows", body = [ReportEntry]),
        (status = 401, description = "Missing token"),
        (status = 403, description = "Invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn report(pool: web::Data<SqlitePool>) -> Result<impl Responder, ApiError> {
    let rows = fetch_report(pool.get_ref()).await?;

    Ok(HttpResponse::Ok().json(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    async fn seed_employee(pool: &SqlitePool, code: &str, name_en: &str) -> i64 {
        sqlx::query(
            r#"
            INSERT INTO employees (employee_code, name_en, name_ar, dob, doj, salary)
            VALUES (?, ?, ?, '1992-03-21', '2021-09-01', 3500)
            "#,
        )
        .bind(code)
        .bind(name_en)
        .bind(name_en)
        .execute(pool)
        .await
        .unwrap()
        .last_insert_rowid()
    }

    async fn seed_attendance(
        pool: &SqlitePool,
        employee_id: i64,
        date: &str,
        clock_in: &str,
        clock_out: Option<&str>,
    ) {
        sqlx::query(
            r#"
            INSERT INTO attendance (employee_id, date, clock_in, clock_out)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(employee_id)
        .bind(date)
        .bind(clock_in)
        .bind(clock_out)
        .execute(pool)
        .await
        .unwrap();
    }

    async fn count_records(pool: &SqlitePool, employee_id: i64) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM attendance WHERE employee_id = ?")
            .bind(employee_id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[actix_web::test]
    async fn clock_in_opens_todays_record() {
        let pool = db::test_pool().await;
        let id = seed_employee(&pool, "E1", "Sara Haddad").await;

        record_clock_in(&pool, id).await.unwrap();

        let record = sqlx::query_as::<_, Attendance>(
            "SELECT id, employee_id, date, clock_in, clock_out FROM attendance WHERE employee_id = ?",
        )
        .bind(id)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(record.date, Local::now().date_naive());
        assert!(record.clock_out.is_none());
    }

    #[actix_web::test]
    async fn second_clock_in_same_day_is_rejected() {
        let pool = db::test_pool().await;
        let id = seed_employee(&pool, "E1", "Sara Haddad").await;

        record_clock_in(&pool, id).await.unwrap();
        let err = record_clock_in(&pool, id).await.unwrap_err();

        assert!(matches!(err, ApiError::AlreadyClockedIn));
        assert_eq!(count_records(&pool, id).await, 1);
    }

    #[actix_web::test]
    async fn clock_in_requires_a_known_employee() {
        let pool = db::test_pool().await;

        let err = record_clock_in(&pool, 42).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound("Employee")));
    }

    #[actix_web::test]
    async fn clock_out_without_clock_in_is_rejected() {
        let pool = db::test_pool().await;
        let id = seed_employee(&pool, "E1", "Sara Haddad").await;

        let err = record_clock_out(&pool, id).await.unwrap_err();
        assert!(matches!(err, ApiError::NotClockedIn));
    }

    #[actix_web::test]
    async fn closed_record_stays_closed() {
        let pool = db::test_pool().await;
        let id = seed_employee(&pool, "E1", "Sara Haddad").await;

        record_clock_in(&pool, id).await.unwrap();
        record_clock_out(&pool, id).await.unwrap();

        let err = record_clock_out(&pool, id).await.unwrap_err();
        assert!(matches!(err, ApiError::AlreadyClockedOut));

        // and the day cannot be reopened
        let err = record_clock_in(&pool, id).await.unwrap_err();
        assert!(matches!(err, ApiError::AlreadyClockedIn));
        assert_eq!(count_records(&pool, id).await, 1);
    }

    #[actix_web::test]
    async fn deleting_an_employee_clears_their_attendance() {
        let pool = db::test_pool().await;
        let id = seed_employee(&pool, "E1", "Sara Haddad").await;
        seed_attendance(&pool, id, "2024-01-05", "09:00:00", Some("17:00:00")).await;

        crate::api::employee::delete_employee_row(&pool, id)
            .await
            .unwrap();

        assert_eq!(count_records(&pool, id).await, 0);
        assert!(fetch_report(&pool).await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn report_computes_totals_for_closed_records() {
        let pool = db::test_pool().await;
        let id = seed_employee(&pool, "E1", "Sara Haddad").await;
        seed_attendance(&pool, id, "2024-01-05", "09:00:00", Some("17:30:15")).await;

        let rows = fetch_report(&pool).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name_en, "Sara Haddad");
        assert_eq!(rows[0].date, "05/01/2024");
        assert_eq!(rows[0].clock_in, "09:00:00");
        assert_eq!(rows[0].clock_out, "17:30:15");
        assert_eq!(rows[0].total_time, "08:30:15");
    }

    #[actix_web::test]
    async fn report_leaves_open_records_blank() {
        let pool = db::test_pool().await;
        let id = seed_employee(&pool, "E1", "Sara Haddad").await;
        seed_attendance(&pool, id, "2024-01-05", "09:00:00", None).await;

        let rows = fetch_report(&pool).await.unwrap();
        assert_eq!(rows[0].clock_out, "");
        assert_eq!(rows[0].total_time, "");
    }

    #[actix_web::test]
    async fn report_orders_by_date_then_name() {
        let pool = db::test_pool().await;
        let a = seed_employee(&pool, "E1", "Omar Nasser").await;
        let b = seed_employee(&pool, "E2", "Sara Haddad").await;

        seed_attendance(&pool, b, "2024-01-06", "09:00:00", Some("17:00:00")).await;
        seed_attendance(&pool, b, "2024-01-05", "09:00:00", Some("17:00:00")).await;
        seed_attendance(&pool, a, "2024-01-06", "08:00:00", Some("16:00:00")).await;

        let rows = fetch_report(&pool).await.unwrap();
        let order: Vec<(&str, &str)> = rows
            .iter()
            .map(|r| (r.date.as_str(), r.name_en.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("05/01/2024", "Sara Haddad"),
                ("06/01/2024", "Omar Nasser"),
                ("06/01/2024", "Sara Haddad"),
            ]
        );
    }
}
