use actix_web::{HttpResponse, Responder, web};
use serde::Serialize;
use serde_json::json;
use sqlx::SqlitePool;
use tracing::info;
use utoipa::ToSchema;

use crate::errors::ApiError;
use crate::model::employee::{Employee, EmployeeForm, NewEmployee};
use crate::utils::datetime::to_display_format;
use crate::utils::validation::validate_employee;

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeResponse {
    pub id: i64,
    #[schema(example = "E-1001")]
    pub employee_code: String,
    #[schema(example = "Sara Haddad")]
    pub name_en: String,
    #[schema(example = "سارة حداد")]
    pub name_ar: String,
    #[schema(example = "21/03/1992")]
    pub dob: String,
    #[schema(example = "01/09/2021")]
    pub doj: String,
    #[schema(example = 3500.0)]
    pub salary: f64,
}

impl From<Employee> for EmployeeResponse {
    fn from(e: Employee) -> Self {
        Self {
            id: e.id,
            employee_code: e.employee_code,
            name_en: e.name_en,
            name_ar: e.name_ar,
            dob: to_display_format(e.dob),
            doj: to_display_format(e.doj),
            salary: e.salary,
        }
    }
}

/// The unique index on employee_code reports duplicates; everything else is
/// a storage failure.
fn map_unique_violation(e: sqlx::Error) -> ApiError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return ApiError::DuplicateEmployeeCode;
        }
    }
    e.into()
}

pub async fn fetch_employees(pool: &SqlitePool) -> Result<Vec<Employee>, ApiError> {
    let employees = sqlx::query_as::<_, Employee>(
        r#"
        SELECT id, employee_code, name_en, name_ar, dob, doj, salary
        FROM employees
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(employees)
}

pub async fn insert_employee(pool: &SqlitePool, emp: &NewEmployee) -> Result<i64, ApiError> {
    let result = sqlx::query(
        r#"
        INSERT INTO employees (employee_code, name_en, name_ar, dob, doj, salary)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&emp.employee_code)
    .bind(&emp.name_en)
    .bind(&emp.name_ar)
    .bind(emp.dob)
    .bind(emp.doj)
    .bind(emp.salary)
    .execute(pool)
    .await
    .map_err(map_unique_violation)?;

    Ok(result.last_insert_rowid())
}

/// Full replace of the six business fields.
pub async fn update_employee_row(
    pool: &SqlitePool,
    id: i64,
    emp: &NewEmployee,
) -> Result<(), ApiError> {
    let result = sqlx::query(
        r#"
        UPDATE employees
        SET employee_code = ?, name_en = ?, name_ar = ?, dob = ?, doj = ?, salary = ?
        WHERE id = ?
        "#,
    )
    .bind(&emp.employee_code)
    .bind(&emp.name_en)
    .bind(&emp.name_ar)
    .bind(emp.dob)
    .bind(emp.doj)
    .bind(emp.salary)
    .bind(id)
    .execute(pool)
    .await
    .map_err(map_unique_violation)?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Employee"));
    }

    Ok(())
}

pub async fn delete_employee_row(pool: &SqlitePool, id: i64) -> Result<(), ApiError> {
    let result = sqlx::query(r#"DELETE FROM employees WHERE id = ?"#)
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Employee"));
    }

    Ok(())
}

/// List employees
#[utoipa::path(
    get,
    path = "/employees",
    responses(
        (status = 200, description = "All employees, dates in display format", body = [EmployeeResponse]),
        (status = 401, description = "Missing token"),
        (status = 403, description = "Invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn list_employees(pool: web::Data<SqlitePool>) -> Result<impl Responder, ApiError> {
    let employees = fetch_employees(pool.get_ref()).await?;
    let rows: Vec<EmployeeResponse> = employees.into_iter().map(Into::into).collect();

    Ok(HttpResponse::Ok().json(rows))
}

/// Create employee
#[utoipa::path(
    post,
    path = "/employees",
    request_body = EmployeeForm,
    responses(
        (status = 201, description = "Employee created", body = Object, example = json!({"id": 1})),
        (status = 400, description = "Missing/invalid field or duplicate employee code"),
        (status = 401, description = "Missing token"),
        (status = 403, description = "Invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn create_employee(
    pool: web::Data<SqlitePool>,
    payload: web::Json<EmployeeForm>,
) -> Result<impl Responder, ApiError> {
    let emp = validate_employee(&payload)?;
    let id = insert_employee(pool.get_ref(), &emp).await?;

    info!(id, employee_code = %emp.employee_code, "Employee created");

    Ok(HttpResponse::Created().json(json!({ "id": id })))
}

/// Update employee
#[utoipa::path(
    put,
    path = "/employees/{id}",
    params(("id", Path, description = "Employee ID")),
    request_body = EmployeeForm,
    responses(
        (status = 200, description = "Employee updated", body = Object, example = json!({
            "message": "Updated"
        })),
        (status = 400, description = "Missing/invalid field or duplicate employee code"),
        (status = 404, description = "Employee not found"),
        (status = 401, description = "Missing token"),
        (status = 403, description = "Invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn update_employee(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    payload: web::Json<EmployeeForm>,
) -> Result<impl Responder, ApiError> {
    let id = path.into_inner();
    let emp = validate_employee(&payload)?;
    update_employee_row(pool.get_ref(), id, &emp).await?;

    info!(id, "Employee updated");

    Ok(HttpResponse::Ok().json(json!({ "message": "Updated" })))
}

/// Delete employee
#[utoipa::path(
    delete,
    path = "/employees/{id}",
    params(("id", Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee deleted", body = Object, example = json!({
            "message": "Deleted"
        })),
        (status = 404, description = "Employee not found"),
        (status = 401, description = "Missing token"),
        (status = 403, description = "Invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn delete_employee(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> Result<impl Responder, ApiError> {
    let id = path.into_inner();
    delete_employee_row(pool.get_ref(), id).await?;

    info!(id, "Employee deleted");

    Ok(HttpResponse::Ok().json(json!({ "message": "Deleted" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::utils::datetime::parse_entry_date;

    fn sample(code: &str, name_en: &str) -> NewEmployee {
        NewEmployee {
            employee_code: code.to_string(),
            name_en: name_en.to_string(),
            name_ar: "موظف".to_string(),
            dob: parse_entry_date("21-03-1992").unwrap(),
            doj: parse_entry_date("01-09-2021").unwrap(),
            salary: 3500.0,
        }
    }

    #[actix_web::test]
    async fn insert_and_fetch_round_trip() {
        let pool = db::test_pool().await;
        let id = insert_employee(&pool, &sample("E1", "Sara Haddad"))
            .await
            .unwrap();

        let employees = fetch_employees(&pool).await.unwrap();
        assert_eq!(employees.len(), 1);
        assert_eq!(employees[0].id, id);
        assert_eq!(employees[0].employee_code, "E1");
        assert_eq!(employees[0].dob.to_string(), "1992-03-21");
    }

    #[actix_web::test]
    async fn duplicate_code_is_a_conflict_regardless_of_other_fields() {
        let pool = db::test_pool().await;
        insert_employee(&pool, &sample("E1", "Sara Haddad"))
            .await
            .unwrap();

        let err = insert_employee(&pool, &sample("E1", "Omar Nasser"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::DuplicateEmployeeCode));

        // the failed insert left nothing behind
        assert_eq!(fetch_employees(&pool).await.unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn update_replaces_all_business_fields() {
        let pool = db::test_pool().await;
        let id = insert_employee(&pool, &sample("E1", "Sara Haddad"))
            .await
            .unwrap();

        let mut replacement = sample("E2", "Sara H.");
        replacement.salary = 4000.0;
        update_employee_row(&pool, id, &replacement).await.unwrap();

        let employees = fetch_employees(&pool).await.unwrap();
        assert_eq!(employees[0].employee_code, "E2");
        assert_eq!(employees[0].name_en, "Sara H.");
        assert_eq!(employees[0].salary, 4000.0);
    }

    #[actix_web::test]
    async fn update_to_a_taken_code_is_a_conflict() {
        let pool = db::test_pool().await;
        insert_employee(&pool, &sample("E1", "Sara Haddad"))
            .await
            .unwrap();
        let id = insert_employee(&pool, &sample("E2", "Omar Nasser"))
            .await
            .unwrap();

        let err = update_employee_row(&pool, id, &sample("E1", "Omar Nasser"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::DuplicateEmployeeCode));
    }

    #[actix_web::test]
    async fn unknown_ids_are_not_found() {
        let pool = db::test_pool().await;

        let err = update_employee_row(&pool, 42, &sample("E1", "Sara Haddad"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound("Employee")));

        let err = delete_employee_row(&pool, 42).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound("Employee")));
    }

    #[actix_web::test]
    async fn delete_removes_the_row() {
        let pool = db::test_pool().await;
        let id = insert_employee(&pool, &sample("E1", "Sara Haddad"))
            .await
            .unwrap();

        delete_employee_row(&pool, id).await.unwrap();
        assert!(fetch_employees(&pool).await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn responses_carry_display_dates() {
        let pool = db::test_pool().await;
        insert_employee(&pool, &sample("E1", "Sara Haddad"))
            .await
            .unwrap();

        let employees = fetch_employees(&pool).await.unwrap();
        let response: EmployeeResponse = employees.into_iter().next().unwrap().into();
        assert_eq!(response.dob, "21/03/1992");
        assert_eq!(response.doj, "01/09/2021");
    }
}
