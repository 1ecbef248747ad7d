use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;

/// Row model for the employees table. Dates are stored `YYYY-MM-DD`.
#[derive(Debug, sqlx::FromRow)]
pub struct Employee {
    pub id: i64,
    pub employee_code: String,
    pub name_en: String,
    pub name_ar: String,
    pub dob: NaiveDate,
    pub doj: NaiveDate,
    pub salary: f64,
}

/// Incoming create/update payload.
///
/// Every field is optional at the serde layer so that a missing field is
/// reported by the validator as a typed error instead of a bare
/// deserialization failure. Dates arrive as entered, `DD-MM-YYYY`.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeForm {
    #[schema(example = "E-1001")]
    pub employee_code: Option<String>,
    #[schema(example = "Sara Haddad")]
    pub name_en: Option<String>,
    #[schema(example = "سارة حداد")]
    pub name_ar: Option<String>,
    #[schema(example = "21-03-1992", value_type = String)]
    pub dob: Option<String>,
    #[schema(example = "01-09-2021", value_type = String)]
    pub doj: Option<String>,
    #[schema(example = "3500", value_type = String)]
    pub salary: Option<serde_json::Value>,
}

/// A validated employee ready for persistence.
#[derive(Debug)]
pub struct NewEmployee {
    pub employee_code: String,
    pub name_en: String,
    pub name_ar: String,
    pub dob: NaiveDate,
    pub doj: NaiveDate,
    pub salary: f64,
}
