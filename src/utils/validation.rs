use serde_json::Value;

use crate::errors::ApiError;
use crate::model::employee::{EmployeeForm, NewEmployee};
use crate::utils::datetime::parse_entry_date;

fn required<'a>(field: &'a Option<String>, name: &'static str) -> Result<&'a str, ApiError> {
    match field.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::MissingField(name)),
    }
}

fn parse_salary(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if !s.trim().is_empty() => s.trim().parse().ok(),
        _ => None,
    }
}

/// Checks a create/update payload against the employee business rules and
/// returns the parsed record. Applies equally to create and update; an
/// update always re-sends the full record.
///
/// Salary sign is not a business rule: zero and negative values are stored
/// as sent.
pub fn validate_employee(form: &EmployeeForm) -> Result<NewEmployee, ApiError> {
    let employee_code = required(&form.employee_code, "employeeCode")?.to_string();
    let name_en = required(&form.name_en, "nameEn")?.to_string();
    let name_ar = required(&form.name_ar, "nameAr")?.to_string();

    let dob = parse_entry_date(required(&form.dob, "dob")?)
        .ok_or(ApiError::InvalidDateFormat("dob"))?;
    let doj = parse_entry_date(required(&form.doj, "doj")?)
        .ok_or(ApiError::InvalidDateFormat("doj"))?;

    let salary = match &form.salary {
        None | Some(Value::Null) => return Err(ApiError::MissingField("salary")),
        Some(raw) => parse_salary(raw).ok_or(ApiError::InvalidSalary)?,
    };

    Ok(NewEmployee {
        employee_code,
        name_en,
        name_ar,
        dob,
        doj,
        salary,
    })
}
