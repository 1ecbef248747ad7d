use crate::api::attendance::{ClockRequest, ReportEntry};
use crate::api::employee::EmployeeResponse;
use crate::model::employee::EmployeeForm;
use crate::models::LoginRequest;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance Tracker API",
        version = "1.0.0",
        description = r#"
## Employee Attendance Tracker

Backend for a small office attendance system.

### 🔹 Key Features
- **Employee Master**
  - Add, update, list and delete employee records
- **Attendance**
  - One clock-in and one clock-out per employee per day
- **Report**
  - Joined attendance rows with worked totals

### 🔐 Security
All routes except `/login` require **JWT Bearer authentication**.
A default `admin` login is seeded on first startup.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::auth::handlers::login,

        crate::api::employee::list_employees,
        crate::api::employee::create_employee,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::attendance::clock_in,
        crate::api::attendance::clock_out,
        crate::api::attendance::report
    ),
    components(
        schemas(
            LoginRequest,
            EmployeeForm,
            EmployeeResponse,
            ClockRequest,
            ReportEntry
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Auth", description = "Session token APIs"),
        (name = "Employee", description = "Employee master APIs"),
        (name = "Attendance", description = "Clock-in/clock-out and report APIs"),
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
