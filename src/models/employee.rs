use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmployeeStatus {
    #[default]
    Active,
    Inactive,
}

impl EmployeeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmployeeStatus::Active => "Active",
            EmployeeStatus::Inactive => "Inactive",
        }
    }

    /// Exact match only; anything else is treated as `Active`.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw {
            "Inactive" => EmployeeStatus::Inactive,
            _ => EmployeeStatus::Active,
        }
    }
}

impl fmt::Display for EmployeeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored employee record.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Employee {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub gender: Option<String>,
    pub dob: Option<NaiveDate>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub salary: Decimal,
    pub city: Option<String>,
    pub address: Option<String>,
    pub status: EmployeeStatus,
    pub created_at: DateTime<Utc>,
}

/// Validated field set for create and update. Only produced by
/// `utils::validation::parse_employee_form`.
#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub gender: Option<String>,
    pub dob: Option<NaiveDate>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub salary: Decimal,
    pub city: Option<String>,
    pub address: Option<String>,
    pub status: EmployeeStatus,
}

/// One page of the employee list together with the totals the pager needs.
#[derive(Serialize, Debug)]
pub struct EmployeePage {
    pub employees: Vec<Employee>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub pages: i64,
}

impl EmployeePage {
    pub fn new(employees: Vec<Employee>, total: i64, page: i64, per_page: i64) -> Self {
        let pages = if total > 0 { (total + per_page - 1) / per_page } else { 1 };
        Self {
            employees,
            total,
            page,
            per_page,
            pages,
        }
    }
}

pub const EXPORT_HEADER: [&str; 15] = [
    "ID",
    "First Name",
    "Last Name",
    "Email",
    "Phone",
    "Gender",
    "DOB",
    "Department",
    "Position",
    "Hire Date",
    "Salary",
    "City",
    "Address",
    "Status",
    "Created At",
];

/// An employee flattened to text cells, in `EXPORT_HEADER` order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow(pub [String; 15]);

impl From<&Employee> for ExportRow {
    fn from(e: &Employee) -> Self {
        fn opt_text(v: &Option<String>) -> String {
            v.clone().unwrap_or_default()
        }
        fn opt_date(v: &Option<NaiveDate>) -> String {
            v.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
        }

        ExportRow([
            e.id.to_string(),
            e.first_name.clone(),
            e.last_name.clone(),
            e.email.clone(),
            e.phone.clone(),
            opt_text(&e.gender),
            opt_date(&e.dob),
            opt_text(&e.department),
            opt_text(&e.position),
            opt_date(&e.hire_date),
            format!("{:.2}", e.salary),
            opt_text(&e.city),
            opt_text(&e.address),
            e.status.to_string(),
            e.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::str::FromStr;

    fn sample() -> Employee {
        Employee {
            id: 7,
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            email: "ann@x.com".to_string(),
            phone: String::new(),
            gender: None,
            dob: NaiveDate::from_ymd_opt(1990, 4, 2),
            department: Some("Sales".to_string()),
            position: None,
            hire_date: None,
            salary: Decimal::from_str("50000").unwrap(),
            city: None,
            address: None,
            status: EmployeeStatus::Inactive,
            created_at: Utc.with_ymd_and_hms(2024, 1, 5, 9, 30, 0).unwrap(),
        }
    }

    #[test]
    fn export_row_formats_salary_dates_and_nulls() {
        let row = ExportRow::from(&sample());
        assert_eq!(row.0[0], "7");
        assert_eq!(row.0[5], "");
        assert_eq!(row.0[6], "1990-04-02");
        assert_eq!(row.0[7], "Sales");
        assert_eq!(row.0[9], "");
        assert_eq!(row.0[10], "50000.00");
        assert_eq!(row.0[13], "Inactive");
        assert_eq!(row.0[14], "2024-01-05T09:30:00Z");
    }

    #[test]
    fn page_count_rounds_up_and_never_drops_below_one() {
        assert_eq!(EmployeePage::new(vec![], 0, 1, 10).pages, 1);
        assert_eq!(EmployeePage::new(vec![], 10, 1, 10).pages, 1);
        assert_eq!(EmployeePage::new(vec![], 11, 1, 10).pages, 2);
    }

    #[test]
    fn status_parsing_is_exact_and_lenient() {
        assert_eq!(EmployeeStatus::parse_lenient("Inactive"), EmployeeStatus::Inactive);
        assert_eq!(EmployeeStatus::parse_lenient("inactive"), EmployeeStatus::Active);
        assert_eq!(EmployeeStatus::parse_lenient(""), EmployeeStatus::Active);
    }
}
