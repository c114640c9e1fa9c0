use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::str::FromStr;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::models::employee::{Employee, EmployeeInput, EmployeeStatus};

const NAMES_REQUIRED: &str = "First name and last name are required.";
const EMAIL_INVALID: &str = "A valid email is required.";
const SALARY_REQUIRED: &str = "Salary is required.";
const SALARY_NOT_A_NUMBER: &str = "Salary must be a valid number.";
const SALARY_NEGATIVE: &str = "Salary cannot be negative.";
const SALARY_TOO_LARGE: &str = "Salary is too large.";
const DATE_FORMAT: &str = "Dates must be in YYYY-MM-DD format.";

/// Largest value the `NUMERIC(12, 2)` salary column holds.
// 999_999_999_999 with scale 2 (= 9_999_999_999.99); `Decimal::new` is not const.
const SALARY_MAX: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

/// Fields checked by the derive are reported in this order.
const FIELD_ORDER: [&str; 3] = ["first_name", "last_name", "email"];

/// A single validation failure, shown back to the user above the form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct FormError(pub String);

impl From<&'static str> for FormError {
    fn from(message: &'static str) -> Self {
        FormError(message.to_string())
    }
}

/// The employee form exactly as submitted. Also used to pre-fill the form.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct EmployeeForm {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub dob: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub hire_date: Option<String>,
    pub salary: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub status: Option<String>,
}

impl From<&Employee> for EmployeeForm {
    fn from(e: &Employee) -> Self {
        Self {
            first_name: Some(e.first_name.clone()),
            last_name: Some(e.last_name.clone()),
            email: Some(e.email.clone()),
            phone: Some(e.phone.clone()),
            gender: e.gender.clone(),
            dob: e.dob.map(|d| d.to_string()),
            department: e.department.clone(),
            position: e.position.clone(),
            hire_date: e.hire_date.map(|d| d.to_string()),
            salary: Some(format!("{:.2}", e.salary)),
            city: e.city.clone(),
            address: e.address.clone(),
            status: Some(e.status.to_string()),
        }
    }
}

#[derive(Validate)]
struct RequiredFields {
    #[validate(custom = "validate_name")]
    first_name: String,
    #[validate(custom = "validate_name")]
    last_name: String,
    #[validate(custom = "validate_email_shape")]
    email: String,
}

fn error_with_message(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(error_with_message("required", NAMES_REQUIRED));
    }
    Ok(())
}

fn validate_email_shape(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() || !email.contains('@') {
        return Err(error_with_message("email", EMAIL_INVALID));
    }
    Ok(())
}

fn parse_salary(raw: &str) -> Result<Decimal, &'static str> {
    if raw.is_empty() {
        return Err(SALARY_REQUIRED);
    }
    let mut salary = Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|_| SALARY_NOT_A_NUMBER)?;
    if salary.is_sign_negative() && !salary.is_zero() {
        return Err(SALARY_NEGATIVE);
    }
    salary = salary.round_dp(2);
    if salary > SALARY_MAX {
        return Err(SALARY_TOO_LARGE);
    }
    salary.rescale(2);
    Ok(salary)
}

fn parse_iso_date(raw: &str) -> Result<NaiveDate, &'static str> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| DATE_FORMAT)
}

/// Picks the message of the first failing field in `order`.
pub fn first_error_message(errors: &ValidationErrors, order: &[&'static str]) -> Option<String> {
    let fields = errors.field_errors();
    order
        .iter()
        .filter_map(|field| fields.get(field))
        .flat_map(|errs| errs.iter())
        .map(|e| {
            e.message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| e.code.to_string())
        })
        .next()
}

/// Postgres text cannot hold NUL, so it is dropped along with surrounding whitespace.
pub fn clean(raw: &str) -> String {
    raw.replace('\0', "").trim().to_string()
}

fn trimmed(value: &Option<String>) -> String {
    value.as_deref().map(clean).unwrap_or_default()
}

fn trimmed_or_none(value: &Option<String>) -> Option<String> {
    value.as_deref().map(clean).filter(|v| !v.is_empty())
}

/// Normalizes and validates a submitted employee form.
///
/// Names are trimmed, email is trimmed and lower-cased, optional text fields
/// become `None` when blank, salary is rounded to cents, and an unknown status
/// falls back to `Active`. Only the first failing rule is reported.
pub fn parse_employee_form(form: &EmployeeForm) -> Result<EmployeeInput, FormError> {
    let required = RequiredFields {
        first_name: trimmed(&form.first_name),
        last_name: trimmed(&form.last_name),
        email: trimmed(&form.email).to_lowercase(),
    };

    if let Err(errors) = required.validate() {
        let message = first_error_message(&errors, &FIELD_ORDER).unwrap_or_else(|| errors.to_string());
        return Err(FormError(message));
    }

    let salary = parse_salary(&trimmed(&form.salary))?;
    let dob = trimmed_or_none(&form.dob).as_deref().map(parse_iso_date).transpose()?;
    let hire_date = trimmed_or_none(&form.hire_date)
        .as_deref()
        .map(parse_iso_date)
        .transpose()?;

    Ok(EmployeeInput {
        first_name: required.first_name,
        last_name: required.last_name,
        email: required.email,
        phone: trimmed(&form.phone),
        gender: trimmed_or_none(&form.gender),
        dob,
        department: trimmed_or_none(&form.department),
        position: trimmed_or_none(&form.position),
        hire_date,
        salary,
        city: trimmed_or_none(&form.city),
        address: trimmed_or_none(&form.address),
        status: EmployeeStatus::parse_lenient(form.status.as_deref().unwrap_or("")),
    })
}
