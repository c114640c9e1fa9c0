//! Record service for the `employees` table.

use chrono::{DateTime, NaiveDate, Utc};
use log::info;
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};

use crate::db::errors::{RecordError, Result};
use crate::db::query::{self, EmployeeFilter, Paging, Sort};
use crate::models::employee::{Employee, EmployeeInput, EmployeePage, EmployeeStatus, ExportRow};

#[derive(Debug, FromRow)]
struct EmployeeRow {
    id: i64,
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
    gender: Option<String>,
    dob: Option<NaiveDate>,
    department: Option<String>,
    position: Option<String>,
    hire_date: Option<NaiveDate>,
    salary: Decimal,
    city: Option<String>,
    address: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
}

impl From<EmployeeRow> for Employee {
    fn from(row: EmployeeRow) -> Self {
        Self {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone: row.phone,
            gender: row.gender,
            dob: row.dob,
            department: row.department,
            position: row.position,
            hire_date: row.hire_date,
            salary: row.salary,
            city: row.city,
            address: row.address,
            // the table's CHECK constraint keeps this to Active/Inactive
            status: EmployeeStatus::parse_lenient(&row.status),
            created_at: row.created_at,
        }
    }
}

/// Employee operations over the shared pool. Each call holds one pooled
/// connection for its duration; the connection goes back to the pool when the
/// call returns, whether it succeeded or not.
pub struct Employees<'p> {
    pool: &'p PgPool,
}

impl<'p> Employees<'p> {
    pub fn new(pool: &'p PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: &EmployeeFilter, sort: Sort, paging: Paging) -> Result<EmployeePage> {
        let mut conn = self.pool.acquire().await?;

        let mut count = query::count_query(filter);
        let total: i64 = count.build_query_scalar().fetch_one(&mut *conn).await?;

        let mut select = query::list_query(filter, sort, paging);
        let rows = select.build_query_as::<EmployeeRow>().fetch_all(&mut *conn).await?;

        Ok(EmployeePage::new(
            rows.into_iter().map(Employee::from).collect(),
            total,
            paging.page,
            paging.per_page,
        ))
    }

    pub async fn get(&self, id: i64) -> Result<Employee> {
        let mut conn = self.pool.acquire().await?;
        let sql = query::select_by_id_sql();

        sqlx::query_as::<_, EmployeeRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .map(Employee::from)
            .ok_or(RecordError::NotFound)
    }

    /// Inserts a new employee and returns its id. A duplicate email is rejected
    /// by the table's unique constraint and reported as `Conflict`.
    pub async fn create(&self, input: &EmployeeInput) -> Result<i64> {
        let mut conn = self.pool.acquire().await?;

        let id: i64 = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO employees
                (first_name, last_name, email, phone, gender, dob, department, position,
                 hire_date, salary, city, address, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING id
            "#,
        )
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.gender)
        .bind(input.dob)
        .bind(&input.department)
        .bind(&input.position)
        .bind(input.hire_date)
        .bind(input.salary)
        .bind(&input.city)
        .bind(&input.address)
        .bind(input.status.as_str())
        .fetch_one(&mut *conn)
        .await?;

        info!("Created employee {} <{}>", id, input.email);
        Ok(id)
    }

    /// Replaces every mutable field of employee `id`.
    pub async fn update(&self, id: i64, input: &EmployeeInput) -> Result<()> {
        let mut conn = self.pool.acquire().await?;

        let result = sqlx::query(
            r#"
            UPDATE employees SET
                first_name = $1, last_name = $2, email = $3, phone = $4, gender = $5, dob = $6,
                department = $7, position = $8, hire_date = $9, salary = $10, city = $11,
                address = $12, status = $13
            WHERE id = $14
            "#,
        )
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.gender)
        .bind(input.dob)
        .bind(&input.department)
        .bind(&input.position)
        .bind(input.hire_date)
        .bind(input.salary)
        .bind(&input.city)
        .bind(&input.address)
        .bind(input.status.as_str())
        .bind(id)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RecordError::NotFound);
        }

        info!("Updated employee {}", id);
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let mut conn = self.pool.acquire().await?;

        let result = sqlx::query("DELETE FROM employees WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RecordError::NotFound);
        }

        info!("Deleted employee {}", id);
        Ok(())
    }

    /// All employees matching `filter`, ordered by last then first name.
    pub async fn export(&self, filter: &EmployeeFilter) -> Result<Vec<ExportRow>> {
        let mut conn = self.pool.acquire().await?;

        let mut select = query::export_query(filter);
        let rows = select.build_query_as::<EmployeeRow>().fetch_all(&mut *conn).await?;

        Ok(rows
            .into_iter()
            .map(Employee::from)
            .map(|e| ExportRow::from(&e))
            .collect())
    }
}
