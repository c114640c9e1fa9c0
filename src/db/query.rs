//! SQL construction for listing, counting and exporting employees.
//!
//! Every user-supplied value goes through `push_bind`. The only text spliced into
//! the SQL comes from `SortColumn::as_sql` and `SortDirection::as_sql`.

use serde::Deserialize;
use sqlx::{Postgres, QueryBuilder};

use crate::utils::validation::clean;

pub const DEFAULT_PER_PAGE: i64 = 10;
pub const MIN_PER_PAGE: i64 = 5;
pub const MAX_PER_PAGE: i64 = 50;

const SELECT_EMPLOYEES: &str = "SELECT id, first_name, last_name, email, phone, gender, dob, department, \
     position, hire_date, salary, city, address, status, created_at FROM employees";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    FirstName,
    #[default]
    LastName,
    Email,
    Department,
    Salary,
    HireDate,
    CreatedAt,
}

impl SortColumn {
    /// Unknown keys sort by last name.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "first_name" => SortColumn::FirstName,
            "last_name" => SortColumn::LastName,
            "email" => SortColumn::Email,
            "department" => SortColumn::Department,
            "salary" => SortColumn::Salary,
            "hire_date" => SortColumn::HireDate,
            "created_at" => SortColumn::CreatedAt,
            _ => SortColumn::LastName,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortColumn::FirstName => "first_name",
            SortColumn::LastName => "last_name",
            SortColumn::Email => "email",
            SortColumn::Department => "department",
            SortColumn::Salary => "salary",
            SortColumn::HireDate => "hire_date",
            SortColumn::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(raw: &str) -> Self {
        if raw == "asc" {
            SortDirection::Asc
        } else {
            SortDirection::Desc
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    pub fn as_param(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sort {
    pub column: SortColumn,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub page: i64,
    pub per_page: i64,
}

impl Default for Paging {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl Paging {
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(MIN_PER_PAGE, MAX_PER_PAGE),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

/// Filter predicate shared by the list, count and export queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeFilter {
    pub q: Option<String>,
    pub department: Option<String>,
    pub status: Option<String>,
}

impl EmployeeFilter {
    pub fn is_empty(&self) -> bool {
        self.q.is_none() && self.department.is_none() && self.status.is_none()
    }
}

/// Raw query-string parameters for `GET /` and `GET /export`.
#[derive(Deserialize, Debug, Default)]
pub struct EmployeeQueryParams {
    pub q: Option<String>,
    pub department: Option<String>,
    pub status: Option<String>,
    pub sort: Option<String>,
    pub dir: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_deref().map(clean).filter(|v| !v.is_empty())
}

impl EmployeeQueryParams {
    pub fn filter(&self) -> EmployeeFilter {
        EmployeeFilter {
            q: non_empty(&self.q),
            department: non_empty(&self.department),
            status: non_empty(&self.status),
        }
    }

    pub fn sort(&self) -> Sort {
        Sort {
            column: self.sort.as_deref().map(SortColumn::parse).unwrap_or_default(),
            direction: self.dir.as_deref().map(SortDirection::parse).unwrap_or_default(),
        }
    }

    pub fn paging(&self) -> Paging {
        let page = self
            .page
            .as_deref()
            .and_then(|p| p.trim().parse::<i64>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);
        let per_page = self
            .per_page
            .as_deref()
            .and_then(|p| p.trim().parse::<i64>().ok())
            .unwrap_or(DEFAULT_PER_PAGE);
        Paging::new(page, per_page)
    }
}

/// Escapes LIKE metacharacters so the pattern matches the literal text.
fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

/// Appends the WHERE clause (if any) for `filter` to `query`.
pub fn push_filter(query: &mut QueryBuilder<'_, Postgres>, filter: &EmployeeFilter) {
    let mut separator = " WHERE ";

    if let Some(q) = &filter.q {
        let pattern = like_pattern(q);
        query.push(separator);
        separator = " AND ";
        query.push("(");
        for (i, column) in ["first_name", "last_name", "email", "city", "department"].iter().enumerate() {
            if i > 0 {
                query.push(" OR ");
            }
            query.push(*column);
            query.push(" ILIKE ");
            query.push_bind(pattern.clone());
        }
        query.push(")");
    }
    if let Some(department) = &filter.department {
        query.push(separator);
        separator = " AND ";
        query.push("department = ");
        query.push_bind(department.clone());
    }
    if let Some(status) = &filter.status {
        query.push(separator);
        query.push("status = ");
        query.push_bind(status.clone());
    }
}

pub fn count_query(filter: &EmployeeFilter) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new("SELECT COUNT(*) FROM employees");
    push_filter(&mut query, filter);
    query
}

pub fn list_query(filter: &EmployeeFilter, sort: Sort, paging: Paging) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(SELECT_EMPLOYEES);
    push_filter(&mut query, filter);
    query.push(" ORDER BY ");
    query.push(sort.column.as_sql());
    query.push(" ");
    query.push(sort.direction.as_sql());
    // id keeps pages stable when the sort column has ties
    query.push(", id ASC LIMIT ");
    query.push_bind(paging.per_page);
    query.push(" OFFSET ");
    query.push_bind(paging.offset());
    query
}

pub fn export_query(filter: &EmployeeFilter) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(SELECT_EMPLOYEES);
    push_filter(&mut query, filter);
    query.push(" ORDER BY last_name ASC, first_name ASC, id ASC");
    query
}

pub fn select_by_id_sql() -> String {
    format!("{SELECT_EMPLOYEES} WHERE id = $1")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> EmployeeQueryParams {
        let mut p = EmployeeQueryParams::default();
        for (k, v) in pairs {
            let v = Some(v.to_string());
            match *k {
                "q" => p.q = v,
                "department" => p.department = v,
                "status" => p.status = v,
                "sort" => p.sort = v,
                "dir" => p.dir = v,
                "page" => p.page = v,
                "per_page" => p.per_page = v,
                _ => unreachable!(),
            }
        }
        p
    }

    #[test]
    fn unknown_sort_key_falls_back_to_last_name() {
        assert_eq!(SortColumn::parse("salary"), SortColumn::Salary);
        assert_eq!(SortColumn::parse("password"), SortColumn::LastName);
        assert_eq!(SortColumn::parse("id; DROP TABLE employees"), SortColumn::LastName);
        assert_eq!(params(&[]).sort().column, SortColumn::LastName);
    }

    #[test]
    fn direction_is_ascending_only_for_asc() {
        assert_eq!(params(&[]).sort().direction, SortDirection::Asc);
        assert_eq!(params(&[("dir", "asc")]).sort().direction, SortDirection::Asc);
        assert_eq!(params(&[("dir", "ASC")]).sort().direction, SortDirection::Desc);
        assert_eq!(params(&[("dir", "desc")]).sort().direction, SortDirection::Desc);
    }

    #[test]
    fn page_size_is_clamped() {
        assert_eq!(params(&[("per_page", "1")]).paging().per_page, 5);
        assert_eq!(params(&[("per_page", "500")]).paging().per_page, 50);
        assert_eq!(params(&[("per_page", "20")]).paging().per_page, 20);
        assert_eq!(params(&[]).paging().per_page, DEFAULT_PER_PAGE);
    }

    #[test]
    fn page_defaults_to_one() {
        assert_eq!(params(&[]).paging().page, 1);
        assert_eq!(params(&[("page", "0")]).paging().page, 1);
        assert_eq!(params(&[("page", "-3")]).paging().page, 1);
        assert_eq!(params(&[("page", "abc")]).paging().page, 1);
        let paging = params(&[("page", "3"), ("per_page", "20")]).paging();
        assert_eq!(paging.offset(), 40);
    }

    #[test]
    fn blank_filters_are_ignored() {
        let filter = params(&[("q", "  "), ("department", ""), ("status", " ")]).filter();
        assert!(filter.is_empty());
        assert_eq!(count_query(&filter).sql(), "SELECT COUNT(*) FROM employees");
    }

    #[test]
    fn nul_characters_are_dropped_from_filters() {
        let filter = params(&[("q", "a\0b"), ("department", "\0"), ("status", "Active\0")]).filter();
        assert_eq!(filter.q.as_deref(), Some("ab"));
        assert_eq!(filter.department, None);
        assert_eq!(filter.status.as_deref(), Some("Active"));
    }

    #[test]
    fn filters_are_bound_not_interpolated() {
        let filter = params(&[("q", "o'brien"), ("department", "R&D"), ("status", "Active")]).filter();
        let sql = count_query(&filter).sql().to_string();
        assert_eq!(
            sql,
            "SELECT COUNT(*) FROM employees WHERE (first_name ILIKE $1 OR last_name ILIKE $2 OR \
             email ILIKE $3 OR city ILIKE $4 OR department ILIKE $5) AND department = $6 AND status = $7"
        );
        assert!(!sql.contains("brien"));
        assert!(!sql.contains("R&D"));
    }

    #[test]
    fn list_query_orders_by_whitelisted_column_and_binds_paging() {
        let p = params(&[("department", "Sales"), ("sort", "salary"), ("dir", "desc"), ("per_page", "5")]);
        let query = list_query(&p.filter(), p.sort(), p.paging());
        let sql = query.sql();
        assert!(sql.ends_with(" WHERE department = $1 ORDER BY salary DESC, id ASC LIMIT $2 OFFSET $3"));
    }

    #[test]
    fn injected_sort_key_never_reaches_sql() {
        let p = params(&[("sort", "salary; DELETE FROM employees"), ("dir", "asc")]);
        let query = list_query(&p.filter(), p.sort(), p.paging());
        let sql = query.sql();
        assert!(sql.contains("ORDER BY last_name ASC"));
        assert!(!sql.contains("DELETE"));
    }

    #[test]
    fn export_query_uses_name_order_without_paging() {
        let filter = params(&[("status", "Inactive")]).filter();
        let query = export_query(&filter);
        let sql = query.sql();
        assert!(sql.ends_with(" WHERE status = $1 ORDER BY last_name ASC, first_name ASC, id ASC"));
        assert!(!sql.contains("LIMIT"));
    }

    #[test]
    fn like_metacharacters_are_escaped() {
        assert_eq!(like_pattern("ann"), "%ann%");
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }
}
