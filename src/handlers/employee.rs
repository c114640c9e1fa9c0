use actix_web::http::header::{self, ContentType};
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse};
use log::{info, warn};
use minijinja::context;
use serde::Serialize;
use sqlx::PgPool;

use crate::db::employees::Employees;
use crate::db::query::{EmployeeFilter, EmployeeQueryParams, Sort, SortColumn, SortDirection};
use crate::errors::AppError;
use crate::utils::export::{write_csv, EXPORT_FILENAME};
use crate::utils::flash::{self, Flash};
use crate::utils::templates::Templates;
use crate::utils::validation::{parse_employee_form, EmployeeForm};

const LIST_COLUMNS: [(&str, Option<SortColumn>); 9] = [
    ("First Name", Some(SortColumn::FirstName)),
    ("Last Name", Some(SortColumn::LastName)),
    ("Email", Some(SortColumn::Email)),
    ("Department", Some(SortColumn::Department)),
    ("Position", None),
    ("Salary", Some(SortColumn::Salary)),
    ("Hire Date", Some(SortColumn::HireDate)),
    ("Status", None),
    ("City", None),
];

#[derive(Serialize, Default)]
struct ListLinkParams<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    q: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    department: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sort: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dir: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    per_page: Option<i64>,
}

#[derive(Serialize)]
struct ColumnView {
    label: &'static str,
    href: Option<String>,
    active: bool,
}

fn href(path: &str, params: &ListLinkParams<'_>) -> String {
    match serde_urlencoded::to_string(params) {
        Ok(qs) if !qs.is_empty() => format!("{path}?{qs}"),
        _ => path.to_string(),
    }
}

fn filter_params(filter: &EmployeeFilter) -> ListLinkParams<'_> {
    ListLinkParams {
        q: filter.q.as_deref(),
        department: filter.department.as_deref(),
        status: filter.status.as_deref(),
        ..Default::default()
    }
}

fn list_href(filter: &EmployeeFilter, sort: Sort, page: i64, per_page: i64) -> String {
    href(
        "/",
        &ListLinkParams {
            sort: Some(sort.column.as_sql()),
            dir: Some(sort.direction.as_param()),
            page: Some(page),
            per_page: Some(per_page),
            ..filter_params(filter)
        },
    )
}

fn html(status: StatusCode, body: String, flash_shown: bool) -> HttpResponse {
    let mut builder = HttpResponse::build(status);
    builder.content_type(ContentType::html());
    if flash_shown {
        builder.cookie(flash::removal_cookie());
    }
    builder.body(body)
}

fn redirect(location: &str, flash: Flash) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .cookie(flash.cookie())
        .finish()
}

fn render_form(
    templates: &Templates,
    status: StatusCode,
    mode: &str,
    action: &str,
    form: &EmployeeForm,
    error: Option<&str>,
) -> Result<HttpResponse, AppError> {
    let body = templates.render(
        "employee_form.html",
        context! {
            mode => mode,
            action => action,
            form => form,
            error => error,
            flash => None::<()>,
        },
    )?;
    Ok(html(status, body, false))
}

/// Re-displays a form the store rejected as a conflict; other failures become error pages.
fn reject_form(
    templates: &Templates,
    mode: &str,
    action: &str,
    form: &EmployeeForm,
    err: AppError,
) -> Result<HttpResponse, AppError> {
    match err {
        AppError::Conflict(message) => {
            info!("Rejected {} of {:?}: {}", mode, form.email, message);
            render_form(templates, StatusCode::CONFLICT, mode, action, form, Some(message.as_str()))
        }
        other => Err(other),
    }
}

pub async fn list_employees(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    templates: web::Data<Templates>,
    query: web::Query<EmployeeQueryParams>,
) -> Result<HttpResponse, AppError> {
    let filter = query.filter();
    let sort = query.sort();
    let paging = query.paging();

    let result = Employees::new(&pool).list(&filter, sort, paging).await?;

    let columns: Vec<ColumnView> = LIST_COLUMNS
        .iter()
        .map(|&(label, column)| {
            let active = column == Some(sort.column);
            let href = column.map(|column| {
                let direction = if active && sort.direction == SortDirection::Asc {
                    SortDirection::Desc
                } else {
                    SortDirection::Asc
                };
                list_href(&filter, Sort { column, direction }, 1, paging.per_page)
            });
            ColumnView { label, href, active }
        })
        .collect();

    let prev_href = (result.page > 1).then(|| list_href(&filter, sort, result.page - 1, result.per_page));
    let next_href = (result.page < result.pages).then(|| list_href(&filter, sort, result.page + 1, result.per_page));
    let export_href = href("/export", &filter_params(&filter));

    let flash = flash::take(&req);
    let body = templates.render(
        "list_employees.html",
        context! {
            employees => result.employees,
            total => result.total,
            page => result.page,
            pages => result.pages,
            per_page => result.per_page,
            q => filter.q.as_deref().unwrap_or(""),
            department => filter.department.as_deref().unwrap_or(""),
            status => filter.status.as_deref().unwrap_or(""),
            sort => sort.column.as_sql(),
            dir => sort.direction.as_param(),
            columns => columns,
            prev_href => prev_href,
            next_href => next_href,
            export_href => export_href,
            flash => flash.map(|f| f.view()),
        },
    )?;

    Ok(html(StatusCode::OK, body, flash.is_some()))
}

pub async fn view_employee(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    templates: web::Data<Templates>,
    emp_id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let employee = Employees::new(&pool).get(emp_id.into_inner()).await?;

    let flash = flash::take(&req);
    let body = templates.render(
        "view_employee.html",
        context! {
            employee => employee,
            flash => flash.map(|f| f.view()),
        },
    )?;

    Ok(html(StatusCode::OK, body, flash.is_some()))
}

pub async fn add_employee_form(templates: web::Data<Templates>) -> Result<HttpResponse, AppError> {
    render_form(&templates, StatusCode::OK, "create", "/add", &EmployeeForm::default(), None)
}

pub async fn add_employee(
    pool: web::Data<PgPool>,
    templates: web::Data<Templates>,
    form: web::Form<EmployeeForm>,
) -> Result<HttpResponse, AppError> {
    let form = form.into_inner();

    let input = match parse_employee_form(&form) {
        Ok(input) => input,
        Err(err) => {
            warn!("Invalid employee form: {}", err);
            return render_form(&templates, StatusCode::UNPROCESSABLE_ENTITY, "create", "/add", &form, Some(err.0.as_str()));
        }
    };

    match Employees::new(&pool).create(&input).await {
        Ok(_) => Ok(redirect("/", Flash::Added)),
        Err(err) => reject_form(&templates, "create", "/add", &form, err.into()),
    }
}

pub async fn edit_employee_form(
    pool: web::Data<PgPool>,
    templates: web::Data<Templates>,
    emp_id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let emp_id = emp_id.into_inner();
    let employee = Employees::new(&pool).get(emp_id).await?;

    render_form(
        &templates,
        StatusCode::OK,
        "edit",
        &format!("/edit/{emp_id}"),
        &EmployeeForm::from(&employee),
        None,
    )
}

pub async fn edit_employee(
    pool: web::Data<PgPool>,
    templates: web::Data<Templates>,
    emp_id: web::Path<i64>,
    form: web::Form<EmployeeForm>,
) -> Result<HttpResponse, AppError> {
    let emp_id = emp_id.into_inner();
    let action = format!("/edit/{emp_id}");
    let form = form.into_inner();

    let input = match parse_employee_form(&form) {
        Ok(input) => input,
        Err(err) => {
            warn!("Invalid employee form for {}: {}", emp_id, err);
            return render_form(&templates, StatusCode::UNPROCESSABLE_ENTITY, "edit", &action, &form, Some(err.0.as_str()));
        }
    };

    match Employees::new(&pool).update(emp_id, &input).await {
        Ok(()) => Ok(redirect(&format!("/employee/{emp_id}"), Flash::Updated)),
        Err(err) => reject_form(&templates, "edit", &action, &form, err.into()),
    }
}

pub async fn delete_employee(pool: web::Data<PgPool>, emp_id: web::Path<i64>) -> Result<HttpResponse, AppError> {
    Employees::new(&pool).delete(emp_id.into_inner()).await?;
    Ok(redirect("/", Flash::Deleted))
}

pub async fn export_employees(
    pool: web::Data<PgPool>,
    query: web::Query<EmployeeQueryParams>,
) -> Result<HttpResponse, AppError> {
    let filter = query.filter();
    let rows = Employees::new(&pool).export(&filter).await?;
    info!(
        "Exporting {} employees{}",
        rows.len(),
        if filter.is_empty() { "" } else { " (filtered)" }
    );

    let body = write_csv(&rows)?;

    Ok(HttpResponse::Ok()
        .content_type("text/csv")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={EXPORT_FILENAME}"),
        ))
        .body(body))
}
