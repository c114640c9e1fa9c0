pub mod employee;

use actix_web::web;

/// Registers every route of the application.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(employee::list_employees)))
        .service(web::resource("/employee/{emp_id}").route(web::get().to(employee::view_employee)))
        .service(
            web::resource("/add")
                .route(web::get().to(employee::add_employee_form))
                .route(web::post().to(employee::add_employee)),
        )
        .service(
            web::resource("/edit/{emp_id}")
                .route(web::get().to(employee::edit_employee_form))
                .route(web::post().to(employee::edit_employee)),
        )
        .service(web::resource("/delete/{emp_id}").route(web::post().to(employee::delete_employee)))
        .service(web::resource("/export").route(web::get().to(employee::export_employees)));
}
