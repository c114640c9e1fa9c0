use minijinja::Environment;
use serde::Serialize;

use crate::errors::AppError;

const TEMPLATES: [(&str, &str); 4] = [
    ("base.html", include_str!("../../templates/base.html")),
    ("list_employees.html", include_str!("../../templates/list_employees.html")),
    ("view_employee.html", include_str!("../../templates/view_employee.html")),
    ("employee_form.html", include_str!("../../templates/employee_form.html")),
];

/// HTML templates compiled into the binary. `.html` names are auto-escaped.
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    pub fn load() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        for (name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Self { env })
    }

    pub fn render<S: Serialize>(&self, name: &str, ctx: S) -> Result<String, AppError> {
        Ok(self.env.get_template(name)?.render(ctx)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::context;

    #[test]
    fn all_templates_parse() {
        let templates = Templates::load().unwrap();
        for (name, _) in TEMPLATES {
            assert!(templates.env.get_template(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn form_output_is_escaped() {
        let templates = Templates::load().unwrap();
        let html = templates
            .render(
                "employee_form.html",
                context! {
                    mode => "create",
                    action => "/add",
                    form => context! { first_name => "<script>alert(1)</script>" },
                    error => None::<String>,
                    flash => None::<String>,
                },
            )
            .unwrap();
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>alert"));
    }
}
