//! One-shot status messages carried across a redirect in a cookie.
//!
//! The cookie holds a fixed code, never user text, so it needs no signing.

use actix_web::cookie::time::Duration;
use actix_web::cookie::Cookie;
use actix_web::HttpRequest;
use serde::Serialize;

const FLASH_COOKIE: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    Added,
    Updated,
    Deleted,
}

#[derive(Serialize, Debug)]
pub struct FlashView {
    pub level: &'static str,
    pub message: &'static str,
}

impl Flash {
    fn code(&self) -> &'static str {
        match self {
            Flash::Added => "added",
            Flash::Updated => "updated",
            Flash::Deleted => "deleted",
        }
    }

    fn from_code(code: &str) -> Option<Self> {
        match code {
            "added" => Some(Flash::Added),
            "updated" => Some(Flash::Updated),
            "deleted" => Some(Flash::Deleted),
            _ => None,
        }
    }

    pub fn view(&self) -> FlashView {
        let message = match self {
            Flash::Added => "Employee added successfully!",
            Flash::Updated => "Employee updated successfully!",
            Flash::Deleted => "Employee deleted.",
        };
        FlashView {
            level: "success",
            message,
        }
    }

    pub fn cookie(&self) -> Cookie<'static> {
        Cookie::build(FLASH_COOKIE, self.code())
            .path("/")
            .http_only(true)
            .max_age(Duration::minutes(1))
            .finish()
    }
}

/// The pending flash, if the request carries one.
pub fn take(req: &HttpRequest) -> Option<Flash> {
    req.cookie(FLASH_COOKIE).and_then(|c| Flash::from_code(c.value()))
}

pub fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(FLASH_COOKIE, "").path("/").finish();
    cookie.make_removal();
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn cookie_round_trips_through_request() {
        let req = TestRequest::default().cookie(Flash::Updated.cookie()).to_http_request();
        assert_eq!(take(&req), Some(Flash::Updated));
    }

    #[test]
    fn unknown_codes_are_ignored() {
        let req = TestRequest::default()
            .cookie(Cookie::new(FLASH_COOKIE, "<b>hi</b>"))
            .to_http_request();
        assert_eq!(take(&req), None);
        assert_eq!(take(&TestRequest::default().to_http_request()), None);
    }

    #[test]
    fn removal_cookie_expires_immediately() {
        let cookie = removal_cookie();
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        assert_eq!(cookie.value(), "");
    }
}
