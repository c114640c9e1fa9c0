pub mod export;
pub mod flash;
pub mod templates;
pub mod validation;
