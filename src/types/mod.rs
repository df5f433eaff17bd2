pub mod credential;
pub mod form;

pub use credential::{NormalizedEmail, Password};
pub use form::{EmailForm, PasswordQuery, SigninForm};
