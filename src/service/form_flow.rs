//! The two-step form: email, then password, then persist.
//!
//! No session is kept. The only state carried between requests is the
//! validated email, passed along in the redirect URL and the password form's
//! hidden field. Each step is a function from request input to a [`Step`].

use crate::db::{LoginRecord, LoginRecordStore};
use crate::error::{SubmitError, ValidationError};
use crate::service::connection_actor::ConnectionManager;
use crate::view::{View, html_response};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use tracing::{error, info};

pub const CONFIG_ERROR_MESSAGE: &str =
    "Server config error: set DATABASE_URL in the environment.";
pub const SAVE_ERROR_MESSAGE: &str =
    "Unable to save data to database. Check the database connection.";

/// Outcome of handling one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Render { status: StatusCode, view: View },
    Redirect(String),
}

impl Step {
    fn ok(view: View) -> Self {
        Step::Render {
            status: StatusCode::OK,
            view,
        }
    }

    fn restart() -> Self {
        Step::Redirect("/".to_string())
    }
}

impl IntoResponse for Step {
    fn into_response(self) -> Response {
        match self {
            Step::Render { status, view } => html_response(status, &view),
            Step::Redirect(location) => match HeaderValue::from_str(&location) {
                Ok(value) => (StatusCode::FOUND, [(header::LOCATION, value)]).into_response(),
                Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
            },
        }
    }
}

/// Location of the password step for an already validated email.
pub fn password_step_location(email: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(email.as_bytes()).collect();
    format!("/password?email={encoded}")
}

fn trimmed(raw: Option<&str>) -> &str {
    raw.unwrap_or("").trim()
}

/// `GET /`
pub fn enter() -> Step {
    Step::ok(View::Index {
        error: None,
        email: String::new(),
    })
}

/// `POST /next`: the email must be non-empty and contain `@`.
pub fn submit_email(raw: Option<&str>) -> Step {
    let email = trimmed(raw);
    if email.is_empty() || !email.contains('@') {
        return Step::Render {
            status: StatusCode::BAD_REQUEST,
            view: View::Index {
                error: Some(ValidationError::InvalidEmail.to_string()),
                email: email.to_string(),
            },
        };
    }
    Step::Redirect(password_step_location(email))
}

/// `GET /password`: without a carried email there is nothing to continue.
pub fn request_password_step(carried: Option<&str>) -> Step {
    let email = trimmed(carried);
    if email.is_empty() {
        return Step::restart();
    }
    Step::ok(View::Password {
        error: None,
        email: email.to_string(),
    })
}

/// Input of `POST /signin` that passed validation.
#[derive(Debug, PartialEq, Eq)]
pub struct Submission {
    pub email: String,
    pub password: String,
}

/// Validate `POST /signin` input, or produce the step to answer with instead.
pub fn validate_signin(email: Option<&str>, password: Option<&str>) -> Result<Submission, Step> {
    let email = trimmed(email);
    if email.is_empty() {
        return Err(Step::restart());
    }
    let password = trimmed(password);
    if password.is_empty() {
        return Err(Step::Render {
            status: StatusCode::BAD_REQUEST,
            view: View::Password {
                error: Some(ValidationError::MissingPassword.to_string()),
                email: email.to_string(),
            },
        });
    }
    Ok(Submission {
        email: email.to_string(),
        password: password.to_string(),
    })
}

/// Message shown to the visitor when saving fails. The cause itself is
/// only logged.
pub fn failure_message(err: &SubmitError) -> &'static str {
    if err.is_missing_configuration() {
        CONFIG_ERROR_MESSAGE
    } else {
        SAVE_ERROR_MESSAGE
    }
}

pub fn signin_failed(email: String, err: &SubmitError) -> Step {
    if err.is_missing_configuration() {
        error!(error = %err, "database save skipped: endpoint not configured");
    } else {
        error!(error = %err, "database save failed");
    }
    Step::Render {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        view: View::Password {
            error: Some(failure_message(err).to_string()),
            email,
        },
    }
}

async fn save(
    connection: &ConnectionManager,
    store: &LoginRecordStore,
    submission: &Submission,
) -> Result<LoginRecord, SubmitError> {
    connection.ensure_connected().await?;
    let record = store
        .append(&submission.email, submission.password.as_str())
        .await?;
    Ok(record)
}

/// `POST /signin`: validate, connect if needed, append one record.
pub async fn submit_password(
    connection: &ConnectionManager,
    store: &LoginRecordStore,
    email: Option<&str>,
    password: Option<&str>,
) -> Step {
    let submission = match validate_signin(email, password) {
        Ok(s) => s,
        Err(step) => return step,
    };

    match save(connection, store, &submission).await {
        Ok(record) => {
            info!(id = record.id, "login record saved");
            Step::ok(View::Success {
                email: submission.email,
            })
        }
        Err(e) => signin_failed(submission.email, &e),
    }
}
