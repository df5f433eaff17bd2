use axum::{
    Form,
    extract::{Query, State, rejection::FormRejection},
};

use crate::router::StepformState;
use crate::service::form_flow::{self, Step};
use crate::types::{EmailForm, PasswordQuery, SigninForm};

/// A post that is not form-encoded carries no fields; treat it as empty input
/// rather than rejecting it. Other rejections (e.g. oversized bodies) stand.
fn form_or_empty<T: Default>(form: Result<Form<T>, FormRejection>) -> Result<T, FormRejection> {
    match form {
        Ok(Form(form)) => Ok(form),
        Err(FormRejection::InvalidFormContentType(_)) => Ok(T::default()),
        Err(rejection) => Err(rejection),
    }
}

/// GET / -> email entry form.
pub async fn index() -> Step {
    form_flow::enter()
}

/// POST /next -> 400 with the form again, or redirect to the password step.
pub async fn next(form: Result<Form<EmailForm>, FormRejection>) -> Result<Step, FormRejection> {
    let form = form_or_empty(form)?;
    Ok(form_flow::submit_email(form.email.as_deref()))
}

/// GET /password?email=... -> password form, or back to / without an email.
pub async fn password(Query(query): Query<PasswordQuery>) -> Step {
    form_flow::request_password_step(query.email.as_deref())
}

/// POST /signin -> persist the pair and show the success page.
pub async fn signin(
    State(state): State<StepformState>,
    form: Result<Form<SigninForm>, FormRejection>,
) -> Result<Step, FormRejection> {
    let form = form_or_empty(form)?;
    Ok(form_flow::submit_password(
        &state.connection,
        &state.records,
        form.email.as_deref(),
        form.password.as_deref(),
    )
    .await)
}
