use serde::Deserialize;

/// Body of `POST /next`.
#[derive(Debug, Default, Deserialize)]
pub struct EmailForm {
    #[serde(default)]
    pub email: Option<String>,
}

/// Query of `GET /password`: the email carried over from the first step.
#[derive(Debug, Default, Deserialize)]
pub struct PasswordQuery {
    #[serde(default)]
    pub email: Option<String>,
}

/// Body of `POST /signin`.
#[derive(Deserialize, Default)]
pub struct SigninForm {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}
