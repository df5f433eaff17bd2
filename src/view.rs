//! Server-rendered pages for the three form steps.
//!
//! A [`View`] is a template name plus a JSON context (`{error, email}` for the
//! form pages, `{email}` for the success page). [`render`] turns that pair into
//! HTML; every context value is escaped.

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use serde_json::{Value, json};

pub const INDEX: &str = "index";
pub const PASSWORD: &str = "password";
pub const SUCCESS: &str = "success";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Index { error: Option<String>, email: String },
    Password { error: Option<String>, email: String },
    Success { email: String },
}

impl View {
    pub fn template(&self) -> &'static str {
        match self {
            View::Index { .. } => INDEX,
            View::Password { .. } => PASSWORD,
            View::Success { .. } => SUCCESS,
        }
    }

    pub fn context(&self) -> Value {
        match self {
            View::Index { error, email } | View::Password { error, email } => {
                json!({ "error": error, "email": email })
            }
            View::Success { email } => json!({ "email": email }),
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            View::Index { error, .. } | View::Password { error, .. } => error.as_deref(),
            View::Success { .. } => None,
        }
    }

    pub fn email(&self) -> &str {
        match self {
            View::Index { email, .. } | View::Password { email, .. } | View::Success { email } => {
                email
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown template `{0}`")]
pub struct UnknownTemplate(pub String);

/// Render a template with its context.
pub fn render(template: &str, context: &Value) -> Result<String, UnknownTemplate> {
    let email = escape_html(context.get("email").and_then(Value::as_str).unwrap_or(""));
    let error = context
        .get("error")
        .and_then(Value::as_str)
        .map(|e| format!(r#"<p class="error" role="alert">{}</p>"#, escape_html(e)))
        .unwrap_or_default();

    let body = match template {
        INDEX => format!(
            r#"<h1>Sign in</h1>
  {error}
  <form method="post" action="/next">
    <label for="email">Email</label>
    <input id="email" name="email" type="email" value="{email}" autocomplete="email" autofocus />
    <button type="submit">Next</button>
  </form>"#
        ),
        PASSWORD => format!(
            r#"<h1>Enter your password</h1>
  <p class="who">{email}</p>
  {error}
  <form method="post" action="/signin">
    <input name="email" type="hidden" value="{email}" />
    <label for="password">Password</label>
    <input id="password" name="password" type="password" autocomplete="current-password" autofocus />
    <button type="submit">Sign in</button>
  </form>
  <p><a href="/">Use a different email</a></p>"#
        ),
        SUCCESS => format!(
            r#"<h1>Saved</h1>
  <p>Thanks, <strong>{email}</strong>. Your details were recorded.</p>
  <p><a href="/">Start over</a></p>"#
        ),
        other => return Err(UnknownTemplate(other.to_string())),
    };

    Ok(layout(&body))
}

fn layout(body: &str) -> String {
    format!(
        r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>Sign in</title>
  <style>
    body {{
      margin: 0;
      font-family: system-ui, -apple-system, BlinkMacSystemFont, "Segoe UI", sans-serif;
    }}
    main {{
      max-width: 420px;
      margin: 64px auto;
      padding: 24px;
    }}
    input, button {{
      display: block;
      width: 100%;
      margin: 8px 0 16px;
      padding: 10px;
      box-sizing: border-box;
    }}
    .error {{
      color: #b91c1c;
    }}
  </style>
</head>
<body>
<main>
  {body}
</main>
</body>
</html>"#
    )
}

fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// HTML response with the given status. Form pages are never cached.
pub fn html_response(status: StatusCode, view: &View) -> Response {
    let body = match render(view.template(), &view.context()) {
        Ok(body) => body,
        Err(e) => {
            tracing::error!(error = %e, "view rendering failed");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    let mut response = Html(body).into_response();
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store, max-age=0"),
    );
    response
}
