//! Request body schemas for `/login` and `/chat`.
//!
//! Bodies are checked field by field against the raw JSON so the client gets the
//! message of the first rule that failed, not a generic deserializer error.

use serde_json::Value;

use crate::database::models::{PromptMessage, PromptRole};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRequest {
    pub email: String,
    pub name: String,
    pub external_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub prompt: Vec<PromptMessage>,
    pub kind: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError(pub String);

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ValidationError> for crate::error::ApiError {
    fn from(err: ValidationError) -> Self {
        crate::error::ApiError::bad_request(err.0)
    }
}

fn fail<T>(message: impl Into<String>) -> Result<T, ValidationError> {
    Err(ValidationError(message.into()))
}

fn required_string(body: &Value, keys: &[&str], message: &str) -> Result<String, ValidationError> {
    match keys.iter().find_map(|k| body.get(*k)) {
        Some(Value::String(s)) => Ok(s.clone()),
        _ => fail(message),
    }
}

pub fn validate_login(body: &Value) -> Result<LoginRequest, ValidationError> {
    if !body.is_object() {
        return fail("Request body must be a JSON object");
    }

    let email = required_string(body, &["email"], "Email is required")?;
    validate_email_format(&email)?;
    let name = required_string(body, &["name"], "Name is required")?;
    let external_token = required_string(
        body,
        &["googletoken", "googleToken"],
        "Google token is required",
    )?;

    Ok(LoginRequest {
        email,
        name,
        external_token,
    })
}

/// Basic shape check: one `@`, non-empty local part, dotted domain
pub fn validate_email_format(email: &str) -> Result<(), ValidationError> {
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || email.chars().any(char::is_whitespace) {
        return fail("Invalid email address");
    }

    let domain = parts[1];
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return fail("Invalid email address");
    }

    Ok(())
}

pub fn validate_chat(body: &Value) -> Result<ChatRequest, ValidationError> {
    if !body.is_object() {
        return fail("Request body must be a JSON object");
    }

    let entries = match body.get("prompt") {
        None | Some(Value::Null) => return fail("prompt is required"),
        Some(Value::Array(entries)) => entries,
        Some(_) => return fail("prompt must be an array"),
    };

    if entries.is_empty() {
        return fail("prompt must contain at least one message");
    }

    let mut prompt = Vec::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        let role = match entry.get("role").and_then(Value::as_str) {
            Some("user") => PromptRole::User,
            Some("system") => PromptRole::System,
            _ => return fail(format!("prompt[{}].role must be one of 'user', 'system'", i)),
        };
        let content = match entry.get("content") {
            Some(Value::String(s)) => s.clone(),
            _ => return fail(format!("prompt[{}].content must be a string", i)),
        };
        prompt.push(PromptMessage { role, content });
    }

    let kind = match body.get("type") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => return fail("type should be string."),
    };

    Ok(ChatRequest { prompt, kind })
}
