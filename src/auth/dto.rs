use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

/// Surrounding whitespace is dropped before any length rule sees the value.
fn trimmed<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(de)?.map(|s| s.trim().to_string()))
}

/// Body of `POST /register` and `PUT /user/:id`; every field is required.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterForm {
    #[validate(
        required(message = "This field is required."),
        length(min = 2, max = 20, message = "Field must be between 2 and 20 characters long.")
    )]
    #[serde(default, deserialize_with = "trimmed")]
    pub username: Option<String>,
    #[validate(
        required(message = "This field is required."),
        email(message = "Invalid email address.")
    )]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "This field is required."))]
    #[serde(default)]
    pub password: String,
    #[validate(
        length(min = 1, message = "This field is required."),
        must_match(other = "password", message = "Field must be equal to password.")
    )]
    #[serde(default)]
    pub confirm_password: String,
}

/// Register fields after validation, with the email normalised.
#[derive(Debug)]
pub struct Credentials {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterForm {
    pub fn into_credentials(self) -> Credentials {
        Credentials {
            username: self.username.unwrap_or_default(),
            email: normalize_email(&self.email.unwrap_or_default()),
            password: self.password,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(
        required(message = "This field is required."),
        email(message = "Invalid email address.")
    )]
    pub email: Option<String>,
    #[validate(
        required(message = "This field is required."),
        length(min = 1, message = "This field is required.")
    )]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
