use std::collections::BTreeMap;
use std::fmt;

/// Field name → message for every field that failed validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error. The first message for a field wins.
    pub fn add(&mut self, field: &str, message: &str) {
        self.fields
            .entry(field.to_string())
            .or_insert_with(|| message.to_string());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

#[derive(Debug, Clone, Default)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default)]
pub struct ResetPasswordForm {
    pub password: String,
    pub password_confirmation: String,
}

/// Loose structural email check: one `@`, a non-empty local part, and a
/// dotted domain with no empty labels.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
}

pub fn validate_sign_in(form: &SignInForm) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let email = form.email.trim();
    if email.is_empty() {
        errors.add("email", "Email required");
    } else if !is_valid_email(email) {
        errors.add("email", "Enter a valid email");
    }

    if form.password.is_empty() {
        errors.add("password", "Password required");
    }

    errors.into_result()
}

pub fn validate_reset_password(form: &ResetPasswordForm) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if form.password.is_empty() {
        errors.add("password", "Password required");
    }
    if form.password_confirmation != form.password {
        errors.add("password_confirmation", "Confirmation does not match");
    }

    errors.into_result()
}
