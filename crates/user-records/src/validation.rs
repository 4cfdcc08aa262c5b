//! Field rules for user records, status updates, signup and login.
//!
//! Every field is checked and all failures are reported together, one
//! message per failing field. Within a field the first failing rule wins.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::error::UserError;
use crate::types::{LoginRequest, SignupRequest, StatusUpdate, UserInput};

static NAME: Lazy<Regex> = Lazy::new(|| build(r"^[A-Za-z]+(?:[ '\-][A-Za-z]+)*$"));
static EMAIL: Lazy<Regex> =
    Lazy::new(|| build(r"^[a-zA-Z0-9._%+-]{3,}@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$"));
static FREE_TEXT: Lazy<Regex> = Lazy::new(|| build(r#"^[A-Za-z0-9_\s\-!@#$%^&*().,'"]+$"#));
static PHONE: Lazy<Regex> = Lazy::new(|| build(r"^[0-9]{10}$"));
static URI: Lazy<Regex> = Lazy::new(|| build(r"^[A-Za-z][A-Za-z0-9+.\-]*:\S+$"));

fn build(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in validation pattern compiles")
}

const NAME_PATTERN: &str = "Name must contain only letters, single spaces, hyphens, or apostrophes. It must not start or end with a space or hyphen.";
const PHONE_PATTERN: &str =
    "Phone number must be exactly 10 digits and should have only numbers.";
const PASSWORD_PATTERN: &str = "Password must include at least 1 uppercase letter, 1 lowercase letter, 1 number, and 1 special character.";
const STATUS_TYPE: &str = "Status must be a boolean value (true or false)";

/// Validates a create/update body for a user record.
pub fn validate_user(body: &Value) -> Result<UserInput, UserError> {
    let mut check = Checker::new(
        body,
        &["name", "email", "about", "phone", "location", "status", "image"],
    )?;

    let name = check.name();
    let email = check.email(EmailStyle::Record);
    let about = check.free_text(
        "about",
        FreeText {
            required: "About is required",
            pattern: "About must not start or end with a space or hyphen, and cannot contain multiple spaces or hyphens.",
            min: (10, "About must be at least 10 characters long"),
            max: (200, "About can't exceed 200 characters"),
        },
    );
    let phone = check.phone();
    let location = check.free_text(
        "location",
        FreeText {
            required: "Location is required",
            pattern: "Location must not start or end with a space or hyphen, and cannot contain multiple spaces or hyphens.",
            min: (5, "Location  must be at least 5 characters long"),
            max: (50, "Location  can't exceed 50 characters"),
        },
    );
    let status = check.status();
    let image = check.image();

    check.finish()?;
    match (name, email, about, phone, location, status) {
        (Some(name), Some(email), Some(about), Some(phone), Some(location), Some(status)) => {
            Ok(UserInput {
                name,
                email,
                about,
                phone,
                location,
                status,
                image,
            })
        }
        _ => Err(UserError::Validation(vec!["Invalid user payload".into()])),
    }
}

/// Validates a status-only update body.
pub fn validate_status(body: &Value) -> Result<StatusUpdate, UserError> {
    let mut check = Checker::new(body, &["status"])?;
    let status = check.status();
    check.finish()?;
    status
        .map(|status| StatusUpdate { status })
        .ok_or_else(|| UserError::Validation(vec!["Status is required".into()]))
}

pub fn validate_signup(body: &Value) -> Result<SignupRequest, UserError> {
    let mut check = Checker::new(body, &["name", "email", "phone", "password"])?;
    let name = check.name();
    let email = check.email(EmailStyle::Auth);
    let phone = check.phone();
    let password = check.password();
    check.finish()?;
    match (name, email, phone, password) {
        (Some(name), Some(email), Some(phone), Some(password)) => Ok(SignupRequest {
            name,
            email,
            phone,
            password,
        }),
        _ => Err(UserError::Validation(vec!["Invalid signup payload".into()])),
    }
}

pub fn validate_login(body: &Value) -> Result<LoginRequest, UserError> {
    let mut check = Checker::new(body, &["email", "password"])?;
    let email = check.email(EmailStyle::Auth);
    let password = check.password();
    check.finish()?;
    match (email, password) {
        (Some(email), Some(password)) => Ok(LoginRequest { email, password }),
        _ => Err(UserError::Validation(vec!["Invalid login payload".into()])),
    }
}

/// Record and auth schemas differ only in trailing punctuation of the email
/// messages.
#[derive(Clone, Copy)]
enum EmailStyle {
    Record,
    Auth,
}

struct FreeText {
    required: &'static str,
    pattern: &'static str,
    min: (usize, &'static str),
    max: (usize, &'static str),
}

struct Checker<'a> {
    fields: &'a Map<String, Value>,
    errors: Vec<String>,
}

impl<'a> Checker<'a> {
    fn new(body: &'a Value, allowed: &[&str]) -> Result<Self, UserError> {
        let fields = body
            .as_object()
            .ok_or_else(|| UserError::Validation(vec!["\"value\" must be of type object".into()]))?;
        let errors = fields
            .keys()
            .filter(|key| !allowed.contains(&key.as_str()))
            .map(|key| format!("\"{key}\" is not allowed"))
            .collect();
        Ok(Self { fields, errors })
    }

    fn finish(self) -> Result<(), UserError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(UserError::Validation(self.errors))
        }
    }

    fn fail<T>(&mut self, message: impl Into<String>) -> Option<T> {
        self.errors.push(message.into());
        None
    }

    /// Fetches a required, non-empty string field.
    fn string(&mut self, field: &str, required: &str) -> Option<&'a str> {
        let fields = self.fields;
        match fields.get(field) {
            None | Some(Value::Null) => self.fail(required),
            Some(Value::String(s)) if s.is_empty() => self.fail(required),
            Some(Value::String(s)) => Some(s.as_str()),
            Some(_) => self.fail(format!("\"{field}\" must be a string")),
        }
    }

    fn name(&mut self) -> Option<String> {
        let value = self.string("name", "Name is required")?;
        let len = value.chars().count();
        if !NAME.is_match(value) {
            self.fail(NAME_PATTERN)
        } else if len < 2 {
            self.fail("Name must be at least 2 characters")
        } else if len > 50 {
            self.fail("Name cannot exceed 50 characters")
        } else {
            Some(value.to_string())
        }
    }

    fn email(&mut self, style: EmailStyle) -> Option<String> {
        let (required, max) = match style {
            EmailStyle::Record => ("Email is required", "Email cannot exceed 250 characters"),
            EmailStyle::Auth => ("Email is required.", "Email cannot exceed 250 characters."),
        };
        let value = self.string("email", required)?;
        if !EMAIL.is_match(value) {
            self.fail("Please enter a valid email address.")
        } else if value.chars().count() > 250 {
            self.fail(max)
        } else {
            Some(value.to_lowercase())
        }
    }

    fn free_text(&mut self, field: &str, rules: FreeText) -> Option<String> {
        let value = self.string(field, rules.required)?;
        let len = value.chars().count();
        if !is_clean_free_text(value) {
            self.fail(rules.pattern)
        } else if len < rules.min.0 {
            self.fail(rules.min.1)
        } else if len > rules.max.0 {
            self.fail(rules.max.1)
        } else {
            Some(value.to_string())
        }
    }

    fn phone(&mut self) -> Option<String> {
        let value = self.string("phone", "Phone number is required")?;
        if PHONE.is_match(value) {
            Some(value.to_string())
        } else {
            self.fail(PHONE_PATTERN)
        }
    }

    /// Accepts JSON booleans and the strings "true"/"false" in any case.
    fn status(&mut self) -> Option<bool> {
        let fields = self.fields;
        match fields.get("status") {
            None | Some(Value::Null) => self.fail("Status is required"),
            Some(Value::Bool(b)) => Some(*b),
            Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => Some(true),
            Some(Value::String(s)) if s.eq_ignore_ascii_case("false") => Some(false),
            Some(_) => self.fail(STATUS_TYPE),
        }
    }

    fn image(&mut self) -> Option<String> {
        let fields = self.fields;
        match fields.get("image") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if URI.is_match(s) => Some(s.clone()),
            Some(Value::String(_)) => self.fail("\"image\" must be a valid uri"),
            Some(_) => self.fail("\"image\" must be a string"),
        }
    }

    /// Leading or trailing whitespace is rejected, never trimmed away, so
    /// the stored hash always matches exactly what the caller typed.
    fn password(&mut self) -> Option<String> {
        let value = self.string("password", "Password is required.")?;
        let len = value.chars().count();
        if len < 8 {
            self.fail("Password must be at least 8 characters.")
        } else if len > 30 {
            self.fail("Password cannot exceed 30 characters.")
        } else if !is_strong_password(value) {
            self.fail(PASSWORD_PATTERN)
        } else if has_whitespace_run(value) {
            self.fail("Password cannot contain multiple consecutive spaces.")
        } else if value.starts_with(char::is_whitespace) || value.ends_with(char::is_whitespace) {
            self.fail("Password cannot start or end with spaces.")
        } else {
            Some(value.to_string())
        }
    }
}

/// Allowed characters only, no leading/trailing space or hyphen, and no run
/// of two or more spaces/hyphens.
fn is_clean_free_text(value: &str) -> bool {
    let is_separator = |c: char| c.is_whitespace() || c == '-';
    FREE_TEXT.is_match(value)
        && !value.starts_with(is_separator)
        && !value.ends_with(is_separator)
        && !value
            .chars()
            .zip(value.chars().skip(1))
            .any(|(a, b)| is_separator(a) && is_separator(b))
}

fn is_strong_password(value: &str) -> bool {
    !value.contains('\n')
        && value.chars().any(|c| c.is_ascii_lowercase())
        && value.chars().any(|c| c.is_ascii_uppercase())
        && value.chars().any(|c| c.is_ascii_digit())
        && value
            .chars()
            .any(|c| !c.is_ascii_alphanumeric() && !c.is_whitespace())
}

fn has_whitespace_run(value: &str) -> bool {
    value
        .chars()
        .zip(value.chars().skip(1))
        .any(|(a, b)| a.is_whitespace() && b.is_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_user() -> Value {
        json!({
            "name": "Ann O'Neil",
            "email": "Ann.Lee@Example.com",
            "about": "Builds reliable software, mostly in Rust.",
            "phone": "0123456789",
            "location": "Lisbon, Portugal",
            "status": true
        })
    }

    fn errors(result: Result<impl std::fmt::Debug, UserError>) -> Vec<String> {
        match result {
            Err(UserError::Validation(errors)) => errors,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn built_in_patterns_compile() {
        for re in [&NAME, &EMAIL, &FREE_TEXT, &PHONE, &URI] {
            assert!(!Lazy::force(re).as_str().is_empty());
        }
    }

    #[test]
    fn accepts_valid_user_and_lowercases_email() {
        let input = validate_user(&valid_user()).unwrap();
        assert_eq!(input.email, "ann.lee@example.com");
        assert_eq!(input.name, "Ann O'Neil");
        assert!(input.status);
        assert_eq!(input.image, None);
    }

    #[test]
    fn reports_every_failing_field() {
        let body = json!({
            "name": "A",
            "email": "nope",
            "about": "short",
            "phone": "12345",
            "location": "",
            "status": "maybe"
        });
        let errs = errors(validate_user(&body));
        assert_eq!(
            errs,
            vec![
                "Name must be at least 2 characters",
                "Please enter a valid email address.",
                "About must be at least 10 characters long",
                PHONE_PATTERN,
                "Location is required",
                STATUS_TYPE,
            ]
        );
    }

    #[test]
    fn missing_fields_are_required() {
        let errs = errors(validate_user(&json!({})));
        assert!(errs.contains(&"Name is required".to_string()));
        assert!(errs.contains(&"Status is required".to_string()));
        assert_eq!(errs.len(), 6);
    }

    #[test]
    fn name_rejects_doubled_or_edge_separators() {
        for name in ["Ann  Lee", "-Ann", "Ann-", "Ann--Lee", "Ann3"] {
            let mut body = valid_user();
            body["name"] = json!(name);
            assert_eq!(errors(validate_user(&body)), vec![NAME_PATTERN], "{name}");
        }
        let mut body = valid_user();
        body["name"] = json!("Mary-Jane Smith");
        assert!(validate_user(&body).is_ok());
    }

    #[test]
    fn free_text_rules() {
        for about in ["  leading space here", "trailing hyphen here -", "double  space inside", "angle <brackets> here"] {
            let mut body = valid_user();
            body["about"] = json!(about);
            assert_eq!(errors(validate_user(&body)).len(), 1, "{about}");
        }
        let mut body = valid_user();
        body["about"] = json!("x".repeat(201));
        assert_eq!(
            errors(validate_user(&body)),
            vec!["About can't exceed 200 characters"]
        );
    }

    #[test]
    fn status_accepts_string_booleans() {
        let mut body = valid_user();
        body["status"] = json!("FALSE");
        assert!(!validate_user(&body).unwrap().status);
        assert!(validate_status(&json!({ "status": "true" })).unwrap().status);
        assert_eq!(
            errors(validate_status(&json!({ "status": 1 }))),
            vec![STATUS_TYPE]
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let mut body = valid_user();
        body["role"] = json!("admin");
        assert_eq!(errors(validate_user(&body)), vec!["\"role\" is not allowed"]);
        assert_eq!(
            errors(validate_status(&json!({ "status": true, "name": "Ann" }))),
            vec!["\"name\" is not allowed"]
        );
    }

    #[test]
    fn image_must_be_uri() {
        let mut body = valid_user();
        body["image"] = json!("https://cdn.example.com/ann.png");
        assert!(validate_user(&body).unwrap().image.is_some());
        body["image"] = json!("not a uri");
        assert_eq!(
            errors(validate_user(&body)),
            vec!["\"image\" must be a valid uri"]
        );
    }

    #[test]
    fn non_object_body_rejected() {
        assert_eq!(
            errors(validate_user(&json!([1, 2]))),
            vec!["\"value\" must be of type object"]
        );
    }

    #[test]
    fn signup_uses_auth_messages() {
        let errs = errors(validate_signup(&json!({
            "name": "Ann",
            "email": "",
            "phone": "0123456789",
            "password": "Secret1!"
        })));
        assert_eq!(errs, vec!["Email is required."]);
    }

    #[test]
    fn password_rules_in_order() {
        let cases = [
            ("Ab1!", "Password must be at least 8 characters."),
            ("Abcdefg1!Abcdefg1!Abcdefg1!Abcd", "Password cannot exceed 30 characters."),
            ("abcdefg1!", PASSWORD_PATTERN),
            ("Abc  def1!", "Password cannot contain multiple consecutive spaces."),
            (" Abcdef1!", "Password cannot start or end with spaces."),
        ];
        for (password, expected) in cases {
            let errs = errors(validate_login(&json!({
                "email": "ann@example.com",
                "password": password
            })));
            assert_eq!(errs, vec![expected], "{password}");
        }
        let ok = validate_login(&json!({
            "email": "ANN@example.com",
            "password": "Correct Horse1!"
        }))
        .unwrap();
        assert_eq!(ok.email, "ann@example.com");
    }
}
