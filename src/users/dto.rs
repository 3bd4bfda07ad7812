use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::repo_types::{NewUser, User};

/// HTML5 email grammar. The `email` domain in the database carries the same check.
pub(crate) const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$";

pub const NAME_MAX_CHARS: usize = 20;
pub const PASSWORD_MIN_CHARS: usize = 8;
pub const PASSWORD_MAX_CHARS: usize = 30;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(EMAIL_PATTERN).unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// One rejected field of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Body of `POST /user`.
#[derive(Debug, Deserialize)]
pub struct UserCreateRequest {
    pub email_addr: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

/// Query of `POST /check_password`.
#[derive(Debug, Deserialize)]
pub struct CheckPasswordRequest {
    pub email_addr: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListUsersQuery {
    pub limit: Option<i64>,
}

/// Public view of a user. The type has no password field at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserResponse {
    pub id: i32,
    pub email_addr: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckPasswordResponse {
    pub id: i32,
    pub email_addr: String,
    pub password_matches: bool,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email_addr: u.email_addr,
            first_name: u.first_name,
            last_name: u.last_name,
        }
    }
}

impl UserResponse {
    pub fn created(id: i32, user: NewUser) -> Self {
        Self {
            id,
            email_addr: user.email_addr,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

fn check_email(raw: &str, errors: &mut Vec<FieldError>) -> String {
    let email = raw.trim().to_string();
    if !is_valid_email(&email) {
        errors.push(FieldError::new("email_addr", "value is not a valid email address"));
    }
    email
}

fn check_name(field: &'static str, raw: &str, errors: &mut Vec<FieldError>) -> String {
    let name = raw.trim().to_string();
    if name.chars().count() > NAME_MAX_CHARS {
        errors.push(FieldError::new(
            field,
            format!("ensure this value has at most {NAME_MAX_CHARS} characters"),
        ));
    }
    name
}

fn check_password(raw: &str, errors: &mut Vec<FieldError>) {
    let len = raw.chars().count();
    if len < PASSWORD_MIN_CHARS {
        errors.push(FieldError::new(
            "password",
            format!("ensure this value has at least {PASSWORD_MIN_CHARS} characters"),
        ));
    } else if len > PASSWORD_MAX_CHARS {
        errors.push(FieldError::new(
            "password",
            format!("ensure this value has at most {PASSWORD_MAX_CHARS} characters"),
        ));
    }
}

impl UserCreateRequest {
    /// Trims and checks every field, collecting all failures.
    pub fn validate(self) -> Result<NewUser, Vec<FieldError>> {
        let mut errors = Vec::new();
        let email_addr = check_email(&self.email_addr, &mut errors);
        let first_name = check_name("first_name", &self.first_name, &mut errors);
        let last_name = check_name("last_name", &self.last_name, &mut errors);
        check_password(&self.password, &mut errors);

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(NewUser {
            email_addr,
            first_name,
            last_name,
            password: self.password,
        })
    }
}

impl CheckPasswordRequest {
    pub fn validate(self) -> Result<Self, Vec<FieldError>> {
        let mut errors = Vec::new();
        let email_addr = check_email(&self.email_addr, &mut errors);
        check_password(&self.password, &mut errors);

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(Self {
            email_addr,
            password: self.password,
        })
    }
}

impl ListUsersQuery {
    pub fn validate(self) -> Result<Option<i64>, Vec<FieldError>> {
        match self.limit {
            Some(n) if n < 0 => Err(vec![FieldError::new("limit", "must not be negative")]),
            other => Ok(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(email: &str, first: &str, last: &str, password: &str) -> UserCreateRequest {
        UserCreateRequest {
            email_addr: email.into(),
            first_name: first.into(),
            last_name: last.into(),
            password: password.into(),
        }
    }

    fn fields(errors: &[FieldError]) -> Vec<&'static str> {
        errors.iter().map(|e| e.field).collect()
    }

    #[test]
    fn accepts_valid_request_and_trims_names() {
        let user = request(" a@b.com ", "  Jo ", "Doe  ", "abcdef12")
            .validate()
            .expect("valid");
        assert_eq!(user.email_addr, "a@b.com");
        assert_eq!(user.first_name, "Jo");
        assert_eq!(user.last_name, "Doe");
        assert_eq!(user.password, "abcdef12");
    }

    #[test]
    fn name_limit_applies_after_trimming() {
        let padded = format!("   {}   ", "a".repeat(20));
        assert!(request("a@b.com", &padded, "Doe", "abcdef12").validate().is_ok());

        let errors = request("a@b.com", &"a".repeat(21), &"b".repeat(25), "abcdef12")
            .validate()
            .unwrap_err();
        assert_eq!(fields(&errors), vec!["first_name", "last_name"]);
    }

    #[test]
    fn name_limit_counts_characters_not_bytes() {
        let name = "é".repeat(20);
        assert!(request("a@b.com", &name, "Doe", "abcdef12").validate().is_ok());
    }

    #[test]
    fn empty_and_whitespace_only_names_are_accepted() {
        let user = request("a@b.com", "   ", "", "abcdef12")
            .validate()
            .expect("blank names are allowed");
        assert_eq!(user.first_name, "");
        assert_eq!(user.last_name, "");
    }

    #[test]
    fn password_bounds() {
        assert!(request("a@b.com", "Jo", "Doe", "abcdefg").validate().is_err());
        assert!(request("a@b.com", "Jo", "Doe", "abcdefgh").validate().is_ok());
        assert!(request("a@b.com", "Jo", "Doe", &"x".repeat(30)).validate().is_ok());
        let errors = request("a@b.com", "Jo", "Doe", &"x".repeat(31))
            .validate()
            .unwrap_err();
        assert_eq!(fields(&errors), vec!["password"]);
    }

    #[test]
    fn reports_every_failing_field() {
        let errors = request("not-an-email", &"x".repeat(22), &"x".repeat(21), "short")
            .validate()
            .unwrap_err();
        assert_eq!(
            fields(&errors),
            vec!["email_addr", "first_name", "last_name", "password"]
        );
    }

    #[test]
    fn email_grammar() {
        for ok in ["a@b.com", "john.doe+tag@mail.example.org", "A@X.COM", "x@localhost"] {
            assert!(is_valid_email(ok), "{ok} should be valid");
        }
        for bad in ["", "plain", "@b.com", "a@", "a b@c.com", "a@-b.com", "a@@b.com"] {
            assert!(!is_valid_email(bad), "{bad} should be invalid");
        }
    }

    #[test]
    fn check_password_request_validation() {
        let req = CheckPasswordRequest {
            email_addr: "a@b.com".into(),
            password: "abc".into(),
        };
        let errors = req.validate().unwrap_err();
        assert_eq!(fields(&errors), vec!["password"]);
    }

    #[test]
    fn negative_limit_is_rejected() {
        assert!(ListUsersQuery { limit: Some(-1) }.validate().is_err());
        assert_eq!(ListUsersQuery { limit: Some(0) }.validate().unwrap(), Some(0));
        assert_eq!(ListUsersQuery::default().validate().unwrap(), None);
    }

    #[test]
    fn user_response_never_carries_password_material() {
        let user = User {
            id: 7,
            email_addr: "a@b.com".into(),
            first_name: "Jo".into(),
            last_name: "Doe".into(),
            password_hash: "$argon2id$v=19$secret".into(),
        };
        let json = serde_json::to_value(UserResponse::from(user)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": 7, "email_addr": "a@b.com", "first_name": "Jo", "last_name": "Doe"})
        );
    }
}
