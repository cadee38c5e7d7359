//! Form payloads and their validation rules.
//!
//! Each form embeds a [`Validator`] that collects errors for redisplay.

use serde::Deserialize;
use snippetbox_core::PERMITTED_EXPIRY_DAYS;
use snippetbox_core::validator::{
    EMAIL_RX, Validator, matches, max_chars, min_chars, not_blank, permitted_value,
};

pub const BLANK: &str = "This field cannot be blank";
pub const TITLE_TOO_LONG: &str = "This field cannot be more than 100 characters long";
pub const BAD_EXPIRY: &str = "This field must equal 1, 7 or 365";
pub const BAD_EMAIL: &str = "This field must be a valid email address";
pub const PASSWORD_TOO_SHORT: &str = "This field must be at least 8 characters long";
pub const DUPLICATE_EMAIL: &str = "Email address is already in use";
pub const BAD_CREDENTIALS: &str = "Email or password is incorrect";
pub const BAD_CURRENT_PASSWORD: &str = "Current password is incorrect";
pub const PASSWORD_MISMATCH: &str = "Passwords do not match";

const TITLE_MAX_CHARS: usize = 100;
const PASSWORD_MIN_CHARS: usize = 8;

fn default_expires() -> i64 {
    365
}

/// `POST /snippet/create`
#[derive(Debug, Clone, Deserialize)]
pub struct SnippetCreateForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default = "default_expires")]
    pub expires: i64,
    #[serde(skip)]
    pub validator: Validator,
}

impl Default for SnippetCreateForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            content: String::new(),
            expires: default_expires(),
            validator: Validator::default(),
        }
    }
}

impl SnippetCreateForm {
    pub fn validate(&mut self) -> bool {
        let v = &mut self.validator;
        v.check_field(not_blank(&self.title), "title", BLANK);
        v.check_field(
            max_chars(&self.title, TITLE_MAX_CHARS),
            "title",
            TITLE_TOO_LONG,
        );
        v.check_field(not_blank(&self.content), "content", BLANK);
        v.check_field(
            permitted_value(&self.expires, &PERMITTED_EXPIRY_DAYS),
            "expires",
            BAD_EXPIRY,
        );
        v.valid()
    }
}

/// `POST /user/signup`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(skip)]
    pub validator: Validator,
}

impl SignupForm {
    pub fn validate(&mut self) -> bool {
        let v = &mut self.validator;
        v.check_field(not_blank(&self.name), "name", BLANK);
        v.check_field(not_blank(&self.email), "email", BLANK);
        v.check_field(matches(&self.email, &EMAIL_RX), "email", BAD_EMAIL);
        v.check_field(not_blank(&self.password), "password", BLANK);
        v.check_field(
            min_chars(&self.password, PASSWORD_MIN_CHARS),
            "password",
            PASSWORD_TOO_SHORT,
        );
        v.valid()
    }
}

/// `POST /user/login`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(skip)]
    pub validator: Validator,
}

impl LoginForm {
    pub fn validate(&mut self) -> bool {
        let v = &mut self.validator;
        v.check_field(not_blank(&self.email), "email", BLANK);
        v.check_field(matches(&self.email, &EMAIL_RX), "email", BAD_EMAIL);
        v.check_field(not_blank(&self.password), "password", BLANK);
        v.valid()
    }
}

/// `POST /account/password/update`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PasswordUpdateForm {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
    #[serde(default)]
    pub new_password_confirmation: String,
    #[serde(skip)]
    pub validator: Validator,
}

impl PasswordUpdateForm {
    pub fn validate(&mut self) -> bool {
        let v = &mut self.validator;
        v.check_field(
            not_blank(&self.current_password),
            "current_password",
            BLANK,
        );
        v.check_field(not_blank(&self.new_password), "new_password", BLANK);
        v.check_field(
            min_chars(&self.new_password, PASSWORD_MIN_CHARS),
            "new_password",
            PASSWORD_TOO_SHORT,
        );
        v.check_field(
            not_blank(&self.new_password_confirmation),
            "new_password_confirmation",
            BLANK,
        );
        v.check_field(
            self.new_password == self.new_password_confirmation,
            "new_password_confirmation",
            PASSWORD_MISMATCH,
        );
        v.valid()
    }
}
