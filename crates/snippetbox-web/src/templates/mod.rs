//! HTML rendering.
//!
//! Every page is a maud function registered by name in a [`TemplateCache`]
//! built once at startup. Pages are composed with the shared layout in
//! [`layout`]; all dynamic values are escaped by maud.

mod layout;
mod pages;

use std::collections::HashMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Datelike, TimeZone, Utc};
use maud::Markup;
use snippetbox_core::{Snippet, User};

use crate::context::RequestContext;
use crate::error::AppError;
use crate::forms::{LoginForm, PasswordUpdateForm, SignupForm, SnippetCreateForm};

/// Form state carried back into a page for redisplay.
#[derive(Debug, Clone)]
pub enum FormData {
    SnippetCreate(SnippetCreateForm),
    Signup(SignupForm),
    Login(LoginForm),
    PasswordUpdate(PasswordUpdateForm),
}

/// Everything a page may display.
#[derive(Debug, Clone, Default)]
pub struct TemplateData {
    pub current_year: i32,
    pub snippet: Option<Snippet>,
    pub snippets: Vec<Snippet>,
    pub user: Option<User>,
    pub form: Option<FormData>,
    pub flash: Option<String>,
    pub is_authenticated: bool,
    pub csrf_token: String,
}

impl TemplateData {
    /// Base data for a request: year, flash, auth state and CSRF token.
    pub fn new(ctx: &RequestContext, flash: Option<String>) -> Self {
        Self {
            current_year: Utc::now().year(),
            flash,
            is_authenticated: ctx.is_authenticated(),
            csrf_token: ctx.csrf_token.clone(),
            ..Default::default()
        }
    }

    pub fn with_form(mut self, form: FormData) -> Self {
        self.form = Some(form);
        self
    }
}

/// `17 Mar 2022 at 10:15`, always in UTC.
pub fn human_date<Tz: TimeZone>(t: &DateTime<Tz>) -> String {
    t.with_timezone(&Utc).format("%d %b %Y at %H:%M").to_string()
}

type PageFn = fn(&TemplateData) -> Markup;

struct Page {
    title: &'static str,
    body: PageFn,
}

/// Pages keyed by name, immutable after construction.
pub struct TemplateCache {
    pages: HashMap<&'static str, Page>,
}

impl TemplateCache {
    pub fn new() -> Self {
        let registry: [(&'static str, &'static str, PageFn); 8] = [
            ("home.html", "Home", pages::home),
            ("about.html", "About", pages::about),
            ("view.html", "Snippet", pages::view),
            ("create.html", "Create a New Snippet", pages::create),
            ("signup.html", "Signup", pages::signup),
            ("login.html", "Login", pages::login),
            ("account.html", "Your Account", pages::account),
            ("password.html", "Change Password", pages::password),
        ];

        let pages: HashMap<_, _> = registry
            .into_iter()
            .map(|(name, title, body)| (name, Page { title, body }))
            .collect();

        tracing::debug!(pages = pages.len(), "template cache built");

        Self { pages }
    }

    /// Render `page` completely, then pair it with `status`.
    pub fn render(
        &self,
        status: StatusCode,
        page: &str,
        data: &TemplateData,
    ) -> Result<Response, AppError> {
        let entry = self.pages.get(page).ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!("the template {page} does not exist"))
        })?;

        let body = (entry.body)(data);
        let markup = layout::base(entry.title, data, body);

        Ok((status, markup).into_response())
    }
}

impl Default for TemplateCache {
    fn default() -> Self {
        Self::new()
    }
}
