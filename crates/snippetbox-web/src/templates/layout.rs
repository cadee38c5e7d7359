//! Base layout and the fragments every page shares.

use maud::{DOCTYPE, Markup, html};

use super::TemplateData;

pub(super) fn base(title: &str, data: &TemplateData, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { (title) " - Snippetbox" }
                link rel="stylesheet" href="/static/css/main.css";
                link rel="stylesheet" href="https://fonts.googleapis.com/css?family=Ubuntu+Mono:400,700";
            }
            body {
                header {
                    h1 { a href="/" { "Snippetbox" } }
                }
                (nav(data))
                main {
                    (flash(data))
                    (body)
                }
                (footer(data))
            }
        }
    }
}

fn nav(data: &TemplateData) -> Markup {
    html! {
        nav {
            div {
                a href="/" { "Home" }
                a href="/about" { "About" }
                @if data.is_authenticated {
                    a href="/snippet/create" { "Create snippet" }
                }
            }
            div {
                @if data.is_authenticated {
                    a href="/account/view" { "Account" }
                    form action="/user/logout" method="POST" {
                        (csrf_field(data))
                        button { "Logout" }
                    }
                } @else {
                    a href="/user/signup" { "Signup" }
                    a href="/user/login" { "Login" }
                }
            }
        }
    }
}

fn flash(data: &TemplateData) -> Markup {
    html! {
        @if let Some(message) = &data.flash {
            div class="flash" { (message) }
        }
    }
}

fn footer(data: &TemplateData) -> Markup {
    html! {
        footer {
            "Powered by " a href="https://www.rust-lang.org/" { "Rust" } " in " (data.current_year)
        }
    }
}

/// Hidden input carrying the request's CSRF token.
pub(super) fn csrf_field(data: &TemplateData) -> Markup {
    html! {
        input type="hidden" name="csrf_token" value=(data.csrf_token);
    }
}

/// `<label class="error">` for the field's first error, if any.
pub(super) fn field_error(error: Option<&str>) -> Markup {
    html! {
        @if let Some(message) = error {
            label class="error" { (message) }
        }
    }
}
