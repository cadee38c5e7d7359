//! Page bodies registered in the template cache.

use maud::{Markup, html};

use super::layout::{csrf_field, field_error};
use super::{FormData, TemplateData, human_date};
use crate::forms::{LoginForm, PasswordUpdateForm, SignupForm, SnippetCreateForm};

pub(super) fn home(data: &TemplateData) -> Markup {
    html! {
        h2 { "Latest Snippets" }
        @if data.snippets.is_empty() {
            p { "There's nothing to see here... yet!" }
        } @else {
            table {
                tr {
                    th { "Title" }
                    th { "Created" }
                    th { "ID" }
                }
                @for snippet in &data.snippets {
                    tr {
                        td { a href={ "/snippet/view/" (snippet.id) } { (snippet.title) } }
                        td { (human_date(&snippet.created_on)) }
                        td { "#" (snippet.id) }
                    }
                }
            }
        }
    }
}

pub(super) fn about(_data: &TemplateData) -> Markup {
    html! {
        h2 { "About" }
        p {
            "Snippetbox is a place to paste and share short pieces of text. "
            "Snippets expire after a day, a week or a year."
        }
    }
}

pub(super) fn view(data: &TemplateData) -> Markup {
    html! {
        @if let Some(snippet) = &data.snippet {
            div class="snippet" {
                div class="metadata" {
                    strong { (snippet.title) }
                    span { "#" (snippet.id) }
                }
                pre { code { (snippet.content) } }
                div class="metadata" {
                    time { "Created: " (human_date(&snippet.created_on)) }
                    time { "Expires: " (human_date(&snippet.expires_on)) }
                }
            }
        }
    }
}

pub(super) fn create(data: &TemplateData) -> Markup {
    let fallback = SnippetCreateForm::default();
    let form = match &data.form {
        Some(FormData::SnippetCreate(form)) => form,
        _ => &fallback,
    };
    let v = &form.validator;

    html! {
        form action="/snippet/create" method="POST" {
            (csrf_field(data))
            div {
                label { "Title:" }
                (field_error(v.field_error("title")))
                input type="text" name="title" value=(form.title);
            }
            div {
                label { "Content:" }
                (field_error(v.field_error("content")))
                textarea name="content" { (form.content) }
            }
            div {
                label { "Delete in:" }
                (field_error(v.field_error("expires")))
                @for (days, label) in [(365, "One Year"), (7, "One Week"), (1, "One Day")] {
                    input type="radio" name="expires" value=(days) checked[form.expires == days];
                    " " (label) " "
                }
            }
            div {
                input type="submit" value="Publish snippet";
            }
        }
    }
}

pub(super) fn signup(data: &TemplateData) -> Markup {
    let fallback = SignupForm::default();
    let form = match &data.form {
        Some(FormData::Signup(form)) => form,
        _ => &fallback,
    };
    let v = &form.validator;

    html! {
        form action="/user/signup" method="POST" novalidate {
            (csrf_field(data))
            div {
                label { "Name:" }
                (field_error(v.field_error("name")))
                input type="text" name="name" value=(form.name);
            }
            div {
                label { "Email:" }
                (field_error(v.field_error("email")))
                input type="email" name="email" value=(form.email);
            }
            div {
                label { "Password:" }
                (field_error(v.field_error("password")))
                input type="password" name="password";
            }
            div {
                input type="submit" value="Signup";
            }
        }
    }
}

pub(super) fn login(data: &TemplateData) -> Markup {
    let fallback = LoginForm::default();
    let form = match &data.form {
        Some(FormData::Login(form)) => form,
        _ => &fallback,
    };
    let v = &form.validator;

    html! {
        form action="/user/login" method="POST" novalidate {
            (csrf_field(data))
            @for error in &v.non_field_errors {
                div class="error" { (error) }
            }
            div {
                label { "Email:" }
                (field_error(v.field_error("email")))
                input type="email" name="email" value=(form.email);
            }
            div {
                label { "Password:" }
                (field_error(v.field_error("password")))
                input type="password" name="password";
            }
            div {
                input type="submit" value="Login";
            }
        }
    }
}

pub(super) fn account(data: &TemplateData) -> Markup {
    html! {
        h2 { "Your Account" }
        @if let Some(user) = &data.user {
            table {
                tr {
                    th { "Name" }
                    td { (user.name) }
                }
                tr {
                    th { "Email" }
                    td { (user.email) }
                }
                tr {
                    th { "Joined" }
                    td { (human_date(&user.created_on)) }
                }
                tr {
                    th { "Password" }
                    td { a href="/account/password/update" { "Change password" } }
                }
            }
        }
    }
}

pub(super) fn password(data: &TemplateData) -> Markup {
    let fallback = PasswordUpdateForm::default();
    let form = match &data.form {
        Some(FormData::PasswordUpdate(form)) => form,
        _ => &fallback,
    };
    let v = &form.validator;

    html! {
        h2 { "Change Password" }
        form action="/account/password/update" method="POST" novalidate {
            (csrf_field(data))
            div {
                label { "Current password:" }
                (field_error(v.field_error("current_password")))
                input type="password" name="current_password";
            }
            div {
                label { "New password:" }
                (field_error(v.field_error("new_password")))
                input type="password" name="new_password";
            }
            div {
                label { "Confirm new password:" }
                (field_error(v.field_error("new_password_confirmation")))
                input type="password" name="new_password_confirmation";
            }
            div {
                input type="submit" value="Change password";
            }
        }
    }
}
