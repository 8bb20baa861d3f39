//! HTML pages.
//!
//! Everything is rendered with [maud](https://maud.lambda.xyz/), so dynamic
//! content is escaped by default. The only pre-escaped content is the post
//! body, produced from Markdown written by the blog's authors.

pub mod forms;
pub mod post;

use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::domain::pagination::Page;
use crate::domain::tag::Tag;
use crate::presentation::dto::FormErrors;

pub const SITE_NAME: &str = "My Blog";

const PAGE_CSS: &str = r#"
*{box-sizing:border-box}
body{margin:0;font-family:-apple-system,BlinkMacSystemFont,"Segoe UI",Roboto,sans-serif;color:#222;background:#fafafa;line-height:1.6}
header{background:#12355b;padding:1rem 2rem}
header a{color:#fff;font-weight:700;font-size:1.4rem;text-decoration:none}
header nav{float:right}
header nav a{font-size:1rem;font-weight:400;margin-left:1rem}
main{max-width:760px;margin:2rem auto;padding:0 1rem}
a{color:#0b6bcb}
.date,.tags{color:#777;font-size:.9rem}
.post{margin-bottom:2rem}
.pagination{margin:2rem 0;color:#555}
.pagination a{margin:0 .5rem}
.comment{border-top:1px solid #e5e5e5;padding:.75rem 0}
.info{color:#777;font-size:.85rem}
form p{margin:.75rem 0}
label{display:block;font-weight:600}
input[type=text],input[type=email],textarea{width:100%;padding:.4rem;border:1px solid #ccc;border-radius:4px}
.errorlist{color:#b00020;margin:.25rem 0;padding:0;list-style:none}
.notice{background:#e7f6ec;padding:.75rem 1rem;border-radius:4px}
.error-page{text-align:center}
"#;

/// Full page shell with the site header.
pub fn layout(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) " | " (SITE_NAME) }
                style { (PreEscaped(PAGE_CSS)) }
            }
            body {
                header {
                    a href="/blog/" { (SITE_NAME) }
                    nav {
                        a href="/blog/search/" { "Search" }
                    }
                }
                main { (content) }
            }
        }
    }
}

pub fn error_page(title: &str, message: &str) -> Markup {
    layout(
        title,
        html! {
            div class="error-page" {
                h1 { (title) }
                p { (message) }
                a href="/blog/" { "Back to the blog" }
            }
        },
    )
}

/// "Previous / Page N of M / Next" links; `base_path` is the listing URL.
pub fn pagination<T>(page: &Page<T>, base_path: &str) -> Markup {
    html! {
        div class="pagination" {
            @if let Some(previous) = page.previous_page_number() {
                a href={ (base_path) "?page=" (previous) } { "Previous" }
            }
            span class="current" { "Page " (page.number) " of " (page.num_pages) "." }
            @if let Some(next) = page.next_page_number() {
                a href={ (base_path) "?page=" (next) } { "Next" }
            }
        }
    }
}

pub fn tag_links(tags: &[Tag]) -> Markup {
    html! {
        @if !tags.is_empty() {
            p class="tags" {
                "Tags: "
                @for (i, tag) in tags.iter().enumerate() {
                    @if i > 0 { ", " }
                    a href=(tag.url()) { (tag.name) }
                }
            }
        }
    }
}

fn field_error(errors: &FormErrors, name: &str) -> Markup {
    html! {
        @if let Some(message) = errors.field(name) {
            ul class="errorlist" { li { (message) } }
        }
    }
}

/// A labelled `<input>` with its error message and submitted value.
pub fn input(
    errors: &FormErrors,
    name: &str,
    label: &str,
    kind: &str,
    value: Option<&str>,
) -> Markup {
    html! {
        p {
            label for={ "id_" (name) } { (label) }
            (field_error(errors, name))
            input type=(kind) name=(name) id={ "id_" (name) } value=[value];
        }
    }
}

pub fn textarea(errors: &FormErrors, name: &str, label: &str, value: Option<&str>) -> Markup {
    html! {
        p {
            label for={ "id_" (name) } { (label) }
            (field_error(errors, name))
            textarea name=(name) id={ "id_" (name) } rows="6" { (value.unwrap_or_default()) }
        }
    }
}

pub fn general_error(errors: &FormErrors) -> Markup {
    html! {
        @if let Some(message) = errors.general_message() {
            ul class="errorlist" { li { (message) } }
        }
    }
}
