//! Search and share pages.

use maud::{Markup, html};

use super::{general_error, input, layout, tag_links, textarea};
use crate::domain::post::{Post, SearchHit};
use crate::presentation::dto::{EmailPostForm, FormErrors};

pub struct SearchResults<'a> {
    pub query: &'a str,
    pub hits: &'a [SearchHit],
}

fn result_count(n: usize) -> String {
    match n {
        1 => "Found 1 result".to_string(),
        n => format!("Found {n} results"),
    }
}

/// Results when a query was run, otherwise the search form with any error
/// on the query field.
pub fn search_page(results: Option<&SearchResults<'_>>, errors: &FormErrors) -> Markup {
    let content = html! {
        @match results {
            Some(results) => {
                h1 { "Posts containing \"" (results.query) "\"" }
                h3 { (result_count(results.hits.len())) }
                @for hit in results.hits {
                    article class="post" {
                        h4 { a href=(hit.post.absolute_url()) { (hit.post.title) } }
                        (tag_links(&hit.post.tags))
                    }
                }
                @if results.hits.is_empty() {
                    p { "There are no results for your query." }
                }
                p { a href="/blog/search/" { "Search again" } }
            }
            None => {
                h1 { "Search for posts" }
                form method="get" action="/blog/search/" {
                    (input(errors, "query", "Query", "text", None))
                    p { input type="submit" value="Search"; }
                }
            }
        }
    };
    layout("Search", content)
}

pub struct ShareView<'a> {
    pub post: &'a Post,
    pub form: &'a EmailPostForm,
    pub errors: &'a FormErrors,
    pub sent: bool,
}

pub fn share_page(view: &ShareView<'_>) -> Markup {
    let post = view.post;
    let content = html! {
        @if view.sent {
            h1 { "E-mail successfully sent" }
            p {
                "\"" (post.title) "\" was successfully sent to "
                (view.form.to.as_deref().unwrap_or_default()) "."
            }
            p { a href=(post.absolute_url()) { "Back to the post" } }
        } @else {
            h1 { "Share \"" (post.title) "\" by e-mail" }
            (general_error(view.errors))
            form method="post" action=(post.share_url()) {
                (input(view.errors, "name", "Name", "text", view.form.name.as_deref()))
                (input(view.errors, "email", "Email", "email", view.form.email.as_deref()))
                (input(view.errors, "to", "To", "email", view.form.to.as_deref()))
                (textarea(view.errors, "comments", "Comments", view.form.comments.as_deref()))
                p { input type="submit" value="Send e-mail"; }
            }
        }
    };
    layout("Share a post", content)
}
