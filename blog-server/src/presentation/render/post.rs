//! Post list and post detail pages.

use maud::{Markup, PreEscaped, html};
use pulldown_cmark::{Options, Parser, html as md_html};

use super::{input, layout, pagination, tag_links, textarea};
use crate::application::post_service::PostList;
use crate::domain::comment::Comment;
use crate::domain::post::{Post, SimilarPost};
use crate::presentation::dto::{CommentForm, FormErrors};

const SUMMARY_WORDS: usize = 30;

/// Render author-written Markdown to HTML.
pub fn markdown(source: &str) -> Markup {
    let parser = Parser::new_ext(source, Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH);
    let mut out = String::with_capacity(source.len() * 3 / 2);
    md_html::push_html(&mut out, parser);
    PreEscaped(out)
}

/// First `limit` words of a text, with an ellipsis when something was cut.
pub fn truncate_words(text: &str, limit: usize) -> String {
    let mut words = text.split_whitespace();
    let kept: Vec<&str> = words.by_ref().take(limit).collect();
    let mut out = kept.join(" ");
    if words.next().is_some() {
        out.push_str(" …");
    }
    out
}

fn byline(post: &Post) -> Markup {
    html! {
        p class="date" {
            "Published " (post.publish.format("%b %-d, %Y")) " by " (post.author_name)
        }
    }
}

pub fn list_page(list: &PostList) -> Markup {
    let base_path = list
        .tag
        .as_ref()
        .map(|t| t.url())
        .unwrap_or_else(|| "/blog/".to_string());

    let content = html! {
        h1 { "My Blog" }
        @if let Some(tag) = &list.tag {
            h2 { "Posts tagged with \"" (tag.name) "\"" }
        }
        @if list.page.items.is_empty() {
            p { "There are no posts yet." }
        }
        @for post in &list.page.items {
            article class="post" {
                h2 { a href=(post.absolute_url()) { (post.title) } }
                (tag_links(&post.tags))
                (byline(post))
                p { (truncate_words(&post.body, SUMMARY_WORDS)) }
            }
        }
        (pagination(&list.page, &base_path))
    };

    let title = match &list.tag {
        Some(tag) => format!("Posts tagged {}", tag.name),
        None => "My Blog".to_string(),
    };
    layout(&title, content)
}

pub struct DetailView<'a> {
    pub post: &'a Post,
    pub comments: &'a [Comment],
    pub similar: &'a [SimilarPost],
    pub new_comment: Option<&'a Comment>,
    pub form: &'a CommentForm,
    pub errors: &'a FormErrors,
}

fn comment_count(n: usize) -> String {
    if n == 1 {
        "1 comment".to_string()
    } else {
        format!("{n} comments")
    }
}

pub fn detail_page(view: &DetailView<'_>) -> Markup {
    let post = view.post;
    let content = html! {
        article {
            h1 { (post.title) }
            (byline(post))
            (tag_links(&post.tags))
            div class="body" { (markdown(&post.body)) }
            p { a href=(post.share_url()) { "Share this post" } }
        }

        section class="similar" {
            h2 { "Similar posts" }
            @if view.similar.is_empty() {
                p { "There are no similar posts yet." }
            } @else {
                ul {
                    @for similar in view.similar {
                        li { a href=(similar.post.absolute_url()) { (similar.post.title) } }
                    }
                }
            }
        }

        section class="comments" {
            h2 { (comment_count(view.comments.len())) }
            @for (i, comment) in view.comments.iter().enumerate() {
                div class="comment" {
                    p class="info" {
                        "Comment " (i + 1) " by " (comment.name) " "
                        (comment.created_at.format("%b %-d, %Y %H:%M"))
                    }
                    p { (comment.body) }
                }
            }
            @if view.comments.is_empty() {
                p { "There are no comments yet." }
            }

            @if view.new_comment.is_some() {
                p class="notice" { "Your comment has been added." }
            } @else {
                h2 { "Add a new comment" }
                form method="post" action=(post.absolute_url()) {
                    (input(view.errors, "name", "Name", "text", view.form.name.as_deref()))
                    (input(view.errors, "email", "Email", "email", view.form.email.as_deref()))
                    (textarea(view.errors, "body", "Body", view.form.body.as_deref()))
                    p { input type="submit" value="Add comment"; }
                }
            }
        }
    };

    layout(&post.title, content)
}
