//! Server-rendered HTML pages.
//!
//! Pages are plain `format!` templates wrapped in a shared layout. Every
//! user-supplied value goes through [`escape`].

pub mod books;

use axum::response::Html;

/// Wrap `body` in the site layout.
pub fn page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title} | Book Catalog</title>
    <style>
        body {{ font-family: system-ui, sans-serif; max-width: 900px; margin: 2rem auto; padding: 0 1rem; }}
        nav a {{ margin-right: 1rem; }}
        .error {{ background: #fdecea; color: #8a1c12; padding: 0.75rem; border-radius: 6px; }}
        .grid {{ display: flex; flex-wrap: wrap; gap: 1rem; }}
        .book {{ width: 150px; }}
        .book img {{ width: 150px; height: 225px; object-fit: cover; background: #eee; }}
        label {{ display: block; margin-top: 0.75rem; }}
    </style>
</head>
<body>
    <nav><a href="/">Home</a><a href="/books">Books</a><a href="/books/new">Add Book</a></nav>
    {body}
</body>
</html>"#,
        title = escape(title),
        body = body,
    ))
}

/// Template `index`: the site root.
pub fn home() -> Html<String> {
    page(
        "Home",
        r#"<h1>Book Catalog</h1>
    <p>Browse, search and edit the <a href="/books">catalog</a>.</p>"#,
    )
}

/// Optional error banner.
pub fn error_banner(message: Option<&str>) -> String {
    message
        .map(|m| format!(r#"<div class="error">{}</div>"#, escape(m)))
        .unwrap_or_default()
}

pub fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
