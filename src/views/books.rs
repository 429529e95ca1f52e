//! Templates `books/index`, `books/new`, `books/edit` and `books/show`.

use super::{error_banner, escape, page};
use crate::models::{
    author::Author,
    book::Book,
    forms::{BookDraft, ListBooksQuery},
};
use axum::response::Html;

/// Which of the two book forms is being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    New,
    Edit,
}

impl FormKind {
    pub fn template(self) -> &'static str {
        match self {
            FormKind::New => "books/new",
            FormKind::Edit => "books/edit",
        }
    }

    pub fn error_message(self) -> &'static str {
        match self {
            FormKind::New => "Error Creating Book",
            FormKind::Edit => "Error Updating Book",
        }
    }
}

/// `books/index`: search form plus one tile per book.
pub fn index(books: &[Book], search: &ListBooksQuery) -> Html<String> {
    let value = |v: &Option<String>| escape(v.as_deref().unwrap_or(""));

    let tiles = books
        .iter()
        .map(|book| {
            format!(
                r#"<div class="book"><a href="/books/{id}">{cover}<div>{title}</div></a></div>"#,
                id = book.id,
                cover = cover_img(book),
                title = escape(&book.title),
            )
        })
        .collect::<String>();

    let body = format!(
        r#"<h1>Search Books</h1>
    <form action="/books" method="GET">
        <label>Title <input type="text" name="title" value="{title}"></label>
        <label>Published After <input type="date" name="publishedAfter" value="{after}"></label>
        <label>Published Before <input type="date" name="publishedBefore" value="{before}"></label>
        <button type="submit">Search</button>
    </form>
    <div class="grid">{tiles}</div>"#,
        title = value(&search.title),
        after = value(&search.published_after),
        before = value(&search.published_before),
        tiles = tiles,
    );

    page("Books", &body)
}

/// `books/new` and `books/edit`.
pub fn form(
    kind: FormKind,
    authors: &[Author],
    draft: &BookDraft,
    error: Option<&str>,
) -> Html<String> {
    let (heading, action, submit) = match (kind, draft.id) {
        (FormKind::Edit, Some(id)) => (
            "Edit Book",
            format!("/books/{}?_method=PUT", id),
            "Update",
        ),
        _ => ("New Book", "/books".to_string(), "Create"),
    };

    let options = authors
        .iter()
        .map(|author| {
            let id = author.id.to_string();
            let selected = if id == draft.author_id { " selected" } else { "" };
            format!(
                r#"<option value="{id}"{selected}>{name}</option>"#,
                id = id,
                selected = selected,
                name = escape(&author.name),
            )
        })
        .collect::<String>();

    let current_cover = draft
        .cover_image_path
        .as_deref()
        .map(|src| format!(r#"<img src="{}" alt="Current cover" width="100">"#, src))
        .unwrap_or_default();

    let body = format!(
        r#"<h1>{heading}</h1>
    {error}
    <form action="{action}" method="POST">
        <label>Title <input type="text" name="title" value="{title}" required></label>
        <label>Author <select name="author">{options}</select></label>
        <label>Publish Date <input type="date" name="publishDate" value="{publish_date}" required></label>
        <label>Page Count <input type="number" name="pageCount" min="1" value="{page_count}" required></label>
        <label>Cover {current_cover} <input type="file" accept="image/jpeg,image/png" data-cover-for="cover"></label>
        <input type="hidden" name="cover" id="cover">
        <label>Description <textarea name="description">{description}</textarea></label>
        <a href="{cancel}">Cancel</a>
        <button type="submit">{submit}</button>
    </form>
    <script>{script}</script>"#,
        heading = heading,
        error = error_banner(error),
        action = action,
        title = escape(&draft.title),
        options = options,
        publish_date = escape(&draft.publish_date),
        page_count = escape(&draft.page_count),
        current_cover = current_cover,
        description = escape(&draft.description),
        cancel = draft
            .id
            .map(|id| format!("/books/{}", id))
            .unwrap_or_else(|| "/books".into()),
        submit = submit,
        script = COVER_SCRIPT,
    );

    page(heading, &body)
}

/// `books/show`: details plus edit/delete actions.
pub fn show(book: &Book, author: Option<&Author>, error: Option<&str>) -> Html<String> {
    let author_line = author
        .map(|a| format!("<p>Author: {}</p>", escape(&a.name)))
        .unwrap_or_default();

    let body = format!(
        r#"<h1>{title}</h1>
    {error}
    <div class="book">{cover}</div>
    {author_line}
    <p>Publish Date: {publish_date}</p>
    <p>Page Count: {page_count}</p>
    <p>Description: {description}</p>
    <a href="/books/{id}/edit">Edit</a>
    <form action="/books/{id}?_method=DELETE" method="POST">
        <button type="submit">Delete</button>
    </form>"#,
        title = escape(&book.title),
        error = error_banner(error),
        cover = cover_img(book),
        author_line = author_line,
        publish_date = book.publish_date.format("%Y-%m-%d"),
        page_count = book.page_count,
        description = escape(&book.description),
        id = book.id,
    );

    page(&book.title, &body)
}

fn cover_img(book: &Book) -> String {
    book.cover_image_path()
        .map(|src| format!(r#"<img src="{}" alt="Cover of {}">"#, src, escape(&book.title)))
        .unwrap_or_default()
}

/// Reads the picked file and stores `{"type", "data"}` in the hidden `cover` field.
const COVER_SCRIPT: &str = r#"
document.querySelectorAll('[data-cover-for]').forEach(function (input) {
  input.addEventListener('change', function () {
    var file = input.files[0];
    var target = document.getElementById(input.dataset.coverFor);
    if (!file) { target.value = ''; return; }
    var reader = new FileReader();
    reader.onload = function () {
      var data = String(reader.result).split(',')[1] || '';
      target.value = JSON.stringify({ type: file.type, data: data });
    };
    reader.readAsDataURL(file);
  });
});"#;
