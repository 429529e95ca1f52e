use crate::views;
use axum::response::Html;

/// `GET /` — landing page and target of every fallback redirect.
///
/// Touches no store, so it keeps rendering while the database is down.
pub async fn home() -> Html<String> {
    views::home()
}
