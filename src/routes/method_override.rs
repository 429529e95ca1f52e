//! `_method` override for HTML forms.
//!
//! Forms can only submit GET and POST, so the edit and delete forms post to
//! `/books/{id}?_method=PUT` and `?_method=DELETE`. This middleware must wrap
//! the router (not be added with `Router::layer`) because the method has to be
//! rewritten before routing happens.

use axum::{
    extract::Request,
    http::Method,
    middleware::Next,
    response::Response,
};

pub async fn method_override(mut req: Request, next: Next) -> Response {
    if req.method() == Method::POST {
        if let Some(method) = override_from_query(req.uri().query()) {
            tracing::debug!(method = method.as_str(), path = req.uri().path(), "overriding POST");
            *req.method_mut() = method;
        }
    }
    next.run(req).await
}

fn override_from_query(query: Option<&str>) -> Option<Method> {
    let value = query?
        .split('&')
        .find_map(|pair| pair.strip_prefix("_method="))?;

    if value.eq_ignore_ascii_case("PUT") {
        Some(Method::PUT)
    } else if value.eq_ignore_ascii_case("DELETE") {
        Some(Method::DELETE)
    } else {
        None
    }
}
