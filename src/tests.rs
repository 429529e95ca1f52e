use crate::db;
use crate::models::{
    author::Author,
    book::{Book, BookFields, BookFilter},
};
use crate::routes::{method_override::method_override, routes::app};
use crate::services::sqlite_store::SqliteCatalog;
use crate::services::store::{AuthorStore, BookStore, Catalog, StoreError, StoreResult};
use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    middleware,
    response::Response,
};
use chrono::NaiveDate;
use std::{convert::Infallible, sync::Arc};
use tower::{Layer, Service, ServiceExt};
use uuid::Uuid;

const PNG_COVER: &str = r#"{"type":"image/png","data":"iVBORw=="}"#;

struct TestApp {
    router: Router,
    store: SqliteCatalog,
}

async fn test_app() -> TestApp {
    let pool = db::memory_pool().await;
    TestApp {
        router: app(Catalog::sqlite(pool.clone())),
        store: SqliteCatalog::new(pool),
    }
}

async fn send<S>(service: S, req: Request<Body>) -> Response
where
    S: Service<Request<Body>, Response = Response, Error = Infallible>,
{
    service.oneshot(req).await.unwrap()
}

async fn body_text(resp: Response) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(resp: &Response) -> &str {
    resp.headers()[header::LOCATION].to_str().unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn form_request(method: &str, uri: &str, fields: &[(&str, &str)]) -> Request<Body> {
    let body = fields
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

fn dune_fields<'a>(author: &'a str, cover: &'a str) -> Vec<(&'static str, &'a str)> {
    vec![
        ("title", "Dune"),
        ("author", author),
        ("publishDate", "1965-08-01"),
        ("pageCount", "412"),
        ("description", "desert planet"),
        ("cover", cover),
    ]
}

async fn seed_book(store: &SqliteCatalog, author: &Author, title: &str, published: &str) -> Book {
    let book = Book::new(BookFields {
        title: title.into(),
        author_id: author.id,
        publish_date: NaiveDate::parse_from_str(published, "%Y-%m-%d").unwrap(),
        page_count: 100,
        description: String::new(),
    });
    store.insert_book(&book).await.unwrap()
}

async fn all_books(store: &SqliteCatalog) -> Vec<Book> {
    store.find_books(&BookFilter::default()).await.unwrap()
}

/// Delegates to SQLite but refuses every delete.
struct FailingDeletes(SqliteCatalog);

#[async_trait]
impl BookStore for FailingDeletes {
    async fn find_books(&self, filter: &BookFilter) -> StoreResult<Vec<Book>> {
        self.0.find_books(filter).await
    }

    async fn fetch_book(&self, id: Uuid) -> StoreResult<Book> {
        self.0.fetch_book(id).await
    }

    async fn insert_book(&self, book: &Book) -> StoreResult<Book> {
        self.0.insert_book(book).await
    }

    async fn update_book(&self, book: &Book) -> StoreResult<Book> {
        self.0.update_book(book).await
    }

    async fn delete_book(&self, _id: Uuid) -> StoreResult<()> {
        Err(StoreError::Sqlx(sqlx::Error::PoolTimedOut))
    }

    async fn ping(&self) -> StoreResult<()> {
        self.0.ping().await
    }
}

#[tokio::test]
async fn home_and_health_endpoints() {
    let t = test_app().await;

    let resp = send(t.router.clone(), get("/")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("Book Catalog"));

    let resp = send(t.router.clone(), get("/healthz")).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = send(t.router.clone(), get("/readyz")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body_text(resp).await).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["checks"]["sqlite"]["ok"], true);
}

#[tokio::test]
async fn readyz_reports_closed_database() {
    let t = test_app().await;
    t.store.db.close().await;

    let resp = send(t.router.clone(), get("/readyz")).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn create_redirects_to_new_book() {
    let t = test_app().await;
    let author = t.store.insert_author("Frank Herbert").await.unwrap();
    let author_id = author.id.to_string();

    let resp = send(
        t.router.clone(),
        form_request("POST", "/books", &dune_fields(&author_id, "")),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let books = all_books(&t.store).await;
    assert_eq!(books.len(), 1);
    let book = &books[0];
    assert_eq!(location(&resp), format!("/books/{}", book.id));
    assert_eq!(book.title, "Dune");
    assert_eq!(book.author_id, author.id);
    assert_eq!(book.publish_date, NaiveDate::from_ymd_opt(1965, 8, 1).unwrap());
    assert_eq!(book.page_count, 412);
    assert_eq!(book.description, "desert planet");
    assert!(book.cover_image.is_none());
    assert!(book.cover_image_type.is_none());

    let resp = send(t.router.clone(), get(&format!("/books/{}", book.id))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains("Dune"));
    assert!(html.contains("Frank Herbert"));
}

#[tokio::test]
async fn create_attaches_allowed_cover() {
    let t = test_app().await;
    let author = t.store.insert_author("Frank Herbert").await.unwrap().id.to_string();

    let resp = send(
        t.router.clone(),
        form_request("POST", "/books", &dune_fields(&author, PNG_COVER)),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let books = all_books(&t.store).await;
    let book = &books[0];
    assert_eq!(book.cover_image.as_deref(), Some(&[0x89, b'P', b'N', b'G'][..]));
    assert_eq!(book.cover_image_type.as_deref(), Some("image/png"));
}

#[tokio::test]
async fn create_with_unlisted_cover_type_saves_without_cover() {
    let t = test_app().await;
    let author = t.store.insert_author("Frank Herbert").await.unwrap().id.to_string();
    let gif = r#"{"type":"image/gif","data":"R0lGODlh"}"#;

    let resp = send(
        t.router.clone(),
        form_request("POST", "/books", &dune_fields(&author, gif)),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let books = all_books(&t.store).await;
    assert_eq!(books.len(), 1);
    assert!(books[0].cover_image.is_none());
    assert!(books[0].cover_image_type.is_none());
}

#[tokio::test]
async fn create_with_untyped_cover_saves_without_cover() {
    let t = test_app().await;
    let author = t.store.insert_author("Frank Herbert").await.unwrap().id.to_string();

    let covers = [r#"{"type":"text/plain"}"#, r#"{"data":"aGk="}"#, r#"{"type":5,"data":"aGk="}"#, "42"];
    for cover in covers {
        let resp = send(
            t.router.clone(),
            form_request("POST", "/books", &dune_fields(&author, cover)),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "cover {cover}");
    }

    let books = all_books(&t.store).await;
    assert_eq!(books.len(), covers.len());
    assert!(books.iter().all(|b| b.cover_image.is_none() && b.cover_image_type.is_none()));
}

#[tokio::test]
async fn create_with_allowed_type_but_no_data_rerenders_form() {
    let t = test_app().await;
    let author = t.store.insert_author("Frank Herbert").await.unwrap().id.to_string();

    let resp = send(
        t.router.clone(),
        form_request("POST", "/books", &dune_fields(&author, r#"{"type":"image/png"}"#)),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("Error Creating Book"));
    assert!(all_books(&t.store).await.is_empty());
}

#[tokio::test]
async fn create_with_malformed_cover_rerenders_form() {
    let t = test_app().await;
    let author = t.store.insert_author("Frank Herbert").await.unwrap().id.to_string();

    let resp = send(
        t.router.clone(),
        form_request("POST", "/books", &dune_fields(&author, "{oops")),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains("Error Creating Book"));
    assert!(html.contains(r#"value="Dune""#));
    assert!(all_books(&t.store).await.is_empty());
}

#[tokio::test]
async fn create_with_invalid_fields_rerenders_form() {
    let t = test_app().await;
    t.store.insert_author("Frank Herbert").await.unwrap();

    let resp = send(
        t.router.clone(),
        form_request("POST", "/books", &dune_fields("not-an-id", "")),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("Error Creating Book"));
    assert!(all_books(&t.store).await.is_empty());
}

#[tokio::test]
async fn list_applies_filters_and_echoes_search() {
    let t = test_app().await;
    let author = t.store.insert_author("Anon").await.unwrap();
    seed_book(&t.store, &author, "The Hobbit", "1937-09-21").await;
    seed_book(&t.store, &author, "Dune", "1965-08-01").await;

    let resp = send(t.router.clone(), get("/books")).await;
    let html = body_text(resp).await;
    assert!(html.contains("The Hobbit") && html.contains("Dune"));

    let resp = send(t.router.clone(), get("/books?title=HOB&publishedBefore=&publishedAfter=")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains("The Hobbit"));
    assert!(!html.contains(">Dune<"));
    assert!(html.contains(r#"name="title" value="HOB""#));

    let resp = send(t.router.clone(), get("/books?publishedAfter=1965-08-01")).await;
    let html = body_text(resp).await;
    assert!(html.contains(">Dune<"));
    assert!(!html.contains("The Hobbit"));
}

#[tokio::test]
async fn list_rejects_malformed_dates() {
    let t = test_app().await;

    let resp = send(t.router.clone(), get("/books?publishedBefore=soon")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = serde_json::from_str(&body_text(resp).await).unwrap();
    assert_eq!(body["status"], 400);
    assert!(body["error"].as_str().unwrap().contains("publishedBefore"));
}

#[tokio::test]
async fn list_failure_redirects_to_root() {
    let t = test_app().await;
    t.store.db.close().await;

    let resp = send(t.router.clone(), get("/books")).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");
}

#[tokio::test]
async fn form_pages_list_authors_or_fall_back() {
    let t = test_app().await;
    let author = t.store.insert_author("Ursula K. Le Guin").await.unwrap();
    let book = seed_book(&t.store, &author, "The Dispossessed", "1974-05-01").await;

    let resp = send(t.router.clone(), get("/books/new")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("Ursula K. Le Guin"));

    let resp = send(t.router.clone(), get(&format!("/books/{}/edit", book.id))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains(r#"value="The Dispossessed""#));
    assert!(html.contains(r#"value="1974-05-01""#));

    let resp = send(t.router.clone(), get(&format!("/books/{}/edit", Uuid::new_v4()))).await;
    assert_eq!(location(&resp), "/");

    t.store.db.close().await;
    let resp = send(t.router.clone(), get("/books/new")).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/books");
}

#[tokio::test]
async fn show_redirects_home_when_book_or_author_missing() {
    let t = test_app().await;

    for uri in ["/books/not-a-uuid".to_string(), format!("/books/{}", Uuid::new_v4())] {
        let resp = send(t.router.clone(), get(&uri)).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), "/");
    }

    let orphan_author = Author {
        id: Uuid::new_v4(),
        name: "Nobody".into(),
        created_at: chrono::Utc::now(),
    };
    let orphan = seed_book(&t.store, &orphan_author, "Orphan", "2001-01-01").await;
    let resp = send(t.router.clone(), get(&format!("/books/{}", orphan.id))).await;
    assert_eq!(location(&resp), "/");
}

#[tokio::test]
async fn update_missing_book_redirects_home() {
    let t = test_app().await;
    let author = t.store.insert_author("Frank Herbert").await.unwrap().id.to_string();

    let uri = format!("/books/{}", Uuid::new_v4());
    let resp = send(t.router.clone(), form_request("PUT", &uri, &dune_fields(&author, ""))).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");
    assert!(all_books(&t.store).await.is_empty());
}

#[tokio::test]
async fn update_overwrites_fields_and_keeps_cover_without_payload() {
    let t = test_app().await;
    let herbert = t.store.insert_author("Frank Herbert").await.unwrap();
    let asimov = t.store.insert_author("Isaac Asimov").await.unwrap();
    let mut book = seed_book(&t.store, &herbert, "Dune", "1965-08-01").await;
    book.set_cover(vec![1, 2, 3], "image/jpeg");
    t.store.update_book(&book).await.unwrap();

    let asimov_id = asimov.id.to_string();
    let fields = [
        ("title", "Foundation"),
        ("author", asimov_id.as_str()),
        ("publishDate", "1951-06-01"),
        ("pageCount", "255"),
        ("description", ""),
        ("cover", ""),
    ];
    let uri = format!("/books/{}", book.id);
    let resp = send(t.router.clone(), form_request("PUT", &uri, &fields)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), uri);

    let stored = t.store.fetch_book(book.id).await.unwrap();
    assert_eq!(stored.title, "Foundation");
    assert_eq!(stored.author_id, asimov.id);
    assert_eq!(stored.page_count, 255);
    assert_eq!(stored.description, "");
    assert_eq!(stored.cover_image.as_deref(), Some(&[1u8, 2, 3][..]));
    assert_eq!(stored.cover_image_type.as_deref(), Some("image/jpeg"));
}

#[tokio::test]
async fn update_replaces_cover_and_rerenders_on_bad_input() {
    let t = test_app().await;
    let author = t.store.insert_author("Frank Herbert").await.unwrap();
    let author_id = author.id.to_string();
    let book = seed_book(&t.store, &author, "Dune", "1965-08-01").await;
    let uri = format!("/books/{}", book.id);

    let resp = send(
        t.router.clone(),
        form_request("PUT", &uri, &dune_fields(&author_id, PNG_COVER)),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let stored = t.store.fetch_book(book.id).await.unwrap();
    assert_eq!(stored.cover_image_type.as_deref(), Some("image/png"));

    let mut bad = dune_fields(&author_id, "");
    bad[3] = ("pageCount", "lots");
    let resp = send(t.router.clone(), form_request("PUT", &uri, &bad)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains("Error Updating Book"));
    assert!(html.contains(r#"value="lots""#));
    assert_eq!(t.store.fetch_book(book.id).await.unwrap().page_count, 412);
}

#[tokio::test]
async fn update_with_malformed_cover_leaves_book_unchanged() {
    let t = test_app().await;
    let author = t.store.insert_author("Frank Herbert").await.unwrap();
    let author_id = author.id.to_string();
    let book = seed_book(&t.store, &author, "Dune Messiah", "1969-10-15").await;
    let uri = format!("/books/{}", book.id);

    let resp = send(
        t.router.clone(),
        form_request("PUT", &uri, &dune_fields(&author_id, "{oops")),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains("Error Updating Book"));
    assert!(html.contains(r#"value="Dune""#));

    let stored = t.store.fetch_book(book.id).await.unwrap();
    assert_eq!(stored.title, "Dune Messiah");
    assert_eq!(stored.page_count, 100);
    assert_eq!(stored.publish_date, NaiveDate::from_ymd_opt(1969, 10, 15).unwrap());
    assert!(stored.cover_image.is_none());
    assert!(stored.cover_image_type.is_none());
}

#[tokio::test]
async fn delete_through_method_override_removes_book() {
    let t = test_app().await;
    let author = t.store.insert_author("Anon").await.unwrap();
    let doomed = seed_book(&t.store, &author, "Doomed", "2000-01-01").await;
    seed_book(&t.store, &author, "Survivor", "2000-01-01").await;

    let service = middleware::from_fn(method_override).layer(t.router.clone());
    let req = Request::builder()
        .method("POST")
        .uri(format!("/books/{}?_method=DELETE", doomed.id))
        .body(Body::empty())
        .unwrap();
    let resp = send(service, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/books");

    let html = body_text(send(t.router.clone(), get("/books")).await).await;
    assert!(!html.contains("Doomed"));
    assert!(html.contains("Survivor"));

    let again = Request::builder()
        .method("DELETE")
        .uri(format!("/books/{}", doomed.id))
        .body(Body::empty())
        .unwrap();
    let resp = send(t.router.clone(), again).await;
    assert_eq!(location(&resp), "/");
}

#[tokio::test]
async fn failed_delete_renders_detail_with_error() {
    let t = test_app().await;
    let author = t.store.insert_author("Frank Herbert").await.unwrap();
    let book = seed_book(&t.store, &author, "Dune", "1965-08-01").await;

    let catalog = Catalog::new(
        Arc::new(FailingDeletes(t.store.clone())),
        Arc::new(t.store.clone()),
    );
    let req = Request::builder()
        .method("DELETE")
        .uri(format!("/books/{}", book.id))
        .body(Body::empty())
        .unwrap();
    let resp = send(app(catalog), req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains("Could not remove book"));
    assert!(html.contains("Frank Herbert"));
    assert_eq!(all_books(&t.store).await.len(), 1);
}
