//! HTTP catalog client against a local stub API.

use axum::Router;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::get;
use storefront::catalog::bundled_books;
use storefront::{BookId, CatalogClient, CatalogError, HttpCatalogClient};

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn healthy_api() -> Router {
    Router::new()
        .route(
            "/api/books",
            get(|| async { axum::Json(bundled_books()) }),
        )
        .route(
            "/api/books/{id}",
            get(|Path(id): Path<i64>| async move {
                bundled_books()
                    .into_iter()
                    .find(|b| b.id == BookId::new(id))
                    .map(axum::Json)
                    .ok_or((
                        StatusCode::NOT_FOUND,
                        axum::Json(serde_json::json!({"message": "Book not found"})),
                    ))
            }),
        )
}

#[tokio::test]
async fn lists_books_from_api() {
    let base = serve(healthy_api()).await;
    let client = HttpCatalogClient::new(base);

    let books = client.list_books().await.unwrap();

    assert_eq!(books.len(), 15);
    assert_eq!(books[0].title, "The Great Gatsby");
}

#[tokio::test]
async fn fetches_single_book() {
    let base = serve(healthy_api()).await;
    let client = HttpCatalogClient::new(format!("{base}/"));

    let book = client.get_book(BookId::new(7)).await.unwrap();

    assert_eq!(book.title, "Sapiens");
}

#[tokio::test]
async fn missing_book_maps_to_not_found() {
    let base = serve(healthy_api()).await;
    let client = HttpCatalogClient::new(base);

    let err = client.get_book(BookId::new(404)).await.unwrap_err();

    assert!(matches!(err, CatalogError::NotFound(_)));
}

#[tokio::test]
async fn error_body_message_is_surfaced() {
    let app = Router::new().route(
        "/api/books",
        get(|| async {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                axum::Json(serde_json::json!({"message": "Catalog offline"})),
            )
        }),
    );
    let base = serve(app).await;
    let client = HttpCatalogClient::new(base);

    let err = client.list_books().await.unwrap_err();

    match err {
        CatalogError::Api { status, message } => {
            assert_eq!(status, 503);
            assert_eq!(message, "Catalog offline");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn unparseable_error_body_uses_fallback_message() {
    let app = Router::new().route(
        "/api/books",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let base = serve(app).await;
    let client = HttpCatalogClient::new(base);

    let err = client.list_books().await.unwrap_err();

    assert_eq!(err.to_string(), "Failed to fetch books");
}

#[tokio::test]
async fn unreachable_api_is_a_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let client = HttpCatalogClient::new(format!("http://{addr}"));

    let err = client.list_books().await.unwrap_err();

    assert!(matches!(err, CatalogError::Transport(_)));
}
