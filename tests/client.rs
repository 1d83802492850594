use std::sync::Arc;

use axum::http::StatusCode;
use book_catalog::{
    AppState, BookClient, BookGenre, BookQuery, ClientError, CreateBookRequest, Endpoint,
    SortKey, build_router, db,
    list_view::{Action, ListView, Phase, render_list},
};
use sqlx::SqlitePool;

async fn spawn_server() -> (BookClient, SqlitePool) {
    let pool = db::connect("sqlite::memory:").await.unwrap();
    db::migrate(&pool).await.unwrap();
    let state = Arc::new(AppState { db: pool.clone() });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, build_router(state)).await.unwrap();
    });

    (BookClient::new(format!("http://{addr}/")), pool)
}

fn request(title: &str, author: &str, genre: BookGenre) -> CreateBookRequest {
    CreateBookRequest {
        genre: Some(genre),
        ..CreateBookRequest::new(title, author)
    }
}

#[tokio::test]
async fn base_url_trailing_slash_is_trimmed() {
    let client = BookClient::new("http://localhost:8000///");
    assert_eq!(client.base_url(), "http://localhost:8000");
}

#[tokio::test]
async fn add_book_then_view_includes_it() {
    let (client, _) = spawn_server().await;
    let created = client
        .add_book(&request("Dune", "Frank Herbert", BookGenre::Scifi))
        .await
        .unwrap();
    assert_eq!(created.title, "Dune");
    assert_eq!(created.genre, Some(BookGenre::Scifi));

    let books = client
        .get_books(Endpoint::View, &BookQuery::default())
        .await
        .unwrap();
    assert_eq!(books, vec![created]);
}

#[tokio::test]
async fn empty_filters_are_not_sent() {
    let (client, _) = spawn_server().await;
    client
        .add_book(&request("Dune", "Frank Herbert", BookGenre::Scifi))
        .await
        .unwrap();

    let query = BookQuery {
        author: Some(String::new()),
        ..BookQuery::default()
    };
    let books = client.get_books(Endpoint::View, &query).await.unwrap();
    assert_eq!(books.len(), 1, "an empty author must not filter everything out");
}

#[tokio::test]
async fn sorted_books_follow_sort_key_and_filters() {
    let (client, _) = spawn_server().await;
    for (title, author, genre) in [
        ("The Hobbit", "Tolkien", BookGenre::Fantasy),
        ("Dune", "Herbert", BookGenre::Scifi),
        ("Foundation", "Asimov", BookGenre::Scifi),
    ] {
        client.add_book(&request(title, author, genre)).await.unwrap();
    }

    let books = client
        .get_sorted_books(SortKey::Author, &BookQuery::default())
        .await
        .unwrap();
    let authors: Vec<_> = books.iter().map(|b| b.author.as_str()).collect();
    assert_eq!(authors, vec!["Asimov", "Herbert", "Tolkien"]);

    let filters = BookQuery {
        genre: Some(BookGenre::Scifi),
        ..BookQuery::default()
    };
    let books = client.get_sorted_books(SortKey::Title, &filters).await.unwrap();
    let titles: Vec<_> = books.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, vec!["Dune", "Foundation"]);
}

#[tokio::test]
async fn server_validation_failure_surfaces_as_api_error() {
    let (client, pool) = spawn_server().await;
    let err = client
        .add_book(&CreateBookRequest::new("", "Herbert"))
        .await
        .unwrap_err();

    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(message.starts_with("validation error"), "message: {message}");
        }
        other => panic!("expected api error, got {other:?}"),
    }
    assert_eq!(db::count_books(&pool).await.unwrap(), 0);
}

#[tokio::test]
async fn unreachable_server_is_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = BookClient::new(format!("http://{addr}"));
    let err = client
        .get_books(Endpoint::View, &BookQuery::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Network(_)), "got {err:?}");
}

#[tokio::test]
async fn entries_round_trip_through_legacy_endpoints() {
    let (client, _) = spawn_server().await;
    let res = client.add_entry("Dune").await.unwrap();
    assert_eq!(res.name, "Dune");
    assert_eq!(res.message, "Book added successfully");

    let entries = client.list_entries().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, res.id);
}

#[tokio::test]
async fn list_view_drives_fetches_through_the_client() {
    let (client, _) = spawn_server().await;
    client
        .add_book(&request("Dune", "Frank Herbert", BookGenre::Scifi))
        .await
        .unwrap();
    client
        .add_book(&request("Emma", "Jane Austen", BookGenre::Romance))
        .await
        .unwrap();

    let (mut view, first) = ListView::mount();
    let result = first.fetch(&client).await;
    assert!(view.resolve(first.version, result));
    match view.phase() {
        Phase::Success(books) => assert_eq!(books.len(), 2),
        other => panic!("unexpected phase {other:?}"),
    }

    let stale = view.dispatch(Action::SetAuthor("jane".into())).unwrap();
    let latest = view.dispatch(Action::SetSort(SortKey::Title)).unwrap();

    let latest_result = latest.fetch(&client).await;
    let stale_result = stale.fetch(&client).await;
    assert!(view.resolve(latest.version, latest_result));
    assert!(!view.resolve(stale.version, stale_result), "older ticket must be ignored");

    let rendered = render_list(&view);
    assert!(rendered.starts_with("Emma\nby Jane Austen"), "rendered: {rendered}");
    assert!(!rendered.contains("Dune"));
}

#[tokio::test]
async fn list_view_reports_fetch_failure() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let client = BookClient::new(format!("http://{addr}"));

    let (mut view, ticket) = ListView::mount();
    let result = ticket.fetch(&client).await;
    view.resolve(ticket.version, result);
    assert_eq!(render_list(&view), "Failed to fetch books");
}
