//! SQLite persistence for the `books` table.
//!
//! Every statement is parameterized. Ordering columns come only from the
//! [`SortKey`] allow-list and never from caller text.

use std::{str::FromStr, time::Duration};

use chrono::Utc;
use sqlx::{
    QueryBuilder, Sqlite, SqlitePool,
    migrate::MigrateError,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};

use crate::models::{Book, BookEntry, BookQuery, CreateBookRequest, SortKey, SortOrder, UNKNOWN_AUTHOR};

const BOOK_COLUMNS: &str =
    "id, title, author, genre, publication_year, rating, language, summary, date_added";

/// Open (creating if needed) the database behind `database_url`.
///
/// `sqlite::memory:` gets a single connection that is never recycled, since
/// each in-memory connection is its own database.
///
/// # Errors
/// Returns an error if the URL is malformed or the database cannot be opened.
pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    if database_url.contains(":memory:") {
        return SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await;
    }

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(
            options
                .journal_mode(SqliteJournalMode::Wal)
                .busy_timeout(Duration::from_secs(5)),
        )
        .await
}

/// Apply the embedded migrations.
///
/// # Errors
/// Returns an error if a migration fails to apply.
pub async fn migrate(pool: &SqlitePool) -> Result<(), MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Insert a book, assigning its id and `date_added`.
///
/// # Errors
/// Returns database errors, including CHECK constraint violations.
pub async fn insert_book(pool: &SqlitePool, book: &CreateBookRequest) -> Result<Book, sqlx::Error> {
    let sql = format!(
        "INSERT INTO books (title, author, genre, publication_year, rating, language, summary, date_added)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)
         RETURNING {BOOK_COLUMNS}"
    );
    let book = sqlx::query_as::<_, Book>(&sql)
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.genre)
        .bind(book.publication_year)
        .bind(book.rating)
        .bind(&book.language)
        .bind(&book.summary)
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;

    tracing::debug!(id = book.id, title = %book.title, "book inserted");
    Ok(book)
}

/// Insert a title-only entry; the author is recorded as unknown.
///
/// # Errors
/// Returns database errors.
pub async fn insert_entry(pool: &SqlitePool, name: &str) -> Result<BookEntry, sqlx::Error> {
    let book = insert_book(pool, &CreateBookRequest::new(name, UNKNOWN_AUTHOR).normalized()).await?;
    Ok(BookEntry {
        id: book.id,
        name: book.title,
        created_at: book.date_added,
    })
}

/// List books matching `query`, ordered by its sort key.
///
/// # Errors
/// Returns database errors.
pub async fn list_books(pool: &SqlitePool, query: &BookQuery) -> Result<Vec<Book>, sqlx::Error> {
    let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {BOOK_COLUMNS} FROM books"));

    if let Some(genre) = query.genre {
        qb.push(" WHERE genre = ").push_bind(genre);
    }
    if let Some(author) = query.author.as_deref().filter(|a| !a.is_empty()) {
        qb.push(if query.genre.is_some() { " AND " } else { " WHERE " });
        qb.push("author LIKE ")
            .push_bind(like_pattern(author))
            .push(" ESCAPE '\\'");
    }
    qb.push(" ORDER BY ")
        .push(order_clause(query.sort_by, query.order()));

    qb.build_query_as::<Book>().fetch_all(pool).await
}

/// All books in the minimal `{id, name, created_at}` shape, newest first.
///
/// # Errors
/// Returns database errors.
pub async fn list_entries(pool: &SqlitePool) -> Result<Vec<BookEntry>, sqlx::Error> {
    sqlx::query_as::<_, BookEntry>(
        "SELECT id, title AS name, date_added AS created_at FROM books ORDER BY date_added DESC, id DESC",
    )
    .fetch_all(pool)
    .await
}

/// # Errors
/// Returns database errors.
pub async fn count_books(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM books")
        .fetch_one(pool)
        .await
}

/// # Errors
/// Returns database errors.
pub async fn title_exists(pool: &SqlitePool, title: &str) -> Result<bool, sqlx::Error> {
    let found = sqlx::query_scalar::<_, i64>("SELECT id FROM books WHERE title = ? LIMIT 1")
        .bind(title)
        .fetch_optional(pool)
        .await?;
    Ok(found.is_some())
}

/// Substring pattern for `LIKE ... ESCAPE '\'` with wildcards matched literally.
fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn order_clause(key: SortKey, order: SortOrder) -> String {
    let dir = order.as_sql();
    match key {
        SortKey::DateAdded => format!("date_added {dir}, id {dir}"),
        SortKey::Title => format!("title COLLATE NOCASE {dir}, id {dir}"),
        SortKey::Author => {
            format!("author COLLATE NOCASE {dir}, title COLLATE NOCASE {dir}, id {dir}")
        }
        // NULLs last in either direction.
        SortKey::Rating => format!("rating IS NULL, rating {dir}, id {dir}"),
        SortKey::PublicationYear => {
            format!("publication_year IS NULL, publication_year {dir}, id {dir}")
        }
    }
}
