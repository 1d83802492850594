//! Typed HTTP client for the catalog service.
//!
//! Each call issues exactly one request. Nothing is retried; failures are
//! logged once and handed back to the caller.

use reqwest::Response;
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    errors::{ClientError, ClientResult, ErrorBody},
    models::{AddEntryRequest, AddEntryResponse, Book, BookEntry, BookQuery, CreateBookRequest, SortKey},
};

/// Which list endpoint a query is sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// `/books/view`: newest first, filters only.
    View,
    /// `/books/sort`: filters plus `sort_by`.
    Sort,
}

impl Endpoint {
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::View => "/books/view",
            Endpoint::Sort => "/books/sort",
        }
    }
}

#[derive(Debug, Clone)]
pub struct BookClient {
    http: reqwest::Client,
    base_url: String,
}

impl BookClient {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    #[must_use]
    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch a book list from `endpoint`. Empty filters are left out of the query string.
    ///
    /// # Errors
    /// Returns [`ClientError::Network`] on transport or decode failure and
    /// [`ClientError::Api`] on a non-success status.
    pub async fn get_books(&self, endpoint: Endpoint, query: &BookQuery) -> ClientResult<Vec<Book>> {
        let pairs = query.query_pairs(endpoint == Endpoint::Sort);
        self.get(endpoint.path(), &pairs).await
    }

    /// Fetch books from the sort endpoint with `sort_by` always set.
    ///
    /// # Errors
    /// See [`BookClient::get_books`].
    pub async fn get_sorted_books(&self, sort_by: SortKey, filters: &BookQuery) -> ClientResult<Vec<Book>> {
        let query = BookQuery {
            sort_by,
            ..filters.clone()
        };
        self.get_books(Endpoint::Sort, &query).await
    }

    /// # Errors
    /// See [`BookClient::get_books`].
    pub async fn add_book(&self, book: &CreateBookRequest) -> ClientResult<Book> {
        self.post("/books/add", book).await
    }

    /// # Errors
    /// See [`BookClient::get_books`].
    pub async fn list_entries(&self) -> ClientResult<Vec<BookEntry>> {
        self.get("/books", &[] as &[(&str, String)]).await
    }

    /// # Errors
    /// See [`BookClient::get_books`].
    pub async fn add_entry(&self, name: &str) -> ClientResult<AddEntryResponse> {
        let body = AddEntryRequest {
            book_name: Some(name.to_string()),
        };
        self.post("/add", &body).await
    }

    async fn get<T, Q>(&self, path: &str, query: &Q) -> ClientResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let url = format!("{}{path}", self.base_url);
        let result: ClientResult<T> = async {
            let res = self.http.get(&url).query(query).send().await?;
            Self::decode(res).await
        }
        .await;
        log_failure("GET", &url, result)
    }

    async fn post<T, B>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = format!("{}{path}", self.base_url);
        let result: ClientResult<T> = async {
            let res = self.http.post(&url).json(body).send().await?;
            Self::decode(res).await
        }
        .await;
        log_failure("POST", &url, result)
    }

    async fn decode<T: DeserializeOwned>(res: Response) -> ClientResult<T> {
        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|body| body.error)
                .unwrap_or(text);
            return Err(ClientError::Api { status, message });
        }
        Ok(res.json::<T>().await?)
    }
}

fn log_failure<T>(method: &str, url: &str, result: ClientResult<T>) -> ClientResult<T> {
    if let Err(e) = &result {
        tracing::warn!(%method, %url, error = %e, "catalog request failed");
    }
    result
}
