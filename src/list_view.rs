//! Headless book list: filter/sort state, the fetch state machine, and text rendering.
//!
//! State changes go through [`reduce`], a pure function. [`ListView`] turns each
//! change into a versioned [`Ticket`]; a response is applied only if its ticket
//! is still the latest one, so a slow stale fetch can never overwrite newer results.

use crate::{
    client::{BookClient, Endpoint},
    errors::ClientResult,
    models::{Book, BookGenre, BookQuery, SortKey},
};

pub const FETCH_ERROR: &str = "Failed to fetch books";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub genre: Option<BookGenre>,
    pub author: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListState {
    pub filters: Filters,
    pub sort_by: SortKey,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SetGenre(Option<BookGenre>),
    SetAuthor(String),
    SetSort(SortKey),
    /// Resets genre and author; the sort key is kept.
    ClearFilters,
}

#[must_use]
pub fn reduce(state: &ListState, action: Action) -> ListState {
    match action {
        Action::SetGenre(genre) => ListState {
            filters: Filters {
                genre,
                ..state.filters.clone()
            },
            ..state.clone()
        },
        Action::SetAuthor(author) => ListState {
            filters: Filters {
                author,
                ..state.filters.clone()
            },
            ..state.clone()
        },
        Action::SetSort(sort_by) => ListState {
            sort_by,
            ..state.clone()
        },
        Action::ClearFilters => ListState {
            filters: Filters::default(),
            ..state.clone()
        },
    }
}

/// The single HTTP call a [`ListState`] maps to.
#[derive(Debug, Clone, PartialEq)]
pub struct ListRequest {
    pub endpoint: Endpoint,
    pub query: BookQuery,
}

impl ListState {
    /// Default ordering goes to the view endpoint, anything else to the sort endpoint.
    #[must_use]
    pub fn request(&self) -> ListRequest {
        let author = self.filters.author.trim();
        let endpoint = if self.sort_by == SortKey::DateAdded {
            Endpoint::View
        } else {
            Endpoint::Sort
        };
        ListRequest {
            endpoint,
            query: BookQuery {
                genre: self.filters.genre,
                author: (!author.is_empty()).then(|| author.to_string()),
                sort_by: self.sort_by,
                order: None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Loading,
    Success(Vec<Book>),
    Error(String),
}

/// A fetch issued for one version of the list state.
#[derive(Debug, Clone, PartialEq)]
pub struct Ticket {
    pub version: u64,
    pub request: ListRequest,
}

impl Ticket {
    /// Run this ticket's request.
    ///
    /// # Errors
    /// Propagates the client's error unchanged.
    pub async fn fetch(&self, client: &BookClient) -> ClientResult<Vec<Book>> {
        client
            .get_books(self.request.endpoint, &self.request.query)
            .await
    }
}

#[derive(Debug, Clone)]
pub struct ListView {
    state: ListState,
    phase: Phase,
    version: u64,
}

impl ListView {
    /// A freshly mounted view, already loading, and the ticket for its first fetch.
    #[must_use]
    pub fn mount() -> (Self, Ticket) {
        Self::mount_with(ListState::default())
    }

    #[must_use]
    pub fn mount_with(state: ListState) -> (Self, Ticket) {
        let view = Self {
            state,
            phase: Phase::Loading,
            version: 1,
        };
        let ticket = view.ticket();
        (view, ticket)
    }

    #[must_use]
    pub fn state(&self) -> &ListState {
        &self.state
    }

    #[must_use]
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Apply `action`. Returns a ticket to fetch when the state changed, `None` otherwise.
    ///
    /// [`Action::ClearFilters`] always refetches, even when the filters were already empty.
    pub fn dispatch(&mut self, action: Action) -> Option<Ticket> {
        let always = action == Action::ClearFilters;
        let next = reduce(&self.state, action);
        if next == self.state && !always {
            return None;
        }
        self.state = next;
        self.version += 1;
        self.phase = Phase::Loading;
        Some(self.ticket())
    }

    /// Apply the outcome of the fetch issued at `version`.
    ///
    /// Returns `false`, leaving the view untouched, if a newer ticket has been issued since.
    pub fn resolve(&mut self, version: u64, result: ClientResult<Vec<Book>>) -> bool {
        if version != self.version {
            tracing::debug!(version, current = self.version, "discarding stale book list");
            return false;
        }
        self.phase = match result {
            Ok(books) => Phase::Success(books),
            Err(e) => {
                tracing::warn!(error = %e, "error fetching books");
                Phase::Error(FETCH_ERROR.to_string())
            }
        };
        true
    }

    fn ticket(&self) -> Ticket {
        Ticket {
            version: self.version,
            request: self.state.request(),
        }
    }
}

/// Genre filter choices; `None` is "All Genres".
#[must_use]
pub fn genre_options() -> Vec<(Option<BookGenre>, String)> {
    std::iter::once((None, "All Genres".to_string()))
        .chain(BookGenre::ALL.into_iter().map(|g| (Some(g), g.label())))
        .collect()
}

#[must_use]
pub fn sort_options() -> Vec<(SortKey, &'static str)> {
    SortKey::ALL.into_iter().map(|k| (k, k.label())).collect()
}

/// `★` repeated `floor(rating)` times.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn stars(rating: f64) -> String {
    "★".repeat(rating.floor().clamp(0.0, 5.0) as usize)
}

/// Render one book. Absent, empty, and zero-valued optional fields are left out.
#[must_use]
pub fn render_card(book: &Book) -> String {
    let mut lines = vec![book.title.clone(), format!("by {}", book.author)];

    let mut details = Vec::new();
    if let Some(genre) = book.genre {
        details.push(genre.to_string());
    }
    if let Some(year) = book.publication_year.filter(|y| *y != 0) {
        details.push(year.to_string());
    }
    if let Some(rating) = book.rating.filter(|r| *r != 0.0 && !r.is_nan()) {
        details.push(format!("{} {rating}/5", stars(rating)));
    }
    if let Some(language) = book.language.as_deref().filter(|l| !l.is_empty()) {
        details.push(language.to_string());
    }
    if !details.is_empty() {
        lines.push(details.join(" · "));
    }

    if let Some(summary) = book.summary.as_deref().filter(|s| !s.is_empty()) {
        lines.push(summary.to_string());
    }

    lines.push(format!("Added {}", book.date_added.format("%-m/%-d/%Y")));
    lines.join("\n")
}

#[must_use]
pub fn render_list(view: &ListView) -> String {
    match view.phase() {
        Phase::Loading => "Loading books...".to_string(),
        Phase::Error(message) => message.clone(),
        Phase::Success(books) if books.is_empty() => "No books found".to_string(),
        Phase::Success(books) => books
            .iter()
            .map(render_card)
            .collect::<Vec<_>>()
            .join("\n\n"),
    }
}
