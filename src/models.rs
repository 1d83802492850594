use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::errors::{AppError, AppResult};

pub const DEFAULT_LANGUAGE: &str = "English";
pub const UNKNOWN_AUTHOR: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum BookGenre {
    Fiction,
    Nonfiction,
    Mystery,
    Romance,
    Scifi,
    Fantasy,
    Thriller,
    Biography,
    History,
    Selfhelp,
}

impl BookGenre {
    pub const ALL: [BookGenre; 10] = [
        BookGenre::Fiction,
        BookGenre::Nonfiction,
        BookGenre::Mystery,
        BookGenre::Romance,
        BookGenre::Scifi,
        BookGenre::Fantasy,
        BookGenre::Thriller,
        BookGenre::Biography,
        BookGenre::History,
        BookGenre::Selfhelp,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            BookGenre::Fiction => "fiction",
            BookGenre::Nonfiction => "nonfiction",
            BookGenre::Mystery => "mystery",
            BookGenre::Romance => "romance",
            BookGenre::Scifi => "scifi",
            BookGenre::Fantasy => "fantasy",
            BookGenre::Thriller => "thriller",
            BookGenre::Biography => "biography",
            BookGenre::History => "history",
            BookGenre::Selfhelp => "selfhelp",
        }
    }

    /// Label shown in the genre filter, e.g. `Scifi`.
    #[must_use]
    pub fn label(self) -> String {
        let s = self.as_str();
        let mut chars = s.chars();
        chars.next().map_or_else(String::new, |first| {
            first.to_uppercase().chain(chars).collect()
        })
    }
}

impl fmt::Display for BookGenre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookGenre {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BookGenre::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| AppError::Validation(format!("unknown genre: {s}")))
    }
}

/// Columns a book list may be ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    DateAdded,
    Title,
    Author,
    Rating,
    PublicationYear,
}

impl SortKey {
    pub const ALL: [SortKey; 5] = [
        SortKey::DateAdded,
        SortKey::Title,
        SortKey::Author,
        SortKey::Rating,
        SortKey::PublicationYear,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::DateAdded => "date_added",
            SortKey::Title => "title",
            SortKey::Author => "author",
            SortKey::Rating => "rating",
            SortKey::PublicationYear => "publication_year",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            SortKey::DateAdded => "Date Added",
            SortKey::Title => "Title",
            SortKey::Author => "Author",
            SortKey::Rating => "Rating",
            SortKey::PublicationYear => "Publication Year",
        }
    }

    /// Direction used when the caller does not ask for one.
    #[must_use]
    pub fn default_order(self) -> SortOrder {
        match self {
            SortKey::Title | SortKey::Author => SortOrder::Asc,
            SortKey::DateAdded | SortKey::Rating | SortKey::PublicationYear => SortOrder::Desc,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| AppError::Validation(format!("unknown sort_by: {s}")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(AppError::Validation(format!("unknown order: {other}"))),
        }
    }
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub genre: Option<BookGenre>,
    pub publication_year: Option<i32>,
    pub rating: Option<f64>,
    pub language: Option<String>,
    pub summary: Option<String>,
    pub date_added: DateTime<Utc>,
}

/// Minimal projection served by `GET /books`.
#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookEntry {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Parse a rating typed by a user. Only finite values in `0..=5` are accepted.
///
/// # Errors
/// Returns a validation error for non-numeric, non-finite, or out-of-range input.
pub fn parse_rating(s: &str) -> AppResult<f64> {
    let rating: f64 = s
        .trim()
        .parse()
        .map_err(|_| AppError::Validation(format!("rating is not a number: {s}")))?;
    if !rating.is_finite() || !(0.0..=5.0).contains(&rating) {
        return Err(AppError::Validation(format!("rating must be between 0 and 5: {s}")));
    }
    Ok(rating)
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CreateBookRequest {
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub title: String,
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<BookGenre>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, max = 5.0))]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl CreateBookRequest {
    #[must_use]
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            ..Self::default()
        }
    }

    /// Trim text fields, drop empty optionals and fill in the default language.
    #[must_use]
    pub fn normalized(self) -> Self {
        let trimmed = |v: Option<String>| {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        };
        Self {
            title: self.title.trim().to_string(),
            author: self.author.trim().to_string(),
            language: trimmed(self.language).or_else(|| Some(DEFAULT_LANGUAGE.to_string())),
            summary: trimmed(self.summary),
            ..self
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddEntryRequest {
    #[serde(rename = "bookName", default, skip_serializing_if = "Option::is_none")]
    pub book_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddEntryResponse {
    pub id: i64,
    pub name: String,
    pub message: String,
}

/// Filter and ordering applied to a book listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookQuery {
    pub genre: Option<BookGenre>,
    /// Case-insensitive substring of the author name.
    pub author: Option<String>,
    pub sort_by: SortKey,
    /// Overrides [`SortKey::default_order`] when set.
    pub order: Option<SortOrder>,
}

impl BookQuery {
    #[must_use]
    pub fn order(&self) -> SortOrder {
        self.order.unwrap_or_else(|| self.sort_by.default_order())
    }

    /// Query-string pairs for the non-empty parts of this query.
    #[must_use]
    pub fn query_pairs(&self, include_sort: bool) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if include_sort {
            pairs.push(("sort_by", self.sort_by.as_str().to_string()));
            if let Some(order) = self.order {
                pairs.push(("order", order.as_str().to_string()));
            }
        }
        if let Some(genre) = self.genre {
            pairs.push(("genre", genre.as_str().to_string()));
        }
        if let Some(author) = self.author.as_deref().map(str::trim).filter(|a| !a.is_empty()) {
            pairs.push(("author", author.to_string()));
        }
        pairs
    }
}

/// Raw query string of the list endpoints. Empty values count as absent.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub genre: Option<String>,
    pub author: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

fn present(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl ListParams {
    /// Parse into a [`BookQuery`], rejecting values outside the allow-lists.
    ///
    /// # Errors
    /// Returns a validation error for an unknown genre, sort key or order.
    pub fn into_query(self) -> AppResult<BookQuery> {
        Ok(BookQuery {
            genre: present(self.genre).map(|g| g.parse::<BookGenre>()).transpose()?,
            author: present(self.author),
            sort_by: present(self.sort_by)
                .map(|s| s.parse::<SortKey>())
                .transpose()?
                .unwrap_or_default(),
            order: present(self.order).map(|o| o.parse::<SortOrder>()).transpose()?,
        })
    }
}
