use sqlx::SqlitePool;

use crate::{
    db,
    models::{BookGenre, CreateBookRequest},
};

fn sample(
    title: &str,
    author: &str,
    genre: BookGenre,
    rating: f64,
    year: i32,
    summary: &str,
) -> CreateBookRequest {
    CreateBookRequest {
        title: title.to_string(),
        author: author.to_string(),
        genre: Some(genre),
        publication_year: Some(year),
        rating: Some(rating),
        language: Some("English".to_string()),
        summary: Some(summary.to_string()),
    }
}

#[must_use]
pub fn sample_books() -> Vec<CreateBookRequest> {
    vec![
        sample(
            "The Great Gatsby",
            "F. Scott Fitzgerald",
            BookGenre::Fiction,
            4.5,
            1925,
            "A classic American novel set in the Jazz Age, exploring themes of wealth, love, and the American Dream.",
        ),
        sample(
            "To Kill a Mockingbird",
            "Harper Lee",
            BookGenre::Fiction,
            4.8,
            1960,
            "A powerful story of racial injustice and childhood innocence in the American South.",
        ),
        sample(
            "1984",
            "George Orwell",
            BookGenre::Scifi,
            4.7,
            1949,
            "A dystopian social science fiction novel and cautionary tale about totalitarianism.",
        ),
        sample(
            "Pride and Prejudice",
            "Jane Austen",
            BookGenre::Romance,
            4.6,
            1813,
            "A romantic novel of manners that charts the emotional development of the protagonist Elizabeth Bennet.",
        ),
        sample(
            "The Hobbit",
            "J.R.R. Tolkien",
            BookGenre::Fantasy,
            4.7,
            1937,
            "A fantasy novel about the adventures of hobbit Bilbo Baggins as he journeys to reclaim a treasure.",
        ),
        sample(
            "Steve Jobs",
            "Walter Isaacson",
            BookGenre::Biography,
            4.3,
            2011,
            "The authorized biography of Apple co-founder Steve Jobs, based on extensive interviews.",
        ),
        sample(
            "The Girl with the Dragon Tattoo",
            "Stieg Larsson",
            BookGenre::Mystery,
            4.4,
            2005,
            "A gripping psychological thriller featuring journalist Mikael Blomkvist and hacker Lisbeth Salander.",
        ),
        sample(
            "Sapiens",
            "Yuval Noah Harari",
            BookGenre::Nonfiction,
            4.5,
            2011,
            "A brief history of humankind, exploring how Homo sapiens came to dominate the world.",
        ),
    ]
}

/// Insert every sample book whose title is not already stored.
///
/// Returns how many rows were inserted.
///
/// # Errors
/// Returns database errors.
pub async fn seed_sample_books(pool: &SqlitePool) -> Result<usize, sqlx::Error> {
    let mut inserted = 0;
    for book in sample_books() {
        if db::title_exists(pool, &book.title).await? {
            continue;
        }
        db::insert_book(pool, &book).await?;
        inserted += 1;
    }
    tracing::info!(inserted, "sample books seeded");
    Ok(inserted)
}
