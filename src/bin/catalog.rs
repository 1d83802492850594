use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};

use book_catalog::{
    BookClient, BookGenre, Config, CreateBookRequest, SortKey, db,
    list_view::{Action, ListView, genre_options, render_card, render_list, sort_options},
    models::parse_rating,
    seed,
};

#[derive(Parser)]
#[command(name = "catalog")]
#[command(about = "Browse and add books in the catalog service", long_about = None)]
struct Cli {
    /// Base URL of the catalog API [default: BOOK_API_URL or http://localhost:8000]
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List books, newest first unless another sort key is given
    List {
        #[arg(short, long, value_parser = parse_genre)]
        genre: Option<BookGenre>,
        /// Case-insensitive part of the author's name
        #[arg(short, long)]
        author: Option<String>,
        #[arg(short, long, value_parser = parse_sort_key, default_value = "date_added")]
        sort_by: SortKey,
    },
    /// Add a book
    Add {
        #[arg(short, long)]
        title: String,
        #[arg(short, long)]
        author: String,
        #[arg(short, long, value_parser = parse_genre)]
        genre: Option<BookGenre>,
        #[arg(short, long)]
        year: Option<i32>,
        /// Rating out of 5
        #[arg(short, long, value_parser = parse_rating_arg)]
        rating: Option<f64>,
        #[arg(short, long)]
        language: Option<String>,
        #[arg(long)]
        summary: Option<String>,
    },
    /// List every book as id / name / created_at
    Entries,
    /// Add a book by name only
    AddEntry { name: String },
    /// Insert the sample books directly into DATABASE_URL
    Seed,
    /// Show the API in use and the accepted genre and sort values
    Options,
}

fn parse_genre(s: &str) -> Result<BookGenre, String> {
    s.parse().map_err(|e: book_catalog::AppError| e.to_string())
}

fn parse_sort_key(s: &str) -> Result<SortKey, String> {
    s.parse().map_err(|e: book_catalog::AppError| e.to_string())
}

fn parse_rating_arg(s: &str) -> Result<f64, String> {
    parse_rating(s).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();

    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::from_env()?;
    let client = BookClient::new(cli.api_url.unwrap_or(config.api_base_url));
    tracing::debug!(api = client.base_url(), "using catalog API");

    match cli.command {
        Commands::List {
            genre,
            author,
            sort_by,
        } => {
            let (mut view, mut ticket) = ListView::mount();
            let actions = [
                Action::SetGenre(genre),
                Action::SetAuthor(author.unwrap_or_default()),
                Action::SetSort(sort_by),
            ];
            for action in actions {
                if let Some(next) = view.dispatch(action) {
                    ticket = next;
                }
            }
            let result = ticket.fetch(&client).await;
            view.resolve(ticket.version, result);
            println!("{}", render_list(&view));
        }
        Commands::Add {
            title,
            author,
            genre,
            year,
            rating,
            language,
            summary,
        } => {
            let request = CreateBookRequest {
                title,
                author,
                genre,
                publication_year: year,
                rating,
                language,
                summary,
            };
            let book = client
                .add_book(&request)
                .await
                .context("failed to add book")?;
            println!("{}", render_card(&book));
        }
        Commands::Entries => {
            let entries = client.list_entries().await.context("failed to list books")?;
            for entry in entries {
                println!("{}\t{}\t{}", entry.id, entry.name, entry.created_at.to_rfc3339());
            }
        }
        Commands::AddEntry { name } => {
            let res = client.add_entry(&name).await.context("failed to add book")?;
            println!("{} (id {})", res.message, res.id);
        }
        Commands::Seed => {
            let pool = db::connect(&config.database_url).await?;
            db::migrate(&pool)
                .await
                .map_err(|e| anyhow!("Migration failed: {e}"))?;
            let inserted = seed::seed_sample_books(&pool).await?;
            println!("Inserted {inserted} sample books");
        }
        Commands::Options => {
            println!("API: {}", client.base_url());
            println!("Genres:");
            for (genre, label) in genre_options() {
                let value = genre.map_or("", |g| g.as_str());
                println!("  {value:<12}{label}");
            }
            println!("Sort by:");
            for (key, label) in sort_options() {
                println!("  {:<18}{label}", key.as_str());
            }
        }
    }

    Ok(())
}
