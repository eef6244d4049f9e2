use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use directories::ProjectDirs;
use http::StatusCode;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use bookshelf_lib::{
    create_book, delete_book, get_book, list_books, ApiInfo, Book, BookStore, HandlerResponse,
    Payload, RouteTable, TableStore, DEFAULT_TABLE_NAME,
};

const CLI_REQUEST_ID: &str = "cli";

#[derive(Parser, Debug)]
#[command(author, version, about = "Manage a Bookshelf book table")]
struct Cli {
    /// SQLite database holding the book table.
    #[arg(long, global = true, env = "BOOKSHELF_DB_PATH")]
    db: Option<PathBuf>,

    /// Name of the book table.
    #[arg(long, global = true, env = "BOOKSHELF_TABLE_NAME", default_value = DEFAULT_TABLE_NAME)]
    table: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the book table if it does not exist and report its location.
    Init,
    /// List every stored book.
    List {
        /// Print a JSON array instead of one line per book.
        #[arg(long)]
        json: bool,
    },
    /// Show one book as JSON.
    Get {
        isbn: String,
    },
    /// Add a book. Fails if the ISBN is already stored.
    Add {
        #[arg(long)]
        isbn: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        author: String,
        #[arg(long)]
        year: i32,
    },
    /// Remove a book. Removing an unknown ISBN is not an error.
    Remove {
        isbn: String,
    },
    /// Print the OpenAPI document for the book API.
    Openapi {
        /// Document only the read operations.
        #[arg(long)]
        read_only: bool,
        /// Server URL to advertise in the document.
        #[arg(long)]
        server_url: Option<String>,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let Cli { db, table, command } = Cli::parse();
    let db = db.as_deref();

    match command {
        Command::Init => {
            let (store, path) = open_store(db, &table)?;
            println!("Table '{}' ready at {}", store.table_name(), path.display());
            Ok(())
        }
        Command::List { json } => handle_list(&open_store(db, &table)?.0, json),
        Command::Get { isbn } => handle_get(&open_store(db, &table)?.0, &isbn),
        Command::Add {
            isbn,
            title,
            author,
            year,
        } => handle_add(
            &open_store(db, &table)?.0,
            Book::new(isbn, title, author, year),
        ),
        Command::Remove { isbn } => handle_remove(&open_store(db, &table)?.0, &isbn),
        Command::Openapi {
            read_only,
            server_url,
        } => handle_openapi(read_only, server_url),
    }
}

fn default_db_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("com", "bookshelf", "bookshelf")
        .ok_or_else(|| anyhow!("could not determine a data directory; pass --db"))?;
    Ok(dirs.data_dir().join("books.db"))
}

/// Open the table store, creating the file and table on first use.
fn open_store(db: Option<&Path>, table: &str) -> Result<(TableStore, PathBuf)> {
    let path = match db {
        Some(path) => path.to_path_buf(),
        None => default_db_path()?,
    };
    let store = TableStore::open(&path, table)
        .with_context(|| format!("failed to open book table at {}", path.display()))?;
    store
        .ensure_table_exists()
        .with_context(|| format!("failed to provision table '{}'", table))?;
    Ok((store, path))
}

fn handle_list(store: &TableStore, json: bool) -> Result<()> {
    let response = list_books(store, CLI_REQUEST_ID).context("failed to list books")?;
    let Some(Payload::Books(books)) = response.payload else {
        bail!("unexpected list response ({})", response.status);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&books)?);
        return Ok(());
    }

    if books.is_empty() {
        println!("No books stored.");
    }
    for book in books {
        println!(
            "{}\t{}\t{}\t{}",
            book.isbn, book.title, book.author, book.publish_year
        );
    }
    Ok(())
}

fn handle_get(store: &TableStore, isbn: &str) -> Result<()> {
    let response = get_book(store, isbn, CLI_REQUEST_ID)
        .with_context(|| format!("failed to look up book {}", isbn))?;
    print_payload(&response)
}

fn handle_add(store: &TableStore, book: Book) -> Result<()> {
    let body = serde_json::to_vec(&book)?;
    let response = create_book(store, &body, CLI_REQUEST_ID)
        .with_context(|| format!("failed to add book {}", book.isbn))?;
    if response.status == StatusCode::BAD_REQUEST {
        bail!(
            "book {} was rejected: the isbn is empty or already stored",
            book.isbn
        );
    }
    print_payload(&response)
}

fn handle_remove(store: &TableStore, isbn: &str) -> Result<()> {
    let response = delete_book(store, isbn, CLI_REQUEST_ID);
    if response.status != StatusCode::NO_CONTENT {
        return print_payload(&response);
    }
    println!("Removed book {}", isbn);
    Ok(())
}

fn handle_openapi(read_only: bool, server_url: Option<String>) -> Result<()> {
    let info = ApiInfo {
        server_url,
        ..ApiInfo::default()
    };
    let document = RouteTable::new(read_only).openapi(&info);
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}

/// Print a success payload to stdout, or fail with the error body.
fn print_payload(response: &HandlerResponse) -> Result<()> {
    if let Some(error) = response.error_body() {
        bail!("{} ({})", error, response.status);
    }
    if let Some(payload) = &response.payload {
        println!("{}", serde_json::to_string_pretty(payload)?);
    }
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
