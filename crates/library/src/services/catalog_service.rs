//! Catalog browsing, book creation and availability.

use sqlx::SqlitePool;
use tracing::info;

use libris_database::{
    Book, BookAvailability, BookQuery, BookRepository, CategorySummary, CreateBookRequest,
};

use crate::types::{BookFilter, LibraryError, LibraryResult, NewBook};
use crate::validation::Validator;

#[derive(Clone)]
pub struct CatalogService {
    books: BookRepository,
}

impl CatalogService {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            books: BookRepository::new(pool),
        }
    }

    pub async fn list_books(&self, filter: BookFilter) -> LibraryResult<Vec<Book>> {
        let (limit, offset) = Validator::page(filter.limit, filter.offset);
        let query = BookQuery {
            search: Validator::optional_text(filter.q),
            category: Validator::optional_text(filter.category),
            limit,
            offset,
        };

        Ok(self.books.search(&query).await?)
    }

    pub async fn get_book(&self, book_id: i64) -> LibraryResult<Book> {
        self.books
            .find_by_id(book_id)
            .await?
            .ok_or_else(|| LibraryError::not_found("book"))
    }

    pub async fn create_book(&self, request: NewBook) -> LibraryResult<Book> {
        let create = CreateBookRequest {
            title: Validator::title(&request.title)?,
            isbn: Validator::optional_text(request.isbn),
            author: Validator::optional_text(request.author),
            category: Validator::optional_text(request.category),
            published_year: request.published_year,
            description: Validator::optional_text(request.description),
            total_copies: Validator::total_copies(request.total_copies)?,
        };

        let book = self.books.create(&create).await?;
        info!(book_id = book.id, title = %book.title, copies = book.total_copies, "book added to catalog");
        Ok(book)
    }

    pub async fn list_categories(&self) -> LibraryResult<Vec<CategorySummary>> {
        Ok(self.books.list_categories().await?)
    }

    /// Copy counts, open loans, queue length and the next expected return.
    pub async fn availability(&self, book_id: i64) -> LibraryResult<BookAvailability> {
        self.books
            .availability(book_id)
            .await?
            .ok_or_else(|| LibraryError::not_found("book"))
    }
}

pub(crate) async fn ensure_book_exists(books: &BookRepository, book_id: i64) -> LibraryResult<()> {
    if books.exists(book_id).await? {
        Ok(())
    } else {
        Err(LibraryError::not_found("book"))
    }
}
