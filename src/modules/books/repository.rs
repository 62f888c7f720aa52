use atrium_db::{Collection, Database};
use atrium_http::{AppError, AppResult};
use serde_json::{json, Map, Value};
use validator::Validate;

use super::models::{Book, BookFilter, BookPatch, NewBook};
use crate::modules::genres;
use crate::utils::new_id;

pub const TABLE: &str = "book";

#[derive(Clone)]
pub struct BookRepository {
    books: Collection,
    genres: Collection,
}

impl BookRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            books: db.collection(TABLE),
            genres: db.collection(genres::repository::TABLE),
        }
    }

    fn not_found() -> AppError {
        AppError::not_found("book not found")
    }

    async fn ensure_genre(&self, genre: Option<&str>) -> AppResult<()> {
        let Some(genre) = genre else {
            return Ok(());
        };
        if self.genres.exists(genre).await? {
            return Ok(());
        }

        Err(AppError::validation(
            vec![json!({ "field": "genre", "value": genre, "error": "unknown genre" })],
            "invalid genre id",
        ))
    }

    pub async fn create(&self, new: NewBook) -> AppResult<Book> {
        new.validate()?;

        let existing: Option<Book> = self.books.find_one_by("isbn", new.isbn.clone()).await?;
        if existing.is_some() {
            return Err(AppError::conflict(
                vec![json!({ "field": "isbn", "value": new.isbn })],
                "isbn already exists",
            ));
        }
        self.ensure_genre(new.genre.as_deref()).await?;

        let book = new.into_book(new_id());
        self.books.insert(&book.id, &book).await?;

        tracing::info!(book_id = %book.id, isbn = %book.isbn, "book created");
        Ok(book)
    }

    /// Books matching every recognized filter. No match is an empty list.
    pub async fn list(&self, filter: &BookFilter) -> AppResult<Vec<Book>> {
        let mut conditions = Vec::new();
        let mut bindings = Map::new();

        if let Some(max_price) = filter.max_price() {
            conditions.push("type::is::number(price) AND price < $max_price");
            bindings.insert("max_price".to_string(), Value::from(max_price));
        }
        if let Some(genre) = filter.genre() {
            conditions.push("genre = $genre");
            bindings.insert("genre".to_string(), Value::from(genre));
        }

        let condition = if conditions.is_empty() {
            "true".to_string()
        } else {
            conditions.join(" AND ")
        };

        Ok(self.books.list_where(&condition, bindings).await?)
    }

    pub async fn get(&self, id: &str) -> AppResult<Book> {
        self.books.get(id).await?.ok_or_else(Self::not_found)
    }

    pub async fn update(&self, id: &str, patch: BookPatch) -> AppResult<Book> {
        let mut book = self.get(id).await?;
        if let Some(genre) = &patch.genre {
            self.ensure_genre(genre.as_deref()).await?;
        }
        patch.apply(&mut book)?;

        self.books.merge(id, &book, &["isbn", "comments"]).await?;
        tracing::info!(book_id = %id, "book updated");

        self.get(id).await
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        if !self.books.exists(id).await? {
            return Err(Self::not_found());
        }
        self.books.delete(id).await?;

        tracing::info!(book_id = %id, "book deleted");
        Ok(())
    }
}
