use atrium_db::{Collection, Database};
use atrium_http::{required_text, AppError, AppResult};
use serde_json::{json, Map, Value};
use validator::Validate;

use super::models::{Genre, GenrePatch, NewGenre};
use crate::modules::books;
use crate::utils::new_id;

pub const TABLE: &str = "genre";

#[derive(Clone)]
pub struct GenreRepository {
    genres: Collection,
    books: Collection,
}

impl GenreRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            genres: db.collection(TABLE),
            books: db.collection(books::repository::TABLE),
        }
    }

    fn not_found() -> AppError {
        AppError::not_found("genre not found")
    }

    /// Conflict unless no genre other than `except` is called `name`
    async fn ensure_name_free(&self, name: &str, except: Option<&str>) -> AppResult<()> {
        let existing: Option<Genre> = self.genres.find_one_by("name", name.to_owned()).await?;
        match existing {
            Some(genre) if Some(genre.id.as_str()) != except => Err(AppError::conflict(
                vec![json!({ "field": "name", "value": name })],
                "genre already exists",
            )),
            _ => Ok(()),
        }
    }

    pub async fn create(&self, new: NewGenre) -> AppResult<Genre> {
        new.validate()?;
        self.ensure_name_free(&new.name, None).await?;

        let genre = Genre {
            id: new_id(),
            name: new.name,
        };
        self.genres.insert(&genre.id, &genre).await?;

        tracing::info!(genre_id = %genre.id, name = %genre.name, "genre created");
        Ok(genre)
    }

    pub async fn list(&self) -> AppResult<Vec<Genre>> {
        Ok(self.genres.list().await?)
    }

    pub async fn get(&self, id: &str) -> AppResult<Genre> {
        self.genres.get(id).await?.ok_or_else(Self::not_found)
    }

    pub async fn exists(&self, id: &str) -> AppResult<bool> {
        Ok(self.genres.exists(id).await?)
    }

    pub async fn update(&self, id: &str, patch: GenrePatch) -> AppResult<Genre> {
        let mut genre = self.get(id).await?;

        if patch.name.is_none() {
            return Ok(genre);
        }
        required_text(&mut genre.name, "name", patch.name)?;
        self.ensure_name_free(&genre.name, Some(id)).await?;

        self.genres.merge(id, &genre, &[]).await?;
        tracing::info!(genre_id = %id, "genre updated");
        Ok(genre)
    }

    /// Clear the genre from every book that references it, then delete it.
    ///
    /// The two writes are not one transaction; a failure clearing the books
    /// leaves the genre in place.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        if !self.exists(id).await? {
            return Err(Self::not_found());
        }

        let mut bindings = Map::new();
        bindings.insert("genre".to_string(), Value::from(id));
        self.books
            .update_where("genre = NONE", "genre = $genre", bindings)
            .await
            .map_err(|err| {
                tracing::error!(genre_id = %id, error = %err, "failed to clear genre from books");
                AppError::internal(err)
            })?;

        self.genres.delete(id).await?;
        tracing::info!(genre_id = %id, "genre deleted");
        Ok(())
    }
}
