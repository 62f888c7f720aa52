use atrium_http::{nullable, required_text, AppError, AppResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::modules::comments::Comment;

/// A book in the catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    #[serde(default)]
    pub id: String,
    /// Unique and immutable once created
    pub isbn: String,
    pub title: String,
    #[serde(rename = "subTitle")]
    pub sub_title: Option<String>,
    pub publish_date: NaiveDate,
    pub publisher: Option<String>,
    pub pages: Option<u32>,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub website: Option<String>,
    /// Id of a [`Genre`](crate::modules::genres::Genre)
    pub genre: Option<String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

/// Create payload. Comments cannot be supplied on create.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewBook {
    #[validate(length(min = 1, message = "isbn must not be empty"))]
    pub isbn: String,
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    #[serde(rename = "subTitle")]
    pub sub_title: Option<String>,
    pub publish_date: NaiveDate,
    pub publisher: Option<String>,
    pub pages: Option<u32>,
    #[validate(range(min = 0.0, message = "price must not be negative"))]
    pub price: Option<f64>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub genre: Option<String>,
}

impl NewBook {
    pub fn into_book(self, id: String) -> Book {
        Book {
            id,
            isbn: self.isbn,
            title: self.title,
            sub_title: self.sub_title,
            publish_date: self.publish_date,
            publisher: self.publisher,
            pages: self.pages,
            price: self.price,
            description: self.description,
            website: self.website,
            genre: self.genre,
            comments: Vec::new(),
        }
    }
}

/// Partial update. `isbn` and `comments` are not updatable and are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookPatch {
    #[serde(default, deserialize_with = "nullable")]
    pub title: Option<Option<String>>,
    #[serde(default, rename = "subTitle", deserialize_with = "nullable")]
    pub sub_title: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub publish_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "nullable")]
    pub publisher: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub pages: Option<Option<u32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub price: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub website: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub genre: Option<Option<String>>,
}

/// Assign an optional field: absent keeps, `null` clears
fn assign<T>(target: &mut Option<T>, value: Option<Option<T>>) {
    if let Some(value) = value {
        *target = value;
    }
}

impl BookPatch {
    /// Apply onto `book`, stopping at the first invalid field.
    pub fn apply(self, book: &mut Book) -> AppResult<()> {
        required_text(&mut book.title, "title", self.title)?;

        match self.publish_date {
            None => {}
            Some(Some(date)) => book.publish_date = date,
            Some(None) => return Err(AppError::invalid_field("publish_date", "required")),
        }

        if let Some(Some(price)) = self.price {
            if price < 0.0 || !price.is_finite() {
                return Err(AppError::invalid_field("price", "price must not be negative"));
            }
        }

        assign(&mut book.sub_title, self.sub_title);
        assign(&mut book.publisher, self.publisher);
        assign(&mut book.pages, self.pages);
        assign(&mut book.price, self.price);
        assign(&mut book.description, self.description);
        assign(&mut book.website, self.website);
        assign(&mut book.genre, self.genre);
        Ok(())
    }
}

/// Query filter of the book listing. Unrecognized keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookFilter {
    /// Exclusive upper bound, applied only when numeric
    #[serde(rename = "maxPrice")]
    pub max_price: Option<String>,
    pub genre: Option<String>,
}

impl BookFilter {
    pub fn max_price(&self) -> Option<f64> {
        self.max_price
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .and_then(|raw| raw.parse::<f64>().ok())
            .filter(|price| price.is_finite())
    }

    pub fn genre(&self) -> Option<&str> {
        self.genre.as_deref().filter(|genre| !genre.is_empty())
    }
}
