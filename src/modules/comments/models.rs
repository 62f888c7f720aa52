use atrium_http::{nullable, AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A rated comment embedded in its parent document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub rating: u8,
    pub comment: String,
    /// Username of the identity that wrote the comment
    pub author: String,
    pub date: DateTime<Utc>,
}

/// Body of a new comment. Any client-supplied `author` is ignored.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewComment {
    #[validate(range(min = 1, max = 5, message = "rating must be between 1 and 5"))]
    pub rating: u8,
    #[validate(length(min = 1, message = "comment must not be empty"))]
    pub comment: String,
}

/// Partial comment update; only present fields change
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentPatch {
    #[serde(default, deserialize_with = "nullable")]
    pub rating: Option<Option<u8>>,
    #[serde(default, deserialize_with = "nullable")]
    pub comment: Option<Option<String>>,
}

impl CommentPatch {
    /// Apply to `target`. Both fields are required, so `null` is rejected
    /// and nothing changes unless every present field is valid.
    pub fn apply(self, target: &mut Comment) -> AppResult<()> {
        let rating = match self.rating {
            None => None,
            Some(Some(rating)) if (1..=5).contains(&rating) => Some(rating),
            Some(Some(_)) => {
                return Err(AppError::invalid_field(
                    "rating",
                    "rating must be between 1 and 5",
                ))
            }
            Some(None) => return Err(AppError::invalid_field("rating", "required")),
        };

        let comment = match self.comment {
            None => None,
            Some(Some(text)) if !text.is_empty() => Some(text),
            Some(Some(_)) => {
                return Err(AppError::invalid_field(
                    "comment",
                    "comment must not be empty",
                ))
            }
            Some(None) => return Err(AppError::invalid_field("comment", "required")),
        };

        if let Some(rating) = rating {
            target.rating = rating;
        }
        if let Some(comment) = comment {
            target.comment = comment;
        }
        Ok(())
    }
}
