//! Request/response extractors that speak the [`AppError`] envelope.

use axum::{
    extract::FromRequest,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::AppError;

/// JSON body extractor whose rejections are `400` validation errors.
#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// Deserialize a field whose presence matters.
///
/// Combine with `#[serde(default)]`: absent becomes `None`, an explicit
/// `null` becomes `Some(None)` and a value becomes `Some(Some(v))`.
pub fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Apply a [`nullable`] patch value to a required text field.
///
/// Absent keeps `target`. `null` and `""` are rejected with a validation
/// error naming `field`, and `target` is left as it was.
pub fn required_text(
    target: &mut String,
    field: &str,
    value: Option<Option<String>>,
) -> Result<(), AppError> {
    match value {
        None => Ok(()),
        Some(Some(text)) if !text.is_empty() => {
            *target = text;
            Ok(())
        }
        Some(Some(_)) => Err(AppError::invalid_field(
            field,
            &format!("{field} must not be empty"),
        )),
        Some(None) => Err(AppError::invalid_field(field, "required")),
    }
}
