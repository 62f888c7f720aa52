use atrium_http::nullable;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    #[serde(default)]
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewGenre {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenrePatch {
    #[serde(default, deserialize_with = "nullable")]
    pub name: Option<Option<String>>,
}
