use serde::{Deserialize, Serialize};

use crate::modules::dishes::Dish;

/// Stored favorites of one user. The record key is the user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favorite {
    #[serde(default)]
    pub id: String,
    pub user: String,
    /// Dish ids without duplicates, in the order they were first added
    #[serde(default)]
    pub dishes: Vec<String>,
}

/// Favorites with every dish reference resolved to the full dish
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FavoriteView {
    pub id: String,
    pub user: String,
    pub dishes: Vec<Dish>,
}

/// A dish reference in a request body: either the id itself or an object carrying it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DishRef {
    Id(String),
    Object {
        #[serde(rename = "_id", alias = "id")]
        id: String,
    },
}

impl DishRef {
    pub fn id(&self) -> &str {
        match self {
            DishRef::Id(id) | DishRef::Object { id } => id,
        }
    }
}

/// Ids of `refs` with duplicates removed, keeping first occurrences
pub fn distinct_ids(refs: &[DishRef]) -> Vec<String> {
    let mut ids: Vec<String> = Vec::with_capacity(refs.len());
    for dish in refs {
        if !ids.iter().any(|id| id == dish.id()) {
            ids.push(dish.id().to_owned());
        }
    }
    ids
}
