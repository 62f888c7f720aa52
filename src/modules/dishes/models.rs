use atrium_db::collection::Keyed;
use atrium_http::{nullable, required_text, AppError, AppResult};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::modules::comments::Comment;

/// A dish on the menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dish {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub image: String,
    pub category: String,
    #[serde(default)]
    pub label: String,
    pub price: f64,
    #[serde(default)]
    pub featured: bool,
    pub description: String,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Keyed for Dish {
    fn key(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewDish {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[validate(length(min = 1, message = "image must not be empty"))]
    pub image: String,
    #[validate(length(min = 1, message = "category must not be empty"))]
    pub category: String,
    #[serde(default)]
    pub label: String,
    #[validate(range(min = 0.0, message = "price must not be negative"))]
    pub price: f64,
    #[serde(default)]
    pub featured: bool,
    #[validate(length(min = 1, message = "description must not be empty"))]
    pub description: String,
}

impl NewDish {
    pub fn into_dish(self, id: String) -> Dish {
        Dish {
            id,
            name: self.name,
            image: self.image,
            category: self.category,
            label: self.label,
            price: self.price,
            featured: self.featured,
            description: self.description,
            comments: Vec::new(),
        }
    }
}

/// Partial update. `comments` is managed through the comment routes and ignored here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DishPatch {
    #[serde(default, deserialize_with = "nullable")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub image: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub category: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub label: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub price: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub featured: Option<Option<bool>>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
}

impl DishPatch {
    /// The new name, if the patch renames the dish
    pub fn name(&self) -> Option<&str> {
        match &self.name {
            Some(Some(name)) => Some(name),
            _ => None,
        }
    }

    pub fn apply(self, dish: &mut Dish) -> AppResult<()> {
        required_text(&mut dish.name, "name", self.name)?;
        required_text(&mut dish.image, "image", self.image)?;
        required_text(&mut dish.category, "category", self.category)?;
        required_text(&mut dish.description, "description", self.description)?;

        match self.price {
            None => {}
            Some(Some(price)) if price >= 0.0 && price.is_finite() => dish.price = price,
            Some(Some(_)) => return Err(AppError::invalid_field("price", "price must not be negative")),
            Some(None) => return Err(AppError::invalid_field("price", "required")),
        }

        // label and featured have defaults, so null resets them
        if let Some(label) = self.label {
            dish.label = label.unwrap_or_default();
        }
        if let Some(featured) = self.featured {
            dish.featured = featured.unwrap_or_default();
        }
        Ok(())
    }
}
