use atrium_http::{nullable, required_text, AppError, AppResult};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PromotionLabel {
    New,
    Popular,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Promotion {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub image: String,
    pub label: Option<PromotionLabel>,
    pub price: f64,
    #[serde(default)]
    pub featured: bool,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewPromotion {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[validate(length(min = 1, message = "image must not be empty"))]
    pub image: String,
    pub label: Option<PromotionLabel>,
    #[validate(range(min = 0.0, message = "price must not be negative"))]
    pub price: f64,
    #[serde(default)]
    pub featured: bool,
    #[validate(length(min = 1, message = "description must not be empty"))]
    pub description: String,
}

impl NewPromotion {
    pub fn into_promotion(self, id: String) -> Promotion {
        Promotion {
            id,
            name: self.name,
            image: self.image,
            label: self.label,
            price: self.price,
            featured: self.featured,
            description: self.description,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromotionPatch {
    #[serde(default, deserialize_with = "nullable")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub image: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub label: Option<Option<PromotionLabel>>,
    #[serde(default, deserialize_with = "nullable")]
    pub price: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub featured: Option<Option<bool>>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
}

impl PromotionPatch {
    /// The new name, if the patch renames the promotion
    pub fn name(&self) -> Option<&str> {
        match &self.name {
            Some(Some(name)) => Some(name),
            _ => None,
        }
    }

    pub fn apply(self, promotion: &mut Promotion) -> AppResult<()> {
        required_text(&mut promotion.name, "name", self.name)?;
        required_text(&mut promotion.image, "image", self.image)?;
        required_text(&mut promotion.description, "description", self.description)?;

        match self.price {
            None => {}
            Some(Some(price)) if price >= 0.0 && price.is_finite() => promotion.price = price,
            Some(Some(_)) => {
                return Err(AppError::invalid_field("price", "price must not be negative"))
            }
            Some(None) => return Err(AppError::invalid_field("price", "required")),
        }

        if let Some(label) = self.label {
            promotion.label = label;
        }
        if let Some(featured) = self.featured {
            promotion.featured = featured.unwrap_or_default();
        }
        Ok(())
    }
}
