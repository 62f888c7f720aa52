use atrium_db::{Collection, Database};
use atrium_http::{AppError, AppResult};
use serde_json::json;
use validator::Validate;

use super::models::{NewPromotion, Promotion, PromotionPatch};
use crate::utils::new_id;

pub const TABLE: &str = "promotion";

#[derive(Clone)]
pub struct PromotionRepository {
    promotions: Collection,
}

impl PromotionRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            promotions: db.collection(TABLE),
        }
    }

    fn not_found() -> AppError {
        AppError::not_found("promotion not found")
    }

    async fn ensure_name_free(&self, name: &str, except: Option<&str>) -> AppResult<()> {
        let existing: Option<Promotion> =
            self.promotions.find_one_by("name", name.to_owned()).await?;
        match existing {
            Some(promotion) if Some(promotion.id.as_str()) != except => Err(AppError::conflict(
                vec![json!({ "field": "name", "value": name })],
                "promotion already exists",
            )),
            _ => Ok(()),
        }
    }

    pub async fn create(&self, new: NewPromotion) -> AppResult<Promotion> {
        new.validate()?;
        self.ensure_name_free(&new.name, None).await?;

        let promotion = new.into_promotion(new_id());
        self.promotions.insert(&promotion.id, &promotion).await?;

        tracing::info!(promotion_id = %promotion.id, name = %promotion.name, "promotion created");
        Ok(promotion)
    }

    pub async fn list(&self) -> AppResult<Vec<Promotion>> {
        Ok(self.promotions.list().await?)
    }

    pub async fn get(&self, id: &str) -> AppResult<Promotion> {
        self.promotions.get(id).await?.ok_or_else(Self::not_found)
    }

    pub async fn update(&self, id: &str, patch: PromotionPatch) -> AppResult<Promotion> {
        let mut promotion = self.get(id).await?;
        if let Some(name) = patch.name() {
            self.ensure_name_free(name, Some(id)).await?;
        }
        patch.apply(&mut promotion)?;

        self.promotions.merge(id, &promotion, &[]).await?;
        tracing::info!(promotion_id = %id, "promotion updated");

        self.get(id).await
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        if !self.promotions.exists(id).await? {
            return Err(Self::not_found());
        }
        self.promotions.delete(id).await?;

        tracing::info!(promotion_id = %id, "promotion deleted");
        Ok(())
    }
}
