use atrium_db::{Collection, Database};
use atrium_http::{AppError, AppResult};
use serde_json::json;
use validator::Validate;

use super::models::{Dish, DishPatch, NewDish};
use crate::utils::new_id;

pub const TABLE: &str = "dish";

#[derive(Clone)]
pub struct DishRepository {
    dishes: Collection,
}

impl DishRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            dishes: db.collection(TABLE),
        }
    }

    fn not_found() -> AppError {
        AppError::not_found("dish not found")
    }

    async fn ensure_name_free(&self, name: &str, except: Option<&str>) -> AppResult<()> {
        let existing: Option<Dish> = self.dishes.find_one_by("name", name.to_owned()).await?;
        match existing {
            Some(dish) if Some(dish.id.as_str()) != except => Err(AppError::conflict(
                vec![json!({ "field": "name", "value": name })],
                "dish already exists",
            )),
            _ => Ok(()),
        }
    }

    pub async fn create(&self, new: NewDish) -> AppResult<Dish> {
        new.validate()?;
        self.ensure_name_free(&new.name, None).await?;

        let dish = new.into_dish(new_id());
        self.dishes.insert(&dish.id, &dish).await?;

        tracing::info!(dish_id = %dish.id, name = %dish.name, "dish created");
        Ok(dish)
    }

    pub async fn list(&self) -> AppResult<Vec<Dish>> {
        Ok(self.dishes.list().await?)
    }

    pub async fn get(&self, id: &str) -> AppResult<Dish> {
        self.dishes.get(id).await?.ok_or_else(Self::not_found)
    }

    pub async fn update(&self, id: &str, patch: DishPatch) -> AppResult<Dish> {
        let mut dish = self.get(id).await?;
        if let Some(name) = patch.name() {
            self.ensure_name_free(name, Some(id)).await?;
        }
        patch.apply(&mut dish)?;

        self.dishes.merge(id, &dish, &["comments"]).await?;
        tracing::info!(dish_id = %id, "dish updated");

        self.get(id).await
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        if !self.dishes.exists(id).await? {
            return Err(Self::not_found());
        }
        self.dishes.delete(id).await?;

        tracing::info!(dish_id = %id, "dish deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::testing;

    async fn repository() -> DishRepository {
        DishRepository::new(&testing::database().await)
    }

    fn new_dish(name: &str) -> NewDish {
        serde_json::from_value(json!({
            "name": name,
            "image": "images/dish.png",
            "category": "mains",
            "price": 4.99,
            "description": "Tasty"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn duplicate_name_is_conflict() {
        let dishes = repository().await;
        dishes.create(new_dish("Vadonut")).await.unwrap();

        assert!(matches!(
            dishes.create(new_dish("Vadonut")).await,
            Err(AppError::Conflict { .. })
        ));
    }

    #[tokio::test]
    async fn rename_onto_another_dish_is_conflict() {
        let dishes = repository().await;
        let vadonut = dishes.create(new_dish("Vadonut")).await.unwrap();
        dishes.create(new_dish("ElaiCheese Cake")).await.unwrap();

        let patch: DishPatch =
            serde_json::from_value(json!({ "name": "ElaiCheese Cake" })).unwrap();
        assert!(matches!(
            dishes.update(&vadonut.id, patch).await,
            Err(AppError::Conflict { .. })
        ));

        let patch: DishPatch =
            serde_json::from_value(json!({ "name": "Vadonut", "price": 1.5 })).unwrap();
        let updated = dishes.update(&vadonut.id, patch).await.unwrap();
        assert_eq!(updated.price, 1.5);
        assert_eq!(dishes.get(&vadonut.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn delete_removes_the_dish() {
        let dishes = repository().await;
        let dish = dishes.create(new_dish("Zucchipakoda")).await.unwrap();

        dishes.delete(&dish.id).await.unwrap();
        assert!(matches!(dishes.get(&dish.id).await, Err(AppError::NotFound { .. })));
        assert!(matches!(dishes.delete(&dish.id).await, Err(AppError::NotFound { .. })));
        assert!(dishes.list().await.unwrap().is_empty());
    }
}
