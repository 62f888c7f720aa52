use atrium_db::{Collection, Database};
use atrium_http::{AppError, AppResult};
use serde_json::{json, Map, Value};

use super::models::{distinct_ids, DishRef, Favorite, FavoriteView};
use crate::modules::dishes::{self, Dish};

pub const TABLE: &str = "favorite";

/// Per-user favorite dish sets, created on first add.
#[derive(Clone)]
pub struct FavoriteRepository {
    favorites: Collection,
    dishes: Collection,
}

impl FavoriteRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            favorites: db.collection(TABLE),
            dishes: db.collection(dishes::repository::TABLE),
        }
    }

    fn not_found() -> AppError {
        AppError::not_found("favorites not found")
    }

    async fn record(&self, user: &str) -> AppResult<Option<Favorite>> {
        Ok(self.favorites.get(user).await?)
    }

    async fn view(&self, favorite: Favorite) -> AppResult<FavoriteView> {
        let dishes: Vec<Dish> = self.dishes.get_many(&favorite.dishes).await?;
        Ok(FavoriteView {
            id: favorite.id,
            user: favorite.user,
            dishes,
        })
    }

    /// Merge `ids` into the user's set, creating the record when there is none.
    ///
    /// One upsert, so racing first adds for the same user all land in a single record.
    async fn union(&self, user: &str, ids: Vec<String>) -> AppResult<()> {
        let mut bindings = Map::new();
        bindings.insert("user".to_string(), Value::from(user));
        bindings.insert("dishes".to_string(), Value::from(ids));
        self.favorites
            .upsert_set(
                user,
                "user = $user, dishes = array::union(dishes ?? [], $dishes)",
                bindings,
            )
            .await?;
        Ok(())
    }

    pub async fn get(&self, user: &str) -> AppResult<FavoriteView> {
        let favorite = self.record(user).await?.ok_or_else(Self::not_found)?;
        self.view(favorite).await
    }

    /// Add every referenced dish not already present.
    ///
    /// All references must name existing dishes; otherwise nothing is written
    /// and the unknown ids are listed in the error.
    pub async fn add_many(&self, user: &str, refs: &[DishRef]) -> AppResult<FavoriteView> {
        let ids = distinct_ids(refs);

        let known: Vec<Dish> = self.dishes.get_many(&ids).await?;
        let unknown: Vec<Value> = ids
            .iter()
            .filter(|id| !known.iter().any(|dish| &dish.id == *id))
            .map(|id| json!({ "field": "dishes", "value": id, "error": "unknown dish" }))
            .collect();
        if !unknown.is_empty() {
            return Err(AppError::validation(unknown, "unknown dish ids"));
        }

        let existing = self.record(user).await?;
        let fresh: Vec<String> = match &existing {
            Some(favorite) => ids
                .into_iter()
                .filter(|id| !favorite.dishes.contains(id))
                .collect(),
            None => ids,
        };

        if !fresh.is_empty() {
            let added = fresh.len();
            self.union(user, fresh).await?;
            tracing::info!(user = %user, added, "favorites added");
        }

        self.get(user).await
    }

    pub async fn add_one(&self, user: &str, dish: &str) -> AppResult<FavoriteView> {
        if !self.dishes.exists(dish).await? {
            return Err(AppError::not_found("dish not found"));
        }

        if let Some(favorite) = self.record(user).await? {
            if favorite.dishes.iter().any(|id| id == dish) {
                return Err(AppError::conflict(
                    vec![json!({ "field": "dish", "value": dish })],
                    "already favorited",
                ));
            }
        }

        self.union(user, vec![dish.to_owned()]).await?;
        tracing::info!(user = %user, dish = %dish, "favorite added");

        self.get(user).await
    }

    pub async fn remove_one(&self, user: &str, dish: &str) -> AppResult<FavoriteView> {
        let favorite = self.record(user).await?.ok_or_else(Self::not_found)?;
        if !favorite.dishes.iter().any(|id| id == dish) {
            return Err(AppError::not_found("dish not in favorites"));
        }

        let mut bindings = Map::new();
        bindings.insert("dish".to_string(), Value::from(dish));
        self.favorites
            .update_set(user, "dishes = array::complement(dishes, [$dish])", bindings)
            .await?;
        tracing::info!(user = %user, dish = %dish, "favorite removed");

        self.get(user).await
    }

    /// Delete the user's record. Succeeds when there is none.
    pub async fn remove_all(&self, user: &str) -> AppResult<()> {
        self.favorites.delete(user).await?;
        tracing::info!(user = %user, "favorites cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::dishes::{models::NewDish, DishRepository};
    use crate::modules::testing;

    struct Fixture {
        favorites: FavoriteRepository,
        dishes: Vec<String>,
    }

    async fn fixture() -> Fixture {
        let db = testing::database().await;
        let repository = DishRepository::new(&db);

        let mut dishes = Vec::new();
        for name in ["Uthappizza", "Zucchipakoda", "Vadonut"] {
            let new: NewDish = serde_json::from_value(json!({
                "name": name,
                "image": "images/dish.png",
                "category": "mains",
                "price": 2.0,
                "description": "Tasty"
            }))
            .unwrap();
            dishes.push(repository.create(new).await.unwrap().id);
        }

        Fixture {
            favorites: FavoriteRepository::new(&db),
            dishes,
        }
    }

    fn refs(ids: &[&String]) -> Vec<DishRef> {
        ids.iter().map(|id| DishRef::Id((*id).clone())).collect()
    }

    fn ids(view: &FavoriteView) -> Vec<String> {
        let mut ids: Vec<String> = view.dishes.iter().map(|dish| dish.id.clone()).collect();
        ids.sort();
        ids
    }

    #[tokio::test]
    async fn add_many_is_a_set_union() {
        let Fixture { favorites, dishes } = fixture().await;
        let (d1, d2, d3) = (&dishes[0], &dishes[1], &dishes[2]);

        favorites.add_many("u1", &refs(&[d1, d2])).await.unwrap();
        let view = favorites.add_many("u1", &refs(&[d2, d3, d3])).await.unwrap();

        let mut expected = dishes.clone();
        expected.sort();
        assert_eq!(ids(&view), expected);
        assert_eq!(view.user, "u1");
    }

    #[tokio::test]
    async fn add_many_with_unknown_dish_writes_nothing() {
        let Fixture { favorites, dishes } = fixture().await;
        let ghost = "ghost".to_string();

        let err = favorites
            .add_many("u1", &refs(&[&dishes[0], &ghost]))
            .await
            .unwrap_err();
        match err {
            AppError::Validation { details, .. } => {
                assert_eq!(details.len(), 1);
                assert_eq!(details[0]["value"], "ghost");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(favorites.get("u1").await, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn add_one_rejects_duplicates_and_unknown_dishes() {
        let Fixture { favorites, dishes } = fixture().await;

        favorites.add_one("u1", &dishes[0]).await.unwrap();
        assert!(matches!(
            favorites.add_one("u1", &dishes[0]).await,
            Err(AppError::Conflict { .. })
        ));
        match favorites.add_one("u1", "ghost").await.unwrap_err() {
            AppError::NotFound { message, .. } => assert_eq!(message, "dish not found"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn remove_one_requires_membership() {
        let Fixture { favorites, dishes } = fixture().await;

        assert!(matches!(
            favorites.remove_one("u1", &dishes[0]).await,
            Err(AppError::NotFound { .. })
        ));

        favorites
            .add_many("u1", &refs(&[&dishes[0], &dishes[1]]))
            .await
            .unwrap();
        let view = favorites.remove_one("u1", &dishes[0]).await.unwrap();
        assert_eq!(ids(&view), vec![dishes[1].clone()]);

        assert!(matches!(
            favorites.remove_one("u1", &dishes[0]).await,
            Err(AppError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn remove_all_is_idempotent() {
        let Fixture { favorites, dishes } = fixture().await;
        favorites.add_one("u1", &dishes[2]).await.unwrap();

        favorites.remove_all("u1").await.unwrap();
        favorites.remove_all("u1").await.unwrap();
        assert!(matches!(favorites.get("u1").await, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn users_have_separate_sets() {
        let Fixture { favorites, dishes } = fixture().await;

        favorites.add_one("u1", &dishes[0]).await.unwrap();
        favorites.add_one("u2", &dishes[0]).await.unwrap();
        favorites.remove_all("u1").await.unwrap();

        assert_eq!(ids(&favorites.get("u2").await.unwrap()), vec![dishes[0].clone()]);
    }

    #[tokio::test]
    async fn first_adds_racing_for_one_user_share_a_record() {
        let Fixture { favorites, dishes } = fixture().await;

        let mut tasks = Vec::new();
        for user in 0..20 {
            for dish in dishes.clone() {
                let favorites = favorites.clone();
                let user = format!("racer-{user}");
                tasks.push(tokio::spawn(async move {
                    favorites.add_many(&user, &[DishRef::Id(dish)]).await
                }));
            }
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let mut expected = dishes.clone();
        expected.sort();
        for user in 0..20 {
            let view = favorites.get(&format!("racer-{user}")).await.unwrap();
            assert_eq!(view.id, format!("racer-{user}"));
            assert_eq!(ids(&view), expected);
        }
    }
}
