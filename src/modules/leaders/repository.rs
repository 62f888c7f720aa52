use atrium_db::{Collection, Database};
use atrium_http::{AppError, AppResult};
use validator::Validate;

use super::models::{Leader, LeaderPatch, NewLeader};
use crate::utils::new_id;

pub const TABLE: &str = "leader";

#[derive(Clone)]
pub struct LeaderRepository {
    leaders: Collection,
}

impl LeaderRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            leaders: db.collection(TABLE),
        }
    }

    fn not_found() -> AppError {
        AppError::not_found("leader not found")
    }

    pub async fn create(&self, new: NewLeader) -> AppResult<Leader> {
        new.validate()?;

        let leader = new.into_leader(new_id());
        self.leaders.insert(&leader.id, &leader).await?;

        tracing::info!(leader_id = %leader.id, "leader created");
        Ok(leader)
    }

    pub async fn list(&self) -> AppResult<Vec<Leader>> {
        Ok(self.leaders.list().await?)
    }

    pub async fn get(&self, id: &str) -> AppResult<Leader> {
        self.leaders.get(id).await?.ok_or_else(Self::not_found)
    }

    pub async fn update(&self, id: &str, patch: LeaderPatch) -> AppResult<Leader> {
        let mut leader = self.get(id).await?;
        patch.apply(&mut leader)?;

        self.leaders.merge(id, &leader, &[]).await?;
        tracing::info!(leader_id = %id, "leader updated");

        self.get(id).await
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        if !self.leaders.exists(id).await? {
            return Err(Self::not_found());
        }
        self.leaders.delete(id).await?;

        tracing::info!(leader_id = %id, "leader deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::testing;
    use serde_json::json;

    #[tokio::test]
    async fn crud_round() {
        let leaders = LeaderRepository::new(&testing::database().await);
        let new: NewLeader = serde_json::from_value(json!({
            "name": "Agumbe Tang",
            "image": "images/alberto.png",
            "designation": "Chief Taste Officer",
            "abbr": "CTO",
            "description": "Blessed with the most discerning gustatory sense"
        }))
        .unwrap();

        let leader = leaders.create(new).await.unwrap();
        assert_eq!(leaders.get(&leader.id).await.unwrap(), leader);

        let patch: LeaderPatch =
            serde_json::from_value(json!({ "featured": true, "abbr": null })).unwrap();
        let updated = leaders.update(&leader.id, patch).await.unwrap();
        assert!(updated.featured);
        assert_eq!(updated.abbr, None);
        assert_eq!(updated.name, "Agumbe Tang");

        leaders.delete(&leader.id).await.unwrap();
        assert!(matches!(leaders.get(&leader.id).await, Err(AppError::NotFound { .. })));
        assert!(leaders.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_required_field_fails_validation() {
        let leaders = LeaderRepository::new(&testing::database().await);
        let new: NewLeader = serde_json::from_value(json!({
            "name": "",
            "image": "images/alberto.png",
            "designation": "Chef",
            "description": "x"
        }))
        .unwrap();

        assert!(matches!(leaders.create(new).await, Err(AppError::Validation { .. })));
    }
}
