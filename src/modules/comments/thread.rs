use atrium_authz::ensure_owner;
use atrium_db::{Collection, Database};
use atrium_http::{AppError, AppResult};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Map, Value};
use validator::Validate;

use super::models::{Comment, CommentPatch, NewComment};
use crate::utils::new_id;

#[derive(Deserialize)]
struct Parent {
    #[serde(default)]
    comments: Vec<Comment>,
}

/// Guard for writes to a single comment; the author never changes
const OWNED_BY_ACTOR: &str = "comments[WHERE id = $comment_id].author CONTAINS $actor";

/// Comment sequence embedded in the documents of one table.
///
/// Every write is a single statement against the parent document. Updates
/// and deletes re-check ownership inside that statement.
#[derive(Clone)]
pub struct CommentThread {
    parents: Collection,
    /// Parent noun used in not-found messages, e.g. `book`
    parent: &'static str,
}

fn ownership(comment_id: &str, actor: &str) -> Map<String, Value> {
    let mut bindings = Map::new();
    bindings.insert("comment_id".to_string(), Value::from(comment_id));
    bindings.insert("actor".to_string(), Value::from(actor));
    bindings
}

impl CommentThread {
    pub fn new(db: &Database, table: &'static str, parent: &'static str) -> Self {
        Self {
            parents: db.collection(table),
            parent,
        }
    }

    fn parent_not_found(&self) -> AppError {
        AppError::not_found(format!("{} not found", self.parent))
    }

    async fn load(&self, parent_id: &str) -> AppResult<Vec<Comment>> {
        self.parents
            .get::<Parent>(parent_id)
            .await?
            .map(|parent| parent.comments)
            .ok_or_else(|| self.parent_not_found())
    }

    async fn ensure_parent(&self, parent_id: &str) -> AppResult<()> {
        if self.parents.exists(parent_id).await? {
            Ok(())
        } else {
            Err(self.parent_not_found())
        }
    }

    pub async fn list(&self, parent_id: &str) -> AppResult<Vec<Comment>> {
        self.load(parent_id).await
    }

    /// Append a comment written by `author`; the date is server time.
    pub async fn add(&self, parent_id: &str, author: &str, new: NewComment) -> AppResult<Comment> {
        new.validate()?;
        self.ensure_parent(parent_id).await?;

        let comment = Comment {
            id: new_id(),
            rating: new.rating,
            comment: new.comment,
            author: author.to_owned(),
            date: Utc::now(),
        };

        let mut bindings = Map::new();
        bindings.insert(
            "comment".to_string(),
            serde_json::to_value(&comment).map_err(AppError::internal)?,
        );
        self.parents
            .update_set(
                parent_id,
                "comments = array::append(comments ?? [], $comment)",
                bindings,
            )
            .await?;

        tracing::info!(
            parent = self.parent,
            parent_id = %parent_id,
            comment_id = %comment.id,
            "comment added"
        );
        Ok(comment)
    }

    /// Update a comment. Parent, then comment, then ownership are checked in that order.
    ///
    /// Only the target element is written, and only while it still belongs to
    /// `actor`, so comments appended concurrently survive.
    pub async fn update(
        &self,
        parent_id: &str,
        comment_id: &str,
        actor: &str,
        patch: CommentPatch,
    ) -> AppResult<Comment> {
        let mut target = self.owned(parent_id, comment_id, actor).await?;
        patch.apply(&mut target)?;

        let mut bindings = ownership(comment_id, actor);
        bindings.insert(
            "updated".to_string(),
            serde_json::to_value(&target).map_err(AppError::internal)?,
        );
        let written = self
            .parents
            .update_set_if(
                parent_id,
                "comments[WHERE id = $comment_id] = $updated",
                OWNED_BY_ACTOR,
                bindings,
            )
            .await?;
        if !written {
            return Err(self.vanished(parent_id).await);
        }

        tracing::info!(parent = self.parent, parent_id = %parent_id, comment_id = %comment_id, "comment updated");
        Ok(target)
    }

    pub async fn delete(&self, parent_id: &str, comment_id: &str, actor: &str) -> AppResult<()> {
        self.owned(parent_id, comment_id, actor).await?;

        let removed = self
            .parents
            .update_set_if(
                parent_id,
                "comments = comments[WHERE id != $comment_id]",
                OWNED_BY_ACTOR,
                ownership(comment_id, actor),
            )
            .await?;
        if !removed {
            return Err(self.vanished(parent_id).await);
        }

        tracing::info!(parent = self.parent, parent_id = %parent_id, comment_id = %comment_id, "comment deleted");
        Ok(())
    }

    /// The comment `comment_id`, provided `actor` wrote it.
    async fn owned(&self, parent_id: &str, comment_id: &str, actor: &str) -> AppResult<Comment> {
        let target = self
            .load(parent_id)
            .await?
            .into_iter()
            .find(|comment| comment.id == comment_id)
            .ok_or_else(|| AppError::not_found("comment not found"))?;

        ensure_owner(actor, &target.author)?;
        Ok(target)
    }

    /// Error for a guarded write that matched nothing: the parent or the
    /// comment was removed after the ownership check.
    async fn vanished(&self, parent_id: &str) -> AppError {
        match self.ensure_parent(parent_id).await {
            Ok(()) => AppError::not_found("comment not found"),
            Err(err) => err,
        }
    }

    /// Remove every comment of the parent. Clearing an empty sequence succeeds.
    pub async fn clear(&self, parent_id: &str) -> AppResult<()> {
        self.ensure_parent(parent_id).await?;
        self.parents
            .update_set(parent_id, "comments = []", Map::new())
            .await?;

        tracing::info!(parent = self.parent, parent_id = %parent_id, "comments cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn thread_with_parent() -> (CommentThread, String) {
        let db = Database::in_memory().await.unwrap();
        let thread = CommentThread::new(&db, "dish", "dish");
        db.collection("dish")
            .insert("d1", &json!({ "name": "Uthappizza", "comments": [] }))
            .await
            .unwrap();
        (thread, "d1".to_string())
    }

    fn new_comment(rating: u8, text: &str) -> NewComment {
        NewComment {
            rating,
            comment: text.to_string(),
        }
    }

    #[tokio::test]
    async fn comments_keep_insertion_order() {
        let (thread, dish) = thread_with_parent().await;

        let first = thread.add(&dish, "alice", new_comment(5, "first")).await.unwrap();
        let second = thread.add(&dish, "bob", new_comment(3, "second")).await.unwrap();

        let comments = thread.list(&dish).await.unwrap();
        assert_eq!(comments, vec![first, second]);
    }

    #[tokio::test]
    async fn missing_parent_is_not_found() {
        let (thread, _) = thread_with_parent().await;

        let err = thread
            .add("ghost", "alice", new_comment(5, "hi"))
            .await
            .unwrap_err();
        match err {
            AppError::NotFound { message, .. } => assert_eq!(message, "dish not found"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            thread.list("ghost").await,
            Err(AppError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn only_the_author_can_change_a_comment() {
        let (thread, dish) = thread_with_parent().await;
        let comment = thread.add(&dish, "alice", new_comment(4, "ok")).await.unwrap();

        let patch = CommentPatch {
            rating: Some(Some(1)),
            comment: None,
        };
        let err = thread
            .update(&dish, &comment.id, "bob", patch.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden { .. }));
        assert!(matches!(
            thread.delete(&dish, &comment.id, "bob").await,
            Err(AppError::Forbidden { .. })
        ));

        let updated = thread
            .update(&dish, &comment.id, "alice", patch)
            .await
            .unwrap();
        assert_eq!(updated.rating, 1);
        assert_eq!(thread.list(&dish).await.unwrap(), vec![updated]);

        thread.delete(&dish, &comment.id, "alice").await.unwrap();
        assert!(thread.list(&dish).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_comment_is_reported_before_ownership() {
        let (thread, dish) = thread_with_parent().await;

        let err = thread.delete(&dish, "nope", "bob").await.unwrap_err();
        match err {
            AppError::NotFound { message, .. } => assert_eq!(message, "comment not found"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn clear_is_idempotent() {
        let (thread, dish) = thread_with_parent().await;
        thread.add(&dish, "alice", new_comment(2, "meh")).await.unwrap();

        thread.clear(&dish).await.unwrap();
        thread.clear(&dish).await.unwrap();
        assert!(thread.list(&dish).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn editing_a_comment_keeps_concurrent_additions() {
        let (thread, dish) = thread_with_parent().await;
        let own = thread.add(&dish, "alice", new_comment(3, "fine")).await.unwrap();

        let mut added = Vec::new();
        for round in 0..20u8 {
            let patch = CommentPatch {
                rating: Some(Some(round % 5 + 1)),
                comment: None,
            };
            let (edit, addition) = tokio::join!(
                thread.update(&dish, &own.id, "alice", patch),
                thread.add(&dish, "bob", new_comment(4, &format!("round {round}"))),
            );
            edit.unwrap();
            added.push(addition.unwrap().id);
        }

        let comments = thread.list(&dish).await.unwrap();
        assert_eq!(comments.len(), added.len() + 1);
        for id in &added {
            assert!(comments.iter().any(|c| &c.id == id), "lost comment {id}");
        }
        let edited = comments.iter().find(|c| c.id == own.id).unwrap();
        assert_eq!(edited.author, "alice");
        assert_eq!(edited.comment, "fine");
        assert_eq!(edited.rating, 19 % 5 + 1);
    }

    #[tokio::test]
    async fn deleted_comment_cannot_be_updated() {
        let (thread, dish) = thread_with_parent().await;
        let comment = thread.add(&dish, "alice", new_comment(4, "ok")).await.unwrap();
        let other = thread.add(&dish, "bob", new_comment(2, "hm")).await.unwrap();

        thread.delete(&dish, &comment.id, "alice").await.unwrap();
        let err = thread
            .update(&dish, &comment.id, "alice", CommentPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
        assert_eq!(thread.list(&dish).await.unwrap(), vec![other]);
    }
}
