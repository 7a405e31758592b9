use anyhow::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, Row, Sqlite};

use crate::domain::comment::{Comment, SortMode};
use crate::infra::db::Db;

#[derive(Clone)]
pub struct CommentService {
    db: Db,
}

impl CommentService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub async fn list(&self, sort: SortMode) -> Result<Vec<Comment>> {
        let sql = format!(
            "SELECT id, author, text, date, likes, image FROM comments {}",
            sort.order_clause()
        );
        let rows = sqlx::query(&sql).fetch_all(self.db.pool()).await?;

        Ok(rows.iter().map(comment_from_row).collect())
    }

    pub async fn find(&self, comment_id: &str) -> Result<Option<Comment>> {
        let row = sqlx::query(
            "SELECT id, author, text, date, likes, image FROM comments WHERE id = ?",
        )
        .bind(comment_id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.as_ref().map(comment_from_row))
    }

    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments")
            .fetch_one(self.db.pool())
            .await?;
        Ok(count)
    }

    pub async fn create(&self, text: String) -> Result<Comment> {
        let comment = Comment::new(text)?;
        self.insert(&comment).await?;
        Ok(comment)
    }

    /// Replaces the text of an existing comment, keeping every other field.
    ///
    /// The row is first updated in place. If the store rejects the update, the
    /// modified record is written back by removing and reinserting it under the
    /// same id.
    pub async fn update_text(&self, comment_id: &str, text: String) -> Result<Option<Comment>> {
        let Some(existing) = self.find(comment_id).await? else {
            return Ok(None);
        };
        let updated = Comment { text, ..existing };

        match self.update_in_place(&updated).await {
            Ok(true) => Ok(Some(updated)),
            Ok(false) => Ok(None),
            Err(err) => {
                tracing::warn!(
                    error = ?err,
                    comment_id = %comment_id,
                    "in-place update failed, rewriting row"
                );
                if self.rewrite(&updated).await? {
                    Ok(Some(updated))
                } else {
                    Ok(None)
                }
            }
        }
    }

    pub async fn delete(&self, comment_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(comment_id)
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_in_place(&self, comment: &Comment) -> Result<bool> {
        let result = sqlx::query("UPDATE comments SET text = ? WHERE id = ?")
            .bind(&comment.text)
            .bind(&comment.id)
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Removes and reinserts the row in one transaction. Returns `false`, with
    /// nothing written, when the row is already gone.
    async fn rewrite(&self, comment: &Comment) -> Result<bool> {
        let mut tx = self.db.pool().begin().await?;

        let removed = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(&comment.id)
            .execute(&mut *tx)
            .await?;
        if removed.rows_affected() != 1 {
            tx.rollback().await?;
            return Ok(false);
        }

        insert_row(&mut *tx, comment).await?;
        tx.commit().await?;
        Ok(true)
    }

    async fn insert(&self, comment: &Comment) -> Result<()> {
        insert_row(self.db.pool(), comment).await
    }
}

async fn insert_row<'c, E>(executor: E, comment: &Comment) -> Result<()>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query(
        "INSERT INTO comments (id, author, text, date, likes, image) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&comment.id)
    .bind(&comment.author)
    .bind(&comment.text)
    .bind(&comment.date)
    .bind(comment.likes)
    .bind(&comment.image)
    .execute(executor)
    .await?;
    Ok(())
}

fn comment_from_row(row: &SqliteRow) -> Comment {
    Comment {
        id: row.get("id"),
        author: row.get("author"),
        text: row.get("text"),
        date: row.get("date"),
        likes: row.get("likes"),
        image: row.get("image"),
    }
}
