use anyhow::{Context, Result};
use std::io::ErrorKind;
use std::path::Path;

use crate::domain::comment::{Comment, CommentFixture};
use crate::infra::db::Db;

pub const COMMENTS_TABLE: &str = "comments";

const CREATE_COMMENTS_TABLE: &str = "CREATE TABLE comments ( \
        id TEXT NOT NULL PRIMARY KEY, \
        author TEXT NOT NULL, \
        text TEXT NOT NULL, \
        date TEXT NOT NULL, \
        likes INTEGER NOT NULL, \
        image TEXT NOT NULL \
     )";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bootstrap {
    AlreadyExists,
    Seeded(usize),
    CreatedEmpty,
}

/// Creates the `comments` table on first start, seeding it from the fixture
/// file when one is present. An existing table is left untouched.
pub async fn ensure_comments_table(db: &Db, fixture_path: &Path) -> Result<Bootstrap> {
    if table_exists(db, COMMENTS_TABLE).await? {
        tracing::info!(table = COMMENTS_TABLE, "table already exists");
        return Ok(Bootstrap::AlreadyExists);
    }

    let fixture = load_fixture(fixture_path).await?;

    let mut tx = db.pool().begin().await?;
    sqlx::query(CREATE_COMMENTS_TABLE).execute(&mut *tx).await?;

    let outcome = match fixture {
        Some(fixture) => {
            for comment in &fixture.comments {
                insert_seed_row(&mut tx, comment).await.with_context(|| {
                    format!("failed to seed comment {}", comment.id)
                })?;
            }
            Bootstrap::Seeded(fixture.comments.len())
        }
        None => Bootstrap::CreatedEmpty,
    };
    tx.commit().await?;

    match outcome {
        Bootstrap::Seeded(count) => tracing::info!(
            table = COMMENTS_TABLE,
            records = count,
            fixture = %fixture_path.display(),
            "table created from fixture"
        ),
        _ => tracing::info!(
            table = COMMENTS_TABLE,
            fixture = %fixture_path.display(),
            "fixture not found, created empty table"
        ),
    }

    Ok(outcome)
}

async fn table_exists(db: &Db, name: &str) -> Result<bool> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?")
            .bind(name)
            .fetch_one(db.pool())
            .await?;
    Ok(count > 0)
}

async fn load_fixture(path: &Path) -> Result<Option<CommentFixture>> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read {}", path.display()))
        }
    };

    let fixture = serde_json::from_str(&raw)
        .with_context(|| format!("malformed fixture {}", path.display()))?;
    Ok(Some(fixture))
}

async fn insert_seed_row(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    comment: &Comment,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO comments (id, author, text, date, likes, image) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&comment.id)
    .bind(&comment.author)
    .bind(&comment.text)
    .bind(&comment.date)
    .bind(comment.likes)
    .bind(&comment.image)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
