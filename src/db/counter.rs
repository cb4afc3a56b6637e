//! Per-kind id sequences.
//!
//! Entity ids are allocated from the `counters` table instead of
//! AUTOINCREMENT, so an id can be reserved before the row it names exists
//! (a file row is only written after the remote upload succeeds).

use super::DbPool;
use crate::Result;

/// Repository for id sequence allocation.
pub struct SequenceRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> SequenceRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Allocate the next id for an entity kind.
    ///
    /// The increment happens in a single SQL statement, so two concurrent
    /// callers can never observe the same value.
    pub async fn next(&self, kind: &str) -> Result<i64> {
        let value: i64 = sqlx::query_scalar(
            "INSERT INTO counters (kind, value) VALUES ($1, 1)
             ON CONFLICT(kind) DO UPDATE SET value = value + 1
             RETURNING value",
        )
        .bind(kind)
        .fetch_one(self.pool)
        .await?;

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    #[tokio::test]
    async fn test_next_starts_at_one() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = SequenceRepository::new(db.pool());

        assert_eq!(repo.next("file").await.unwrap(), 1);
        assert_eq!(repo.next("file").await.unwrap(), 2);
        assert_eq!(repo.next("file").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_kinds_are_independent() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = SequenceRepository::new(db.pool());

        assert_eq!(repo.next("file").await.unwrap(), 1);
        assert_eq!(repo.next("folder").await.unwrap(), 1);
        assert_eq!(repo.next("file").await.unwrap(), 2);
        assert_eq!(repo.next("folder").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_counter_row_tracks_last_allocation() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = SequenceRepository::new(db.pool());

        repo.next("file").await.unwrap();
        repo.next("file").await.unwrap();

        let value: i64 = sqlx::query_scalar("SELECT value FROM counters WHERE kind = 'file'")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(value, 2);
    }
}
