//! Append-only per-file activity log.

use std::fmt;
use std::str::FromStr;

use sqlx::SqlitePool;

use crate::db::SequenceRepository;
use crate::Result;

pub(crate) const ACTIVITY_SEQUENCE: &str = "activity";

/// What happened to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    /// File was uploaded.
    Upload,
    /// File content was downloaded by the owner.
    Download,
    /// File was renamed.
    Rename,
    /// A share link was minted.
    Share,
}

impl ActivityKind {
    /// Convert kind to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Upload => "upload",
            ActivityKind::Download => "download",
            ActivityKind::Rename => "rename",
            ActivityKind::Share => "share",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ActivityKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "upload" => Ok(ActivityKind::Upload),
            "download" => Ok(ActivityKind::Download),
            "rename" => Ok(ActivityKind::Rename),
            "share" => Ok(ActivityKind::Share),
            _ => Err(format!("unknown activity kind: {s}")),
        }
    }
}

// For #[sqlx(try_from = "String")] row mapping
impl TryFrom<String> for ActivityKind {
    type Error = String;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        s.parse()
    }
}

/// One activity entry.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ActivityEntry {
    /// Entry ID.
    pub id: i64,
    /// File the entry belongs to.
    pub file_id: i64,
    /// Acting user.
    pub user_id: i64,
    /// What happened.
    #[sqlx(try_from = "String")]
    pub kind: ActivityKind,
    /// Human-readable description.
    pub detail: String,
    /// When it happened.
    pub created_at: String,
}

/// Repository for activity log operations.
pub struct ActivityRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ActivityRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Append an entry.
    pub async fn log(
        &self,
        file_id: i64,
        user_id: i64,
        kind: ActivityKind,
        detail: &str,
    ) -> Result<()> {
        let id = SequenceRepository::new(self.pool)
            .next(ACTIVITY_SEQUENCE)
            .await?;

        sqlx::query(
            "INSERT INTO activity_logs (id, file_id, user_id, kind, detail)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(id)
        .bind(file_id)
        .bind(user_id)
        .bind(kind.as_str())
        .bind(detail)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// All entries for a file, newest first.
    pub async fn list_for_file(&self, file_id: i64) -> Result<Vec<ActivityEntry>> {
        let entries = sqlx::query_as::<_, ActivityEntry>(
            "SELECT id, file_id, user_id, kind, detail, created_at
             FROM activity_logs WHERE file_id = $1
             ORDER BY created_at DESC, id DESC",
        )
        .bind(file_id)
        .fetch_all(self.pool)
        .await?;

        Ok(entries)
    }
}
