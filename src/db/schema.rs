//! Database schema and migrations for ChatVault.
//!
//! This module contains all database migrations that will be applied
//! sequentially when the database is first opened or upgraded.

/// Database migrations.
///
/// Each migration is a SQL script that will be executed in order.
/// The schema_version table tracks which migrations have been applied.
pub const MIGRATIONS: &[&str] = &[
    // v1: Users and id counters
    r#"
-- Users arrive pre-verified from a chat platform's login flow.
-- One row per (platform, external_id) pair, refreshed on every login.
CREATE TABLE users (
    id           INTEGER PRIMARY KEY,
    platform     TEXT NOT NULL,            -- 'telegram' or 'discord'
    external_id  TEXT NOT NULL,            -- platform-side user id
    username     TEXT NOT NULL,
    first_name   TEXT,
    last_name    TEXT,
    auth_date    TEXT NOT NULL DEFAULT (datetime('now')),
    created_at   TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE(platform, external_id)
);

CREATE INDEX idx_users_platform_external ON users(platform, external_id);

-- One row per entity kind; values are bumped atomically with
-- INSERT ... ON CONFLICT DO UPDATE ... RETURNING.
CREATE TABLE counters (
    kind   TEXT PRIMARY KEY,
    value  INTEGER NOT NULL DEFAULT 0
);
"#,
    // v2: Sessions (opaque bearer tokens)
    r#"
CREATE TABLE sessions (
    token       TEXT PRIMARY KEY,
    user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at  TEXT NOT NULL DEFAULT (datetime('now')),
    expires_at  TEXT NOT NULL
);

CREATE INDEX idx_sessions_user_id ON sessions(user_id);
CREATE INDEX idx_sessions_expires_at ON sessions(expires_at);
"#,
    // v3: Folders
    r#"
-- parent_id is NULL for root-level folders. Ids come from counters,
-- not autoincrement.
CREATE TABLE folders (
    id          INTEGER PRIMARY KEY,
    owner_id    INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    name        TEXT NOT NULL,
    parent_id   INTEGER REFERENCES folders(id),
    created_at  TEXT NOT NULL DEFAULT (datetime('now')),
    modified_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_folders_owner_id ON folders(owner_id);
CREATE INDEX idx_folders_parent_id ON folders(parent_id);
"#,
    // v4: Files
    r#"
-- remote_blob_id / remote_message_id locate the blob on the chat platform.
-- Rows exist only after the remote upload succeeded.
CREATE TABLE files (
    id                 INTEGER PRIMARY KEY,
    owner_id           INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    name               TEXT NOT NULL,
    size               INTEGER NOT NULL,
    category           TEXT NOT NULL,       -- 'photo', 'video', 'document'
    platform           TEXT NOT NULL,
    remote_blob_id     TEXT NOT NULL,
    remote_message_id  TEXT NOT NULL,
    folder_id          INTEGER REFERENCES folders(id),
    uploaded_at        TEXT NOT NULL DEFAULT (datetime('now')),
    modified_at        TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_files_owner_id ON files(owner_id);
CREATE INDEX idx_files_folder_id ON files(folder_id);
"#,
    // v5: Share links
    r#"
-- file_name is a snapshot taken at share time; later renames do not
-- retitle existing links. Ids come from counters.
CREATE TABLE share_links (
    id          INTEGER PRIMARY KEY,
    file_id     INTEGER NOT NULL REFERENCES files(id) ON DELETE CASCADE,
    owner_id    INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    file_name   TEXT NOT NULL,
    token       TEXT NOT NULL UNIQUE,
    created_at  TEXT NOT NULL DEFAULT (datetime('now')),
    expires_at  TEXT NOT NULL
);

CREATE INDEX idx_share_links_token ON share_links(token);
CREATE INDEX idx_share_links_expires_at ON share_links(expires_at);
"#,
    // v6: Activity log
    r#"
-- Append-only. Rows are removed only when their file is removed.
-- Ids come from counters.
CREATE TABLE activity_logs (
    id          INTEGER PRIMARY KEY,
    file_id     INTEGER NOT NULL REFERENCES files(id) ON DELETE CASCADE,
    user_id     INTEGER NOT NULL REFERENCES users(id),
    kind        TEXT NOT NULL,              -- 'upload', 'download', 'rename', 'share'
    detail      TEXT NOT NULL,
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_activity_logs_file_id ON activity_logs(file_id);
CREATE INDEX idx_activity_logs_created_at ON activity_logs(created_at);
"#,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_not_empty() {
        assert!(!MIGRATIONS.is_empty());
    }

    #[test]
    fn test_first_migration_contains_users_and_counters() {
        let first = MIGRATIONS[0];
        assert!(first.contains("CREATE TABLE users"));
        assert!(first.contains("UNIQUE(platform, external_id)"));
        assert!(first.contains("CREATE TABLE counters"));
    }

    #[test]
    fn test_migrations_are_valid_sql() {
        // Each migration should be non-empty and contain SQL keywords
        for migration in MIGRATIONS {
            assert!(!migration.trim().is_empty());
            assert!(
                migration.contains("CREATE TABLE")
                    || migration.contains("ALTER TABLE")
                    || migration.contains("CREATE INDEX")
            );
        }
    }

    #[test]
    fn test_sessions_migration() {
        let sessions = MIGRATIONS[1];
        assert!(sessions.contains("CREATE TABLE sessions"));
        assert!(sessions.contains("token"));
        assert!(sessions.contains("expires_at"));
    }

    #[test]
    fn test_files_migration_contains_remote_columns() {
        let files = MIGRATIONS[3];
        assert!(files.contains("CREATE TABLE files"));
        assert!(files.contains("remote_blob_id"));
        assert!(files.contains("remote_message_id"));
        assert!(files.contains("category"));
        assert!(files.contains("folder_id"));
    }

    #[test]
    fn test_share_links_migration_snapshots_name() {
        let shares = MIGRATIONS[4];
        assert!(shares.contains("CREATE TABLE share_links"));
        assert!(shares.contains("file_name"));
        assert!(shares.contains("token"));
        assert!(shares.contains("UNIQUE"));
    }

    #[test]
    fn test_activity_logs_migration() {
        let activity = MIGRATIONS[5];
        assert!(activity.contains("CREATE TABLE activity_logs"));
        assert!(activity.contains("kind"));
        assert!(activity.contains("detail"));
    }

    #[test]
    fn test_no_table_uses_autoincrement() {
        // Entity ids are allocated from the counters table
        for migration in MIGRATIONS {
            assert!(!migration.contains("AUTOINCREMENT"));
        }
    }
}
