//! Temporary databases for repository tests.

use std::sync::Arc;

use tempfile::TempDir;

use crate::db::{create_pool, init, run_migrations, spawn_writer, DbPool, WriteHandle};

pub struct TestDb {
    // Keeps the directory alive for the lifetime of the pool.
    _dir: TempDir,
    pub pool: Arc<DbPool>,
}

impl TestDb {
    /// Fresh migrated database in its own temp directory.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lendbook-test.db");
        let db_path = init(path.to_str().unwrap()).unwrap();
        let pool = create_pool(&db_path).unwrap();
        run_migrations(&pool).unwrap();
        Self { _dir: dir, pool }
    }

    /// Must be called from within a Tokio runtime.
    pub fn writer(&self) -> WriteHandle {
        spawn_writer((*self.pool).clone())
    }
}
