use log::*;
use sqlx::{migrate::MigrateDatabase, Sqlite};

use crate::SqliteDatabase;

/// Creates an empty database at `url` (dropping any previous one) and brings its schema up to date.
pub async fn prepare_test_env(url: &str) {
    #[cfg(feature = "test_utils")]
    {
        dotenvy::from_filename(".env.test").ok();
        let _ = env_logger::try_init();
        debug!("🚀️ Logging initialised");
    }
    create_database(url).await;
    run_migrations(url).await;
}

/// A fresh database url in the system temp directory.
pub fn random_db_path() -> String {
    let dir = std::env::temp_dir();
    format!("sqlite://{}/bazaar_test_{}.db", dir.display(), rand::random::<u64>())
}

pub async fn run_migrations(url: &str) {
    let db = SqliteDatabase::new_with_url(url, 1).await.expect("Error creating connection to database");
    db.run_migrations().await.expect("Error running DB migrations");
    info!("🚀️ Migrations complete");
}

pub async fn create_database(url: &str) {
    if let Err(e) = Sqlite::drop_database(url).await {
        trace!("Could not drop database {url}: {e:?}");
    }
    Sqlite::create_database(url).await.expect("Error creating database");
    info!("Created Sqlite database {url}");
}
