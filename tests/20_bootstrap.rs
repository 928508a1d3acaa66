mod common;

use anyhow::Result;
use std::path::PathBuf;
use uuid::Uuid;

use tweets_api::app::AppState;
use tweets_api::auth::Role;

/// A throwaway database file, removed on drop.
struct TempDb {
    path: PathBuf,
}

impl TempDb {
    fn new() -> Self {
        let path = std::env::temp_dir().join(format!("tweets-api-test-{}.db", Uuid::new_v4().simple()));
        Self { path }
    }

    fn url(&self) -> String {
        format!("sqlite://{}?mode=rwc", self.path.display())
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm", "-journal"] {
            let _ = std::fs::remove_file(format!("{}{}", self.path.display(), suffix));
        }
    }
}

async fn state_on(db: &TempDb) -> Result<AppState> {
    let url = db.url();
    let config = common::test_config(&[("DATABASE_URL", url.as_str())])?;
    Ok(AppState::build(config).await?)
}

#[tokio::test]
async fn bootstrap_survives_restarts_without_touching_existing_rows() -> Result<()> {
    let db = TempDb::new();

    let first = state_on(&db).await?;
    let report = first.admin_service().bootstrap(&first.config.super_admins).await?;
    assert_eq!(report.created, vec![common::ROOT_EMAIL.to_string()]);
    let original = first.admins.find_by_email(common::ROOT_EMAIL).await?.expect("root row");
    first.db.close().await;

    // Second start with a different password for the same email.
    let url = db.url();
    let config = common::test_config(&[
        ("DATABASE_URL", url.as_str()),
        ("SUPER_ADMINS", r#"[{"email":"root@x.com","username":"root","password":"rotated"}]"#),
    ])?;
    let second = AppState::build(config).await?;
    let report = second.admin_service().bootstrap(&second.config.super_admins).await?;
    assert!(report.created.is_empty());
    assert_eq!(report.existing, vec![common::ROOT_EMAIL.to_string()]);

    let after = second.admins.find_by_email(common::ROOT_EMAIL).await?.expect("root row");
    assert_eq!(after.id, original.id);
    assert_eq!(after.password_hash, original.password_hash);
    assert_eq!(after.role, Role::SuperAdmin);

    assert!(second.admins.find_by_credentials("root", common::ROOT_PASSWORD).await.is_ok());
    assert!(second.admins.find_by_credentials("root", "rotated").await.is_err());
    second.db.close().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_bootstraps_create_exactly_one_identity() -> Result<()> {
    let db = TempDb::new();

    // Two independent pools stand in for two processes starting together.
    let states = vec![state_on(&db).await?, state_on(&db).await?];

    let runs = states.iter().cycle().take(8).map(|state| {
        let service = state.admin_service();
        let super_admins = state.config.super_admins.clone();
        tokio::spawn(async move { service.bootstrap(&super_admins).await })
    });
    let results = futures::future::join_all(runs).await;

    let mut created = 0;
    for result in results {
        let report = result??;
        created += report.created.len();
    }
    assert_eq!(created, 1);

    let admins = states[0].admins.list().await?;
    assert_eq!(admins.len(), 1);
    assert_eq!(admins[0].email, common::ROOT_EMAIL);

    for state in &states {
        state.db.close().await;
    }
    Ok(())
}
