//! Tests for backend selection: environment, `repository.toml`, and the
//! server settings that sit beside it.

mod support;

use std::io::Write;
use std::str::FromStr;

use pizzeria::config::ServerConfig;
use pizzeria::db::{
    PizzaRepository, RepositoryConfig, RepositoryError, RepositoryFactory, RepositoryType,
    RestaurantRepository,
};
use support::{with_repository_env, with_scoped_env};

#[test]
fn test_repository_type_from_str() {
    assert_eq!(
        RepositoryType::from_str("POSTGRES").unwrap(),
        RepositoryType::Postgres
    );
    assert_eq!(RepositoryType::from_str("pg").unwrap(), RepositoryType::Postgres);
    assert_eq!(RepositoryType::from_str("Local").unwrap(), RepositoryType::Local);

    let err = RepositoryType::from_str("sqlite").unwrap_err();
    assert!(err.contains("Unknown repository type"));
}

#[test]
fn test_repository_type_defaults_to_local() {
    with_repository_env(&[], || {
        assert_eq!(RepositoryType::from_env(), RepositoryType::Local);
    });
}

#[test]
fn test_repository_type_follows_database_urls() {
    for key in ["DATABASE_URL", "PG_DATABASE_URL", "DB_URI"] {
        with_repository_env(&[(key, "postgres://localhost/pizzeria")], || {
            assert_eq!(RepositoryType::from_env(), RepositoryType::Postgres, "{}", key);
        });
    }
}

#[test]
fn test_explicit_repository_type_wins() {
    with_repository_env(
        &[
            ("REPOSITORY_TYPE", "local"),
            ("DATABASE_URL", "postgres://localhost/pizzeria"),
        ],
        || {
            assert_eq!(RepositoryType::from_env(), RepositoryType::Local);
        },
    );
}

#[test]
fn test_unparseable_repository_type_falls_back_to_local() {
    with_repository_env(&[("REPOSITORY_TYPE", "cassandra")], || {
        assert_eq!(RepositoryType::from_env(), RepositoryType::Local);
    });
}

#[test]
fn test_factory_from_env_builds_local() {
    let repo = with_repository_env(&[("REPOSITORY_TYPE", "local")], || {
        tokio::runtime::Runtime::new()
            .unwrap()
            .block_on(RepositoryFactory::from_env())
    })
    .unwrap();

    let healthy = tokio::runtime::Runtime::new()
        .unwrap()
        .block_on(repo.health_check())
        .unwrap();
    assert!(healthy);
}

#[tokio::test]
async fn test_factory_from_config_file_local() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[repository]\ntype = \"local\"").unwrap();

    let repo = RepositoryFactory::from_config_file(file.path()).await.unwrap();
    assert!(repo.list_pizzas().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_factory_from_missing_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = RepositoryFactory::from_config_file(dir.path().join("repository.toml"))
        .await
        .err()
        .unwrap();
    assert!(matches!(err, RepositoryError::ConfigurationError { .. }));
    assert!(err.message().contains("Failed to read config file"));
}

#[test]
fn test_config_file_with_invalid_toml() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[repository\ntype = ").unwrap();

    let err = RepositoryConfig::from_file(file.path()).unwrap_err();
    assert!(err.message().contains("Failed to parse config file"));
}

#[cfg(not(feature = "postgres-repo"))]
#[tokio::test]
async fn test_postgres_config_file_without_feature() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[repository]\ntype = \"postgres\"\n\n[postgres]\ndatabase_url = \"postgres://x\""
    )
    .unwrap();

    let err = RepositoryFactory::from_config_file(file.path())
        .await
        .err()
        .unwrap();
    assert!(err.message().contains("feature not enabled"));
}

#[test]
fn test_server_config_from_env() {
    with_scoped_env(
        &[
            ("HOST", Some("127.0.0.1")),
            ("PORT", Some("6001")),
            ("SEED_DEMO_DATA", Some("1")),
        ],
        || {
            let config = ServerConfig::from_env().unwrap();
            assert_eq!(config.socket_addr().to_string(), "127.0.0.1:6001");
            assert!(config.seed_demo_data);
        },
    );
}

#[test]
fn test_server_config_defaults() {
    with_scoped_env(
        &[("HOST", None), ("PORT", None), ("SEED_DEMO_DATA", None)],
        || {
            let config = ServerConfig::from_env().unwrap();
            assert_eq!(config.port, 5555);
            assert!(!config.seed_demo_data);
        },
    );
}
