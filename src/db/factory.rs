//! Repository factory for backend selection at startup.

use std::str::FromStr;
use std::sync::Arc;

use crate::db::repository::{FullRepository, RepositoryError, RepositoryResult};

#[cfg(feature = "local-repo")]
use crate::db::repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
use crate::db::repositories::{PostgresConfig, PostgresRepository};

/// Which repository backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// In-memory repository, data lost on restart
    Local,
    /// Postgres repository
    Postgres,
}

impl FromStr for RepositoryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" | "memory" | "in-memory" => Ok(Self::Local),
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            other => Err(format!("Unknown repository type '{}'", other)),
        }
    }
}

impl RepositoryType {
    /// Resolve the backend from the environment.
    ///
    /// `REPOSITORY_TYPE` wins when set. Otherwise Postgres is chosen when a
    /// database is configured (`DATABASE_URL` or `DB_HOST`), falling back to
    /// the in-memory repository.
    pub fn from_env() -> Result<Self, String> {
        if let Ok(value) = std::env::var("REPOSITORY_TYPE") {
            return value.parse();
        }
        if std::env::var("DATABASE_URL").is_ok() || std::env::var("DB_HOST").is_ok() {
            Ok(Self::Postgres)
        } else {
            Ok(Self::Local)
        }
    }
}

/// Creates repository instances.
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create a repository of the given type.
    pub fn create(repo_type: RepositoryType) -> RepositoryResult<Arc<dyn FullRepository>> {
        match repo_type {
            RepositoryType::Local => Self::create_local(),
            RepositoryType::Postgres => Self::create_postgres(),
        }
    }

    /// Create a repository based on environment configuration.
    pub fn from_env() -> RepositoryResult<Arc<dyn FullRepository>> {
        let repo_type = RepositoryType::from_env().map_err(RepositoryError::configuration)?;
        Self::create(repo_type)
    }

    #[cfg(feature = "local-repo")]
    pub fn create_local() -> RepositoryResult<Arc<dyn FullRepository>> {
        Ok(Arc::new(LocalRepository::new()))
    }

    #[cfg(not(feature = "local-repo"))]
    pub fn create_local() -> RepositoryResult<Arc<dyn FullRepository>> {
        Err(RepositoryError::configuration(
            "Local repository support not compiled in (enable the 'local-repo' feature)",
        ))
    }

    #[cfg(feature = "postgres-repo")]
    pub fn create_postgres() -> RepositoryResult<Arc<dyn FullRepository>> {
        let config = PostgresConfig::from_env().map_err(RepositoryError::configuration)?;
        Ok(Arc::new(PostgresRepository::new(config)?))
    }

    #[cfg(not(feature = "postgres-repo"))]
    pub fn create_postgres() -> RepositoryResult<Arc<dyn FullRepository>> {
        Err(RepositoryError::configuration(
            "Postgres support not compiled in (enable the 'postgres-repo' feature)",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_repository_type() {
        assert_eq!("local".parse::<RepositoryType>(), Ok(RepositoryType::Local));
        assert_eq!(
            "Postgres".parse::<RepositoryType>(),
            Ok(RepositoryType::Postgres)
        );
        assert!("sqlite".parse::<RepositoryType>().is_err());
    }
}
