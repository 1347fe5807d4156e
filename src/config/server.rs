use error_stack::{Report, Result, ResultExt};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::num::{NonZeroU32, NonZeroU64};
use validator::{Validate, ValidateError};

use super::ParseError;
use crate::util::figment::FigmentErrorAttachable;
use crate::util::validator::IntoValidatorReport;
use crate::util::Sensitive;

#[derive(Debug, Deserialize)]
pub struct Server {
    /// Address the HTTP server binds to.
    #[serde(default = "Server::default_ip")]
    pub ip: IpAddr,
    #[serde(default = "Server::default_port")]
    pub port: u16,
    /// Actix worker threads.
    #[serde(default = "Server::default_workers")]
    pub workers: usize,
    pub db: super::Database,
    /// Secret used to verify bearer tokens minted by the auth
    /// collaborator (and by `quill token`).
    pub jwt_secret: Sensitive<String>,
    /// Fixed page size shared by every feed view.
    ///
    /// **Environment variables**:
    /// - `QUILL_POSTS_PER_PAGE`
    #[serde(default = "Server::default_posts_per_page")]
    pub posts_per_page: NonZeroU32,
    /// How long a rendered home feed page may be served before it
    /// expires. Writes do not invalidate the cache.
    ///
    /// **Environment variables**:
    /// - `QUILL_HOME_CACHE_TTL_SECS`
    #[serde(default = "Server::default_home_cache_ttl_secs")]
    pub home_cache_ttl_secs: NonZeroU64,
}

impl Validate for Server {
    fn validate(&self) -> std::result::Result<(), ValidateError> {
        let mut fields = ValidateError::field_builder();
        fields.insert("jwt_secret", {
            let mut error = ValidateError::msg_builder();
            if self.jwt_secret.len() < 12 || self.jwt_secret.len() > 1024 {
                error.insert("Invalid JWT secret key");
            }
            error.build()
        });

        if let Err(error) = self.db.validate() {
            fields.insert("db", error);
        }

        fields.build().into_result()
    }
}

impl Server {
    pub fn load() -> Result<Self, ParseError> {
        dotenvy::dotenv().ok();

        let config = Self::figment()
            .extract::<Self>()
            .map_err(|e| Report::new(ParseError).attach_figment_error(e))?;

        config
            .validate()
            .into_validator_report()
            .change_context(ParseError)?;

        Ok(config)
    }
}

impl Server {
    const DEFAULT_CONFIG_FILE: &'static str = "quill.toml";

    const fn default_ip() -> IpAddr {
        IpAddr::V4(Ipv4Addr::LOCALHOST)
    }

    const fn default_port() -> u16 {
        8000
    }

    fn default_workers() -> usize {
        std::thread::available_parallelism()
            .map(std::num::NonZeroUsize::get)
            .unwrap_or(1)
    }

    const fn default_posts_per_page() -> NonZeroU32 {
        match NonZeroU32::new(10) {
            Some(n) => n,
            None => panic!("default page size is accidentally set to 0"),
        }
    }

    const fn default_home_cache_ttl_secs() -> NonZeroU64 {
        match NonZeroU64::new(20) {
            Some(n) => n,
            None => panic!("default cache TTL is accidentally set to 0"),
        }
    }

    /// Creates a default [`figment::Figment`] object to load
    /// server configuration. Split out of [`Server::load`] for
    /// testing.
    pub(crate) fn figment() -> figment::Figment {
        use figment::providers::{Env, Format, Toml};
        use figment::Figment;

        Figment::new()
            .merge(Toml::file(Self::DEFAULT_CONFIG_FILE))
            // One big con about figment (env provider to be specific)
            // especially these fields with underscore in it.
            .merge(Env::prefixed("QUILL_").map(|v| match v.as_str() {
                "DB_PRIMARY_MIN_IDLE" => "db.primary.min_idle".into(),
                "DB_PRIMARY_POOL_SIZE" => "db.primary.pool_size".into(),

                "DB_REPLICA_MIN_IDLE" => "db.replica.min_idle".into(),
                "DB_REPLICA_POOL_SIZE" => "db.replica.pool_size".into(),

                "DB_ENFORCE_TLS" => "db.enforce_tls".into(),
                "DB_TIMEOUT_SECS" => "db.timeout_secs".into(),

                "JWT_SECRET" => "jwt_secret".into(),
                "POSTS_PER_PAGE" => "posts_per_page".into(),
                "HOME_CACHE_TTL_SECS" => "home_cache_ttl_secs".into(),

                _ => v.as_str().replace('_', ".").into(),
            }))
            // Environment variable aliases
            .merge(Env::raw().map(|v| match v.as_str() {
                "DATABASE_URL" => "db.primary.url".into(),
                _ => v.into(),
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn env_aliases() {
        Jail::expect_with(|jail| {
            jail.set_env("DATABASE_URL", "postgres://localhost/quill");

            jail.set_env("QUILL_DB_PRIMARY_MIN_IDLE", "100");
            jail.set_env("QUILL_DB_PRIMARY_POOL_SIZE", "100");

            jail.set_env("QUILL_DB_REPLICA_URL", "postgres://replica/quill");
            jail.set_env("QUILL_DB_REPLICA_MIN_IDLE", "589");
            jail.set_env("QUILL_DB_REPLICA_POOL_SIZE", "589");

            jail.set_env("QUILL_DB_ENFORCE_TLS", "false");
            jail.set_env("QUILL_DB_TIMEOUT_SECS", "3030");

            jail.set_env("QUILL_JWT_SECRET", "averysecretsecret");

            let config: Server = Server::figment().extract()?;
            assert_eq!(config.db.primary.url.as_str(), "postgres://localhost/quill");
            assert_eq!(
                config.db.primary.min_idle.unwrap(),
                NonZeroU32::new(100).unwrap()
            );
            assert_eq!(config.db.primary.pool_size, NonZeroU32::new(100).unwrap());

            let replica = config.db.replica.as_ref().unwrap();
            assert_eq!(replica.url.as_str(), "postgres://replica/quill");
            assert_eq!(replica.min_idle.unwrap(), NonZeroU32::new(589).unwrap());
            assert_eq!(replica.pool_size, NonZeroU32::new(589).unwrap());

            assert_eq!(config.db.enforce_tls, false);
            assert_eq!(config.db.timeout_secs, NonZeroU64::new(3030).unwrap());

            assert_eq!(config.jwt_secret.as_str(), "averysecretsecret");

            Ok(())
        });
    }

    #[test]
    fn pagination_and_cache_defaults() {
        Jail::expect_with(|jail| {
            jail.set_env("DATABASE_URL", "postgres://localhost/quill");
            jail.set_env("QUILL_JWT_SECRET", "averysecretsecret");

            let config: Server = Server::figment().extract()?;
            assert_eq!(config.posts_per_page, NonZeroU32::new(10).unwrap());
            assert_eq!(config.home_cache_ttl_secs, NonZeroU64::new(20).unwrap());
            assert_eq!(config.port, 8000);

            Ok(())
        });
    }

    #[test]
    fn rejects_short_jwt_secret() {
        Jail::expect_with(|jail| {
            jail.set_env("DATABASE_URL", "postgres://localhost/quill");
            jail.set_env("QUILL_JWT_SECRET", "short");

            let config: Server = Server::figment().extract()?;
            assert!(config.validate().is_err());

            Ok(())
        });
    }
}
