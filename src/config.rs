/*
 * Responsibility
 * - 環境変数や設定の読み込み (DATABASE_URL, Cognito, CORS, HTTP 制限など)
 * - 設定値のバリデーション (不足なら起動失敗)
 * - JWKS URL / issuer の組み立ては CognitoConfig に閉じ込める
 */
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<String>) -> Self {
        match raw
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Which `token_use` values the verifier accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenUsePolicy {
    #[default]
    Any,
    AccessOnly,
    IdOnly,
}

impl FromStr for TokenUsePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "any" => Ok(Self::Any),
            "access" => Ok(Self::AccessOnly),
            "id" => Ok(Self::IdOnly),
            _ => Err(ConfigError::Invalid("COGNITO_TOKEN_TYPE")),
        }
    }
}

/// Identity provider settings consumed by the token verifier.
#[derive(Debug, Clone)]
pub struct CognitoConfig {
    pub region: String,
    pub user_pool_id: String,
    pub client_id: String,
    pub token_use: TokenUsePolicy,
}

impl CognitoConfig {
    /// `iss` value every accepted token must carry.
    pub fn issuer(&self) -> String {
        format!(
            "https://cognito-idp.{}.amazonaws.com/{}",
            self.region, self.user_pool_id
        )
    }

    pub fn jwks_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&format!("{}/.well-known/jwks.json", self.issuer()))
            .map_err(|_| ConfigError::Invalid("COGNITO_REGION/COGNITO_USER_POOL_ID"))
    }
}

#[derive(Debug, Clone)]
pub struct HttpLimits {
    pub body_limit_bytes: usize,
    pub timeout: Duration,
}

impl Default for HttpLimits {
    fn default() -> Self {
        Self {
            body_limit_bytes: 1024 * 1024,
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub database_url: String,
    pub db_max_connections: u32,

    pub cognito: CognitoConfig,
    pub required_group: String,
    pub jwks_fetch_timeout: Duration,

    pub cors_allowed_origins: Vec<String>,
    pub http: HttpLimits,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// Blank values are treated the same as missing ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let port: u16 = parse_or(get("PORT"), "PORT", 8080)?;
        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(get("APP_ENV"));

        let database_url = match get("DATABASE_URL") {
            Some(url) => url,
            None => {
                let host = require("DB_HOST")?;
                let db_port: u16 = parse_or(get("DB_PORT"), "DB_PORT", 5432)?;
                let name = require("DB_NAME")?;
                let user = require("DB_USER")?;
                let password = get("DB_PASSWORD");
                database_url_from_parts(&host, db_port, &name, &user, password.as_deref())?
            }
        };
        let db_max_connections = parse_or(get("DB_MAX_CONNECTIONS"), "DB_MAX_CONNECTIONS", 5)?;

        let cognito = CognitoConfig {
            region: require("COGNITO_REGION")?,
            user_pool_id: require("COGNITO_USER_POOL_ID")?,
            client_id: require("COGNITO_CLIENT_ID")?,
            token_use: get("COGNITO_TOKEN_TYPE")
                .map(|v| v.parse())
                .transpose()?
                .unwrap_or_default(),
        };
        // fail at startup rather than on the first request
        cognito.jwks_url()?;

        let required_group = get("AUTH_REQUIRED_GROUP").unwrap_or_else(|| "Admin".to_string());

        let jwks_fetch_timeout = Duration::from_secs(parse_or(
            get("JWKS_FETCH_TIMEOUT_SECONDS"),
            "JWKS_FETCH_TIMEOUT_SECONDS",
            5,
        )?);

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| "http://localhost:4200".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let defaults = HttpLimits::default();
        let http = HttpLimits {
            body_limit_bytes: parse_or(
                get("HTTP_BODY_LIMIT_BYTES"),
                "HTTP_BODY_LIMIT_BYTES",
                defaults.body_limit_bytes,
            )?,
            timeout: Duration::from_secs(parse_or(
                get("HTTP_TIMEOUT_SECONDS"),
                "HTTP_TIMEOUT_SECONDS",
                defaults.timeout.as_secs(),
            )?),
        };

        Ok(Self {
            addr,
            app_env,
            database_url,
            db_max_connections,
            cognito,
            required_group,
            jwks_fetch_timeout,
            cors_allowed_origins,
            http,
        })
    }
}

// Credentials and database name go through `Url` so reserved characters are
// percent-encoded instead of changing the host or path.
fn database_url_from_parts(
    host: &str,
    port: u16,
    name: &str,
    user: &str,
    password: Option<&str>,
) -> Result<String, ConfigError> {
    let mut url = Url::parse("postgres://localhost").map_err(|_| ConfigError::Invalid("DB_HOST"))?;
    url.set_host(Some(host))
        .map_err(|_| ConfigError::Invalid("DB_HOST"))?;
    url.set_port(Some(port))
        .map_err(|_| ConfigError::Invalid("DB_PORT"))?;
    url.set_username(user)
        .map_err(|_| ConfigError::Invalid("DB_USER"))?;
    url.set_password(password)
        .map_err(|_| ConfigError::Invalid("DB_PASSWORD"))?;
    url.path_segments_mut()
        .map_err(|_| ConfigError::Invalid("DB_NAME"))?
        .push(name);
    url.query_pairs_mut().append_pair("sslmode", "disable");

    Ok(url.into())
}

fn parse_or<T: FromStr>(raw: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError> {
    match raw {
        Some(v) => v.parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}
