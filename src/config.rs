//! Service configuration.
//!
//! Loaded either from a TOML file or from environment variables.
//!
//! ```toml
//! [server]
//! address = "127.0.0.1:3000"
//!
//! [auth]
//! signing_secret = "base64:..."
//! default_ttl_seconds = 18000
//!
//! [password]
//! memory_kib = 19456
//! iterations = 2
//! parallelism = 1
//!
//! [[policy.rules]]
//! pattern = "/api/auth/**"
//! access = "public"
//! ```

use std::fmt::Debug;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::auth::SigningKey;
use crate::auth::secret_hash::PasswordHashConfig;
use crate::prelude::*;
use crate::web::policy::{Access, PolicyGate, RuleConfig};

/// Tokens last five hours unless configured otherwise.
pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 5 * 60 * 60;
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:3000";

/// Paths reachable without a token when no policy is configured.
pub const DEFAULT_PUBLIC_PATHS: [&str; 6] = [
    "/api/auth/**",
    "/login.html",
    "/home.html",
    "/styles.css",
    "/js/**",
    "/",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: String::from(DEFAULT_SERVER_ADDRESS),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Token signing secret. Prefix with `base64:` to supply raw bytes.
    pub signing_secret: String,
    #[serde(default = "default_ttl")]
    pub default_ttl_seconds: i64,
}

impl Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("signing_secret", &"REDACTED")
            .field("default_ttl_seconds", &self.default_ttl_seconds)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    pub rules: Vec<RuleConfig>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self::public_paths(DEFAULT_PUBLIC_PATHS)
    }
}

impl PolicyConfig {
    /// Every path listed becomes a public rule, in order.
    pub fn public_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rules: paths
                .into_iter()
                .map(|pattern| RuleConfig {
                    pattern: pattern.into(),
                    access: Access::Public,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub password: PasswordHashConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
}

fn default_ttl() -> i64 {
    DEFAULT_TOKEN_TTL_SECONDS
}

fn get_env_variable(var: &str) -> Result<String> {
    std::env::var(var).map_err(|_| Error::MissingEnvVar(var.to_string()))
}

fn get_env_or<T: FromStr>(var: &str, default: T) -> Result<T> {
    match std::env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| Error::InvalidConfig(format!("{var} has an invalid value"))),
        Err(_) => Ok(default),
    }
}

impl AppConfig {
    /// Loads the file named by `CONFIG_PATH` when set, the environment otherwise.
    pub fn load() -> Result<Self> {
        match std::env::var("CONFIG_PATH") {
            Ok(path) => Self::from_file(Path::new(&path)),
            Err(_) => Self::from_env(),
        }
    }

    pub fn from_file(file_path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(file_path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(value: &str) -> Result<Self> {
        let config: Self = toml::from_str(value)?;
        config.check()?;
        Ok(config)
    }

    /// Reads the configuration from environment variables.
    ///
    /// `JWT_SECRET` is required. `JWT_TTL_SECONDS`, `SERVER_ADDR`,
    /// `PUBLIC_PATHS` (comma separated) and `PASSWORD_MEMORY_KIB`,
    /// `PASSWORD_ITERATIONS`, `PASSWORD_PARALLELISM` fall back to defaults.
    pub fn from_env() -> Result<Self> {
        let password_defaults = PasswordHashConfig::default();
        let policy = match std::env::var("PUBLIC_PATHS") {
            Ok(paths) => PolicyConfig::public_paths(
                paths
                    .split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty()),
            ),
            Err(_) => PolicyConfig::default(),
        };

        let config = Self {
            server: ServerConfig {
                address: get_env_or("SERVER_ADDR", String::from(DEFAULT_SERVER_ADDRESS))?,
            },
            auth: AuthConfig {
                signing_secret: get_env_variable("JWT_SECRET")?,
                default_ttl_seconds: get_env_or("JWT_TTL_SECONDS", DEFAULT_TOKEN_TTL_SECONDS)?,
            },
            password: PasswordHashConfig {
                memory_kib: get_env_or("PASSWORD_MEMORY_KIB", password_defaults.memory_kib)?,
                iterations: get_env_or("PASSWORD_ITERATIONS", password_defaults.iterations)?,
                parallelism: get_env_or("PASSWORD_PARALLELISM", password_defaults.parallelism)?,
            },
            policy,
        };
        config.check()?;
        Ok(config)
    }

    pub fn signing_key(&self) -> Result<SigningKey> {
        Ok(SigningKey::from_secret(&self.auth.signing_secret)?)
    }

    pub fn policy_gate(&self) -> Result<PolicyGate> {
        PolicyGate::from_config(&self.policy.rules)
    }

    /// Rejects configurations the service could not start with.
    fn check(&self) -> Result<()> {
        if self.auth.default_ttl_seconds <= 0 {
            return Err(Error::InvalidConfig(String::from(
                "default_ttl_seconds must be positive",
            )));
        }
        self.signing_key()?;
        self.policy_gate()?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use serial_test::serial;

    use super::*;
    use crate::auth::AuthError;

    const SECRET: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    const ENV_VARS: [&str; 7] = [
        "JWT_SECRET",
        "JWT_TTL_SECONDS",
        "SERVER_ADDR",
        "PUBLIC_PATHS",
        "PASSWORD_MEMORY_KIB",
        "PASSWORD_ITERATIONS",
        "PASSWORD_PARALLELISM",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            unsafe { std::env::remove_var(var) };
        }
    }

    #[test]
    pub fn deserialize() -> Result<()> {
        let content = format!(
            r#"
            [server]
            address = "0.0.0.0:8080"

            [auth]
            signing_secret = "{SECRET}"
            default_ttl_seconds = 604800

            [password]
            memory_kib = 4096
            iterations = 3
            parallelism = 1

            [[policy.rules]]
            pattern = "/api/auth/logout"
            access = "protected"

            [[policy.rules]]
            pattern = "/api/auth/**"
            access = "public"
        "#
        );
        let config = AppConfig::from_toml(&content)?;

        assert_eq!(config.server.address, "0.0.0.0:8080");
        assert_eq!(config.auth.default_ttl_seconds, 604800);
        assert_eq!(config.password.memory_kib, 4096);
        assert_eq!(config.policy.rules.len(), 2);
        assert_eq!(config.policy.rules[0].access, Access::Protected);
        Ok(())
    }

    #[test]
    fn defaults_fill_missing_sections() -> Result<()> {
        let config = AppConfig::from_toml(&format!("[auth]\nsigning_secret = \"{SECRET}\"\n"))?;

        assert_eq!(config.server, ServerConfig::default());
        assert_eq!(config.auth.default_ttl_seconds, DEFAULT_TOKEN_TTL_SECONDS);
        assert_eq!(config.password, PasswordHashConfig::default());
        assert_eq!(config.policy.rules.len(), DEFAULT_PUBLIC_PATHS.len());
        Ok(())
    }

    #[test]
    fn weak_secret_is_rejected() {
        let result = AppConfig::from_toml("[auth]\nsigning_secret = \"short\"\n");
        assert!(matches!(
            result,
            Err(Error::Auth(AuthError::WeakSigningKey { len: 5, .. }))
        ));
    }

    #[test]
    fn non_positive_ttl_is_rejected() {
        let result = AppConfig::from_toml(&format!(
            "[auth]\nsigning_secret = \"{SECRET}\"\ndefault_ttl_seconds = 0\n"
        ));
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn bad_pattern_is_rejected() {
        let result = AppConfig::from_toml(&format!(
            "[auth]\nsigning_secret = \"{SECRET}\"\n\n[[policy.rules]]\npattern = \"/a/**/b\"\naccess = \"public\"\n"
        ));
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn debug_hides_the_secret() -> Result<()> {
        let config = AppConfig::from_toml(&format!("[auth]\nsigning_secret = \"{SECRET}\"\n"))?;
        assert!(!format!("{config:?}").contains(SECRET));
        Ok(())
    }

    #[test]
    #[serial]
    fn from_env_requires_secret() {
        clear_env();
        assert!(matches!(
            AppConfig::from_env(),
            Err(Error::MissingEnvVar(var)) if var == "JWT_SECRET"
        ));
    }

    #[test]
    #[serial]
    fn from_env_reads_overrides() -> Result<()> {
        clear_env();
        unsafe {
            std::env::set_var("JWT_SECRET", SECRET);
            std::env::set_var("JWT_TTL_SECONDS", "60");
            std::env::set_var("PUBLIC_PATHS", "/, /api/auth/** ,,/health");
        }
        let config = AppConfig::from_env();
        clear_env();
        let config = config?;

        assert_eq!(config.auth.default_ttl_seconds, 60);
        assert_eq!(config.server.address, DEFAULT_SERVER_ADDRESS);
        let patterns: Vec<&str> = config
            .policy
            .rules
            .iter()
            .map(|r| r.pattern.as_str())
            .collect();
        assert_eq!(patterns, ["/", "/api/auth/**", "/health"]);
        Ok(())
    }

    #[test]
    #[serial]
    fn from_env_rejects_unparseable_numbers() {
        clear_env();
        unsafe {
            std::env::set_var("JWT_SECRET", SECRET);
            std::env::set_var("JWT_TTL_SECONDS", "a week");
        }
        let result = AppConfig::from_env();
        clear_env();
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }
}
