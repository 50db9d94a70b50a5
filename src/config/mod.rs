use serde::Deserialize;

static CONFIG: OnceCell<Config> = OnceCell::const_new();

mod config_dir;
pub use config_dir::{CONFIG_PATH_ENV, find_config_file, read_config, read_config_at};

mod error;
pub use error::{ConfigError, ConfigResult};
use tokio::sync::OnceCell;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    host: Host,
    app: App,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Host {
    bindto: String,
    #[serde(default)]
    client_origin: Option<String>,
}

/// Which store implementation backs the model layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Storage {
    #[default]
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct App {
    jwt: String,
    #[serde(default)]
    database_uri: String,
    #[serde(default)]
    storage: Storage,
    #[serde(default = "default_token_ttl_hours")]
    token_ttl_hours: i64,
    #[serde(default)]
    docs: bool,
    #[serde(default)]
    admin_email: Option<String>,
    #[serde(default)]
    admin_password: Option<String>,
}

fn default_token_ttl_hours() -> i64 {
    24
}

impl Config {
    /// Process-wide config for the binary. Exits when no usable config is found.
    #[tracing::instrument]
    pub async fn get_or_init(use_local: bool) -> &'static Config {
        CONFIG
            .get_or_init(|| async {
                match Self::load(use_local) {
                    Ok(c) => c,
                    Err(e) => {
                        if !matches!(e, error::ConfigError::ConfigNotFound) {
                            crate::error::log_error(&e);
                        }
                        tracing::error!("Config not found.");
                        std::process::exit(1);
                    }
                }
            })
            .await
    }

    /// Reads the config file and applies environment overrides.
    pub fn load(use_local: bool) -> ConfigResult<Self> {
        let text = read_config(use_local)?;
        let mut config = Self::from_toml_str(&text)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// `PORT`, `CLIENT_URL`, `DATABASE_URL` and `JWT_SECRET` take precedence over the file.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            let port: u16 = port.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "PORT",
                value: port.clone(),
            })?;
            let host = self
                .host
                .bindto
                .rsplit_once(':')
                .map(|(host, _)| host.to_string())
                .unwrap_or_else(|| String::from("0.0.0.0"));
            tracing::info!("PORT set, binding to port {port}");
            self.host.bindto = format!("{host}:{port}");
        }

        if let Some(origin) = lookup("CLIENT_URL") {
            self.host.client_origin = Some(origin);
        }

        if let Some(uri) = lookup("DATABASE_URL") {
            self.app.database_uri = uri;
        }

        if let Some(secret) = lookup("JWT_SECRET") {
            self.app.jwt = secret;
        }

        Ok(())
    }

    #[inline]
    pub fn host(&self) -> &Host {
        &self.host
    }

    #[inline]
    pub fn app(&self) -> &App {
        &self.app
    }
}

impl Host {
    #[inline]
    pub fn bindto(&self) -> &str {
        &self.bindto
    }

    #[inline]
    pub fn client_origin(&self) -> Option<&str> {
        self.client_origin.as_deref()
    }
}

impl App {
    #[inline]
    pub fn jwt(&self) -> &str {
        &self.jwt
    }

    #[inline]
    pub fn database_uri(&self) -> &str {
        &self.database_uri
    }

    #[inline]
    pub fn storage(&self) -> Storage {
        self.storage
    }

    #[inline]
    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.token_ttl_hours)
    }

    #[inline]
    pub fn docs(&self) -> bool {
        self.docs
    }

    /// Bootstrap admin credentials, present only when both halves are configured.
    pub fn admin_credentials(&self) -> Option<(&str, &str)> {
        match (&self.admin_email, &self.admin_password) {
            (Some(email), Some(password)) => Some((email.as_str(), password.as_str())),
            _ => None,
        }
    }
}
