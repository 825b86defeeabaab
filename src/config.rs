use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// 未設定の場合はインメモリストアで起動する
    pub url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

/// アプリケーション設定
///
/// 優先順位（低 → 高）：
/// 1. 組み込みのデフォルト値
/// 2. `LIBRARY_` プレフィックスの環境変数（例: `LIBRARY_SERVER__PORT`）
/// 3. `DATABASE_URL` / `PORT`
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// 環境変数から設定を読み込む
    pub fn load() -> Result<Self, ConfigError> {
        Self::builder()?
            .add_source(
                Environment::with_prefix("LIBRARY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("database.url", env::var("DATABASE_URL").ok())?
            .set_override_option("server.port", env::var("PORT").ok())?
            .build()?
            .try_deserialize()
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000_i64)?
            .set_default("database.max_connections", 5_i64)?
            .set_default("logging.level", "debug")
    }

    /// デフォルト値のみの設定
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::builder()?.build()?.try_deserialize()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
