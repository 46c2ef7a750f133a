//! 服务配置
//!
//! 加载顺序：默认值 → `CATALOG_CONFIG` 指向的 TOML 文件 → 环境变量（含 `.env`）。

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// 服务配置结构
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 存储后端
    pub backend: Backend,
    /// HTTP 服务配置
    pub http: HttpConfig,
    /// Supabase 项目配置
    pub supabase: SupabaseConfig,
    /// 数据库配置
    pub database: DatabaseConfig,
    /// 图片存储配置
    pub storage: StorageConfig,
    /// 日志配置
    pub logging: LoggingConfig,
}

/// 存储后端类型
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Postgres 商品表 + Supabase Storage
    #[default]
    Postgres,
    /// 进程内存储，重启后数据丢失
    Memory,
}

impl FromStr for Backend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" => Ok(Backend::Postgres),
            "memory" => Ok(Backend::Memory),
            other => Err(ConfigError::Validation(format!("未知的存储后端: {}", other))),
        }
    }
}

/// HTTP 服务配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// 绑定地址
    pub bind_address: String,
    /// HTTP 服务端口
    pub port: u16,
    /// 静态页面目录
    pub static_dir: PathBuf,
    /// 上传请求体上限（字节）
    pub max_upload_bytes: usize,
}

/// Supabase 项目配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: String,
}

/// 数据库配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
}

/// 图片存储配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// 存储桶名称
    pub bucket: String,
    /// 桶内目录
    pub folder: String,
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别 (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 3000,
            static_dir: PathBuf::from("public"),
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            acquire_timeout_seconds: 8,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: "imagens-produtos".to_string(),
            folder: "produtos".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// 读取 `.env`、配置文件与环境变量，并校验
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let mut config = match std::env::var("CATALOG_CONFIG") {
            Ok(path) => Self::load_from_file(path)?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// 从配置文件加载配置
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::FileRead(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// 用环境变量覆盖配置项
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("CATALOG_BACKEND") {
            self.backend = v.parse()?;
        }
        if let Some(v) = lookup("BIND_ADDRESS") {
            self.http.bind_address = v;
        }
        if let Some(v) = lookup("PORT") {
            self.http.port = v
                .trim()
                .parse()
                .map_err(|_| ConfigError::Validation(format!("无效的端口: {}", v)))?;
        }
        if let Some(v) = lookup("STATIC_DIR") {
            self.http.static_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("SUPABASE_URL") {
            self.supabase.url = v;
        }
        if let Some(v) = lookup("SUPABASE_ANON_KEY") {
            self.supabase.anon_key = v;
        }
        if let Some(v) = lookup("DATABASE_URL") {
            self.database.url = v;
        }
        if let Some(v) = lookup("STORAGE_BUCKET") {
            self.storage.bucket = v;
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            self.logging.level = v.to_ascii_lowercase();
        }
        Ok(())
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.bind_address.is_empty() {
            return Err(ConfigError::Validation("绑定地址不能为空".to_string()));
        }
        if self.http.port == 0 {
            return Err(ConfigError::Validation("HTTP端口必须大于0".to_string()));
        }
        if self.http.max_upload_bytes == 0 {
            return Err(ConfigError::Validation("上传大小上限必须大于0".to_string()));
        }
        if self.storage.bucket.is_empty() {
            return Err(ConfigError::Validation("存储桶名称不能为空".to_string()));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::Validation(format!(
                "无效的日志级别: {}，有效值: {:?}",
                self.logging.level, valid_levels
            )));
        }

        if self.backend == Backend::Postgres {
            if self.database.url.is_empty() {
                return Err(ConfigError::Validation("缺少 DATABASE_URL".to_string()));
            }
            if self.supabase.url.is_empty() || self.supabase.anon_key.is_empty() {
                return Err(ConfigError::Validation(
                    "缺少 SUPABASE_URL 或 SUPABASE_ANON_KEY".to_string(),
                ));
            }
        }

        Ok(())
    }

    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.http.bind_address, self.http.port)
    }
}

/// 配置错误类型
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("文件读取错误: {0}")]
    FileRead(String),
    #[error("配置解析错误: {0}")]
    Parse(String),
    #[error("配置验证错误: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn postgres_config() -> Config {
        let mut config = Config::default();
        config.database.url = "postgres://localhost/catalog".to_string();
        config.supabase.url = "https://abc.supabase.co".to_string();
        config.supabase.anon_key = "anon".to_string();
        config
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.backend, Backend::Postgres);
        assert_eq!(config.http.port, 3000);
        assert_eq!(config.storage.bucket, "imagens-produtos");
        assert_eq!(config.storage.folder, "produtos");
        assert_eq!(config.listen_address(), "0.0.0.0:3000");
    }

    #[test]
    fn test_config_validation() {
        assert!(postgres_config().validate().is_ok());

        // 默认的 postgres 后端缺少连接信息
        assert!(Config::default().validate().is_err());

        let mut config = postgres_config();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());

        let memory = Config {
            backend: Backend::Memory,
            ..Config::default()
        };
        assert!(memory.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("CATALOG_BACKEND", "Memory"),
            ("PORT", "8081"),
            ("SUPABASE_URL", "https://xyz.supabase.co"),
            ("LOG_LEVEL", "DEBUG"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.backend, Backend::Memory);
        assert_eq!(config.http.port, 8081);
        assert_eq!(config.supabase.url, "https://xyz.supabase.co");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_invalid_port_override() {
        let mut config = Config::default();
        let result = config.apply_overrides(|k| (k == "PORT").then(|| "http".to_string()));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("catalog.toml");
        fs::write(
            &path,
            "backend = \"memory\"\n\n[http]\nport = 4000\n\n[storage]\nbucket = \"fotos\"\n",
        )
        .unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.backend, Backend::Memory);
        assert_eq!(config.http.port, 4000);
        assert_eq!(config.http.bind_address, "0.0.0.0");
        assert_eq!(config.storage.bucket, "fotos");
        assert_eq!(config.storage.folder, "produtos");
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load_from_file("/nonexistent/catalog.toml");
        assert!(matches!(result, Err(ConfigError::FileRead(_))));
    }
}
