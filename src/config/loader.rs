use config::{Config, ConfigError, Environment as ConfigEnvironment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;

/// 部署時沿用的連接字串環境變數
pub const MONGODB_URI_VAR: &str = "MONGODB_URI";

/// 部署時沿用的資料庫名稱環境變數
pub const MONGODB_DB_VAR: &str = "MONGODB_DB";

/// 環境類型枚舉
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// 從環境變數取得當前環境設定
    pub fn from_env() -> Self {
        match env::var("SENTIMENT_ENV")
            .unwrap_or_else(|_| "development".into())
            .to_lowercase()
            .as_str()
        {
            "production" => Environment::Production,
            _ => Environment::Development,
        }
    }

    /// 轉換為配置文件名
    pub fn as_filename(&self) -> &'static str {
        match self {
            Environment::Development => "development.toml",
            Environment::Production => "production.toml",
        }
    }
}

/// 配置加載器，負責根據環境加載適當的配置
pub struct ConfigLoader;

impl ConfigLoader {
    /// 載入指定環境的配置
    ///
    /// 優先級由低至高：配置文件、`SENTIMENT__*` 環境變數、`MONGODB_URI` / `MONGODB_DB`。
    pub fn load(env: Environment) -> Result<Config, ConfigError> {
        // .env 不存在時忽略
        let _ = dotenvy::dotenv();

        let config_dir = env::var("CONFIG_DIR").unwrap_or_else(|_| "config".into());
        let config_path = Path::new(&config_dir).join(env.as_filename());

        Config::builder()
            // 確保 mongo 區段存在，缺少 uri 時由驗證報告
            .set_default("mongo.database", "sentiment")?
            .add_source(File::from(config_path).required(false))
            .add_source(
                ConfigEnvironment::with_prefix("SENTIMENT")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("mongo.uri", env::var(MONGODB_URI_VAR).ok())?
            .set_override_option("mongo.database", env::var(MONGODB_DB_VAR).ok())?
            .build()
    }
}

/// 配置獲取輔助特性
pub trait ConfigExt {
    /// 從配置中獲取並反序列化指定部分
    fn get_section<'a, T: Deserialize<'a>>(&'a self, section: &str) -> Result<T, ConfigError>;
}

impl ConfigExt for Config {
    fn get_section<'a, T: Deserialize<'a>>(&'a self, section: &str) -> Result<T, ConfigError> {
        self.get(section)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::MongoConfig;
    use serial_test::serial;

    fn clear_env() {
        for key in [
            "SENTIMENT_ENV",
            "CONFIG_DIR",
            MONGODB_URI_VAR,
            MONGODB_DB_VAR,
            "SENTIMENT__MONGO__URI",
            "SENTIMENT__MONGO__DATABASE",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_environment_from_env() {
        clear_env();
        assert_eq!(Environment::from_env(), Environment::Development);

        env::set_var("SENTIMENT_ENV", "production");
        assert_eq!(Environment::from_env(), Environment::Production);

        env::set_var("SENTIMENT_ENV", "development");
        assert_eq!(Environment::from_env(), Environment::Development);

        clear_env();
    }

    #[test]
    fn test_environment_as_filename() {
        assert_eq!(Environment::Development.as_filename(), "development.toml");
        assert_eq!(Environment::Production.as_filename(), "production.toml");
    }

    #[test]
    #[serial]
    fn test_legacy_variables_override_prefixed_ones() {
        clear_env();
        env::set_var("CONFIG_DIR", "/nonexistent-config-dir");
        env::set_var("SENTIMENT__MONGO__URI", "mongodb://prefixed:27017");
        env::set_var(MONGODB_URI_VAR, "mongodb://legacy:27017");
        env::set_var(MONGODB_DB_VAR, "twitterdb");

        let config = ConfigLoader::load(Environment::Development).unwrap();
        let mongo: MongoConfig = config.get_section("mongo").unwrap();

        assert_eq!(mongo.uri, "mongodb://legacy:27017");
        assert_eq!(mongo.database, "twitterdb");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_missing_file_falls_back_to_defaults() {
        clear_env();
        env::set_var("CONFIG_DIR", "/nonexistent-config-dir");
        env::set_var("SENTIMENT__MONGO__URI", "mongodb://localhost:27017");

        let config = ConfigLoader::load(Environment::Development).unwrap();
        let mongo: MongoConfig = config.get_section("mongo").unwrap();

        assert_eq!(mongo.uri, "mongodb://localhost:27017");
        assert_eq!(mongo.database, "sentiment");

        clear_env();
    }
}
