use crate::config::validation::{ValidationError, ValidationUtils, Validator};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 應用程序配置結構
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    pub mongo: MongoConfig,
    #[serde(default)]
    pub log: LogConfig,
}

impl Validator for ApplicationConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        self.mongo.validate()?;
        self.log.validate()?;

        Ok(())
    }
}

/// MongoDB 連接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoConfig {
    /// 連接字串，缺少時啟動失敗
    #[serde(default)]
    pub uri: String,
    /// 邏輯資料庫名稱
    #[serde(default = "MongoConfig::default_database")]
    pub database: String,
    #[serde(default = "MongoConfig::default_app_name")]
    pub app_name: String,
    #[serde(default = "MongoConfig::default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "MongoConfig::default_server_selection_timeout_secs")]
    pub server_selection_timeout_secs: u64,
    /// 單次操作逾時，0 表示沿用驅動預設值
    #[serde(default = "MongoConfig::default_operation_timeout_secs")]
    pub operation_timeout_secs: u64,
    #[serde(default = "MongoConfig::default_max_pool_size")]
    pub max_pool_size: u32,
    /// 建立連接後是否立即發送 ping 驗證
    #[serde(default = "MongoConfig::default_ping_on_connect")]
    pub ping_on_connect: bool,
}

impl MongoConfig {
    fn default_database() -> String {
        "sentiment".to_string()
    }

    fn default_app_name() -> String {
        "sentiment_store".to_string()
    }

    fn default_connect_timeout_secs() -> u64 {
        10
    }

    fn default_server_selection_timeout_secs() -> u64 {
        10
    }

    fn default_operation_timeout_secs() -> u64 {
        30
    }

    fn default_max_pool_size() -> u32 {
        10
    }

    fn default_ping_on_connect() -> bool {
        true
    }

    /// 以連接字串與資料庫名稱建立配置，其餘欄位使用預設值
    pub fn new(uri: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            database: database.into(),
            app_name: Self::default_app_name(),
            connect_timeout_secs: Self::default_connect_timeout_secs(),
            server_selection_timeout_secs: Self::default_server_selection_timeout_secs(),
            operation_timeout_secs: Self::default_operation_timeout_secs(),
            max_pool_size: Self::default_max_pool_size(),
            ping_on_connect: Self::default_ping_on_connect(),
        }
    }

    /// 獲取連接超時持續時間
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// 獲取伺服器選擇超時持續時間
    pub fn server_selection_timeout(&self) -> Duration {
        Duration::from_secs(self.server_selection_timeout_secs)
    }

    /// 獲取單次操作超時，未設定時返回 None
    pub fn operation_timeout(&self) -> Option<Duration> {
        (self.operation_timeout_secs > 0).then(|| Duration::from_secs(self.operation_timeout_secs))
    }
}

impl Validator for MongoConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        ValidationUtils::mongo_uri(&self.uri, "mongo.uri")?;
        ValidationUtils::not_empty(&self.database, "mongo.database")?;
        ValidationUtils::in_range(self.connect_timeout_secs, 1, 300, "mongo.connect_timeout_secs")?;
        ValidationUtils::in_range(
            self.server_selection_timeout_secs,
            1,
            300,
            "mongo.server_selection_timeout_secs",
        )?;
        ValidationUtils::in_range(self.operation_timeout_secs, 0, 3600, "mongo.operation_timeout_secs")?;
        ValidationUtils::in_range(self.max_pool_size, 1, 1000, "mongo.max_pool_size")?;

        Ok(())
    }
}

/// 日誌配置，未設定的欄位使用預設值
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Validator for LogConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        ValidationUtils::one_of(
            &self.level.to_lowercase(),
            &["trace", "debug", "info", "warn", "error"],
            "log.level",
        )?;

        ValidationUtils::one_of(&self.format.to_lowercase(), &["pretty", "json"], "log.format")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_mongo_config_defaults() {
        let config = MongoConfig::new("mongodb://localhost:27017", "sentiment");
        assert_eq!(config.app_name, "sentiment_store");
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
        assert_eq!(config.operation_timeout(), Some(Duration::from_secs(30)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_operation_timeout_disables_deadline() {
        let mut config = MongoConfig::new("mongodb://localhost:27017", "sentiment");
        config.operation_timeout_secs = 0;
        assert_eq!(config.operation_timeout(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_uri_is_rejected() {
        let config = MongoConfig::new("", "sentiment");
        assert_matches!(config.validate(), Err(ValidationError::MissingField(f)) if f == "mongo.uri");
    }

    #[test]
    fn test_log_config_validation() {
        let mut log = LogConfig::default();
        assert!(log.validate().is_ok());

        log.format = "xml".to_string();
        assert!(log.validate().is_err());
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let config: ApplicationConfig = serde_json::from_value(serde_json::json!({
            "mongo": { "uri": "mongodb://localhost:27017" }
        }))
        .unwrap();

        assert_eq!(config.mongo.database, "sentiment");
        assert_eq!(config.mongo.max_pool_size, 10);
        assert!(config.mongo.ping_on_connect);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_partial_log_section_fills_defaults() {
        let config: ApplicationConfig = serde_json::from_value(serde_json::json!({
            "mongo": { "uri": "mongodb://localhost:27017" },
            "log": { "level": "debug" }
        }))
        .unwrap();

        assert_eq!(config.log.level, "debug");
        assert_eq!(config.log.format, "pretty");
        assert!(config.validate().is_ok());
    }
}
