use mongodb::error::ErrorKind;
use std::time::Duration;
use thiserror::Error;

/// 存儲層錯誤
///
/// 查無資料不屬於錯誤：以 `None`、空集合或零計數表示。
#[derive(Error, Debug)]
pub enum StorageError {
    /// 無法連接或驗證資料庫
    #[error("資料庫連接錯誤: {0}")]
    Connection(String),

    /// 識別碼格式不正確
    #[error("無效的識別碼: {value:?}")]
    InvalidIdentifier { value: String },

    /// 資料庫拒絕查詢、更新或管線，保留原始訊息
    #[error("查詢錯誤: {0}")]
    Query(String),

    /// 單次操作超過設定時限
    #[error("操作逾時: {operation} on {collection} 超過 {timeout:?}")]
    Timeout {
        operation: &'static str,
        collection: String,
        timeout: Duration,
    },

    /// 紀錄與 BSON 之間轉換失敗
    #[error("數據序列化錯誤: {0}")]
    Serialization(String),
}

impl StorageError {
    /// 建立無效識別碼錯誤
    pub fn invalid_identifier(value: impl Into<String>) -> Self {
        StorageError::InvalidIdentifier { value: value.into() }
    }

    /// 是否為連接層錯誤
    pub fn is_connection(&self) -> bool {
        matches!(self, StorageError::Connection(_))
    }
}

impl From<mongodb::error::Error> for StorageError {
    fn from(err: mongodb::error::Error) -> Self {
        match err.kind.as_ref() {
            ErrorKind::ServerSelection { .. }
            | ErrorKind::Authentication { .. }
            | ErrorKind::DnsResolve { .. }
            | ErrorKind::ConnectionPoolCleared { .. }
            | ErrorKind::Io(_) => StorageError::Connection(err.to_string()),
            ErrorKind::BsonSerialization(_) | ErrorKind::BsonDeserialization(_) => {
                StorageError::Serialization(err.to_string())
            }
            _ => StorageError::Query(err.to_string()),
        }
    }
}

impl From<bson::ser::Error> for StorageError {
    fn from(err: bson::ser::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

impl From<bson::de::Error> for StorageError {
    fn from(err: bson::de::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// 存儲層結果類型別名
pub type StorageResult<T> = Result<T, StorageError>;
