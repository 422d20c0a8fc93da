#![allow(dead_code)]

use sentiment_store::config::MongoConfig;
use sentiment_store::storage::{open_store, DocumentId, DocumentStore};

/// 測試用 MongoDB 連接字串
pub fn test_uri() -> String {
    std::env::var("MONGODB_TEST_URI").unwrap_or_else(|_| {
        // Docker 環境中使用服務名稱
        if std::path::Path::new("/.dockerenv").exists() {
            "mongodb://mongo:27017".to_string()
        } else {
            "mongodb://localhost:27017".to_string()
        }
    })
}

/// 每個測試使用獨立的資料庫，避免互相干擾
pub fn setup_test_store() -> DocumentStore {
    let database = format!("sentiment_test_{}", DocumentId::generate());
    let mut config = MongoConfig::new(test_uri(), database);
    config.operation_timeout_secs = 15;
    open_store(config)
}

/// 刪除測試資料庫
pub async fn teardown(store: &DocumentStore) {
    if let Ok(database) = store.context().database().await {
        let _ = database.drop(None).await;
    }
}
