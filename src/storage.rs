//! MongoDB 存儲模組
//!
//! 提供進程範圍的連接上下文、以集合名稱為參數的通用存取器，
//! 以及建立於其上的實體模型與倉儲。

pub mod accessor;
pub mod database;
pub mod error;
pub mod identifier;
pub mod indexes;
pub mod models;
pub mod query;
pub mod repository;

pub use accessor::{DeleteOutcome, DocumentStore, InsertOutcome, UpdateOutcome};
pub use database::{ClientFactory, DatabaseContext, MongoClientFactory};
pub use error::{StorageError, StorageResult};
pub use identifier::{to_identifier, DocumentId};
pub use indexes::{ensure_indexes, index_plan, IndexPolicy, IndexSpec};
pub use query::{Filter, QueryOptions, SortOrder, Update};

// 匯出主要的模型
pub use models::{AiSummary, Entity, SentimentData, Stock, StockData, StockQuote};

// 匯出主要的倉儲
pub use repository::{
    AiSummaryRepository, EntityRepository, Page, PageQuery, SentimentRepository,
    StockDataRepository, StockRepository,
};

use crate::config::MongoConfig;
use std::sync::Arc;

/// 由配置建立共享上下文與存取器
pub fn open_store(config: MongoConfig) -> DocumentStore {
    DocumentStore::new(Arc::new(DatabaseContext::new(config)))
}
