use bson::{doc, Document};
use mongodb::options::IndexOptions;
use mongodb::IndexModel;
use tracing::info;

use crate::storage::accessor::DocumentStore;
use crate::storage::error::StorageResult;
use crate::storage::models::{AiSummary, Entity, SentimentData, Stock, StockData};

/// 索引策略
///
/// 存取層從不檢查代號唯一性；需要時由資料庫的唯一索引保證。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexPolicy {
    pub unique_stock_symbols: bool,
}

/// 單一索引定義
#[derive(Debug, Clone, PartialEq)]
pub struct IndexSpec {
    pub collection: &'static str,
    pub name: &'static str,
    pub keys: Document,
    pub unique: bool,
}

impl IndexSpec {
    fn new(collection: &'static str, name: &'static str, keys: Document) -> Self {
        Self {
            collection,
            name,
            keys,
            unique: false,
        }
    }

    fn into_model(self) -> IndexModel {
        let options = IndexOptions::builder()
            .name(self.name.to_string())
            .unique(self.unique.then_some(true))
            .build();

        IndexModel::builder().keys(self.keys).options(options).build()
    }
}

/// 依策略列出需要的索引
pub fn index_plan(policy: IndexPolicy) -> Vec<IndexSpec> {
    vec![
        IndexSpec {
            unique: policy.unique_stock_symbols,
            ..IndexSpec::new(Stock::COLLECTION, "stocks_symbol", doc! { "symbol": 1 })
        },
        IndexSpec::new(
            StockData::COLLECTION,
            "stock_data_symbol_period",
            doc! { "symbol": 1, "period": 1 },
        ),
        IndexSpec::new(
            SentimentData::COLLECTION,
            "sentiment_symbol_timestamp",
            doc! { "symbol": 1, "timestamp": -1 },
        ),
        IndexSpec::new(SentimentData::COLLECTION, "sentiment_source", doc! { "source": 1 }),
        IndexSpec::new(
            AiSummary::COLLECTION,
            "ai_summaries_symbol_period_timestamp",
            doc! { "symbol": 1, "period": 1, "timestamp": -1 },
        ),
    ]
}

/// 建立索引，已存在的同名同定義索引不受影響；返回索引名稱
pub async fn ensure_indexes(store: &DocumentStore, policy: IndexPolicy) -> StorageResult<Vec<String>> {
    info!("開始建立索引 (unique_stock_symbols = {})...", policy.unique_stock_symbols);

    let mut created = Vec::new();
    for spec in index_plan(policy) {
        let collection = spec.collection;
        let name = store.create_index(collection, spec.into_model()).await?;
        info!(collection, index = %name, "索引就緒");
        created.push(name);
    }

    info!("索引建立完成，共 {} 個", created.len());
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MongoConfig;
    use crate::storage::database::test_support::CountingFactory;
    use crate::storage::database::DatabaseContext;
    use crate::storage::error::StorageError;
    use assert_matches::assert_matches;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_ensure_indexes_stops_at_operation_timeout() {
        let config = MongoConfig::new("mongodb://127.0.0.1:1", "sentiment_unit");
        let context = DatabaseContext::with_factory(config, Arc::new(CountingFactory::new()));
        let store = DocumentStore::new(Arc::new(context))
            .with_operation_timeout(Some(Duration::from_millis(200)));

        let result = ensure_indexes(&store, IndexPolicy::default()).await;

        assert_matches!(
            result,
            Err(StorageError::Timeout { operation: "create_index", collection, .. }) if collection == "stocks"
        );
    }

    #[test]
    fn test_symbol_uniqueness_is_opt_in() {
        let plan = index_plan(IndexPolicy::default());
        assert!(plan.iter().all(|spec| !spec.unique));

        let plan = index_plan(IndexPolicy {
            unique_stock_symbols: true,
        });
        let unique: Vec<_> = plan.iter().filter(|spec| spec.unique).collect();
        assert_eq!(unique.len(), 1);
        assert_eq!(unique[0].collection, "stocks");
        assert_eq!(unique[0].keys, doc! { "symbol": 1 });
    }

    #[test]
    fn test_every_collection_is_indexed() {
        let plan = index_plan(IndexPolicy::default());
        for collection in ["stocks", "stock_data", "sentiment_data", "ai_summaries"] {
            assert!(plan.iter().any(|spec| spec.collection == collection));
        }
    }

    #[test]
    fn test_into_model_carries_options() {
        let spec = IndexSpec {
            unique: true,
            ..IndexSpec::new("stocks", "stocks_symbol", doc! { "symbol": 1 })
        };
        let model = spec.into_model();

        assert_eq!(model.keys, doc! { "symbol": 1 });
        let options = model.options.unwrap();
        assert_eq!(options.unique, Some(true));
        assert_eq!(options.name.as_deref(), Some("stocks_symbol"));
    }
}
