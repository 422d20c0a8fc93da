use bson::{doc, Document};

use crate::storage::accessor::DocumentStore;
use crate::storage::error::StorageResult;
use crate::storage::models::{
    normalize_symbol, Entity, SentimentData, SourceBreakdown, SymbolMentions,
};
use crate::storage::query::{Filter, QueryOptions, SortOrder};
use crate::storage::repository::EntityRepository;

/// 情緒觀測數據庫操作
#[derive(Debug, Clone)]
pub struct SentimentRepository {
    store: DocumentStore,
}

impl SentimentRepository {
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }

    /// 記錄一筆觀測
    pub async fn record(&self, mut observation: SentimentData) -> StorageResult<SentimentData> {
        observation.symbol = normalize_symbol(&observation.symbol);
        self.insert(observation).await
    }

    /// 最近的觀測，新到舊
    pub async fn recent(&self, symbol: &str, limit: i64) -> StorageResult<Vec<SentimentData>> {
        let options = QueryOptions::new()
            .sort_by("timestamp", SortOrder::Descending)
            .limit(limit);

        self.store
            .find_many::<SentimentData>(
                SentimentData::COLLECTION,
                Filter::new().eq("symbol", normalize_symbol(symbol)),
                options,
            )
            .await
    }

    /// 依來源統計筆數與平均情緒，筆數多者在前
    pub async fn source_breakdown(&self, symbol: &str) -> StorageResult<Vec<SourceBreakdown>> {
        self.store
            .aggregate_as::<SourceBreakdown>(
                SentimentData::COLLECTION,
                source_breakdown_pipeline(symbol),
            )
            .await
    }

    /// 觀測數量最多的代號
    pub async fn top_symbols(&self, limit: i64) -> StorageResult<Vec<SymbolMentions>> {
        self.store
            .aggregate_as::<SymbolMentions>(SentimentData::COLLECTION, top_symbols_pipeline(limit))
            .await
    }
}

impl EntityRepository for SentimentRepository {
    type Entity = SentimentData;

    fn store(&self) -> &DocumentStore {
        &self.store
    }
}

fn source_breakdown_pipeline(symbol: &str) -> Vec<Document> {
    vec![
        doc! { "$match": { "symbol": normalize_symbol(symbol) } },
        doc! {
            "$group": {
                "_id": "$source",
                "count": { "$sum": 1 },
                "average_sentiment": { "$avg": "$sentiment" },
                "average_confidence": { "$avg": "$confidence" },
            }
        },
        doc! { "$sort": { "count": -1, "_id": 1 } },
    ]
}

fn top_symbols_pipeline(limit: i64) -> Vec<Document> {
    vec![
        doc! { "$group": { "_id": "$symbol", "count": { "$sum": 1 } } },
        doc! { "$sort": { "count": -1, "_id": 1 } },
        doc! { "$limit": limit },
    ]
}
