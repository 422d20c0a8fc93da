use crate::storage::accessor::DocumentStore;
use crate::storage::error::StorageResult;
use crate::storage::models::{normalize_symbol, AiSummary, Entity};
use crate::storage::query::{Filter, QueryOptions, SortOrder};
use crate::storage::repository::EntityRepository;

/// AI 摘要數據庫操作（只追加）
#[derive(Debug, Clone)]
pub struct AiSummaryRepository {
    store: DocumentStore,
}

impl AiSummaryRepository {
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }

    /// 追加一筆摘要
    pub async fn append(&self, mut summary: AiSummary) -> StorageResult<AiSummary> {
        summary.symbol = normalize_symbol(&summary.symbol);
        self.insert(summary).await
    }

    /// 指定區間最新的一筆摘要
    pub async fn latest(&self, symbol: &str, period: &str) -> StorageResult<Option<AiSummary>> {
        let filter = Filter::new()
            .eq("symbol", normalize_symbol(symbol))
            .eq("period", period);
        let options = QueryOptions::new()
            .sort_by("timestamp", SortOrder::Descending)
            .limit(1);

        let summaries = self
            .store
            .find_many::<AiSummary>(AiSummary::COLLECTION, filter, options)
            .await?;
        Ok(summaries.into_iter().next())
    }

    /// 摘要歷史，新到舊
    pub async fn history(&self, symbol: &str, limit: i64) -> StorageResult<Vec<AiSummary>> {
        let options = QueryOptions::new()
            .sort_by("timestamp", SortOrder::Descending)
            .limit(limit);

        self.store
            .find_many::<AiSummary>(
                AiSummary::COLLECTION,
                Filter::new().eq("symbol", normalize_symbol(symbol)),
                options,
            )
            .await
    }
}

impl EntityRepository for AiSummaryRepository {
    type Entity = AiSummary;

    fn store(&self) -> &DocumentStore {
        &self.store
    }
}
