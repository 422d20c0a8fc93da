use crate::storage::accessor::DocumentStore;
use crate::storage::error::StorageResult;
use crate::storage::identifier::DocumentId;
use crate::storage::models::{normalize_symbol, Entity, StockData};
use crate::storage::query::{Filter, QueryOptions, SortOrder};
use crate::storage::repository::EntityRepository;

/// 價格序列數據庫操作
#[derive(Debug, Clone)]
pub struct StockDataRepository {
    store: DocumentStore,
}

impl StockDataRepository {
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }

    /// 批次寫入一段序列，返回帶識別碼的紀錄
    pub async fn insert_series(&self, mut bars: Vec<StockData>) -> StorageResult<Vec<StockData>> {
        for bar in &mut bars {
            bar.symbol = normalize_symbol(&bar.symbol);
        }

        let ids = self.store.insert_many(StockData::COLLECTION, &bars).await?;
        for (bar, id) in bars.iter_mut().zip(ids.iter()) {
            if let Some(id) = DocumentId::from_bson(id) {
                bar.set_id(id);
            }
        }

        Ok(bars)
    }

    /// 讀取指定代號與區間的序列
    ///
    /// 時間標籤不保證可依字典序排序（"9:30" 與 "10:30"），因此依寫入順序返回。
    pub async fn series(&self, symbol: &str, period: &str) -> StorageResult<Vec<StockData>> {
        let options = QueryOptions::new().sort_by("_id", SortOrder::Ascending);
        self.store
            .find_many::<StockData>(
                StockData::COLLECTION,
                Self::series_filter(symbol, period),
                options,
            )
            .await
    }

    /// 刪除整段序列，返回刪除筆數
    pub async fn delete_series(&self, symbol: &str, period: &str) -> StorageResult<u64> {
        let outcome = self
            .store
            .delete_many(StockData::COLLECTION, Self::series_filter(symbol, period))
            .await?;
        Ok(outcome.deleted_count)
    }

    fn series_filter(symbol: &str, period: &str) -> Filter {
        Filter::new()
            .eq("symbol", normalize_symbol(symbol))
            .eq("period", period)
    }
}

impl EntityRepository for StockDataRepository {
    type Entity = StockData;

    fn store(&self) -> &DocumentStore {
        &self.store
    }
}
