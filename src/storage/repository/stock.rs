use bson::doc;
use chrono::Utc;
use tracing::debug;

use crate::storage::accessor::{DeleteOutcome, DocumentStore, UpdateOutcome};
use crate::storage::error::StorageResult;
use crate::storage::models::{normalize_symbol, Entity, Stock, StockQuote};
use crate::storage::query::{Filter, SortOrder, Update};
use crate::storage::repository::{EntityRepository, Page, PageQuery};

/// 股票報價數據庫操作
#[derive(Debug, Clone)]
pub struct StockRepository {
    store: DocumentStore,
}

impl StockRepository {
    /// 創建新的股票數據庫操作實例
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }

    /// 創建股票，代號轉為大寫
    pub async fn create(&self, mut stock: Stock) -> StorageResult<Stock> {
        stock.symbol = normalize_symbol(&stock.symbol);
        self.insert(stock).await
    }

    /// 根據代號獲取股票
    pub async fn find_by_symbol(&self, symbol: &str) -> StorageResult<Option<Stock>> {
        self.store
            .find_one::<Stock>(Stock::COLLECTION, Self::symbol_filter(symbol))
            .await
    }

    /// 依代號排序分頁列出
    pub async fn list(&self, page: PageQuery) -> StorageResult<Page<Stock>> {
        let page = page.normalized();
        let total = self.count_all().await?;
        if total == 0 {
            return Ok(Page::empty(page.page, page.page_size));
        }

        let options = page.to_options().sort_by("symbol", SortOrder::Ascending);
        let data = self
            .store
            .find_many::<Stock>(Stock::COLLECTION, doc! {}, options)
            .await?;

        Ok(Page::new(data, total, page.page, page.page_size))
    }

    /// 更新報價並刷新 lastUpdated
    pub async fn update_quote(&self, symbol: &str, quote: StockQuote) -> StorageResult<UpdateOutcome> {
        debug!(symbol, price = quote.price, "更新股票報價");

        let update = Update::new()
            .set("price", quote.price)
            .set("change", quote.change)
            .set("changePercent", quote.change_percent)
            .set("high", quote.high)
            .set("low", quote.low)
            .set("lastUpdated", bson::DateTime::from_chrono(Utc::now()));

        self.store
            .update_one(Stock::COLLECTION, Self::symbol_filter(symbol), update)
            .await
    }

    /// 根據代號刪除股票
    pub async fn delete_by_symbol(&self, symbol: &str) -> StorageResult<DeleteOutcome> {
        self.store
            .delete_one(Stock::COLLECTION, Self::symbol_filter(symbol))
            .await
    }

    fn symbol_filter(symbol: &str) -> Filter {
        Filter::new().eq("symbol", normalize_symbol(symbol))
    }
}

impl EntityRepository for StockRepository {
    type Entity = Stock;

    fn store(&self) -> &DocumentStore {
        &self.store
    }
}
