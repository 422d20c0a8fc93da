use crate::storage::accessor::DocumentStore;
use crate::storage::error::StorageResult;
use crate::storage::identifier::DocumentId;
use crate::storage::models::Entity;
use crate::storage::query::QueryOptions;
use async_trait::async_trait;
use bson::doc;

// 重新導出子模塊
pub mod ai_summary;
pub mod sentiment;
pub mod stock;
pub mod stock_data;

// 重新導出常用類型
pub use ai_summary::AiSummaryRepository;
pub use sentiment::SentimentRepository;
pub use stock::StockRepository;
pub use stock_data::StockDataRepository;

/// 分頁結果
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, total: u64, page: u64, page_size: u64) -> Self {
        let total_pages = if page_size == 0 {
            0
        } else {
            total.div_ceil(page_size)
        };
        Self {
            data,
            total,
            page,
            page_size,
            total_pages,
        }
    }

    pub fn empty(page: u64, page_size: u64) -> Self {
        Self::new(Vec::new(), 0, page, page_size)
    }
}

/// 查詢分頁參數，頁碼從 1 開始
#[derive(Debug, Clone, Copy)]
pub struct PageQuery {
    pub page: u64,
    pub page_size: u64,
}

impl PageQuery {
    pub fn new(page: u64, page_size: u64) -> Self {
        Self { page, page_size }
    }

    /// 轉換為 skip / limit 查詢選項
    pub fn to_options(&self) -> QueryOptions {
        let query = self.normalized();
        QueryOptions::new()
            .skip((query.page - 1).saturating_mul(query.page_size))
            .limit(i64::try_from(query.page_size).unwrap_or(i64::MAX))
    }

    /// 頁碼與每頁筆數至少為 1
    ///
    /// 資料庫把 limit 0 視為不限筆數，因此每頁筆數不能為 0。
    pub fn normalized(self) -> Self {
        Self {
            page: self.page.max(1),
            page_size: self.page_size.max(1),
        }
    }
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 20,
        }
    }
}

/// 以識別碼存取單一集合的通用操作
#[async_trait]
pub trait EntityRepository: Send + Sync {
    type Entity: Entity;

    fn store(&self) -> &DocumentStore;

    /// 插入紀錄並回填資料庫指派的識別碼
    async fn insert(&self, mut entity: Self::Entity) -> StorageResult<Self::Entity> {
        let outcome = self
            .store()
            .insert_one(Self::Entity::COLLECTION, &entity)
            .await?;
        if let Some(id) = outcome.document_id() {
            entity.set_id(id);
        }
        Ok(entity)
    }

    /// 依識別碼讀取
    async fn get_by_id(&self, id: DocumentId) -> StorageResult<Option<Self::Entity>> {
        self.store()
            .find_one::<Self::Entity>(Self::Entity::COLLECTION, id.filter())
            .await
    }

    /// 依識別碼刪除，返回是否有紀錄被刪除
    async fn delete_by_id(&self, id: DocumentId) -> StorageResult<bool> {
        let outcome = self
            .store()
            .delete_one(Self::Entity::COLLECTION, id.filter())
            .await?;
        Ok(outcome.deleted_count > 0)
    }

    /// 集合內紀錄總數
    async fn count_all(&self) -> StorageResult<u64> {
        self.store().count(Self::Entity::COLLECTION, doc! {}).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_totals() {
        let page: Page<u8> = Page::new(vec![1, 2], 41, 1, 20);
        assert_eq!(page.total_pages, 3);

        let empty: Page<u8> = Page::empty(1, 0);
        assert_eq!(empty.total_pages, 0);
    }

    #[test]
    fn test_page_query_options() {
        let options = PageQuery::new(3, 20).to_options();
        assert_eq!(options.skip, Some(40));
        assert_eq!(options.limit, Some(20));

        // 頁碼 0 視為第一頁
        let options = PageQuery::new(0, 10).to_options();
        assert_eq!(options.skip, Some(0));
    }

    #[test]
    fn test_zero_page_size_still_limits() {
        let options = PageQuery::new(1, 0).to_options();
        assert_eq!(options.skip, Some(0));
        assert_eq!(options.limit, Some(1));

        let query = PageQuery::new(0, 0).normalized();
        assert_eq!(query.page, 1);
        assert_eq!(query.page_size, 1);
    }
}
