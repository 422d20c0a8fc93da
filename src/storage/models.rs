pub mod ai_summary;
pub mod sentiment;
pub mod stock;
pub mod stock_data;

// 重新匯出常用模型類型
pub use ai_summary::*;
pub use sentiment::*;
pub use stock::*;
pub use stock_data::*;

use crate::storage::identifier::DocumentId;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// 存放於集合中的紀錄
///
/// 紀錄本身沒有行為，只宣告所屬集合及可選的 `_id`。
pub trait Entity: Serialize + DeserializeOwned + Unpin + Send + Sync {
    /// 所屬集合名稱
    const COLLECTION: &'static str;

    /// 資料庫指派的識別碼，插入前為 None
    fn id(&self) -> Option<DocumentId>;

    fn set_id(&mut self, id: DocumentId);
}

/// 將股票代號正規化為大寫
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_symbol() {
        assert_eq!(normalize_symbol(" aapl "), "AAPL");
        assert_eq!(normalize_symbol("BRK.b"), "BRK.B");
    }

    #[test]
    fn test_collection_names() {
        assert_eq!(Stock::COLLECTION, "stocks");
        assert_eq!(StockData::COLLECTION, "stock_data");
        assert_eq!(SentimentData::COLLECTION, "sentiment_data");
        assert_eq!(AiSummary::COLLECTION, "ai_summaries");
    }
}
