use crate::storage::identifier::DocumentId;
use crate::storage::models::Entity;
use serde::{Deserialize, Serialize};

/// 價格序列中的一根K線
///
/// `time` 為顯示用標籤（"9:30" 或 "2023-01-01"），序列順序由呼叫端依標籤排序。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockData {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,
    pub symbol: String,
    pub time: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
    /// 區間標籤，例如 "1D"、"1W"、"1Y"
    pub period: String,
}

impl Entity for StockData {
    const COLLECTION: &'static str = "stock_data";

    fn id(&self) -> Option<DocumentId> {
        self.id
    }

    fn set_id(&mut self, id: DocumentId) {
        self.id = Some(id);
    }
}
