use crate::storage::identifier::DocumentId;
use crate::storage::models::Entity;
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 股票報價快照
///
/// 代號在集合內應唯一，但存取層不強制；見 `storage::indexes`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stock {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub high: f64,
    pub low: f64,
    /// 已格式化的成交量，例如 "45.3M"
    pub volume: String,
    /// 已格式化的市值，例如 "2.87T"
    pub market_cap: String,
    pub pe_ratio: f64,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub last_updated: DateTime<Utc>,
}

impl Entity for Stock {
    const COLLECTION: &'static str = "stocks";

    fn id(&self) -> Option<DocumentId> {
        self.id
    }

    fn set_id(&mut self, id: DocumentId) {
        self.id = Some(id);
    }
}

/// 報價更新內容
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StockQuote {
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub high: f64,
    pub low: f64,
}
