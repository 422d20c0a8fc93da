use crate::storage::identifier::DocumentId;
use crate::storage::models::Entity;
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 單筆情緒觀測
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentData {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,
    pub symbol: String,
    /// 來源標籤，例如 "reddit"、"x"、"discord"
    pub source: String,
    pub sentiment: f64,
    pub confidence: f64,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub timestamp: DateTime<Utc>,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Entity for SentimentData {
    const COLLECTION: &'static str = "sentiment_data";

    fn id(&self) -> Option<DocumentId> {
        self.id
    }

    fn set_id(&mut self, id: DocumentId) {
        self.id = Some(id);
    }
}

/// 依來源分組的情緒統計（聚合結果）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceBreakdown {
    #[serde(rename = "_id")]
    pub source: String,
    pub count: i64,
    pub average_sentiment: f64,
    pub average_confidence: f64,
}

/// 觀測數量排行（聚合結果）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolMentions {
    #[serde(rename = "_id")]
    pub symbol: String,
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_optional_url_is_omitted() {
        let observation = SentimentData {
            id: None,
            symbol: "TSLA".to_string(),
            source: "reddit".to_string(),
            sentiment: -0.4,
            confidence: 0.8,
            timestamp: Utc::now(),
            text: "deliveries look weak".to_string(),
            url: None,
        };

        let doc = bson::to_document(&observation).unwrap();
        assert!(!doc.contains_key("url"));
        assert!(!doc.contains_key("_id"));
    }

    #[test]
    fn test_decode_breakdown_row() {
        let row: SourceBreakdown = bson::from_document(doc! {
            "_id": "reddit",
            "count": 3_i64,
            "average_sentiment": 0.25,
            "average_confidence": 0.7,
        })
        .unwrap();

        assert_eq!(row.source, "reddit");
        assert_eq!(row.count, 3);
    }
}
