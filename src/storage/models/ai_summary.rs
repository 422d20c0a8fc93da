use crate::storage::identifier::DocumentId;
use crate::storage::models::Entity;
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// AI 生成的情緒摘要，只追加不修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiSummary {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,
    pub symbol: String,
    pub summary: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub timestamp: DateTime<Utc>,
    pub period: String,
    pub sentiment: f64,
    pub confidence: f64,
}

impl Entity for AiSummary {
    const COLLECTION: &'static str = "ai_summaries";

    fn id(&self) -> Option<DocumentId> {
        self.id
    }

    fn set_id(&mut self, id: DocumentId) {
        self.id = Some(id);
    }
}
