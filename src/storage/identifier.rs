//! 文件識別碼
//!
//! 邊界上以字串傳遞，只有在組裝過濾條件時才轉成資料庫原生的 ObjectId。

use crate::storage::error::{StorageError, StorageResult};
use bson::oid::ObjectId;
use bson::{doc, Bson, Document};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 經驗證的文件識別碼
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(ObjectId);

impl DocumentId {
    /// 由 24 位十六進位字串建立識別碼
    pub fn parse(value: &str) -> StorageResult<Self> {
        ObjectId::parse_str(value)
            .map(Self)
            .map_err(|_| StorageError::invalid_identifier(value))
    }

    /// 產生新的識別碼（通常由資料庫指派，測試及批次插入時使用）
    pub fn generate() -> Self {
        Self(ObjectId::new())
    }

    /// 轉換為小寫十六進位字串
    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }

    pub fn object_id(&self) -> ObjectId {
        self.0
    }

    /// 以 `_id` 相等比對的過濾條件
    pub fn filter(&self) -> Document {
        doc! { "_id": self.0 }
    }

    /// 從資料庫回傳的 `_id` 取出識別碼；非 ObjectId 時返回 None
    pub fn from_bson(value: &Bson) -> Option<Self> {
        match value {
            Bson::ObjectId(oid) => Some(Self(*oid)),
            _ => None,
        }
    }
}

/// 將外部字串轉換為資料庫識別碼
pub fn to_identifier(value: &str) -> StorageResult<DocumentId> {
    DocumentId::parse(value)
}

impl FromStr for DocumentId {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_hex())
    }
}

impl From<ObjectId> for DocumentId {
    fn from(oid: ObjectId) -> Self {
        Self(oid)
    }
}

impl From<DocumentId> for ObjectId {
    fn from(id: DocumentId) -> Self {
        id.0
    }
}

impl From<DocumentId> for Bson {
    fn from(id: DocumentId) -> Self {
        Bson::ObjectId(id.0)
    }
}
