//! 通用集合存取器
//!
//! 以集合名稱為參數的 CRUD 與聚合入口，隱藏連接的取得。
//! 所有失敗原樣交給呼叫端：不重試、不退避、不做部分失敗恢復。

use crate::storage::database::DatabaseContext;
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::identifier::DocumentId;
use crate::storage::query::QueryOptions;
use bson::{Bson, Document};
use futures::TryStreamExt;
use mongodb::options::{Acknowledgment, FindOptions, WriteConcern};
use mongodb::{Collection, IndexModel};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

/// 插入結果
#[derive(Debug, Clone, PartialEq)]
pub struct InsertOutcome {
    /// 資料庫指派（或文件自帶）的 `_id`
    pub inserted_id: Bson,
    /// 寫入關注為 `w: 0` 時為 false，此時伺服器不回報寫入結果
    pub acknowledged: bool,
}

impl InsertOutcome {
    /// `_id` 為 ObjectId 時返回識別碼
    pub fn document_id(&self) -> Option<DocumentId> {
        DocumentId::from_bson(&self.inserted_id)
    }
}

/// 更新結果，未匹配時兩個計數皆為零
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOutcome {
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_id: Option<Bson>,
}

/// 刪除結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub deleted_count: u64,
}

/// 文件存儲門面
#[derive(Debug, Clone)]
pub struct DocumentStore {
    context: Arc<DatabaseContext>,
    operation_timeout: Option<Duration>,
}

impl DocumentStore {
    /// 以共享連接上下文建立存取器，逾時取自上下文配置
    pub fn new(context: Arc<DatabaseContext>) -> Self {
        let operation_timeout = context.config().operation_timeout();
        Self {
            context,
            operation_timeout,
        }
    }

    /// 覆寫單次操作逾時，`None` 表示沿用驅動預設值
    pub fn with_operation_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.operation_timeout = timeout;
        self
    }

    pub fn context(&self) -> &Arc<DatabaseContext> {
        &self.context
    }

    pub fn operation_timeout(&self) -> Option<Duration> {
        self.operation_timeout
    }

    /// 取得指定集合的句柄，必要時建立共享連接
    pub async fn acquire<T>(&self, collection: &str) -> StorageResult<Collection<T>>
    where
        T: Send + Sync,
    {
        self.context.collection::<T>(collection).await
    }

    /// 返回第一個匹配的文件，無匹配時返回 None
    pub async fn find_one<T>(
        &self,
        collection: &str,
        filter: impl Into<Document>,
    ) -> StorageResult<Option<T>>
    where
        T: DeserializeOwned + Unpin + Send + Sync,
    {
        let filter = filter.into();
        self.run("find_one", collection, async {
            let handle = self.acquire::<T>(collection).await?;
            Ok(handle.find_one(filter, None).await?)
        })
        .await
    }

    /// 返回所有匹配的文件，選項原樣傳給資料庫
    pub async fn find_many<T>(
        &self,
        collection: &str,
        filter: impl Into<Document>,
        options: QueryOptions,
    ) -> StorageResult<Vec<T>>
    where
        T: DeserializeOwned + Unpin + Send + Sync,
    {
        let filter = filter.into();
        self.run("find_many", collection, async {
            let handle = self.acquire::<T>(collection).await?;
            let cursor = handle.find(filter, FindOptions::from(options)).await?;
            Ok(cursor.try_collect::<Vec<T>>().await?)
        })
        .await
    }

    /// 原樣插入文件，不做結構驗證
    pub async fn insert_one<T>(&self, collection: &str, document: &T) -> StorageResult<InsertOutcome>
    where
        T: Serialize + Send + Sync,
    {
        self.run("insert_one", collection, async {
            let handle = self.acquire::<T>(collection).await?;
            let acknowledged = is_acknowledged(handle.write_concern());
            let result = handle.insert_one(document, None).await?;
            Ok(InsertOutcome {
                inserted_id: result.inserted_id,
                acknowledged,
            })
        })
        .await
    }

    /// 批次插入，返回與輸入順序一致的 `_id`
    ///
    /// 空輸入直接返回空結果，不會建立連接。
    pub async fn insert_many<T>(&self, collection: &str, documents: &[T]) -> StorageResult<Vec<Bson>>
    where
        T: Serialize + Send + Sync,
    {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        self.run("insert_many", collection, async {
            let handle = self.acquire::<T>(collection).await?;
            let result = handle.insert_many(documents, None).await?;

            let mut ids: Vec<(usize, Bson)> = result.inserted_ids.into_iter().collect();
            ids.sort_by_key(|(index, _)| *index);
            Ok(ids.into_iter().map(|(_, id)| id).collect())
        })
        .await
    }

    /// 更新第一個匹配的文件；未匹配不是錯誤
    pub async fn update_one(
        &self,
        collection: &str,
        filter: impl Into<Document>,
        update: impl Into<Document>,
    ) -> StorageResult<UpdateOutcome> {
        let filter = filter.into();
        let update = update.into();
        self.run("update_one", collection, async {
            let handle = self.acquire::<Document>(collection).await?;
            let result = handle.update_one(filter, update, None).await?;
            Ok(UpdateOutcome {
                matched_count: result.matched_count,
                modified_count: result.modified_count,
                upserted_id: result.upserted_id,
            })
        })
        .await
    }

    /// 刪除第一個匹配的文件
    pub async fn delete_one(
        &self,
        collection: &str,
        filter: impl Into<Document>,
    ) -> StorageResult<DeleteOutcome> {
        let filter = filter.into();
        self.run("delete_one", collection, async {
            let handle = self.acquire::<Document>(collection).await?;
            let result = handle.delete_one(filter, None).await?;
            Ok(DeleteOutcome {
                deleted_count: result.deleted_count,
            })
        })
        .await
    }

    /// 刪除所有匹配的文件
    pub async fn delete_many(
        &self,
        collection: &str,
        filter: impl Into<Document>,
    ) -> StorageResult<DeleteOutcome> {
        let filter = filter.into();
        self.run("delete_many", collection, async {
            let handle = self.acquire::<Document>(collection).await?;
            let result = handle.delete_many(filter, None).await?;
            Ok(DeleteOutcome {
                deleted_count: result.deleted_count,
            })
        })
        .await
    }

    /// 計算匹配文件數量
    pub async fn count(&self, collection: &str, filter: impl Into<Document>) -> StorageResult<u64> {
        let filter = filter.into();
        self.run("count", collection, async {
            let handle = self.acquire::<Document>(collection).await?;
            Ok(handle.count_documents(filter, None).await?)
        })
        .await
    }

    /// 原樣執行聚合管線
    pub async fn aggregate(
        &self,
        collection: &str,
        pipeline: Vec<Document>,
    ) -> StorageResult<Vec<Document>> {
        self.run("aggregate", collection, async {
            let handle = self.acquire::<Document>(collection).await?;
            let cursor = handle.aggregate(pipeline, None).await?;
            Ok(cursor.try_collect::<Vec<Document>>().await?)
        })
        .await
    }

    /// 執行聚合管線並將結果解碼為指定類型
    pub async fn aggregate_as<T>(
        &self,
        collection: &str,
        pipeline: Vec<Document>,
    ) -> StorageResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        self.aggregate(collection, pipeline)
            .await?
            .into_iter()
            .map(|doc| bson::from_document::<T>(doc).map_err(StorageError::from))
            .collect()
    }

    /// 建立索引，返回索引名稱
    pub async fn create_index(&self, collection: &str, model: IndexModel) -> StorageResult<String> {
        self.run("create_index", collection, async {
            let handle = self.acquire::<Document>(collection).await?;
            let result = handle.create_index(model, None).await?;
            Ok(result.index_name)
        })
        .await
    }

    /// 健康檢查，受同一個操作逾時限制
    pub async fn health_check(&self) -> bool {
        match self.run("ping", "$cmd", self.context.ping()).await {
            Ok(()) => true,
            Err(err) => {
                error!("MongoDB 健康檢查錯誤: {}", err);
                false
            }
        }
    }

    /// 將外部字串轉換為資料庫識別碼，不涉及網路
    pub fn to_identifier(&self, value: &str) -> StorageResult<DocumentId> {
        DocumentId::parse(value)
    }

    // 包含取得連接在內，整個操作受同一個逾時限制
    async fn run<F, R>(&self, operation: &'static str, collection: &str, fut: F) -> StorageResult<R>
    where
        F: Future<Output = StorageResult<R>>,
    {
        debug!(collection, operation, "執行資料庫操作");

        let Some(limit) = self.operation_timeout else {
            return fut.await;
        };

        match tokio::time::timeout(limit, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!(collection, operation, "資料庫操作逾時 ({:?})", limit);
                Err(StorageError::Timeout {
                    operation,
                    collection: collection.to_string(),
                    timeout: limit,
                })
            }
        }
    }
}

// 未設定 w 時採用伺服器預設值，伺服器預設一律確認寫入
fn is_acknowledged(concern: Option<&WriteConcern>) -> bool {
    !matches!(
        concern.and_then(|concern| concern.w.as_ref()),
        Some(Acknowledgment::Nodes(0))
    )
}
