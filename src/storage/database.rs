use crate::config::MongoConfig;
use crate::storage::error::{StorageError, StorageResult};
use async_trait::async_trait;
use bson::doc;
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Database};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, error, info};

/// 資料庫連接建立接口
///
/// 連接上下文透過此接口建立底層連接，測試可替換實現以觀察初始化次數。
#[async_trait]
pub trait ClientFactory: Send + Sync {
    /// 建立連接並返回配置指定的邏輯資料庫
    async fn connect(&self, config: &MongoConfig) -> StorageResult<Database>;
}

/// 預設的 MongoDB 連接工廠
#[derive(Debug, Default, Clone, Copy)]
pub struct MongoClientFactory;

#[async_trait]
impl ClientFactory for MongoClientFactory {
    async fn connect(&self, config: &MongoConfig) -> StorageResult<Database> {
        let mut options = ClientOptions::parse(&config.uri)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        options.app_name = Some(config.app_name.clone());
        options.connect_timeout = Some(config.connect_timeout());
        options.server_selection_timeout = Some(config.server_selection_timeout());
        options.max_pool_size = Some(config.max_pool_size);

        let client =
            Client::with_options(options).map_err(|e| StorageError::Connection(e.to_string()))?;
        let database = client.database(&config.database);

        // 測試連接
        if config.ping_on_connect {
            database.run_command(doc! { "ping": 1 }, None).await?;
        }

        Ok(database)
    }
}

/// 進程範圍的資料庫連接上下文
///
/// 在啟動時建立一次並以 `Arc` 共享。底層連接於第一次使用時建立，
/// 之後一律重用；初始化期間的並發請求會等待同一次初始化完成。
/// 初始化失敗時保持未初始化狀態，下一次請求會重新嘗試。
pub struct DatabaseContext {
    config: MongoConfig,
    factory: Arc<dyn ClientFactory>,
    database: OnceCell<Database>,
}

impl DatabaseContext {
    /// 使用預設連接工廠建立上下文
    pub fn new(config: MongoConfig) -> Self {
        Self::with_factory(config, Arc::new(MongoClientFactory))
    }

    /// 使用自訂連接工廠建立上下文
    pub fn with_factory(config: MongoConfig, factory: Arc<dyn ClientFactory>) -> Self {
        Self {
            config,
            factory,
            database: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &MongoConfig {
        &self.config
    }

    /// 連接是否已建立
    pub fn is_initialized(&self) -> bool {
        self.database.initialized()
    }

    /// 獲取共享的資料庫連接，必要時建立
    pub async fn database(&self) -> StorageResult<&Database> {
        self.database
            .get_or_try_init(|| async {
                info!(database = %self.config.database, "建立 MongoDB 連接");
                match self.factory.connect(&self.config).await {
                    Ok(database) => {
                        info!(database = %self.config.database, "MongoDB 連接建立完成");
                        Ok(database)
                    }
                    Err(err) => {
                        error!("無法建立 MongoDB 連接: {}", err);
                        Err(err)
                    }
                }
            })
            .await
    }

    /// 獲取指定名稱的集合
    pub async fn collection<T>(&self, name: &str) -> StorageResult<Collection<T>>
    where
        T: Send + Sync,
    {
        let database = self.database().await?;
        debug!(collection = name, "獲取集合");
        Ok(database.collection::<T>(name))
    }

    /// 向資料庫發送 ping，必要時先建立連接
    pub async fn ping(&self) -> StorageResult<()> {
        let database = self.database().await?;
        database.run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }
}

impl std::fmt::Debug for DatabaseContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseContext")
            .field("database", &self.config.database)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use assert_matches::assert_matches;
    use std::time::Duration;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_acquire_creates_one_connection() {
        let factory = Arc::new(CountingFactory {
            delay: Duration::from_millis(50),
            ..CountingFactory::new()
        });
        let context = Arc::new(DatabaseContext::with_factory(test_config(), factory.clone()));
        assert!(!context.is_initialized());

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let context = context.clone();
                tokio::spawn(async move {
                    context
                        .collection::<bson::Document>("stocks")
                        .await
                        .map(|c| c.name().to_string())
                })
            })
            .collect();

        for result in futures::future::join_all(handles).await {
            assert_eq!(result.unwrap().unwrap(), "stocks");
        }

        assert_eq!(factory.calls(), 1);
        assert!(context.is_initialized());
    }

    #[tokio::test]
    async fn test_connection_is_reused() {
        let factory = Arc::new(CountingFactory::new());
        let context = DatabaseContext::with_factory(test_config(), factory.clone());

        let first = context.database().await.unwrap().name().to_string();
        let second = context.database().await.unwrap().name().to_string();

        assert_eq!(first, "sentiment_unit");
        assert_eq!(first, second);
        assert_eq!(factory.calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_initialization_is_retried() {
        let factory = Arc::new(CountingFactory {
            fail_first: 1,
            ..CountingFactory::new()
        });
        let context = DatabaseContext::with_factory(test_config(), factory.clone());

        assert_matches!(context.database().await, Err(StorageError::Connection(_)));
        assert!(!context.is_initialized());

        assert!(context.database().await.is_ok());
        assert!(context.is_initialized());
        assert_eq!(factory.calls(), 2);
    }

    #[tokio::test]
    async fn test_malformed_uri_is_connection_error() {
        let context = DatabaseContext::new(MongoConfig::new("not a uri", "sentiment"));
        assert_matches!(context.database().await, Err(StorageError::Connection(_)));
        assert_matches!(context.ping().await, Err(StorageError::Connection(_)));
    }
}
