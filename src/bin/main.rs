use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use sentiment_store::config;
use sentiment_store::logging::init_logging;
use sentiment_store::storage::{
    self, ensure_indexes, DocumentStore, IndexPolicy, SentimentRepository, StockRepository,
};
use serde::Serialize;
use tracing::info;

#[derive(Parser)]
#[command(name = "sentiment_store", about = "股票情緒儀表板資料存取工具")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 檢查資料庫連接
    Ping,

    /// 建立查詢所需的索引
    EnsureIndexes {
        /// 為 stocks.symbol 建立唯一索引
        #[arg(long)]
        unique_symbols: bool,
    },

    /// 查詢單一股票
    Stock {
        symbol: String,
    },

    /// 查詢股票最近的情緒觀測與來源統計
    Sentiment {
        symbol: String,
        #[arg(short, long, default_value_t = 10)]
        limit: i64,
    },

    /// 觀測數量最多的股票
    TopSymbols {
        #[arg(short, long, default_value_t = 5)]
        limit: i64,
    },
}

#[derive(Serialize)]
struct SentimentReport<T, U> {
    symbol: String,
    recent: Vec<T>,
    sources: Vec<U>,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // 解析命令行參數
    let cli = Cli::parse();

    // 初始化配置，缺少連接字串時在此失敗
    let app_config = config::init_config().context("無法加載應用程序配置")?;

    // 初始化日誌系統
    init_logging(&app_config.log)?;

    let store: DocumentStore = storage::open_store(app_config.mongo.clone());

    match cli.command {
        Commands::Ping => {
            if !store.health_check().await {
                return Err(anyhow!("無法連接 MongoDB 資料庫 {}", app_config.mongo.database));
            }
            info!("MongoDB 連接正常");
            println!("ok");
        }
        Commands::EnsureIndexes { unique_symbols } => {
            let policy = IndexPolicy {
                unique_stock_symbols: unique_symbols,
            };
            let names = ensure_indexes(&store, policy)
                .await
                .context("索引建立失敗")?;
            print_json(&names)?;
        }
        Commands::Stock { symbol } => {
            let repo = StockRepository::new(store.clone());
            let stock = repo
                .find_by_symbol(&symbol)
                .await
                .with_context(|| format!("查詢股票 {} 失敗", symbol))?;
            print_json(&stock)?;
        }
        Commands::Sentiment { symbol, limit } => {
            let repo = SentimentRepository::new(store.clone());
            let recent = repo
                .recent(&symbol, limit)
                .await
                .with_context(|| format!("查詢 {} 的情緒觀測失敗", symbol))?;
            let sources = repo
                .source_breakdown(&symbol)
                .await
                .with_context(|| format!("統計 {} 的情緒來源失敗", symbol))?;
            print_json(&SentimentReport {
                symbol: storage::models::normalize_symbol(&symbol),
                recent,
                sources,
            })?;
        }
        Commands::TopSymbols { limit } => {
            let repo = SentimentRepository::new(store.clone());
            let top = repo.top_symbols(limit).await.context("統計熱門股票失敗")?;
            print_json(&top)?;
        }
    }

    Ok(())
}
