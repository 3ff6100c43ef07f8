use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use product_search::{
    config::Config,
    ingestion::IndexRebuilder,
    models::{SearchRequest, SearchResponse},
    search::IndexCatalog,
    AppError,
};
use reqwest::Client;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "product-indexer")]
#[command(about = "Product search index and query CLI", long_about = None)]
struct Cli {
    #[arg(short, long, env = "PRODUCT_SEARCH_ENDPOINT", default_value = "http://localhost:8080")]
    endpoint: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild the index from the product feed and publish the alias
    Rebuild {
        /// JSON feed to load (defaults to ingestion.feed_path)
        #[arg(short, long)]
        feed: Option<PathBuf>,

        /// Directory holding the indexes (defaults to search.index_root)
        #[arg(short = 'r', long)]
        index_root: Option<PathBuf>,

        /// Physical index to rebuild
        #[arg(short, long)]
        index: Option<String>,

        /// Alias to point at the rebuilt index
        #[arg(short, long)]
        alias: Option<String>,
    },

    /// Search a running server
    Search {
        /// Free text query
        #[arg(value_name = "QUERY")]
        query: Option<String>,

        #[arg(short, long)]
        color: Option<String>,

        #[arg(short = 's', long)]
        size: Option<String>,

        #[arg(short, long)]
        brand: Option<String>,

        #[arg(short = 'C', long)]
        category: Option<String>,

        #[arg(long)]
        min_price: Option<f64>,

        #[arg(long)]
        max_price: Option<f64>,

        #[arg(short, long, default_value = "0")]
        page: i64,

        #[arg(short = 'n', long, default_value = "10")]
        page_size: i64,
    },

    /// Check server health
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "product_search=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Rebuild {
            feed,
            index_root,
            index,
            alias,
        } => {
            let config = Config::load().context("failed to load configuration")?;

            let mut ingestion = config.ingestion;
            if let Some(feed) = feed {
                ingestion.feed_path = feed;
            }
            if let Some(index) = index {
                ingestion.index_name = index;
            }
            if let Some(alias) = alias {
                ingestion.alias = alias;
            }
            let catalog = IndexCatalog::new(index_root.unwrap_or(config.search.index_root));

            let report = tokio::task::spawn_blocking(move || {
                IndexRebuilder::new(catalog, ingestion).rebuild_index()
            })
            .await
            .context("rebuild task panicked")?
            .map_err(AppError::from)?;

            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Commands::Search {
            query,
            color,
            size,
            brand,
            category,
            min_price,
            max_price,
            page,
            page_size,
        } => {
            let request = SearchRequest {
                query_text: query,
                size: Some(page_size),
                page: Some(page),
                color,
                product_size: size,
                brand,
                category,
                min_price,
                max_price,
            };

            let response = Client::new()
                .post(format!("{}/v1/product", cli.endpoint))
                .json(&request)
                .send()
                .await
                .context("search request failed")?;

            if !response.status().is_success() {
                let status = response.status();
                let body: serde_json::Value = response.json().await.unwrap_or_default();
                bail!("search failed with {}: {}", status, body);
            }

            let body: SearchResponse = response.json().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }

        Commands::Health => {
            let response = Client::new()
                .get(format!("{}/health", cli.endpoint))
                .send()
                .await?;

            let body: serde_json::Value = response.json().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
    }

    Ok(())
}
