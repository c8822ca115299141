use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

use kindling::api::{AlgoliaClient, FeedType, HnClient};
use kindling::app::{App, AppEvent};
use kindling::config::Config;
use kindling::feed::{CommentTree, FeedCursor, ItemCache, LiveUpdateMonitor, LoadTrigger};
use kindling::render::Renderer;
use kindling::ui::{self, FeedView};

/// Get the config directory path (~/.config/kindling/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("kindling"))
}

#[derive(Parser, Debug)]
#[command(name = "kindling", about = "Terminal Hacker News reader")]
struct Args {
    /// Feed to open at startup: stories, jobs, or polls
    #[arg(long, default_value = "stories")]
    feed: String,

    /// Path to config file (default: ~/.config/kindling/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing for debug logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let feed = FeedType::parse(&args.feed)
        .ok_or_else(|| anyhow::anyhow!("Unknown feed '{}' (stories|jobs|polls)", args.feed))?;

    let config_path = match args.config {
        Some(path) => path,
        None => get_config_dir()?.join("config.toml"),
    };
    let config = Config::load(&config_path).context("Failed to load configuration")?;

    let http_client = reqwest::Client::builder()
        .user_agent(concat!("kindling/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;

    // Wire the engine: one shared view, one shared cache, the cursor and
    // tree on top, triggers and the live monitor around them.
    let view = Arc::new(FeedView::new());
    let renderer: Arc<dyn Renderer> = view.clone();
    let source = Arc::new(HnClient::new(http_client.clone(), &config.api_base_url));
    let search_source = Arc::new(AlgoliaClient::new(
        http_client.clone(),
        &config.search_base_url,
    ));
    let cache = Arc::new(ItemCache::new(source.clone(), renderer.clone()));
    let cursor = Arc::new(FeedCursor::new(
        source.clone(),
        cache.clone(),
        renderer.clone(),
        feed,
        config.batch_size,
    ));
    let tree = Arc::new(CommentTree::new(
        cache.clone(),
        renderer.clone(),
        config.cache_collapsed_subtrees,
    ));
    let trigger = Arc::new(LoadTrigger::new(
        cursor.clone(),
        config.advance_throttle(),
        config.signal_throttle(),
    ));

    let monitor = Arc::new(LiveUpdateMonitor::new(
        source.clone(),
        cursor.clone(),
        renderer.clone(),
        config.live_poll_interval(),
    ));
    let monitor_handle = monitor.spawn();

    let mut app = App::new(config, cursor, tree, trigger, search_source, view, feed);

    // Create event channel for background tasks
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);

    let result = ui::run(&mut app, event_tx, event_rx).await;

    monitor_handle.abort();
    result
}
