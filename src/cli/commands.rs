use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, info, warn};

use crate::cli::Cli;
use crate::config::{Config, StoreBackend};
use crate::error::{Error, Result};
use crate::feed::{FeedLoader, ReqwestHttpClient, RemoteFeedLoader};
use crate::storage::{FeedCachePolicy, FeedStore, FileFeedStore, LocalFeedLoader, SqliteFeedStore};

/// Write a default configuration file
pub async fn init(config_path: Option<PathBuf>, force: bool) -> Result<()> {
    let config_file = get_config_file(config_path)?;

    if config_file.exists() && !force {
        warn!("Configuration file already exists: {}", config_file.display());
        return Err(Error::Invalid(format!(
            "Configuration file already exists: {} (use --force to overwrite)",
            config_file.display()
        )));
    }

    if let Some(parent) = config_file.parent() {
        fs::create_dir_all(parent)?;
    }

    Config::default().save(&config_file)?;
    info!("Created default configuration: {}", config_file.display());

    println!("✅ feed-cache initialized");
    println!("   Config file: {}", config_file.display());
    println!();
    println!("Next steps:");
    println!("   1. Set [remote] url in the config file (or FEED_CACHE_FEED_URL)");
    println!("   2. Fetch and cache the feed: feed-cache refresh");

    Ok(())
}

/// Fetch the remote feed and store it in the local cache
pub async fn refresh(config: &Config) -> Result<()> {
    let url = config.feed_url()?;
    let client = ReqwestHttpClient::with_timeout(Duration::from_secs(config.remote.timeout))?
        .with_user_agent(config.remote.user_agent.clone());
    let remote = RemoteFeedLoader::new(url, client);

    println!("📡 Fetching {}", remote.url());
    let feed = remote.load().await?;

    let local = local_loader(open_store(config)?);
    local.save(&feed).await?;

    println!("✅ Cached {} items", feed.len());
    Ok(())
}

/// Print the cached feed, if fresh
pub async fn load(config: &Config) -> Result<()> {
    let local = local_loader(open_store(config)?);
    let feed = local.load().await?;

    if feed.is_empty() {
        println!("📭 No fresh items in the cache");
        return Ok(());
    }

    println!("📰 {} cached items:", feed.len());
    for item in &feed {
        println!("   {}", item.summary());
    }

    Ok(())
}

/// Run cache validation
pub async fn validate(config: &Config) -> Result<()> {
    let local = local_loader(open_store(config)?);
    local.validate_cache().await;

    println!("✅ Cache validated");
    Ok(())
}

/// Delete the cached feed
pub async fn clear(config: &Config) -> Result<()> {
    let store = open_store(config)?;
    store.delete_cached_feed().await?;

    println!("🗑️  Cache cleared");
    Ok(())
}

/// Report what the store holds without applying the expiration policy
pub async fn status(config: &Config) -> Result<()> {
    println!("📊 feed-cache status");
    println!("   Backend: {}", config.store.backend);
    println!("   Location: {}", config.store.path.display());

    let store = open_store(config)?;
    match store.retrieve().await {
        Ok(None) => println!("   Cache: empty"),
        Ok(Some(cache)) => {
            let now = Utc::now();
            let age = now.signed_duration_since(cache.timestamp);
            let state = if FeedCachePolicy::validate(cache.timestamp, now) {
                "fresh"
            } else {
                "expired"
            };

            println!("   Cache: {} items, written {}", cache.items.len(), cache.timestamp);
            println!("   Age: {}h ({})", age.num_hours(), state);
        }
        Err(e) => {
            warn!("Failed to read cache: {}", e);
            println!("   Cache: unreadable ({})", e);
            println!("   Run `feed-cache validate` to discard it");
        }
    }

    Ok(())
}

/// Generate shell completions
pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

/// Initialize logging based on the configured level and verbosity flags
pub fn init_logging(level: &str, debug: bool, verbose: bool, json: bool) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_new(level)
            .map_err(|e| Error::Config(format!("Invalid log level '{}': {}", level, e)))?
    };

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_file(debug)
        .with_line_number(debug)
        .with_writer(io::stderr);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| Error::Config(format!("Failed to initialize logging: {}", e)))?;

    debug!("Logging initialized");
    Ok(())
}

/// Load the configuration file, falling back to defaults when none exists
pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
    match config_path {
        Some(path) => Config::load_with_env(path),
        None => {
            let default_file = Config::config_dir()?.join("config.toml");
            if default_file.exists() {
                Config::load_with_env(&default_file)
            } else {
                Config::from_env()
            }
        }
    }
}

/// Open the configured store backend
pub fn open_store(config: &Config) -> Result<Arc<dyn FeedStore>> {
    let path = &config.store.path;
    debug!("Opening {} store at {}", config.store.backend, path.display());

    let store: Arc<dyn FeedStore> = match config.store.backend {
        StoreBackend::File => Arc::new(FileFeedStore::new(path)?),
        StoreBackend::Sqlite => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            Arc::new(SqliteFeedStore::open(path)?)
        }
    };

    Ok(store)
}

fn local_loader(store: Arc<dyn FeedStore>) -> LocalFeedLoader<Arc<dyn FeedStore>> {
    LocalFeedLoader::new(store, Utc::now)
}

fn get_config_file(config_path: Option<PathBuf>) -> Result<PathBuf> {
    match config_path {
        Some(path) => Ok(path),
        None => Ok(Config::config_dir()?.join("config.toml")),
    }
}
