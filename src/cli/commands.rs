//! CLI command implementations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cache::BoundsCache;
use crate::fetch::TravelAdvisorFetcher;
use crate::gateway::{GatewayStats, LookupSource, PlacesGateway};
use crate::limiter::RateLimiter;
use crate::storage::KeyValueStore;
use crate::types::config::Config;
use crate::types::place::{filter_by_rating, filter_valid};
use crate::types::{Bounds, LatLng, QueryType};
use crate::PlacegateResult;

/// Initializes configuration in the specified directory.
pub async fn init(path: Option<PathBuf>) -> PlacegateResult<()> {
    let target_dir = path.unwrap_or_else(|| PathBuf::from("."));

    if !target_dir.exists() {
        std::fs::create_dir_all(&target_dir)?;
        tracing::info!("Directory created: {}", target_dir.display());
    }

    let config_path = target_dir.join("placegate.toml");

    if config_path.exists() {
        println!("Configuration already exists at: {}", config_path.display());
        return Ok(());
    }

    // Create .placegate/ directory for the state database
    let data_dir = target_dir.join(".placegate");
    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)?;
        tracing::info!(".placegate/ directory created");
    }

    update_gitignore(&target_dir)?;

    let config = Config::default_config();
    config.save(&config_path)?;

    println!("placegate initialized successfully!");
    println!("Configuration created at: {}", config_path.display());
    println!("Data directory: .placegate/");
    println!();
    println!("Next steps:");
    println!("  1. Set upstream.api_key in placegate.toml or export PLACEGATE_API_KEY");
    println!("  2. placegate lookup --type restaurants --sw 48.85,2.33 --ne 48.87,2.36");

    Ok(())
}

/// Adds .placegate/ to .gitignore, creating the file if needed.
fn update_gitignore(target_dir: &Path) -> PlacegateResult<()> {
    let gitignore_path = target_dir.join(".gitignore");
    let entry = ".placegate/";
    let comment = "# placegate - local cache and rate limit state";

    if gitignore_path.exists() {
        let content = std::fs::read_to_string(&gitignore_path)?;

        if content.lines().any(|line| line.trim() == entry || line.trim() == ".placegate") {
            tracing::debug!(".gitignore already contains .placegate/");
            return Ok(());
        }

        let mut new_content = content.trim_end().to_string();
        if !new_content.is_empty() {
            new_content.push_str("\n\n");
        }
        new_content.push_str(comment);
        new_content.push('\n');
        new_content.push_str(entry);
        new_content.push('\n');

        std::fs::write(&gitignore_path, new_content)?;
        println!(".gitignore updated with .placegate/");
    } else {
        let content = format!("{}\n{}\n", comment, entry);
        std::fs::write(&gitignore_path, content)?;
        println!(".gitignore created with .placegate/");
    }

    Ok(())
}

/// Opens the configured state store.
#[cfg(feature = "sqlite")]
pub fn open_store(config: &Config) -> PlacegateResult<Arc<dyn KeyValueStore>> {
    let store = crate::storage::SqliteStore::open(&config.storage.db_path)?;
    tracing::debug!("State store opened at {}", config.storage.db_path.display());
    Ok(Arc::new(store))
}

/// Opens the configured state store.
#[cfg(not(feature = "sqlite"))]
pub fn open_store(_config: &Config) -> PlacegateResult<Arc<dyn KeyValueStore>> {
    tracing::warn!("Built without sqlite support, state will not persist");
    Ok(Arc::new(crate::storage::MemoryStore::new()))
}

/// Looks up places through the cache and rate limiter.
pub async fn lookup(
    query_type: &QueryType,
    sw: LatLng,
    ne: LatLng,
    min_rating: Option<f64>,
    json: bool,
    config: &Config,
) -> PlacegateResult<()> {
    let bounds = Bounds::new(sw, ne)?;
    let fetcher = TravelAdvisorFetcher::from_config(&config.upstream)?;
    let store = open_store(config)?;

    let gateway = PlacesGateway::new(
        BoundsCache::new(&config.cache, store.clone()),
        RateLimiter::new(&config.rate_limit, store),
        Arc::new(fetcher),
    );

    let outcome = gateway.lookup(query_type, &bounds).await;

    let mut places = filter_valid(outcome.places);
    if let Some(min) = min_rating {
        places = filter_by_rating(places, min);
    }

    match &outcome.source {
        LookupSource::Cache => eprintln!("Served from cache"),
        LookupSource::Upstream => eprintln!("Fetched from upstream"),
        LookupSource::RateLimited { reset_in_minutes } => {
            eprintln!(
                "API rate limit reached. Try again in {} minute(s).",
                reset_in_minutes
            );
        }
        LookupSource::UpstreamFailed { reason } => {
            eprintln!("Upstream request failed: {}", reason);
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&places)?);
        return Ok(());
    }

    if places.is_empty() {
        println!("No {} found.", query_type);
        return Ok(());
    }

    for place in &places {
        let name = place.name().unwrap_or("(unnamed)");
        match place.rating() {
            Some(rating) => println!("  {:<40} {:.1}", name, rating),
            None => println!("  {}", name),
        }
    }
    println!();
    println!("{} {}", places.len(), query_type);

    Ok(())
}

/// Shows cache and rate limit statistics.
pub async fn stats(json: bool, config: &Config) -> PlacegateResult<()> {
    let store = open_store(config)?;
    let cache = BoundsCache::new(&config.cache, store.clone());
    let mut limiter = RateLimiter::new(&config.rate_limit, store);

    let stats = GatewayStats {
        cache: cache.stats(),
        rate_limit: limiter.stats(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("Cache");
    println!("  {} / {} entries", stats.cache.size, stats.cache.max_size);
    for key in &stats.cache.entries {
        println!("    {}", key);
    }
    println!();
    println!("Rate limit");
    println!(
        "  {} / {} requests remaining",
        stats.rate_limit.remaining, stats.rate_limit.limit
    );
    if stats.rate_limit.reset_in > 0 {
        println!(
            "  Next request frees up in {} minute(s)",
            stats.rate_limit.reset_in_minutes
        );
    }

    Ok(())
}

/// Empties the cache.
pub async fn clear_cache(config: &Config) -> PlacegateResult<()> {
    let store = open_store(config)?;
    BoundsCache::new(&config.cache, store).clear();
    println!("Cache cleared.");
    Ok(())
}

/// Restarts the rate limit window.
pub async fn reset_limit(config: &Config) -> PlacegateResult<()> {
    let store = open_store(config)?;
    RateLimiter::new(&config.rate_limit, store).reset();
    println!("Rate limit reset. This should only be used for testing.");
    Ok(())
}

/// Shows version.
pub fn version() {
    println!("placegate {}", env!("CARGO_PKG_VERSION"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_update_gitignore_appends_once() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(".gitignore"), "target/\n").unwrap();

        update_gitignore(dir.path()).unwrap();
        update_gitignore(dir.path()).unwrap();

        let content = std::fs::read_to_string(dir.path().join(".gitignore")).unwrap();
        assert!(content.starts_with("target/\n\n"));
        assert_eq!(content.matches(".placegate/").count(), 1);
    }

    #[tokio::test]
    async fn test_init_writes_config() {
        let dir = TempDir::new().unwrap();
        init(Some(dir.path().to_path_buf())).await.unwrap();

        assert!(dir.path().join("placegate.toml").exists());
        assert!(dir.path().join(".placegate").is_dir());
        let config = Config::load(dir.path().join("placegate.toml")).unwrap();
        assert_eq!(config.cache.max_size, 10);
    }
}
