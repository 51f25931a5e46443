/// ftcache API Demo
///
/// Walks through the cache operations:
/// - Set / Get / Exists / Remove on both stores
/// - Full-text search (case-folded and strict) with search history
/// - Bulk removal by query
/// - Flushing to disk and loading back
/// - Timed removal through the expiry worker

use ftcache::{Cache, Config, Expirer, SearchHistory, SnapshotFormat, TextSearch};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "ftcache=debug".into()))
        .init();

    println!("\n╔═══════════════════════════════════════════════╗");
    println!("║        ftcache - Complete API Demo            ║");
    println!("╚═══════════════════════════════════════════════╝\n");

    // Step 1: Create cache
    let cache = Arc::new(Cache::with_config(Config::default().with_max_entries(1_000)));

    // Step 2: SET - both stores
    println!("Step 2: SET - Adding entries...");
    for i in 0..10 {
        if i % 2 == 0 {
            cache.set(format!("key{}", i), format!("value{} hello world", i), true)?;
        } else {
            cache.set(format!("key{}", i), i, false)?;
        }
    }
    println!("  Size: {}\n", cache.size());

    // Step 3: GET / EXISTS
    println!("Step 3: GET - Reading entries...");
    println!("  key0 -> {:?}", cache.get("key0"));
    println!("  key1 -> {:?}", cache.get("key1"));
    println!("  key99 exists: {}\n", cache.exists("key99"));

    // Step 4: SEARCH
    println!("Step 4: SEARCH - Querying full-text entries...");
    let history = SearchHistory::from_config(cache.config());
    let results = cache.search_recorded(&TextSearch::new("HELLO").with_limit(3), &history);
    println!("  'HELLO' (limit 3): {:?}", results);
    println!("  'HELLO' strict: {:?}", cache.full_text_search("HELLO", 0, true));
    println!("  history for 'HELLO': {:?}\n", history.get("HELLO"));

    // Step 5: FLUSH - write a snapshot, then load it into a new cache
    println!("Step 5: FLUSH - Persisting...");
    let path = std::env::temp_dir().join("ftcache-demo.snap");
    let written = cache.flush(&path, SnapshotFormat::Binary)?;
    let reloaded = Cache::load(&path, Config::default())?;
    println!("  Wrote {} entries, reloaded {}\n", written, reloaded.size());
    std::fs::remove_file(&path)?;

    // Step 6: BULK REMOVE
    println!("Step 6: BULK REMOVE - Removing 'value2' and 'value4'...");
    println!("  Removed: {:?}", cache.full_text_remove("value2", 0));
    println!("  Removed: {:?}", cache.full_text_remove_all("VALUE4"));
    println!("  Size: {}\n", cache.size());

    // Step 7: EXPIRY - timed removal
    println!("Step 7: EXPIRY - Scheduling key1 for removal...");
    let expirer = Expirer::spawn(cache.clone())?;
    expirer.schedule("key1", Duration::from_millis(50))?;
    std::thread::sleep(Duration::from_millis(200));
    println!("  key1 exists: {}", cache.exists("key1"));
    expirer.shutdown();

    // Step 8: STATS
    println!("\nStep 8: STATISTICS");
    println!("  {}", serde_json::to_string_pretty(&cache.stats())?);

    cache.clear();
    println!("\n  After clear: size = {}", cache.size());

    Ok(())
}
