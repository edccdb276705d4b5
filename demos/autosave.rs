use json_storage::{Autosave, MapStorage};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), json_storage::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("json_storage=debug")),
        )
        .init();

    let path = std::env::temp_dir().join("json_storage_demo_autosave.json");
    let _ = std::fs::remove_file(&path);

    // saves itself every 500 ms for the rest of the process
    let counters = MapStorage::open(&path, Autosave::Every(Duration::from_millis(500)))?;

    for i in 0..5u64 {
        counters.insert("ticks", i);
        tokio::time::sleep(Duration::from_millis(300)).await;
        let on_disk = std::fs::read_to_string(counters.path()).unwrap_or_default();
        println!("in memory: {i}, on disk: {}", on_disk.replace('\n', " "));
    }

    let _ = std::fs::remove_file(&path);
    Ok(())
}
