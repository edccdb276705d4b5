use json_storage::Registry;
use serde_json::json;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), json_storage::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let path = std::env::temp_dir().join("json_storage_demo_list.json");
    let registry = Registry::builder().pretty(false).build();
    let log = registry.open_list(&path, false)?;

    log.push(json!({"event": "start"}));
    log.extend(vec![json!(1), json!("two"), json!([3])]);
    log.insert(0, "header");
    println!("len = {}, first = {:?}", log.len(), log.get(0));
    println!("position of [3] = {:?}", log.position(&json!([3])));

    let removed = log.retain(|v| !v.is_string());
    println!("removed {removed} strings");

    log.save().await?;
    println!("On-disk JSON: {}", std::fs::read_to_string(log.path()).unwrap_or_default());

    let _ = std::fs::remove_file(&path);
    Ok(())
}
