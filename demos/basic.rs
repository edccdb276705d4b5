use json_storage::MapStorage;
use serde_json::json;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), json_storage::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let path = std::env::temp_dir()
        .join("json_storage_demo")
        .join("basic.json");
    let db = MapStorage::open(&path, false)?;

    // insert / get / remove
    db.insert("apples", 3);
    db.insert("bananas", json!({"count": 5, "ripe": true}));
    println!("apples  = {:?}", db.get("apples"));
    println!("bananas = {:?}", db.get("bananas"));

    // update in place
    db.update("apples", |n| *n = json!(n.as_i64().unwrap_or(0) + 1));
    println!("apples after update = {:?}", db.get("apples"));

    // lookups by value
    db.insert("pears", 4);
    println!("has 4?        = {}", db.has_value(&json!(4)));
    println!("keys with 4   = {:?}", db.get_key(&json!(4), false));

    // detached projection
    let numbers = db.filter(|v, _, _| v.is_number());
    println!("numbers only  = {}", serde_json::Value::Object(numbers));

    // persist; the same path opened again is the same map
    db.save().await?;
    let again = MapStorage::open(&path, false)?;
    println!("same instance? = {}", again.ptr_eq(&db));

    let contents = std::fs::read_to_string(db.path()).unwrap_or_default();
    println!("On-disk JSON:\n{contents}");

    let _ = std::fs::remove_file(&path);
    Ok(())
}
