use json_storage::{ListStorage, Registry};
use serde_json::{json, Value};
use tempfile::TempDir;

fn open_fresh(name: &str) -> (TempDir, ListStorage) {
    let dir = TempDir::new().unwrap();
    let list = Registry::new()
        .open_list(dir.path().join(name), false)
        .unwrap();
    (dir, list)
}

#[test]
fn push_pop_get() {
    let (_dir, list) = open_fresh("push.json");
    assert!(list.is_empty());

    list.push(1);
    list.push("x");
    list.push(true);
    assert_eq!(list.len(), 3);
    assert_eq!(list.get(1), Some(json!("x")));
    assert_eq!(list.get(3), None);

    assert_eq!(list.pop(), Some(json!(true)));
    assert_eq!(list.to_vec(), vec![json!(1), json!("x")]);
}

#[test]
fn insert_set_remove_by_index() {
    let (_dir, list) = open_fresh("index.json");
    list.extend(vec![json!("a"), json!("c")]);

    assert!(list.insert(1, "b"));
    assert!(list.insert(3, "d"));
    assert!(!list.insert(10, "nope"));
    assert_eq!(list.to_vec(), vec![json!("a"), json!("b"), json!("c"), json!("d")]);

    assert_eq!(list.set(0, "A"), Some(json!("a")));
    assert_eq!(list.set(9, "nope"), None);

    assert_eq!(list.remove(1), Some(json!("b")));
    assert_eq!(list.remove(9), None);
    assert_eq!(list.to_vec(), vec![json!("A"), json!("c"), json!("d")]);
}

#[test]
fn update_and_retain() {
    let (_dir, list) = open_fresh("mutate.json");
    list.extend(1..=6);

    assert!(list.update(0, |v| *v = json!(100)));
    assert!(!list.update(42, |_| panic!("should not be called")));

    let removed = list.retain(|v| v.as_i64().map_or(false, |n| n % 2 == 0));
    assert_eq!(removed, 3);
    assert_eq!(list.to_vec(), vec![json!(100), json!(2), json!(4), json!(6)]);

    list.clear();
    assert!(list.is_empty());
}

#[test]
fn update_and_retain_closures_can_read_the_list() {
    let (_dir, list) = open_fresh("mutate_reentrant.json");
    list.extend(vec![json!(0), json!(1), json!(2)]);

    let inner = list.clone();
    assert!(list.update(0, |v| *v = json!(inner.len())));
    assert_eq!(list.get(0), Some(json!(3)));

    let removed = list.retain(|v| {
        assert_eq!(inner.len(), 3);
        inner.contains(v) && v != &json!(1)
    });
    assert_eq!(removed, 1);
    assert_eq!(list.to_vec(), vec![json!(3), json!(2)]);
}

#[test]
fn update_is_dropped_if_index_vanishes() {
    let (_dir, list) = open_fresh("update_shrink.json");
    list.push("only");

    let inner = list.clone();
    let stored = list.update(0, |v| {
        inner.clear();
        *v = json!("changed");
    });
    assert!(!stored);
    assert!(list.is_empty());
}

#[test]
fn contains_and_position_use_deep_equality() {
    let (_dir, list) = open_fresh("lookup.json");
    list.push(json!({"a": 1, "b": [1, 2]}));
    list.push(json!([1, 2]));

    assert!(list.contains(&json!({"b": [1, 2], "a": 1})));
    assert_eq!(list.position(&json!([1.0, 2])), Some(1));
    assert_eq!(list.position(&json!([2, 1])), None);
}

#[test]
fn to_json_pretty_and_compact() {
    let (_dir, list) = open_fresh("to_json.json");
    assert_eq!(list.to_json(true), "[]");
    assert_eq!(list.to_json(false), "[]");

    list.extend(vec![json!(1), json!("x"), json!(true)]);
    assert_eq!(list.to_json(false), "[1,\"x\",true]");
    assert_eq!(list.to_json(true), "[\n\t1,\n\t\"x\",\n\ttrue\n]");

    list.push(json!({"nested": [1, {"deep": null}]}));
    assert!(list
        .to_json(true)
        .ends_with("\n\t{\"nested\":[1,{\"deep\":null}]}\n]"));
}

#[test]
fn loaded_file_round_trips_through_serializer() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("round.json");
    let original = r#"[3, "two", {"one": [1]}, null, 2.5]"#;
    std::fs::write(&path, original).unwrap();

    let list = Registry::new().open_list(&path, false).unwrap();
    assert_eq!(list.len(), 5);

    let expected: Value = serde_json::from_str(original).unwrap();
    for pretty in [true, false] {
        let reparsed: Value = serde_json::from_str(&list.to_json(pretty)).unwrap();
        assert_eq!(reparsed, expected);
    }
}
