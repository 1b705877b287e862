use serde_json::{Value, json};

/// A script for a root multi-column container.
pub fn columns_script(config: Value, plan: Value, events: Vec<Value>) -> Value {
    json!({
        "container": { "mode": "columns", "config": config, "plan": plan },
        "events": events
    })
}

/// A script for a root paged container.
#[allow(dead_code)]
pub fn pages_script(config: Value, events: Vec<Value>) -> Value {
    json!({
        "container": { "mode": "pages", "config": config },
        "events": events
    })
}

/// Events for unbreakable blocks of the given heights, starting at `y` with
/// ids from `first_id`. Returns the events and the position after the last
/// block.
#[allow(dead_code)]
pub fn blocks(first_id: u32, y: i32, heights: &[i32]) -> (Vec<Value>, i32) {
    let mut events = Vec::new();
    let mut y = y;

    for (index, height) in heights.iter().enumerate() {
        events.push(json!({
            "event": "allocate",
            "y": y,
            "element": { "kind": "block", "block": first_id + index as u32 }
        }));
        y += height;
        events.push(json!({ "event": "advance_head", "y": y }));
        events.push(json!({ "event": "commit" }));
    }

    (events, y)
}

/// Events for `count` lines of `height` in container `container`, line ids
/// following the container id.
#[allow(dead_code)]
pub fn lines(container: u32, y: i32, count: u32, height: i32) -> (Vec<Value>, i32) {
    let mut events = Vec::new();
    let mut y = y;

    for line in 1..=count {
        events.push(json!({
            "event": "allocate",
            "y": y,
            "element": { "kind": "line", "container": container, "line": container + line }
        }));
        y += height;
        events.push(json!({ "event": "advance_head", "y": y }));
        events.push(json!({ "event": "commit" }));
    }

    (events, y)
}

#[allow(dead_code)]
pub fn column_break(before_block: u32) -> Value {
    json!({ "event": "break_column", "stop_before": { "kind": "block", "block": before_block } })
}

#[allow(dead_code)]
pub fn page_break(before_block: u32) -> Value {
    json!({ "event": "break_page", "stop_before": { "kind": "block", "block": before_block } })
}

pub fn finalize() -> Value {
    json!({ "event": "finalize" })
}
