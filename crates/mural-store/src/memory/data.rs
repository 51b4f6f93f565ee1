use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::debug;

use mural_shared::paths::RecordPath;

use super::{MemoryBackend, Operation};
use crate::backend::{DataStore, Snapshot, Subscription};
use crate::error::Result;

pub(crate) fn value_at<'a>(tree: &'a Value, path: &RecordPath) -> Option<&'a Value> {
    path.segments()
        .iter()
        .try_fold(tree, |node, segment| node.as_object()?.get(segment))
}

fn set_at(tree: &mut Value, path: &RecordPath, value: Value) {
    let segments = path.segments();
    let Some((last, parents)) = segments.split_last() else {
        return;
    };
    let mut node = tree;
    for segment in parents {
        let obj = ensure_object(node);
        node = obj
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    ensure_object(node).insert(last.clone(), value);
}

fn ensure_object(node: &mut Value) -> &mut Map<String, Value> {
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => map,
        _ => unreachable!("node was just made an object"),
    }
}

/// Remove the value at `segments`, pruning parents left empty.
fn remove_at(node: &mut Value, segments: &[String]) {
    let Some((first, rest)) = segments.split_first() else {
        return;
    };
    let Some(map) = node.as_object_mut() else {
        return;
    };
    if rest.is_empty() {
        map.remove(first);
        return;
    }
    if let Some(child) = map.get_mut(first) {
        remove_at(child, rest);
        let empty = matches!(child, Value::Object(m) if m.is_empty());
        if empty {
            map.remove(first);
        }
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

#[async_trait]
impl DataStore for MemoryBackend {
    async fn get(&self, path: &RecordPath) -> Result<Snapshot> {
        let mut state = self.lock();
        state.record(Operation::Get {
            path: path.to_string(),
        })?;
        Ok(Snapshot::new(path.clone(), value_at(&state.tree, path).cloned()))
    }

    async fn set(&self, path: &RecordPath, value: Value) -> Result<()> {
        let mut state = self.lock();
        state.record(Operation::Set {
            path: path.to_string(),
            value: value.clone(),
        })?;
        if is_empty_value(&value) {
            remove_at(&mut state.tree, path.segments());
        } else {
            set_at(&mut state.tree, path, value);
        }
        debug!(path = %path, "record written");
        state.notify(path);
        Ok(())
    }

    async fn remove(&self, path: &RecordPath) -> Result<()> {
        let mut state = self.lock();
        state.record(Operation::Remove {
            path: path.to_string(),
        })?;
        remove_at(&mut state.tree, path.segments());
        debug!(path = %path, "record removed");
        state.notify(path);
        Ok(())
    }

    fn subscribe(&self, path: &RecordPath) -> Subscription {
        Subscription::new(self.lock().add_subscriber(path.clone()))
    }
}
