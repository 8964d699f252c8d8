//! In-memory JSON document with change notifications.

use std::fmt;

use serde_json::{Map, Value};
use tracing::{debug, trace};

use super::{coerce_edit, DocumentChange, DocumentStore, ValueUpdate};
use crate::error::{GridError, Result};
use crate::path::{Path, Segment};

type Listener = Box<dyn FnMut(&DocumentChange)>;

/// Base name of keys created by [`DocumentStore::insert_key`].
const NEW_KEY: &str = "newKey";

/// An owned JSON document.
pub struct JsonDocument {
    data: Value,
    revision: u64,
    listeners: Vec<Listener>,
}

impl fmt::Debug for JsonDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonDocument")
            .field("revision", &self.revision)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl Default for JsonDocument {
    fn default() -> Self {
        Self::new(Value::Null)
    }
}

impl JsonDocument {
    pub fn new(data: Value) -> Self {
        Self {
            data,
            revision: 0,
            listeners: Vec::new(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.data)?)
    }

    /// Register a change listener, called after every successful mutation.
    pub fn subscribe(&mut self, listener: impl FnMut(&DocumentChange) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Replace the whole document.
    pub fn set_data(&mut self, data: Value) {
        self.data = data;
        self.notify(DocumentChange::Replaced);
    }

    pub fn into_value(self) -> Value {
        self.data
    }

    fn notify(&mut self, change: DocumentChange) {
        self.revision += 1;
        trace!(revision = self.revision, ?change, "document changed");
        for listener in &mut self.listeners {
            listener(&change);
        }
    }

    fn array_mut(&mut self, path: &str) -> Result<(Path, &mut Vec<Value>)> {
        let parsed = Path::parse(path)?;
        match parsed.resolve_mut(&mut self.data) {
            Some(Value::Array(items)) => Ok((parsed, items)),
            Some(_) => Err(GridError::NotAnArray(path.to_string())),
            None => Err(GridError::PathNotFound(path.to_string())),
        }
    }

    /// Every object addressed by `path`, fanning out over arrays.
    fn objects_mut(&mut self, path: &Path) -> Result<Vec<&mut Map<String, Value>>> {
        let mut found = Vec::new();
        collect_objects(&mut self.data, path.segments(), &mut found);
        if found.is_empty() {
            return Err(GridError::NotAnObject(path.to_string()));
        }
        Ok(found)
    }

    fn apply_update(&mut self, path: &str, raw: &str) -> Result<Path> {
        let parsed = Path::parse(path)?;
        let Some((last, _)) = parsed.segments().split_last() else {
            let coerced = coerce_edit(Some(&self.data), raw);
            self.data = coerced;
            return Ok(parsed);
        };
        let parent_path = parsed.parent().unwrap_or_default();
        let parent = parent_path
            .resolve_mut(&mut self.data)
            .ok_or_else(|| GridError::PathNotFound(parent_path.to_string()))?;

        match (parent, last) {
            (Value::Object(map), Segment::Key(key)) => {
                let coerced = coerce_edit(map.get(key), raw);
                map.insert(key.clone(), coerced);
            }
            (Value::Array(items), Segment::Index(index)) => {
                let len = items.len();
                let slot = items.get_mut(*index).ok_or(GridError::IndexOutOfRange {
                    path: parent_path.to_string(),
                    index: *index,
                    len,
                })?;
                *slot = coerce_edit(Some(&*slot), raw);
            }
            (Value::Array(_), Segment::Key(_)) => {
                return Err(GridError::NotAnObject(parent_path.to_string()))
            }
            (_, Segment::Index(_)) => return Err(GridError::NotAnArray(parent_path.to_string())),
            (_, Segment::Key(_)) => return Err(GridError::NotAnObject(parent_path.to_string())),
        }
        Ok(parsed)
    }
}

impl DocumentStore for JsonDocument {
    fn data(&self) -> &Value {
        &self.data
    }

    fn update_value(&mut self, path: &str, raw: &str) -> Result<()> {
        let parsed = self.apply_update(path, raw)?;
        debug!(path = %parsed, "value updated");
        self.notify(DocumentChange::ValueUpdated { path: parsed });
        Ok(())
    }

    fn batch_update_values(&mut self, updates: &[ValueUpdate]) -> Result<usize> {
        let mut applied = 0;
        let mut first_error = None;
        for update in updates {
            match self.apply_update(&update.path, &update.value) {
                Ok(_) => applied += 1,
                Err(e) => {
                    debug!(path = %update.path, error = %e, "batch entry skipped");
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }
        if applied > 0 {
            self.notify(DocumentChange::BatchUpdated { count: applied });
        }
        match first_error {
            Some(e) if applied == 0 => Err(e),
            _ => Ok(applied),
        }
    }

    fn insert_array_element(&mut self, path: &str, index: usize) -> Result<()> {
        let (parsed, items) = self.array_mut(path)?;
        if index > items.len() {
            return Err(GridError::IndexOutOfRange {
                path: parsed.to_string(),
                index,
                len: items.len(),
            });
        }
        let neighbor = items
            .get(index)
            .or_else(|| index.checked_sub(1).and_then(|i| items.get(i)));
        let element = shaped_like(neighbor);
        items.insert(index, element);
        debug!(path = %parsed, index, "array element inserted");
        self.notify(DocumentChange::ArrayElementInserted { path: parsed, index });
        Ok(())
    }

    fn remove_array_element(&mut self, path: &str, index: usize) -> Result<()> {
        let (parsed, items) = self.array_mut(path)?;
        if index >= items.len() {
            return Err(GridError::IndexOutOfRange {
                path: parsed.to_string(),
                index,
                len: items.len(),
            });
        }
        items.remove(index);
        debug!(path = %parsed, index, "array element removed");
        self.notify(DocumentChange::ArrayElementRemoved { path: parsed, index });
        Ok(())
    }

    fn move_array_element(&mut self, path: &str, from: usize, to: usize) -> Result<()> {
        let (parsed, items) = self.array_mut(path)?;
        let len = items.len();
        for index in [from, to] {
            if index >= len {
                return Err(GridError::IndexOutOfRange {
                    path: parsed.to_string(),
                    index,
                    len,
                });
            }
        }
        if from == to {
            return Ok(());
        }
        let element = items.remove(from);
        items.insert(to, element);
        debug!(path = %parsed, from, to, "array element moved");
        self.notify(DocumentChange::ArrayElementMoved {
            path: parsed,
            from,
            to,
        });
        Ok(())
    }

    fn rename_key(
        &mut self,
        base: &Path,
        sub: &Path,
        old_key: &str,
        new_key: &str,
    ) -> Result<()> {
        if old_key == new_key {
            return Ok(());
        }
        let parent = base.join(sub);
        let mut objects = self.objects_mut(&parent)?;
        if objects.iter().any(|map| map.contains_key(new_key)) {
            return Err(GridError::KeyExists {
                path: parent.to_string(),
                key: new_key.to_string(),
            });
        }
        let renamed = objects
            .iter_mut()
            .map(|map| rename_entry(map, old_key, new_key))
            .filter(|changed| *changed)
            .count();
        if renamed == 0 {
            return Ok(());
        }
        debug!(parent = %parent, old_key, new_key, renamed, "key renamed");
        self.notify(DocumentChange::KeyRenamed {
            parent,
            old_key: old_key.to_string(),
            new_key: new_key.to_string(),
        });
        Ok(())
    }

    fn move_key(&mut self, parent: &Path, key: &str, target: &str, insert_after: bool) -> Result<()> {
        if key == target {
            return Ok(());
        }
        let moved = self
            .objects_mut(parent)?
            .into_iter()
            .map(|map| move_entry(map, key, target, insert_after))
            .filter(|changed| *changed)
            .count();
        if moved == 0 {
            return Ok(());
        }
        debug!(parent = %parent, key, target, insert_after, "key moved");
        self.notify(DocumentChange::KeyMoved {
            parent: parent.clone(),
            key: key.to_string(),
            target: target.to_string(),
        });
        Ok(())
    }

    fn insert_key(&mut self, parent: &Path, beside: &str, insert_after: bool) -> Result<String> {
        let mut objects = self.objects_mut(parent)?;
        let name = (0..)
            .map(|n: u32| {
                if n == 0 {
                    NEW_KEY.to_string()
                } else {
                    format!("{NEW_KEY}{n}")
                }
            })
            .find(|candidate| objects.iter().all(|map| !map.contains_key(candidate)))
            .unwrap_or_else(|| NEW_KEY.to_string());
        for map in &mut objects {
            insert_entry(map, &name, beside, insert_after);
        }
        debug!(parent = %parent, key = %name, "key inserted");
        self.notify(DocumentChange::KeyInserted {
            parent: parent.clone(),
            key: name.clone(),
        });
        Ok(name)
    }

    fn remove_key(&mut self, parent: &Path, key: &str) -> Result<()> {
        let removed = self
            .objects_mut(parent)?
            .into_iter()
            .map(|map| remove_entry(map, key))
            .filter(|changed| *changed)
            .count();
        if removed == 0 {
            return Err(GridError::PathNotFound(parent.with_key(key).to_string()));
        }
        debug!(parent = %parent, key, removed, "key removed");
        self.notify(DocumentChange::KeyRemoved {
            parent: parent.clone(),
            key: key.to_string(),
        });
        Ok(())
    }

    fn revision(&self) -> u64 {
        self.revision
    }
}

fn collect_objects<'a>(
    value: &'a mut Value,
    segments: &[Segment],
    out: &mut Vec<&'a mut Map<String, Value>>,
) {
    let Some((first, rest)) = segments.split_first() else {
        match value {
            Value::Object(map) => out.push(map),
            Value::Array(items) => {
                for item in items {
                    collect_objects(item, segments, out);
                }
            }
            _ => {}
        }
        return;
    };
    match (value, first) {
        (Value::Object(map), Segment::Key(key)) => {
            if let Some(child) = map.get_mut(key) {
                collect_objects(child, rest, out);
            }
        }
        (Value::Array(items), Segment::Index(index)) => {
            if let Some(child) = items.get_mut(*index) {
                collect_objects(child, rest, out);
            }
        }
        // Key expected, array found: fan out over the elements.
        (Value::Array(items), Segment::Key(_)) => {
            for item in items {
                collect_objects(item, segments, out);
            }
        }
        _ => {}
    }
}

/// A new array element mirroring the keys of `neighbor` (null values), or null.
fn shaped_like(neighbor: Option<&Value>) -> Value {
    match neighbor {
        Some(Value::Object(map)) => Value::Object(
            map.keys()
                .map(|k| (k.clone(), Value::Null))
                .collect::<Map<String, Value>>(),
        ),
        _ => Value::Null,
    }
}

fn rebuild(map: &mut Map<String, Value>, f: impl FnOnce(&mut Vec<(String, Value)>)) {
    let mut entries: Vec<(String, Value)> = std::mem::take(map).into_iter().collect();
    f(&mut entries);
    *map = entries.into_iter().collect();
}

fn rename_entry(map: &mut Map<String, Value>, old_key: &str, new_key: &str) -> bool {
    if !map.contains_key(old_key) || map.contains_key(new_key) {
        return false;
    }
    rebuild(map, |entries| {
        for (k, _) in entries.iter_mut() {
            if k == old_key {
                *k = new_key.to_string();
            }
        }
    });
    true
}

fn move_entry(map: &mut Map<String, Value>, key: &str, target: &str, insert_after: bool) -> bool {
    if !map.contains_key(key) || !map.contains_key(target) {
        return false;
    }
    rebuild(map, |entries| {
        let Some(from) = entries.iter().position(|(k, _)| k == key) else {
            return;
        };
        let entry = entries.remove(from);
        let to = entries
            .iter()
            .position(|(k, _)| k == target)
            .map_or(entries.len(), |i| if insert_after { i + 1 } else { i });
        entries.insert(to, entry);
    });
    true
}

fn insert_entry(map: &mut Map<String, Value>, key: &str, beside: &str, insert_after: bool) {
    rebuild(map, |entries| {
        let at = entries
            .iter()
            .position(|(k, _)| k == beside)
            .map_or(entries.len(), |i| if insert_after { i + 1 } else { i });
        entries.insert(at, (key.to_string(), Value::Null));
    });
}

fn remove_entry(map: &mut Map<String, Value>, key: &str) -> bool {
    if !map.contains_key(key) {
        return false;
    }
    rebuild(map, |entries| entries.retain(|(k, _)| k != key));
    true
}
