//! JSON façade over the host's persistent key-value store.
//!
//! The `try_*` methods return errors; the plain methods log them and
//! degrade to `false` / `None`, which is what page scripts want.

use std::rc::Rc;

use log::error;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::StorageError;
use crate::host::KeyValueStore;

pub struct Storage<S: KeyValueStore> {
    store: Rc<S>,
}

impl<S: KeyValueStore> Clone for Storage<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: KeyValueStore> Storage<S> {
    pub fn new(store: Rc<S>) -> Self {
        Self { store }
    }

    pub fn try_set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let json = serde_json::to_string(value)?;
        self.store.set_item(key, &json)?;
        Ok(())
    }

    /// Absent and empty items both read as `None`.
    pub fn try_get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.store.get_item(key)? {
            Some(raw) if !raw.is_empty() => Ok(Some(serde_json::from_str(&raw)?)),
            _ => Ok(None),
        }
    }

    pub fn try_remove(&self, key: &str) -> Result<(), StorageError> {
        self.store.remove_item(key)?;
        Ok(())
    }

    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        self.try_set(key, value)
            .map_err(|e| error!("storage set error for {key:?}: {e}"))
            .is_ok()
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.try_get(key)
            .map_err(|e| error!("storage get error for {key:?}: {e}"))
            .ok()
            .flatten()
    }

    pub fn remove(&self, key: &str) -> bool {
        self.try_remove(key)
            .map_err(|e| error!("storage remove error for {key:?}: {e}"))
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimHost;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Draft {
        title: String,
        tags: Vec<String>,
    }

    fn storage() -> (Rc<SimHost>, Storage<SimHost>) {
        let host = Rc::new(SimHost::new());
        (host.clone(), Storage::new(host))
    }

    #[test]
    fn values_roundtrip_as_json() {
        let (host, storage) = storage();
        let draft = Draft {
            title: "Backend engineer".into(),
            tags: vec!["rust".into()],
        };
        assert!(storage.set("draft", &draft));
        assert_eq!(
            host.raw_item("draft").as_deref(),
            Some(r#"{"title":"Backend engineer","tags":["rust"]}"#)
        );
        assert_eq!(storage.get::<Draft>("draft"), Some(draft));
        assert!(storage.remove("draft"));
        assert_eq!(storage.get::<Draft>("draft"), None);
    }

    #[test]
    fn undecodable_and_empty_items_read_as_none() {
        let (host, storage) = storage();
        host.put_raw_item("broken", "{not json");
        host.put_raw_item("empty", "");
        assert_eq!(storage.get::<u32>("broken"), None);
        assert!(matches!(storage.try_get::<u32>("broken"), Err(StorageError::Json(_))));
        assert_eq!(storage.try_get::<u32>("empty").unwrap(), None);
    }

    #[test]
    fn backend_failures_degrade_quietly() {
        let (host, storage) = storage();
        host.set_storage_failing(true);
        assert!(!storage.set("k", &1));
        assert_eq!(storage.get::<i32>("k"), None);
        assert!(!storage.remove("k"));
        assert!(matches!(storage.try_set("k", &1), Err(StorageError::Host(_))));
    }
}
