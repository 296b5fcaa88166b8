//! Shared collection plumbing for the entity repositories.
//!
//! A [`Collection`] owns one ordered list of records (newest first) and the storage key it is
//! persisted under. Every mutation builds the next snapshot, saves it, and only then swaps it in:
//! a failed save leaves the in-memory list exactly as it was.

use crate::error::{DataError, DataResult};
use crate::store::{Store, StoreError};
use portal_types::NonEmptyText;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// A persisted entity with a collection-unique identifier.
pub trait Record: Clone + Serialize + DeserializeOwned {
    /// Human-readable entity name used in error messages.
    const KIND: &'static str;

    fn id(&self) -> &str;
}

/// When a stored collection should be replaced by its seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeedPolicy {
    /// Seed only when nothing is stored or the document cannot be parsed.
    WhenMissing,
    /// Also seed when the stored document is an empty list.
    WhenMissingOrEmpty,
}

pub struct Collection<T> {
    key: &'static str,
    store: Arc<dyn Store>,
    items: Vec<T>,
}

impl<T: Record> Collection<T> {
    /// Loads the collection stored under `key`, falling back to `seed` per `policy`.
    ///
    /// A seeded collection is persisted straight away so the store reflects what is served. An
    /// unreadable document is first copied to `<key>.corrupt` so reseeding never destroys it.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Storage`] if the store cannot be read, if an unreadable document
    /// cannot be set aside, or if a seeded collection cannot be written back.
    pub fn load(
        store: Arc<dyn Store>,
        key: &'static str,
        policy: SeedPolicy,
        seed: impl FnOnce() -> Vec<T>,
    ) -> DataResult<Self> {
        let loaded = match store.load(key)? {
            None => None,
            Some(raw) => match serde_json::from_str::<Vec<T>>(&raw) {
                Ok(items) if items.is_empty() && policy == SeedPolicy::WhenMissingOrEmpty => None,
                Ok(items) => Some(items),
                Err(e) => {
                    let backup = format!("{key}.corrupt");
                    store.save(&backup, &raw)?;
                    tracing::warn!(
                        "stored collection {} is unreadable ({}); kept it as {} and reseeding",
                        key,
                        e,
                        backup
                    );
                    None
                }
            },
        };

        match loaded {
            Some(items) => Ok(Self { key, store, items }),
            None => {
                let mut collection = Self {
                    key,
                    store,
                    items: Vec::new(),
                };
                collection.commit(seed())?;
                tracing::info!("seeded {} with {} records", key, collection.len());
                Ok(collection)
            }
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Records in display order (newest first).
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(Record::id)
    }

    /// Index of the record with `id`, or [`DataError::NotFound`].
    pub fn position(&self, id: &str) -> DataResult<usize> {
        self.items
            .iter()
            .position(|item| item.id() == id)
            .ok_or_else(|| DataError::not_found(T::KIND, id))
    }

    pub fn insert_first(&mut self, item: T) -> DataResult<()> {
        let mut next = Vec::with_capacity(self.items.len() + 1);
        next.push(item);
        next.extend(self.items.iter().cloned());
        self.commit(next)
    }

    pub fn replace_at(&mut self, index: usize, item: T) -> DataResult<()> {
        let mut next = self.items.clone();
        next[index] = item;
        self.commit(next)
    }

    pub fn remove_at(&mut self, index: usize) -> DataResult<T> {
        let mut next = self.items.clone();
        let removed = next.remove(index);
        self.commit(next)?;
        Ok(removed)
    }

    /// Persists `next` and makes it the current snapshot.
    pub fn commit(&mut self, next: Vec<T>) -> DataResult<()> {
        let raw = serde_json::to_string(&next).map_err(StoreError::Serialization)?;
        if let Err(e) = self.store.save(self.key, &raw) {
            tracing::error!("failed to persist {}: {}", self.key, e);
            return Err(e.into());
        }
        self.items = next;
        Ok(())
    }
}

/// A number as a form submits it: a JSON number or its text. Blank text means "not given".
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum NumberInput {
    Number(f64),
    Text(String),
}

impl NumberInput {
    /// The value, or `None` when left blank. Anything that is not a finite number `>= 0` fails
    /// with `message`.
    pub fn non_negative(&self, message: &str) -> DataResult<Option<f64>> {
        let value = match self {
            NumberInput::Number(n) => *n,
            NumberInput::Text(text) if text.trim().is_empty() => return Ok(None),
            NumberInput::Text(text) => text
                .trim()
                .parse::<f64>()
                .map_err(|_| DataError::validation(message))?,
        };
        if !value.is_finite() || value < 0.0 {
            return Err(DataError::validation(message));
        }
        Ok(Some(value))
    }
}

impl From<f64> for NumberInput {
    fn from(value: f64) -> Self {
        NumberInput::Number(value)
    }
}

/// Reads an optional number from a stored document. Blank or non-numeric values read as absent.
pub(crate) fn lenient_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(match serde_json::Value::deserialize(d)? {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    })
}

/// Trims `value` and fails with `message` when nothing is left.
pub(crate) fn required(value: &str, message: &str) -> DataResult<String> {
    NonEmptyText::new(value)
        .map(NonEmptyText::into_inner)
        .map_err(|_| DataError::validation(message))
}

/// Trimmed copy of an optional field; absent becomes empty.
pub(crate) fn clean(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or_default().to_owned()
}

/// Case-insensitive comparison of two display names after trimming.
pub(crate) fn same_name(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreResult};

    #[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Item {
        id: String,
    }

    impl Record for Item {
        const KIND: &'static str = "Item";

        fn id(&self) -> &str {
            &self.id
        }
    }

    fn item(id: &str) -> Item {
        Item { id: id.into() }
    }

    struct FailingStore;

    impl Store for FailingStore {
        fn load(&self, _key: &str) -> StoreResult<Option<String>> {
            Ok(Some("[{\"id\":\"X001\"}]".into()))
        }

        fn save(&self, _key: &str, _value: &str) -> StoreResult<()> {
            Err(StoreError::FileWrite(std::io::Error::new(
                std::io::ErrorKind::Other,
                "quota exceeded",
            )))
        }
    }

    #[test]
    fn corrupt_document_falls_back_to_seed() {
        let store = Arc::new(MemoryStore::new().with_entry("items", "{not json"));
        let c = Collection::load(store.clone(), "items", SeedPolicy::WhenMissing, || {
            vec![item("X001")]
        })
        .unwrap();

        assert_eq!(c.items(), &[item("X001")]);
        assert_eq!(
            store.load("items").unwrap().as_deref(),
            Some("[{\"id\":\"X001\"}]")
        );
        assert_eq!(
            store.load("items.corrupt").unwrap().as_deref(),
            Some("{not json")
        );
    }

    #[test]
    fn number_input_accepts_numbers_text_and_blank() {
        let msg = "Duration must be a valid number.";
        let parse = |raw: &str| serde_json::from_str::<NumberInput>(raw).unwrap().non_negative(msg);

        assert_eq!(parse("7").unwrap(), Some(7.0));
        assert_eq!(parse("7.5").unwrap(), Some(7.5));
        assert_eq!(parse("\" 7 \"").unwrap(), Some(7.0));
        assert_eq!(parse("\"\"").unwrap(), None);
        assert_eq!(parse("-1").unwrap_err().to_string(), msg);
        assert_eq!(parse("\"soon\"").unwrap_err().to_string(), msg);
    }

    #[test]
    fn empty_list_is_kept_unless_policy_says_otherwise() {
        let store = Arc::new(MemoryStore::new().with_entry("items", "[]"));
        let kept = Collection::load(store.clone(), "items", SeedPolicy::WhenMissing, || {
            vec![item("X001")]
        })
        .unwrap();
        assert!(kept.is_empty());

        let store = Arc::new(MemoryStore::new().with_entry("items", "[]"));
        let seeded = Collection::load(store, "items", SeedPolicy::WhenMissingOrEmpty, || {
            vec![item("X001")]
        })
        .unwrap();
        assert_eq!(seeded.len(), 1);
    }

    #[test]
    fn insert_first_prepends_and_persists() {
        let store = Arc::new(MemoryStore::new());
        let mut c =
            Collection::load(store.clone(), "items", SeedPolicy::WhenMissing, Vec::new).unwrap();
        c.insert_first(item("X001")).unwrap();
        c.insert_first(item("X002")).unwrap();

        assert_eq!(c.ids().collect::<Vec<_>>(), vec!["X002", "X001"]);
        let reloaded: Collection<Item> =
            Collection::load(store, "items", SeedPolicy::WhenMissing, Vec::new).unwrap();
        assert_eq!(reloaded.items(), c.items());
    }

    #[test]
    fn failed_save_leaves_collection_untouched() {
        let mut c: Collection<Item> = Collection::load(
            Arc::new(FailingStore),
            "items",
            SeedPolicy::WhenMissing,
            Vec::new,
        )
        .unwrap();

        let err = c.insert_first(item("X002")).unwrap_err();
        assert!(matches!(err, DataError::Storage(StoreError::FileWrite(_))));
        assert_eq!(c.ids().collect::<Vec<_>>(), vec!["X001"]);
    }

    #[test]
    fn position_reports_missing_ids() {
        let store = Arc::new(MemoryStore::new());
        let c: Collection<Item> =
            Collection::load(store, "items", SeedPolicy::WhenMissing, Vec::new).unwrap();
        assert!(matches!(
            c.position("X404"),
            Err(DataError::NotFound { kind: "Item", .. })
        ));
    }

    #[test]
    fn required_trims_and_rejects_blank() {
        assert_eq!(required("  Gasabo ", "District is required.").unwrap(), "Gasabo");
        let err = required("  ", "District is required.").unwrap_err();
        assert_eq!(err.to_string(), "District is required.");
    }
}
