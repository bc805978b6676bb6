//! Pet storage.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Page size when the caller gives none.
pub const DEFAULT_LIMIT: usize = 10;

/// A stored pet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pet {
    /// Unique identifier.
    pub id: i64,
    /// Name of the pet.
    pub name: String,
}

/// Fields accepted when creating a pet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewPet {
    /// Name of the pet.
    pub name: String,
}

/// Paging for [`PetStore::list`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    /// Maximum number of pets returned.
    pub limit: usize,
    /// Number of pets skipped, in id order.
    pub offset: usize,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

/// Pet persistence.
///
/// Errors surface to clients as `500` with a generic message.
pub trait PetStore: Send + Sync + 'static {
    /// Pets in id order.
    fn list(&self, options: ListOptions) -> anyhow::Result<Vec<Pet>>;

    /// One pet, if it exists.
    fn get(&self, id: i64) -> anyhow::Result<Option<Pet>>;

    /// Stores a pet under a fresh id.
    fn insert(&self, pet: NewPet) -> anyhow::Result<Pet>;

    /// Removes a pet, returning it if it existed.
    fn delete(&self, id: i64) -> anyhow::Result<Option<Pet>>;
}

/// In-memory [`PetStore`].
#[derive(Debug)]
pub struct MemoryPetStore {
    pets: RwLock<BTreeMap<i64, Pet>>,
    next_id: AtomicI64,
}

impl Default for MemoryPetStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPetStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pets: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// A store holding the demo's seed pet.
    #[must_use]
    pub fn seeded() -> Self {
        let store = Self::new();
        store.pets.write().insert(
            1,
            Pet {
                id: 1,
                name: "Onni".to_string(),
            },
        );
        store.next_id.store(2, Ordering::SeqCst);
        store
    }

    /// Number of stored pets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pets.read().len()
    }

    /// Returns `true` if no pets are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pets.read().is_empty()
    }
}

impl PetStore for MemoryPetStore {
    fn list(&self, options: ListOptions) -> anyhow::Result<Vec<Pet>> {
        Ok(self
            .pets
            .read()
            .values()
            .skip(options.offset)
            .take(options.limit)
            .cloned()
            .collect())
    }

    fn get(&self, id: i64) -> anyhow::Result<Option<Pet>> {
        Ok(self.pets.read().get(&id).cloned())
    }

    fn insert(&self, pet: NewPet) -> anyhow::Result<Pet> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let pet = Pet { id, name: pet.name };
        self.pets.write().insert(id, pet.clone());
        tracing::debug!(pet_id = id, "pet stored");
        Ok(pet)
    }

    fn delete(&self, id: i64) -> anyhow::Result<Option<Pet>> {
        Ok(self.pets.write().remove(&id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_pet(name: &str) -> NewPet {
        NewPet {
            name: name.to_string(),
        }
    }

    #[test]
    fn test_seeded() {
        let store = MemoryPetStore::seeded();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(1).unwrap().unwrap().name, "Onni");
        assert_eq!(store.insert(new_pet("Rex")).unwrap().id, 2);
    }

    #[test]
    fn test_list_paging() {
        let store = MemoryPetStore::new();
        for i in 0..15 {
            store.insert(new_pet(&format!("pet-{i}"))).unwrap();
        }

        let first = store.list(ListOptions::default()).unwrap();
        assert_eq!(first.len(), DEFAULT_LIMIT);
        assert_eq!(first[0].id, 1);

        let rest = store.list(ListOptions { limit: 10, offset: 10 }).unwrap();
        assert_eq!(rest.len(), 5);
        assert_eq!(rest[0].id, 11);
    }

    #[test]
    fn test_delete() {
        let store = MemoryPetStore::seeded();
        assert_eq!(store.delete(1).unwrap().map(|p| p.id), Some(1));
        assert_eq!(store.delete(1).unwrap(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_ids_never_reused() {
        let store = MemoryPetStore::new();
        let first = store.insert(new_pet("a")).unwrap();
        store.delete(first.id).unwrap();
        assert_eq!(store.insert(new_pet("b")).unwrap().id, first.id + 1);
    }
}
