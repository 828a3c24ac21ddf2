//! The saved-location list and its selection pointer.

use geopick_core::{Coordinates, LocationDetails, SavedLocation};
use uuid::Uuid;

use crate::storage::Storage;

/// Storage key holding the JSON array of saved locations.
pub const SAVED_LOCATIONS_KEY: &str = "savedLocations";
/// Storage key holding the JSON-encoded current selection.
pub const CURRENT_LOCATION_KEY: &str = "currentLocation";

/// Owns the saved-location list and the current-selection pointer,
/// persisting both through a [`Storage`] backing.
///
/// Mutations write through before returning. A failed write keeps the
/// in-memory change, is logged, and is not retried; the store never rolls
/// back or blocks the flow over persistence.
#[derive(Debug)]
pub struct LocationStore<S: Storage> {
    storage: S,
    locations: Vec<SavedLocation>,
    current: Option<SavedLocation>,
}

impl<S: Storage> LocationStore<S> {
    /// Loads the store from its persisted keys.
    ///
    /// A missing or malformed saved-locations value initializes an empty
    /// list; malformed data is logged, never fatal. The selection pointer
    /// is honored only when its id still exists in the loaded list, and the
    /// list's copy of the record wins over whatever the pointer carried.
    /// Anything else heals to no selection.
    pub fn load(storage: S) -> Self {
        let locations = match storage.get_item(SAVED_LOCATIONS_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<SavedLocation>>(&raw) {
                Ok(list) => list,
                Err(error) => {
                    tracing::warn!(%error, "discarding malformed saved-locations value");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(error) => {
                tracing::warn!(%error, "could not read saved locations");
                Vec::new()
            }
        };

        let current = match storage.get_item(CURRENT_LOCATION_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<SavedLocation>(&raw) {
                Ok(pointer) => locations.iter().find(|l| l.id == pointer.id).cloned(),
                Err(error) => {
                    tracing::warn!(%error, "discarding malformed current-location value");
                    None
                }
            },
            Ok(None) => None,
            Err(error) => {
                tracing::warn!(%error, "could not read current location");
                None
            }
        };

        Self {
            storage,
            locations,
            current,
        }
    }

    /// All saved entries, in insertion order.
    #[must_use]
    pub fn list(&self) -> &[SavedLocation] {
        &self.locations
    }

    /// The current selection, if any.
    #[must_use]
    pub fn current(&self) -> Option<&SavedLocation> {
        self.current.as_ref()
    }

    /// Creates a new entry, appends it, makes it the selection, and
    /// persists both. Returns the stored record with its fresh id.
    ///
    /// The caller guarantees `name` is non-empty and the coordinates were
    /// deliberately picked; neither is re-validated here.
    pub fn add(
        &mut self,
        name: &str,
        point: Coordinates,
        address: String,
        details: LocationDetails,
    ) -> SavedLocation {
        let location = SavedLocation {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            lat: point.lat,
            lng: point.lng,
            address,
            details,
            is_selected: Some(true),
        };

        self.locations.push(location.clone());
        self.persist_list();
        self.current = Some(location.clone());
        self.persist_current();
        location
    }

    /// Makes `location` the current selection and persists the pointer.
    ///
    /// Membership in the saved list is not checked; a record that is absent
    /// from the list still overwrites the pointer.
    pub fn select(&mut self, location: &SavedLocation) {
        self.current = Some(location.clone());
        self.persist_current();
    }

    /// Removes the entry with the given id and persists the list. Deleting
    /// the current selection also clears the pointer and its persisted key.
    /// Unknown ids are a no-op.
    pub fn delete(&mut self, id: &str) {
        let before = self.locations.len();
        self.locations.retain(|l| l.id != id);
        if self.locations.len() == before {
            return;
        }
        self.persist_list();

        if self.current.as_ref().is_some_and(|c| c.id == id) {
            self.current = None;
            if let Err(error) = self.storage.remove_item(CURRENT_LOCATION_KEY) {
                tracing::warn!(%error, "could not clear persisted current location");
            }
        }
    }

    /// Consumes the store, returning the underlying storage.
    pub fn into_storage(self) -> S {
        self.storage
    }

    fn persist_list(&mut self) {
        match serde_json::to_string(&self.locations) {
            Ok(raw) => {
                if let Err(error) = self.storage.set_item(SAVED_LOCATIONS_KEY, &raw) {
                    tracing::warn!(%error, "could not persist saved locations");
                }
            }
            Err(error) => tracing::warn!(%error, "could not serialize saved locations"),
        }
    }

    fn persist_current(&mut self) {
        let Some(current) = &self.current else { return };
        match serde_json::to_string(current) {
            Ok(raw) => {
                if let Err(error) = self.storage.set_item(CURRENT_LOCATION_KEY, &raw) {
                    tracing::warn!(%error, "could not persist current location");
                }
            }
            Err(error) => tracing::warn!(%error, "could not serialize current location"),
        }
    }
}

#[cfg(test)]
mod tests {
    use geopick_core::{location_details, RawAddress};

    use super::*;
    use crate::storage::MemoryStorage;

    fn point() -> Coordinates {
        Coordinates::new(41.311_081, 69.240_562)
    }

    fn details() -> LocationDetails {
        location_details(
            &RawAddress {
                city: Some("Tashkent".to_string()),
                display_name: Some("Tashkent, Uzbekistan".to_string()),
                ..RawAddress::default()
            },
            point(),
        )
    }

    fn entry(id: &str, name: &str) -> SavedLocation {
        SavedLocation {
            id: id.to_string(),
            name: name.to_string(),
            lat: point().lat,
            lng: point().lng,
            address: "Tashkent, Uzbekistan".to_string(),
            details: details(),
            is_selected: None,
        }
    }

    fn seeded_storage(list: &[SavedLocation], pointer: Option<&SavedLocation>) -> MemoryStorage {
        let mut storage = MemoryStorage::new();
        storage
            .set_item(SAVED_LOCATIONS_KEY, &serde_json::to_string(list).unwrap())
            .unwrap();
        if let Some(pointer) = pointer {
            storage
                .set_item(
                    CURRENT_LOCATION_KEY,
                    &serde_json::to_string(pointer).unwrap(),
                )
                .unwrap();
        }
        storage
    }

    #[test]
    fn starts_empty_without_persisted_data() {
        let store = LocationStore::load(MemoryStorage::new());
        assert!(store.list().is_empty());
        assert!(store.current().is_none());
    }

    #[test]
    fn add_appends_selects_and_persists() {
        let mut store = LocationStore::load(MemoryStorage::new());
        let added = store.add("Office", point(), "Tashkent, Uzbekistan".to_string(), details());

        assert_eq!(store.list().len(), 1);
        assert_eq!(store.current().map(|c| c.id.as_str()), Some(added.id.as_str()));
        assert_eq!(added.is_selected, Some(true));
        assert_eq!(added.name, "Office");

        let storage = store.into_storage();
        let raw_list = storage.get_item(SAVED_LOCATIONS_KEY).unwrap().unwrap();
        let persisted: Vec<SavedLocation> = serde_json::from_str(&raw_list).unwrap();
        assert_eq!(persisted.len(), 1);
        assert_eq!(persisted[0].id, added.id);

        let raw_current = storage.get_item(CURRENT_LOCATION_KEY).unwrap().unwrap();
        let pointer: SavedLocation = serde_json::from_str(&raw_current).unwrap();
        assert_eq!(pointer.id, added.id);
    }

    #[test]
    fn add_assigns_unique_ids_in_insertion_order() {
        let mut store = LocationStore::load(MemoryStorage::new());
        let first = store.add("First", point(), String::new(), details());
        let second = store.add("Second", point(), String::new(), details());

        assert_ne!(first.id, second.id);
        let names: Vec<&str> = store.list().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["First", "Second"]);
    }

    #[test]
    fn select_replaces_pointer() {
        let mut store = LocationStore::load(MemoryStorage::new());
        let first = store.add("First", point(), String::new(), details());
        store.add("Second", point(), String::new(), details());

        store.select(&first);
        assert_eq!(store.current().map(|c| c.id.as_str()), Some(first.id.as_str()));
    }

    #[test]
    fn select_does_not_verify_membership() {
        let mut store = LocationStore::load(MemoryStorage::new());
        let foreign = entry("not-in-list", "Elsewhere");

        store.select(&foreign);
        assert_eq!(store.current().map(|c| c.id.as_str()), Some("not-in-list"));
        assert!(store.list().is_empty());
    }

    #[test]
    fn delete_unselected_entry_keeps_pointer() {
        let mut store = LocationStore::load(MemoryStorage::new());
        let first = store.add("First", point(), String::new(), details());
        let second = store.add("Second", point(), String::new(), details());
        store.select(&first);

        store.delete(&second.id);
        assert_eq!(store.list().len(), 1);
        assert_eq!(store.current().map(|c| c.id.as_str()), Some(first.id.as_str()));
    }

    #[test]
    fn delete_selected_entry_clears_pointer_and_persisted_key() {
        let mut store = LocationStore::load(MemoryStorage::new());
        let added = store.add("Only", point(), String::new(), details());

        store.delete(&added.id);
        assert!(store.list().is_empty());
        assert!(store.current().is_none());

        let storage = store.into_storage();
        assert_eq!(storage.get_item(CURRENT_LOCATION_KEY).unwrap(), None);
        let raw_list = storage.get_item(SAVED_LOCATIONS_KEY).unwrap().unwrap();
        assert_eq!(raw_list, "[]");
    }

    #[test]
    fn delete_unknown_id_is_a_noop() {
        let mut store = LocationStore::load(MemoryStorage::new());
        let added = store.add("Only", point(), String::new(), details());

        store.delete("no-such-id");
        assert_eq!(store.list().len(), 1);
        assert_eq!(store.current().map(|c| c.id.as_str()), Some(added.id.as_str()));
    }

    #[test]
    fn reload_round_trips_list_and_selection() {
        let mut store = LocationStore::load(MemoryStorage::new());
        let first = store.add("First", point(), "addr one".to_string(), details());
        store.add("Second", point(), "addr two".to_string(), details());
        store.select(&first);

        let reloaded = LocationStore::load(store.into_storage());
        assert_eq!(reloaded.list().len(), 2);
        assert_eq!(reloaded.list()[0].name, "First");
        assert_eq!(reloaded.list()[1].name, "Second");
        assert_eq!(
            reloaded.current().map(|c| c.id.as_str()),
            Some(first.id.as_str())
        );
    }

    #[test]
    fn stale_pointer_heals_to_none() {
        let list = vec![entry("a1", "Kept")];
        let stale = entry("gone", "Deleted elsewhere");
        let store = LocationStore::load(seeded_storage(&list, Some(&stale)));

        assert_eq!(store.list().len(), 1);
        assert!(store.current().is_none());
    }

    #[test]
    fn pointer_adopts_the_list_copy_of_the_record() {
        let list = vec![entry("a1", "Renamed")];
        let mut stale_copy = entry("a1", "Old name");
        stale_copy.address = "old address".to_string();
        let store = LocationStore::load(seeded_storage(&list, Some(&stale_copy)));

        let current = store.current().expect("pointer id exists in list");
        assert_eq!(current.name, "Renamed");
        assert_eq!(current.address, "Tashkent, Uzbekistan");
    }

    #[test]
    fn malformed_list_value_initializes_empty() {
        let mut storage = MemoryStorage::new();
        storage.set_item(SAVED_LOCATIONS_KEY, "{not json").unwrap();

        let store = LocationStore::load(storage);
        assert!(store.list().is_empty());
        assert!(store.current().is_none());
    }

    #[test]
    fn malformed_pointer_value_heals_to_none() {
        let list = vec![entry("a1", "Kept")];
        let mut storage = seeded_storage(&list, None);
        storage.set_item(CURRENT_LOCATION_KEY, "42").unwrap();

        let store = LocationStore::load(storage);
        assert_eq!(store.list().len(), 1);
        assert!(store.current().is_none());
    }

    #[test]
    fn add_after_reload_extends_existing_list() {
        let mut store = LocationStore::load(MemoryStorage::new());
        store.add("First", point(), String::new(), details());

        let mut reloaded = LocationStore::load(store.into_storage());
        reloaded.add("Second", point(), String::new(), details());

        let names: Vec<&str> = reloaded.list().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["First", "Second"]);
    }
}
