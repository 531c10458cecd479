use std::sync::Arc;

use dashmap::{DashMap, mapref::entry::Entry};
use rand::Rng;
use tokio::sync::Mutex;

use crate::{
    dto::validation::{ROOM_CODE_ALPHABET, ROOM_CODE_LENGTH, normalize_room_code,
        validate_room_code},
    error::ServiceError,
};

/// Attempts at drawing an unused code before giving up.
const MAX_CODE_ATTEMPTS: usize = 10;

/// Concurrent map from room code to room, one instance per game kind. The map
/// guards only the code → room structure; each room carries its own lock.
#[derive(Debug)]
pub struct RoomRegistry<R> {
    rooms: DashMap<String, Arc<Mutex<R>>>,
}

impl<R> RoomRegistry<R> {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
        }
    }

    /// Draw a fresh code and insert the room `build` produces for it. The
    /// entry API keeps the draw-and-insert atomic, so two concurrent creates
    /// can never claim the same code.
    pub fn create(
        &self,
        build: impl FnOnce(String) -> R,
    ) -> Result<(String, Arc<Mutex<R>>), ServiceError> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = random_code();
            match self.rooms.entry(code.clone()) {
                Entry::Occupied(_) => continue,
                Entry::Vacant(slot) => {
                    let room = Arc::new(Mutex::new(build(code.clone())));
                    slot.insert(Arc::clone(&room));
                    return Ok((code, room));
                }
            }
        }

        Err(ServiceError::RoomCodeCollision)
    }

    /// Case-insensitive lookup; the uppercase form is canonical.
    pub fn get(&self, code: &str) -> Option<Arc<Mutex<R>>> {
        let code = normalize_room_code(code);
        validate_room_code(&code).ok()?;
        self.rooms.get(&code).map(|entry| Arc::clone(entry.value()))
    }

    /// Lookup that surfaces `room_not_found` for absent or malformed codes.
    pub fn resolve(&self, code: &str) -> Result<Arc<Mutex<R>>, ServiceError> {
        self.get(code).ok_or(ServiceError::RoomNotFound)
    }

    /// Drop a room from the map. Callers must hold the room lock and have
    /// confirmed emptiness first.
    pub fn remove(&self, code: &str) {
        self.rooms.remove(&normalize_room_code(code));
    }

    /// Number of open rooms for this game kind.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

impl<R> Default for RoomRegistry<R> {
    fn default() -> Self {
        Self::new()
    }
}

/// Uniform 6-character draw from the code alphabet.
fn random_code() -> String {
    let mut rng = rand::rng();
    (0..ROOM_CODE_LENGTH)
        .map(|_| ROOM_CODE_ALPHABET[rng.random_range(0..ROOM_CODE_ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_codes_are_canonical_and_resolvable() {
        let registry: RoomRegistry<u32> = RoomRegistry::new();
        let (code, _room) = registry.create(|_| 7).unwrap();

        assert_eq!(code.len(), ROOM_CODE_LENGTH);
        assert!(validate_room_code(&code).is_ok());
        assert!(registry.get(&code).is_some());
        assert!(registry.get(&code.to_ascii_lowercase()).is_some());
    }

    #[test]
    fn codes_are_unique_within_the_namespace() {
        let registry: RoomRegistry<u32> = RoomRegistry::new();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..100 {
            let (code, _) = registry.create(|_| 0).unwrap();
            assert!(seen.insert(code));
        }
        assert_eq!(registry.len(), 100);
    }

    #[test]
    fn resolve_reports_room_not_found() {
        let registry: RoomRegistry<u32> = RoomRegistry::new();
        assert_eq!(
            registry.resolve("AB23CD").unwrap_err(),
            ServiceError::RoomNotFound
        );
        // Malformed codes do not panic, they just never resolve.
        assert_eq!(
            registry.resolve("not a code").unwrap_err(),
            ServiceError::RoomNotFound
        );
    }

    #[test]
    fn removed_rooms_disappear() {
        let registry: RoomRegistry<u32> = RoomRegistry::new();
        let (code, _) = registry.create(|_| 0).unwrap();
        registry.remove(&code);
        assert!(registry.get(&code).is_none());
        assert!(registry.is_empty());
    }
}
