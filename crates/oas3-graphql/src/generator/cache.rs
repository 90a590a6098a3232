use std::{
  collections::HashMap,
  sync::{Arc, LazyLock, Mutex, PoisonError},
};

use tracing::trace;

use crate::generator::registry::GeneratedSchema;

type Slot = Arc<Mutex<Option<Arc<GeneratedSchema>>>>;

static GLOBAL: LazyLock<Arc<SchemaCache>> = LazyLock::new(|| Arc::new(SchemaCache::default()));

/// Finalized schemas keyed by namespace tag.
///
/// Every tag owns a slot with its own lock. Building a tag holds that lock from
/// the emptiness check until the schema is stored, so concurrent builders of
/// one version wait for a single build while other versions proceed. Readers
/// only ever see an empty slot or a finished schema.
#[derive(Debug, Default)]
pub struct SchemaCache {
  slots: Mutex<HashMap<String, Slot>>,
}

impl SchemaCache {
  pub fn new() -> Self {
    Self::default()
  }

  /// Process-wide cache shared by builders that are not given their own.
  pub fn global() -> Arc<Self> {
    Arc::clone(&GLOBAL)
  }

  fn slot(&self, tag: &str) -> Slot {
    let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(slots.entry(tag.to_string()).or_default())
  }

  /// Finalized schema for `tag`, without building.
  pub fn get(&self, tag: &str) -> Option<Arc<GeneratedSchema>> {
    let slot = {
      let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
      slots.get(tag).cloned()
    }?;
    slot.lock().unwrap_or_else(PoisonError::into_inner).clone()
  }

  /// Tags with a finalized schema, sorted.
  pub fn namespaces(&self) -> Vec<String> {
    let slots: Vec<(String, Slot)> = {
      let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
      slots.iter().map(|(tag, slot)| (tag.clone(), Arc::clone(slot))).collect()
    };
    let mut tags: Vec<String> = slots
      .into_iter()
      .filter(|(_, slot)| slot.lock().unwrap_or_else(PoisonError::into_inner).is_some())
      .map(|(tag, _)| tag)
      .collect();
    tags.sort();
    tags
  }

  /// Whether `slot` is still the one registered for `tag`.
  fn is_current(&self, tag: &str, slot: &Slot) -> bool {
    let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
    slots.get(tag).is_some_and(|current| Arc::ptr_eq(current, slot))
  }

  /// Drops the empty slot of a failed build. Called with the slot lock held.
  fn evict(&self, tag: &str, slot: &Slot) {
    let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
    if slots.get(tag).is_some_and(|current| Arc::ptr_eq(current, slot)) {
      slots.remove(tag);
    }
  }

  /// Returns the cached schema for `tag`, or runs `build` and stores its
  /// result. A failed build stores nothing and leaves no entry behind.
  pub fn get_or_try_build<E>(
    &self,
    tag: &str,
    build: impl FnOnce() -> Result<GeneratedSchema, E>,
  ) -> Result<Arc<GeneratedSchema>, E> {
    loop {
      let slot = self.slot(tag);
      let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
      if let Some(schema) = guard.as_ref() {
        trace!(%tag, "schema cache hit");
        return Ok(Arc::clone(schema));
      }
      // Evicted by a failed build while we waited for the lock.
      if !self.is_current(tag, &slot) {
        continue;
      }

      return match build() {
        Ok(schema) => {
          let schema = Arc::new(schema);
          *guard = Some(Arc::clone(&schema));
          Ok(schema)
        }
        Err(err) => {
          self.evict(tag, &slot);
          Err(err)
        }
      };
    }
  }
}

#[cfg(test)]
mod tests {
  use std::{
    sync::atomic::{AtomicUsize, Ordering},
    thread,
  };

  use super::*;
  use crate::generator::registry::{GeneratedNamespace, GenerationMode};

  fn schema(tag: &str) -> GeneratedSchema {
    let sdl = "type Query { _version: String! }".to_string();
    GeneratedSchema {
      namespace: GeneratedNamespace::new(tag, "3.1", GenerationMode::Legacy),
      document: async_graphql_parser::parse_schema(&sdl).unwrap(),
      sdl,
    }
  }

  #[test]
  fn test_builds_once() {
    let cache = SchemaCache::new();
    let calls = AtomicUsize::new(0);
    let build = || {
      calls.fetch_add(1, Ordering::SeqCst);
      Ok::<_, String>(schema("V3x1"))
    };

    let first = cache.get_or_try_build("V3x1", build).unwrap();
    let second = cache.get_or_try_build("V3x1", build).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(cache.namespaces(), vec!["V3x1".to_string()]);
  }

  #[test]
  fn test_failed_build_is_not_cached() {
    let cache = SchemaCache::new();
    let err = cache
      .get_or_try_build("V1x0", || Err::<GeneratedSchema, _>("boom"))
      .unwrap_err();
    assert_eq!(err, "boom");
    assert!(cache.get("V1x0").is_none());
    assert!(cache.namespaces().is_empty());

    let built = cache.get_or_try_build("V1x0", || Ok::<_, &str>(schema("V1x0"))).unwrap();
    assert_eq!(built.tag(), "V1x0");
    assert!(cache.get("V1x0").is_some());
  }

  #[test]
  fn test_failed_builds_leave_no_entries() {
    let cache = SchemaCache::new();
    for minor in 0..100 {
      let tag = format!("V9x{minor}");
      assert!(cache.get_or_try_build(&tag, || Err::<GeneratedSchema, _>("boom")).is_err());
    }
    assert!(cache.slots.lock().unwrap().is_empty());

    cache.get_or_try_build("V3x1", || Ok::<_, &str>(schema("V3x1"))).unwrap();
    assert_eq!(cache.slots.lock().unwrap().len(), 1);
  }

  #[test]
  fn test_waiter_retries_after_failed_build() {
    let cache = SchemaCache::new();
    let calls = AtomicUsize::new(0);

    let results: Vec<Result<Arc<GeneratedSchema>, &str>> = thread::scope(|scope| {
      let handles: Vec<_> = (0..4)
        .map(|_| {
          scope.spawn(|| {
            cache.get_or_try_build("V3x1", || {
              thread::sleep(std::time::Duration::from_millis(10));
              match calls.fetch_add(1, Ordering::SeqCst) {
                0 => Err("boom"),
                _ => Ok(schema("V3x1")),
              }
            })
          })
        })
        .collect();
      handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    });

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(results.iter().filter(|result| result.is_err()).count(), 1);
    assert!(cache.get("V3x1").is_some());
    assert_eq!(cache.slots.lock().unwrap().len(), 1);
  }

  #[test]
  fn test_concurrent_builders_share_one_schema() {
    let cache = SchemaCache::new();
    let calls = AtomicUsize::new(0);

    let schemas: Vec<Arc<GeneratedSchema>> = thread::scope(|scope| {
      let handles: Vec<_> = (0..8)
        .map(|_| {
          scope.spawn(|| {
            cache
              .get_or_try_build("V3x1", || {
                calls.fetch_add(1, Ordering::SeqCst);
                thread::sleep(std::time::Duration::from_millis(10));
                Ok::<_, String>(schema("V3x1"))
              })
              .unwrap()
          })
        })
        .collect();
      handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    });

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(schemas.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
  }

  #[test]
  fn test_versions_are_independent() {
    let cache = SchemaCache::new();
    cache.get_or_try_build("V3x1", || Ok::<_, String>(schema("V3x1"))).unwrap();
    cache.get_or_try_build("V1x0", || Ok::<_, String>(schema("V1x0"))).unwrap();
    assert_eq!(cache.namespaces(), vec!["V1x0".to_string(), "V3x1".to_string()]);
    assert_eq!(cache.get("V3x1").map(|s| s.tag().to_string()), Some("V3x1".to_string()));
  }
}
