//! Compiled-template cache.
//!
//! Parsing a template is the expensive half of a render pass, and document
//! edits re-render far more often than templates change. The cache memoizes
//! compiled trees by template id so a burst of edits pays the parse cost
//! once.
//!
//! The cache is an explicit object with an injected lifecycle: construct it
//! once at application start and pass it to the renderer by reference.
//! There is no eviction; entries live for the session (typical sessions
//! touch one or two templates) and recompilation is signaled by a new id or
//! an explicit invalidation.

use std::collections::HashMap;
use std::sync::Arc;

use super::parser::ElementNode;

/// Cache of compiled templates keyed by template id.
#[derive(Debug, Default)]
pub struct RenderCache {
    entries: HashMap<String, Arc<ElementNode>>,
}

impl RenderCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the compiled tree for `id`, compiling at most once.
    ///
    /// A failed compile is not cached: the next call with the same id runs
    /// `compile` again, so a corrected template takes effect immediately.
    pub fn get_or_compile<E>(
        &mut self,
        id: &str,
        compile: impl FnOnce() -> Result<ElementNode, E>,
    ) -> Result<Arc<ElementNode>, E> {
        if let Some(compiled) = self.entries.get(id) {
            tracing::debug!(template = id, "template cache hit");
            return Ok(Arc::clone(compiled));
        }
        tracing::debug!(template = id, "template cache miss, compiling");
        let compiled = Arc::new(compile()?);
        self.entries.insert(id.to_string(), Arc::clone(&compiled));
        Ok(compiled)
    }

    /// Drop the entry for `id`. Returns whether an entry existed.
    pub fn invalidate(&mut self, id: &str) -> bool {
        self.entries.remove(id).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::parser::{parse, ParseError};

    fn compile_counted(counter: &mut u32) -> Result<ElementNode, ParseError> {
        *counter += 1;
        parse("<view />")
    }

    #[test]
    fn test_get_or_compile_compiles_at_most_once() {
        let mut cache = RenderCache::new();
        let mut calls = 0u32;
        let a = cache.get_or_compile("x", || compile_counted(&mut calls)).unwrap();
        let b = cache.get_or_compile("x", || compile_counted(&mut calls)).unwrap();
        assert_eq!(calls, 1);
        assert!(Arc::ptr_eq(&a, &b), "both calls must return the same compiled object");
    }

    #[test]
    fn test_invalidate_forces_recompile() {
        let mut cache = RenderCache::new();
        let mut calls = 0u32;
        cache.get_or_compile("x", || compile_counted(&mut calls)).unwrap();
        assert!(cache.invalidate("x"));
        assert!(!cache.invalidate("x"), "second invalidate finds nothing");
        cache.get_or_compile("x", || compile_counted(&mut calls)).unwrap();
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_failed_compile_is_not_cached() {
        let mut cache = RenderCache::new();
        let broken = cache.get_or_compile("bad", || parse("<a><b></a></b>"));
        assert!(broken.is_err());
        assert_eq!(cache.len(), 0, "a failed compile must not poison the cache");

        // A corrected template under the same id compiles fresh.
        let fixed = cache.get_or_compile("bad", || parse("<a><b></b></a>"));
        assert!(fixed.is_ok());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_distinct_ids_are_distinct_entries() {
        let mut cache = RenderCache::new();
        cache.get_or_compile("a", || parse("<view />")).unwrap();
        cache.get_or_compile("b", || parse("<text>hi</text>")).unwrap();
        assert_eq!(cache.len(), 2);
        cache.clear();
        assert!(cache.is_empty());
    }
}
