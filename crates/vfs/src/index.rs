//! Segment-ordered index from object keys to descriptors.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::Bound;

use artifact_mirror_storage::ObjectInfo;

/// Structured object key: `/`-separated segments, compared segment-wise.
///
/// Segment-wise ordering makes every key sharing a prefix a contiguous
/// range in a `BTreeMap`, and keeps prefix tests honest: `foo` is not a
/// prefix of `foo2/bar`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyPath {
    segments: Vec<String>,
}

impl KeyPath {
    /// Parse a backend key, dropping empty segments.
    pub fn parse(key: &str) -> Self {
        Self {
            segments: key
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Path segments, outermost first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Final segment; empty for the empty path.
    pub fn name(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or("")
    }

    /// Parent path; `None` when there is no segment to drop.
    pub fn parent(&self) -> Option<KeyPath> {
        if self.segments.is_empty() {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Append a relative name, splitting it on `/`.
    pub fn join(&self, name: &str) -> KeyPath {
        let mut segments: Vec<String> = self.segments.clone();
        segments.extend(
            name.split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        );
        Self { segments }
    }

    /// True iff `prefix`'s segments are a strict prefix of this path's.
    pub fn is_strictly_under(&self, prefix: &KeyPath) -> bool {
        self.segments.len() > prefix.segments.len()
            && self.segments[..prefix.segments.len()] == prefix.segments[..]
    }

    /// First segment beyond `prefix`; `None` when not strictly under it.
    pub fn segment_after(&self, prefix: &KeyPath) -> Option<&str> {
        if self.is_strictly_under(prefix) {
            Some(&self.segments[prefix.segments.len()])
        } else {
            None
        }
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

/// Ordered mapping from key path to object descriptor.
///
/// Built wholesale from one listing and never mutated afterwards, so any
/// number of views may share it read-only.
#[derive(Debug, Default)]
pub struct ObjectIndex {
    entries: BTreeMap<KeyPath, ObjectInfo>,
}

impl ObjectIndex {
    /// Build an index from a backend listing.
    ///
    /// Later descriptors win on duplicate keys; backend listings should not
    /// contain duplicates, so the overwrite is a silent resolution rather
    /// than an error.
    pub fn build(objects: Vec<ObjectInfo>) -> Self {
        let mut entries: BTreeMap<KeyPath, ObjectInfo> = BTreeMap::new();
        for object in objects {
            entries.insert(KeyPath::parse(&object.key), object);
        }
        Self { entries }
    }

    /// Exact-match lookup.
    pub fn lookup(&self, path: &KeyPath) -> Option<&ObjectInfo> {
        self.entries.get(path)
    }

    /// True iff some key has `path` as a strict segment prefix.
    ///
    /// All such keys sort directly after `path`, so only the first key past
    /// it needs checking.
    pub fn has_descendant(&self, path: &KeyPath) -> bool {
        self.entries
            .range((Bound::Excluded(path), Bound::<&KeyPath>::Unbounded))
            .next()
            .is_some_and(|(key, _)| key.is_strictly_under(path))
    }

    /// Deduplicated immediate child segments under `path`.
    pub fn children(&self, path: &KeyPath) -> BTreeSet<String> {
        self.entries
            .range((Bound::Excluded(path), Bound::<&KeyPath>::Unbounded))
            .map_while(|(key, _)| key.segment_after(path))
            .map(str::to_string)
            .collect()
    }

    /// True iff the listing had no objects.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of indexed objects.
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(key: &str, size: u64) -> ObjectInfo {
        ObjectInfo {
            key: key.to_string(),
            size,
            last_modified: 1_700_000_000_000,
        }
    }

    fn index(keys: &[&str]) -> ObjectIndex {
        ObjectIndex::build(keys.iter().map(|k| object(k, 1)).collect())
    }

    #[test]
    fn test_lookup_returns_exact_descriptor() {
        let idx: ObjectIndex = ObjectIndex::build(vec![
            object("a/b/x", 10),
            object("a/b/y", 20),
            object("a/c", 30),
        ]);

        assert_eq!(idx.lookup(&KeyPath::parse("a/b/y")).unwrap().size, 20);
        assert_eq!(idx.lookup(&KeyPath::parse("a/c")).unwrap().size, 30);
        assert!(idx.lookup(&KeyPath::parse("a/b")).is_none());
        assert!(idx.lookup(&KeyPath::parse("missing")).is_none());
    }

    #[test]
    fn test_duplicate_keys_resolve_last_write_wins() {
        let idx: ObjectIndex = ObjectIndex::build(vec![object("a/b", 1), object("a/b", 2)]);

        assert_eq!(idx.len(), 1);
        assert_eq!(idx.lookup(&KeyPath::parse("a/b")).unwrap().size, 2);
    }

    #[test]
    fn test_has_descendant_is_segment_aware() {
        let idx: ObjectIndex = index(&["foo2/bar"]);

        assert!(!idx.has_descendant(&KeyPath::parse("foo")));
        assert!(idx.has_descendant(&KeyPath::parse("foo2")));
    }

    #[test]
    fn test_has_descendant_excludes_exact_key() {
        let idx: ObjectIndex = index(&["a/b"]);

        assert!(idx.has_descendant(&KeyPath::parse("a")));
        assert!(!idx.has_descendant(&KeyPath::parse("a/b")));
    }

    #[test]
    fn test_children_deduplicates_shared_segments() {
        let idx: ObjectIndex = index(&["a/b/x", "a/b/y", "a/c"]);

        let children: Vec<String> = idx.children(&KeyPath::parse("a")).into_iter().collect();
        assert_eq!(children, vec!["b".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_children_of_leaf_and_absent_are_empty() {
        let idx: ObjectIndex = index(&["a/b/x"]);

        assert!(idx.children(&KeyPath::parse("a/b/x")).is_empty());
        assert!(idx.children(&KeyPath::parse("z")).is_empty());
    }

    #[test]
    fn test_children_stops_at_prefix_range_end() {
        let idx: ObjectIndex = index(&["a/b", "ab/c", "b/d"]);

        let children: Vec<String> = idx.children(&KeyPath::parse("a")).into_iter().collect();
        assert_eq!(children, vec!["b".to_string()]);
    }

    #[test]
    fn test_key_path_parse_drops_empty_segments() {
        assert_eq!(KeyPath::parse("/a//b/"), KeyPath::parse("a/b"));
        assert_eq!(KeyPath::parse("a/b").to_string(), "a/b");
    }

    #[test]
    fn test_key_path_parent_and_name() {
        let path: KeyPath = KeyPath::parse("a/b/c");

        assert_eq!(path.name(), "c");
        assert_eq!(path.parent().unwrap(), KeyPath::parse("a/b"));
        assert!(KeyPath::parse("").parent().is_none());
    }

    #[test]
    fn test_key_path_join() {
        assert_eq!(KeyPath::parse("a").join("b/c"), KeyPath::parse("a/b/c"));
        assert_eq!(KeyPath::parse("").join("x"), KeyPath::parse("x"));
    }
}
