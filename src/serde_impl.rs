use std::fmt;
use std::marker::PhantomData;

use serde::de::{Deserialize, DeserializeSeed, Deserializer, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeSeq, Serializer};

use crate::KeyedTree;

// Bounds the preallocation taken from an untrusted length hint.
const MAX_PREALLOCATED_ENTRIES: usize = 4096;

/// Serializes as a sequence of values in ascending key order.
impl<K, V, F> Serialize for KeyedTree<K, V, F>
where
    V: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for value in self {
            seq.serialize_element(value)?;
        }
        seq.end()
    }
}

/// Rebuilds a [`KeyedTree`] from a sequence of values.
///
/// A key extractor cannot be deserialized, so the seed carries it in. Later
/// values overwrite earlier ones with the same key.
pub struct KeyedTreeSeed<K, V, F> {
    key_fn: F,
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<K, V, F> KeyedTreeSeed<K, V, F> {
    pub fn new(key_fn: F) -> Self {
        Self {
            key_fn,
            _marker: PhantomData,
        }
    }
}

impl<'de, K, V, F> DeserializeSeed<'de> for KeyedTreeSeed<K, V, F>
where
    K: Ord,
    V: Deserialize<'de>,
    F: Fn(&V) -> K,
{
    type Value = KeyedTree<K, V, F>;

    fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(self)
    }
}

impl<'de, K, V, F> Visitor<'de> for KeyedTreeSeed<K, V, F>
where
    K: Ord,
    V: Deserialize<'de>,
    F: Fn(&V) -> K,
{
    type Value = KeyedTree<K, V, F>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a sequence of values")
    }

    fn visit_seq<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let capacity = access
            .size_hint()
            .unwrap_or(0)
            .min(MAX_PREALLOCATED_ENTRIES);
        let mut tree = KeyedTree::with_capacity(capacity, self.key_fn);
        while let Some(value) = access.next_element()? {
            tree.insert(value);
        }
        Ok(tree)
    }
}

impl<K, V, F> KeyedTree<K, V, F>
where
    K: Ord,
    F: Fn(&V) -> K,
{
    /// Deserializes a tree from a sequence of values, keyed by `key_fn`.
    pub fn deserialize_with<'de, D>(key_fn: F, deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
        V: Deserialize<'de>,
    {
        KeyedTreeSeed::new(key_fn).deserialize(deserializer)
    }
}
