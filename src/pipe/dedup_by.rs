use fxhash::FxHashMap;

/// Only emits the item if the value associated with its key has changed.
///
/// With a key that is the item itself this keeps the first occurrence of
/// every distinct value.
pub fn dedup_by<K, T>(mut key_fn: impl FnMut(&T) -> K) -> impl FnMut(T) -> Option<T>
where
    K: std::hash::Hash + Eq,
    T: Clone + PartialEq,
{
    let mut last_values: FxHashMap<K, T> = FxHashMap::default();
    move |curr| {
        let key = key_fn(&curr);
        if let Some(prev) = last_values.get(&key)
            && *prev == curr
        {
            return None;
        }

        last_values.insert(key, curr.clone());
        Some(curr)
    }
}
