/// Passes the item through while performing a side effect.
pub fn inspect<T>(mut f: impl FnMut(&T)) -> impl FnMut(T) -> Option<T> {
    move |item| {
        f(&item);
        Some(item)
    }
}
