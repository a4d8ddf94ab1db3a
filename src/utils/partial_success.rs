//! Type alias for operations that support partial success.
//! Discovery and loading never stop at the first bad plugin: the parts that
//! failed are handed back next to the parts that succeeded.

/// Represents a successful operation where some parts failed but didn't prevent overall success.
/// The `Vec<E>` contains errors from the failed parts that were handled gracefully.
pub type PartialSuccess<T, E> = ( T, Vec<E> );
