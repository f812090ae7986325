//! UUID v7 helpers.
//!
//! Every record id is a UUIDv7, so ids sort in creation order.

use uuid::Uuid;

/// Generate a new UUIDv7 identifier.
///
/// ```
/// use scribe_core::uuid_utils::new_v7;
///
/// let a = new_v7();
/// let b = new_v7();
/// assert!(b > a);
/// ```
#[inline]
pub fn new_v7() -> Uuid {
    Uuid::now_v7()
}

/// Check if a UUID is version 7.
pub fn is_v7(uuid: &Uuid) -> bool {
    uuid.get_version_num() == 7
}
