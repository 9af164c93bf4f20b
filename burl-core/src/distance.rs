//! Saturating distance arithmetic over the unreachable sentinel.
//!
//! Graph distances are base counts between positions. Queries with no
//! connecting path answer [`UNREACHABLE`]; every combination of distances
//! must preserve that sentinel, so all arithmetic in the engine goes through
//! the helpers here instead of bare `+`.

/// Sentinel distance meaning "no path exists".
///
/// The sentinel never satisfies a merge threshold and absorbs any value added
/// to it.
pub const UNREACHABLE: usize = usize::MAX;

/// Returns whether `d` denotes a real, traversable distance.
///
/// # Examples
/// ```
/// use burl_core::distance::{UNREACHABLE, is_reachable};
///
/// assert!(is_reachable(0));
/// assert!(!is_reachable(UNREACHABLE));
/// ```
#[must_use]
pub const fn is_reachable(d: usize) -> bool {
    d != UNREACHABLE
}

/// Adds two distances, saturating into [`UNREACHABLE`].
///
/// Because the sentinel is `usize::MAX`, saturating addition both absorbs the
/// sentinel and caps genuine overflow at the sentinel.
///
/// # Examples
/// ```
/// use burl_core::distance::{UNREACHABLE, sum};
///
/// assert_eq!(sum(3, 4), 7);
/// assert_eq!(sum(3, UNREACHABLE), UNREACHABLE);
/// ```
#[must_use]
pub const fn sum(a: usize, b: usize) -> usize {
    a.saturating_add(b)
}

/// Adds three distances, saturating into [`UNREACHABLE`].
///
/// # Examples
/// ```
/// use burl_core::distance::{UNREACHABLE, sum3};
///
/// assert_eq!(sum3(3, 4, 3), 10);
/// assert_eq!(sum3(3, UNREACHABLE, 3), UNREACHABLE);
/// ```
#[must_use]
pub const fn sum3(a: usize, b: usize, c: usize) -> usize {
    sum(sum(a, b), c)
}
