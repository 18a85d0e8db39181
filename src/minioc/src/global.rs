//! An optional process-wide container for code that can't pass one around.

use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::container::Container;

static CURRENT: Lazy<Arc<Container>> = Lazy::new(Container::new);

/// Returns the process-wide container, creating it on first use. It lives
/// until the process exits and is never disposed.
pub fn current() -> &'static Arc<Container> {
    &CURRENT
}
