//! Scope string validation.
//!
//! A scope is a flat capability string of the form `resource:action`, e.g.
//! `orders:read`. There is no whitelist of resources or actions and no
//! wildcard or hierarchy semantics; membership checks elsewhere use exact
//! string equality.

/// Whether a scope string has the `resource:action` shape.
///
/// True iff the string contains no whitespace and has a `:` separator with
/// at least one character on each side. Multiple separators are tolerated;
/// only the first one splits resource from action.
pub fn is_well_formed(scope: &str) -> bool {
    if scope.chars().any(char::is_whitespace) {
        return false;
    }
    match scope.split_once(':') {
        Some((resource, action)) => !resource.is_empty() && !action.is_empty(),
        None => false,
    }
}
