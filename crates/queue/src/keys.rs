//! Redis key naming.

/// `name` under the configured namespace. An empty prefix means no namespace.
#[must_use]
pub fn namespaced(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}:{name}")
    }
}
