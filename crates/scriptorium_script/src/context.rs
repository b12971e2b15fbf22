//! Namespaced diagnostic messages.

use core::fmt;

/// Composes `"<namespace> - <message>:\n<cause>"`.
///
/// The namespace prefix and the cause suffix are only present when supplied.
///
/// # Example
///
/// ```
/// use scriptorium_script::contextual_message;
///
/// assert_eq!(contextual_message("boom", None, None), "boom");
/// assert_eq!(contextual_message("boom", Some("Script"), None), "Script - boom");
/// assert_eq!(
///     contextual_message("boom", Some("Script"), Some(&"404")),
///     "Script - boom:\n404"
/// );
/// ```
#[must_use]
pub fn contextual_message(
    message: &str,
    namespace: Option<&str>,
    cause: Option<&dyn fmt::Display>,
) -> String {
    let mut composed = String::new();
    if let Some(namespace) = namespace.filter(|namespace| !namespace.is_empty()) {
        composed.push_str(namespace);
        composed.push_str(" - ");
    }
    composed.push_str(message);
    if let Some(cause) = cause {
        composed.push_str(":\n");
        composed.push_str(&cause.to_string());
    }
    composed
}

/// Emits a namespaced warning through `tracing` and carries on.
pub fn contextual_warning(message: &str, namespace: Option<&str>) {
    tracing::warn!("{}", contextual_message(message, namespace, None));
}
