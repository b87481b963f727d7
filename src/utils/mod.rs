//! Utility functions and helpers.

pub mod http;
pub mod log;

use std::path::{Component, Path};

/// Check that a remote-supplied file name is safe to use as a single path
/// component under an output directory.
pub fn is_safe_file_name(name: &str) -> bool {
    if name.is_empty() || name.contains(['/', '\\', '\0']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_file_names() {
        assert!(is_safe_file_name("a.jpg"));
        assert!(is_safe_file_name("photo 1.png"));
        assert!(is_safe_file_name("..hidden.jpg"));
    }

    #[test]
    fn test_unsafe_file_names() {
        assert!(!is_safe_file_name(""));
        assert!(!is_safe_file_name("."));
        assert!(!is_safe_file_name(".."));
        assert!(!is_safe_file_name("../etc/passwd"));
        assert!(!is_safe_file_name("nested/a.jpg"));
        assert!(!is_safe_file_name("/abs.jpg"));
        assert!(!is_safe_file_name("win\\a.jpg"));
    }
}
