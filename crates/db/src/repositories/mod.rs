//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod admin_repo;
pub mod completion_repo;
pub mod habit_repo;
pub mod user_repo;

pub use admin_repo::AdminRepo;
pub use completion_repo::CompletionRepo;
pub use habit_repo::HabitRepo;
pub use user_repo::UserRepo;

/// Escape `%`, `_` and `\` so user input is matched literally inside `ILIKE`.
pub(crate) fn like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::like_pattern;

    #[test]
    fn like_pattern_wraps_and_escapes() {
        assert_eq!(like_pattern("run"), "%run%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }
}
