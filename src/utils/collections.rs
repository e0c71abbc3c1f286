//! Small collection helpers

use std::collections::HashSet;
use std::hash::Hash;

/// True if every element of `left` is in `right` and vice versa.
///
/// Duplicates are ignored, so `[a, a]` and `[a]` contain each other.
pub fn mutual_containment<'a, T, L, R>(left: L, right: R) -> bool
where
    T: Eq + Hash + 'a,
    L: IntoIterator<Item = &'a T>,
    R: IntoIterator<Item = &'a T>,
{
    let left: HashSet<&T> = left.into_iter().collect();
    let right: HashSet<&T> = right.into_iter().collect();
    left == right
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_sets_contain_each_other() {
        assert!(mutual_containment(&["a", "b"], &["b", "a"]));
    }

    #[test]
    fn test_subset_is_not_enough() {
        assert!(!mutual_containment(&["a", "b"], &["a"]));
        assert!(!mutual_containment(&["a"], &["a", "b"]));
    }

    #[test]
    fn test_duplicates_ignored() {
        assert!(mutual_containment(&["a", "a"], &["a"]));
    }

    #[test]
    fn test_empty_sets() {
        let empty: [u8; 0] = [];
        assert!(mutual_containment(&empty, &empty));
        assert!(!mutual_containment(&empty, &[1u8]));
    }
}
