//! Hierarchical selector path composition.
//!
//! Selectors are string paths identifying locations in the remote UI tree
//! (`"#Card #Score"`). Fragments compose with a single space, forming a
//! descendant path the way the remote surface resolves them.

/// Join selector fragments into one descendant path.
///
/// ```
/// use remui_core::selector::selectors;
/// assert_eq!(selectors(&["#Container", "#Item", ".Text"]), "#Container #Item .Text");
/// ```
#[must_use]
pub fn selectors(fragments: &[&str]) -> String {
    fragments.join(" ")
}

/// Scope `fragment` under `root`, or return it unchanged when `root` is empty.
///
/// This is the rule binding managers use to compute absolute patch targets:
/// an empty root selector means the fragment already is the absolute path.
#[must_use]
pub fn join(root: &str, fragment: &str) -> String {
    if root.is_empty() {
        fragment.to_owned()
    } else {
        format!("{root} {fragment}")
    }
}

/// Append a numeric index to a selector for iterated elements.
///
/// Used when the same element type is instantiated multiple times, e.g.
/// items in a list: `indexed("#Item", 0)` is `"#Item0"`.
#[must_use]
pub fn indexed(selector: &str, index: usize) -> String {
    format!("{selector}{index}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selectors_joins_with_spaces() {
        assert_eq!(selectors(&["#A", "#B"]), "#A #B");
        assert_eq!(selectors(&["#Only"]), "#Only");
        assert_eq!(selectors(&[]), "");
    }

    #[test]
    fn join_skips_empty_root() {
        assert_eq!(join("", "#Score"), "#Score");
        assert_eq!(join("#Card", "#Score"), "#Card #Score");
    }

    #[test]
    fn join_nests_already_joined_roots() {
        let root = join("#Page", "#Card");
        assert_eq!(join(&root, "#Score"), "#Page #Card #Score");
    }

    #[test]
    fn indexed_appends_index() {
        assert_eq!(indexed("#Item", 0), "#Item0");
        assert_eq!(indexed("#Item", 12), "#Item12");
    }
}
