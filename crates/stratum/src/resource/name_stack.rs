//! Ordered history of name decorations applied by enclosing overlay
//! layers.
//!
//! An inner base's result is wrapped by an outer overlay's prefix and
//! suffix, so the outer layer's contribution is pushed last: index 0 is
//! the innermost/earliest decoration, the last index the outermost/latest.

/// Prefixes and suffixes a resource's name has accumulated, in push order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameTransformStack {
    prefixes: Vec<String>,
    suffixes: Vec<String>,
}

impl NameTransformStack {
    pub fn push_prefix(&mut self, prefix: impl Into<String>) {
        self.prefixes.push(prefix.into());
    }

    pub fn push_suffix(&mut self, suffix: impl Into<String>) {
        self.suffixes.push(suffix.into());
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    pub fn suffixes(&self) -> &[String] {
        &self.suffixes
    }

    /// Most recently pushed prefix, or empty if none.
    pub fn outermost_prefix(&self) -> &str {
        self.prefixes.last().map(String::as_str).unwrap_or("")
    }

    /// Most recently pushed suffix, or empty if none.
    pub fn outermost_suffix(&self) -> &str {
        self.suffixes.last().map(String::as_str).unwrap_or("")
    }

    /// True iff both outermost prefix and outermost suffix match.
    pub fn outermost_equals(&self, other: &NameTransformStack) -> bool {
        self.outermost_prefix() == other.outermost_prefix()
            && self.outermost_suffix() == other.outermost_suffix()
    }

    /// Deep comparison of the two stacks, anchored at the outer end.
    ///
    /// Two resources produced by overlay structures of different nesting
    /// depth still count as being in the same overlay context when their
    /// outer layers agree, so each sequence pair is compared over the last
    /// min(len, len) elements only. `[x]` and `[a, x]` match; this
    /// looseness is intentional.
    pub fn partial_equals(&self, other: &NameTransformStack) -> bool {
        same_ending_subsequence(&self.prefixes, &other.prefixes)
            && same_ending_subsequence(&self.suffixes, &other.suffixes)
    }
}

/// Compares the last min(len a, len b) elements of both slices, from the
/// end backward. Vacuously true when either slice is empty.
fn same_ending_subsequence(a: &[String], b: &[String]) -> bool {
    let compare_len = a.len().min(b.len());
    (0..compare_len).all(|i| a[a.len() - 1 - i] == b[b.len() - 1 - i])
}
