//! Label ordering for the label-grouped index sections.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use gitblog_shared::Label;

/// Labels in section order, reserved names removed.
///
/// Described labels come first, ascending by description; then labels with an
/// empty description; then labels without one. Name breaks every tie, so a
/// description such as `1-rust`, `2-life` controls the section order.
pub fn ordered_labels<'a>(labels: &'a [Label], reserved: &BTreeSet<String>) -> Vec<&'a Label> {
    let mut ordered: Vec<&Label> = labels
        .iter()
        .filter(|label| !reserved.contains(&label.name))
        .collect();
    ordered.sort_by(|a, b| compare_labels(a, b));
    ordered
}

fn compare_labels(a: &Label, b: &Label) -> Ordering {
    sort_key(a).cmp(&sort_key(b))
}

fn sort_key(label: &Label) -> (bool, bool, Option<&str>, &str) {
    let description = label.description.as_deref();
    (
        description.is_none(),
        description == Some(""),
        description,
        label.name.as_str(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names<'a>(labels: &[&'a Label]) -> Vec<&'a str> {
        labels.iter().map(|l| l.name.as_str()).collect()
    }

    #[test]
    fn described_labels_sort_first() {
        let labels = vec![
            Label::described("Zeta", ""),
            Label::described("Alpha", "1-intro"),
            Label::new("Beta"),
        ];
        let ordered = ordered_labels(&labels, &BTreeSet::new());
        assert_eq!(names(&ordered), vec!["Alpha", "Zeta", "Beta"]);
    }

    #[test]
    fn order_within_groups() {
        let labels = vec![
            Label::new("yaml"),
            Label::described("Docker", "2#Docker"),
            Label::described("b-empty", ""),
            Label::new("go"),
            Label::described("Java", "1#Java"),
            Label::described("a-empty", ""),
            Label::described("K8s", "2#Docker"),
        ];
        let ordered = ordered_labels(&labels, &BTreeSet::new());
        assert_eq!(
            names(&ordered),
            vec!["Java", "Docker", "K8s", "a-empty", "b-empty", "go", "yaml"]
        );
    }

    #[test]
    fn reserved_labels_are_excluded() {
        let labels = vec![
            Label::new("Top"),
            Label::described("Rust", "1"),
            Label::new("TODO"),
        ];
        let reserved: BTreeSet<String> = ["Top".to_string(), "TODO".to_string()].into();
        let ordered = ordered_labels(&labels, &reserved);
        assert_eq!(names(&ordered), vec!["Rust"]);
    }

    #[test]
    fn ordering_is_total_and_stable_under_permutation() {
        let mut labels = vec![
            Label::new("c"),
            Label::described("b", ""),
            Label::described("a", "x"),
            Label::new("a"),
        ];
        let first: Vec<String> = ordered_labels(&labels, &BTreeSet::new())
            .iter()
            .map(|l| l.name.clone())
            .collect();
        labels.reverse();
        let second: Vec<String> = ordered_labels(&labels, &BTreeSet::new())
            .iter()
            .map(|l| l.name.clone())
            .collect();
        assert_eq!(first, second);
        assert_eq!(first, vec!["a", "b", "a", "c"]);
    }
}
