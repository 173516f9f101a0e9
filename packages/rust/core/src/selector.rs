//! Issue selection: label membership, authorship, recency.
//!
//! Every selector borrows from the issue universe and returns references.
//! Recency order is update time descending; ties keep universe order.

use gitblog_shared::Issue;

/// A requested issue number that is not in the universe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unresolved {
    pub number: u64,
}

/// Stable sort, most recently updated first.
pub fn sort_by_recency(issues: &mut [&Issue]) {
    issues.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
}

/// Issues tagged `label`, most recently updated first.
pub fn select_by_label<'a>(issues: &'a [Issue], label: &str) -> Vec<&'a Issue> {
    let mut selected: Vec<&Issue> = issues.iter().filter(|i| i.has_label(label)).collect();
    sort_by_recency(&mut selected);
    selected
}

/// Issues tagged with any of `labels`, most recently updated first.
pub fn select_by_any_label<'a>(issues: &'a [Issue], labels: &[String]) -> Vec<&'a Issue> {
    let mut selected: Vec<&Issue> = issues.iter().filter(|i| i.has_any_label(labels)).collect();
    sort_by_recency(&mut selected);
    selected
}

/// Issues authored by `owner`, in input order.
pub fn select_owned<'a, I>(issues: I, owner: &str) -> Vec<&'a Issue>
where
    I: IntoIterator<Item = &'a Issue>,
{
    issues
        .into_iter()
        .filter(|i| i.is_authored_by(owner))
        .collect()
}

/// The `limit` most recently updated issues authored by `owner`.
pub fn select_recent<'a>(issues: &'a [Issue], owner: &str, limit: usize) -> Vec<&'a Issue> {
    let mut owned = select_owned(issues, owner);
    sort_by_recency(&mut owned);
    owned.truncate(limit);
    owned
}

/// The issues a run should archive.
///
/// Without a requested number this is the whole universe, unchanged. With one,
/// it is that single issue, or [`Unresolved`] when the universe lacks it.
pub fn select_target(all: &[Issue], requested: Option<u64>) -> Result<Vec<&Issue>, Unresolved> {
    let Some(number) = requested else {
        return Ok(all.iter().collect());
    };

    all.iter()
        .find(|i| i.number == number)
        .map(|issue| vec![issue])
        .ok_or(Unresolved { number })
}
