//! Run-length grouping of per-page titles.

use crate::output::PageGroup;

/// Collapse `titles` into maximal runs of identical consecutive titles.
///
/// Comparison is exact string equality. Runs of the same title separated by
/// another title stay separate groups: one document type can legitimately
/// appear twice in a dossier (e.g. two guarantors' payslips).
pub fn group_consecutive_pages<S: AsRef<str>>(titles: &[S]) -> Vec<PageGroup> {
    let mut groups = Vec::new();
    let Some(first) = titles.first() else {
        return groups;
    };

    let mut current = first.as_ref();
    let mut start_idx = 0;
    for (idx, title) in titles.iter().enumerate().skip(1) {
        let title = title.as_ref();
        if title != current {
            groups.push(PageGroup::new(current, start_idx, idx - 1));
            current = title;
            start_idx = idx;
        }
    }
    groups.push(PageGroup::new(current, start_idx, titles.len() - 1));

    groups
}
