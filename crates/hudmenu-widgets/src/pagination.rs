#![forbid(unsafe_code)]

//! Visible-window selection.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// How the visible window follows the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollPolicy {
    /// Cursor stays in the middle row; the window wraps around the list.
    #[default]
    CenterFixed,
    /// Cursor moves freely near either end and sticks to the middle row
    /// in between.
    WaitingCenter,
    /// Cursor moves freely until the last row, then the window scrolls.
    LinearScroll,
}

/// Result of [`paginate`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageWindow {
    /// Indices into the paginated list, top row first.
    pub indices: SmallVec<[usize; 8]>,
    /// Row carrying the cursor. `None` only for an empty list.
    pub arrow: Option<usize>,
    /// Index of the top row for linear policies; for `CenterFixed` the
    /// (wrapped) index shown in the top row.
    pub start: usize,
}

impl PageWindow {
    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// List index under the cursor.
    #[must_use]
    pub fn selected(&self) -> Option<usize> {
        self.arrow.and_then(|row| self.indices.get(row).copied())
    }
}

/// Choose which `max_visible` of `total` entries to show around `desired`.
///
/// `desired` is clamped into range and `max_visible` is treated as at
/// least one. An empty list yields an empty window without an arrow.
#[must_use]
pub fn paginate(total: usize, desired: usize, max_visible: usize, policy: ScrollPolicy) -> PageWindow {
    if total == 0 {
        return PageWindow::default();
    }
    let max_visible = max_visible.max(1);
    let desired = desired.min(total - 1);

    if total <= max_visible {
        return PageWindow {
            indices: (0..total).collect(),
            arrow: Some(desired),
            start: 0,
        };
    }

    let half = max_visible / 2;
    if policy == ScrollPolicy::CenterFixed {
        let start = (desired + total - half) % total;
        return PageWindow {
            indices: (0..max_visible).map(|i| (start + i) % total).collect(),
            arrow: Some(half),
            start,
        };
    }

    let (start, arrow) = linear_position(policy, total, desired, max_visible, half);
    PageWindow {
        indices: (start..start + max_visible).collect(),
        arrow: Some(arrow),
        start,
    }
}

fn linear_position(
    policy: ScrollPolicy,
    total: usize,
    desired: usize,
    max_visible: usize,
    half: usize,
) -> (usize, usize) {
    let last_start = total - max_visible;
    match policy {
        ScrollPolicy::WaitingCenter => {
            if desired < half {
                (0, desired)
            } else if desired >= total - half {
                (last_start, max_visible - (total - desired))
            } else {
                (desired - half, half)
            }
        }
        ScrollPolicy::LinearScroll => {
            let edge = max_visible - 1;
            if max_visible == 1 {
                (desired, 0)
            } else if desired < edge {
                (0, desired)
            } else if desired >= total - edge {
                (last_start, max_visible - (total - desired))
            } else {
                (desired - edge, edge)
            }
        }
        ScrollPolicy::CenterFixed => (0, half),
    }
}

/// Map `desired` (an index into the unfiltered list) onto `candidates`
/// (ascending unfiltered indices that survived filtering).
///
/// Returns the position within `candidates` of `desired` itself, or of the
/// candidate nearest to it; ties go to the earlier candidate.
#[must_use]
pub fn remap_desired(candidates: &[usize], desired: usize) -> Option<usize> {
    if let Ok(pos) = candidates.binary_search(&desired) {
        return Some(pos);
    }
    candidates
        .iter()
        .enumerate()
        .min_by_key(|&(_, &idx)| idx.abs_diff(desired))
        .map(|(pos, _)| pos)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(w: &PageWindow) -> Vec<usize> {
        w.indices.to_vec()
    }

    #[test]
    fn center_fixed_wraps_around_start() {
        let w = paginate(7, 0, 5, ScrollPolicy::CenterFixed);
        assert_eq!(rows(&w), vec![5, 6, 0, 1, 2]);
        assert_eq!(w.arrow, Some(2));
        assert_eq!(w.selected(), Some(0));
    }

    #[test]
    fn short_list_shows_everything() {
        for policy in [
            ScrollPolicy::CenterFixed,
            ScrollPolicy::WaitingCenter,
            ScrollPolicy::LinearScroll,
        ] {
            let w = paginate(3, 2, 5, policy);
            assert_eq!(rows(&w), vec![0, 1, 2]);
            assert_eq!(w.arrow, Some(2));
        }
    }

    #[test]
    fn empty_list_has_no_arrow() {
        let w = paginate(0, 4, 5, ScrollPolicy::WaitingCenter);
        assert!(w.is_empty());
        assert_eq!(w.arrow, None);
        assert_eq!(w.selected(), None);
    }

    #[test]
    fn waiting_center_phases() {
        let top = paginate(10, 1, 5, ScrollPolicy::WaitingCenter);
        assert_eq!((top.start, top.arrow), (0, Some(1)));
        let mid = paginate(10, 5, 5, ScrollPolicy::WaitingCenter);
        assert_eq!((mid.start, mid.arrow), (3, Some(2)));
        let bottom = paginate(10, 9, 5, ScrollPolicy::WaitingCenter);
        assert_eq!((bottom.start, bottom.arrow), (5, Some(4)));
    }

    #[test]
    fn linear_scroll_phases() {
        let top = paginate(10, 3, 5, ScrollPolicy::LinearScroll);
        assert_eq!((top.start, top.arrow), (0, Some(3)));
        let mid = paginate(10, 5, 5, ScrollPolicy::LinearScroll);
        assert_eq!((mid.start, mid.arrow), (1, Some(4)));
        let bottom = paginate(10, 7, 5, ScrollPolicy::LinearScroll);
        assert_eq!((bottom.start, bottom.arrow), (5, Some(2)));
    }

    #[test]
    fn linear_scroll_single_row() {
        let w = paginate(4, 2, 1, ScrollPolicy::LinearScroll);
        assert_eq!(rows(&w), vec![2]);
        assert_eq!(w.arrow, Some(0));
    }

    #[test]
    fn desired_is_clamped() {
        let w = paginate(6, 99, 3, ScrollPolicy::WaitingCenter);
        assert_eq!(w.selected(), Some(5));
    }

    #[test]
    fn remap_prefers_exact_then_nearest_then_first() {
        assert_eq!(remap_desired(&[0, 2, 4], 2), Some(1));
        assert_eq!(remap_desired(&[0, 5, 9], 7), Some(1));
        // 3 is equidistant from 2 and 4
        assert_eq!(remap_desired(&[2, 4], 3), Some(0));
        assert_eq!(remap_desired(&[], 3), None);
    }

    #[test]
    fn policy_names_are_snake_case() {
        let policy: ScrollPolicy = serde_json::from_str("\"waiting_center\"").unwrap();
        assert_eq!(policy, ScrollPolicy::WaitingCenter);
        assert_eq!(serde_json::to_string(&ScrollPolicy::LinearScroll).unwrap(), "\"linear_scroll\"");
    }
}
