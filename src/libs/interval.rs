use std::fmt;

/// A closed, 1-based range `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Interval {
    pub start: u32,
    pub end: u32,
}

impl Interval {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> u32 {
        if self.end < self.start {
            0
        } else {
            self.end - self.start + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Anything that occupies an interval
pub trait Spanned {
    fn span(&self) -> Interval;
}

impl Spanned for Interval {
    fn span(&self) -> Interval {
        *self
    }
}

impl Spanned for crate::libs::feature::FeatureRecord {
    fn span(&self) -> Interval {
        self.interval()
    }
}

/// Stable ascending sort by start. Equal starts keep insertion order.
///
/// ```
/// # use genefeat::libs::interval::{sort_by_start, Interval};
/// let mut ivs = vec![Interval::new(50, 60), Interval::new(10, 90), Interval::new(10, 20)];
/// sort_by_start(&mut ivs);
/// assert_eq!(ivs, vec![Interval::new(10, 90), Interval::new(10, 20), Interval::new(50, 60)]);
/// ```
pub fn sort_by_start<T: Spanned>(items: &mut [T]) {
    items.sort_by_key(|e| e.span().start);
}

/// Collapses start-sorted intervals into non-overlapping runs.
///
/// An interval continues the current run when it overlaps or abuts it,
/// i.e. `next.start - current.end <= 1`.
///
/// ```
/// # use genefeat::libs::interval::{merge_overlapping, Interval};
/// let runs = merge_overlapping(&[
///     Interval::new(1, 10),
///     Interval::new(11, 20),
///     Interval::new(15, 18),
///     Interval::new(22, 30),
/// ]);
/// assert_eq!(runs, vec![Interval::new(1, 20), Interval::new(22, 30)]);
/// ```
pub fn merge_overlapping(sorted: &[Interval]) -> Vec<Interval> {
    let mut runs: Vec<Interval> = Vec::with_capacity(sorted.len());

    for iv in sorted {
        match runs.last_mut() {
            Some(cur) if (iv.start as u64) <= cur.end as u64 + 1 => {
                cur.end = cur.end.max(iv.end);
            }
            _ => runs.push(*iv),
        }
    }

    runs
}

/// Gaps of `span` not covered by `runs`.
///
/// `runs` must be sorted, merged and non-overlapping. Empty or inverted
/// gaps are dropped.
///
/// ```
/// # use genefeat::libs::interval::{complement, Interval};
/// let gaps = complement(
///     Interval::new(1, 500),
///     &[Interval::new(100, 200), Interval::new(250, 300)],
/// );
/// assert_eq!(
///     gaps,
///     vec![Interval::new(1, 99), Interval::new(201, 249), Interval::new(301, 500)]
/// );
/// ```
pub fn complement(span: Interval, runs: &[Interval]) -> Vec<Interval> {
    let mut gaps = vec![];
    let span_end = span.end as u64;
    let mut cursor = span.start as u64;

    for run in runs {
        if cursor > span_end {
            break;
        }
        let gap_end = (run.start as u64).saturating_sub(1).min(span_end);
        if cursor <= gap_end {
            gaps.push(Interval::new(cursor as u32, gap_end as u32));
        }
        cursor = cursor.max(run.end as u64 + 1);
    }

    if cursor <= span_end {
        gaps.push(Interval::new(cursor as u32, span.end));
    }

    gaps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_len() {
        assert_eq!(Interval::new(1, 1).len(), 1);
        assert_eq!(Interval::new(21, 24).len(), 4);
        assert!(Interval::new(5, 4).is_empty());
        assert_eq!(Interval::new(5, 4).len(), 0);
    }

    #[test]
    fn test_sort_is_stable() {
        let mut ivs = vec![
            Interval::new(30, 31),
            Interval::new(5, 9),
            Interval::new(5, 7),
            Interval::new(5, 8),
        ];
        sort_by_start(&mut ivs);
        assert_eq!(
            ivs,
            vec![
                Interval::new(5, 9),
                Interval::new(5, 7),
                Interval::new(5, 8),
                Interval::new(30, 31),
            ]
        );
    }

    #[test]
    fn test_merge_gap_of_one_base_is_kept() {
        // 21 - 19 = 2, a real gap at position 20
        let runs = merge_overlapping(&[Interval::new(10, 19), Interval::new(21, 30)]);
        assert_eq!(runs, vec![Interval::new(10, 19), Interval::new(21, 30)]);
    }

    #[test]
    fn test_merge_nested_and_empty() {
        assert!(merge_overlapping(&[]).is_empty());

        let runs = merge_overlapping(&[
            Interval::new(1, 100),
            Interval::new(10, 20),
            Interval::new(50, 60),
            Interval::new(101, 110),
        ]);
        assert_eq!(runs, vec![Interval::new(1, 110)]);
    }

    #[test]
    fn test_complement_no_runs() {
        assert_eq!(
            complement(Interval::new(1, 50), &[]),
            vec![Interval::new(1, 50)]
        );
    }

    #[test]
    fn test_complement_flush_edges() {
        let gaps = complement(
            Interval::new(1, 100),
            &[Interval::new(1, 10), Interval::new(90, 100)],
        );
        assert_eq!(gaps, vec![Interval::new(11, 89)]);

        let gaps = complement(Interval::new(1, 100), &[Interval::new(1, 100)]);
        assert!(gaps.is_empty());
    }

    #[test]
    fn test_complement_single_base_gaps() {
        let gaps = complement(
            Interval::new(1, 10),
            &[Interval::new(2, 4), Interval::new(6, 9)],
        );
        assert_eq!(
            gaps,
            vec![Interval::new(1, 1), Interval::new(5, 5), Interval::new(10, 10)]
        );
    }

    #[test]
    fn test_complement_inner_span() {
        // span not starting at 1, as used for transcripts
        let gaps = complement(
            Interval::new(10, 30),
            &[Interval::new(10, 20), Interval::new(25, 30)],
        );
        assert_eq!(gaps, vec![Interval::new(21, 24)]);
    }

    #[test]
    fn test_complement_runs_past_span() {
        let gaps = complement(
            Interval::new(1, 50),
            &[Interval::new(20, 30), Interval::new(60, 70)],
        );
        assert_eq!(gaps, vec![Interval::new(1, 19), Interval::new(31, 50)]);
    }

    #[test]
    fn test_complement_matches_intspan() {
        let runs = merge_overlapping(&[
            Interval::new(3, 8),
            Interval::new(7, 12),
            Interval::new(20, 25),
            Interval::new(26, 26),
            Interval::new(40, 44),
        ]);
        let gaps = complement(Interval::new(1, 60), &runs);

        let mut covered = intspan::IntSpan::new();
        for run in &runs {
            covered.add_pair(run.start as i32, run.end as i32);
        }
        let expected = intspan::IntSpan::from_pair(1, 60).diff(&covered);

        let got: Vec<(i32, i32)> = gaps
            .iter()
            .map(|g| (g.start as i32, g.end as i32))
            .collect();
        assert_eq!(got, expected.spans());
    }
}
