//! Guide table for segment selection.
//!
//! Entry `j` points to the first segment with `a_cum ≥ j · hat_area / len`,
//! so a lookup starts at most a few segments before its target.

use crate::envelope::{Envelope, SegmentId};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GuideTable {
    entries: Vec<SegmentId>,
}

/// `max(1, round(segments · factor))`.
fn table_size(segments: usize, factor: f64) -> usize {
    ((segments as f64 * factor).round() as usize).max(1)
}

impl GuideTable {
    pub fn build(env: &Envelope, factor: f64) -> Self {
        let mut table = Self::default();
        table.rebuild(env, factor);
        table
    }

    /// Recompute all entries from the current envelope.
    pub fn rebuild(&mut self, env: &Envelope, factor: f64) {
        let size = table_size(env.segment_count(), factor);
        let step = env.hat_area() / size as f64;
        self.entries.clear();
        self.entries.reserve(size);

        let mut cur = env.head();
        for j in 0..size {
            let threshold = j as f64 * step;
            while env.segment(cur).a_cum < threshold {
                match env.segment(cur).next {
                    Some(next) => cur = next,
                    None => break,
                }
            }
            self.entries.push(cur);
        }
    }

    /// Segment holding cumulative area `target = u · hat_area`, `u ∈ [0, 1)`.
    ///
    /// Never moves past the last segment.
    pub fn lookup(&self, env: &Envelope, u: f64) -> SegmentId {
        let target = u * env.hat_area();
        let j = ((u * self.entries.len() as f64) as usize).min(self.entries.len() - 1);
        let mut cur = self.entries[j];
        while env.segment(cur).a_cum < target {
            match env.segment(cur).next {
                Some(next) => cur = next,
                None => break,
            }
        }
        cur
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::density::FnDensity;
    use crate::envelope::build_envelope;
    use crate::options::ArouOptions;

    fn normal_envelope() -> Envelope {
        let d = FnDensity::builder()
            .pdf(|x| (-0.5 * x * x).exp())
            .dpdf(|x| -x * (-0.5 * x * x).exp())
            .build()
            .unwrap();
        let opts = ArouOptions {
            use_dars: false,
            ..Default::default()
        };
        build_envelope(&d, &opts).unwrap()
    }

    #[test]
    fn size_follows_factor() {
        let env = normal_envelope();
        let n = env.segment_count();
        assert_eq!(GuideTable::build(&env, 2.0).len(), 2 * n);
        assert_eq!(GuideTable::build(&env, 0.0).len(), 1);
        assert_eq!(GuideTable::build(&env, 0.5).len(), n / 2);
    }

    #[test]
    fn lookup_matches_linear_search() {
        let env = normal_envelope();
        for factor in [0.0, 0.3, 1.0, 2.0] {
            let table = GuideTable::build(&env, factor);
            for k in 0..1000 {
                let u = k as f64 / 1000.0;
                let target = u * env.hat_area();
                let expected = env
                    .iter()
                    .find(|(_, s)| s.a_cum >= target)
                    .map(|(id, _)| id)
                    .unwrap();
                assert_eq!(table.lookup(&env, u), expected, "u = {u}, factor = {factor}");
            }
        }
    }

    #[test]
    fn rebuild_is_idempotent() {
        let env = normal_envelope();
        let mut table = GuideTable::build(&env, 2.0);
        let first = table.clone();
        table.rebuild(&env, 2.0);
        assert_eq!(table, first);
    }
}
