//! Character lattice construction
//!
//! Two phases. First the dual-word ranges are planned: anything running
//! past the text, sharing a start index or overlapping another dual word is
//! rejected, and the survivors are sorted. Then a single forward scan
//! emits one `Char` unit per index, except that at the start of each
//! accepted range it emits one `Dual` unit and jumps past its end.

use crate::models::{CharRange, DualWordSettings, Lattice, ParallelGloss};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("dual word {start}..={end} runs past the end of the text ({len} chars)")]
    OutOfBounds { start: usize, end: usize, len: usize },

    #[error("dual word {start}..={end} shares its start index with {other_start}..={other_end}")]
    SharedStart {
        start: usize,
        end: usize,
        other_start: usize,
        other_end: usize,
    },

    #[error("dual word {start}..={end} overlaps {other_start}..={other_end}")]
    Overlap {
        start: usize,
        end: usize,
        other_start: usize,
        other_end: usize,
    },
}

/// The consumed ranges for one verse
#[derive(Debug, Clone, Default)]
pub struct DualWordPlan {
    /// Non-overlapping, in-bounds, sorted by start
    pub accepted: Vec<ParallelGloss>,
    pub rejected: Vec<(CharRange, ValidationError)>,
}

pub fn plan_dual_words(glosses: &[ParallelGloss], char_count: usize) -> DualWordPlan {
    let mut plan = DualWordPlan::default();

    let mut candidates: Vec<&ParallelGloss> = Vec::with_capacity(glosses.len());
    for gloss in glosses {
        let range = gloss.range;
        if range.end() >= char_count {
            plan.rejected.push((
                range,
                ValidationError::OutOfBounds {
                    start: range.start(),
                    end: range.end(),
                    len: char_count,
                },
            ));
        } else {
            candidates.push(gloss);
        }
    }
    candidates.sort_by_key(|g| (g.range.start(), g.range.end()));

    // Sweep into clusters of transitively overlapping ranges. A cluster of
    // one is accepted; every member of a larger cluster is rejected.
    let mut cluster: Vec<&ParallelGloss> = Vec::new();
    let mut cluster_end = 0;
    for gloss in candidates {
        if !cluster.is_empty() && gloss.range.start() > cluster_end {
            settle_cluster(&cluster, &mut plan);
            cluster.clear();
        }
        cluster_end = if cluster.is_empty() {
            gloss.range.end()
        } else {
            cluster_end.max(gloss.range.end())
        };
        cluster.push(gloss);
    }
    if !cluster.is_empty() {
        settle_cluster(&cluster, &mut plan);
    }

    plan
}

fn settle_cluster(cluster: &[&ParallelGloss], plan: &mut DualWordPlan) {
    if let [only] = cluster {
        plan.accepted.push((*only).clone());
        return;
    }

    for (i, gloss) in cluster.iter().enumerate() {
        let range = gloss.range;
        let Some(other) = cluster
            .iter()
            .enumerate()
            .find(|(j, o)| *j != i && o.range.overlaps(&range))
            .map(|(_, o)| o.range)
        else {
            continue;
        };

        let error = if other.start() == range.start() {
            ValidationError::SharedStart {
                start: range.start(),
                end: range.end(),
                other_start: other.start(),
                other_end: other.end(),
            }
        } else {
            ValidationError::Overlap {
                start: range.start(),
                end: range.end(),
                other_start: other.start(),
                other_end: other.end(),
            }
        };
        plan.rejected.push((range, error));
    }
}

/// Emit the lattice for `text` given a plan's accepted ranges
pub fn build_lattice(text: &str, accepted: &[ParallelGloss], dual_style: &DualWordSettings) -> Lattice {
    let chars: Vec<char> = text.chars().collect();
    let mut lattice = Lattice::with_capacity(chars.len());
    let mut pending = accepted.iter().peekable();

    let mut i = 0;
    while i < chars.len() {
        // Skip any range we have already passed; a valid plan never has one
        while pending.next_if(|g| g.range.start() < i).is_some() {}

        if let Some(gloss) = pending.next_if(|g| g.range.start() == i) {
            lattice.push_dual(gloss, &chars, dual_style);
            i = gloss.range.end() + 1;
        } else {
            lattice.push_char(i, chars[i]);
            i += 1;
        }
    }

    lattice
}
