use super::panel::Candidate;
use std::collections::HashMap;

/// Per-candidate dwell counts, each held in `[0, threshold]`.
#[derive(Debug, Clone)]
pub struct DwellCounters {
    threshold: u8,
    counts: HashMap<Candidate, u8>,
}

impl DwellCounters {
    pub fn new(threshold: u8) -> Self {
        Self {
            threshold: threshold.max(1),
            counts: HashMap::new(),
        }
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    pub fn get(&self, candidate: Candidate) -> u8 {
        self.counts.get(&candidate).copied().unwrap_or(0)
    }

    /// Add one, saturating at the threshold. Returns the new count.
    pub fn increment(&mut self, candidate: Candidate) -> u8 {
        let count = self.counts.entry(candidate).or_insert(0);
        *count = count.saturating_add(1).min(self.threshold);
        *count
    }

    /// Take one off the highest nonzero count among `candidates`; ties go to
    /// the earliest entry. Returns the candidate and its new count.
    pub fn decay_highest(&mut self, candidates: &[Candidate]) -> Option<(Candidate, u8)> {
        let mut best: Option<(Candidate, u8)> = None;
        for &candidate in candidates {
            let count = self.get(candidate);
            if count > 0 && best.map_or(true, |(_, top)| count > top) {
                best = Some((candidate, count));
            }
        }
        let (candidate, count) = best?;
        let next = count - 1;
        if next == 0 {
            self.counts.remove(&candidate);
        } else {
            self.counts.insert(candidate, next);
        }
        Some((candidate, next))
    }

    pub fn reset(&mut self) {
        self.counts.clear();
    }

    /// Nonzero counts in `candidates` order.
    pub fn active<'a>(
        &'a self,
        candidates: &'a [Candidate],
    ) -> impl Iterator<Item = (Candidate, u8)> + 'a {
        candidates
            .iter()
            .map(|&candidate| (candidate, self.get(candidate)))
            .filter(|&(_, count)| count > 0)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.values().all(|&count| count == 0)
    }
}
