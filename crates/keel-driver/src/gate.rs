//! Phase gate: which checking phase runs next and whether the result fails

use keel_program::Phase;
use tracing::debug;

const CHECKING_PHASES: [Phase; 3] = [Phase::Syntactic, Phase::Global, Phase::Semantic];

/// Runs the checking phases in order and stops after the first one that
/// reports anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhaseGate {
    ran: Vec<(Phase, usize)>,
}

impl PhaseGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` once a phase reported diagnostics or all phases ran
    pub fn next_phase(&self) -> Option<Phase> {
        match self.ran.last() {
            None => Some(CHECKING_PHASES[0]),
            Some(&(_, count)) if count > 0 => None,
            Some(_) => CHECKING_PHASES.get(self.ran.len()).copied(),
        }
    }

    /// Records the diagnostic count of the phase [`next_phase`](Self::next_phase) returned
    pub fn record(&mut self, phase: Phase, count: usize) {
        debug!(%phase, count, "checking phase finished");
        self.ran.push((phase, count));
        if count > 0 && self.ran.len() < CHECKING_PHASES.len() {
            debug!(%phase, count, "skipping later checking phases");
        }
    }

    /// Diagnostic count of the last phase that ran
    pub fn decisive_count(&self) -> usize {
        self.ran.last().map_or(0, |&(_, count)| count)
    }

    pub fn phases_run(&self) -> Vec<Phase> {
        self.ran.iter().map(|&(phase, _)| phase).collect()
    }

    pub fn fails(&self, emit_count: usize) -> bool {
        let failed = self.decisive_count() > 0 || emit_count > 0;
        debug!(decisive = self.decisive_count(), emit = emit_count, failed, "gate decision");
        failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn run(counts: &[usize]) -> PhaseGate {
        let mut gate = PhaseGate::new();
        let mut counts = counts.iter();
        while let Some(phase) = gate.next_phase() {
            let count = counts.next().copied().unwrap_or(0);
            gate.record(phase, count);
        }
        gate
    }

    #[test]
    fn test_clean_run_visits_every_phase() {
        let gate = run(&[0, 0, 0]);
        assert_eq!(gate.phases_run(), vec![Phase::Syntactic, Phase::Global, Phase::Semantic]);
        assert_eq!(gate.decisive_count(), 0);
        assert!(!gate.fails(0));
        assert!(gate.fails(1));
    }

    #[test]
    fn test_syntax_errors_stop_the_gate() {
        let gate = run(&[2]);
        assert_eq!(gate.phases_run(), vec![Phase::Syntactic]);
        assert_eq!(gate.decisive_count(), 2);
        assert!(gate.fails(0));
    }

    #[test]
    fn test_semantic_count_decides() {
        let gate = run(&[0, 0, 1]);
        assert_eq!(gate.decisive_count(), 1);
        assert!(gate.fails(0));

        let gate = run(&[0, 3]);
        assert_eq!(gate.phases_run(), vec![Phase::Syntactic, Phase::Global]);
        assert_eq!(gate.decisive_count(), 3);
    }
}
