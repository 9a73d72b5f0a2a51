use std::time::{Duration, Instant};

/// Lengths of the focus cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PomodoroConfig {
    pub focus: Duration,
    pub short_break: Duration,
    /// Number of focus rounds before the cycle is done.
    pub rounds: u32,
}

impl Default for PomodoroConfig {
    fn default() -> Self {
        Self {
            focus: Duration::from_secs(25 * 60),
            short_break: Duration::from_secs(5 * 60),
            rounds: 4,
        }
    }
}

/// Current phase. Rounds are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Focus(u32),
    Break(u32),
    Done,
}

impl Phase {
    pub fn is_running(self) -> bool {
        matches!(self, Phase::Focus(_) | Phase::Break(_))
    }
}

/// Linear focus/break timer: `Focus(1) -> Break(1) -> ... -> Focus(n) -> Done`.
#[derive(Debug, Clone)]
pub struct Pomodoro {
    config: PomodoroConfig,
    phase: Phase,
    phase_started: Option<Instant>,
}

impl Pomodoro {
    pub fn new(config: PomodoroConfig) -> Self {
        Self {
            config,
            phase: Phase::Idle,
            phase_started: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn start(&mut self, now: Instant) {
        self.phase = Phase::Focus(1);
        self.phase_started = Some(now);
    }

    pub fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.phase_started = None;
    }

    fn phase_length(&self) -> Option<Duration> {
        match self.phase {
            Phase::Focus(_) => Some(self.config.focus),
            Phase::Break(_) => Some(self.config.short_break),
            Phase::Idle | Phase::Done => None,
        }
    }

    fn successor(&self) -> Phase {
        match self.phase {
            Phase::Focus(n) if n >= self.config.rounds => Phase::Done,
            Phase::Focus(n) => Phase::Break(n),
            Phase::Break(n) => Phase::Focus(n + 1),
            other => other,
        }
    }

    /// Advances through every phase that has fully elapsed by `now` and
    /// returns the phases entered, in order.
    pub fn tick(&mut self, now: Instant) -> Vec<Phase> {
        let mut entered = Vec::new();
        while let (Some(len), Some(started)) = (self.phase_length(), self.phase_started) {
            let ends = started + len;
            if now < ends {
                break;
            }
            self.phase = self.successor();
            self.phase_started = self.phase.is_running().then_some(ends);
            entered.push(self.phase);
        }
        entered
    }

    /// Time left in the running phase.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        let len = self.phase_length()?;
        let started = self.phase_started?;
        Some((started + len).saturating_duration_since(now))
    }
}

impl Default for Pomodoro {
    fn default() -> Self {
        Self::new(PomodoroConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn short() -> PomodoroConfig {
        PomodoroConfig {
            focus: Duration::from_secs(10),
            short_break: Duration::from_secs(2),
            rounds: 2,
        }
    }

    #[test]
    fn runs_focus_break_focus_done() {
        let t0 = Instant::now();
        let mut p = Pomodoro::new(short());
        assert_eq!(p.phase(), Phase::Idle);
        p.start(t0);
        assert_eq!(p.phase(), Phase::Focus(1));
        assert!(p.tick(t0 + Duration::from_secs(9)).is_empty());
        assert_eq!(p.tick(t0 + Duration::from_secs(10)), vec![Phase::Break(1)]);
        assert_eq!(p.tick(t0 + Duration::from_secs(12)), vec![Phase::Focus(2)]);
        assert_eq!(p.tick(t0 + Duration::from_secs(22)), vec![Phase::Done]);
        assert_eq!(p.remaining(t0 + Duration::from_secs(30)), None);
    }

    #[test]
    fn catches_up_after_long_gap() {
        let t0 = Instant::now();
        let mut p = Pomodoro::new(short());
        p.start(t0);
        let entered = p.tick(t0 + Duration::from_secs(60));
        assert_eq!(entered, vec![Phase::Break(1), Phase::Focus(2), Phase::Done]);
    }

    #[test]
    fn remaining_counts_down_within_phase() {
        let t0 = Instant::now();
        let mut p = Pomodoro::new(short());
        p.start(t0);
        assert_eq!(p.remaining(t0 + Duration::from_secs(4)), Some(Duration::from_secs(6)));
        p.reset();
        assert_eq!(p.phase(), Phase::Idle);
        assert_eq!(p.remaining(t0), None);
    }
}
