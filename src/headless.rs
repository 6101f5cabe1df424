use antr_core::{
    ArrowDirection, CapabilityError, DisplaySurface, InputChannel, KeyBindings, KeyId,
    ResponseOutcome, VisualState,
};
use antr_render::OffscreenSurface;
use antr_timing::Timer;
use rand::Rng;
use rand::rngs::StdRng;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::trace;

/// Direction of the chevron currently on screen, as the participant saw it.
#[derive(Debug, Clone, Default)]
pub struct TargetBoard(Arc<Mutex<Option<ArrowDirection>>>);

impl TargetBoard {
    fn show(&self, direction: Option<ArrowDirection>) {
        if let Ok(mut seen) = self.0.lock() {
            if direction.is_some() {
                *seen = direction;
            }
        }
    }

    fn last(&self) -> Option<ArrowDirection> {
        self.0.lock().ok().and_then(|seen| *seen)
    }
}

/// Off-screen display for dry runs; tells the simulated participant what
/// target was shown.
pub struct HeadlessSurface<T: Timer<Timestamp = u64>> {
    inner: OffscreenSurface<T>,
    board: TargetBoard,
}

impl<T: Timer<Timestamp = u64>> HeadlessSurface<T> {
    pub fn new(inner: OffscreenSurface<T>, board: TargetBoard) -> Self {
        Self { inner, board }
    }
}

impl<T: Timer<Timestamp = u64>> DisplaySurface for HeadlessSurface<T> {
    fn render(&mut self, state: &VisualState) -> Result<(), CapabilityError> {
        self.inner.render(state)?;
        self.board.show(state.target().map(|(s, _)| s.direction()));
        trace!(
            frame = self.inner.frames_rendered(),
            ?state,
            row = ?state.target().map(|(s, _)| s.text()),
            compose_us = self
                .inner
                .last_stats()
                .map(|s| s.compose.as_micros() as u64),
            "frame committed"
        );
        Ok(())
    }
}

/// How the simulated participant behaves.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticipantProfile {
    pub accuracy: f64,
    pub miss_rate: f64,
    /// Latency from the opening of the response window, half-open.
    pub latency_ms: (u64, u64),
}

impl Default for ParticipantProfile {
    fn default() -> Self {
        Self {
            accuracy: 0.9,
            miss_rate: 0.05,
            latency_ms: (250, 900),
        }
    }
}

/// Answers every wait by "pressing" after a random latency on `timer`.
pub struct SimulatedParticipant<T: Timer> {
    profile: ParticipantProfile,
    keys: KeyBindings,
    board: TargetBoard,
    timer: T,
    rng: StdRng,
}

impl<T: Timer> SimulatedParticipant<T> {
    pub fn new(
        profile: ParticipantProfile,
        keys: KeyBindings,
        board: TargetBoard,
        timer: T,
        rng: StdRng,
    ) -> Self {
        Self {
            profile,
            keys,
            board,
            timer,
            rng,
        }
    }

    fn choose_key(&mut self) -> KeyId {
        let seen = self.board.last().unwrap_or(ArrowDirection::Left);
        let direction = if self.rng.random_bool(self.profile.accuracy.clamp(0.0, 1.0)) {
            seen
        } else {
            seen.opposite()
        };
        self.keys.key_for(direction)
    }
}

impl<T: Timer> InputChannel for SimulatedParticipant<T> {
    fn wait_for_key(
        &mut self,
        timeout: Option<Duration>,
        recognized: &[KeyId],
    ) -> Result<ResponseOutcome, CapabilityError> {
        let Some(window) = timeout else {
            // Start gate: press the first accepted key right away.
            let key = recognized
                .first()
                .copied()
                .ok_or_else(|| CapabilityError::Input("no start key to press".into()))?;
            return Ok(ResponseOutcome::pressed(key, Duration::ZERO));
        };

        let (lo, hi) = self.profile.latency_ms;
        let latency = Duration::from_millis(self.rng.random_range(lo..hi.max(lo + 1)));
        let misses = self.rng.random_bool(self.profile.miss_rate.clamp(0.0, 1.0));
        if misses || latency > window {
            self.timer.sleep(window);
            return Ok(ResponseOutcome::timeout());
        }

        let key = self.choose_key();
        self.timer.sleep(latency);
        Ok(ResponseOutcome::pressed(key, latency))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use antr_timing::VirtualTimer;
    use rand::SeedableRng;

    fn participant(
        profile: ParticipantProfile,
        board: TargetBoard,
    ) -> SimulatedParticipant<VirtualTimer> {
        SimulatedParticipant::new(
            profile,
            KeyBindings::default(),
            board,
            VirtualTimer::new(),
            StdRng::seed_from_u64(1),
        )
    }

    #[test]
    fn start_gate_is_pressed_immediately() {
        let mut p = participant(ParticipantProfile::default(), TargetBoard::default());
        let out = p.wait_for_key(None, &[KeyId::new('t')]).unwrap();
        assert_eq!(out.key, Some(KeyId::new('t')));
        assert_eq!(p.timer.now(), 0);
    }

    #[test]
    fn perfect_participant_answers_the_seen_direction() {
        let board = TargetBoard::default();
        board.show(Some(ArrowDirection::Right));
        let profile = ParticipantProfile {
            accuracy: 1.0,
            miss_rate: 0.0,
            latency_ms: (300, 301),
        };
        let mut p = participant(profile, board);
        let out = p
            .wait_for_key(Some(Duration::from_millis(1500)), &KeyBindings::default().recognized())
            .unwrap();
        assert_eq!(out.key, Some(KeyId::new('j')));
        assert_eq!(out.reaction_time, Some(Duration::from_millis(300)));
        assert_eq!(p.timer.now(), 300_000_000);
    }

    #[test]
    fn slow_participant_times_out_after_the_window() {
        let profile = ParticipantProfile {
            accuracy: 1.0,
            miss_rate: 0.0,
            latency_ms: (2000, 2001),
        };
        let mut p = participant(profile, TargetBoard::default());
        let out = p
            .wait_for_key(Some(Duration::from_millis(1500)), &KeyBindings::default().recognized())
            .unwrap();
        assert!(out.is_timeout());
        assert_eq!(p.timer.now(), 1_500_000_000);
    }
}
