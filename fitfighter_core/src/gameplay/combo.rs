//! Combo mode: a reactive single-target drill for tier 1 and a
//! preview-and-replicate sequence drill for tiers 2-4.

use rand::Rng;
use rig_schema::{
    ComboSummary, CompletedSequence, EndReason, SessionMode, SessionResult, Summary, PAD_COUNT,
};
use tracing::{debug, info};

use super::{mean, rate, Streak, TimeLimit, DEFAULT_LIVES};
use crate::input::events::ButtonEvent;
use crate::led::color::{BLUE, GREEN, OFF, RED, TARGET_YELLOW};
use crate::led::LedDevice;
use crate::session::{Engine, Flow, Rig};
use crate::{PadId, Result, Seconds};

/// Punch sequences the replicate drill draws from, by pad number.
pub const COMBO_CATALOG: &[&[u8]] = &[
    &[2, 2], &[2, 3], &[2, 3, 1], &[2, 2, 3], &[2, 2, 1], &[2, 2, 1, 3], &[2, 3, 1, 2],
    &[1, 2, 5], &[2, 5, 2, 3], &[2, 2, 4], &[5, 2, 4], &[5, 3, 1], &[2, 2, 1, 2],
    &[2, 2, 3, 2], &[2, 2, 2, 3], &[7, 7, 1, 2], &[2, 2, 8, 1], &[2, 3, 2, 3], &[7, 8, 1, 3],
    &[2, 2, 8], &[5, 7], &[5, 4], &[1, 2, 7], &[1, 3, 7, 7], &[2, 3, 5, 2], &[1, 5, 1],
    &[5, 1, 2, 1], &[2, 5, 2], &[2, 5, 1], &[5, 1, 7], &[2, 2, 2], &[2, 2, 2, 8],
    &[2, 2, 8, 1], &[2, 6, 7], &[2, 2, 4], &[2, 2, 3, 1], &[2, 6, 1, 1], &[1, 2], &[2, 3, 1, 3],
];

const TOP_TIER: u8 = 4;
const REACTIVE_FLASH_S: Seconds = 1.0;
const CORRECT_FLASH_S: Seconds = 0.5;
const WRONG_FLASH_S: Seconds = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ComboConfig {
    pub tier: u8,
    pub lives: u32,
    pub time_limit: TimeLimit,
    /// Gap between preview steps.
    pub interval: Seconds,
    /// How long each preview step stays lit.
    pub show_time: Seconds,
}

impl ComboConfig {
    pub fn for_tier(tier: u8, time_limit: TimeLimit) -> Self {
        let tier = tier.clamp(1, TOP_TIER);
        let (interval, show_time) = match tier {
            3 => (0.4, 0.3),
            4 => (0.3, 0.25),
            _ => (0.5, 0.3),
        };
        Self {
            tier,
            lives: DEFAULT_LIVES,
            time_limit,
            interval,
            show_time,
        }
    }

    fn assists(&self) -> bool {
        self.tier <= 2
    }
}

pub fn catalog_sequence(index: usize) -> Vec<PadId> {
    COMBO_CATALOG[index % COMBO_CATALOG.len()]
        .iter()
        .filter_map(|p| PadId::new(*p))
        .collect()
}

fn draw_sequence<R: Rng>(rng: &mut R) -> Vec<PadId> {
    let index = rng.gen_range(0..COMBO_CATALOG.len());
    catalog_sequence(index)
}

fn random_pad<R: Rng>(rng: &mut R) -> PadId {
    loop {
        if let Some(pad) = PadId::from_index(rng.gen_range(0..PAD_COUNT)) {
            return pad;
        }
    }
}

/// Uniform pad other than `previous`, by rejection.
pub fn pick_other_pad<R: Rng>(rng: &mut R, previous: PadId) -> PadId {
    loop {
        let pad = random_pad(rng);
        if pad != previous {
            return pad;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Drill {
    Reactive {
        target: PadId,
        target_since: Seconds,
        reaction_times: Vec<Seconds>,
    },
    Replicate {
        sequence: Vec<PadId>,
        phase: Phase,
        completed: Vec<CompletedSequence>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    /// Previewing `sequence[cursor]`; `lit` while the pad is on.
    Show {
        cursor: usize,
        next_at: Seconds,
        lit: bool,
    },
    /// All sequence pads pulse as the go signal.
    Go { until: Seconds },
    Hit {
        index: usize,
        started_at: Seconds,
        first_hit: Option<Seconds>,
    },
    Celebrate { until: Seconds },
}

pub struct ComboEngine<R: Rng> {
    config: ComboConfig,
    rng: R,
    started_at: Seconds,
    score: u32,
    lives: u32,
    streak: Streak,
    drill: Drill,
}

impl<R: Rng> ComboEngine<R> {
    pub fn new(config: ComboConfig, mut rng: R) -> Self {
        let drill = if config.tier == 1 {
            Drill::Reactive {
                target: random_pad(&mut rng),
                target_since: 0.0,
                reaction_times: Vec::new(),
            }
        } else {
            Drill::Replicate {
                sequence: draw_sequence(&mut rng),
                phase: Phase::Show {
                    cursor: 0,
                    next_at: 0.0,
                    lit: false,
                },
                completed: Vec::new(),
            }
        };
        Self {
            lives: config.lives,
            config,
            rng,
            started_at: 0.0,
            score: 0,
            streak: Streak::default(),
            drill,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn streak(&self) -> Streak {
        self.streak
    }

    /// Lit target of the reactive drill.
    pub fn target(&self) -> Option<PadId> {
        match &self.drill {
            Drill::Reactive { target, .. } => Some(*target),
            Drill::Replicate { .. } => None,
        }
    }

    pub fn sequence(&self) -> Option<&[PadId]> {
        match &self.drill {
            Drill::Replicate { sequence, .. } => Some(sequence),
            Drill::Reactive { .. } => None,
        }
    }

    pub fn phase(&self) -> Option<Phase> {
        match &self.drill {
            Drill::Replicate { phase, .. } => Some(*phase),
            Drill::Reactive { .. } => None,
        }
    }

    /// Replaces the sequence being previewed. Only meaningful before the
    /// first Hit phase.
    pub fn set_sequence(&mut self, pads: Vec<PadId>) {
        if let Drill::Replicate { sequence, .. } = &mut self.drill {
            if !pads.is_empty() {
                *sequence = pads;
            }
        }
    }

    fn wrong_press<D: LedDevice>(&mut self, pad: PadId, now: Seconds, rig: &mut Rig<D>) {
        rig.leds.flash(pad, RED, WRONG_FLASH_S, None, now);
        self.lives = self.lives.saturating_sub(1);
        self.streak.reset();
        debug!(pad = pad.get(), lives = self.lives, "wrong pad");
    }

    fn update_reactive<D: LedDevice>(&mut self, now: Seconds, event: ButtonEvent, rig: &mut Rig<D>) {
        let Drill::Reactive { target, .. } = &self.drill else {
            return;
        };
        if event.pad != *target {
            self.wrong_press(event.pad, now, rig);
            return;
        }

        let previous = *target;
        let next = pick_other_pad(&mut self.rng, previous);
        if let Drill::Reactive {
            target,
            target_since,
            reaction_times,
        } = &mut self.drill
        {
            reaction_times.push((event.timestamp - *target_since).max(0.0));
            *target = next;
            *target_since = now;
        }
        self.score += 1;
        self.streak.hit();

        rig.leds.flash(previous, GREEN, REACTIVE_FLASH_S, Some(OFF), now);
        rig.leds.cancel_flash(next);
        rig.leds.set_pad(next, TARGET_YELLOW);
    }

    fn update_replicate<D: LedDevice>(
        &mut self,
        now: Seconds,
        event: Option<ButtonEvent>,
        rig: &mut Rig<D>,
    ) {
        let Drill::Replicate { sequence, phase, .. } = &self.drill else {
            return;
        };
        let (sequence, phase) = (sequence.clone(), *phase);
        let interval = self.config.interval;

        match phase {
            Phase::Show { cursor, next_at, lit } if now >= next_at => {
                let next_phase = if lit {
                    rig.leds.set_pad(sequence[cursor], OFF);
                    Phase::Show {
                        cursor: cursor + 1,
                        next_at: now + interval,
                        lit: false,
                    }
                } else if cursor < sequence.len() {
                    rig.leds.cancel_flash(sequence[cursor]);
                    rig.leds.set_pad(sequence[cursor], BLUE);
                    Phase::Show {
                        cursor,
                        next_at: now + self.config.show_time,
                        lit: true,
                    }
                } else {
                    for pad in &sequence {
                        rig.leds.cancel_flash(*pad);
                        rig.leds.set_pad(*pad, TARGET_YELLOW);
                    }
                    Phase::Go {
                        until: now + interval,
                    }
                };
                self.set_phase(next_phase);
            }
            Phase::Go { until } if now >= until => {
                rig.leds.cancel_all();
                rig.leds.clear_all();
                rig.bus.unlock(now);
                if self.config.assists() {
                    rig.leds.set_pad(sequence[0], TARGET_YELLOW);
                }
                debug!(?sequence, "replicate phase open");
                self.set_phase(Phase::Hit {
                    index: 0,
                    started_at: now,
                    first_hit: None,
                });
            }
            Phase::Hit {
                index,
                started_at,
                first_hit,
            } => {
                if let Some(ev) = event {
                    self.hit_phase_press(&sequence, index, started_at, first_hit, ev, now, rig);
                }
            }
            Phase::Celebrate { until } if now >= until => {
                rig.leds.cancel_all();
                rig.leds.clear_all();
                let next = draw_sequence(&mut self.rng);
                debug!(?next, "next sequence");
                if let Drill::Replicate { sequence, .. } = &mut self.drill {
                    *sequence = next;
                }
                self.enter_show(now, rig);
            }
            _ => {}
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn hit_phase_press<D: LedDevice>(
        &mut self,
        sequence: &[PadId],
        index: usize,
        started_at: Seconds,
        first_hit: Option<Seconds>,
        ev: ButtonEvent,
        now: Seconds,
        rig: &mut Rig<D>,
    ) {
        let expected = sequence[index];
        if ev.pad != expected {
            self.wrong_press(ev.pad, now, rig);
            let index = if self.config.tier >= TOP_TIER { 0 } else { index };
            self.set_phase(Phase::Hit {
                index,
                started_at,
                first_hit,
            });
            return;
        }

        let assists = self.config.assists();
        let next_same = assists && sequence.get(index + 1) == Some(&expected);
        rig.leds.flash(
            expected,
            GREEN,
            CORRECT_FLASH_S,
            next_same.then_some(TARGET_YELLOW),
            now,
        );
        self.score += 1;
        self.streak.hit();

        let index = index + 1;
        let first_hit = first_hit.or(Some((ev.timestamp - started_at).max(0.0)));

        if index < sequence.len() && assists && !next_same {
            rig.leds.cancel_flash(sequence[index]);
            rig.leds.set_pad(sequence[index], TARGET_YELLOW);
        }

        if index < sequence.len() {
            self.set_phase(Phase::Hit {
                index,
                started_at,
                first_hit,
            });
            return;
        }

        let record = CompletedSequence {
            first_hit_s: first_hit.unwrap_or(0.0),
            total_time_s: (ev.timestamp - started_at).max(0.0),
            sequence: sequence.to_vec(),
        };
        debug!(total = record.total_time_s, len = sequence.len(), "sequence complete");
        if let Drill::Replicate { completed, .. } = &mut self.drill {
            completed.push(record);
        }

        rig.bus.lock();
        rig.leds.cancel_all();
        rig.leds.fill_all(GREEN);
        self.set_phase(Phase::Celebrate {
            until: now + self.config.interval,
        });
    }

    fn enter_show<D: LedDevice>(&mut self, now: Seconds, rig: &mut Rig<D>) {
        rig.bus.lock();
        self.set_phase(Phase::Show {
            cursor: 0,
            next_at: now + self.config.interval,
            lit: false,
        });
    }

    fn set_phase(&mut self, next: Phase) {
        if let Drill::Replicate { phase, .. } = &mut self.drill {
            *phase = next;
        }
    }
}

impl<R: Rng> Engine for ComboEngine<R> {
    fn start<D: LedDevice>(&mut self, now: Seconds, rig: &mut Rig<D>) -> Result<()> {
        self.started_at = now;
        rig.leds.cancel_all();
        rig.leds.clear_all();
        info!(tier = self.config.tier, "combo session start");

        match &mut self.drill {
            Drill::Reactive {
                target,
                target_since,
                ..
            } => {
                *target_since = now;
                // Opening target is blue; every later one is yellow.
                rig.leds.set_pad(*target, BLUE);
                rig.bus.unlock(now);
            }
            Drill::Replicate { .. } => self.enter_show(now, rig),
        }
        Ok(())
    }

    fn update<D: LedDevice>(
        &mut self,
        now: Seconds,
        event: Option<ButtonEvent>,
        rig: &mut Rig<D>,
    ) -> Result<Flow> {
        if self.config.time_limit.is_over(now - self.started_at) {
            return Ok(Flow::End(EndReason::TimeUp));
        }

        match self.drill {
            Drill::Reactive { .. } => {
                if let Some(ev) = event {
                    self.update_reactive(now, ev, rig);
                }
            }
            Drill::Replicate { .. } => self.update_replicate(now, event, rig),
        }

        if self.lives == 0 {
            return Ok(Flow::End(EndReason::OutOfLives));
        }
        Ok(Flow::Continue)
    }

    fn finish(self, now: Seconds, reason: EndReason) -> SessionResult {
        let elapsed = now - self.started_at;
        let summary = match self.drill {
            Drill::Reactive { reaction_times, .. } => ComboSummary {
                score: self.score,
                lives_left: self.lives,
                reaction_time_s: mean(&reaction_times),
                hits_per_sec: rate(self.score, elapsed),
                highest_streak: self.streak.highest(),
                longest_combo: usize::from(self.score > 0),
                completed: Vec::new(),
            },
            Drill::Replicate { completed, .. } => {
                let first_hits: Vec<Seconds> = completed.iter().map(|c| c.first_hit_s).collect();
                let (punches, time) = completed
                    .iter()
                    .filter(|c| c.total_time_s > 0.0)
                    .fold((0usize, 0.0), |(n, t), c| (n + c.sequence.len(), t + c.total_time_s));
                ComboSummary {
                    score: self.score,
                    lives_left: self.lives,
                    reaction_time_s: mean(&first_hits),
                    hits_per_sec: if time > 0.0 { punches as f64 / time } else { 0.0 },
                    highest_streak: self.streak.highest(),
                    longest_combo: completed.iter().map(|c| c.sequence.len()).max().unwrap_or(0),
                    completed,
                }
            }
        };

        SessionResult {
            mode: SessionMode::Combo,
            tier: self.config.tier,
            ended_by: reason,
            elapsed_s: elapsed,
            summary: Summary::Combo(summary),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::led::color::Color;
    use crate::led::MemoryStrip;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pad(id: u8) -> PadId {
        PadId::new(id).unwrap()
    }

    fn press(id: u8, t: Seconds) -> Option<ButtonEvent> {
        Some(ButtonEvent::press(pad(id), t))
    }

    fn shows(rig: &Rig<MemoryStrip>, id: u8, color: Color) -> bool {
        rig.leds.pad_pixels(pad(id)).iter().all(|c| *c == color)
    }

    fn step(
        engine: &mut ComboEngine<StdRng>,
        rig: &mut Rig<MemoryStrip>,
        now: Seconds,
        event: Option<ButtonEvent>,
    ) -> Flow {
        rig.leds.tick(now);
        engine.update(now, event, rig).unwrap()
    }

    /// Advances in small steps until the replicate phase opens.
    fn advance_to_hit(engine: &mut ComboEngine<StdRng>, rig: &mut Rig<MemoryStrip>) -> Seconds {
        let mut now = 0.0;
        while !matches!(engine.phase(), Some(Phase::Hit { .. })) {
            now += 0.05;
            assert!(now < 10.0, "replicate phase never opened");
            step(engine, rig, now, None);
        }
        now
    }

    #[test]
    fn reactive_wrong_presses_end_session_when_lives_run_out() {
        let mut config = ComboConfig::for_tier(1, TimeLimit::Seconds(60.0));
        config.lives = 2;
        let mut engine = ComboEngine::new(config, StdRng::seed_from_u64(7));
        let mut rig = Rig::new(MemoryStrip::new(80));
        engine.start(0.0, &mut rig).unwrap();

        let target = engine.target().unwrap();
        let wrong = pick_other_pad(&mut StdRng::seed_from_u64(1), target);

        let flow = step(&mut engine, &mut rig, 1.0, Some(ButtonEvent::press(wrong, 1.0)));
        assert_eq!(flow, Flow::Continue);
        assert_eq!(engine.lives(), 1);
        assert!(shows(&rig, wrong.get(), RED));

        let flow = step(&mut engine, &mut rig, 1.5, Some(ButtonEvent::press(wrong, 1.5)));
        assert_eq!(flow, Flow::End(EndReason::OutOfLives));

        let result = engine.finish(1.5, EndReason::OutOfLives);
        match result.summary {
            Summary::Combo(s) => {
                assert_eq!(s.score, 0);
                assert_eq!(s.lives_left, 0);
                assert_eq!(s.highest_streak, 0);
                assert_eq!(s.reaction_time_s, None);
            }
            other => panic!("unexpected summary {other:?}"),
        }
    }

    #[test]
    fn reactive_hit_moves_target_and_flashes_previous_green() {
        let config = ComboConfig::for_tier(1, TimeLimit::Endless);
        let mut engine = ComboEngine::new(config, StdRng::seed_from_u64(11));
        let mut rig = Rig::new(MemoryStrip::new(80));
        engine.start(0.0, &mut rig).unwrap();

        let first = engine.target().unwrap();
        assert!(shows(&rig, first.get(), BLUE));

        step(&mut engine, &mut rig, 0.4, Some(ButtonEvent::press(first, 0.4)));
        let second = engine.target().unwrap();
        assert_ne!(first, second);
        assert!(shows(&rig, first.get(), GREEN));
        assert!(shows(&rig, second.get(), TARGET_YELLOW));

        step(&mut engine, &mut rig, 1.5, None);
        assert!(shows(&rig, first.get(), OFF));
        assert!(shows(&rig, second.get(), TARGET_YELLOW));

        let result = engine.finish(2.0, EndReason::Interrupted);
        match result.summary {
            Summary::Combo(s) => {
                assert_eq!(s.score, 1);
                assert_abs_diff_eq!(s.reaction_time_s.unwrap(), 0.4, epsilon = 1e-9);
            }
            other => panic!("unexpected summary {other:?}"),
        }
    }

    #[test]
    fn next_target_is_never_the_previous_one() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut previous = pad(4);
        for _ in 0..500 {
            let next = pick_other_pad(&mut rng, previous);
            assert_ne!(next, previous);
            previous = next;
        }
    }

    #[test]
    fn preview_locks_input_until_replicate_phase() {
        let config = ComboConfig::for_tier(2, TimeLimit::Endless);
        let mut engine = ComboEngine::new(config, StdRng::seed_from_u64(5));
        engine.set_sequence(vec![pad(2), pad(3)]);
        let mut rig = Rig::new(MemoryStrip::new(80));
        engine.start(0.0, &mut rig).unwrap();
        assert!(rig.bus.is_locked());

        step(&mut engine, &mut rig, 0.6, None);
        assert!(shows(&rig, 2, BLUE));
        assert!(rig.bus.is_locked());

        let opened = advance_to_hit(&mut engine, &mut rig);
        assert!(!rig.bus.is_locked());
        assert_eq!(rig.bus.unlock_time(), opened);
        assert!(rig.bus.accepts(opened + 0.01));
        assert!(!rig.bus.accepts(opened));
    }

    #[test]
    fn tier_two_prehighlights_next_pad_and_records_sequence() {
        let config = ComboConfig::for_tier(2, TimeLimit::Endless);
        let mut engine = ComboEngine::new(config, StdRng::seed_from_u64(5));
        engine.set_sequence(vec![pad(2), pad(3)]);
        let mut rig = Rig::new(MemoryStrip::new(80));
        engine.start(0.0, &mut rig).unwrap();

        let opened = advance_to_hit(&mut engine, &mut rig);
        assert!(shows(&rig, 2, TARGET_YELLOW));
        assert!(shows(&rig, 3, OFF));

        step(&mut engine, &mut rig, opened + 0.1, press(2, opened + 0.1));
        assert!(shows(&rig, 2, GREEN));
        assert!(shows(&rig, 3, TARGET_YELLOW));

        step(&mut engine, &mut rig, opened + 0.3, press(3, opened + 0.3));
        assert!(matches!(engine.phase(), Some(Phase::Celebrate { .. })));
        assert!(rig.bus.is_locked());
        for id in 1..=8 {
            assert!(shows(&rig, id, GREEN), "pad {id} not green while celebrating");
        }

        step(&mut engine, &mut rig, opened + 0.9, None);
        assert!(matches!(engine.phase(), Some(Phase::Show { .. })));
        for id in 1..=8 {
            assert!(shows(&rig, id, OFF));
        }

        let result = engine.finish(opened + 1.0, EndReason::TimeUp);
        match result.summary {
            Summary::Combo(s) => {
                assert_eq!(s.score, 2);
                assert_eq!(s.longest_combo, 2);
                assert_eq!(s.completed.len(), 1);
                assert_abs_diff_eq!(s.completed[0].first_hit_s, 0.1, epsilon = 1e-9);
                assert_abs_diff_eq!(s.completed[0].total_time_s, 0.3, epsilon = 1e-9);
                assert_abs_diff_eq!(s.hits_per_sec, 2.0 / 0.3, epsilon = 1e-6);
            }
            other => panic!("unexpected summary {other:?}"),
        }
    }

    #[test]
    fn repeated_pad_keeps_target_color_under_flash() {
        let config = ComboConfig::for_tier(2, TimeLimit::Endless);
        let mut engine = ComboEngine::new(config, StdRng::seed_from_u64(9));
        engine.set_sequence(vec![pad(2), pad(2), pad(3)]);
        let mut rig = Rig::new(MemoryStrip::new(80));
        engine.start(0.0, &mut rig).unwrap();

        let opened = advance_to_hit(&mut engine, &mut rig);
        step(&mut engine, &mut rig, opened + 0.1, press(2, opened + 0.1));
        step(&mut engine, &mut rig, opened + 0.7, None);
        assert!(shows(&rig, 2, TARGET_YELLOW));
    }

    #[test]
    fn top_tier_wrong_press_restarts_sequence() {
        let config = ComboConfig::for_tier(4, TimeLimit::Endless);
        let mut engine = ComboEngine::new(config, StdRng::seed_from_u64(13));
        engine.set_sequence(vec![pad(1), pad(2), pad(5)]);
        let mut rig = Rig::new(MemoryStrip::new(80));
        engine.start(0.0, &mut rig).unwrap();

        let opened = advance_to_hit(&mut engine, &mut rig);
        // No assist on the top tier.
        assert!(shows(&rig, 1, OFF));

        step(&mut engine, &mut rig, opened + 0.1, press(1, opened + 0.1));
        step(&mut engine, &mut rig, opened + 0.2, press(7, opened + 0.2));
        assert_eq!(engine.lives(), DEFAULT_LIVES - 1);
        assert_eq!(engine.streak().current(), 0);
        assert!(matches!(engine.phase(), Some(Phase::Hit { index: 0, .. })));
    }

    #[test]
    fn middle_tier_wrong_press_keeps_position() {
        let config = ComboConfig::for_tier(3, TimeLimit::Endless);
        let mut engine = ComboEngine::new(config, StdRng::seed_from_u64(13));
        engine.set_sequence(vec![pad(1), pad(2), pad(5)]);
        let mut rig = Rig::new(MemoryStrip::new(80));
        engine.start(0.0, &mut rig).unwrap();

        let opened = advance_to_hit(&mut engine, &mut rig);
        step(&mut engine, &mut rig, opened + 0.1, press(1, opened + 0.1));
        step(&mut engine, &mut rig, opened + 0.2, press(7, opened + 0.2));
        assert!(matches!(engine.phase(), Some(Phase::Hit { index: 1, .. })));
    }

    #[test]
    fn time_limit_ends_session() {
        let config = ComboConfig::for_tier(3, TimeLimit::Seconds(2.0));
        let mut engine = ComboEngine::new(config, StdRng::seed_from_u64(1));
        let mut rig = Rig::new(MemoryStrip::new(80));
        engine.start(10.0, &mut rig).unwrap();

        assert_eq!(step(&mut engine, &mut rig, 11.9, None), Flow::Continue);
        assert_eq!(
            step(&mut engine, &mut rig, 12.0, None),
            Flow::End(EndReason::TimeUp)
        );
    }

    #[test]
    fn catalog_entries_are_valid_pads() {
        for i in 0..COMBO_CATALOG.len() {
            let seq = catalog_sequence(i);
            assert_eq!(seq.len(), COMBO_CATALOG[i].len());
            assert!(seq.len() >= 2);
        }
    }
}
