//! Friend-or-Foe: timed entities spawn on free pads; strike foes, spare
//! friends, and cash in bonus pads early for more points.

use rand::seq::SliceRandom;
use rand::Rng;
use rig_schema::{EndReason, FriendFoeSummary, SessionMode, SessionResult, Summary, PAD_COUNT};
use tracing::{debug, info};

use super::{mean, rate, TimeLimit, DEFAULT_LIVES};
use crate::input::events::ButtonEvent;
use crate::led::color::{Color, GREEN, HIT_YELLOW, OFF, PURPLE, RED};
use crate::led::LedDevice;
use crate::session::{Engine, Flow, Rig};
use crate::{PadId, Result, Seconds};

/// Extra points a bonus pad is worth when struck just before it expires.
pub const MAX_BONUS: u32 = 3;
/// Floor for any jittered duration.
pub const MIN_JITTERED: Seconds = 0.05;

const HIT_FLASH_S: Seconds = 0.20;
const FRIEND_HIT_FLASH_S: Seconds = 0.35;
const EMPTY_PAD_FLASH_S: Seconds = 0.20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl Difficulty {
    /// Maps levels 1..=4; anything outside is clamped.
    pub fn from_level(level: u8) -> Self {
        match level {
            0 | 1 => Difficulty::Beginner,
            2 => Difficulty::Intermediate,
            3 => Difficulty::Advanced,
            _ => Difficulty::Expert,
        }
    }

    pub fn level(self) -> u8 {
        match self {
            Difficulty::Beginner => 1,
            Difficulty::Intermediate => 2,
            Difficulty::Advanced => 3,
            Difficulty::Expert => 4,
        }
    }

    pub fn preset(self) -> FriendFoePreset {
        match self {
            Difficulty::Beginner => FriendFoePreset::BEGINNER,
            Difficulty::Intermediate => FriendFoePreset::INTERMEDIATE,
            Difficulty::Advanced => FriendFoePreset::ADVANCED,
            Difficulty::Expert => FriendFoePreset::EXPERT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FriendFoePreset {
    pub spawn_interval: Seconds,
    pub ttl: Seconds,
    pub max_active: usize,
    pub jitter: f64,
    pub friend_prob: f64,
    pub bonus_prob: f64,
    /// Share of friends that turn into foes part-way through their life.
    pub fake_flip_prob: f64,
    /// Flip point as a fraction of the jittered ttl.
    pub flip_at: (f64, f64),
    pub simultaneous: usize,
}

impl FriendFoePreset {
    pub const BEGINNER: Self = Self {
        spawn_interval: 1.35,
        ttl: 4.0,
        max_active: 1,
        jitter: 0.10,
        friend_prob: 0.50,
        bonus_prob: 0.0,
        fake_flip_prob: 0.0,
        flip_at: (0.50, 0.55),
        simultaneous: 1,
    };

    pub const INTERMEDIATE: Self = Self {
        spawn_interval: 1.00,
        ttl: 1.80,
        max_active: 3,
        jitter: 0.15,
        friend_prob: 0.40,
        bonus_prob: 0.15,
        fake_flip_prob: 0.0,
        flip_at: (0.50, 0.55),
        simultaneous: 1,
    };

    pub const ADVANCED: Self = Self {
        spawn_interval: 0.80,
        ttl: 1.30,
        max_active: 5,
        jitter: 0.20,
        friend_prob: 0.35,
        bonus_prob: 0.20,
        fake_flip_prob: 0.30,
        flip_at: (0.45, 0.55),
        simultaneous: 2,
    };

    pub const EXPERT: Self = Self {
        spawn_interval: 0.65,
        ttl: 1.00,
        max_active: 8,
        jitter: 0.30,
        friend_prob: 0.30,
        bonus_prob: 0.25,
        fake_flip_prob: 0.40,
        flip_at: (0.45, 0.55),
        simultaneous: 3,
    };
}

#[derive(Debug, Clone, PartialEq)]
pub struct FriendFoeConfig {
    pub difficulty: Difficulty,
    pub preset: FriendFoePreset,
    pub lives: u32,
    pub time_limit: TimeLimit,
}

impl FriendFoeConfig {
    pub fn for_level(level: u8, time_limit: TimeLimit) -> Self {
        let difficulty = Difficulty::from_level(level);
        Self {
            difficulty,
            preset: difficulty.preset(),
            lives: DEFAULT_LIVES,
            time_limit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Foe,
    Friend,
    /// Shows as a friend until `flip_at`, then becomes a foe for good.
    FlipFriend,
    BonusPad,
}

impl Role {
    pub fn color(self) -> Color {
        match self {
            Role::Foe => RED,
            Role::Friend | Role::FlipFriend => GREEN,
            Role::BonusPad => PURPLE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entity {
    pub pad: PadId,
    pub role: Role,
    pub spawned_at: Seconds,
    pub expires_at: Seconds,
    pub ttl: Seconds,
    pub flip_at: Option<Seconds>,
    pub flipped: bool,
    /// Start of the reaction-time measurement: spawn, or the flip.
    pub rt_start: Seconds,
}

impl Entity {
    pub fn new(pad: PadId, role: Role, now: Seconds, ttl: Seconds) -> Self {
        Self {
            pad,
            role,
            spawned_at: now,
            expires_at: now + ttl,
            ttl,
            flip_at: None,
            flipped: false,
            rt_start: now,
        }
    }

    /// Remaining share of the lifetime, clamped to 0..=1.
    pub fn remaining_fraction(&self, now: Seconds) -> f64 {
        if self.ttl <= 0.0 {
            return 0.0;
        }
        ((self.expires_at - now) / self.ttl).clamp(0.0, 1.0)
    }
}

pub fn jitter<R: Rng>(rng: &mut R, value: Seconds, fraction: f64) -> Seconds {
    let spread = value * fraction;
    let drawn = if spread > 0.0 {
        rng.gen_range((value - spread)..=(value + spread))
    } else {
        value
    };
    drawn.max(MIN_JITTERED)
}

/// Points for striking a bonus pad with `remaining` of its life left.
pub fn bonus_points(remaining: f64) -> u32 {
    let late = 1.0 - remaining.clamp(0.0, 1.0);
    1 + (MAX_BONUS as f64 * late).floor() as u32
}

fn draw_role<R: Rng>(rng: &mut R, preset: &FriendFoePreset) -> Role {
    let mut r: f64 = rng.gen();
    if r < preset.bonus_prob {
        return Role::BonusPad;
    }
    r -= preset.bonus_prob;
    if r < preset.friend_prob {
        if preset.fake_flip_prob > 0.0 && rng.gen::<f64>() < preset.fake_flip_prob {
            return Role::FlipFriend;
        }
        return Role::Friend;
    }
    Role::Foe
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Tally {
    score: u32,
    hits: u32,
    bonus_hits: u32,
    friend_spared: u32,
    friend_hit: u32,
    foe_missed: u32,
    foe_reactions: Vec<Seconds>,
}

pub struct FriendFoeEngine<R: Rng> {
    config: FriendFoeConfig,
    rng: R,
    started_at: Seconds,
    next_spawn_at: Seconds,
    lives: u32,
    entities: [Option<Entity>; PAD_COUNT],
    tally: Tally,
}

impl<R: Rng> FriendFoeEngine<R> {
    pub fn new(config: FriendFoeConfig, rng: R) -> Self {
        Self {
            lives: config.lives,
            config,
            rng,
            started_at: 0.0,
            next_spawn_at: 0.0,
            entities: [None; PAD_COUNT],
            tally: Tally::default(),
        }
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn score(&self) -> u32 {
        self.tally.score
    }

    pub fn active_count(&self) -> usize {
        self.entities.iter().flatten().count()
    }

    pub fn entity(&self, pad: PadId) -> Option<&Entity> {
        self.entities[pad.index()].as_ref()
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().flatten()
    }

    /// Places an entity directly, replacing whatever occupies the pad.
    pub fn insert(&mut self, entity: Entity) {
        self.entities[entity.pad.index()] = Some(entity);
    }

    /// Holds off spawning until `at`.
    pub fn defer_spawn(&mut self, at: Seconds) {
        self.next_spawn_at = at;
    }

    fn flip_due(&mut self, now: Seconds) {
        for entity in self.entities.iter_mut().flatten() {
            if entity.role != Role::FlipFriend || entity.flipped {
                continue;
            }
            if entity.flip_at.is_some_and(|at| now >= at) {
                entity.role = Role::Foe;
                entity.flipped = true;
                entity.rt_start = now;
                debug!(pad = entity.pad.get(), "friend flipped to foe");
            }
        }
    }

    fn expire_due<D: LedDevice>(&mut self, now: Seconds, rig: &mut Rig<D>) {
        for slot in self.entities.iter_mut() {
            let Some(entity) = slot.filter(|e| now >= e.expires_at) else {
                continue;
            };
            match entity.role {
                Role::Foe => {
                    self.lives = self.lives.saturating_sub(1);
                    self.tally.foe_missed += 1;
                }
                Role::Friend | Role::FlipFriend => {
                    self.tally.score += 1;
                    self.tally.friend_spared += 1;
                }
                Role::BonusPad => {}
            }
            debug!(pad = entity.pad.get(), role = ?entity.role, "entity expired");
            *slot = None;
            if !rig.leds.is_flashing(entity.pad) {
                rig.leds.set_pad(entity.pad, OFF);
            }
        }
    }

    fn spawn_due(&mut self, now: Seconds) {
        let preset = self.config.preset;
        let active = self.active_count();
        if now < self.next_spawn_at || active >= preset.max_active {
            return;
        }

        let wanted = preset.simultaneous.min(preset.max_active - active);
        for _ in 0..wanted {
            let free: Vec<PadId> = PadId::all()
                .filter(|p| self.entities[p.index()].is_none())
                .collect();
            let Some(pad) = free.choose(&mut self.rng).copied() else {
                break;
            };
            let role = draw_role(&mut self.rng, &preset);
            let ttl = jitter(&mut self.rng, preset.ttl, preset.jitter);
            let mut entity = Entity::new(pad, role, now, ttl);
            if role == Role::FlipFriend {
                let (lo, hi) = preset.flip_at;
                let at = now + ttl * self.rng.gen_range(lo..=hi);
                entity.flip_at = Some(at);
                entity.rt_start = at;
            }
            debug!(pad = pad.get(), ?role, ttl, "spawned");
            self.entities[pad.index()] = Some(entity);
        }
        self.next_spawn_at = now + jitter(&mut self.rng, preset.spawn_interval, preset.jitter);
    }

    fn strike<D: LedDevice>(&mut self, event: ButtonEvent, now: Seconds, rig: &mut Rig<D>) {
        let pad = event.pad;
        let Some(entity) = self.entities[pad.index()].take() else {
            rig.leds.flash(pad, RED, EMPTY_PAD_FLASH_S, None, now);
            return;
        };

        match entity.role {
            Role::Foe => {
                self.tally.foe_reactions.push((event.timestamp - entity.rt_start).max(0.0));
                self.tally.score += 1;
                self.tally.hits += 1;
                rig.leds.flash(pad, HIT_YELLOW, HIT_FLASH_S, Some(OFF), now);
            }
            Role::Friend | Role::FlipFriend => {
                self.lives = self.lives.saturating_sub(1);
                self.tally.friend_hit += 1;
                rig.leds.flash(pad, RED, FRIEND_HIT_FLASH_S, Some(OFF), now);
            }
            Role::BonusPad => {
                let points = bonus_points(entity.remaining_fraction(now));
                self.tally.score += points;
                self.tally.bonus_hits += 1;
                self.tally.hits += 1;
                rig.leds.flash(pad, HIT_YELLOW, HIT_FLASH_S, Some(OFF), now);
                debug!(pad = pad.get(), points, "bonus pad struck");
            }
        }
    }

    fn render<D: LedDevice>(&self, now: Seconds, rig: &mut Rig<D>) {
        for entity in self.entities.iter().flatten() {
            if rig.leds.is_flashing(entity.pad) {
                continue;
            }
            rig.leds
                .set_pad_progress(entity.pad, entity.role.color(), entity.remaining_fraction(now));
        }
    }
}

impl<R: Rng> Engine for FriendFoeEngine<R> {
    fn start<D: LedDevice>(&mut self, now: Seconds, rig: &mut Rig<D>) -> Result<()> {
        self.started_at = now;
        self.next_spawn_at = self.next_spawn_at.max(now);
        rig.leds.cancel_all();
        rig.leds.clear_all();
        rig.bus.unlock(now);
        info!(
            level = self.config.difficulty.level(),
            "friend-or-foe session start"
        );
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

        self.flip_due(now);
        self.expire_due(now, rig);
        self.spawn_due(now);
        if let Some(ev) = event {
            self.strike(ev, now, rig);
        }
        self.render(now, rig);

        if self.lives == 0 {
            return Ok(Flow::End(EndReason::OutOfLives));
        }
        Ok(Flow::Continue)
    }

    fn finish(self, now: Seconds, reason: EndReason) -> SessionResult {
        let elapsed = now - self.started_at;
        let tally = self.tally;
        SessionResult {
            mode: SessionMode::FriendFoe,
            tier: self.config.difficulty.level(),
            ended_by: reason,
            elapsed_s: elapsed,
            summary: Summary::FriendFoe(FriendFoeSummary {
                score: tally.score,
                lives_left: self.lives,
                hits: tally.hits,
                bonus_hits: tally.bonus_hits,
                friend_spared: tally.friend_spared,
                friend_hit: tally.friend_hit,
                foe_missed: tally.foe_missed,
                foe_reaction_s: mean(&tally.foe_reactions),
                hits_per_sec: rate(tally.hits, elapsed),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::led::MemoryStrip;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pad(id: u8) -> PadId {
        PadId::new(id).unwrap()
    }

    fn engine(level: u8, seed: u64) -> FriendFoeEngine<StdRng> {
        FriendFoeEngine::new(
            FriendFoeConfig::for_level(level, TimeLimit::Seconds(60.0)),
            StdRng::seed_from_u64(seed),
        )
    }

    fn step(
        engine: &mut FriendFoeEngine<StdRng>,
        rig: &mut Rig<MemoryStrip>,
        now: Seconds,
        event: Option<ButtonEvent>,
    ) -> Flow {
        rig.leds.tick(now);
        engine.update(now, event, rig).unwrap()
    }

    #[test]
    fn bonus_points_grow_as_the_pad_ages() {
        assert_eq!(bonus_points(1.0), 1);
        assert_eq!(bonus_points(0.9), 1);
        assert_eq!(bonus_points(0.5), 2);
        assert_eq!(bonus_points(0.2), 3);
        assert_eq!(bonus_points(0.0), 4);
    }

    #[test]
    fn jitter_stays_within_band_and_floor() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..200 {
            let v = jitter(&mut rng, 1.0, 0.3);
            assert!((0.7..=1.3).contains(&v));
        }
        assert_eq!(jitter(&mut rng, 0.01, 0.1), MIN_JITTERED);
    }

    #[test]
    fn levels_clamp_to_known_presets() {
        assert_eq!(Difficulty::from_level(0), Difficulty::Beginner);
        assert_eq!(Difficulty::from_level(9), Difficulty::Expert);
        assert_eq!(Difficulty::from_level(3).preset(), FriendFoePreset::ADVANCED);
    }

    #[test]
    fn beginner_expired_foe_costs_a_life() {
        let mut engine = engine(1, 1);
        let mut rig = Rig::new(MemoryStrip::new(80));
        engine.start(0.0, &mut rig).unwrap();
        engine.defer_spawn(100.0);
        engine.insert(Entity::new(pad(4), Role::Foe, 0.0, 4.0));

        assert_eq!(step(&mut engine, &mut rig, 2.0, None), Flow::Continue);
        assert!(engine.entity(pad(4)).is_some());
        // Half the ttl left, so half the segment is lit.
        let lit = rig.leds.pad_pixels(pad(4)).iter().filter(|c| **c == RED).count();
        assert_eq!(lit, 5);

        step(&mut engine, &mut rig, 4.1, None);
        assert_eq!(engine.lives(), DEFAULT_LIVES - 1);
        assert!(engine.entity(pad(4)).is_none());
        assert!(rig.leds.pad_pixels(pad(4)).iter().all(|c| c.is_off()));

        let result = engine.finish(4.1, EndReason::Interrupted);
        match result.summary {
            Summary::FriendFoe(s) => {
                assert_eq!(s.foe_missed, 1);
                assert_eq!(s.score, 0);
            }
            other => panic!("unexpected summary {other:?}"),
        }
    }

    #[test]
    fn spared_friend_scores_and_struck_friend_costs_life() {
        let mut engine = engine(2, 4);
        let mut rig = Rig::new(MemoryStrip::new(80));
        engine.start(0.0, &mut rig).unwrap();
        engine.defer_spawn(100.0);
        engine.insert(Entity::new(pad(1), Role::Friend, 0.0, 1.0));
        engine.insert(Entity::new(pad(2), Role::Friend, 0.0, 5.0));

        step(&mut engine, &mut rig, 0.5, Some(ButtonEvent::press(pad(2), 0.5)));
        assert_eq!(engine.lives(), DEFAULT_LIVES - 1);
        assert!(rig.leds.pad_pixels(pad(2)).iter().all(|c| *c == RED));

        step(&mut engine, &mut rig, 1.2, None);
        assert_eq!(engine.score(), 1);
        assert_eq!(engine.active_count(), 0);
    }

    #[test]
    fn foe_hit_records_reaction_time() {
        let mut engine = engine(2, 5);
        let mut rig = Rig::new(MemoryStrip::new(80));
        engine.start(0.0, &mut rig).unwrap();
        engine.defer_spawn(100.0);
        engine.insert(Entity::new(pad(6), Role::Foe, 1.0, 2.0));

        step(&mut engine, &mut rig, 1.45, Some(ButtonEvent::press(pad(6), 1.4)));
        assert!(rig.leds.pad_pixels(pad(6)).iter().all(|c| *c == HIT_YELLOW));
        step(&mut engine, &mut rig, 1.7, None);
        assert!(rig.leds.pad_pixels(pad(6)).iter().all(|c| c.is_off()));

        let result = engine.finish(2.0, EndReason::TimeUp);
        match result.summary {
            Summary::FriendFoe(s) => {
                assert_eq!(s.hits, 1);
                assert_abs_diff_eq!(s.foe_reaction_s.unwrap(), 0.4, epsilon = 1e-9);
            }
            other => panic!("unexpected summary {other:?}"),
        }
    }

    #[test]
    fn flipped_friend_is_scored_as_foe() {
        let mut engine = engine(3, 6);
        let mut rig = Rig::new(MemoryStrip::new(80));
        engine.start(0.0, &mut rig).unwrap();
        engine.defer_spawn(100.0);
        let mut entity = Entity::new(pad(3), Role::FlipFriend, 0.0, 2.0);
        entity.flip_at = Some(1.0);
        entity.rt_start = 1.0;
        engine.insert(entity);

        step(&mut engine, &mut rig, 1.1, None);
        let flipped = engine.entity(pad(3)).unwrap();
        assert_eq!(flipped.role, Role::Foe);
        assert!(flipped.flipped);

        step(&mut engine, &mut rig, 1.3, Some(ButtonEvent::press(pad(3), 1.3)));
        assert_eq!(engine.score(), 1);
        assert_eq!(engine.lives(), DEFAULT_LIVES);
    }

    #[test]
    fn bonus_pad_scores_by_age_and_expires_silently() {
        let mut engine = engine(4, 7);
        let mut rig = Rig::new(MemoryStrip::new(80));
        engine.start(0.0, &mut rig).unwrap();
        engine.defer_spawn(100.0);
        engine.insert(Entity::new(pad(7), Role::BonusPad, 0.0, 1.0));
        engine.insert(Entity::new(pad(8), Role::BonusPad, 0.0, 1.0));

        step(&mut engine, &mut rig, 0.8, Some(ButtonEvent::press(pad(7), 0.8)));
        assert_eq!(engine.score(), 3);

        step(&mut engine, &mut rig, 1.5, None);
        assert_eq!(engine.score(), 3);
        assert_eq!(engine.lives(), DEFAULT_LIVES);
    }

    #[test]
    fn unoccupied_pad_only_flashes() {
        let mut engine = engine(1, 8);
        let mut rig = Rig::new(MemoryStrip::new(80));
        engine.start(0.0, &mut rig).unwrap();
        engine.defer_spawn(100.0);

        step(&mut engine, &mut rig, 0.5, Some(ButtonEvent::press(pad(5), 0.5)));
        assert_eq!(engine.lives(), DEFAULT_LIVES);
        assert_eq!(engine.score(), 0);
        assert!(rig.leds.is_flashing(pad(5)));
    }

    #[test]
    fn active_entities_never_exceed_preset_max() {
        for level in 1..=4 {
            let mut engine = engine(level, level as u64 * 31);
            let max = engine.config.preset.max_active;
            let mut rig = Rig::new(MemoryStrip::new(80));
            engine.start(0.0, &mut rig).unwrap();

            let mut now = 0.0;
            while now < 30.0 {
                now += 0.01;
                if step(&mut engine, &mut rig, now, None) != Flow::Continue {
                    break;
                }
                assert!(engine.active_count() <= max, "level {level} exceeded max");
                let preset = engine.config.preset;
                let (lo, hi) = (
                    preset.ttl * (1.0 - preset.jitter),
                    preset.ttl * (1.0 + preset.jitter),
                );
                for e in engine.entities() {
                    assert!(e.ttl >= MIN_JITTERED);
                    assert!(
                        e.ttl >= lo - 1e-9 && e.ttl <= hi + 1e-9,
                        "level {level} ttl {} outside [{lo}, {hi}]",
                        e.ttl
                    );
                }
            }
        }
    }

    #[test]
    fn full_board_spawns_as_soon_as_a_slot_frees() {
        let mut engine = engine(1, 9);
        let mut rig = Rig::new(MemoryStrip::new(80));
        engine.start(0.0, &mut rig).unwrap();
        engine.insert(Entity::new(pad(1), Role::Friend, 0.0, 3.0));

        // Spawn time passes while the single slot is taken.
        step(&mut engine, &mut rig, 2.0, None);
        assert_eq!(engine.active_count(), 1);
        assert_eq!(engine.entity(pad(1)).unwrap().role, Role::Friend);

        step(&mut engine, &mut rig, 3.0, None);
        assert_eq!(engine.score(), 1);
        assert_eq!(engine.active_count(), 1);
        assert_eq!(engine.entities().next().unwrap().spawned_at, 3.0);
    }
}
