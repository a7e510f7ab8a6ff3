//! Rhythm mode: beatmap notes approach along each pad's segment and are
//! judged against the song clock of an external audio player.

use rig_schema::{Beatmap, EndReason, RhythmSummary, SessionMode, SessionResult, Summary};
use tracing::{debug, info, warn};

use super::judge::{JudgeMachine, JudgeWindows, Judgment, PressOutcome, RhythmNote, LAYERS};
use super::{mean, rate};
use crate::audio::AudioPlayer;
use crate::input::events::ButtonEvent;
use crate::led::color::{Color, CYAN, OFF, ORANGE, PINK, RED, SKY};
use crate::led::LedDevice;
use crate::session::{Engine, Flow, Rig};
use crate::time::timebase::{LockStatus, Timebase, TimebaseLock};
use crate::{PadId, Result, Seconds, SessionError};

const BASE_PALETTE: [Color; LAYERS] = [PINK, CYAN, PINK];
const COMBO_PALETTE: [Color; LAYERS] = [ORANGE, SKY, ORANGE];

#[derive(Debug, Clone, PartialEq)]
pub struct RhythmConfig {
    pub tier: u8,
    /// How long before its hit time a note starts to fill its pad.
    pub lead: Seconds,
    pub early_bias: Seconds,
    pub expire: Seconds,
    pub windows: JudgeWindows,
    pub judge_flash: Seconds,
    pub stray_flash: Seconds,
    pub settle: Seconds,
    pub lock_timeout: Seconds,
    /// Combo at which the note palette swaps.
    pub combo_swap: u32,
}

impl Default for RhythmConfig {
    fn default() -> Self {
        Self {
            tier: 1,
            lead: 1.00,
            early_bias: 0.012,
            expire: 0.250,
            windows: JudgeWindows::default(),
            judge_flash: 0.10,
            stray_flash: 0.08,
            settle: 0.20,
            lock_timeout: 5.0,
            combo_swap: 50,
        }
    }
}

impl RhythmConfig {
    pub fn for_tier(tier: u8) -> Self {
        Self {
            tier,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Stage {
    Idle,
    Locking(TimebaseLock),
    Playing(Timebase),
}

#[derive(Debug, Default, Clone)]
struct Tally {
    score: u32,
    perfect: u32,
    great: u32,
    good: u32,
    late: u32,
    miss: u32,
    combo: u32,
    max_combo: u32,
    latencies: Vec<Seconds>,
}

impl Tally {
    fn record(&mut self, judgment: Judgment, delta: Seconds) {
        match judgment {
            Judgment::Perfect => self.perfect += 1,
            Judgment::Great => self.great += 1,
            Judgment::Good => self.good += 1,
            Judgment::Late => self.late += 1,
            Judgment::Miss => self.miss += 1,
        }
        let points = judgment.points();
        self.score += points;
        if points > 0 {
            self.combo += 1;
            self.max_combo = self.max_combo.max(self.combo);
            self.latencies.push(delta.abs());
        } else {
            self.combo = 0;
        }
    }

    fn judged_hits(&self) -> u32 {
        self.perfect + self.great + self.good + self.late
    }
}

pub struct RhythmEngine<P: AudioPlayer> {
    config: RhythmConfig,
    player: P,
    notes: Vec<RhythmNote>,
    next_note: usize,
    judge: JudgeMachine,
    stage: Stage,
    started_at: Seconds,
    tally: Tally,
}

impl<P: AudioPlayer> RhythmEngine<P> {
    pub fn new(config: RhythmConfig, beatmap: &Beatmap, player: P) -> Self {
        let mut notes: Vec<RhythmNote> = beatmap
            .beats
            .iter()
            .map(|beat| RhythmNote::from_beat(beat, config.lead))
            .collect();
        notes.sort_by(|a, b| a.t_appear.total_cmp(&b.t_appear));

        Self {
            judge: JudgeMachine::new(config.windows, config.expire),
            config,
            player,
            notes,
            next_note: 0,
            stage: Stage::Idle,
            started_at: 0.0,
            tally: Tally::default(),
        }
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn total_beats(&self) -> usize {
        self.notes.len()
    }

    pub fn timebase(&self) -> Option<Timebase> {
        match self.stage {
            Stage::Playing(tb) => Some(tb),
            _ => None,
        }
    }

    pub fn score(&self) -> u32 {
        self.tally.score
    }

    pub fn combo(&self) -> u32 {
        self.tally.combo
    }

    /// Notes currently visible and unjudged.
    pub fn active_notes(&self) -> usize {
        self.judge.remaining()
    }

    fn palette(&self) -> &'static [Color; LAYERS] {
        if self.tally.combo >= self.config.combo_swap {
            &COMBO_PALETTE
        } else {
            &BASE_PALETTE
        }
    }

    fn admit_due(&mut self, song_now: Seconds) {
        while let Some(note) = self.notes.get(self.next_note) {
            if note.t_appear - self.config.early_bias > song_now {
                break;
            }
            let admitted = self.judge.admit(*note);
            debug!(
                beat = admitted.beat_index,
                pad = admitted.pad.get(),
                layer = admitted.layer,
                "note visible"
            );
            self.next_note += 1;
        }
    }

    fn press<D: LedDevice>(&mut self, ev: ButtonEvent, tb: Timebase, now: Seconds, rig: &mut Rig<D>) {
        let song_t = tb.song_time(ev.timestamp);
        match self.judge.process_press(ev.pad, song_t) {
            PressOutcome::Judged(result) => {
                self.tally.record(result.judgment, result.delta);
                rig.leds.flash(
                    ev.pad,
                    result.judgment.color(),
                    self.config.judge_flash,
                    Some(OFF),
                    now,
                );
                debug!(
                    beat = result.note.beat_index,
                    judgment = ?result.judgment,
                    delta = result.delta,
                    combo = self.tally.combo,
                    "judged"
                );
            }
            PressOutcome::Unjudged | PressOutcome::NoNote => {
                rig.leds.flash(ev.pad, RED, self.config.stray_flash, None, now);
            }
        }
    }

    fn render<D: LedDevice>(&self, song_now: Seconds, rig: &mut Rig<D>) {
        let palette = self.palette();
        for pad in PadId::all() {
            if rig.leds.is_flashing(pad) {
                continue;
            }
            rig.leds.set_pad(pad, OFF);
            // Oldest note last so it stays on top.
            for note in self.judge.lane(pad).rev() {
                rig.leds
                    .fill_pad_prefix(pad, palette[note.layer], note.progress(song_now));
            }
        }
    }

    fn play_frame<D: LedDevice>(
        &mut self,
        now: Seconds,
        event: Option<ButtonEvent>,
        tb: Timebase,
        rig: &mut Rig<D>,
    ) -> Flow {
        let state = self.player.state();
        if state.is_finished() {
            debug!(?state, "playback finished");
            return Flow::End(EndReason::PlaybackEnded);
        }

        let song_now = tb.song_time(now);
        self.admit_due(song_now);

        if let Some(ev) = event {
            self.press(ev, tb, now, rig);
        }

        for missed in self.judge.check_misses(song_now) {
            self.tally.record(Judgment::Miss, missed.delta);
            rig.leds
                .flash(missed.note.pad, RED, self.config.judge_flash, Some(OFF), now);
        }

        self.render(song_now, rig);
        Flow::Continue
    }
}

impl<P: AudioPlayer> Engine for RhythmEngine<P> {
    fn start<D: LedDevice>(&mut self, now: Seconds, rig: &mut Rig<D>) -> Result<()> {
        self.started_at = now;
        rig.bus.lock();
        rig.leds.cancel_all();
        rig.leds.clear_all();

        self.player.play()?;
        self.stage = Stage::Locking(TimebaseLock::new(
            now,
            self.config.settle,
            self.config.lock_timeout,
        ));
        info!(
            tier = self.config.tier,
            beats = self.notes.len(),
            "rhythm session start"
        );
        Ok(())
    }

    fn update<D: LedDevice>(
        &mut self,
        now: Seconds,
        event: Option<ButtonEvent>,
        rig: &mut Rig<D>,
    ) -> Result<Flow> {
        match self.stage {
            Stage::Idle => Ok(Flow::Continue),
            Stage::Locking(lock) => match lock.poll(now, &self.player) {
                LockStatus::Pending => Ok(Flow::Continue),
                LockStatus::Locked(tb) => {
                    info!(offset = tb.offset(), "timebase locked");
                    rig.bus.unlock(now);
                    self.stage = Stage::Playing(tb);
                    Ok(Flow::Continue)
                }
                LockStatus::Failed(reason) => {
                    warn!(%reason, "timebase lock failed");
                    Err(SessionError::TimebaseLock(reason))
                }
            },
            Stage::Playing(tb) => Ok(self.play_frame(now, event, tb, rig)),
        }
    }

    fn finish(mut self, now: Seconds, reason: EndReason) -> SessionResult {
        self.player.stop();

        for _ in self.judge.drain_remaining() {
            self.tally.miss += 1;
        }

        // A song that played out is timed by its length, anything cut short
        // by wall time.
        let elapsed = match (reason, self.player.duration()) {
            (EndReason::PlaybackEnded, Some(d)) if d > 0.0 => d,
            _ => now - self.started_at,
        };
        let total = self.notes.len();
        let accuracy = if total > 0 {
            self.tally.score as f64 / (total as f64 * Judgment::Perfect.points() as f64)
        } else {
            0.0
        };

        let tally = self.tally;
        SessionResult {
            mode: SessionMode::Rhythm,
            tier: self.config.tier,
            ended_by: reason,
            elapsed_s: elapsed,
            summary: Summary::Rhythm(RhythmSummary {
                score: tally.score,
                perfect: tally.perfect,
                great: tally.great,
                good: tally.good,
                late: tally.late,
                miss: tally.miss,
                max_combo: tally.max_combo,
                total_beats: total,
                mean_latency_s: mean(&tally.latencies),
                hits_per_sec: rate(tally.judged_hits(), elapsed),
                accuracy,
            }),
        }
    }

    fn abort(&mut self) {
        self.player.stop();
    }
}
