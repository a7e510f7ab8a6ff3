use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{OutputCallbackInfo, Stream, StreamConfig};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::error;

use super::{AudioClip, AudioPlayer, PlayerState};
use crate::{Result, Seconds, SessionError};

/// Plays one clip on the default output device. The position is derived from
/// the number of frames handed to the device.
pub struct StreamPlayer {
    clip: AudioClip,
    stream: Option<Stream>,
    frames_played: Arc<AtomicU64>,
    failed: Arc<AtomicBool>,
    stopped: bool,
}

impl StreamPlayer {
    pub fn new(clip: AudioClip) -> Self {
        Self {
            clip,
            stream: None,
            frames_played: Arc::new(AtomicU64::new(0)),
            failed: Arc::new(AtomicBool::new(false)),
            stopped: false,
        }
    }

    fn build_stream(&self) -> anyhow::Result<Stream> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| anyhow::anyhow!("No default output device available"))?;

        let config = StreamConfig {
            channels: 2,
            sample_rate: cpal::SampleRate(self.clip.sample_rate()),
            buffer_size: cpal::BufferSize::Default,
        };

        let clip = self.clip.data().clone();
        let frames_played = self.frames_played.clone();
        let failed = self.failed.clone();

        let stream = device.build_output_stream(
            &config,
            move |data: &mut [f32], _: &OutputCallbackInfo| {
                let start = frames_played.load(Ordering::Acquire) as usize * 2;
                for (i, sample) in data.iter_mut().enumerate() {
                    *sample = clip.get(start + i).copied().unwrap_or(0.0);
                }
                let written_frames = (data.len() / 2) as u64;
                frames_played.fetch_add(written_frames, Ordering::Release);
            },
            move |err| {
                error!("audio output error: {err}");
                failed.store(true, Ordering::Release);
            },
            None,
        )?;

        stream.play()?;
        Ok(stream)
    }
}

impl AudioPlayer for StreamPlayer {
    fn play(&mut self) -> Result<()> {
        let stream = self
            .build_stream()
            .map_err(|e| SessionError::Audio(format!("{e:#}")))?;
        self.stream = Some(stream);
        self.stopped = false;
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(stream) = self.stream.take() {
            let _ = stream.pause();
            self.stopped = true;
        }
    }

    fn position(&self) -> Option<Seconds> {
        self.stream.as_ref()?;
        let frames = self.frames_played.load(Ordering::Acquire);
        Some((frames as f64 / self.clip.sample_rate() as f64).min(self.clip.duration()))
    }

    fn duration(&self) -> Option<Seconds> {
        Some(self.clip.duration())
    }

    fn state(&self) -> PlayerState {
        if self.failed.load(Ordering::Acquire) {
            PlayerState::Error
        } else if self.stopped {
            PlayerState::Stopped
        } else if self.stream.is_none() {
            PlayerState::Idle
        } else if self.frames_played.load(Ordering::Acquire) as usize >= self.clip.frame_count() {
            PlayerState::Ended
        } else {
            PlayerState::Playing
        }
    }
}
