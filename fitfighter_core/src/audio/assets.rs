use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};

/// Decoded song, stereo interleaved `f32`.
#[derive(Debug, Clone)]
pub struct AudioClip {
    data: Arc<Vec<f32>>,
    sample_rate: u32,
}

impl AudioClip {
    pub fn new(data: Vec<f32>, sample_rate: u32) -> Result<Self> {
        if data.len() % 2 != 0 {
            bail!("Audio data length must be even (Stereo Interleaved)");
        }
        if sample_rate == 0 {
            bail!("Sample rate must be positive");
        }
        Ok(Self {
            data: Arc::new(data),
            sample_rate,
        })
    }

    /// Decodes a WAV file; mono input is duplicated to both channels.
    pub fn load_wav(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = hound::WavReader::open(path)
            .with_context(|| format!("failed to open wav: {}", path.display()))?;
        let spec = reader.spec();

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<std::result::Result<_, _>>()
                .context("failed to decode float samples")?,
            hound::SampleFormat::Int => {
                let scale = (1_i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<std::result::Result<_, _>>()
                    .context("failed to decode int samples")?
            }
        };

        let data = match spec.channels {
            1 => samples.iter().flat_map(|s| [*s, *s]).collect(),
            2 => samples,
            n => bail!("unsupported channel count: {n}"),
        };
        Self::new(data, spec.sample_rate)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn frame_count(&self) -> usize {
        self.data.len() / 2
    }

    pub fn duration(&self) -> f64 {
        self.frame_count() as f64 / self.sample_rate as f64
    }

    pub fn data(&self) -> &Arc<Vec<f32>> {
        &self.data
    }
}

/// Reads only the WAV header to get the song length.
pub fn wav_duration(path: impl AsRef<Path>) -> Result<f64> {
    let path = path.as_ref();
    let reader = hound::WavReader::open(path)
        .with_context(|| format!("failed to open wav: {}", path.display()))?;
    let spec = reader.spec();
    if spec.sample_rate == 0 {
        bail!("wav reports zero sample rate: {}", path.display());
    }
    Ok(reader.duration() as f64 / spec.sample_rate as f64)
}
