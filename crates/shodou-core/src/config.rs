//! Rig configuration
//!
//! Describes the sequencer set, note mapping and output settings of one
//! installation. Stored as RON or JSON, chosen by file extension.

use crate::engine::BlobSequencingEngine;
use crate::error::{CoreError, Result};
use crate::logging::LogConfig;
use crate::note::{LengthScaling, NoteMapping};
use crate::sequencer::{OrdinalSequencer, RandomSequencer, Rgba, Sequencer, VerticalSequencer};
use crate::sink::{AnimationSink, NoteSink};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// Tempo factor of the reference rig
pub const REFERENCE_TEMPO: f32 = 1.8;

/// Port opened when none is configured
pub const DEFAULT_MIDI_PORT: &str = "IAC Driver buss 1";

/// One sequencer of the rig
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SequencerConfig {
    /// Scan line
    Vertical {
        /// Seconds per sweep
        loop_time: f32,
        /// 1-based output channel
        channel: u8,
        /// Visual color
        #[serde(default)]
        color: Rgba,
        /// Let interior contours fire (default off)
        #[serde(default)]
        include_holes: Option<bool>,
    },
    /// Index order walk
    Ordinal {
        /// Wait between fires
        max_duration_to_next: f32,
        /// Start over after the last blob instead of stopping
        looping: bool,
        /// 1-based output channel
        channel: u8,
        /// Visual color
        #[serde(default)]
        color: Rgba,
        /// Let interior contours fire (default on)
        #[serde(default)]
        include_holes: Option<bool>,
    },
    /// Random walk
    Random {
        /// Wait between fires
        max_duration_to_next: f32,
        /// 1-based output channel
        channel: u8,
        /// Visual color
        #[serde(default)]
        color: Rgba,
        /// Let interior contours fire (default on)
        #[serde(default)]
        include_holes: Option<bool>,
    },
}

impl SequencerConfig {
    /// Output channel
    pub fn channel(&self) -> u8 {
        match self {
            SequencerConfig::Vertical { channel, .. }
            | SequencerConfig::Ordinal { channel, .. }
            | SequencerConfig::Random { channel, .. } => *channel,
        }
    }

    /// Loop or wait time in seconds
    pub fn time(&self) -> f32 {
        match self {
            SequencerConfig::Vertical { loop_time, .. } => *loop_time,
            SequencerConfig::Ordinal {
                max_duration_to_next,
                ..
            }
            | SequencerConfig::Random {
                max_duration_to_next,
                ..
            } => *max_duration_to_next,
        }
    }

    /// Build the sequencer; `seed` only applies to random walks
    pub fn build(&self, scan_height: f32, seed: Option<u64>) -> Sequencer {
        match *self {
            SequencerConfig::Vertical {
                loop_time,
                channel,
                color,
                include_holes,
            } => VerticalSequencer::new(loop_time, channel, color)
                .with_scan_height(scan_height)
                .with_holes(include_holes.unwrap_or(false))
                .into(),
            SequencerConfig::Ordinal {
                max_duration_to_next,
                looping,
                channel,
                color,
                include_holes,
            } => OrdinalSequencer::new(max_duration_to_next, looping, channel, color)
                .with_holes(include_holes.unwrap_or(true))
                .into(),
            SequencerConfig::Random {
                max_duration_to_next,
                channel,
                color,
                include_holes,
            } => {
                let seq = match seed {
                    Some(seed) => {
                        RandomSequencer::with_seed(max_duration_to_next, channel, color, seed)
                    }
                    None => RandomSequencer::new(max_duration_to_next, channel, color),
                };
                seq.with_holes(include_holes.unwrap_or(true)).into()
            }
        }
    }
}

/// Installation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigConfig {
    /// Sequencers in index order
    #[serde(default = "default_sequencers")]
    pub sequencers: Vec<SequencerConfig>,
    /// Blob to note mapping
    #[serde(default)]
    pub note_mapping: NoteMapping,
    /// Extent swept by scan lines
    #[serde(default = "default_scan_height")]
    pub scan_height: f32,
    /// Seed for velocities and random walks; entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,
    /// MIDI output port name
    #[serde(default = "default_midi_port")]
    pub midi_port: String,
    /// Logging settings
    #[serde(default)]
    pub logging: LogConfig,
}

fn default_scan_height() -> f32 {
    1.0
}

fn default_midi_port() -> String {
    DEFAULT_MIDI_PORT.to_string()
}

fn default_sequencers() -> Vec<SequencerConfig> {
    let pct = REFERENCE_TEMPO;
    let ordinal = |t: f32, looping: bool, channel: u8, color: Rgba| SequencerConfig::Ordinal {
        max_duration_to_next: t,
        looping,
        channel,
        color,
        include_holes: None,
    };
    vec![
        SequencerConfig::Vertical {
            loop_time: 4.0 * pct,
            channel: 1,
            color: Rgba::rgb(0, 255, 255),
            include_holes: None,
        },
        SequencerConfig::Vertical {
            loop_time: 2.0 * pct,
            channel: 2,
            color: Rgba::rgb(255, 0, 255),
            include_holes: None,
        },
        ordinal(0.25 * pct, true, 3, Rgba::rgb(127, 255, 0)),
        ordinal(1.0 * pct, true, 4, Rgba::rgb(255, 127, 0)),
        SequencerConfig::Random {
            max_duration_to_next: 0.125 * pct,
            channel: 5,
            color: Rgba::rgb(255, 127, 255),
            include_holes: None,
        },
        ordinal(2.0 * pct, true, 6, Rgba::rgb(0, 0, 255)),
        ordinal(0.5, false, 9, Rgba::rgb(255, 255, 0)),
    ]
}

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            sequencers: default_sequencers(),
            note_mapping: NoteMapping::default(),
            scan_height: default_scan_height(),
            seed: None,
            midi_port: default_midi_port(),
            logging: LogConfig::default(),
        }
    }
}

impl RigConfig {
    /// Check every value the engine relies on
    pub fn validate(&self) -> Result<()> {
        for (i, seq) in self.sequencers.iter().enumerate() {
            let channel = seq.channel();
            if !(1..=16).contains(&channel) {
                return Err(CoreError::InvalidConfig(format!(
                    "sequencer {}: channel {} outside 1..=16",
                    i, channel
                )));
            }
            let time = seq.time();
            if !time.is_finite() || time <= 0.0 {
                return Err(CoreError::InvalidConfig(format!(
                    "sequencer {}: time {} must be positive",
                    i, time
                )));
            }
        }

        if !self.scan_height.is_finite() || self.scan_height <= 0.0 {
            return Err(CoreError::InvalidConfig(format!(
                "scan_height {} must be positive",
                self.scan_height
            )));
        }

        let mapping = &self.note_mapping;
        if !mapping.pitch_area_max.is_finite() || mapping.pitch_area_max <= 0.0 {
            return Err(CoreError::InvalidConfig(format!(
                "pitch_area_max {} must be positive",
                mapping.pitch_area_max
            )));
        }
        if mapping.pitch_high > 127 || mapping.pitch_low > 127 {
            return Err(CoreError::InvalidConfig(
                "pitches must be within 0..=127".to_string(),
            ));
        }
        if mapping.velocity_min >= mapping.velocity_max || mapping.velocity_max > 128 {
            return Err(CoreError::InvalidConfig(format!(
                "velocity range {}..{} is empty or above 127",
                mapping.velocity_min, mapping.velocity_max
            )));
        }
        if let LengthScaling::Range { max_length, .. } = mapping.length_scaling {
            if !max_length.is_finite() || max_length <= 0.0 {
                return Err(CoreError::InvalidConfig(format!(
                    "length scaling range 0..{} is empty",
                    max_length
                )));
            }
        }

        Ok(())
    }

    /// Instantiate the configured sequencers
    ///
    /// With a seed, random walk `i` is seeded with `seed + i` so walks differ.
    pub fn build_sequencers(&self) -> Vec<Sequencer> {
        self.sequencers
            .iter()
            .enumerate()
            .map(|(i, seq)| {
                let seed = self.seed.map(|s| s.wrapping_add(i as u64));
                seq.build(self.scan_height, seed)
            })
            .collect()
    }

    /// Build an engine with this rig's sequencers and mapping
    pub fn build_engine<N: NoteSink, A: AnimationSink>(
        &self,
        note_sink: N,
        animation_sink: A,
    ) -> BlobSequencingEngine<N, A> {
        let mut engine =
            BlobSequencingEngine::new(note_sink, animation_sink).with_mapping(self.note_mapping);
        if let Some(seed) = self.seed {
            engine = engine.with_seed(seed);
        }
        for seq in self.build_sequencers() {
            engine.add_sequencer(seq);
        }
        engine
    }

    /// Parse from a string in the format named by `extension`
    pub fn parse(content: &str, extension: &str) -> Result<Self> {
        let config: RigConfig = match extension {
            "json" => serde_json::from_str(content)?,
            "ron" => ron::from_str(content)?,
            other => return Err(CoreError::UnsupportedFormat(other.to_string())),
        };
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a rig file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config = Self::parse(&content, extension_of(path))?;
        info!(
            "Loaded rig config from {:?} ({} sequencers)",
            path,
            config.sequencers.len()
        );
        Ok(config)
    }

    /// Write the rig file in the format named by its extension
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = match extension_of(path) {
            "json" => serde_json::to_string_pretty(self)?,
            "ron" => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?,
            other => return Err(CoreError::UnsupportedFormat(other.to_string())),
        };
        fs::write(path, content)?;
        Ok(())
    }
}

fn extension_of(path: &Path) -> &str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("ron")
}
