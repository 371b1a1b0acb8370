//! Blob to note mapping
//!
//! Every sequencer turns a fired blob into the same message group: one
//! note-on held for a duration, a pan controller and an intensity controller
//! on the sequencer's channel.

use crate::blob::Blob;
use crate::mapping::map_range;
use crate::sink::NoteSink;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Controller number carrying the horizontal position
pub const PAN_CONTROLLER: u8 = 10;
/// Controller number carrying the blob area
pub const INTENSITY_CONTROLLER: u8 = 102;

/// How a blob's perimeter scales the note duration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LengthScaling {
    /// Use the sequencer's duration unchanged
    Fixed,
    /// Multiply by `map(length, 0, max_length, min_factor, max_factor)`, clamped
    Range {
        /// Perimeter (in source pixels) that reaches `max_factor`
        max_length: f32,
        /// Factor for a zero-length blob
        min_factor: f32,
        /// Factor at and above `max_length`
        max_factor: f32,
    },
}

impl Default for LengthScaling {
    fn default() -> Self {
        LengthScaling::Range {
            max_length: 200.0,
            min_factor: 1.0,
            max_factor: 16.0,
        }
    }
}

impl LengthScaling {
    /// Duration multiplier for a blob perimeter
    pub fn factor(&self, length: f32) -> f32 {
        match *self {
            LengthScaling::Fixed => 1.0,
            LengthScaling::Range {
                max_length,
                min_factor,
                max_factor,
            } => map_range(length, 0.0, max_length, min_factor, max_factor, true),
        }
    }
}

/// Parameters of the blob to note mapping
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoteMapping {
    /// Normalized area that reaches the lowest pitch
    pub pitch_area_max: f32,
    /// Pitch for a zero-area blob
    pub pitch_high: u8,
    /// Pitch for blobs at or above `pitch_area_max`
    pub pitch_low: u8,
    /// Lowest velocity (inclusive)
    pub velocity_min: u8,
    /// Highest velocity (exclusive)
    pub velocity_max: u8,
    /// Perimeter based duration scaling
    #[serde(default)]
    pub length_scaling: LengthScaling,
}

impl Default for NoteMapping {
    fn default() -> Self {
        Self {
            pitch_area_max: 0.01,
            pitch_high: 64,
            pitch_low: 24,
            velocity_min: 90,
            velocity_max: 110,
            length_scaling: LengthScaling::default(),
        }
    }
}

/// The concrete messages for one fired blob
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NotePlan {
    /// Note number
    pub pitch: u8,
    /// Velocity
    pub velocity: u8,
    /// Pan controller value
    pub pan: u8,
    /// Intensity controller value
    pub intensity: u8,
    /// Hold time in seconds
    pub duration: f32,
    /// 1-based channel
    pub channel: u8,
}

impl NoteMapping {
    /// Compute the messages for `blob` fired with `duration` on `channel`.
    pub fn plan<R: Rng>(
        &self,
        blob: &Blob,
        duration: f32,
        channel: u8,
        rng: &mut R,
    ) -> NotePlan {
        let pitch = map_range(
            blob.area,
            0.0,
            self.pitch_area_max,
            self.pitch_high as f32,
            self.pitch_low as f32,
            true,
        );
        let velocity = if self.velocity_max > self.velocity_min {
            rng.random_range(self.velocity_min..self.velocity_max)
        } else {
            self.velocity_min
        };
        let pan = map_range(blob.centroid.x, 0.0, 1.0, 0.0, 127.0, true);
        let intensity = map_range(blob.area, 0.0, self.pitch_area_max, 0.0, 127.0, true);

        NotePlan {
            pitch: pitch as u8,
            velocity: velocity.min(127),
            pan: pan as u8,
            intensity: intensity as u8,
            duration: duration * self.length_scaling.factor(blob.length),
            channel,
        }
    }
}

impl NotePlan {
    /// Send note-on, then pan, then intensity
    pub fn send<S: NoteSink + ?Sized>(&self, sink: &mut S) {
        sink.note_on(self.pitch, self.velocity, self.channel, self.duration);
        sink.control_change(PAN_CONTROLLER, self.pan, self.channel);
        sink.control_change(INTENSITY_CONTROLLER, self.intensity, self.channel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::RawBlob;
    use crate::sink::{NoteCommand, NoteLog};
    use glam::Vec2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn blob(area: f32, x: f32, length: f32) -> Blob {
        let raw = RawBlob {
            centroid: Vec2::new(x, 0.5),
            area,
            length,
            ..Default::default()
        };
        Blob::from_contour(&raw, 1.0, 1.0, 0.0)
    }

    #[test]
    fn test_pitch_is_inverse_to_area() {
        let mapping = NoteMapping::default();
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(mapping.plan(&blob(0.0, 0.5, 0.0), 1.0, 1, &mut rng).pitch, 64);
        assert_eq!(mapping.plan(&blob(0.005, 0.5, 0.0), 1.0, 1, &mut rng).pitch, 44);
        assert_eq!(mapping.plan(&blob(0.01, 0.5, 0.0), 1.0, 1, &mut rng).pitch, 24);
        assert_eq!(mapping.plan(&blob(0.5, 0.5, 0.0), 1.0, 1, &mut rng).pitch, 24);
    }

    #[test]
    fn test_controllers_and_velocity() {
        let mapping = NoteMapping::default();
        let mut rng = StdRng::seed_from_u64(7);

        let plan = mapping.plan(&blob(0.02, 1.0, 0.0), 1.0, 3, &mut rng);
        assert_eq!(plan.pan, 127);
        assert_eq!(plan.intensity, 127);
        assert_eq!(plan.channel, 3);

        for _ in 0..200 {
            let plan = mapping.plan(&blob(0.0, 0.0, 0.0), 1.0, 1, &mut rng);
            assert!((90..110).contains(&plan.velocity));
            assert_eq!(plan.pan, 0);
            assert_eq!(plan.intensity, 0);
        }
    }

    #[test]
    fn test_length_scaling_policies() {
        let mut rng = StdRng::seed_from_u64(3);
        let scaled = NoteMapping::default();
        let fixed = NoteMapping {
            length_scaling: LengthScaling::Fixed,
            ..NoteMapping::default()
        };

        let short = blob(0.0, 0.5, 0.0);
        let long = blob(0.0, 0.5, 400.0);

        assert_eq!(scaled.plan(&short, 0.5, 1, &mut rng).duration, 0.5);
        assert_eq!(scaled.plan(&long, 0.5, 1, &mut rng).duration, 8.0);
        assert_eq!(fixed.plan(&long, 0.5, 1, &mut rng).duration, 0.5);
    }

    #[test]
    fn test_send_order() {
        let mut rng = StdRng::seed_from_u64(3);
        let plan = NoteMapping::default().plan(&blob(0.0, 0.5, 0.0), 1.0, 2, &mut rng);
        let mut log = NoteLog::new();
        plan.send(&mut log);

        let commands = log.commands();
        assert_eq!(commands.len(), 3);
        assert!(matches!(commands[0], NoteCommand::NoteOn { channel: 2, .. }));
        assert!(matches!(
            commands[1],
            NoteCommand::ControlChange { controller: PAN_CONTROLLER, value: 63, .. }
        ));
        assert!(matches!(
            commands[2],
            NoteCommand::ControlChange { controller: INTENSITY_CONTROLLER, .. }
        ));
    }
}
