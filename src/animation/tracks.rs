//! Keyframe tracks: one animated property sampled over a timeline.

use crate::animation::values::Interpolatable;
use crate::errors::{MarionetteError, Result};

/// How values between two keyframes are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpolationMode {
    /// Straight mix between the bracketing keys.
    Linear,
    /// Hold the previous key's value.
    Step,
    /// Cubic Hermite spline; the value buffer stores, per key,
    /// an in-tangent, the value itself and an out-tangent.
    CubicSpline,
}

/// A timeline plus value buffer for one animated property.
///
/// The timeline is strictly increasing. For [`InterpolationMode::Step`] and
/// [`InterpolationMode::Linear`] the value buffer holds one entry per key;
/// for [`InterpolationMode::CubicSpline`] it holds three (in-tangent, value,
/// out-tangent), so key `i`'s value lives at `3 * i + 1`.
#[derive(Debug, Clone)]
pub struct KeyframeTrack<T: Interpolatable> {
    times: Vec<f32>,
    values: Vec<T>,
    interpolation: InterpolationMode,
}

impl<T: Interpolatable> KeyframeTrack<T> {
    /// Builds a track after validating the timeline and value buffer.
    ///
    /// # Errors
    ///
    /// Fails when the timeline is not strictly increasing or the value count
    /// does not match the interpolation mode's layout. An empty track (no
    /// keys, no values) is valid; sampling it yields `None`.
    pub fn new(times: Vec<f32>, values: Vec<T>, interpolation: InterpolationMode) -> Result<Self> {
        for key in 1..times.len() {
            if times[key] <= times[key - 1] {
                return Err(MarionetteError::NonIncreasingTimeline { key });
            }
        }
        let expected = match interpolation {
            InterpolationMode::CubicSpline => times.len() * 3,
            _ => times.len(),
        };
        if values.len() != expected {
            return Err(MarionetteError::TrackValueCountMismatch {
                keys: times.len(),
                expected,
                actual: values.len(),
            });
        }
        Ok(Self {
            times,
            values,
            interpolation,
        })
    }

    /// Number of keyframes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn interpolation(&self) -> InterpolationMode {
        self.interpolation
    }

    #[inline]
    #[must_use]
    pub fn times(&self) -> &[f32] {
        &self.times
    }

    #[inline]
    #[must_use]
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Last timeline entry, or 0.0 for an empty track.
    #[must_use]
    pub fn max_time(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    /// The stored value of key `key` (skipping tangents on cubic tracks).
    fn key_value(&self, key: usize) -> T {
        match self.interpolation {
            InterpolationMode::CubicSpline => self.values[key * 3 + 1],
            _ => self.values[key],
        }
    }

    /// Samples the track at `time`.
    ///
    /// Times at or before the first key clamp to the first value; times at
    /// or after the last key clamp to the last value. In between, the
    /// bracketing key pair is located by binary search and interpolated per
    /// the track's mode. Returns `None` only for a track with no keyframes.
    #[must_use]
    pub fn sample(&self, time: f32) -> Option<T> {
        if self.times.is_empty() || self.values.is_empty() {
            return None;
        }
        let last = self.times.len() - 1;
        if time <= self.times[0] {
            return Some(self.key_value(0));
        }
        if time >= self.times[last] {
            return Some(self.key_value(last));
        }

        // First key strictly after `time`; the sample basis is the key before it.
        let next = self.times.partition_point(|&t| t <= time);
        let prev = next - 1;

        let dt = self.times[next] - self.times[prev];
        if dt <= f32::EPSILON {
            return Some(self.key_value(prev));
        }
        let u = (time - self.times[prev]) / dt;

        Some(match self.interpolation {
            InterpolationMode::Step => self.key_value(prev),
            InterpolationMode::Linear => {
                T::interpolate_linear(self.values[prev], self.values[next], u)
            }
            InterpolationMode::CubicSpline => {
                let v0 = self.values[prev * 3 + 1];
                let out_tangent0 = self.values[prev * 3 + 2];
                let in_tangent1 = self.values[next * 3];
                let v1 = self.values[next * 3 + 1];
                T::interpolate_cubic(v0, out_tangent0, in_tangent1, v1, u, dt)
            }
        })
    }
}
