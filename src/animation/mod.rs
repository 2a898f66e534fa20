pub mod clip;
pub mod player;
pub mod tracks;
mod values;

pub use clip::{AnimationClip, TargetPath, Track, TrackData, TrackMeta, TrackValue};
pub use player::{AnimationPlayer, BlendMode, PlaybackDirection};
pub use tracks::{InterpolationMode, KeyframeTrack};
pub use values::Interpolatable;
