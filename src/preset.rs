//! Mixing presets — where each instrument family sits in the stereo field.
//!
//! These are hand-tuned values, not derived ones. A voice can override
//! either number; these only fill in what the score leaves out.

use serde::{Deserialize, Serialize};

use crate::dsp::timbre::Timbre;

/// Stereo placement and reverb send for one voice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MixPreset {
    /// -1 (left) to 1 (right).
    pub pan: f64,
    /// 0 (dry) to 1 (wet).
    pub reverb: f64,
}

impl MixPreset {
    pub const fn new(pan: f64, reverb: f64) -> Self {
        MixPreset { pan, reverb }
    }

    pub const MELODY: MixPreset = MixPreset::new(0.0, 0.2);
    pub const BASS: MixPreset = MixPreset::new(0.0, 0.1);
    pub const DRUMS: MixPreset = MixPreset::new(-0.1, 0.05);
    pub const STRINGS: MixPreset = MixPreset::new(0.3, 0.4);
    pub const LEAD_STRINGS: MixPreset = MixPreset::new(0.0, 0.3);
    pub const PIANO: MixPreset = MixPreset::new(-0.3, 0.3);
    pub const CHOIR: MixPreset = MixPreset::new(-0.2, 0.6);
    pub const BRASS: MixPreset = MixPreset::new(0.2, 0.4);
    pub const TIMPANI: MixPreset = MixPreset::new(0.0, 0.3);

    /// Default placement for a timbre.
    pub fn for_timbre(timbre: Timbre) -> MixPreset {
        match timbre {
            Timbre::Lead | Timbre::Chip => MixPreset::MELODY,
            Timbre::Bass => MixPreset::BASS,
            Timbre::Drums => MixPreset::DRUMS,
            Timbre::Violin | Timbre::Viola => MixPreset::STRINGS,
            Timbre::Cello => MixPreset::LEAD_STRINGS,
            Timbre::Piano => MixPreset::PIANO,
            Timbre::Choir => MixPreset::CHOIR,
            Timbre::Brass => MixPreset::BRASS,
            Timbre::Timpani => MixPreset::TIMPANI,
        }
    }
}
