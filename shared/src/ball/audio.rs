use super::settings::RollAudioSettings;
use crate::utils::{interp_to, lerp};

/// Pitch and volume multipliers for the rolling loop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RollAudio {
    pub pitch: f32,
    pub volume: f32,
}

/// Smoothed rolling sound parameters.
///
/// Speed raises pitch and volume; time in the air shifts the sound up and quieter.
#[derive(Clone, Debug)]
pub struct RollAudioState {
    air_alpha: f32,
    pitch: f32,
    volume: f32,
}

impl RollAudioState {
    pub fn new(settings: &RollAudioSettings) -> Self {
        Self {
            air_alpha: 0.0,
            pitch: settings.pitch_min,
            volume: settings.volume_min,
        }
    }

    /// Returns `None` (and leaves the sound alone) when `max_speed` is not positive.
    pub fn update(
        &mut self,
        speed: f32,
        max_speed: f32,
        grounded: bool,
        settings: &RollAudioSettings,
        dt: f32,
    ) -> Option<RollAudio> {
        if max_speed <= 0.0 {
            return None;
        }

        let alpha = (speed / max_speed)
            .clamp(0.0, 1.0)
            .powf(settings.speed_exponent);

        let base_pitch = lerp(settings.pitch_min, settings.pitch_max, alpha);
        let base_volume = lerp(settings.volume_min, settings.volume_max, alpha);

        let air_target = if grounded { 0.0 } else { 1.0 };
        self.air_alpha = interp_to(self.air_alpha, air_target, dt, settings.air_interp);

        let pitch = base_pitch * lerp(1.0, settings.air_pitch, self.air_alpha);
        let volume = base_volume * lerp(1.0, settings.air_volume, self.air_alpha);

        self.pitch = interp_to(self.pitch, pitch, dt, settings.smooth_interp);
        self.volume = interp_to(self.volume, volume, dt, settings.smooth_interp);

        Some(self.current())
    }

    pub fn current(&self) -> RollAudio {
        RollAudio {
            pitch: self.pitch,
            volume: self.volume,
        }
    }
}
