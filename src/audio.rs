//! Audio using the Web Audio API
//!
//! Sound effects are synthesized from oscillators; there are no sample files.

use crate::sim::{DestroyCause, GameEvent};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Laser leaves the ship
    LaserFire,
    /// Mine shot down or evicted
    MineExplode,
    /// Mine reached the ship
    ShipHit,
}

impl SoundEffect {
    /// Sound for a simulation event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::MineSpawned { .. } => None,
            GameEvent::LaserFired { .. } => Some(SoundEffect::LaserFire),
            GameEvent::MineDestroyed {
                cause: DestroyCause::ShipCollision,
                ..
            } => Some(SoundEffect::ShipHit),
            GameEvent::MineDestroyed { .. } => Some(SoundEffect::MineExplode),
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use manager::AudioManager;

#[cfg(target_arch = "wasm32")]
mod manager {
    use super::SoundEffect;
    use crate::settings::Settings;
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    /// Audio manager for the game
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        master_volume: f32,
        sfx_volume: f32,
        muted: bool,
    }

    impl AudioManager {
        pub fn new(settings: &Settings) -> Self {
            // Fails outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                master_volume: settings.master_volume.clamp(0.0, 1.0),
                sfx_volume: settings.sfx_volume.clamp(0.0, 1.0),
                muted: false,
            }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        /// Mute/unmute all audio
        pub fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
        }

        fn effective_volume(&self) -> f32 {
            if self.muted {
                0.0
            } else {
                self.master_volume * self.sfx_volume
            }
        }

        /// Play a sound effect
        pub fn play(&self, effect: SoundEffect) {
            let vol = self.effective_volume();
            if vol <= 0.0 {
                return;
            }

            let Some(ctx) = &self.ctx else { return };

            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match effect {
                SoundEffect::LaserFire => self.play_laser(ctx, vol),
                SoundEffect::MineExplode => self.play_explosion(ctx, vol),
                SoundEffect::ShipHit => self.play_ship_hit(ctx, vol),
            }
        }

        // === Sound generators ===

        /// Create an oscillator routed through a gain node
        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Laser - short falling zap
        fn play_laser(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 1800.0, OscillatorType::Square) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.15, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.12)
                .ok();
            osc.frequency().set_value_at_time(1800.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(300.0, t + 0.12)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.15).ok();
        }

        /// Explosion - boom with a crack on top
        fn play_explosion(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 100.0, OscillatorType::Sawtooth) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.5, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.4)
                .ok();
            osc.frequency().set_value_at_time(100.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(30.0, t + 0.4)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.5).ok();

            if let Some((osc2, gain2)) = self.create_osc(ctx, 1500.0, OscillatorType::Square) {
                gain2.gain().set_value_at_time(vol * 0.2, t).ok();
                gain2
                    .gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.1)
                    .ok();
                osc2.start().ok();
                osc2.stop_with_when(t + 0.15).ok();
            }
        }

        /// Ship hit - deep metallic clang
        fn play_ship_hit(&self, ctx: &AudioContext, vol: f32) {
            let t = ctx.current_time();

            if let Some((osc, gain)) = self.create_osc(ctx, 80.0, OscillatorType::Sine) {
                gain.gain().set_value_at_time(vol * 0.5, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.25)
                    .ok();
                osc.frequency().set_value_at_time(80.0, t).ok();
                osc.frequency()
                    .exponential_ramp_to_value_at_time(40.0, t + 0.2)
                    .ok();
                osc.start().ok();
                osc.stop_with_when(t + 0.3).ok();
            }

            if let Some((osc, gain)) = self.create_osc(ctx, 400.0, OscillatorType::Square) {
                gain.gain().set_value_at_time(vol * 0.25, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.2)
                    .ok();
                osc.frequency().set_value_at_time(400.0, t).ok();
                osc.frequency().set_value_at_time(300.0, t + 0.05).ok();
                osc.frequency().set_value_at_time(200.0, t + 0.1).ok();
                osc.start().ok();
                osc.stop_with_when(t + 0.25).ok();
            }
        }
    }
}
