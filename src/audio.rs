//! Audio cues
//!
//! Session events map to one-shot sound effects here. On wasm32 the
//! `AudioManager` synthesises them with the Web Audio API (no sample files),
//! and also runs two loops: an engine drone that follows speed and a siren
//! that sweeps while the pursuit is hot.

use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Player clipped an obstacle
    Hit,
    /// Jump started
    Jump,
    /// Jump landed
    Land,
    /// Shootout target hit
    TargetHit,
    /// Run over
    GameOver,
}

impl SoundEffect {
    /// One-shot cue for a session event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::ObstacleHit { .. } => Some(SoundEffect::Hit),
            GameEvent::Jumped => Some(SoundEffect::Jump),
            GameEvent::Landed => Some(SoundEffect::Land),
            GameEvent::TargetHit { .. } => Some(SoundEffect::TargetHit),
            GameEvent::RunEnded { .. } => Some(SoundEffect::GameOver),
            _ => None,
        }
    }
}

/// Engine drone pitch (Hz) at a 0..1 engine level
pub fn engine_frequency(level: f32) -> f32 {
    55.0 + level.clamp(0.0, 1.0) * 80.0
}

/// Engine drone gain at a 0..1 engine level (before volume settings)
pub fn engine_gain(level: f32) -> f32 {
    0.03 + level.clamp(0.0, 1.0) * 0.04
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{SoundEffect, engine_frequency, engine_gain};
    use crate::sim::GameEvent;

    /// Siren sweep period (seconds): up an octave and back
    const SIREN_SWEEP: f64 = 1.0;
    const SIREN_GAIN: f32 = 0.06;

    struct Voice {
        osc: OscillatorNode,
        gain: GainNode,
    }

    impl Voice {
        fn stop(self) {
            let _ = self.osc.stop();
            let _ = self.gain.disconnect();
        }
    }

    /// Audio manager for the game
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        sfx_volume: f32,
        loop_volume: f32,
        engine: Option<Voice>,
        siren: Option<Voice>,
        /// Context time the next siren sweep is due
        next_sweep_at: f64,
    }

    impl Default for AudioManager {
        fn default() -> Self {
            Self::new()
        }
    }

    impl AudioManager {
        pub fn new() -> Self {
            // Try to create audio context (may fail if not in secure context)
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                sfx_volume: 0.8,
                loop_volume: 0.56,
                engine: None,
                siren: None,
                next_sweep_at: 0.0,
            }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        /// Apply volumes from settings (0 when muted)
        pub fn set_volumes(&mut self, sfx: f32, loops: f32) {
            self.sfx_volume = sfx.clamp(0.0, 1.0);
            self.loop_volume = loops.clamp(0.0, 1.0);
            if let Some(siren) = &self.siren {
                siren.gain.gain().set_value(SIREN_GAIN * self.loop_volume);
            }
        }

        /// React to one session event
        pub fn handle(&mut self, event: &GameEvent) {
            match event {
                GameEvent::EngineStart => self.start_engine(),
                GameEvent::EngineStop => self.stop_engine(),
                GameEvent::SirenOn => self.start_siren(),
                GameEvent::SirenOff => self.stop_siren(),
                _ => {
                    if let Some(effect) = SoundEffect::for_event(event) {
                        self.play(effect);
                    }
                }
            }
        }

        /// Per-frame upkeep: engine pitch and the siren sweep
        pub fn update(&mut self, engine_level: f32) {
            let Some(ctx) = &self.ctx else { return };
            let t = ctx.current_time();

            if let Some(engine) = &self.engine {
                engine
                    .osc
                    .frequency()
                    .set_target_at_time(engine_frequency(engine_level), t, 0.1)
                    .ok();
                engine
                    .gain
                    .gain()
                    .set_target_at_time(engine_gain(engine_level) * self.loop_volume, t, 0.1)
                    .ok();
            }

            if let Some(siren) = &self.siren {
                if t >= self.next_sweep_at {
                    let start = t.max(self.next_sweep_at);
                    let freq = siren.osc.frequency();
                    freq.set_value_at_time(440.0, start).ok();
                    freq.linear_ramp_to_value_at_time(880.0, start + SIREN_SWEEP / 2.0)
                        .ok();
                    freq.linear_ramp_to_value_at_time(440.0, start + SIREN_SWEEP).ok();
                    self.next_sweep_at = start + SIREN_SWEEP;
                }
            }
        }

        /// Play a sound effect
        pub fn play(&self, effect: SoundEffect) {
            let vol = self.sfx_volume;
            if vol <= 0.0 {
                return;
            }

            let Some(ctx) = &self.ctx else { return };

            // Resume context if suspended (browsers require user gesture)
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match effect {
                SoundEffect::Hit => self.play_hit(ctx, vol),
                SoundEffect::Jump => self.play_jump(ctx, vol),
                SoundEffect::Land => self.play_land(ctx, vol),
                SoundEffect::TargetHit => self.play_target_hit(ctx, vol),
                SoundEffect::GameOver => self.play_game_over(ctx, vol),
            }
        }

        // === Loops ===

        fn start_engine(&mut self) {
            if self.engine.is_some() {
                return;
            }
            let Some(ctx) = &self.ctx else { return };
            let Some((osc, gain)) = create_osc(ctx, engine_frequency(0.0), OscillatorType::Sawtooth)
            else {
                return;
            };
            gain.gain().set_value(engine_gain(0.0) * self.loop_volume);
            osc.start().ok();
            self.engine = Some(Voice { osc, gain });
        }

        fn stop_engine(&mut self) {
            if let Some(engine) = self.engine.take() {
                engine.stop();
            }
        }

        fn start_siren(&mut self) {
            if self.siren.is_some() {
                return;
            }
            let Some(ctx) = &self.ctx else { return };
            let Some((osc, gain)) = create_osc(ctx, 440.0, OscillatorType::Sawtooth) else {
                return;
            };
            gain.gain().set_value(SIREN_GAIN * self.loop_volume);
            osc.start().ok();
            self.next_sweep_at = ctx.current_time();
            self.siren = Some(Voice { osc, gain });
        }

        fn stop_siren(&mut self) {
            if let Some(siren) = self.siren.take() {
                siren.stop();
            }
        }

        // === Sound generators ===

        /// Obstacle hit - crunchy falling thump
        fn play_hit(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = create_osc(ctx, 180.0, OscillatorType::Square) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.4, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.15)
                .ok();
            osc.frequency().set_value_at_time(180.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(40.0, t + 0.15)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.16).ok();
        }

        /// Jump - rising chirp
        fn play_jump(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = create_osc(ctx, 220.0, OscillatorType::Sine) else {
                return;
            };
            let t = ctx.current_time();

            osc.frequency().set_value_at_time(220.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(440.0, t + 0.15)
                .ok();
            gain.gain().set_value_at_time(vol * 0.18, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.001, t + 0.25)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.25).ok();
        }

        /// Land - short low thud
        fn play_land(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = create_osc(ctx, 90.0, OscillatorType::Triangle) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.22, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.08)
                .ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(50.0, t + 0.08)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.1).ok();
        }

        /// Target hit - clean ping
        fn play_target_hit(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = create_osc(ctx, 880.0, OscillatorType::Sine) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.3, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.001, t + 0.3)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.3).ok();
        }

        /// Game over - descending four-note sting
        fn play_game_over(&self, ctx: &AudioContext, vol: f32) {
            let now = ctx.current_time();
            for (i, freq) in [440.0, 370.0, 311.0, 220.0].into_iter().enumerate() {
                let Some((osc, gain)) = create_osc(ctx, freq, OscillatorType::Sawtooth) else {
                    continue;
                };
                let t = now + i as f64 * 0.18;
                gain.gain().set_value_at_time(0.0, now).ok();
                gain.gain().set_value_at_time(vol * 0.15, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.001, t + 0.35)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.35).ok();
            }
        }
    }

    /// Create an oscillator with gain envelope
    fn create_osc(
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
}
