use crate::error::ConfigError;
use crate::sim::fields::{FieldId, FieldSimulator, IrrigationState, MAX_FIELDS};
use heapless::Vec;
use serde::{Deserialize, Serialize};

/// Hysteresis thresholds for automatic irrigation.
///
/// A field only starts irrigating below the low threshold and only stops
/// above the high one; moisture wandering inside the band changes
/// nothing, which keeps the valves from chattering around a single
/// setpoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IrrigationConfig {
    pub low_threshold_pct: f32,
    pub high_threshold_pct: f32,
}

impl Default for IrrigationConfig {
    fn default() -> Self {
        Self {
            low_threshold_pct: 35.0,
            high_threshold_pct: 65.0,
        }
    }
}

impl IrrigationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.low_threshold_pct >= self.high_threshold_pct {
            return Err(ConfigError::InvalidThresholds {
                low: self.low_threshold_pct,
                high: self.high_threshold_pct,
            });
        }
        Ok(())
    }
}

/// Automatic transition, consumed by the alert engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IrrigationEvent {
    AutoStarted { field_id: FieldId },
    AutoStopped { field_id: FieldId },
}

/// Per-field two-state irrigation controller.
///
/// Holds no per-field state of its own; the authoritative idle/active
/// flag lives with the field in [`FieldSimulator`], and the controller
/// only decides transitions.
#[derive(Debug)]
pub struct IrrigationController {
    config: IrrigationConfig,
    auto_mode: bool,
}

impl IrrigationController {
    pub fn new(config: IrrigationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            auto_mode: true,
        })
    }

    pub fn auto_mode(&self) -> bool {
        self.auto_mode
    }

    pub fn set_auto_mode(&mut self, enabled: bool) {
        self.auto_mode = enabled;
    }

    pub fn config(&self) -> &IrrigationConfig {
        &self.config
    }

    /// Evaluate thresholds against the post-drift moisture of every
    /// field, once per field tick. Performs no transitions when auto
    /// mode is off.
    ///
    /// The caller must have ticked the field simulator first: the drift
    /// a field received this tick was based on its pre-tick state, and
    /// the decision here is based on the resulting moisture.
    pub fn evaluate(&self, fields: &mut FieldSimulator) -> Vec<IrrigationEvent, MAX_FIELDS> {
        let mut events = Vec::new();

        if !self.auto_mode {
            return events;
        }

        for id in fields.field_ids() {
            let (moisture, state) = match (fields.moisture(id), fields.irrigation_state(id)) {
                (Some(m), Some(s)) => (m, s),
                _ => continue,
            };

            match state {
                IrrigationState::Idle if moisture < self.config.low_threshold_pct => {
                    fields.set_irrigation(id, IrrigationState::Active);
                    let _ = events.push(IrrigationEvent::AutoStarted { field_id: id });
                }
                IrrigationState::Active if moisture > self.config.high_threshold_pct => {
                    fields.set_irrigation(id, IrrigationState::Idle);
                    let _ = events.push(IrrigationEvent::AutoStopped { field_id: id });
                }
                _ => {}
            }
        }

        events
    }

    /// Manual start, bypassing thresholds. Idempotent: starting an
    /// already-active or unknown field changes nothing. Returns whether
    /// the state changed.
    pub fn manual_start(&self, fields: &mut FieldSimulator, id: FieldId) -> bool {
        fields.set_irrigation(id, IrrigationState::Active)
    }

    /// Manual stop, bypassing thresholds. Idempotent like `manual_start`.
    pub fn manual_stop(&self, fields: &mut FieldSimulator, id: FieldId) -> bool {
        fields.set_irrigation(id, IrrigationState::Idle)
    }
}
