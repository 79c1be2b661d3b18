use super::Simulator;
use crate::rng::DeltaSource;
use heapless::Vec;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const MAX_FIELDS: usize = 8;

// Clamp band for per-field moisture; wider than the farm-average
// envelope so a dry field (South starts at 27) shows up as dry.
const MOISTURE_MIN_PCT: f32 = 20.0;
const MOISTURE_MAX_PCT: f32 = 80.0;

// Irrigation raises moisture quickly, evaporation lowers it slowly.
const ACTIVE_GAIN_MAX: f32 = 2.0;
const IDLE_LOSS_MAX: f32 = 0.5;

pub type FieldId = u8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IrrigationState {
    Idle,
    Active,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldState {
    pub id: FieldId,
    pub name: &'static str,
    pub crop: &'static str,
    pub area_acres: f32,
    pub moisture_pct: f32,
    pub irrigation: IrrigationState,
}

/// Owned copy of the field roster at one instant.
#[derive(Debug, Clone, Serialize)]
pub struct FieldsSnapshot {
    pub fields: std::vec::Vec<FieldState>,
}

/// Per-field soil moisture simulator, coupled to irrigation state.
///
/// The drift direction for a tick reads the irrigation state as it was
/// when the tick began; the controller decides transitions only after the
/// drift has been applied.
#[derive(Debug)]
pub struct FieldSimulator {
    fields: Vec<FieldState, MAX_FIELDS>,
}

impl FieldSimulator {
    /// Fixed startup roster; fields live for the process lifetime.
    pub fn new() -> Self {
        let mut fields = Vec::new();
        let roster = [
            (1, "North Field", "Corn", 12.5, 42.0),
            (2, "East Field", "Wheat", 8.3, 61.0),
            (3, "South Field", "Soybean", 10.1, 27.0),
            (4, "West Field", "Potatoes", 6.7, 53.0),
        ];

        for (id, name, crop, area_acres, moisture_pct) in roster {
            let _ = fields.push(FieldState {
                id,
                name,
                crop,
                area_acres,
                moisture_pct,
                irrigation: IrrigationState::Idle,
            });
        }

        Self { fields }
    }

    pub fn moisture(&self, id: FieldId) -> Option<f32> {
        self.fields
            .iter()
            .find(|f| f.id == id)
            .map(|f| f.moisture_pct)
    }

    pub fn irrigation_state(&self, id: FieldId) -> Option<IrrigationState> {
        self.fields.iter().find(|f| f.id == id).map(|f| f.irrigation)
    }

    pub fn name(&self, id: FieldId) -> Option<&'static str> {
        self.fields.iter().find(|f| f.id == id).map(|f| f.name)
    }

    /// Flip a field's irrigation state. Unknown ids are a reported no-op.
    /// Returns true when the state actually changed.
    pub fn set_irrigation(&mut self, id: FieldId, state: IrrigationState) -> bool {
        match self.fields.iter_mut().find(|f| f.id == id) {
            Some(field) => {
                if field.irrigation == state {
                    return false;
                }
                field.irrigation = state;
                true
            }
            None => {
                warn!(field_id = id, "irrigation change for unknown field ignored");
                false
            }
        }
    }

    pub fn field_ids(&self) -> std::vec::Vec<FieldId> {
        self.fields.iter().map(|f| f.id).collect()
    }
}

impl Default for FieldSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulator for FieldSimulator {
    type Snapshot = FieldsSnapshot;

    fn tick(&mut self, rng: &mut dyn DeltaSource) {
        for field in &mut self.fields {
            let delta = match field.irrigation {
                IrrigationState::Active => rng.uniform(0.0, ACTIVE_GAIN_MAX),
                IrrigationState::Idle => -rng.uniform(0.0, IDLE_LOSS_MAX),
            };
            field.moisture_pct =
                (field.moisture_pct + delta).clamp(MOISTURE_MIN_PCT, MOISTURE_MAX_PCT);
        }
    }

    fn snapshot(&self) -> FieldsSnapshot {
        FieldsSnapshot {
            fields: self.fields.iter().cloned().collect(),
        }
    }
}
