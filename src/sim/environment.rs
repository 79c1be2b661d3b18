use super::Simulator;
use crate::error::ConfigError;
use crate::rng::DeltaSource;
use serde::{Deserialize, Serialize};

// Envelope defaults match the live dashboard metrics.
const TEMPERATURE_START_C: f32 = 24.2;
const HUMIDITY_START_PCT: f32 = 62.0;
const SOIL_MOISTURE_START_PCT: f32 = 48.0;
const WIND_START_KMH: f32 = 14.0;

/// A single simulated sensor metric: a bounded random walk.
///
/// Each tick moves the value by a uniform delta in `[-step, +step]` and
/// clamps to `[min, max]`. The clamp is the only mechanism preventing
/// runaway drift; there is no mean-reversion force.
#[derive(Debug, Clone, Serialize)]
pub struct Reading {
    pub name: &'static str,
    pub value: f32,
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl Reading {
    pub fn new(
        name: &'static str,
        value: f32,
        min: f32,
        max: f32,
        step: f32,
    ) -> Result<Self, ConfigError> {
        if min > max {
            return Err(ConfigError::InvalidRange { metric: name, min, max });
        }
        if step < 0.0 {
            return Err(ConfigError::InvalidStep { metric: name, step });
        }
        if value < min || value > max {
            return Err(ConfigError::ValueOutOfRange {
                metric: name,
                value,
                min,
                max,
            });
        }

        Ok(Self {
            name,
            value,
            min,
            max,
            step,
        })
    }

    fn tick(&mut self, rng: &mut dyn DeltaSource) {
        let delta = rng.uniform(-self.step, self.step);
        self.value = (self.value + delta).clamp(self.min, self.max);
    }
}

/// Owned copy of the ambient readings at one instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadingsSnapshot {
    pub temperature_c: f32,
    pub humidity_pct: f32,
    pub soil_moisture_pct: f32,
    pub wind_kmh: f32,
}

/// Bounded random-walk simulator for the farm-wide ambient metrics.
#[derive(Debug)]
pub struct EnvironmentSimulator {
    temperature: Reading,
    humidity: Reading,
    soil_moisture: Reading,
    wind: Reading,
}

impl EnvironmentSimulator {
    pub fn new() -> Result<Self, ConfigError> {
        Ok(Self {
            temperature: Reading::new("temperature", TEMPERATURE_START_C, 22.0, 27.0, 0.2)?,
            humidity: Reading::new("humidity", HUMIDITY_START_PCT, 55.0, 70.0, 1.0)?,
            soil_moisture: Reading::new("soil_moisture", SOIL_MOISTURE_START_PCT, 40.0, 60.0, 0.5)?,
            wind: Reading::new("wind_speed", WIND_START_KMH, 5.0, 20.0, 1.5)?,
        })
    }

    /// Build from explicit readings; misconfigured bounds have already
    /// been rejected by [`Reading::new`].
    pub fn with_readings(
        temperature: Reading,
        humidity: Reading,
        soil_moisture: Reading,
        wind: Reading,
    ) -> Self {
        Self {
            temperature,
            humidity,
            soil_moisture,
            wind,
        }
    }

    pub fn readings(&self) -> [&Reading; 4] {
        [
            &self.temperature,
            &self.humidity,
            &self.soil_moisture,
            &self.wind,
        ]
    }
}

impl Simulator for EnvironmentSimulator {
    type Snapshot = ReadingsSnapshot;

    fn tick(&mut self, rng: &mut dyn DeltaSource) {
        self.temperature.tick(rng);
        self.humidity.tick(rng);
        self.soil_moisture.tick(rng);
        self.wind.tick(rng);

        debug_assert!(
            self.temperature.value >= self.temperature.min
                && self.temperature.value <= self.temperature.max,
            "temperature {} escaped [{}, {}]",
            self.temperature.value,
            self.temperature.min,
            self.temperature.max
        );
    }

    fn snapshot(&self) -> ReadingsSnapshot {
        ReadingsSnapshot {
            temperature_c: self.temperature.value,
            humidity_pct: self.humidity.value,
            soil_moisture_pct: self.soil_moisture.value,
            wind_kmh: self.wind.value,
        }
    }
}
