pub mod environment;
pub mod fields;
pub mod weather;

pub use environment::{EnvironmentSimulator, Reading, ReadingsSnapshot};
pub use fields::{FieldId, FieldSimulator, FieldState, FieldsSnapshot, IrrigationState};
pub use weather::{ConcernKind, WeatherConcern, WeatherSimulator, WeatherSnapshot};

use crate::rng::DeltaSource;
use serde::Serialize;

/// Common seam for the tick-driven simulators.
///
/// A tick mutates internal state through the injected random source;
/// readers only ever see owned snapshots, never live references.
pub trait Simulator {
    type Snapshot: Clone + Serialize;

    fn tick(&mut self, rng: &mut dyn DeltaSource);
    fn snapshot(&self) -> Self::Snapshot;
}
