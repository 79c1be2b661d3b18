use super::Simulator;
use crate::rng::DeltaSource;
use serde::{Deserialize, Serialize};

pub const HOURLY_ENTRIES: usize = 24;
pub const DAILY_ENTRIES: usize = 7;

// Only the near-term hours get refreshed each tick; the tail of the
// forecast stays as generated.
const REFRESH_HOURS: usize = 5;

// Concern evaluation window and thresholds.
const CONCERN_WINDOW_HOURS: usize = 12;
const HEAT_LIMIT_C: f32 = 30.0;
const WIND_LIMIT_KMH: f32 = 12.0;
const RAIN_LIMIT_PCT: f32 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Sunny,
    Cloudy,
    Rainy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HourlyEntry {
    pub hour: u8,
    pub temp_c: f32,
    pub humidity_pct: f32,
    pub wind_kmh: f32,
    pub rain_chance_pct: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyEntry {
    pub day: &'static str,
    pub condition: Condition,
    pub high_c: i8,
    pub low_c: i8,
    pub rain_chance_pct: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConcernKind {
    Heat,
    Wind,
    Rain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeatherConcern {
    pub kind: ConcernKind,
    pub message: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeatherSnapshot {
    pub hourly: Vec<HourlyEntry>,
    pub daily: Vec<DailyEntry>,
}

/// Simulated hourly and daily forecast series.
///
/// The hourly series follows a diurnal base curve (cool nights, warm
/// afternoons) with bounded noise; each tick perturbs only the next few
/// hours, the way a real forecast revises near-term predictions.
#[derive(Debug)]
pub struct WeatherSimulator {
    hourly: Vec<HourlyEntry>,
    daily: Vec<DailyEntry>,
}

impl WeatherSimulator {
    pub fn new(start_hour: u8, rng: &mut dyn DeltaSource) -> Self {
        let hourly = (0..HOURLY_ENTRIES)
            .map(|i| {
                let hour = (start_hour as usize + i) % 24;
                Self::generate_hour(hour as u8, rng)
            })
            .collect();

        Self {
            hourly,
            daily: Self::daily_table(),
        }
    }

    fn generate_hour(hour: u8, rng: &mut dyn DeltaSource) -> HourlyEntry {
        let base_temp = match hour {
            0..=5 => 18.0,
            6..=11 => 20.0 + (hour as f32 - 6.0),
            12..=17 => 24.0 - (hour as f32 - 12.0) * 0.5,
            _ => 21.0 - (hour as f32 - 18.0) * 0.5,
        };
        let temp_c = base_temp + rng.uniform(-1.0, 1.0);

        // Humidity runs inverse to temperature during the day.
        let humidity_pct = (70.0 - (temp_c - 18.0) * 2.0 + rng.uniform(-5.0, 5.0)).clamp(0.0, 100.0);
        let wind_kmh = 8.0 + rng.uniform(-3.0, 3.0);
        let rain_chance_pct = (humidity_pct - 40.0 + rng.uniform(-10.0, 10.0)).clamp(0.0, 100.0);

        HourlyEntry {
            hour,
            temp_c,
            humidity_pct,
            wind_kmh,
            rain_chance_pct,
        }
    }

    fn daily_table() -> Vec<DailyEntry> {
        vec![
            DailyEntry { day: "Today", condition: Condition::Sunny, high_c: 26, low_c: 18, rain_chance_pct: 10 },
            DailyEntry { day: "Tomorrow", condition: Condition::Cloudy, high_c: 24, low_c: 17, rain_chance_pct: 30 },
            DailyEntry { day: "Wed", condition: Condition::Rainy, high_c: 22, low_c: 16, rain_chance_pct: 80 },
            DailyEntry { day: "Thu", condition: Condition::Cloudy, high_c: 23, low_c: 17, rain_chance_pct: 40 },
            DailyEntry { day: "Fri", condition: Condition::Sunny, high_c: 25, low_c: 18, rain_chance_pct: 5 },
            DailyEntry { day: "Sat", condition: Condition::Sunny, high_c: 27, low_c: 19, rain_chance_pct: 0 },
            DailyEntry { day: "Sun", condition: Condition::Cloudy, high_c: 25, low_c: 18, rain_chance_pct: 20 },
        ]
    }

    /// Scan the next `CONCERN_WINDOW_HOURS` for conditions worth
    /// surfacing. At most one concern is reported, highest priority
    /// first (Heat > Wind > Rain); recomputed from scratch on every call.
    pub fn concern(&self) -> Option<WeatherConcern> {
        let window = &self.hourly[..CONCERN_WINDOW_HOURS.min(self.hourly.len())];

        let max_temp = window.iter().map(|h| h.temp_c).fold(f32::MIN, f32::max);
        let max_wind = window.iter().map(|h| h.wind_kmh).fold(f32::MIN, f32::max);
        let max_rain = window
            .iter()
            .map(|h| h.rain_chance_pct)
            .fold(f32::MIN, f32::max);

        if max_temp > HEAT_LIMIT_C {
            return Some(WeatherConcern {
                kind: ConcernKind::Heat,
                message: "High temperatures may stress crops",
            });
        }
        if max_wind > WIND_LIMIT_KMH {
            return Some(WeatherConcern {
                kind: ConcernKind::Wind,
                message: "Strong winds may affect fieldwork",
            });
        }
        if max_rain > RAIN_LIMIT_PCT {
            return Some(WeatherConcern {
                kind: ConcernKind::Rain,
                message: "Heavy rain may cause field saturation",
            });
        }
        None
    }

    pub fn hourly(&self) -> &[HourlyEntry] {
        &self.hourly
    }

    pub fn daily(&self) -> &[DailyEntry] {
        &self.daily
    }

    #[cfg(test)]
    pub(crate) fn hourly_mut(&mut self) -> &mut [HourlyEntry] {
        &mut self.hourly
    }
}

impl Simulator for WeatherSimulator {
    type Snapshot = WeatherSnapshot;

    /// Revise the near-term hours with small bounded deltas.
    fn tick(&mut self, rng: &mut dyn DeltaSource) {
        for entry in self.hourly.iter_mut().take(REFRESH_HOURS) {
            entry.temp_c += rng.uniform(-0.2, 0.2);
            entry.humidity_pct = (entry.humidity_pct + rng.uniform(-2.0, 2.0)).clamp(30.0, 90.0);
            entry.wind_kmh = (entry.wind_kmh + rng.uniform(-0.3, 0.3)).max(0.0);
            entry.rain_chance_pct =
                (entry.rain_chance_pct + rng.uniform(-3.0, 3.0)).clamp(0.0, 100.0);
        }
    }

    fn snapshot(&self) -> WeatherSnapshot {
        WeatherSnapshot {
            hourly: self.hourly.clone(),
            daily: self.daily.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SequenceSource;

    // A forecast with nothing above any concern threshold.
    fn calm_sim() -> WeatherSimulator {
        let mut rng = SequenceSource::midpoint();
        let mut sim = WeatherSimulator::new(0, &mut rng);
        for entry in sim.hourly_mut() {
            entry.temp_c = 20.0;
            entry.wind_kmh = 5.0;
            entry.rain_chance_pct = 10.0;
        }
        sim
    }

    #[test]
    fn test_calm_forecast_has_no_concern() {
        let sim = calm_sim();
        assert_eq!(sim.concern(), None);
    }

    #[test]
    fn test_heat_outranks_wind_and_rain() {
        let mut sim = calm_sim();
        sim.hourly_mut()[0].temp_c = HEAT_LIMIT_C + 1.0;
        sim.hourly_mut()[1].wind_kmh = WIND_LIMIT_KMH + 5.0;
        sim.hourly_mut()[2].rain_chance_pct = RAIN_LIMIT_PCT + 10.0;

        let concern = sim.concern().unwrap();
        assert_eq!(concern.kind, ConcernKind::Heat);
    }

    #[test]
    fn test_wind_outranks_rain() {
        let mut sim = calm_sim();
        sim.hourly_mut()[1].wind_kmh = WIND_LIMIT_KMH + 5.0;
        sim.hourly_mut()[2].rain_chance_pct = RAIN_LIMIT_PCT + 10.0;

        let concern = sim.concern().unwrap();
        assert_eq!(concern.kind, ConcernKind::Wind);
    }

    #[test]
    fn test_rain_alone_is_reported() {
        let mut sim = calm_sim();
        sim.hourly_mut()[5].rain_chance_pct = RAIN_LIMIT_PCT + 5.0;

        let concern = sim.concern().unwrap();
        assert_eq!(concern.kind, ConcernKind::Rain);
        assert!(!concern.message.is_empty());
    }

    #[test]
    fn test_concern_window_excludes_far_hours() {
        let mut sim = calm_sim();
        // First hour past the evaluation window.
        sim.hourly_mut()[CONCERN_WINDOW_HOURS].temp_c = HEAT_LIMIT_C + 10.0;
        assert_eq!(sim.concern(), None);
    }

    #[test]
    fn test_forecast_spans_a_full_day() {
        let sim = calm_sim();
        assert_eq!(sim.hourly().len(), HOURLY_ENTRIES);
        assert_eq!(sim.daily().len(), DAILY_ENTRIES);
        assert_eq!(sim.hourly()[0].hour, 0);
        assert_eq!(sim.hourly()[23].hour, 23);
    }

    #[test]
    fn test_tick_keeps_revised_hours_bounded() {
        let mut rng = SequenceSource::new(vec![1.0]);
        let mut sim = WeatherSimulator::new(6, &mut rng);
        for _ in 0..200 {
            sim.tick(&mut rng);
        }
        for entry in sim.hourly().iter().take(5) {
            assert!((30.0..=90.0).contains(&entry.humidity_pct));
            assert!((0.0..=100.0).contains(&entry.rain_chance_pct));
            assert!(entry.wind_kmh >= 0.0);
        }
    }
}
