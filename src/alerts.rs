use crate::error::ConfigError;
use crate::irrigation::IrrigationEvent;
use crate::notify::NotificationSink;
use crate::rng::DeltaSource;
use crate::sim::weather::{ConcernKind, WeatherConcern};
use heapless::Vec;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Single retention policy for the alert log: a bounded ring of the most
/// recent entries, newest first. The dashboard card's short list is a
/// `recent(n)` projection of the same log.
pub const MAX_ALERTS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSource {
    Irrigation,
    Weather,
    Crops,
    System,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: u64,
    pub title: String,
    pub message: String,
    pub severity: Severity,
    pub source: AlertSource,
    pub timestamp_ms: u64,
    pub resolved: bool,
}

/// Everything a caller supplies when raising an alert; the engine stamps
/// id, timestamp, and the resolved flag.
#[derive(Debug, Clone)]
pub struct AlertTemplate {
    pub title: String,
    pub message: String,
    pub severity: Severity,
    pub source: AlertSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertFilter {
    All,
    Active,
    Resolved,
}

/// Tunables for the periodic random trigger. The observed dashboard
/// constants (20% raise chance, 20% critical escalation) are defaults,
/// not contracts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AlertConfig {
    pub raise_probability: f32,
    pub escalate_probability: f32,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            raise_probability: 0.2,
            escalate_probability: 0.2,
        }
    }
}

impl AlertConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("raise_probability", self.raise_probability),
            ("escalate_probability", self.escalate_probability),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidProbability { name, value });
            }
        }
        Ok(())
    }
}

struct PoolEntry {
    title: &'static str,
    message: &'static str,
    severity: Severity,
    source: AlertSource,
}

// Random-trigger message pool, keyed by source category.
const ALERT_POOL: [PoolEntry; 5] = [
    PoolEntry {
        title: "Temperature Spike",
        message: "Sudden temperature increase detected in greenhouse (4\u{b0}C in 30 minutes).",
        severity: Severity::Warning,
        source: AlertSource::System,
    },
    PoolEntry {
        title: "Pest Activity Detected",
        message: "Increased pest activity detected in Field 1 (Corn). Consider inspection.",
        severity: Severity::Warning,
        source: AlertSource::Crops,
    },
    PoolEntry {
        title: "Battery Low",
        message: "Sensor unit 3 battery at 15%. Replacement recommended within 48 hours.",
        severity: Severity::Info,
        source: AlertSource::System,
    },
    PoolEntry {
        title: "Nitrogen Level Low",
        message: "Nitrogen levels below optimal in Field 4 (Potatoes).",
        severity: Severity::Warning,
        source: AlertSource::Crops,
    },
    PoolEntry {
        title: "Rain Expected",
        message: "Heavy rain expected in the next 6 hours. Irrigation schedule automatically adjusted.",
        severity: Severity::Info,
        source: AlertSource::Weather,
    },
];

/// Owner of the alert log and its transitions.
///
/// The log is newest-first; raising prepends and the oldest entry falls
/// off once the ring is full. Critical alerts additionally go to the
/// notification sink, exactly once, at raise time.
pub struct AlertEngine {
    log: Vec<Alert, MAX_ALERTS>,
    config: AlertConfig,
    next_seq: u16,
    active_concern: Option<ConcernKind>,
}

impl AlertEngine {
    pub fn new(config: AlertConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            log: Vec::new(),
            config,
            next_seq: 0,
            active_concern: None,
        })
    }

    /// Seed the log with the fixed startup alerts (the model is rebuilt
    /// from scratch at every process start; nothing is persisted).
    pub fn seed_initial(&mut self, now_ms: u64, sink: &mut dyn NotificationSink) {
        let minutes = |m: u64| now_ms.saturating_sub(m * 60_000);
        let seeds: [(&str, &str, Severity, AlertSource, u64, bool); 5] = [
            (
                "Low Soil Moisture",
                "Soil moisture in Field 3 (Soybeans) is below critical threshold (27%).",
                Severity::Critical,
                AlertSource::Irrigation,
                minutes(25),
                false,
            ),
            (
                "Irrigation System Alert",
                "Pressure drop detected in Field 2 irrigation system. Possible leak or malfunction.",
                Severity::Warning,
                AlertSource::Irrigation,
                minutes(55),
                false,
            ),
            (
                "Weather Alert",
                "Strong winds expected tomorrow (25-30 km/h). Consider delaying scheduled spraying.",
                Severity::Warning,
                AlertSource::Weather,
                minutes(125),
                false,
            ),
            (
                "Crop Growth",
                "Corn in North Field has reached vegetative stage.",
                Severity::Info,
                AlertSource::Crops,
                minutes(240),
                true,
            ),
            (
                "System Update",
                "Farm monitoring system updated to version 2.1.5.",
                Severity::Info,
                AlertSource::System,
                minutes(360),
                true,
            ),
        ];

        // Oldest first so the log ends up newest-first.
        for (title, message, severity, source, timestamp_ms, resolved) in seeds.iter().rev() {
            let mut alert = self.stamp(
                AlertTemplate {
                    title: (*title).to_string(),
                    message: (*message).to_string(),
                    severity: *severity,
                    source: *source,
                },
                *timestamp_ms,
            );
            alert.resolved = *resolved;
            self.prepend(alert, sink);
        }
    }

    /// Raise an alert: stamp id and timestamp, prepend to the log, and
    /// fan a critical one out to the sink.
    pub fn raise(
        &mut self,
        template: AlertTemplate,
        now_ms: u64,
        sink: &mut dyn NotificationSink,
    ) -> Alert {
        let alert = self.stamp(template, now_ms);
        self.prepend(alert.clone(), sink);
        alert
    }

    fn stamp(&mut self, template: AlertTemplate, now_ms: u64) -> Alert {
        // Tick-derived id with a sequence suffix so two alerts raised in
        // the same tick stay unique.
        let id = (now_ms << 10) | u64::from(self.next_seq & 0x3ff);
        self.next_seq = self.next_seq.wrapping_add(1);

        Alert {
            id,
            title: template.title,
            message: template.message,
            severity: template.severity,
            source: template.source,
            timestamp_ms: now_ms,
            resolved: false,
        }
    }

    fn prepend(&mut self, alert: Alert, sink: &mut dyn NotificationSink) {
        if alert.severity == Severity::Critical {
            sink.notify(&alert);
        }

        if self.log.is_full() {
            self.log.pop();
        }
        // Full log just popped its oldest entry; insert cannot fail.
        let _ = self.log.insert(0, alert);
    }

    /// Mark an alert resolved. Unknown or already-resolved ids degrade
    /// to a reported no-op. Returns the changed alert.
    pub fn resolve(&mut self, id: u64) -> Option<Alert> {
        match self.log.iter_mut().find(|a| a.id == id) {
            Some(alert) if !alert.resolved => {
                alert.resolved = true;
                Some(alert.clone())
            }
            Some(_) => None,
            None => {
                warn!(alert_id = id, "resolve for unknown alert ignored");
                None
            }
        }
    }

    /// Resolve every unresolved alert; returns the ones that changed.
    pub fn resolve_all(&mut self) -> std::vec::Vec<Alert> {
        let mut changed = std::vec::Vec::new();
        for alert in self.log.iter_mut().filter(|a| !a.resolved) {
            alert.resolved = true;
            changed.push(alert.clone());
        }
        changed
    }

    /// Remove an alert from the log entirely. Unknown ids degrade to a
    /// reported no-op. Returns the removed alert.
    pub fn delete(&mut self, id: u64) -> Option<Alert> {
        match self.log.iter().position(|a| a.id == id) {
            Some(index) => Some(self.log.remove(index)),
            None => {
                warn!(alert_id = id, "delete for unknown alert ignored");
                None
            }
        }
    }

    /// Order-preserving projection of the log.
    pub fn by_status(&self, filter: AlertFilter) -> std::vec::Vec<Alert> {
        self.log
            .iter()
            .filter(|a| match filter {
                AlertFilter::All => true,
                AlertFilter::Active => !a.resolved,
                AlertFilter::Resolved => a.resolved,
            })
            .cloned()
            .collect()
    }

    /// The dashboard-card view: the `n` newest entries.
    pub fn recent(&self, n: usize) -> std::vec::Vec<Alert> {
        self.log.iter().take(n).cloned().collect()
    }

    pub fn active_count(&self) -> usize {
        self.log.iter().filter(|a| !a.resolved).count()
    }

    pub fn critical_count(&self) -> usize {
        self.log
            .iter()
            .filter(|a| a.severity == Severity::Critical && !a.resolved)
            .count()
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    /// Periodic random trigger: with the configured probability pick a
    /// template from the pool, with a secondary chance of escalating it
    /// to critical regardless of its nominal severity.
    pub fn maybe_raise_random(
        &mut self,
        rng: &mut dyn DeltaSource,
        now_ms: u64,
        sink: &mut dyn NotificationSink,
    ) -> Option<Alert> {
        if !rng.chance(self.config.raise_probability) {
            return None;
        }

        let entry = &ALERT_POOL[rng.pick(ALERT_POOL.len())];
        let severity = if rng.chance(self.config.escalate_probability) {
            Severity::Critical
        } else {
            entry.severity
        };

        Some(self.raise(
            AlertTemplate {
                title: entry.title.to_string(),
                message: entry.message.to_string(),
                severity,
                source: entry.source,
            },
            now_ms,
            sink,
        ))
    }

    /// Fold the latest weather-concern evaluation into the log: a newly
    /// appearing or re-categorized concern raises one warning, and at
    /// most one derived concern is considered active at a time.
    pub fn update_weather_concern(
        &mut self,
        concern: Option<WeatherConcern>,
        now_ms: u64,
        sink: &mut dyn NotificationSink,
    ) -> Option<Alert> {
        match concern {
            Some(c) if self.active_concern != Some(c.kind) => {
                self.active_concern = Some(c.kind);
                let title = match c.kind {
                    ConcernKind::Heat => "Heat Advisory",
                    ConcernKind::Wind => "Wind Advisory",
                    ConcernKind::Rain => "Rain Advisory",
                };
                Some(self.raise(
                    AlertTemplate {
                        title: title.to_string(),
                        message: c.message.to_string(),
                        severity: Severity::Warning,
                        source: AlertSource::Weather,
                    },
                    now_ms,
                    sink,
                ))
            }
            Some(_) => None,
            None => {
                self.active_concern = None;
                None
            }
        }
    }

    pub fn active_concern(&self) -> Option<ConcernKind> {
        self.active_concern
    }

    /// Translate a controller transition into an informational alert.
    pub fn raise_for_irrigation(
        &mut self,
        event: IrrigationEvent,
        field_name: &str,
        now_ms: u64,
        sink: &mut dyn NotificationSink,
    ) -> Alert {
        let (title, message) = match event {
            IrrigationEvent::AutoStarted { .. } => (
                "Auto-Irrigation Activated",
                format!("Irrigation started in {field_name} due to low moisture levels."),
            ),
            IrrigationEvent::AutoStopped { .. } => (
                "Auto-Irrigation Stopped",
                format!("Irrigation stopped in {field_name} as optimal moisture reached."),
            ),
        };

        self.raise(
            AlertTemplate {
                title: title.to_string(),
                message,
                severity: Severity::Info,
                source: AlertSource::Irrigation,
            },
            now_ms,
            sink,
        )
    }
}
