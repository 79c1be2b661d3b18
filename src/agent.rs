use crate::alerts::{Alert, AlertEngine, AlertConfig, AlertFilter, Severity};
use crate::error::ConfigError;
use crate::irrigation::{IrrigationConfig, IrrigationController, IrrigationEvent};
use crate::notify::{Channel, NotificationSettings, NotificationSink};
use crate::rng::DeltaSource;
use crate::scheduler::{SchedulerStats, TaskHandle, TickScheduler};
use crate::sim::environment::{EnvironmentSimulator, ReadingsSnapshot};
use crate::sim::fields::{FieldId, FieldSimulator, FieldsSnapshot, IrrigationState};
use crate::sim::weather::{ConcernKind, WeatherSimulator, WeatherSnapshot};
use crate::sim::Simulator;
use heapless::Vec;
use serde::{Deserialize, Serialize};

const MAX_PENDING_EVENTS: usize = 32;

/// Intervals and tunables for a whole agent, one knob per periodic task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FarmConfig {
    pub sensor_interval_ms: u64,
    pub field_interval_ms: u64,
    pub weather_interval_ms: u64,
    pub alert_interval_ms: u64,
    pub start_hour: u8,
    pub irrigation: IrrigationConfig,
    pub alerts: AlertConfig,
}

impl Default for FarmConfig {
    fn default() -> Self {
        Self {
            sensor_interval_ms: 3_000,
            field_interval_ms: 2_000,
            weather_interval_ms: 30_000,
            alert_interval_ms: 40_000,
            start_hour: 6,
            irrigation: IrrigationConfig::default(),
            alerts: AlertConfig::default(),
        }
    }
}

impl FarmConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for interval in [
            self.sensor_interval_ms,
            self.field_interval_ms,
            self.weather_interval_ms,
            self.alert_interval_ms,
        ] {
            if interval == 0 {
                return Err(ConfigError::InvalidInterval);
            }
        }
        self.irrigation.validate()?;
        self.alerts.validate()?;
        Ok(())
    }
}

/// State change pushed out of the core, in the order it happened.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum FarmEvent {
    ReadingsUpdated {
        readings: ReadingsSnapshot,
    },
    FieldStateChanged {
        field_id: FieldId,
        state: IrrigationState,
        moisture_pct: f32,
    },
    AlertRaised {
        alert: Alert,
    },
    AlertChanged {
        alert: Alert,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct FarmStatus {
    pub running: bool,
    pub now_ms: u64,
    pub auto_mode: bool,
    pub active_alerts: usize,
    pub critical_alerts: usize,
    pub ticks: u32,
}

/// One line of periodic output: everything a dashboard needs to redraw.
#[derive(Debug, Clone, Serialize)]
pub struct TelemetryFrame {
    pub now_ms: u64,
    pub auto_mode: bool,
    pub readings: ReadingsSnapshot,
    pub fields: FieldsSnapshot,
    pub recent_alerts: std::vec::Vec<Alert>,
    pub active_alerts: usize,
}

#[derive(Debug, Clone, Copy)]
struct TickHandles {
    sensors: TaskHandle,
    fields: TaskHandle,
    weather: TaskHandle,
    alerts: TaskHandle,
}

/// Single owner of the whole simulation.
///
/// The agent wires the simulators, the irrigation controller, and the
/// alert engine to the tick scheduler, and is the only place state is
/// mutated. Callers drive it with [`FarmAgent::advance`] and drain the
/// resulting events; nothing here spawns threads or keeps wall-clock
/// time of its own.
pub struct FarmAgent {
    config: FarmConfig,

    scheduler: TickScheduler,
    rng: Box<dyn DeltaSource>,
    sink: Box<dyn NotificationSink>,

    environment: EnvironmentSimulator,
    fields: FieldSimulator,
    weather: WeatherSimulator,
    controller: IrrigationController,
    alerts: AlertEngine,
    settings: NotificationSettings,

    handles: Option<TickHandles>,
    events: Vec<FarmEvent, MAX_PENDING_EVENTS>,

    running: bool,
    seeded: bool,
    now_ms: u64,
    ticks: u32,
}

impl FarmAgent {
    pub fn new(
        config: FarmConfig,
        mut rng: Box<dyn DeltaSource>,
        sink: Box<dyn NotificationSink>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let controller = IrrigationController::new(config.irrigation)?;
        let alerts = AlertEngine::new(config.alerts)?;
        let weather = WeatherSimulator::new(config.start_hour % 24, rng.as_mut());

        Ok(Self {
            config,
            scheduler: TickScheduler::new(),
            rng,
            sink,
            environment: EnvironmentSimulator::new()?,
            fields: FieldSimulator::new(),
            weather,
            controller,
            alerts,
            settings: NotificationSettings::default(),
            handles: None,
            events: Vec::new(),
            running: false,
            seeded: false,
            now_ms: 0,
            ticks: 0,
        })
    }

    /// Register the periodic tasks and mark the agent running. The alert
    /// log gets its fixed startup entries on the first start only.
    pub fn start(&mut self) -> Result<(), ConfigError> {
        if self.running {
            return Ok(());
        }

        if !self.seeded {
            self.alerts.seed_initial(self.now_ms, self.sink.as_mut());
            self.seeded = true;
        }

        self.handles = Some(TickHandles {
            sensors: self.scheduler.schedule(self.config.sensor_interval_ms)?,
            fields: self.scheduler.schedule(self.config.field_interval_ms)?,
            weather: self.scheduler.schedule(self.config.weather_interval_ms)?,
            alerts: self.scheduler.schedule(self.config.alert_interval_ms)?,
        });
        self.running = true;
        Ok(())
    }

    /// Cancel every periodic task. Ticks that were already due but not
    /// yet dispatched are dropped with them.
    pub fn stop(&mut self) {
        self.scheduler.clear();
        self.handles = None;
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Move virtual time forward and run whichever periodic tasks came
    /// due. Dispatch order within one call is fixed (sensors, fields,
    /// weather, alerts) so a tick is deterministic for a given seed.
    pub fn advance(&mut self, now_ms: u64) {
        if !self.running {
            return;
        }

        let handles = match self.handles {
            Some(h) => h,
            None => return,
        };

        let due = self.scheduler.advance(now_ms);
        if now_ms > self.now_ms {
            self.now_ms = now_ms;
        }
        if due.is_empty() {
            return;
        }
        self.ticks = self.ticks.saturating_add(1);

        if due.contains(&handles.sensors) {
            self.tick_sensors();
        }
        if due.contains(&handles.fields) {
            self.tick_fields();
        }
        if due.contains(&handles.weather) {
            self.tick_weather();
        }
        if due.contains(&handles.alerts) {
            self.tick_alerts();
        }
    }

    fn tick_sensors(&mut self) {
        self.environment.tick(self.rng.as_mut());
        let readings = self.environment.snapshot();
        self.push_event(FarmEvent::ReadingsUpdated { readings });
    }

    fn tick_fields(&mut self) {
        // Drift first (by pre-tick irrigation state), then let the
        // controller act on the post-drift moisture.
        self.fields.tick(self.rng.as_mut());

        let transitions = self.controller.evaluate(&mut self.fields);
        for transition in transitions {
            let (field_id, state) = match transition {
                IrrigationEvent::AutoStarted { field_id } => (field_id, IrrigationState::Active),
                IrrigationEvent::AutoStopped { field_id } => (field_id, IrrigationState::Idle),
            };
            let name = self.fields.name(field_id).unwrap_or("Unknown Field");
            let alert =
                self.alerts
                    .raise_for_irrigation(transition, name, self.now_ms, self.sink.as_mut());

            self.push_event(FarmEvent::FieldStateChanged {
                field_id,
                state,
                moisture_pct: self.fields.moisture(field_id).unwrap_or(0.0),
            });
            self.push_event(FarmEvent::AlertRaised { alert });
        }
    }

    fn tick_weather(&mut self) {
        self.weather.tick(self.rng.as_mut());
        let concern = self.weather.concern();
        if let Some(alert) =
            self.alerts
                .update_weather_concern(concern, self.now_ms, self.sink.as_mut())
        {
            self.push_event(FarmEvent::AlertRaised { alert });
        }
    }

    fn tick_alerts(&mut self) {
        if let Some(alert) =
            self.alerts
                .maybe_raise_random(self.rng.as_mut(), self.now_ms, self.sink.as_mut())
        {
            self.push_event(FarmEvent::AlertRaised { alert });
        }
    }

    fn push_event(&mut self, event: FarmEvent) {
        if self.events.is_full() {
            // Oldest event gives way; consumers that fall this far
            // behind resynchronize from a snapshot anyway.
            self.events.remove(0);
        }
        let _ = self.events.push(event);
    }

    /// Take everything emitted since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<FarmEvent, MAX_PENDING_EVENTS> {
        core::mem::take(&mut self.events)
    }

    // Operator commands. Each one is an immediate state change; the
    // periodic tasks pick up the new state on their next tick.

    pub fn set_auto_mode(&mut self, enabled: bool) {
        self.controller.set_auto_mode(enabled);
    }

    pub fn auto_mode(&self) -> bool {
        self.controller.auto_mode()
    }

    /// Manually open a field's valve, bypassing thresholds. Returns
    /// whether the state changed.
    pub fn start_irrigation(&mut self, id: FieldId) -> bool {
        let changed = self.controller.manual_start(&mut self.fields, id);
        if changed {
            self.push_event(FarmEvent::FieldStateChanged {
                field_id: id,
                state: IrrigationState::Active,
                moisture_pct: self.fields.moisture(id).unwrap_or(0.0),
            });
        }
        changed
    }

    /// Manually close a field's valve. Idempotent like `start_irrigation`.
    pub fn stop_irrigation(&mut self, id: FieldId) -> bool {
        let changed = self.controller.manual_stop(&mut self.fields, id);
        if changed {
            self.push_event(FarmEvent::FieldStateChanged {
                field_id: id,
                state: IrrigationState::Idle,
                moisture_pct: self.fields.moisture(id).unwrap_or(0.0),
            });
        }
        changed
    }

    pub fn resolve_alert(&mut self, id: u64) -> bool {
        match self.alerts.resolve(id) {
            Some(alert) => {
                self.push_event(FarmEvent::AlertChanged { alert });
                true
            }
            None => false,
        }
    }

    /// Resolve every active alert; returns how many changed.
    pub fn resolve_all_alerts(&mut self) -> usize {
        let changed = self.alerts.resolve_all();
        let count = changed.len();
        for alert in changed {
            self.push_event(FarmEvent::AlertChanged { alert });
        }
        count
    }

    pub fn delete_alert(&mut self, id: u64) -> bool {
        match self.alerts.delete(id) {
            Some(alert) => {
                self.push_event(FarmEvent::AlertChanged { alert });
                true
            }
            None => false,
        }
    }

    pub fn toggle_channel(&mut self, channel: Channel) {
        self.settings.toggle_channel(channel);
    }

    pub fn toggle_severity(&mut self, severity: Severity) {
        self.settings.toggle_severity(severity);
    }

    pub fn settings(&self) -> &NotificationSettings {
        &self.settings
    }

    // Read-side projections.

    pub fn readings(&self) -> ReadingsSnapshot {
        self.environment.snapshot()
    }

    pub fn fields(&self) -> FieldsSnapshot {
        self.fields.snapshot()
    }

    pub fn weather(&self) -> WeatherSnapshot {
        self.weather.snapshot()
    }

    pub fn alerts(&self, filter: AlertFilter) -> std::vec::Vec<Alert> {
        self.alerts.by_status(filter)
    }

    pub fn recent_alerts(&self, n: usize) -> std::vec::Vec<Alert> {
        self.alerts.recent(n)
    }

    pub fn active_concern(&self) -> Option<ConcernKind> {
        self.alerts.active_concern()
    }

    pub fn status(&self) -> FarmStatus {
        FarmStatus {
            running: self.running,
            now_ms: self.now_ms,
            auto_mode: self.controller.auto_mode(),
            active_alerts: self.alerts.active_count(),
            critical_alerts: self.alerts.critical_count(),
            ticks: self.ticks,
        }
    }

    pub fn telemetry(&self) -> TelemetryFrame {
        TelemetryFrame {
            now_ms: self.now_ms,
            auto_mode: self.controller.auto_mode(),
            readings: self.environment.snapshot(),
            fields: self.fields.snapshot(),
            recent_alerts: self.alerts.recent(6),
            active_alerts: self.alerts.active_count(),
        }
    }

    pub fn scheduler_stats(&self) -> &SchedulerStats {
        self.scheduler.stats()
    }
}
