use crate::alerts::{Alert, Severity};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Email,
    Push,
    Sms,
}

/// Per-channel and per-severity notification toggles.
///
/// Pure configuration: each flag is independent and the core applies no
/// gating of its own — the presentation layer decides what to deliver
/// where. Defaults mirror the dashboard's initial settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationSettings {
    pub email: bool,
    pub push: bool,
    pub sms: bool,
    pub critical: bool,
    pub warning: bool,
    pub info: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            email: true,
            push: true,
            sms: false,
            critical: true,
            warning: true,
            info: false,
        }
    }
}

impl NotificationSettings {
    pub fn toggle_channel(&mut self, channel: Channel) {
        let flag = match channel {
            Channel::Email => &mut self.email,
            Channel::Push => &mut self.push,
            Channel::Sms => &mut self.sms,
        };
        *flag = !*flag;
    }

    pub fn toggle_severity(&mut self, severity: Severity) {
        let flag = match severity {
            Severity::Critical => &mut self.critical,
            Severity::Warning => &mut self.warning,
            Severity::Info => &mut self.info,
        };
        *flag = !*flag;
    }

    pub fn channel_enabled(&self, channel: Channel) -> bool {
        match channel {
            Channel::Email => self.email,
            Channel::Push => self.push,
            Channel::Sms => self.sms,
        }
    }

    pub fn severity_enabled(&self, severity: Severity) -> bool {
        match severity {
            Severity::Critical => self.critical,
            Severity::Warning => self.warning,
            Severity::Info => self.info,
        }
    }
}

/// Receiving end for critical-alert fan-out.
///
/// The alert engine emits through this seam and never depends on an
/// implementation; the binary plugs in a console renderer, tests plug in
/// a recorder.
pub trait NotificationSink {
    fn notify(&mut self, alert: &Alert);
}

/// Sink that drops everything (headless operation).
#[derive(Debug, Default)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn notify(&mut self, _alert: &Alert) {}
}

/// Sink that records what it was handed, for assertions in tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub delivered: Vec<Alert>,
}

impl NotificationSink for RecordingSink {
    fn notify(&mut self, alert: &Alert) {
        self.delivered.push(alert.clone());
    }
}
