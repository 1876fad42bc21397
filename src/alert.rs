//! User-facing alert accumulation.
//!
//! Alert display is external; this layer only collects the alerts emitted by
//! failed or completed operations so the UI can drain and render them.

use serde::{Deserialize, Serialize};

use crate::action::Action;

/// Alert severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// A completed operation.
    Success,
    /// A failed operation.
    Danger,
}

/// A single user-visible, non-blocking alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    /// Severity.
    pub kind: AlertKind,
    /// Message text.
    pub message: String,
}

impl Alert {
    /// A success alert.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: AlertKind::Success,
            message: message.into(),
        }
    }

    /// A danger alert.
    #[must_use]
    pub fn danger(message: impl Into<String>) -> Self {
        Self {
            kind: AlertKind::Danger,
            message: message.into(),
        }
    }
}

/// Accumulated alerts awaiting display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertState {
    alerts: Vec<Alert>,
}

impl AlertState {
    /// Applies an alert-relevant action; everything else is ignored.
    pub fn apply(&mut self, action: &Action) {
        if let Action::AddAlert(payload) = action {
            self.alerts.push(Alert {
                kind: payload.kind,
                message: payload.message.clone(),
            });
        }
    }

    /// The pending alerts, oldest first.
    #[must_use]
    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    /// Removes and returns all pending alerts.
    pub fn drain(&mut self) -> Vec<Alert> {
        std::mem::take(&mut self.alerts)
    }
}
