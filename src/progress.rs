//! Progress reporting for stargazer loads.
//!
//! A load reports a percentage (0 to 100) after every page. Sinks decide
//! what to do with it: drop it, forward it over a channel, or publish it as
//! the current [`LoadingState`].

use crate::models::LoadingState;
use std::sync::Mutex;
use tokio::sync::{mpsc, watch};

pub trait ProgressSink: Send + Sync {
    fn report(&self, percent: f64);
}

/// Ignores every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _percent: f64) {}
}

impl ProgressSink for mpsc::UnboundedSender<f64> {
    fn report(&self, percent: f64) {
        // receiver gone means nobody is watching
        let _ = self.send(percent);
    }
}

impl ProgressSink for watch::Sender<LoadingState> {
    fn report(&self, percent: f64) {
        self.send_replace(LoadingState {
            is_loading: true,
            progress: percent,
        });
    }
}

/// Keeps every reported value, in order.
#[derive(Debug, Default)]
pub struct ProgressRecorder {
    values: Mutex<Vec<f64>>,
}

impl ProgressRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn values(&self) -> Vec<f64> {
        match self.values.lock() {
            Ok(values) => values.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn last(&self) -> Option<f64> {
        self.values().last().copied()
    }
}

impl ProgressSink for ProgressRecorder {
    fn report(&self, percent: f64) {
        match self.values.lock() {
            Ok(mut values) => values.push(percent),
            Err(poisoned) => poisoned.into_inner().push(percent),
        }
    }
}
