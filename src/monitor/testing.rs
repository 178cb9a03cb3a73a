//! Test doubles shared by the monitor tests

use crate::notify::{DownAlert, Notifier, NotifyError};
use crate::probe::{Transport, TransportError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Transport answering from a per-URL table; unknown URLs get 200
#[derive(Default)]
pub struct ScriptedTransport {
    outcomes: Mutex<HashMap<String, Result<u16, TransportError>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn set(&self, url: &str, outcome: Result<u16, TransportError>) {
        self.outcomes
            .lock()
            .unwrap()
            .insert(url.to_string(), outcome);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &str, _timeout: Duration) -> Result<u16, TransportError> {
        self.calls.lock().unwrap().push(url.to_string());
        self.outcomes
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or(Ok(200))
    }
}

/// Notifier that remembers every alert, optionally failing delivery
#[derive(Default)]
pub struct RecordingNotifier {
    alerts: Mutex<Vec<DownAlert>>,
    fail: AtomicBool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        let notifier = Self::default();
        notifier.fail.store(true, Ordering::SeqCst);
        notifier
    }

    pub fn alerts(&self) -> Vec<DownAlert> {
        self.alerts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify_down(&self, alert: &DownAlert) -> Result<(), NotifyError> {
        self.alerts.lock().unwrap().push(alert.clone());
        if self.fail.load(Ordering::SeqCst) {
            return Err(NotifyError::NotConfigured("delivery disabled".to_string()));
        }
        Ok(())
    }
}
