use std::fmt;
use std::sync::{Arc, Mutex};

use super::DeviceError;

/// What to do with errors the graphics API reports at run time.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DebugMode {
    /// Log every message and keep rendering.
    Log,
    /// Log every message; the first error aborts the frame loop.
    Strict,
}

impl Default for DebugMode {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            DebugMode::Strict
        } else {
            DebugMode::Log
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub enum DebugSeverity {
    Info,
    Warning,
    Error,
}

/// A `(severity, message)` pair delivered by the API's debug callback.
#[derive(Debug, Clone, PartialEq)]
pub struct DebugMessage {
    pub severity: DebugSeverity,
    pub message: String,
}

impl DebugMessage {
    pub fn new(severity: DebugSeverity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }

    pub(crate) fn from_wgpu(err: &wgpu::Error) -> Self {
        let severity = match err {
            wgpu::Error::OutOfMemory { .. } | wgpu::Error::Validation { .. } => {
                DebugSeverity::Error
            }
            _ => DebugSeverity::Warning,
        };
        Self::new(severity, err.to_string())
    }
}

impl fmt::Display for DebugMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.severity, self.message)
    }
}

/// Queue shared between the API callback and the render thread.
///
/// The callback may fire from inside any device call; messages are handled
/// later, on the render thread, by [`report`].
#[derive(Debug, Clone, Default)]
pub struct DebugChannel {
    queue: Arc<Mutex<Vec<DebugMessage>>>,
}

impl DebugChannel {
    pub fn push(&self, message: DebugMessage) {
        match self.queue.lock() {
            Ok(mut q) => q.push(message),
            Err(poisoned) => poisoned.into_inner().push(message),
        }
    }

    pub fn drain(&self) -> Vec<DebugMessage> {
        match self.queue.lock() {
            Ok(mut q) => std::mem::take(&mut *q),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

/// Logs drained messages and applies `mode`.
///
/// In strict mode the first error-severity message is returned as an error
/// after all messages have been logged.
pub fn report(messages: Vec<DebugMessage>, mode: DebugMode) -> Result<(), DeviceError> {
    let mut fatal = None;

    for msg in messages {
        match msg.severity {
            DebugSeverity::Error => log::error!(target: "prism::gpu", "{}", msg.message),
            DebugSeverity::Warning => log::warn!(target: "prism::gpu", "{}", msg.message),
            DebugSeverity::Info => log::info!(target: "prism::gpu", "{}", msg.message),
        }

        if mode == DebugMode::Strict && msg.severity == DebugSeverity::Error && fatal.is_none() {
            fatal = Some(msg);
        }
    }

    match fatal {
        Some(msg) => Err(DeviceError::Debug(msg)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msgs() -> Vec<DebugMessage> {
        vec![
            DebugMessage::new(DebugSeverity::Warning, "slow path"),
            DebugMessage::new(DebugSeverity::Error, "first"),
            DebugMessage::new(DebugSeverity::Error, "second"),
        ]
    }

    #[test]
    fn log_mode_never_fails() {
        assert!(report(msgs(), DebugMode::Log).is_ok());
    }

    #[test]
    fn strict_mode_returns_first_error() {
        match report(msgs(), DebugMode::Strict) {
            Err(DeviceError::Debug(m)) => assert_eq!(m.message, "first"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn strict_mode_ignores_warnings() {
        let only_warn = vec![DebugMessage::new(DebugSeverity::Warning, "meh")];
        assert!(report(only_warn, DebugMode::Strict).is_ok());
    }

    #[test]
    fn channel_drain_empties_queue() {
        let ch = DebugChannel::default();
        let sink = ch.clone();
        sink.push(DebugMessage::new(DebugSeverity::Info, "hi"));
        assert_eq!(ch.drain().len(), 1);
        assert!(ch.drain().is_empty());
    }
}
