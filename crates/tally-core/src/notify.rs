//! Budget notification delivery
//!
//! The tracker decides *when* to notify; a `Notifier` decides *how*. Push
//! transports live outside this crate.

use std::sync::Mutex;

use tracing::info;

use crate::error::{Error, Result};
use crate::models::BudgetSignal;

/// Receives budget signals
pub trait Notifier: Send + Sync {
    fn notify(&self, signal: &BudgetSignal) -> Result<()>;
}

/// Writes signals to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, signal: &BudgetSignal) -> Result<()> {
        info!(
            kind = signal.kind.as_str(),
            budget_id = signal.budget_id,
            user_id = %signal.user_id,
            category = %signal.category,
            percentage = signal.percentage,
            "{}: {}",
            signal.title(),
            signal.message()
        );
        Ok(())
    }
}

/// Collects signals in memory
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    signals: Mutex<Vec<BudgetSignal>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signals received so far
    pub fn signals(&self) -> Vec<BudgetSignal> {
        self.signals
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, signal: &BudgetSignal) -> Result<()> {
        self.signals
            .lock()
            .map_err(|_| Error::InvalidData("Failed to acquire notifier lock".into()))?
            .push(signal.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoryTag, Currency, SignalKind};

    fn signal(kind: SignalKind) -> BudgetSignal {
        BudgetSignal {
            kind,
            budget_id: 7,
            user_id: "u1".into(),
            category: CategoryTag::Travel,
            percentage: 120.0,
            overage_minor: 2_000,
            currency: Currency::Inr,
        }
    }

    #[test]
    fn test_memory_notifier_collects() {
        let notifier = MemoryNotifier::new();
        notifier.notify(&signal(SignalKind::Warning)).unwrap();
        notifier.notify(&signal(SignalKind::Exceeded)).unwrap();

        let signals = notifier.signals();
        assert_eq!(signals.len(), 2);
        assert_eq!(signals[1].kind, SignalKind::Exceeded);
    }

    #[test]
    fn test_log_notifier_accepts_signals() {
        assert!(LogNotifier.notify(&signal(SignalKind::Exceeded)).is_ok());
    }
}
