// # Notifier Trait
//
// Defines the interface for delivering alert text.
//
// ## Implementations
//
// - Telegram Bot API: `overland-notify-telegram` crate
// - Log-only: `LogNotifier` below

use async_trait::async_trait;

/// Trait for notifier implementations
///
/// A notifier delivers one payload per call. It must report rejection by
/// the transport as `Error::Delivery`: the engine relies on that error to
/// keep the old snapshot so the same change is announced again next run.
///
/// Notifiers never touch the snapshot store and never retry.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `text` to the configured destination
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Delivery accepted by the transport
    /// - `Err(Error::Delivery)`: Delivery failed or was rejected
    async fn send(&self, text: &str) -> Result<(), crate::Error>;

    /// Get the notifier name (for logging/debugging)
    fn notifier_name(&self) -> &'static str;
}

/// Notifier that writes the alert to the log instead of sending it
///
/// Used for local runs without credentials.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, text: &str) -> Result<(), crate::Error> {
        tracing::info!("Alert (log notifier):\n{}", text);
        Ok(())
    }

    fn notifier_name(&self) -> &'static str {
        "log"
    }
}
