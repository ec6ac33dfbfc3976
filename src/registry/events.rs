use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Callback invoked when its event fires.
pub type ListenerFn = Arc<dyn Fn(&Value) + Send + Sync>;

/// One registered listener on an event channel.
///
/// The optional `id` is the display name documentation reports; listeners
/// registered without one are anonymous.
pub struct EventListener {
    pub id: Option<String>,
    callback: ListenerFn,
}

impl fmt::Debug for EventListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventListener")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// A named event channel and its listeners, in registration order.
#[derive(Debug)]
pub struct EventChannel {
    pub name: String,
    pub listeners: Vec<EventListener>,
}

/// The host's event registry.
///
/// Channels are kept in registration order, and listeners within a channel in
/// the order they subscribed. That order is semantic: it is the order `emit`
/// invokes them in, and documentation must report it unchanged.
#[derive(Debug, Default)]
pub struct EventRegistry {
    channels: Vec<EventChannel>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a channel. Declaring an existing channel is a no-op.
    pub fn register(&mut self, name: &str) {
        if !self.channels.iter().any(|c| c.name == name) {
            self.channels.push(EventChannel {
                name: name.to_string(),
                listeners: Vec::new(),
            });
        }
    }

    /// Subscribe a listener, declaring the channel if needed.
    pub fn on(&mut self, name: &str, id: Option<&str>, callback: impl Fn(&Value) + Send + Sync + 'static) {
        self.register(name);
        if let Some(channel) = self.channels.iter_mut().find(|c| c.name == name) {
            channel.listeners.push(EventListener {
                id: id.map(str::to_string),
                callback: Arc::new(callback),
            });
        }
    }

    /// Invoke every listener of `name` in registration order.
    ///
    /// Returns the number of listeners invoked; an unknown channel invokes
    /// none.
    pub fn emit(&self, name: &str, payload: &Value) -> usize {
        let Some(channel) = self.channels.iter().find(|c| c.name == name) else {
            return 0;
        };
        for listener in &channel.listeners {
            (listener.callback)(payload);
        }
        debug!(event = name, listeners = channel.listeners.len(), "event emitted");
        channel.listeners.len()
    }

    /// All channels in registration order, including listener-less ones.
    pub fn channels(&self) -> &[EventChannel] {
        &self.channels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_emit_invokes_in_registration_order() {
        static ORDER: AtomicUsize = AtomicUsize::new(0);
        let mut registry = EventRegistry::new();
        registry.on("tick", Some("first"), |_| {
            // first listener claims slot 0
            assert_eq!(ORDER.fetch_add(1, Ordering::SeqCst), 0);
        });
        registry.on("tick", Some("second"), |_| {
            assert_eq!(ORDER.fetch_add(1, Ordering::SeqCst), 1);
        });
        assert_eq!(registry.emit("tick", &json!({})), 2);
    }

    #[test]
    fn test_emit_unknown_channel() {
        let registry = EventRegistry::new();
        assert_eq!(registry.emit("missing", &json!(null)), 0);
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut registry = EventRegistry::new();
        registry.register("boot");
        registry.register("boot");
        assert_eq!(registry.channels().len(), 1);
    }
}
