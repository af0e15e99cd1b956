//! Injected structured event sink.
//!
//! Every pipeline component reports through an [`EventSink`] passed in by the
//! caller: one event per source outcome, plus pipeline start/end and policy
//! decisions. The sink is observability only — pipeline behavior must be
//! identical under [`NullSink`].

/// Structured (event-name, key/value fields) sink.
pub trait EventSink: Send + Sync {
    /// Record one event. Implementations must not panic or block the caller
    /// for long; they are invoked on the request path.
    fn event(&self, name: &str, fields: &[(&str, String)]);
}

/// Sink that forwards events to the `log` facade as `key=value` lines.
///
/// Events whose name ends in `.fail` are logged at `warn`, the rest at
/// `info`.
pub struct LogSink;

impl EventSink for LogSink {
    fn event(&self, name: &str, fields: &[(&str, String)]) {
        let kv: Vec<String> = fields.iter().map(|(k, v)| format!("{k}={v}")).collect();
        let kv = kv.join(" ");
        if name.ends_with(".fail") {
            log::warn!("{name} {kv}");
        } else {
            log::info!("{name} {kv}");
        }
    }
}

/// Sink that discards every event.
pub struct NullSink;

impl EventSink for NullSink {
    fn event(&self, _name: &str, _fields: &[(&str, String)]) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sinks_accept_events() {
        // Neither sink may panic on arbitrary input.
        for sink in [&LogSink as &dyn EventSink, &NullSink] {
            sink.event("source.ok", &[("id", "drand".to_string())]);
            sink.event("source.fail", &[]);
            sink.event("", &[("", String::new())]);
        }
    }
}
