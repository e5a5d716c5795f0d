//! Tracing layer that writes one JSON object per event.
//!
//! Output goes to stderr so stdout stays clean for command payloads.

use std::io::{self, Write};
use std::sync::Mutex;

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

use super::events::Level;

/// Correlation fields captured from enclosing spans.
#[derive(Debug, Clone, Default)]
struct SpanContext {
    run_id: Option<String>,
    command: Option<String>,
}

impl Visit for SpanContext {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "run_id" => self.run_id = Some(value.to_string()),
            "command" => self.command = Some(value.to_string()),
            _ => {}
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        match field.name() {
            "run_id" => self.run_id = Some(format!("{:?}", value)),
            "command" => self.command = Some(format!("{:?}", value)),
            _ => {}
        }
    }
}

/// Collects event fields, pulling `message`, `event` and `stage` aside.
#[derive(Default)]
struct EventVisitor {
    message: Option<String>,
    event: Option<String>,
    stage: Option<String>,
    fields: Map<String, Value>,
}

impl EventVisitor {
    fn put_string(&mut self, name: &str, value: String) {
        match name {
            "message" => self.message = Some(value),
            "event" => self.event = Some(value),
            "stage" => self.stage = Some(value),
            _ => {
                self.fields.insert(name.to_string(), Value::String(value));
            }
        }
    }
}

impl Visit for EventVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.put_string(field.name(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.put_string(field.name(), format!("{:?}", value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        // NaN and infinities have no JSON form; keep them as strings.
        let v = serde_json::Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(value.to_string()));
        self.fields.insert(field.name().to_string(), v);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), Value::Bool(value));
    }
}

/// JSONL tracing layer.
pub struct JsonlLayer<W = io::Stderr> {
    writer: Mutex<W>,
}

impl JsonlLayer<io::Stderr> {
    pub fn stderr() -> Self {
        JsonlLayer::new(io::stderr())
    }
}

impl<W: Write> JsonlLayer<W> {
    /// Layer writing to an arbitrary sink.
    pub fn new(writer: W) -> Self {
        JsonlLayer {
            writer: Mutex::new(writer),
        }
    }
}

impl<S, W> Layer<S> for JsonlLayer<W>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: Write + 'static,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let mut span_ctx = SpanContext::default();
        attrs.record(&mut span_ctx);
        if let Some(span) = ctx.span(id) {
            span.extensions_mut().insert(span_ctx);
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let ts = Utc::now();

        let mut run_id = None;
        let mut command = None;
        if let Some(scope) = ctx.event_scope(event) {
            for span in scope {
                if let Some(span_ctx) = span.extensions().get::<SpanContext>() {
                    if run_id.is_none() {
                        run_id.clone_from(&span_ctx.run_id);
                    }
                    if command.is_none() {
                        command.clone_from(&span_ctx.command);
                    }
                }
            }
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let level: Level = (*event.metadata().level()).into();
        let event_name = visitor
            .event
            .unwrap_or_else(|| event.metadata().target().to_string());

        let mut obj = Map::new();
        obj.insert("ts".to_string(), Value::String(ts.to_rfc3339()));
        obj.insert("level".to_string(), serde_json::json!(level));
        obj.insert("event".to_string(), Value::String(event_name));
        if let Some(id) = run_id {
            obj.insert("run_id".to_string(), Value::String(id));
        }
        if let Some(cmd) = command {
            obj.insert("command".to_string(), Value::String(cmd));
        }
        if let Some(stage) = visitor.stage {
            obj.insert("stage".to_string(), Value::String(stage));
        }
        if let Some(msg) = visitor.message {
            obj.insert("message".to_string(), Value::String(msg));
        }
        if !visitor.fields.is_empty() {
            obj.insert("fields".to_string(), Value::Object(visitor.fields));
        }

        let line = Value::Object(obj).to_string();
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tracing_subscriber::layer::SubscriberExt;

    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture(f: impl FnOnce()) -> Vec<Value> {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let layer = JsonlLayer::new(SharedBuf(buffer.clone()));
        let subscriber = tracing_subscriber::registry().with(layer);
        tracing::subscriber::with_default(subscriber, f);

        let bytes = buffer.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_event_field_becomes_top_level_name() {
        let lines = capture(|| {
            tracing::info!(event = "engine.updated", stage = "ingest", wins = 3u64, "updated");
        });
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["event"], "engine.updated");
        assert_eq!(lines[0]["stage"], "ingest");
        assert_eq!(lines[0]["level"], "info");
        assert_eq!(lines[0]["message"], "updated");
        assert_eq!(lines[0]["fields"]["wins"], 3);
        assert!(lines[0]["ts"].is_string());
    }

    #[test]
    fn test_target_used_when_no_event_field() {
        let lines = capture(|| {
            tracing::warn!(target: "custom.target", "careful");
        });
        assert_eq!(lines[0]["event"], "custom.target");
        assert_eq!(lines[0]["level"], "warn");
    }

    #[test]
    fn test_run_id_inherited_from_span() {
        let lines = capture(|| {
            let span = tracing::info_span!("run", run_id = "run-123", command = "invest");
            let _enter = span.enter();
            tracing::debug!(event = "advisor.kelly_computed", fraction = 0.12, "kelly");
        });
        assert_eq!(lines[0]["run_id"], "run-123");
        assert_eq!(lines[0]["command"], "invest");
        assert_eq!(lines[0]["fields"]["fraction"], 0.12);
    }

    #[test]
    fn test_non_finite_float_is_stringified() {
        let lines = capture(|| {
            tracing::info!(growth = f64::NEG_INFINITY, "edge");
        });
        assert_eq!(lines[0]["fields"]["growth"], "-inf");
    }
}
