//! Subscriber setup. In JSON mode every event becomes one line:
//!
//! ```json
//! {"ts":"2026-03-02T09:15:00.120Z","level":"info","type":"access","msg":"GET /ping 200","ctx":{"service":"netdiag","request_id":"4f1c2a9b0d3e"},"data":{"status":200}}
//! ```

use std::collections::HashMap;
use std::fmt::Write as _;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};
use crate::core::Iso8601Timestamp;

/// Install the global tracing subscriber.
pub fn init(config: &LoggingConfig) {
    let filter = EnvFilter::try_new(&config.filter)
        .unwrap_or_else(|_| EnvFilter::new("netdiag=info,access=info"));

    match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .event_format(JsonFormatter::new(config.service_name.clone())),
            )
            .init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
    }
}

/// One JSON object per line, tagged with the service name.
pub struct JsonFormatter {
    service_name: String,
}

impl JsonFormatter {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }
}

impl<S, N> FormatEvent<S, N> for JsonFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();
        let level = level_name(meta.level());
        let log_type = log_type(meta.target(), meta.level());

        let mut visitor = FieldVisitor::new();
        event.record(&mut visitor);

        let msg = if log_type == "access" {
            access_message(&visitor.fields)
        } else {
            visitor.message.clone().unwrap_or_default()
        };

        // request_id moves from data to ctx so entries correlate across types
        let mut data = visitor.fields;
        data.remove("message");
        let request_id = data.remove("request_id");

        let mut ctx = serde_json::Map::new();
        ctx.insert("service".into(), serde_json::json!(&self.service_name));
        if let Some(id) = request_id {
            ctx.insert("request_id".into(), id);
        }

        let entry = serde_json::json!({
            "ts": Iso8601Timestamp::now(),
            "level": level,
            "type": log_type,
            "msg": msg,
            "ctx": ctx,
            "data": data,
        });

        writeln!(
            writer,
            "{}",
            serde_json::to_string(&entry).unwrap_or_default()
        )
    }
}

fn level_name(level: &Level) -> &'static str {
    match *level {
        Level::TRACE | Level::DEBUG => "debug",
        Level::INFO => "info",
        Level::WARN => "warn",
        Level::ERROR => "error",
    }
}

/// Determine log type from target and level.
fn log_type(target: &str, level: &Level) -> &'static str {
    if target == "access" {
        "access"
    } else if *level == Level::ERROR {
        "error"
    } else {
        "app"
    }
}

/// Build "METHOD /path STATUS" for access entries.
fn access_message(fields: &HashMap<String, serde_json::Value>) -> String {
    let method = fields.get("method").and_then(|v| v.as_str()).unwrap_or("?");
    let path = fields.get("path").and_then(|v| v.as_str()).unwrap_or("?");
    let status = fields.get("status").and_then(|v| v.as_u64()).unwrap_or(0);
    format!("{} {} {}", method, path, status)
}

/// Splits an event into its message and structured fields.
#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    fields: HashMap<String, serde_json::Value>,
}

impl FieldVisitor {
    fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, field: &Field, value: serde_json::Value) {
        self.fields.insert(field.name().to_string(), value);
    }
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let rendered = format!("{:?}", value);
        if field.name() == "message" {
            self.message = Some(rendered.trim_matches('"').to_string());
        } else {
            self.insert(field, serde_json::Value::String(rendered));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.insert(field, serde_json::Value::String(value.to_string()));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, value.into());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, value.into());
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, value.into());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, value.into());
    }
}
