use chrono::SecondsFormat;
use ctxlog_core::{Level, LogRecord};
use owo_colors::OwoColorize;
use serde_json::Value;

pub fn json_line(record: &LogRecord) -> String {
    record.to_json_line()
}

/// `<time> <LEVEL> <msg> key=value ...` on one line.
pub fn pretty_line(record: &LogRecord, color: bool) -> String {
    let ts = record.time.to_rfc3339_opts(SecondsFormat::Millis, true);
    let label = format!("{:<5}", record.level.label());
    let label = if color {
        colorize(record.level, &label)
    } else {
        label
    };

    let mut line = format!("{ts} {label} {}", single_line(&record.msg));
    for (key, value) in record.fields.iter() {
        line.push(' ');
        line.push_str(key);
        line.push('=');
        line.push_str(&render_value(value));
    }
    line
}

fn colorize(level: Level, label: &str) -> String {
    match level {
        Level::Debug => label.blue().to_string(),
        Level::Info => label.green().to_string(),
        Level::Warn => label.yellow().to_string(),
        Level::Error => label.red().to_string(),
        Level::Fatal => label.bright_red().bold().to_string(),
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) if needs_quotes(s) => format!("{s:?}"),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn needs_quotes(s: &str) -> bool {
    s.is_empty() || s.chars().any(|c| c.is_whitespace() || c == '"' || c == '=')
}

fn single_line(msg: &str) -> String {
    if msg.contains(['\n', '\r']) {
        msg.replace('\r', "\\r").replace('\n', "\\n")
    } else {
        msg.to_string()
    }
}
