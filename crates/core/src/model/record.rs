use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

use crate::level::Level;
use crate::model::metadata::Metadata;

/// Keys owned by the record itself; fields with these names are dropped.
pub const RESERVED_KEYS: [&str; 3] = ["level", "time", "msg"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    pub level: Level,
    #[serde(serialize_with = "serialize_time")]
    pub time: DateTime<Utc>,
    pub msg: String,
    #[serde(flatten)]
    pub fields: Metadata,
}

impl LogRecord {
    pub fn new(level: Level, msg: impl Into<String>) -> Self {
        Self {
            level,
            time: Utc::now(),
            msg: msg.into(),
            fields: Metadata::new(),
        }
    }

    /// Builds a record from ambient context and call-site metadata.
    ///
    /// Later sources win on key collisions: context, then metadata, then the
    /// reserved record keys.
    pub fn merged(
        level: Level,
        msg: impl Into<String>,
        context: Option<&Metadata>,
        metadata: Option<&Metadata>,
    ) -> Self {
        let mut fields = context.cloned().unwrap_or_default();
        if let Some(metadata) = metadata {
            fields.extend_from(metadata);
        }
        for key in RESERVED_KEYS {
            fields.remove(key);
        }

        Self {
            fields,
            ..Self::new(level, msg)
        }
    }

    pub fn to_json_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            serde_json::json!({
                "level": self.level,
                "msg": self.msg,
                "serializationError": e.to_string(),
            })
            .to_string()
        })
    }
}

fn serialize_time<S>(time: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&time.to_rfc3339_opts(SecondsFormat::Millis, true))
}
