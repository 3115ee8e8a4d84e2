//! Logical command types shared by both transports.

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use serde_json::Number;

/// A single command argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Number(Number),
    Boolean(bool),
    Mapping(Settings),
}

impl Value {
    /// Build a numeric value from a float. Returns `None` for NaN and infinities.
    pub fn from_f64(value: f64) -> Option<Self> {
        Number::from_f64(value).map(Value::Number)
    }

    /// Interpret a command-line argument.
    ///
    /// Numbers, booleans and JSON objects are taken as typed values; anything
    /// else (including JSON strings, arrays and `null`) is sent as a plain string.
    pub fn parse_cli_arg(arg: &str) -> Self {
        match serde_json::from_str::<serde_json::Value>(arg) {
            Ok(json) => Value::try_from(json).unwrap_or_else(|_| Value::String(arg.to_string())),
            Err(_) => Value::String(arg.to_string()),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(value.into())
    }
}

impl From<Settings> for Value {
    fn from(value: Settings) -> Self {
        Value::Mapping(value)
    }
}

impl TryFrom<serde_json::Value> for Value {
    type Error = String;

    fn try_from(json: serde_json::Value) -> Result<Self, Self::Error> {
        match json {
            serde_json::Value::Bool(b) => Ok(Value::Boolean(b)),
            serde_json::Value::Number(n) => Ok(Value::Number(n)),
            serde_json::Value::String(s) => Ok(Value::String(s)),
            serde_json::Value::Object(map) => {
                let mut settings = Settings::new();
                for (key, value) in map {
                    settings.insert(key, Value::try_from(value)?);
                }
                Ok(Value::Mapping(settings))
            }
            serde_json::Value::Array(_) => Err("arrays are not supported as command arguments".to_string()),
            serde_json::Value::Null => Err("null is not supported as a command argument".to_string()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::String(s) => serializer.serialize_str(s),
            Value::Number(n) => n.serialize(serializer),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::Mapping(settings) => settings.serialize(serializer),
        }
    }
}

/// Ordered key/value configuration object, e.g. hardware settings.
///
/// Keys keep their insertion order so the serialized text matches what the
/// operator wrote. Inserting an existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    entries: Vec<(String, Value)>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl Serialize for Settings {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// A logical command: a name plus ordered positional arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub name: String,
    pub args: Vec<Value>,
}

impl Command {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Append a positional argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Convert the command to the structured web payload. Arguments keep their native types.
    pub fn to_payload(&self) -> CommandPayload<'_> {
        CommandPayload {
            command: &self.name,
            args: &self.args,
        }
    }
}

/// JSON body for the device's `/run_command` endpoint.
#[derive(Debug, Serialize)]
pub struct CommandPayload<'a> {
    pub command: &'a str,
    #[serde(skip_serializing_if = "<[Value]>::is_empty")]
    pub args: &'a [Value],
}

/// Decoded reply from the device.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Message captured from a serial `RESPONSE: [==>...<==]` frame.
    Text(String),
    /// JSON body returned by the web server, or an `{"error": ...}` object.
    Json(serde_json::Value),
}

impl std::fmt::Display for Reply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reply::Text(text) => write!(f, "{}", text),
            Reply::Json(json) => write!(f, "{}", json),
        }
    }
}
