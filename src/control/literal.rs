//! Rendering of command arguments as literals for the device's text interpreter.
//!
//! The serial link does not carry structured data: the device evaluates a
//! function-call expression such as
//!
//! ```text
//! run_command("create","gpio",{"pin_number": "LED", "value": 0, "start_on_init": True},"test_gpio")
//! ```
//!
//! Mappings are written as JSON objects with `", "` and `": "` separators and
//! non-ASCII (and DEL) escaped as `\uXXXX`, then have their `true`/`false`
//! spelled `True`/`False`. Strings are quoted without escaping.
//!
//! Numbers use serde_json's spelling, so `1e-5` comes out as `0.00001` rather
//! than `1e-05`. The interpreter reads either form as the same value.

use std::io;

use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};

use super::command::{Command, Settings, Value};

/// serde_json formatter producing spaced separators and ASCII-only output.
struct InterpreterFormatter;

impl Formatter for InterpreterFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut units = [0u16; 2];
        for ch in fragment.chars() {
            if ch.is_ascii() && ch != '\x7f' {
                writer.write_all(&[ch as u8])?;
            } else {
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }
}

/// Serialize a mapping to JSON object text using the interpreter's spacing.
pub fn mapping_to_json(settings: &Settings) -> Result<String, serde_json::Error> {
    let mut buffer = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buffer, InterpreterFormatter);
    settings.serialize(&mut serializer)?;
    // The formatter only ever emits ASCII.
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Respell JSON boolean literals as `True`/`False`.
///
/// This is a plain text substitution over the whole input, so it also applies
/// to `true`/`false` occurring inside string values.
pub fn capitalize_booleans(json: &str) -> String {
    json.replace("true", "True").replace("false", "False")
}

/// Render one positional argument.
pub fn format_arg(value: &Value) -> Result<String, serde_json::Error> {
    Ok(match value {
        Value::Mapping(settings) => capitalize_booleans(&mapping_to_json(settings)?),
        Value::String(s) => format!("\"{}\"", s),
        Value::Boolean(true) => "True".to_string(),
        Value::Boolean(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
    })
}

/// Render a whole command as a `run_command(...)` call expression.
pub fn format_call(command: &Command) -> Result<String, serde_json::Error> {
    let mut call = format!("run_command(\"{}\"", command.name);
    for arg in &command.args {
        call.push(',');
        call.push_str(&format_arg(arg)?);
    }
    call.push(')');
    Ok(call)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gpio_settings() -> Settings {
        Settings::new()
            .with("pin_number", "LED")
            .with("mode", "OUT")
            .with("value", 0)
            .with("start_on_init", true)
    }

    #[test]
    fn create_command_matches_interpreter_syntax() {
        let command = Command::new("create").arg("gpio").arg(gpio_settings()).arg("test_gpio");
        assert_eq!(
            format_call(&command).unwrap(),
            r#"run_command("create","gpio",{"pin_number": "LED", "mode": "OUT", "value": 0, "start_on_init": True},"test_gpio")"#
        );
    }

    #[test]
    fn command_without_arguments() {
        assert_eq!(format_call(&Command::new("list_commands")).unwrap(), r#"run_command("list_commands")"#);
    }

    #[test]
    fn mapping_booleans_are_never_lowercase() {
        let settings = Settings::new()
            .with("enabled", true)
            .with("inverted", false)
            .with("nested", Settings::new().with("flag", false));
        let text = format_arg(&Value::Mapping(settings)).unwrap();
        assert_eq!(text, r#"{"enabled": True, "inverted": False, "nested": {"flag": False}}"#);
        assert!(!text.contains("true") && !text.contains("false"));
    }

    #[test]
    fn boolean_rewrite_also_touches_string_contents() {
        let settings = Settings::new().with("label", "untrue");
        assert_eq!(format_arg(&Value::Mapping(settings)).unwrap(), r#"{"label": "unTrue"}"#);
    }

    #[test]
    fn strings_are_quoted_once_without_escaping() {
        assert_eq!(format_arg(&Value::from("LED")).unwrap(), "\"LED\"");
        assert_eq!(format_arg(&Value::from("say \"hi\"")).unwrap(), "\"say \"hi\"\"");
        assert_eq!(format_arg(&Value::from("true")).unwrap(), "\"true\"");
    }

    #[test]
    fn scalars_use_interpreter_spelling() {
        assert_eq!(format_arg(&Value::from(true)).unwrap(), "True");
        assert_eq!(format_arg(&Value::from(false)).unwrap(), "False");
        assert_eq!(format_arg(&Value::from(-12)).unwrap(), "-12");
        assert_eq!(format_arg(&Value::from_f64(0.25).unwrap()).unwrap(), "0.25");
        assert_eq!(format_arg(&Value::from_f64(1.0).unwrap()).unwrap(), "1.0");
    }

    #[test]
    fn non_ascii_is_escaped_inside_mappings() {
        let settings = Settings::new().with("name", "café ♪");
        assert_eq!(mapping_to_json(&settings).unwrap(), r#"{"name": "caf\u00e9 \u266a"}"#);
    }

    #[test]
    fn delete_character_is_escaped_inside_mappings() {
        let settings = Settings::new().with("k", "a\u{7f}b");
        assert_eq!(mapping_to_json(&settings).unwrap(), r#"{"k": "a\u007fb"}"#);
    }

    #[test]
    fn floats_keep_their_value_in_mappings() {
        let settings = Settings::new().with("f", Value::from_f64(1e-5).unwrap());
        let text = mapping_to_json(&settings).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["f"].as_f64(), Some(1e-5));
    }

    #[test]
    fn empty_mapping() {
        assert_eq!(format_arg(&Value::Mapping(Settings::new())).unwrap(), "{}");
    }
}
