//! Typed field access over `serde_json` documents.
//!
//! World, object, and component definitions arrive as untyped JSON trees.
//! [`ConfigExt`] layers key-aware accessors on top of [`serde_json::Value`]
//! so init code can pull fields with errors that name the offending key.

use glam::Vec2;
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors produced while reading configuration fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The field is absent from the document.
    #[error("missing config field `{key}`")]
    Missing { key: String },
    /// The field exists but holds the wrong kind of value.
    #[error("config field `{key}` is not {expected}")]
    Type { key: String, expected: &'static str },
}

/// Key-aware typed accessors for JSON configuration objects.
///
/// The `*_field` methods fail with [`ConfigError`]; the `*_or` variants
/// substitute a default when the field is absent, but still fail on a
/// present field of the wrong type.
pub trait ConfigExt {
    fn str_field(&self, key: &str) -> Result<&str, ConfigError>;
    fn i64_field(&self, key: &str) -> Result<i64, ConfigError>;
    fn f64_field(&self, key: &str) -> Result<f64, ConfigError>;
    fn f32_field(&self, key: &str) -> Result<f32, ConfigError>;
    fn bool_field(&self, key: &str) -> Result<bool, ConfigError>;
    fn array_field(&self, key: &str) -> Result<&Vec<Value>, ConfigError>;
    fn object_field(&self, key: &str) -> Result<&Map<String, Value>, ConfigError>;
    /// Reads a `{"x": .., "y": ..}` object as a [`Vec2`].
    fn vec2_field(&self, key: &str) -> Result<Vec2, ConfigError>;

    fn str_or<'a>(&'a self, key: &str, default: &'a str) -> Result<&'a str, ConfigError>;
    fn i64_or(&self, key: &str, default: i64) -> Result<i64, ConfigError>;
    fn f64_or(&self, key: &str, default: f64) -> Result<f64, ConfigError>;
    fn f32_or(&self, key: &str, default: f32) -> Result<f32, ConfigError>;
    fn bool_or(&self, key: &str, default: bool) -> Result<bool, ConfigError>;
    fn vec2_or(&self, key: &str, default: Vec2) -> Result<Vec2, ConfigError>;
}

fn field<'a>(value: &'a Value, key: &str) -> Result<&'a Value, ConfigError> {
    value.get(key).ok_or_else(|| ConfigError::Missing {
        key: key.to_owned(),
    })
}

fn number(value: &Value, key: &str) -> Result<f64, ConfigError> {
    value.as_f64().ok_or_else(|| ConfigError::Type {
        key: key.to_owned(),
        expected: "a number",
    })
}

impl ConfigExt for Value {
    fn str_field(&self, key: &str) -> Result<&str, ConfigError> {
        field(self, key)?.as_str().ok_or_else(|| ConfigError::Type {
            key: key.to_owned(),
            expected: "a string",
        })
    }

    fn i64_field(&self, key: &str) -> Result<i64, ConfigError> {
        field(self, key)?.as_i64().ok_or_else(|| ConfigError::Type {
            key: key.to_owned(),
            expected: "an integer",
        })
    }

    fn f64_field(&self, key: &str) -> Result<f64, ConfigError> {
        number(field(self, key)?, key)
    }

    fn f32_field(&self, key: &str) -> Result<f32, ConfigError> {
        Ok(number(field(self, key)?, key)? as f32)
    }

    fn bool_field(&self, key: &str) -> Result<bool, ConfigError> {
        field(self, key)?
            .as_bool()
            .ok_or_else(|| ConfigError::Type {
                key: key.to_owned(),
                expected: "a boolean",
            })
    }

    fn array_field(&self, key: &str) -> Result<&Vec<Value>, ConfigError> {
        field(self, key)?
            .as_array()
            .ok_or_else(|| ConfigError::Type {
                key: key.to_owned(),
                expected: "an array",
            })
    }

    fn object_field(&self, key: &str) -> Result<&Map<String, Value>, ConfigError> {
        field(self, key)?
            .as_object()
            .ok_or_else(|| ConfigError::Type {
                key: key.to_owned(),
                expected: "an object",
            })
    }

    fn vec2_field(&self, key: &str) -> Result<Vec2, ConfigError> {
        let obj = field(self, key)?;
        if !obj.is_object() {
            return Err(ConfigError::Type {
                key: key.to_owned(),
                expected: "an object with `x` and `y`",
            });
        }
        let axis = |name: &str| -> Result<f64, ConfigError> {
            let sub = format!("{key}.{name}");
            let v = obj
                .get(name)
                .ok_or_else(|| ConfigError::Missing { key: sub.clone() })?;
            number(v, &sub)
        };
        Ok(Vec2::new(axis("x")? as f32, axis("y")? as f32))
    }

    fn str_or<'a>(&'a self, key: &str, default: &'a str) -> Result<&'a str, ConfigError> {
        match self.get(key) {
            None => Ok(default),
            Some(_) => self.str_field(key),
        }
    }

    fn i64_or(&self, key: &str, default: i64) -> Result<i64, ConfigError> {
        match self.get(key) {
            None => Ok(default),
            Some(_) => self.i64_field(key),
        }
    }

    fn f64_or(&self, key: &str, default: f64) -> Result<f64, ConfigError> {
        match self.get(key) {
            None => Ok(default),
            Some(_) => self.f64_field(key),
        }
    }

    fn f32_or(&self, key: &str, default: f32) -> Result<f32, ConfigError> {
        match self.get(key) {
            None => Ok(default),
            Some(_) => self.f32_field(key),
        }
    }

    fn bool_or(&self, key: &str, default: bool) -> Result<bool, ConfigError> {
        match self.get(key) {
            None => Ok(default),
            Some(_) => self.bool_field(key),
        }
    }

    fn vec2_or(&self, key: &str, default: Vec2) -> Result<Vec2, ConfigError> {
        match self.get(key) {
            None => Ok(default),
            Some(_) => self.vec2_field(key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_present_fields() {
        let doc = json!({
            "name": "player",
            "z-order": 3,
            "rotate": 0.5,
            "visible": true,
            "position": {"x": 1.0, "y": -2.0},
        });
        assert_eq!(doc.str_field("name").unwrap(), "player");
        assert_eq!(doc.i64_field("z-order").unwrap(), 3);
        assert_eq!(doc.f64_field("rotate").unwrap(), 0.5);
        assert_eq!(doc.f32_field("rotate").unwrap(), 0.5);
        assert!(doc.bool_field("visible").unwrap());
        assert_eq!(doc.vec2_field("position").unwrap(), Vec2::new(1.0, -2.0));
    }

    #[test]
    fn missing_field_names_key() {
        let doc = json!({});
        let err = doc.str_field("type").unwrap_err();
        assert_eq!(
            err,
            ConfigError::Missing {
                key: "type".to_owned()
            }
        );
    }

    #[test]
    fn wrong_type_names_key() {
        let doc = json!({"scale": 7});
        let err = doc.vec2_field("scale").unwrap_err();
        assert!(err.to_string().contains("`scale`"));
    }

    #[test]
    fn vec2_missing_axis() {
        let doc = json!({"position": {"x": 1.0}});
        let err = doc.vec2_field("position").unwrap_err();
        assert!(err.to_string().contains("position.y"));
    }

    #[test]
    fn defaults_apply_only_when_absent() {
        let doc = json!({"loop": false});
        assert!(!doc.bool_or("loop", true).unwrap());
        assert!(doc.bool_or("auto-play", true).unwrap());
        // Present but mistyped is still an error
        let doc = json!({"loop": "yes"});
        assert!(doc.bool_or("loop", true).is_err());
    }

    #[test]
    fn integer_accepts_json_integers_only() {
        let doc = json!({"z": 1.5});
        assert!(doc.i64_field("z").is_err());
    }
}
