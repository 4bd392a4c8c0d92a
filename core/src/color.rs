use serde_json::Value;

use crate::config::ConfigError;

/// An RGBA color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    /// Creates a color from float components. Values are not clamped.
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a color from `0..=255` byte components.
    pub fn from_bytes(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: a as f32 / 255.0,
        }
    }

    /// Parses a color from a config array of `0..=255` numbers.
    ///
    /// Accepts `[r, g, b]` (alpha defaults to 255) or `[r, g, b, a]`.
    /// `key` is the field name used in error messages.
    pub fn from_config(value: &Value, key: &str) -> Result<Self, ConfigError> {
        let items = value.as_array().ok_or_else(|| ConfigError::Type {
            key: key.to_owned(),
            expected: "an array of color components",
        })?;
        if items.len() != 3 && items.len() != 4 {
            return Err(ConfigError::Type {
                key: key.to_owned(),
                expected: "3 or 4 color components",
            });
        }
        let mut parts = [255u8; 4];
        for (i, item) in items.iter().enumerate() {
            let n = item.as_u64().ok_or_else(|| ConfigError::Type {
                key: format!("{key}[{i}]"),
                expected: "an integer in 0..=255",
            })?;
            if n > 255 {
                return Err(ConfigError::Type {
                    key: format!("{key}[{i}]"),
                    expected: "an integer in 0..=255",
                });
            }
            parts[i] = n as u8;
        }
        Ok(Self::from_bytes(parts[0], parts[1], parts[2], parts[3]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn from_bytes_normalizes() {
        let c = Color::from_bytes(255, 0, 51, 255);
        assert_eq!(c.r, 1.0);
        assert_eq!(c.g, 0.0);
        assert!((c.b - 0.2).abs() < 1e-6);
        assert_eq!(c.a, 1.0);
    }

    #[test]
    fn config_array_with_alpha() {
        let v = json!([255, 128, 0, 64]);
        let c = Color::from_config(&v, "background-color").unwrap();
        assert_eq!(c, Color::from_bytes(255, 128, 0, 64));
    }

    #[test]
    fn config_array_without_alpha_defaults_opaque() {
        let v = json!([10, 20, 30]);
        let c = Color::from_config(&v, "color").unwrap();
        assert_eq!(c.a, 1.0);
    }

    #[rstest]
    #[case::too_few(json!([10, 20]))]
    #[case::too_many(json!([1, 2, 3, 4, 5]))]
    #[case::out_of_range(json!([10, 20, 300]))]
    #[case::not_numbers(json!(["r", "g", "b"]))]
    #[case::not_an_array(json!("red"))]
    fn config_rejects_malformed_documents(#[case] value: Value) {
        assert!(Color::from_config(&value, "color").is_err());
    }

    #[test]
    fn the_error_names_the_bad_component() {
        let err = Color::from_config(&json!([10, 20, 300]), "color").unwrap_err();
        assert!(err.to_string().contains("color[2]"));
    }
}
