use crate::error::PuzzleError;
use crate::geometry::{Bounds, DEFAULT_INSET_X, DEFAULT_INSET_Y, Insets};

const WIDTH_DEFAULT: f32 = 400.0;
const HEIGHT_DEFAULT: f32 = 800.0;
const START_LEVEL_DEFAULT: u32 = 1;
const HOST_DEFAULT: &str = "127.0.0.1";
const PORT_DEFAULT: u16 = 5252;

/// Defaults for every front end, read from `UNTANGLE_*` environment
/// variables. Missing or unparsable values fall back to the built-in ones.
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub width: f32,
    pub height: f32,
    pub insets: Insets,
    pub start_level: u32,
    pub host: String,
    pub port: u16,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

impl GameConfig {
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let parse_or = |key: &str, default: f32| {
            lookup(key)
                .and_then(|value| value.trim().parse().ok())
                .unwrap_or(default)
        };

        Self {
            width: parse_or("UNTANGLE_WIDTH", WIDTH_DEFAULT),
            height: parse_or("UNTANGLE_HEIGHT", HEIGHT_DEFAULT),
            insets: Insets {
                x: parse_or("UNTANGLE_INSET_X", DEFAULT_INSET_X),
                y: parse_or("UNTANGLE_INSET_Y", DEFAULT_INSET_Y),
            },
            start_level: lookup("UNTANGLE_START_LEVEL")
                .and_then(|value| value.trim().parse().ok())
                .filter(|level| *level >= 1)
                .unwrap_or(START_LEVEL_DEFAULT),
            host: lookup("UNTANGLE_HOST").unwrap_or_else(|| HOST_DEFAULT.to_string()),
            port: lookup("UNTANGLE_PORT")
                .and_then(|value| value.trim().parse().ok())
                .unwrap_or(PORT_DEFAULT),
        }
    }

    /// Builds bounds from the configured size, letting flags override it.
    pub fn bounds(&self, width: Option<f32>, height: Option<f32>) -> Result<Bounds, PuzzleError> {
        Bounds::with_insets(
            width.unwrap_or(self.width),
            height.unwrap_or(self.height),
            self.insets,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> GameConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        GameConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn falls_back_to_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.width, 400.0);
        assert_eq!(config.height, 800.0);
        assert_eq!(config.insets, Insets::default());
        assert_eq!(config.start_level, 1);
        assert_eq!(config.port, 5252);
    }

    #[test]
    fn reads_overrides_and_ignores_garbage() {
        let config = config_from(&[
            ("UNTANGLE_WIDTH", "1024"),
            ("UNTANGLE_HEIGHT", "tall"),
            ("UNTANGLE_START_LEVEL", "0"),
            ("UNTANGLE_PORT", "8080"),
            ("UNTANGLE_INSET_X", "0"),
        ]);
        assert_eq!(config.width, 1024.0);
        assert_eq!(config.height, 800.0);
        assert_eq!(config.start_level, 1);
        assert_eq!(config.port, 8080);
        assert_eq!(config.insets.x, 0.0);
    }

    #[test]
    fn flag_overrides_win_and_are_validated() {
        let config = config_from(&[]);
        let bounds = config.bounds(Some(600.0), None).unwrap();
        assert_eq!(bounds.width(), 600.0);
        assert_eq!(bounds.height(), 800.0);
        assert!(config.bounds(Some(30.0), None).is_err());
    }
}
