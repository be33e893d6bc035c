use super::buffers::{AllocationPolicy, BufferLimits};
use super::levels::LevelPolicy;
use json::JsonValue;
use std::fs::read_to_string;
use thiserror::Error;

/// Deepest refinement level accepted from a configuration file
pub const MAX_CONFIGURABLE_LEVEL: u8 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("unable to parse config file as JSON: {0}")]
    Json(#[from] json::Error),
    #[error("invalid linearizer configuration: {0}")]
    Format(String),
}

fn format_err(msg: impl Into<String>) -> ConfigError {
    ConfigError::Format(msg.into())
}

/// Tuning constants of the Linearizer and Orderizer
///
/// ## File format
/// Every entry is optional and falls back to its default:
///
/// ```text
/// {
///     "levels": { "max_level": 5, "large_element_fraction": 0.01, "exponent": 0.2 },
///     "allocation": {
///         "min_vertices": 10000, "min_triangles": 10000, "min_edges": 15000,
///         "vertex_multiplier": 6, "triangle_multiplier": 6, "edge_multiplier": 10,
///         "label_extra": 10,
///         "limits": { "vertices": null, "triangles": 500000, "edges": null, "labels": null }
///     }
/// }
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LinearizerConfig {
    pub levels: LevelPolicy,
    pub allocation: AllocationPolicy,
}

impl LinearizerConfig {
    pub fn from_file(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        let file_contents = read_to_string(path.as_ref())?;
        Self::from_json_str(&file_contents)
    }

    pub fn from_json_str(contents: &str) -> Result<Self, ConfigError> {
        let config_json = json::parse(contents)?;
        if !config_json.is_object() {
            return Err(format_err("configuration must be a JSON Object!"));
        }

        let levels = parse_levels(&config_json["levels"])?;
        let allocation = parse_allocation(&config_json["allocation"])?;

        Ok(Self { levels, allocation })
    }
}

fn parse_levels(levels_json: &JsonValue) -> Result<LevelPolicy, ConfigError> {
    let defaults = LevelPolicy::default();

    let max_level = match &levels_json["max_level"] {
        JsonValue::Null => defaults.max_level,
        value => value
            .as_u8()
            .filter(|level| *level <= MAX_CONFIGURABLE_LEVEL)
            .ok_or_else(|| {
                format_err(format!(
                    "max_level must be an integer between 0 and {}!",
                    MAX_CONFIGURABLE_LEVEL
                ))
            })?,
    };

    let large_element_fraction = parse_f64(
        &levels_json["large_element_fraction"],
        "large_element_fraction",
        defaults.large_element_fraction,
    )?;
    if large_element_fraction <= 0.0 {
        return Err(format_err("large_element_fraction must be positive!"));
    }

    let exponent = parse_f64(&levels_json["exponent"], "exponent", defaults.exponent)?;
    if exponent < 0.0 {
        return Err(format_err("exponent must not be negative!"));
    }

    Ok(LevelPolicy {
        max_level,
        large_element_fraction,
        exponent,
    })
}

fn parse_allocation(allocation_json: &JsonValue) -> Result<AllocationPolicy, ConfigError> {
    let defaults = AllocationPolicy::default();
    let limits_json = &allocation_json["limits"];

    Ok(AllocationPolicy {
        min_vertices: parse_usize(&allocation_json["min_vertices"], "min_vertices", defaults.min_vertices)?,
        min_triangles: parse_usize(&allocation_json["min_triangles"], "min_triangles", defaults.min_triangles)?,
        min_edges: parse_usize(&allocation_json["min_edges"], "min_edges", defaults.min_edges)?,
        vertex_multiplier: parse_usize(
            &allocation_json["vertex_multiplier"],
            "vertex_multiplier",
            defaults.vertex_multiplier,
        )?,
        triangle_multiplier: parse_usize(
            &allocation_json["triangle_multiplier"],
            "triangle_multiplier",
            defaults.triangle_multiplier,
        )?,
        edge_multiplier: parse_usize(
            &allocation_json["edge_multiplier"],
            "edge_multiplier",
            defaults.edge_multiplier,
        )?,
        label_extra: parse_usize(&allocation_json["label_extra"], "label_extra", defaults.label_extra)?,
        limits: BufferLimits {
            vertices: parse_limit(&limits_json["vertices"], "vertices")?,
            triangles: parse_limit(&limits_json["triangles"], "triangles")?,
            edges: parse_limit(&limits_json["edges"], "edges")?,
            labels: parse_limit(&limits_json["labels"], "labels")?,
        },
    })
}

fn parse_usize(value: &JsonValue, name: &str, default: usize) -> Result<usize, ConfigError> {
    match value {
        JsonValue::Null => Ok(default),
        value => value
            .as_usize()
            .ok_or_else(|| format_err(format!("{} must be a non-negative integer!", name))),
    }
}

fn parse_f64(value: &JsonValue, name: &str, default: f64) -> Result<f64, ConfigError> {
    match value {
        JsonValue::Null => Ok(default),
        value => value
            .as_f64()
            .filter(|v| v.is_finite())
            .ok_or_else(|| format_err(format!("{} must be a number!", name))),
    }
}

fn parse_limit(value: &JsonValue, name: &str) -> Result<Option<usize>, ConfigError> {
    match value {
        JsonValue::Null => Ok(None),
        value => value
            .as_usize()
            .map(Some)
            .ok_or_else(|| format_err(format!("the {} limit must be a non-negative integer!", name))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_from_empty_object() {
        let config = LinearizerConfig::from_json_str("{}").unwrap();
        assert_eq!(config, LinearizerConfig::default());
    }

    #[test]
    fn config_from_file() {
        let config = LinearizerConfig::from_file("./test_input/linearizer_config.json").unwrap();

        assert_eq!(config.levels.max_level, 3);
        assert_eq!(config.levels.exponent, 0.25);
        assert_eq!(config.levels.large_element_fraction, 1e-2);

        assert_eq!(config.allocation.min_triangles, 64);
        assert_eq!(config.allocation.edge_multiplier, 10);
        assert_eq!(config.allocation.limits.triangles, Some(100_000));
        assert_eq!(config.allocation.limits.vertices, None);
    }

    #[test]
    fn bad_configs() {
        assert!(matches!(
            LinearizerConfig::from_json_str("[1, 2]"),
            Err(ConfigError::Format(_))
        ));
        assert!(matches!(
            LinearizerConfig::from_json_str("{ \"levels\": { \"max_level\": 11 } }"),
            Err(ConfigError::Format(_))
        ));
        assert!(matches!(
            LinearizerConfig::from_json_str("{ \"levels\": { \"large_element_fraction\": 0 } }"),
            Err(ConfigError::Format(_))
        ));
        assert!(matches!(
            LinearizerConfig::from_json_str("{ \"allocation\": { \"min_edges\": -4 } }"),
            Err(ConfigError::Format(_))
        ));
        assert!(matches!(
            LinearizerConfig::from_json_str("{ \"levels\": "),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            LinearizerConfig::from_file("./test_input/missing_config.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
