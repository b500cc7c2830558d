use serde::Deserialize;

use crate::error::DedupError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct DedupConfig {
    pub name: String,
    pub input: InputConfig,
    pub fields: Vec<FieldSpec>,
    pub blocking: BlockingConfig,
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub undefined_policy: UndefinedPolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    pub file: String,
    pub id_column: String,
}

/// How fields with undefined comparisons enter the aggregate score.
/// `Exclude` drops them from N; `ScoreZero` counts them as 0.0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UndefinedPolicy {
    Exclude,
    ScoreZero,
}

impl Default for UndefinedPolicy {
    fn default() -> Self {
        Self::Exclude
    }
}

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct FieldSpec {
    pub field: String,
    #[serde(flatten)]
    pub comparator: ComparatorSpec,
    /// When true, a comparison against a missing value yields
    /// `missing_score` instead of undefined.
    #[serde(default)]
    pub missing_allowed: bool,
    #[serde(default)]
    pub missing_score: f64,
}

/// Closed set of comparator kinds. Unknown kinds fail TOML deserialization,
/// so they surface as configuration errors rather than silent no-ops.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ComparatorSpec {
    Exact,
    NumericLinear {
        #[serde(default)]
        offset: f64,
        #[serde(default = "default_scale")]
        scale: f64,
    },
    NumericPercent {
        #[serde(default = "default_pct_max")]
        pct_max: f64,
    },
    JaroWinkler {
        #[serde(default)]
        threshold: Option<f64>,
    },
    WeatherCode {
        #[serde(default = "default_weather_codes")]
        equivalent_codes: Vec<String>,
        #[serde(default = "default_pct_max")]
        pct_max: f64,
    },
}

fn default_scale() -> f64 {
    1.0
}

fn default_pct_max() -> f64 {
    98.0
}

/// Sentinel weather codes meaning "no observation"; treated as equivalent
/// to any value.
fn default_weather_codes() -> Vec<String> {
    vec!["509".into(), "510".into()]
}

// ---------------------------------------------------------------------------
// Blocking
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockingConfig {
    /// Candidate pairs share identical values on every field of at least
    /// one key set. The union over all key sets is deduplicated.
    ExactKey { keys: Vec<Vec<String>> },
    /// Sort by `sort_key` within partitions sharing `block_on` values;
    /// pair each record with its window neighbours in sort order.
    SortedNeighbourhood {
        sort_key: String,
        #[serde(default)]
        block_on: Vec<String>,
        #[serde(default = "default_window")]
        window: usize,
    },
}

impl BlockingConfig {
    pub fn label(&self) -> &'static str {
        match self {
            Self::ExactKey { .. } => "exact_key",
            Self::SortedNeighbourhood { .. } => "sorted_neighbourhood",
        }
    }
}

fn default_window() -> usize {
    3
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierConfig {
    /// MATCH when the aggregate score reaches `threshold`.
    ScoreThreshold {
        #[serde(default = "default_threshold")]
        threshold: f64,
    },
    /// MATCH when `field` scores exactly 1.0, or the aggregate reaches
    /// `threshold`. An exact hit on a discriminating field is a sufficient
    /// condition on its own.
    KeyFieldOverride {
        field: String,
        #[serde(default = "default_threshold")]
        threshold: f64,
    },
}

impl ClassifierConfig {
    pub fn label(&self) -> &'static str {
        match self {
            Self::ScoreThreshold { .. } => "score_threshold",
            Self::KeyFieldOverride { .. } => "key_field_override",
        }
    }
}

fn default_threshold() -> f64 {
    0.98
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl DedupConfig {
    pub fn from_toml(input: &str) -> Result<Self, DedupError> {
        let config: DedupConfig =
            toml::from_str(input).map_err(|e| DedupError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), DedupError> {
        if self.fields.is_empty() {
            return Err(DedupError::ConfigValidation(
                "at least one field is required".into(),
            ));
        }

        for (i, spec) in self.fields.iter().enumerate() {
            if self.fields[..i].iter().any(|f| f.field == spec.field) {
                return Err(DedupError::ConfigValidation(format!(
                    "duplicate field '{}'",
                    spec.field
                )));
            }
            if !(0.0..=1.0).contains(&spec.missing_score) {
                return Err(DedupError::ConfigValidation(format!(
                    "field '{}': missing_score must be in [0, 1]",
                    spec.field
                )));
            }
            spec.comparator.validate(&spec.field)?;
        }

        match &self.blocking {
            BlockingConfig::ExactKey { keys } => {
                if keys.is_empty() || keys.iter().any(|k| k.is_empty()) {
                    return Err(DedupError::ConfigValidation(
                        "exact_key blocking requires at least one non-empty key set".into(),
                    ));
                }
                for key_set in keys {
                    for field in key_set {
                        self.require_field("blocking", field)?;
                    }
                }
            }
            BlockingConfig::SortedNeighbourhood {
                sort_key,
                block_on,
                window,
            } => {
                self.require_field("blocking", sort_key)?;
                for field in block_on {
                    self.require_field("blocking", field)?;
                }
                if *window < 1 || *window % 2 == 0 {
                    return Err(DedupError::ConfigValidation(format!(
                        "sorted_neighbourhood window must be odd and >= 1, got {window}"
                    )));
                }
            }
        }

        let threshold = match &self.classifier {
            ClassifierConfig::ScoreThreshold { threshold } => *threshold,
            ClassifierConfig::KeyFieldOverride { field, threshold } => {
                self.require_field("classifier", field)?;
                *threshold
            }
        };
        if !(0.0..=1.0).contains(&threshold) {
            return Err(DedupError::ConfigValidation(format!(
                "classifier threshold must be in [0, 1], got {threshold}"
            )));
        }

        if self.input.id_column.is_empty() {
            return Err(DedupError::ConfigValidation(
                "input id_column must not be empty".into(),
            ));
        }

        Ok(())
    }

    fn require_field(&self, context: &str, field: &str) -> Result<(), DedupError> {
        if self.fields.iter().any(|f| f.field == field) {
            Ok(())
        } else {
            Err(DedupError::UnknownField {
                context: context.into(),
                field: field.into(),
            })
        }
    }
}

impl ComparatorSpec {
    fn validate(&self, field: &str) -> Result<(), DedupError> {
        match self {
            Self::Exact => Ok(()),
            Self::NumericLinear { offset, scale } => {
                if *offset < 0.0 || *scale < 0.0 {
                    return Err(DedupError::ConfigValidation(format!(
                        "field '{field}': numeric_linear offset and scale must be >= 0"
                    )));
                }
                Ok(())
            }
            Self::NumericPercent { pct_max } | Self::WeatherCode { pct_max, .. } => {
                if *pct_max <= 0.0 {
                    return Err(DedupError::ConfigValidation(format!(
                        "field '{field}': pct_max must be > 0"
                    )));
                }
                Ok(())
            }
            Self::JaroWinkler { threshold } => {
                if let Some(t) = threshold {
                    if !(0.0..=1.0).contains(t) {
                        return Err(DedupError::ConfigValidation(format!(
                            "field '{field}': jaro_winkler threshold must be in [0, 1]"
                        )));
                    }
                }
                Ok(())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
