use serde::{Serialize, Serializer};

/// A single scalar value in a catalog row
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// Free text
    Text(String),
    /// Whole number, with the field as written (`007`, `+5`)
    Integer { value: i64, raw: String },
    /// Floating point number, with the field as written (`1.0`)
    Float { value: f64, raw: String },
    /// Empty field, or a column the row's source did not have
    #[default]
    Missing,
}

impl CellValue {
    /// Infer the cell type from a raw CSV field.
    ///
    /// Empty fields are missing, then integers, then floats, and anything
    /// else stays text. The raw field is kept verbatim in every case, so
    /// writing a cell back out reproduces its input.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw.is_empty() {
            return Self::Missing;
        }
        let trimmed = raw.trim();
        if let Ok(i) = trimmed.parse::<i64>() {
            return Self::Integer {
                value: i,
                raw: raw.to_string(),
            };
        }
        // "inf" and "NaN" parse as f64 but are words in a song catalog
        if trimmed.bytes().any(|b| b.is_ascii_digit()) {
            if let Ok(f) = trimmed.parse::<f64>() {
                return Self::Float {
                    value: f,
                    raw: raw.to_string(),
                };
            }
        }
        Self::Text(raw.to_string())
    }

    /// Stringified value with surrounding whitespace removed.
    ///
    /// Missing cells become the empty string.
    #[must_use]
    pub fn trimmed(&self) -> String {
        self.to_string().trim().to_string()
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(raw) | Self::Integer { raw, .. } | Self::Float { raw, .. } => {
                write!(f, "{raw}")
            }
            Self::Missing => Ok(()),
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(s) => serializer.serialize_str(s),
            Self::Integer { value, .. } => serializer.serialize_i64(*value),
            Self::Float { value, .. } => serializer.serialize_f64(*value),
            Self::Missing => serializer.serialize_none(),
        }
    }
}
