use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::model::{GenrePredictor, ModelError};

/// A linear bag-of-words classifier.
///
/// The score of label `i` is `intercepts[i]` plus, for every whitespace
/// separated token of the input, `coefficients[token][i]`. The highest score
/// wins; ties go to the earlier label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModel {
    pub labels: Vec<String>,
    pub intercepts: Vec<f64>,
    #[serde(default)]
    pub coefficients: HashMap<String, Vec<f64>>,
}

impl LinearModel {
    /// Load a model from a JSON artifact
    ///
    /// # Errors
    ///
    /// Returns `ModelError::ReadError` or `ModelError::ParseError` if the file
    /// cannot be read or parsed, and `ModelError::Invalid` if it is inconsistent.
    pub fn load_from_file(path: &Path) -> Result<Self, ModelError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse and validate a model from a JSON string
    ///
    /// # Errors
    ///
    /// Returns `ModelError::ParseError` for invalid JSON and
    /// `ModelError::Invalid` if there are no labels or vector lengths disagree.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let model: Self = serde_json::from_str(json)?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<(), ModelError> {
        if self.labels.is_empty() {
            return Err(ModelError::Invalid("model has no labels".to_string()));
        }
        let n = self.labels.len();
        if self.intercepts.len() != n {
            return Err(ModelError::Invalid(format!(
                "expected {n} intercepts, found {}",
                self.intercepts.len()
            )));
        }
        if let Some((token, weights)) = self.coefficients.iter().find(|(_, w)| w.len() != n) {
            return Err(ModelError::Invalid(format!(
                "token '{token}' has {} weights, expected {n}",
                weights.len()
            )));
        }
        Ok(())
    }

    /// Score every label for one cleaned text
    #[must_use]
    pub fn scores(&self, text: &str) -> Vec<f64> {
        let mut scores = self.intercepts.clone();
        for token in text.split_whitespace() {
            if let Some(weights) = self.coefficients.get(token) {
                for (score, w) in scores.iter_mut().zip(weights) {
                    *score += w;
                }
            }
        }
        scores
    }

    fn classify(&self, text: &str) -> &str {
        let scores = self.scores(text);
        let mut best = 0;
        for (i, score) in scores.iter().enumerate() {
            if *score > scores[best] {
                best = i;
            }
        }
        &self.labels[best]
    }
}

impl GenrePredictor for LinearModel {
    fn predict(&self, texts: &[String]) -> Vec<String> {
        texts.iter().map(|t| self.classify(t).to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODEL_JSON: &str = r#"{
        "labels": ["pop", "rock", "rap"],
        "intercepts": [0.1, 0.0, 0.0],
        "coefficients": {
            "love": [1.0, 0.2, 0.0],
            "guitar": [0.0, 1.5, 0.0],
            "rhyme": [0.0, 0.0, 2.0]
        }
    }"#;

    #[test]
    fn test_predict() {
        let model = LinearModel::from_json(MODEL_JSON).unwrap();
        let preds = model.predict(&[
            "love love baby".to_string(),
            "loud guitar".to_string(),
            "rhyme and love".to_string(),
            String::new(),
        ]);
        assert_eq!(preds, vec!["pop", "rock", "rap", "pop"]);
    }

    #[test]
    fn test_ties_go_to_first_label() {
        let model =
            LinearModel::from_json(r#"{"labels": ["a", "b"], "intercepts": [0.0, 0.0]}"#).unwrap();
        assert_eq!(model.predict_one("anything"), "a");
    }

    #[test]
    fn test_invalid_models_rejected() {
        assert!(matches!(
            LinearModel::from_json(r#"{"labels": [], "intercepts": []}"#),
            Err(ModelError::Invalid(_))
        ));
        assert!(matches!(
            LinearModel::from_json(r#"{"labels": ["a"], "intercepts": [0.0, 1.0]}"#),
            Err(ModelError::Invalid(_))
        ));
        assert!(matches!(
            LinearModel::from_json(
                r#"{"labels": ["a"], "intercepts": [0.0], "coefficients": {"x": [1.0, 2.0]}}"#
            ),
            Err(ModelError::Invalid(_))
        ));
        assert!(matches!(
            LinearModel::from_json("not json"),
            Err(ModelError::ParseError(_))
        ));
    }
}
