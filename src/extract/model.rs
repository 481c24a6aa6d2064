use crate::extract::error::ExtractError;
use crate::extract::mention::{Mention, sort_mentions};
use crate::extract::{Extractor, RawFields};

/// A single unscoped prediction from a NER backend, before field-offset
/// validation and clamping.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPrediction {
    pub label: String,
    pub start: usize,
    pub end: usize,
    pub score: f32,
}

/// Abstraction over a named-entity-recognition backend. Kept narrow so this
/// crate does not hard-depend on a concrete ML runtime; [`FixtureNerModel`]
/// provides a deterministic implementation for tests.
pub trait NerModel {
    fn predict(&self, field_key: &str, text: &str) -> Vec<RawPrediction>;
}

#[derive(Debug, Clone)]
pub struct ModelExtractor<M: NerModel> {
    model: M,
    min_score: f32,
}

impl<M: NerModel> ModelExtractor<M> {
    pub fn new(model: M, min_score: f32) -> Self {
        ModelExtractor { model, min_score }
    }
}

impl<M: NerModel> Extractor for ModelExtractor<M> {
    fn extract(&self, raw_fields: &RawFields) -> Result<Vec<Mention>, ExtractError> {
        let mut mentions = Vec::new();
        for (field, text) in raw_fields {
            for prediction in self.model.predict(field, text) {
                if prediction.end < prediction.start {
                    continue;
                }
                if prediction.end == prediction.start {
                    continue;
                }
                if prediction.end > text.len() {
                    continue;
                }
                let Some(surface_form) = text.get(prediction.start..prediction.end) else {
                    continue;
                };
                if prediction.score < self.min_score {
                    continue;
                }
                mentions.push(Mention {
                    label: prediction.label,
                    surface_form: surface_form.to_string(),
                    source_field: field.clone(),
                    start: prediction.start,
                    end: prediction.end,
                    extractor_conf: prediction.score.clamp(0.0, 1.0),
                });
            }
        }
        sort_mentions(&mut mentions);
        Ok(mentions)
    }
}

/// Deterministic stand-in for a real NER backend, used by tests and by
/// integrators without a model runtime wired in yet.
#[derive(Debug, Clone, Default)]
pub struct FixtureNerModel {
    fixed: Vec<(String, String, RawPrediction)>,
}

impl FixtureNerModel {
    pub fn new() -> Self {
        FixtureNerModel::default()
    }

    pub fn with_prediction(mut self, field_key: impl Into<String>, text: impl Into<String>, prediction: RawPrediction) -> Self {
        self.fixed.push((field_key.into(), text.into(), prediction));
        self
    }
}

impl NerModel for FixtureNerModel {
    fn predict(&self, field_key: &str, text: &str) -> Vec<RawPrediction> {
        self.fixed
            .iter()
            .filter(|(f, t, _)| f == field_key && t == text)
            .map(|(_, _, p)| p.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn rejects_out_of_bounds_spans() {
        let model = FixtureNerModel::new().with_prediction(
            "summary",
            "short",
            RawPrediction {
                label: "disease".to_string(),
                start: 0,
                end: 100,
                score: 0.9,
            },
        );
        let extractor = ModelExtractor::new(model, 0.5);
        let mut fields = BTreeMap::new();
        fields.insert("summary".to_string(), "short".to_string());
        assert!(extractor.extract(&fields).unwrap().is_empty());
    }

    #[test]
    fn clamps_score_and_filters_by_threshold() {
        let model = FixtureNerModel::new().with_prediction(
            "summary",
            "lung cancer detected",
            RawPrediction {
                label: "disease".to_string(),
                start: 0,
                end: 11,
                score: 1.4,
            },
        );
        let extractor = ModelExtractor::new(model, 0.5);
        let mut fields = BTreeMap::new();
        fields.insert("summary".to_string(), "lung cancer detected".to_string());
        let mentions = extractor.extract(&fields).unwrap();
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].extractor_conf, 1.0);
    }
}
