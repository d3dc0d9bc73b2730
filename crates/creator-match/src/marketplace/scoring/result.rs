use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::marketplace::model::{
    check_items, check_text, ResponseSchema, SchemaViolation, StructuredOutput,
};

pub const FIT_SCORE_SCHEMA: &str = "fit_score";

/// Advisory band chosen by the model. It is not cross-checked against the numeric score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    StronglyRecommend,
    Recommend,
    Consider,
    Pass,
}

impl Recommendation {
    pub const fn label(self) -> &'static str {
        match self {
            Recommendation::StronglyRecommend => "strongly_recommend",
            Recommendation::Recommend => "recommend",
            Recommendation::Consider => "consider",
            Recommendation::Pass => "pass",
        }
    }

    /// Label with underscores spelled as spaces, e.g. "strongly recommend".
    pub fn display_label(self) -> String {
        self.label().replace('_', " ")
    }
}

/// Structured fit assessment returned by the scoring model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitScoreResult {
    pub score: f64,
    pub reasoning: String,
    pub strengths: Vec<String>,
    pub concerns: Vec<String>,
    pub recommendation: Recommendation,
}

impl FitScoreResult {
    /// Display text persisted as the application's `fitReasoning`.
    pub fn compose_reasoning(&self) -> String {
        let mut text = format!(
            "**Score: {}/100** ({})\n\n{}\n\n**Strengths:**\n{}",
            self.score,
            self.recommendation.display_label(),
            self.reasoning,
            bullet_list(&self.strengths)
        );

        if !self.concerns.is_empty() {
            text.push_str("\n\n**Concerns:**\n");
            text.push_str(&bullet_list(&self.concerns));
        }

        text.trim().to_string()
    }
}

fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("• {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

impl StructuredOutput for FitScoreResult {
    fn schema() -> ResponseSchema {
        ResponseSchema {
            name: FIT_SCORE_SCHEMA,
            schema: json!({
                "type": "object",
                "properties": {
                    "score": {
                        "type": "number",
                        "description": "Overall fit score from 0-100, where 100 is a perfect match"
                    },
                    "reasoning": {
                        "type": "string",
                        "description": "Detailed explanation of the score (at least 100 characters), covering strengths and weaknesses"
                    },
                    "strengths": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Key strengths of this application (1-5 points)"
                    },
                    "concerns": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Potential concerns or areas for improvement (0-5 points)"
                    },
                    "recommendation": {
                        "type": "string",
                        "enum": ["strongly_recommend", "recommend", "consider", "pass"],
                        "description": "strongly_recommend (90+), recommend (75-89), consider (60-74), pass (<60)"
                    }
                },
                "required": ["score", "reasoning", "strengths", "concerns", "recommendation"],
                "additionalProperties": false
            }),
        }
    }

    fn validate(&self) -> Result<(), SchemaViolation> {
        if !self.score.is_finite() || !(0.0..=100.0).contains(&self.score) {
            return Err(SchemaViolation::new(
                "score",
                format!("expected a number between 0 and 100, got {}", self.score),
            ));
        }
        check_text("reasoning", &self.reasoning, 100, None)?;
        check_items("strengths", self.strengths.len(), 1, 5)?;
        check_items("concerns", self.concerns.len(), 0, 5)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(score: f64, concerns: Vec<&str>) -> FitScoreResult {
        FitScoreResult {
            score,
            reasoning: "r".repeat(140),
            strengths: vec!["A".to_string(), "B".to_string()],
            concerns: concerns.into_iter().map(str::to_string).collect(),
            recommendation: Recommendation::Recommend,
        }
    }

    #[test]
    fn composed_reasoning_omits_empty_concerns() {
        let text = result(82.0, Vec::new()).compose_reasoning();

        assert!(text.starts_with("**Score: 82/100** (recommend)"));
        assert!(text.contains(&"r".repeat(140)));
        assert!(text.contains("**Strengths:**\n• A\n• B"));
        assert!(!text.contains("Concerns"));
    }

    #[test]
    fn composed_reasoning_lists_concerns_and_spaces_out_labels() {
        let mut scored = result(91.5, vec!["Small audience"]);
        scored.recommendation = Recommendation::StronglyRecommend;

        let text = scored.compose_reasoning();
        assert!(text.starts_with("**Score: 91.5/100** (strongly recommend)"));
        assert!(text.ends_with("**Concerns:**\n• Small audience"));
    }

    #[test]
    fn validation_enforces_documented_bounds() {
        assert!(result(0.0, Vec::new()).validate().is_ok());
        assert!(result(100.0, Vec::new()).validate().is_ok());
        assert_eq!(result(100.5, Vec::new()).validate().unwrap_err().field, "score");
        assert_eq!(result(f64::NAN, Vec::new()).validate().unwrap_err().field, "score");

        let mut short = result(50.0, Vec::new());
        short.reasoning = "too short".to_string();
        assert_eq!(short.validate().unwrap_err().field, "reasoning");

        let mut no_strengths = result(50.0, Vec::new());
        no_strengths.strengths.clear();
        assert_eq!(no_strengths.validate().unwrap_err().field, "strengths");

        let many = vec!["c"; 6];
        assert_eq!(result(50.0, many).validate().unwrap_err().field, "concerns");
    }

    #[test]
    fn band_is_not_checked_against_score() {
        let mut mismatched = result(20.0, Vec::new());
        mismatched.recommendation = Recommendation::StronglyRecommend;
        assert!(mismatched.validate().is_ok());
    }

    #[test]
    fn unknown_recommendation_is_rejected_by_deserialization() {
        let raw = serde_json::json!({
            "score": 50,
            "reasoning": "x".repeat(120),
            "strengths": ["A"],
            "concerns": [],
            "recommendation": "maybe"
        });
        assert!(serde_json::from_value::<FitScoreResult>(raw).is_err());
    }
}
