use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::marketplace::model::{
    check_items, check_text, AgentProfile, ResponseSchema, SchemaViolation, StructuredOutput,
};

pub const CAMPAIGN_EXTRACTION_SCHEMA: &str = "campaign_extraction";

pub const CAMPAIGN_STRATEGIST_AGENT: AgentProfile = AgentProfile {
    name: "Campaign Strategist",
    instructions: "You are a campaign strategist who helps companies publish creator partnership campaigns.\n\
\n\
Turn raw campaign material (emails, briefs, internal notes) into a professional campaign that appeals to quality creators:\n\
- Title: clear and specific about the goal.\n\
- Description: what the company does, what the product or goal is, and why creators should take part.\n\
- Criteria: a list covering niche, follower range, platforms, engagement, location, and other requirements.\n\
- Budget: the amount mentioned in USD, or a reasonable figure for the scope if none is given.\n\
- Deadline: YYYY-MM-DD; suggest two to four weeks out when none is mentioned.\n\
- Deliverables: number and format of posts or videos and usage rights, when known.\n\
- Improvements: up to three ways to make the campaign more attractive.\n\
\n\
Be professional, clear, and creator-friendly.",
};

/// Campaign fields proposed from a pasted document. Nothing is persisted from it directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignExtraction {
    pub title: String,
    pub description: String,
    pub criteria: String,
    pub budget: f64,
    pub deadline: String,
    #[serde(default)]
    pub deliverables: Option<String>,
    pub suggested_improvements: Vec<String>,
}

impl StructuredOutput for CampaignExtraction {
    fn schema() -> ResponseSchema {
        ResponseSchema {
            name: CAMPAIGN_EXTRACTION_SCHEMA,
            schema: json!({
                "type": "object",
                "properties": {
                    "title": {
                        "type": "string",
                        "description": "Clear, compelling campaign title (10-200 characters)"
                    },
                    "description": {
                        "type": "string",
                        "description": "Professional campaign description that attracts creators (at least 100 characters)"
                    },
                    "criteria": {
                        "type": "string",
                        "description": "Structured list of creator requirements such as follower count, niche, and platform (at least 50 characters)"
                    },
                    "budget": {
                        "type": "number",
                        "description": "Campaign budget in USD, greater than zero"
                    },
                    "deadline": {
                        "type": "string",
                        "description": "Application deadline in YYYY-MM-DD format"
                    },
                    "deliverables": {
                        "type": ["string", "null"],
                        "description": "Expected content deliverables from creators, or null when unknown"
                    },
                    "suggestedImprovements": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Up to 3 suggestions to make the campaign more attractive to creators"
                    }
                },
                "required": [
                    "title",
                    "description",
                    "criteria",
                    "budget",
                    "deadline",
                    "deliverables",
                    "suggestedImprovements"
                ],
                "additionalProperties": false
            }),
        }
    }

    fn validate(&self) -> Result<(), SchemaViolation> {
        check_text("title", &self.title, 10, Some(200))?;
        check_text("description", &self.description, 100, None)?;
        check_text("criteria", &self.criteria, 50, None)?;
        if !self.budget.is_finite() || self.budget <= 0.0 {
            return Err(SchemaViolation::new(
                "budget",
                format!("expected a positive number, got {}", self.budget),
            ));
        }
        check_items("suggestedImprovements", self.suggested_improvements.len(), 0, 3)?;
        Ok(())
    }
}

pub(crate) fn extraction_prompt(document: &str) -> String {
    format!(
        "Extract and structure the following campaign information into a professional format:\n\
         \n\
         ━━━━━━━━━━━━━━━━━━━━━━━━━\n\
         {document}\n\
         ━━━━━━━━━━━━━━━━━━━━━━━━━\n\
         \n\
         Please extract all relevant details and structure them for a creator partnership platform.\n\
         If any information is missing or unclear, use your expertise to suggest reasonable values."
    )
}
