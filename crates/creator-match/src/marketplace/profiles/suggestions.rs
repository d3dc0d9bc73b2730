use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::marketplace::model::{
    check_items, check_text, AgentProfile, ResponseSchema, SchemaViolation, StructuredOutput,
};

pub const PROFILE_SUGGESTIONS_SCHEMA: &str = "profile_suggestions";

pub const PROFILE_EXPERT_AGENT: AgentProfile = AgentProfile {
    name: "Profile Creation Expert",
    instructions: "You help content creators describe their value in profiles that attract brand partnerships.\n\
\n\
Requirements:\n\
- Return exactly 3 bio options, one per style: \"professional\", \"casual\", and \"impact_focused\" (underscore, not hyphen).\n\
- Each bio is 30-600 characters; aim for 100-300.\n\
- Suggest 2-5 content categories such as \"sustainability\", \"fitness\", or \"tech\".\n\
- The audience description is 15-500 characters.\n\
- The unique value proposition is 20-400 characters.\n\
\n\
Styles:\n\
- professional: formal, data-driven, emphasizes metrics and results.\n\
- casual: friendly and relatable, authentic voice, emojis where they fit.\n\
- impact_focused: mission-driven, emphasizes the change the creator makes.\n\
\n\
Use the specific details provided, highlight what sets the creator apart, and avoid generic marketing speak. \
Describe the audience's demographics, interests, and why brands value them.",
};

/// Rough self-description a creator gives before drafting a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionRequest {
    pub content_description: String,
    pub audience: String,
    pub unique_value: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BioStyle {
    Professional,
    Casual,
    ImpactFocused,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BioOption {
    pub style: BioStyle,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSuggestions {
    pub bio_options: Vec<BioOption>,
    pub suggested_categories: Vec<String>,
    pub audience_description: String,
    pub unique_value_prop: String,
}

impl StructuredOutput for ProfileSuggestions {
    fn schema() -> ResponseSchema {
        ResponseSchema {
            name: PROFILE_SUGGESTIONS_SCHEMA,
            schema: json!({
                "type": "object",
                "properties": {
                    "bioOptions": {
                        "type": "array",
                        "description": "Exactly three bio options, one for each style: professional, casual, and impact_focused",
                        "items": {
                            "type": "object",
                            "properties": {
                                "style": {
                                    "type": "string",
                                    "enum": ["professional", "casual", "impact_focused"],
                                    "description": "Must be exactly one of: professional, casual, or impact_focused"
                                },
                                "text": {
                                    "type": "string",
                                    "description": "Bio text between 30-600 characters"
                                }
                            },
                            "required": ["style", "text"],
                            "additionalProperties": false
                        }
                    },
                    "suggestedCategories": {
                        "type": "array",
                        "items": { "type": "string", "description": "Category name" },
                        "description": "2-5 content categories or niches (e.g. sustainability, fitness, tech)"
                    },
                    "audienceDescription": {
                        "type": "string",
                        "description": "Polished description of the target audience (15-500 characters)"
                    },
                    "uniqueValueProp": {
                        "type": "string",
                        "description": "What makes this creator unique and valuable to brands (20-400 characters)"
                    }
                },
                "required": [
                    "bioOptions",
                    "suggestedCategories",
                    "audienceDescription",
                    "uniqueValueProp"
                ],
                "additionalProperties": false
            }),
        }
    }

    fn validate(&self) -> Result<(), SchemaViolation> {
        check_items("bioOptions", self.bio_options.len(), 3, 3)?;
        for (index, option) in self.bio_options.iter().enumerate() {
            check_text(&format!("bioOptions[{index}].text"), &option.text, 30, Some(600))?;
        }

        check_items("suggestedCategories", self.suggested_categories.len(), 2, 5)?;
        for (index, category) in self.suggested_categories.iter().enumerate() {
            check_text(&format!("suggestedCategories[{index}]"), category, 1, None)?;
        }

        check_text("audienceDescription", &self.audience_description, 15, Some(500))?;
        check_text("uniqueValueProp", &self.unique_value_prop, 20, Some(400))?;
        Ok(())
    }
}

pub(crate) fn suggestion_prompt(request: &SuggestionRequest) -> String {
    let name_line = request
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| format!("Creator Name: {name}"))
        .unwrap_or_default();

    let prompt = format!(
        "Help this creator build their profile for a brand partnership platform.\n\
         \n\
         {name_line}\n\
         \n\
         **What they create:**\n\
         {content}\n\
         \n\
         **Their audience:**\n\
         {audience}\n\
         \n\
         **What makes them unique:**\n\
         {unique}\n\
         \n\
         ---\n\
         \n\
         Please generate profile suggestions that will help them attract brand partnerships.\n\
         \n\
         IMPORTANT: You must return exactly 3 bio options with styles: \"professional\", \"casual\", \
         and \"impact_focused\" (use underscore, not hyphen).",
        content = request.content_description,
        audience = request.audience,
        unique = request.unique_value,
    );

    prompt.trim().to_string()
}
