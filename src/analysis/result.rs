//! Reply schema and its validation.

use serde::{Deserialize, Serialize};

use super::error::AnalysisError;

pub const RECOMMENDATION_COUNT: usize = 3;

/// Validated analysis of one room photograph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub room_type: String,
    pub detected_style: String,
    pub recommendations: [String; RECOMMENDATION_COUNT],
}

/// What the pipeline hands back: a validated result, or in lenient mode the
/// untouched reply text when it did not match the schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "analysis", rename_all = "snake_case")]
pub enum Analysis {
    Structured(AnalysisResult),
    Raw(String),
}

impl Analysis {
    pub fn structured(&self) -> Option<&AnalysisResult> {
        match self {
            Analysis::Structured(result) => Some(result),
            Analysis::Raw(_) => None,
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, Analysis::Raw(_))
    }
}

#[derive(Deserialize)]
struct ReplyDocument {
    room_type: String,
    detected_style: String,
    recommendations: Vec<String>,
}

/// Locate the outermost JSON object in a reply. Models sometimes wrap the
/// document in a Markdown fence or a sentence of prose.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Strictly parse a reply into an [`AnalysisResult`].
pub fn parse_analysis(text: &str) -> Result<AnalysisResult, AnalysisError> {
    let json = extract_json_object(text)
        .ok_or_else(|| AnalysisError::schema("reply does not contain a JSON object"))?;

    let doc: ReplyDocument = serde_json::from_str(json)
        .map_err(|e| AnalysisError::schema(format!("reply does not match schema: {}", e)))?;

    let room_type = required_text("room_type", doc.room_type)?;
    let detected_style = required_text("detected_style", doc.detected_style)?;

    let count = doc.recommendations.len();
    let recommendations: [String; RECOMMENDATION_COUNT] =
        doc.recommendations.try_into().map_err(|_| {
            AnalysisError::schema(format!(
                "expected exactly {} recommendations, got {}",
                RECOMMENDATION_COUNT, count
            ))
        })?;
    if let Some(position) = recommendations.iter().position(|r| r.trim().is_empty()) {
        return Err(AnalysisError::schema(format!(
            "recommendation {} is blank",
            position + 1
        )));
    }

    Ok(AnalysisResult {
        room_type,
        detected_style,
        recommendations,
    })
}

fn required_text(field: &str, value: String) -> Result<String, AnalysisError> {
    if value.trim().is_empty() {
        Err(AnalysisError::schema(format!("field '{}' is blank", field)))
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BEDROOM: &str = r#"{"room_type":"bedroom","detected_style":"minimalist","recommendations":["bed frame","nightstand","lamp"]}"#;

    fn assert_mismatch(text: &str) {
        match parse_analysis(text) {
            Err(AnalysisError::SchemaMismatch { .. }) => {}
            other => panic!("expected schema mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_keeps_recommendation_order() {
        let result = parse_analysis(BEDROOM).unwrap();
        assert_eq!(result.room_type, "bedroom");
        assert_eq!(result.detected_style, "minimalist");
        assert_eq!(result.recommendations, ["bed frame", "nightstand", "lamp"]);
    }

    #[test]
    fn test_parse_fenced_reply() {
        let fenced = format!("Here is the analysis:\n```json\n{}\n```", BEDROOM);
        assert_eq!(parse_analysis(&fenced).unwrap().room_type, "bedroom");
    }

    #[test]
    fn test_parse_ignores_extra_fields() {
        let text = r##"{"room_type":"office","detected_style":"industrial","recommendations":["desk","chair","shelf"],"color_palette":{"primary":"#ffffff"}}"##;
        assert_eq!(parse_analysis(text).unwrap().detected_style, "industrial");
    }

    #[test]
    fn test_two_recommendations_is_mismatch() {
        assert_mismatch(
            r#"{"room_type":"bedroom","detected_style":"minimalist","recommendations":["bed frame","lamp"]}"#,
        );
    }

    #[test]
    fn test_four_recommendations_is_mismatch() {
        assert_mismatch(
            r#"{"room_type":"bedroom","detected_style":"minimalist","recommendations":["a","b","c","d"]}"#,
        );
    }

    #[test]
    fn test_missing_field_is_mismatch() {
        assert_mismatch(r#"{"room_type":"bedroom","recommendations":["a","b","c"]}"#);
    }

    #[test]
    fn test_wrong_type_is_mismatch() {
        assert_mismatch(
            r#"{"room_type":"bedroom","detected_style":"modern","recommendations":[{"item":"sofa"},{"item":"table"},{"item":"rug"}]}"#,
        );
    }

    #[test]
    fn test_blank_values_are_mismatch() {
        assert_mismatch(r#"{"room_type":" ","detected_style":"modern","recommendations":["a","b","c"]}"#);
        assert_mismatch(r#"{"room_type":"hall","detected_style":"modern","recommendations":["a","","c"]}"#);
    }

    #[test]
    fn test_free_text_is_mismatch() {
        assert_mismatch("The room looks like a bedroom.");
        assert_mismatch("} backwards {");
    }

    #[test]
    fn test_analysis_serializes_with_status_tag() {
        let raw = serde_json::to_value(Analysis::Raw("oops".to_string())).unwrap();
        assert_eq!(raw["status"], "raw");
        assert_eq!(raw["analysis"], "oops");

        let structured = Analysis::Structured(parse_analysis(BEDROOM).unwrap());
        assert!(!structured.is_raw());
        let value = serde_json::to_value(&structured).unwrap();
        assert_eq!(value["status"], "structured");
        assert_eq!(value["analysis"]["recommendations"][2], "lamp");
    }
}
