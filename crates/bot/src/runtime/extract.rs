//! Intent classification and task extraction: build one prompt per
//! inbound unit, make a single model round trip, and defensively parse
//! the untrusted JSON that comes back.

use chrono::{Datelike, NaiveDate};
use dak_domain::error::{Error, Result};
use dak_providers::MediaAttachment;
use serde_json::Value;

use crate::state::AppState;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Outcome types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One task object as the extractor returned it. Every field is optional
/// on purpose: the model may hallucinate or omit anything, and the commit
/// engine defaults each field explicitly.
#[derive(Debug, Clone, Default)]
pub struct ExtractedTask {
    pub description: Option<String>,
    pub assigned_agency: Option<String>,
    pub deadline_date: Option<String>,
    pub priority: Option<String>,
}

#[derive(Debug, Clone)]
pub enum ExtractionOutcome {
    Create(Vec<ExtractedTask>),
    Query(String),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Prompt construction
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn rules(today: NaiveDate, roster: &[String], command: Option<&str>) -> String {
    let year = today.year();
    let subject = match command {
        Some(text) => format!("Analyze this command: \"{text}\""),
        None => "Listen to or read the attached command (audio, image, or document).".to_string(),
    };
    format!(
        "You are a smart Task Extractor. Today is {today} (Year {year}).\n\
         \n\
         VALID OFFICERS LIST:\n{roster}\n\
         \n\
         {subject}\n\
         \n\
         If the command is not in English, translate it to neutral professional\n\
         English, preserving proper nouns.\n\
         \n\
         Classify the intent:\n\
         - \"QUERY\" only if the command literally starts with \"ask\", \"query\" or \"?\".\n\
         - otherwise \"CREATE\". A command may contain several tasks.\n\
         \n\
         Return ONLY a JSON object:\n\
         - intent: \"CREATE\" or \"QUERY\".\n\
         - For CREATE, tasks: a list of objects with:\n\
           * description: the task description, translated.\n\
           * assigned_agency: strict fuzzy match against the VALID OFFICERS LIST.\n\
             If the user says \"me\" or \"myself\", use \"Me\". If the name sounds\n\
             similar to a valid officer, use the valid officer name. If no match,\n\
             use the name exactly as spoken. If not specified, null.\n\
           * deadline_date: YYYY-MM-DD. Calculate from context (\"next Friday\",\n\
             \"tomorrow\" = today+1). Assume year {year} unless stated otherwise.\n\
             Do NOT invent a deadline; if not specified, null.\n\
           * priority: High, Medium, or Low. Infer from urgency.\n\
         - For QUERY, search_query: the user's question, translated.\n",
        roster = serde_json::to_string(roster).unwrap_or_else(|_| "[]".into()),
    )
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Response parsing
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Strip an optional fenced-code wrapper (```json ... ``` or ``` ... ```).
pub(crate) fn strip_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the language tag on the opening fence, if any.
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    let inner = inner.strip_suffix("```").unwrap_or(inner);
    inner.trim()
}

fn opt_string(v: &Value, key: &str) -> Option<String> {
    v.get(key)
        .and_then(|s| s.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn value_to_task(v: &Value) -> ExtractedTask {
    ExtractedTask {
        description: opt_string(v, "description"),
        assigned_agency: opt_string(v, "assigned_agency"),
        deadline_date: opt_string(v, "deadline_date"),
        priority: opt_string(v, "priority"),
    }
}

/// Parse the raw model response. Missing `intent` or non-JSON output is
/// an extraction error: the whole request is abandoned, nothing partial
/// is committed.
pub fn parse_response(raw: &str, fallback_query: &str) -> Result<ExtractionOutcome> {
    let body: Value = serde_json::from_str(strip_fences(raw))
        .map_err(|e| Error::Extraction(format!("model returned non-JSON output: {e}")))?;

    let intent = body
        .get("intent")
        .and_then(|v| v.as_str())
        .ok_or_else(|| Error::Extraction("missing 'intent' in model output".into()))?;

    if intent.eq_ignore_ascii_case("query") {
        let search = opt_string(&body, "search_query")
            .unwrap_or_else(|| fallback_query.to_string());
        return Ok(ExtractionOutcome::Query(search));
    }

    // Anything that is not QUERY is treated as CREATE.
    let tasks = match body.get("tasks").and_then(|t| t.as_array()) {
        Some(items) => items.iter().map(value_to_task).collect(),
        // Older model behavior put a single task's fields at top level.
        None if body.get("description").is_some() => vec![value_to_task(&body)],
        None => Vec::new(),
    };
    Ok(ExtractionOutcome::Create(tasks))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Entry points
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn extract_text(
    state: &AppState,
    today: NaiveDate,
    roster: &[String],
    text: &str,
) -> Result<ExtractionOutcome> {
    let prompt = rules(today, roster, Some(text));
    let raw = state.model.complete(&prompt).await?;
    tracing::debug!(raw = %raw, "extraction response");
    parse_response(&raw, text)
}

pub async fn extract_media(
    state: &AppState,
    today: NaiveDate,
    roster: &[String],
    media: &MediaAttachment,
) -> Result<ExtractionOutcome> {
    let prompt = rules(today, roster, None);
    let raw = state.model.complete_with_media(&prompt, media).await?;
    tracing::debug!(raw = %raw, "extraction response");
    parse_response(&raw, "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fences_are_stripped() {
        assert_eq!(strip_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_fences("```\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_fences("  {\"a\":1}  "), "{\"a\":1}");
    }

    #[test]
    fn create_with_task_list_parses() {
        let raw = r#"```json
{"intent": "CREATE", "tasks": [
  {"description": "Fix the pump", "assigned_agency": "Steno",
   "deadline_date": "2024-03-08", "priority": "High"},
  {"description": "Inspect the well", "assigned_agency": null,
   "deadline_date": null, "priority": null}
]}
```"#;
        let ExtractionOutcome::Create(tasks) = parse_response(raw, "").unwrap() else {
            panic!("expected CREATE");
        };
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].description.as_deref(), Some("Fix the pump"));
        assert_eq!(tasks[0].deadline_date.as_deref(), Some("2024-03-08"));
        assert!(tasks[1].assigned_agency.is_none());
        assert!(tasks[1].deadline_date.is_none());
    }

    #[test]
    fn flat_single_task_object_is_wrapped() {
        let raw = r#"{"intent": "CREATE", "description": "Fix the pump"}"#;
        let ExtractionOutcome::Create(tasks) = parse_response(raw, "").unwrap() else {
            panic!("expected CREATE");
        };
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].description.as_deref(), Some("Fix the pump"));
    }

    #[test]
    fn query_uses_fallback_when_search_missing() {
        let raw = r#"{"intent": "QUERY"}"#;
        let ExtractionOutcome::Query(q) =
            parse_response(raw, "ask pending tasks").unwrap()
        else {
            panic!("expected QUERY");
        };
        assert_eq!(q, "ask pending tasks");
    }

    #[test]
    fn non_json_is_an_extraction_error() {
        let err = parse_response("I could not understand that.", "").unwrap_err();
        assert!(matches!(err, Error::Extraction(_)));
    }

    #[test]
    fn missing_intent_is_an_extraction_error() {
        let err = parse_response(r#"{"tasks": []}"#, "").unwrap_err();
        assert!(err.to_string().contains("intent"));
    }

    #[test]
    fn prompt_embeds_roster_and_date() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let roster = vec!["Ramlal Korram -> Steno".to_string()];
        let prompt = rules(today, &roster, Some("Tell Steno to fix the pump"));
        assert!(prompt.contains("2024-03-04"));
        assert!(prompt.contains("Ramlal Korram -> Steno"));
        assert!(prompt.contains("Tell Steno to fix the pump"));
    }
}
