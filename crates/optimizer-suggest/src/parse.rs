use optimizer_core::StructuredResult;

/// Parse raw generator output into a `StructuredResult`.
///
/// Nothing beyond JSON decoding into the result shape is checked.
pub fn parse_result(raw: &str) -> Result<StructuredResult, serde_json::Error> {
    serde_json::from_str(strip_code_fence(raw.trim()))
}

/// Some providers wrap JSON output in a ```json fence even in JSON mode.
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return text;
    };
    // Drop the info string ("json") on the opening line.
    match body.find('\n') {
        Some(nl) => body[nl + 1..].trim(),
        None => body.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use optimizer_core::ResultStatus;

    const BODY: &str = r#"{
        "status": "ok",
        "summary": "Tightened persona and output format",
        "items": [
            {"title": "Prompt Optimizado", "description": "Resumen",
             "details": {"kv_pairs": [{"key": "code", "value": "<SYSTEM>...</SYSTEM>"}]}},
            {"title": "Mejoras y Guardrails", "description": "Persona • Formato"}
        ],
        "actions": [{"label": "Copiar prompt", "type": "copy", "payload": "<SYSTEM>...</SYSTEM>"}],
        "debug": {"notes": "sin datos sensibles"}
    }"#;

    #[test]
    fn parses_a_well_formed_body() {
        let r = parse_result(&format!("\n  {BODY}  \n")).unwrap();
        assert_eq!(r.status, ResultStatus::Ok);
        assert_eq!(r.items.len(), 2);
        assert_eq!(r.items[0].code(), Some("<SYSTEM>...</SYSTEM>"));
        assert!(r.items[1].details.is_none());
        assert_eq!(r.debug.notes, "sin datos sensibles");
    }

    #[test]
    fn unwraps_fenced_json() {
        let fenced = format!("```json\n{BODY}\n```");
        assert!(parse_result(&fenced).is_ok());
    }

    #[test]
    fn rejects_non_json() {
        assert!(parse_result("Sorry, I can't help with that.").is_err());
        assert!(parse_result("").is_err());
        assert!(parse_result("```").is_err());
    }

    #[test]
    fn empty_details_object_is_accepted() {
        let r = parse_result(
            r#"{"status":"ok","summary":"s","items":[{"title":"Tests","description":"A • B","details":{}}],"actions":[],"debug":{"notes":""}}"#,
        )
        .unwrap();
        assert_eq!(r.items.len(), 1);
        assert_eq!(r.items[0].code(), None);
        assert_eq!(
            crate::render::render(&r).blocks,
            vec![crate::render::Block::Bullets {
                title: "Tests".to_string(),
                bullets: vec!["A".to_string(), "B".to_string()],
            }]
        );
    }

    #[test]
    fn rejects_missing_required_fields() {
        assert!(parse_result(r#"{"status": "ok", "summary": "x"}"#).is_err());
    }
}
