use serde_json::{json, Value};

/// Sampling temperature for every generation call.
pub const TEMPERATURE: f32 = 0.3;

/// Name under which the schema is declared to the provider.
pub const SCHEMA_NAME: &str = "optimized_prompt";

/// JSON schema the response is constrained to.
pub fn response_schema() -> Value {
    let string = json!({ "type": "string" });
    json!({
        "type": "object",
        "properties": {
            "status": string,
            "summary": string,
            "items": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "title": string,
                        "description": string,
                        "details": {
                            "type": "object",
                            "properties": {
                                "kv_pairs": {
                                    "type": "array",
                                    "items": {
                                        "type": "object",
                                        "properties": {
                                            "key": string,
                                            "value": string,
                                        },
                                        "required": ["key", "value"],
                                    },
                                },
                            },
                        },
                    },
                    "required": ["title", "description"],
                },
            },
            "actions": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "label": string,
                        "type": string,
                        "payload": string,
                    },
                    "required": ["label", "type", "payload"],
                },
            },
            "debug": {
                "type": "object",
                "properties": {
                    "notes": string,
                },
                "required": ["notes"],
            },
        },
        "required": ["status", "summary", "items", "actions", "debug"],
    })
}
