//! JSON Schemas for taxonomy documents, checked before any record reaches the engine.

use serde_json::{Value, json};

pub const SEGMENT_SCHEMA_ID: &str = "taxoguard.segment.v1";
pub const CATALOG_SCHEMA_ID: &str = "taxoguard.compliance.v1";

fn string_list() -> Value {
    json!({ "type": "array", "items": { "type": "string" } })
}

/// Schema of one environment or segment document.
pub fn segment_document_schema() -> Value {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": SEGMENT_SCHEMA_ID,
        "description": "One environment (level \"1\") or segment (level \"2\") record. `id` defaults to the file stem. Top-level `compliance` is for environments; segments declare it per override.",
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "id": { "type": "string", "minLength": 1 },
            "name": { "type": "string" },
            "description": { "type": "string" },
            "level": {
                "oneOf": [
                    { "type": "string", "enum": ["1", "2"] },
                    { "type": "integer", "enum": [1, 2] }
                ]
            },
            "parents": string_list(),
            "overrides": {
                "type": "object",
                "additionalProperties": {
                    "type": "object",
                    "additionalProperties": false,
                    "properties": {
                        "compliance": string_list(),
                        "labels": string_list()
                    }
                }
            },
            "labels": string_list(),
            "compliance": string_list(),
            "prominence": { "type": "integer", "minimum": 0 },
            "sensitivity": { "type": "string" },
            "criticality": { "type": "string" }
        }
    })
}

/// Schema of `compliance.yaml`: requirement ID -> requirement.
pub fn catalog_schema() -> Value {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": CATALOG_SCHEMA_ID,
        "type": "object",
        "additionalProperties": {
            "type": "object",
            "additionalProperties": false,
            "required": ["name"],
            "properties": {
                "name": { "type": "string", "minLength": 1 },
                "description": { "type": "string" },
                "reference": { "type": "string" }
            }
        }
    })
}
