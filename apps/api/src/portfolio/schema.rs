//! Structured-output contracts for the two generation tasks.
//!
//! These values are sent verbatim as the response schema and reused by
//! `llm_client::schema::validate` to check what comes back. Enum lists are
//! derived from the model enums so the contract cannot drift from the types.

use serde_json::{json, Value};

use crate::models::portfolio::{Confidence, EventType};

/// Contract for the DeepFolio timeline. Deserializes into `GenerationOutput`.
pub fn timeline_schema() -> Value {
    let event_types: Vec<&str> = EventType::ALL.iter().map(|t| t.as_str()).collect();
    let confidences: Vec<&str> = Confidence::ALL.iter().map(|c| c.as_str()).collect();

    json!({
        "type": "OBJECT",
        "properties": {
            "timeline": {
                "type": "ARRAY",
                "description": "A chronological list of professional and learning events, ordered newest to oldest.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "date": {
                            "type": "STRING",
                            "description": "The date of the event in YYYY-MM-DD format. Best effort estimation is acceptable."
                        },
                        "title": {
                            "type": "STRING",
                            "description": "A concise title for the event (5-8 words)."
                        },
                        "type": {
                            "type": "STRING",
                            "description": "Categorize the event.",
                            "enum": event_types
                        },
                        "bullets": {
                            "type": "ARRAY",
                            "description": "1-2 summary bullet points describing the event. Each bullet should frame an action with a measurable or qualitative outcome.",
                            "items": { "type": "STRING" }
                        },
                        "tags": {
                            "type": "ARRAY",
                            "description": "Relevant tags such as skills, technologies, or roles.",
                            "items": { "type": "STRING" }
                        },
                        "confidence": {
                            "type": "STRING",
                            "description": "Confidence level of the extraction (high, medium, or low), especially regarding dates.",
                            "enum": confidences
                        },
                        "inference_explanation": {
                            "type": "STRING",
                            "description": "If an inference was made, explain the reasoning here."
                        }
                    },
                    "required": ["date", "title", "type", "bullets", "tags", "confidence"]
                }
            },
            "needs_user_verification": {
                "type": "ARRAY",
                "description": "Items that could not be confidently extracted and require user verification.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "item": {
                            "type": "STRING",
                            "description": "The text or concept that was unclear."
                        },
                        "reason": {
                            "type": "STRING",
                            "description": "Why this item needs verification."
                        }
                    },
                    "required": ["item", "reason"]
                }
            }
        },
        "required": ["timeline"]
    })
}

/// Contract for the simple portfolio. Deserializes into `SimplePortfolioData`.
pub fn simple_portfolio_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "name": {
                "type": "STRING",
                "description": "The full name of the individual, extracted from the resume."
            },
            "title": {
                "type": "STRING",
                "description": "The most recent job title or professional headline."
            },
            "summary": {
                "type": "STRING",
                "description": "A 2-4 sentence professional summary highlighting key skills and experience."
            },
            "experience": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "title": { "type": "STRING" },
                        "company": { "type": "STRING" },
                        "date": {
                            "type": "STRING",
                            "description": "e.g., 'Jun 2022 - Present' or 'Jan 2021 - Dec 2021'"
                        },
                        "bullets": {
                            "type": "ARRAY",
                            "items": { "type": "STRING" },
                            "description": "Action-oriented bullet points describing achievements."
                        }
                    },
                    "required": ["title", "company", "date", "bullets"]
                }
            },
            "projects": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "title": { "type": "STRING" },
                        "date": { "type": "STRING", "description": "e.g., 'Fall 2023'" },
                        "description": { "type": "STRING" },
                        "tech_stack": { "type": "ARRAY", "items": { "type": "STRING" } }
                    },
                    "required": ["title", "date", "description", "tech_stack"]
                }
            },
            "skills": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "category": {
                            "type": "STRING",
                            "description": "e.g., 'Programming Languages', 'Frameworks', 'Cloud'"
                        },
                        "list": { "type": "ARRAY", "items": { "type": "STRING" } }
                    },
                    "required": ["category", "list"]
                }
            }
        },
        "required": ["name", "title", "summary", "experience", "projects", "skills"]
    })
}
