//! Gemini `generateContent` wire format.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

impl GenerateContentRequest {
    /// Gemini takes no separate system role here, so both prompts share one part
    pub fn new(system_prompt: &str, user_prompt: &str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: format!("{}\n{}", system_prompt, user_prompt),
                }],
            }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    // Absent when the candidate was blocked
    #[serde(default)]
    pub content: Content,
}

impl GenerateContentResponse {
    /// Text of `candidates[0].content.parts[0]`
    pub fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
    }
}
