//! Personas and degraded responses
//!
//! A persona is a system prompt paired with the text returned when a
//! completion under that persona cannot be produced.

use serde::{Deserialize, Serialize};

/// Returned by `complete_text` whenever a completion fails for any reason
pub const GENERIC_FALLBACK_TEXT: &str =
    "I apologize, but I'm having trouble processing your request right now. Please try again later.";

/// Named system-prompt configuration layered over the role-aware completion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    pub name: String,
    pub system_prompt: String,
    pub fallback_text: String,
}

impl Persona {
    pub fn new(
        name: impl Into<String>,
        system_prompt: impl Into<String>,
        fallback_text: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            system_prompt: system_prompt.into(),
            fallback_text: fallback_text.into(),
        }
    }

    /// Farming and crop-management advisor
    pub fn agricultural_advice() -> Self {
        Self::new(
            "agricultural-advice",
            "You are an expert agricultural consultant for AgroConnect World.\n\
             Provide practical, science-based advice on farming, crop management,\n\
             sustainable agriculture, and agricultural technology.\n\
             Focus on actionable recommendations and best practices.\n\
             Keep responses concise (under 200 words) and easy to understand.\n\
             If you don't know something specific, suggest consulting with local agricultural experts.",
            "I apologize, but I'm having trouble providing agricultural advice right now. Please try again later or contact our support team.",
        )
    }

    /// Platform technical support
    pub fn technical_support() -> Self {
        Self::new(
            "technical-support",
            "You are a technical support specialist for AgroConnect World's agricultural technology platform.\n\
             Help users with questions about our smart analytics, community features, and marketplace tools.\n\
             Provide clear, step-by-step guidance when possible.\n\
             If the issue requires human intervention, suggest contacting our support team.\n\
             Keep responses helpful and professional.",
            "I apologize, but I'm having trouble providing technical support right now. Please contact our support team directly.",
        )
    }

    pub fn builtin() -> Vec<Persona> {
        vec![Self::agricultural_advice(), Self::technical_support()]
    }
}

/// Find a persona by name, case-insensitively
pub fn find_persona<'a>(personas: &'a [Persona], name: &str) -> Option<&'a Persona> {
    personas.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}
