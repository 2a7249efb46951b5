use serde::Deserialize;
use thiserror::Error;

use crate::session::models::CandidateRecord;

/// Words that end the conversation when typed into the Name field.
const EXIT_KEYWORDS: &[&str] = &["exit", "quit", "end"];

pub const SUCCESS_NOTICE: &str = "✅ Information collected successfully!";
pub const MISSING_FIELDS_NOTICE: &str = "❌ All fields are mandatory. Please fill out every field.";
pub const EXIT_NOTICE: &str = "Conversation ended. Thank you for your time!";

/// Raw intake form as submitted. Absent fields deserialize as empty strings
/// so they fail the completeness check instead of the request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IntakeForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub experience: String,
    pub position: String,
    pub location: String,
    pub tech_stack: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntakeError {
    #[error("exit requested")]
    ExitRequested,

    #[error("missing mandatory fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
}

impl IntakeError {
    /// Text shown to the candidate for this outcome.
    pub fn notice(&self) -> &'static str {
        match self {
            IntakeError::ExitRequested => EXIT_NOTICE,
            IntakeError::MissingFields(_) => MISSING_FIELDS_NOTICE,
        }
    }
}

/// True if `input` contains any exit keyword, ignoring case.
///
/// Plain substring match: "Bend" or "Quinten" also trigger it.
pub fn check_exit(input: &str) -> bool {
    let lowered = input.to_lowercase();
    EXIT_KEYWORDS.iter().any(|kw| lowered.contains(kw))
}

/// Validates a submitted form into a `CandidateRecord`.
///
/// Order matters: the exit check (Name only) runs before the completeness check,
/// so an exit request wins even when other fields are empty.
pub fn validate(form: IntakeForm) -> Result<CandidateRecord, IntakeError> {
    if check_exit(&form.name) {
        return Err(IntakeError::ExitRequested);
    }

    let labelled = [
        ("Full Name", &form.name),
        ("Email Address", &form.email),
        ("Phone Number", &form.phone),
        ("Years of Experience", &form.experience),
        ("Desired Position(s)", &form.position),
        ("Current Location", &form.location),
        ("Tech Stack", &form.tech_stack),
    ];
    let missing: Vec<&'static str> = labelled
        .iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(label, _)| *label)
        .collect();

    if !missing.is_empty() {
        return Err(IntakeError::MissingFields(missing));
    }

    Ok(CandidateRecord {
        name: form.name,
        email: form.email,
        phone: form.phone,
        experience: form.experience,
        position: form.position,
        location: form.location,
        tech_stack: form.tech_stack,
    })
}

#[cfg(test)]
pub(crate) fn complete_form(tech_stack: &str) -> IntakeForm {
    IntakeForm {
        name: "Grace Hopper".to_string(),
        email: "grace@example.com".to_string(),
        phone: "555-0100".to_string(),
        experience: "7".to_string(),
        position: "Platform Engineer".to_string(),
        location: "Arlington".to_string(),
        tech_stack: tech_stack.to_string(),
    }
}
