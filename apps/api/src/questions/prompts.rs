// All LLM prompt text for question generation.

/// Question prompt template. Replace `{tech_stack}` before sending.
pub const QUESTION_PROMPT_TEMPLATE: &str = "Generate 3 to 5 technical interview questions for a candidate skilled in {tech_stack}. \
    The questions should focus on practical knowledge, real-world application, \
    theoretical understanding, and coding concepts. Ensure each question is clear, concise, \
    and written on a new line without numbering or bullet points.";

/// Shown when the model call fails for any reason.
pub const FALLBACK_NOTICE: &str = "I'm sorry, I didn't quite understand that. \
    Could you please rephrase your input or provide more details?";

/// Shown whenever a render pass ends up with no questions to display.
pub const NO_QUESTIONS_NOTICE: &str = "Failed to generate questions. Please try again later.";

pub fn build_prompt(tech_stack: &str) -> String {
    QUESTION_PROMPT_TEMPLATE.replace("{tech_stack}", tech_stack)
}
