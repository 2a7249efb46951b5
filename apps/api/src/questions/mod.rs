// Question generation: one Gemini call per tech stack, cached in the session.
// All LLM calls go through llm_client.

pub mod generator;
pub mod prompts;
