// Shared prompt fragments. Each generation task defines its own persona and
// template in generation::prompts; the cross-cutting output contracts live here.

/// Directive every structured-output system prompt must carry.
/// The response extractor depends on it; do not soften the wording.
pub const JSON_ONLY_DIRECTIVE: &str =
    "Return only valid JSON, no prose, no markdown fences. \
    Do NOT include explanations, apologies or any text outside the JSON.";

/// Output contract for plain-prose tasks.
pub const PLAIN_TEXT_DIRECTIVE: &str = "Respond with the requested text only. \
    Do NOT add a preamble, a title, closing remarks or markdown formatting.";
