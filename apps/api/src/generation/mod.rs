// Generation layer: task registry, model routing, prompt building, response
// extraction and the facade that composes them.
// All provider calls go through llm_client; nothing here opens a connection.

pub mod error;
pub mod extractor;
pub mod generator;
pub mod handlers;
pub mod prompt_builder;
pub mod prompts;
pub mod records;
pub mod router;
pub mod tasks;

#[cfg(test)]
pub(crate) mod test_support;
