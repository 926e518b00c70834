//! Prompt Builder: turns `(task id, params)` into the system + user messages.
//!
//! Pure string construction. The only check on params is presence: required
//! keys must be present and non-blank. Domain values (counts, lengths, tones)
//! are interpolated verbatim.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::generation::error::GenerationError;
use crate::generation::prompts::{template_for, PromptTemplate};
use crate::generation::tasks::{find_task, OutputShape, TaskSpec};
use crate::llm_client::prompts::{JSON_ONLY_DIRECTIVE, PLAIN_TEXT_DIRECTIVE};
use crate::llm_client::{ChatMessage, PromptMessages};

/// Caller-supplied task inputs, keyed by the template's placeholder names.
pub type Params = Map<String, Value>;

/// Builds the messages for one call of `task_id`.
pub fn build_prompt(task_id: &str, params: &Params) -> Result<PromptMessages, GenerationError> {
    let (task, template) = lookup(task_id)?;
    let values = resolve_params(template, params)?;

    Ok(vec![
        ChatMessage::system(system_instruction(task, template, &values)),
        ChatMessage::user(render(template.user_template, &values)),
    ])
}

/// Presence check only, without building anything.
pub fn validate_params(task_id: &str, params: &Params) -> Result<(), GenerationError> {
    let (_, template) = lookup(task_id)?;
    resolve_params(template, params).map(|_| ())
}

/// The params a fresh form starts with: blank required fields plus defaults.
pub fn default_params(task_id: &str) -> Result<Params, GenerationError> {
    let (_, template) = lookup(task_id)?;
    let mut params = Params::new();
    for key in template.required {
        params.insert(key.to_string(), Value::String(String::new()));
    }
    for (key, default) in template.defaults {
        params.insert(key.to_string(), Value::String(default.to_string()));
    }
    Ok(params)
}

fn lookup(task_id: &str) -> Result<(&'static TaskSpec, &'static PromptTemplate), GenerationError> {
    find_task(task_id)
        .zip(template_for(task_id))
        .ok_or_else(|| GenerationError::UnknownTask(task_id.to_string()))
}

fn resolve_params<'t>(
    template: &'t PromptTemplate,
    params: &Params,
) -> Result<HashMap<&'t str, String>, GenerationError> {
    let supplied = |key: &str| {
        params
            .get(key)
            .and_then(render_value)
            .filter(|v| !v.trim().is_empty())
    };

    let mut values = HashMap::new();
    for &key in template.required {
        let value = supplied(key).ok_or_else(|| GenerationError::EmptyInput {
            field: key.to_string(),
        })?;
        values.insert(key, value);
    }
    for &(key, default) in template.defaults {
        values.insert(key, supplied(key).unwrap_or_else(|| default.to_string()));
    }
    Ok(values)
}

/// Renders a param as prompt text. `null` counts as absent.
fn render_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(render_value)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        Value::Object(_) => Some(value.to_string()),
    }
}

fn system_instruction(
    task: &TaskSpec,
    template: &PromptTemplate,
    values: &HashMap<&str, String>,
) -> String {
    let contract = match task.output_shape {
        OutputShape::Text => PLAIN_TEXT_DIRECTIVE.to_string(),
        OutputShape::JsonArray => format!(
            "Respond with a JSON array. Each element must be an object with exactly these fields:\n{}\n{}",
            field_list(template),
            JSON_ONLY_DIRECTIVE
        ),
        OutputShape::JsonObject => format!(
            "Respond with a single JSON object with exactly these fields:\n{}\n{}",
            field_list(template),
            JSON_ONLY_DIRECTIVE
        ),
    };

    format!(
        "{}\n\n{}\n\n{}",
        template.persona,
        render(template.rules, values),
        contract
    )
}

fn field_list(template: &PromptTemplate) -> String {
    template
        .fields
        .iter()
        .map(|f| format!("- \"{}\" ({}): {}", f.name, f.kind.json_type(), f.description))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Single-pass `{key}` substitution. Unknown or malformed placeholders are
/// left as-is, and substituted values are never re-scanned.
fn render(template: &str, values: &HashMap<&str, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let key = after.find('}').map(|close| &after[..close]);

        match key.and_then(|k| values.get(k).map(|v| (k, v))) {
            Some((k, value)) => {
                out.push_str(value);
                rest = &after[k.len() + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::tasks::{
        AD_COPY, BUSINESS_NAMES, PRODUCT_DESCRIPTION, SUMMARIZE, TASKS, TRANSLATE,
    };
    use crate::llm_client::Role;
    use serde_json::json;

    fn params(value: Value) -> Params {
        match value {
            Value::Object(map) => map,
            _ => panic!("params fixture must be an object"),
        }
    }

    /// Fills every required param of a task with a placeholder value.
    fn complete_params(task_id: &str) -> Params {
        let template = template_for(task_id).unwrap();
        template
            .required
            .iter()
            .map(|k| (k.to_string(), json!("sample")))
            .collect()
    }

    #[test]
    fn test_messages_are_system_then_user() {
        let messages = build_prompt(BUSINESS_NAMES, &params(json!({"industry": "bakery"}))).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1].role, Role::User);
    }

    #[test]
    fn test_json_tasks_carry_only_json_directive_and_every_field() {
        for task in TASKS.iter().filter(|t| t.output_shape != OutputShape::Text) {
            let messages = build_prompt(task.id, &complete_params(task.id)).unwrap();
            let system = &messages[0].content;
            assert!(
                system.contains("Return only valid JSON"),
                "{} system prompt lacks the JSON directive",
                task.id
            );
            assert!(system.contains("no markdown fences"), "{}", task.id);
            for f in template_for(task.id).unwrap().fields {
                assert!(
                    system.contains(&format!("\"{}\" ({})", f.name, f.kind.json_type())),
                    "{} system prompt does not name field {}",
                    task.id,
                    f.name
                );
            }
        }
    }

    #[test]
    fn test_array_and_object_contracts_differ() {
        let array = build_prompt(AD_COPY, &complete_params(AD_COPY)).unwrap();
        let object = build_prompt(PRODUCT_DESCRIPTION, &complete_params(PRODUCT_DESCRIPTION)).unwrap();
        assert!(array[0].content.contains("JSON array"));
        assert!(object[0].content.contains("single JSON object"));
    }

    #[test]
    fn test_text_tasks_ask_for_plain_text() {
        let messages = build_prompt(SUMMARIZE, &params(json!({"text": "Long article."}))).unwrap();
        assert!(messages[0].content.contains(PLAIN_TEXT_DIRECTIVE));
        assert!(!messages[0].content.contains("JSON"));
        assert!(messages[1].content.ends_with("Long article."));
    }

    #[test]
    fn test_constraints_are_interpolated_verbatim() {
        let messages = build_prompt(
            AD_COPY,
            &params(json!({
                "product": "noise-cancelling headphones",
                "audience": "commuters",
                "count": 4,
                "maxLength": 90,
                "platform": "Instagram"
            })),
        )
        .unwrap();
        assert!(messages[0].content.contains("Write exactly 4 ad variations for Instagram."));
        assert!(messages[0].content.contains("at most 90 characters"));
        assert_eq!(
            messages[1].content,
            "Write 4 persuasive ads for noise-cancelling headphones, aimed at commuters."
        );
    }

    #[test]
    fn test_defaults_fill_missing_optional_params() {
        let messages = build_prompt(BUSINESS_NAMES, &params(json!({"industry": "bakery"}))).unwrap();
        assert_eq!(
            messages[1].content,
            "Suggest 10 modern business names for a company in the bakery industry. \
            Keywords to draw from: none."
        );
    }

    #[test]
    fn test_missing_required_param_is_empty_input() {
        let err = build_prompt(BUSINESS_NAMES, &Params::new()).unwrap_err();
        assert!(matches!(err, GenerationError::EmptyInput { ref field } if field == "industry"));
    }

    #[test]
    fn test_blank_and_null_required_params_are_empty_input() {
        for value in [json!("   "), Value::Null, json!([])] {
            let err = build_prompt(TRANSLATE, &params(json!({"text": "Hola", "targetLanguage": value})))
                .unwrap_err();
            assert!(
                matches!(err, GenerationError::EmptyInput { ref field } if field == "targetLanguage")
            );
        }
    }

    #[test]
    fn test_unknown_task_is_rejected() {
        let err = build_prompt("tarotReading", &Params::new()).unwrap_err();
        assert!(matches!(err, GenerationError::UnknownTask(_)));
    }

    #[test]
    fn test_values_with_braces_are_not_reinterpolated() {
        let messages = build_prompt(
            SUMMARIZE,
            &params(json!({"text": "Use {length} and {\"a\": 1} literally."})),
        )
        .unwrap();
        assert!(messages[1].content.ends_with("Use {length} and {\"a\": 1} literally."));
    }

    #[test]
    fn test_array_params_are_joined() {
        let messages = build_prompt(
            BUSINESS_NAMES,
            &params(json!({"industry": "coffee", "keywords": ["bean", "roast"]})),
        )
        .unwrap();
        assert!(messages[1].content.contains("Keywords to draw from: bean, roast."));
    }

    #[test]
    fn test_no_declared_placeholder_survives() {
        for task in TASKS {
            let template = template_for(task.id).unwrap();
            let messages = build_prompt(task.id, &complete_params(task.id)).unwrap();
            for key in template
                .required
                .iter()
                .chain(template.defaults.iter().map(|(k, _)| k))
            {
                let placeholder = format!("{{{key}}}");
                for m in &messages {
                    assert!(
                        !m.content.contains(&placeholder),
                        "{} left {placeholder} in a message",
                        task.id
                    );
                }
            }
        }
    }

    #[test]
    fn test_default_params_blank_required_fields() {
        let defaults = default_params(BUSINESS_NAMES).unwrap();
        assert_eq!(defaults["industry"], json!(""));
        assert_eq!(defaults["count"], json!("10"));
        assert!(validate_params(BUSINESS_NAMES, &defaults).is_err());
    }

    #[test]
    fn test_render_leaves_unknown_placeholders() {
        let values = HashMap::from([("a", "1".to_string())]);
        assert_eq!(render("{a}{b}{ {a", &values), "1{b}{ {a");
    }
}
