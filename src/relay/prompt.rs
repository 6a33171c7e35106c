//! Instruction turns prepended to every chat request.
//!
//! Templates live in `config/prompts/` and are compiled in. `{{context}}` in
//! the grounded template is replaced verbatim with the retrieved text.

use crate::llm::ChatTurn;

const ASSISTANT_TEMPLATE: &str = include_str!("../../config/prompts/assistant.txt");
const GROUNDED_TEMPLATE: &str = include_str!("../../config/prompts/grounded_assistant.txt");

/// Instruction turns for a request, grounded when `context` is present.
pub fn instruction_turns(context: Option<&str>) -> Vec<ChatTurn> {
    let text = match context {
        Some(ctx) => GROUNDED_TEMPLATE.trim_end().replace("{{context}}", ctx),
        None => ASSISTANT_TEMPLATE.trim_end().to_string(),
    };
    vec![ChatTurn::system(text)]
}

/// Full outbound turn list: instructions first, then the caller's turns in
/// conversation order.
pub fn build_prompt(context: Option<&str>, turns: Vec<ChatTurn>) -> Vec<ChatTurn> {
    let mut prompt = instruction_turns(context);
    prompt.extend(turns);
    prompt
}
