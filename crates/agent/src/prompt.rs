use anyhow::{Context as _, Result};
use tera::{Context, Tera};

use crate::agent::AgentBlueprint;

const SYSTEM_TEMPLATE: &str = r#"You are {{ name }}. {{ description }}
Only talk about the bookstore, its books and orders.
Known facts:
{% for term in terms %}- {{ term.name }}: {{ term.description }}
{% endfor %}"#;

const REPLY_TEMPLATE: &str = r#"Customer said: "{{ message }}"
{% if instruction %}Instruction: {{ instruction }}
{% endif %}Rewrite the draft reply below in a friendly tone. Keep every title, status, date and fact exactly as written.
Draft reply:
{{ draft }}"#;

pub fn render_system(agent: &AgentBlueprint) -> Result<String> {
    let mut context = Context::new();
    context.insert("name", &agent.name);
    context.insert("description", &agent.description);
    context.insert("terms", agent.glossary.terms());
    Tera::one_off(SYSTEM_TEMPLATE, &context, false).context("failed to render system prompt")
}

pub fn render_reply(message: &str, instruction: Option<&str>, draft: &str) -> Result<String> {
    let mut context = Context::new();
    context.insert("message", message);
    context.insert("instruction", &instruction.unwrap_or_default());
    context.insert("draft", draft);
    Tera::one_off(REPLY_TEMPLATE, &context, false).context("failed to render reply prompt")
}

#[cfg(test)]
mod tests {
    use bookstore_core::config::AppConfig;

    use super::{render_reply, render_system};
    use crate::agent::AgentBlueprint;

    #[test]
    fn system_prompt_lists_glossary_facts() {
        let agent = AgentBlueprint::bookstore(&AppConfig::default().agent);
        let prompt = render_system(&agent).expect("renders");
        assert!(prompt.starts_with("You are Bookstore Agent."));
        assert!(prompt.contains("- Store Hours: Store hours are Monday to Saturday, 9 AM to 8 PM"));
    }

    #[test]
    fn reply_prompt_omits_missing_instruction() {
        let prompt = render_reply("hello", None, "Hi there!").expect("renders");
        assert!(!prompt.contains("Instruction:"));
        assert!(prompt.ends_with("Hi there!"));

        let guided =
            render_reply("dune?", Some("Tell the customer the stock status"), "Out of stock")
                .expect("renders");
        assert!(guided.contains("Instruction: Tell the customer the stock status"));
    }
}
