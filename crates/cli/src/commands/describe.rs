use bookstore_agent::{AgentBlueprint, AgentDescription};
use bookstore_core::config::{AppConfig, LoadOptions};

use super::{CommandResult, EXIT_CONFIG};

pub fn run(json_output: bool) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "describe",
                "config_validation",
                error.to_string(),
                EXIT_CONFIG,
            );
        }
    };
    let description = AgentBlueprint::bookstore(&config.agent).describe();

    if json_output {
        return match serde_json::to_string_pretty(&description) {
            Ok(output) => CommandResult::text(output),
            Err(error) => CommandResult::failure("describe", "serialization", error.to_string(), 1),
        };
    }
    CommandResult::text(render_human(&description))
}

fn render_human(description: &AgentDescription) -> String {
    let mut lines = vec![format!("{}: {}", description.name, description.description)];

    lines.push("glossary:".to_string());
    for term in &description.terms {
        lines.push(format!("- {}: {}", term.name, term.description));
    }

    lines.push("journeys:".to_string());
    for journey in &description.journeys {
        lines.push(format!(
            "- {} ({} states, {} transitions): {}",
            journey.metadata.title,
            journey.states,
            journey.transitions,
            journey.metadata.description
        ));
        for condition in &journey.metadata.conditions {
            lines.push(format!("  when: {condition}"));
        }
    }

    lines.push("guidelines:".to_string());
    for guideline in &description.guidelines {
        match &guideline.action {
            Some(action) => lines.push(format!(
                "- [{}] when: {} -> {}",
                guideline.id, guideline.condition, action
            )),
            None => lines.push(format!("- [{}] observe: {}", guideline.id, guideline.condition)),
        }
    }

    lines.join("\n")
}
