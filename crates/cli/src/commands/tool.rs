use bookstore_core::DomainError;
use serde_json::Value;

use super::{
    async_runtime, load_runtime, CommandResult, EXIT_INVALID_INPUT, EXIT_RUNTIME,
    EXIT_UNKNOWN_TOOL,
};

const COMMAND: &str = "tool";

pub fn run(name: &str, input: Option<&str>) -> CommandResult {
    let input = match input.map(str::trim).filter(|raw| !raw.is_empty()) {
        Some(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(value) => value,
            Err(error) => {
                return CommandResult::failure(
                    COMMAND,
                    "invalid_input",
                    format!("--input is not valid JSON: {error}"),
                    EXIT_INVALID_INPUT,
                );
            }
        },
        None => Value::Object(Default::default()),
    };

    let (_, runtime) = match load_runtime(COMMAND) {
        Ok(loaded) => loaded,
        Err(failure) => return failure,
    };
    let executor = match async_runtime(COMMAND) {
        Ok(executor) => executor,
        Err(failure) => return failure,
    };

    match executor.block_on(runtime.invoke_tool(name, input)) {
        Ok(output) => {
            let message = match output.as_text() {
                Some(text) => text.to_string(),
                None => output.as_lines().join("\n"),
            };
            CommandResult::success(COMMAND, message)
        }
        Err(error) => match error.downcast_ref::<DomainError>() {
            Some(DomainError::UnknownTool(_)) => CommandResult::failure(
                COMMAND,
                "unknown_tool",
                format!("{error}; available: {}", runtime.tools().names().join(", ")),
                EXIT_UNKNOWN_TOOL,
            ),
            Some(_) => {
                CommandResult::failure(COMMAND, "invalid_input", error.to_string(), EXIT_INVALID_INPUT)
            }
            None => CommandResult::failure(COMMAND, "tool_failed", format!("{error:#}"), EXIT_RUNTIME),
        },
    }
}
