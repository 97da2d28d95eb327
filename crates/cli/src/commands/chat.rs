use anyhow::Result;
use bookstore_agent::{AgentRuntime, Session};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::debug;

use super::{async_runtime, load_runtime, CommandResult, EXIT_RUNTIME};

const COMMAND: &str = "chat";

pub fn run() -> CommandResult {
    let (_, runtime) = match load_runtime(COMMAND) {
        Ok(loaded) => loaded,
        Err(failure) => return failure,
    };
    let executor = match async_runtime(COMMAND) {
        Ok(executor) => executor,
        Err(failure) => return failure,
    };

    let stdin = BufReader::new(tokio::io::stdin());
    match executor.block_on(converse(&runtime, stdin, tokio::io::stdout())) {
        Ok(turns) => {
            CommandResult::success(COMMAND, format!("conversation ended after {turns} messages"))
        }
        Err(error) => CommandResult::failure(COMMAND, "chat_failed", format!("{error:#}"), EXIT_RUNTIME),
    }
}

/// Reads one customer message per line until EOF or `exit`, writing each
/// agent reply. Returns the number of messages answered.
pub async fn converse<R, W>(runtime: &AgentRuntime, reader: R, mut writer: W) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut session = Session::new();
    let name = runtime.blueprint().name.clone();
    writer
        .write_all(
            format!("{name}: Hi! Ask me about books, stock or the store. Type `exit` to leave.\n")
                .as_bytes(),
        )
        .await?;

    let mut lines = reader.lines();
    let mut turns = 0;
    loop {
        writer.write_all(b"you> ").await?;
        writer.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if matches!(text.to_ascii_lowercase().as_str(), "exit" | "quit") {
            break;
        }

        let reply = runtime.handle_message(&mut session, text).await?;
        debug!(
            event_name = "cli.chat.reply",
            session_id = %session.id,
            journey_state = ?reply.journey_state,
            "reply written"
        );
        writer.write_all(format!("{name}: {}\n", reply.text).as_bytes()).await?;
        turns += 1;
    }

    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(turns)
}
