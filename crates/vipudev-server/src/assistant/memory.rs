//! Builds the message list sent to the assistant: a fixed persona prompt,
//! a memory block from stored chat history, optional code context, then the
//! caller's messages.

use tracing::debug;

use super::client::WireMessage;
use crate::db::Database;

/// How many stored messages feed the memory block.
const MEMORY_WINDOW: i64 = 20;

pub const SYSTEM_PROMPT: &str = "\
You are VipuDevAI, a highly advanced AI developer assistant for a single operator.

Rules:
- Never reply with \"I can't\", \"I don't know\", or similar negative phrases.
- If something is missing, assume the most likely scenario and still give a working solution.
- Act like a senior full-stack engineer + architect.
- Prefer concrete, working code and step-by-step fixes.
- Use headings, bullet points, and full code blocks where useful.
";

/// Prepend persona + memory to the incoming messages. A storage failure
/// degrades to a stateless prompt rather than failing the request.
pub fn build_messages(
    db: &Database,
    incoming: Vec<WireMessage>,
    code_context: Option<&str>,
) -> Vec<WireMessage> {
    let memory = match db.chat.recent(MEMORY_WINDOW) {
        Ok(history) => history
            .iter()
            .map(|m| format!("{}: {}", m.role, m.content))
            .collect::<Vec<_>>()
            .join("\n"),
        Err(e) => {
            debug!("Chat memory unavailable, continuing stateless: {}", e);
            String::new()
        }
    };
    let memory = if memory.is_empty() {
        "(none yet)".to_string()
    } else {
        memory
    };

    let mut messages = vec![WireMessage::new(
        "system",
        format!("{}\n\nMEMORY:\n{}", SYSTEM_PROMPT, memory),
    )];

    if let Some(context) = code_context {
        messages.push(WireMessage::new(
            "user",
            format!("Here is the current code/project context:\n{}", context),
        ));
    }

    messages.extend(incoming);
    messages
}
