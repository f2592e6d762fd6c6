//! Local REPL transport for development. Network chat transports live
//! outside this repo; this one exercises the same pipeline through the
//! same interface types, including reply-driven mutations via `/reply`.

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::runtime;
use crate::state::AppState;
use crate::transport::{
    help_text, InboundMessage, InboundPayload, OutboundMessage, RepliedMessage,
};

pub async fn run(state: AppState) -> anyhow::Result<()> {
    let mut rl = DefaultEditor::new()?;
    println!("{}\n", help_text());
    println!("(/reply <text> edits the last confirmation, /quit exits)\n");

    // The REPL plays both sides of the reply correlation: it remembers
    // the last token-carrying confirmation, as a chat client would.
    let mut last_confirmation: Option<OutboundMessage> = None;

    loop {
        let line = match rl.readline("you> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(line);

        match line {
            "/quit" | "/exit" => break,
            "/start" => {
                println!("{}\n", help_text());
                continue;
            }
            _ => {}
        }

        let inbound = if let Some(reply) = line.strip_prefix("/reply ") {
            match &last_confirmation {
                Some(prev) => InboundMessage {
                    payload: InboundPayload::Text(reply.to_string()),
                    reply_to: Some(RepliedMessage {
                        token: prev.token,
                        text: prev.text.clone(),
                    }),
                },
                None => {
                    println!("bot> Nothing to reply to yet.\n");
                    continue;
                }
            }
        } else {
            InboundMessage {
                payload: InboundPayload::Text(line.to_string()),
                reply_to: None,
            }
        };

        for msg in runtime::handle_inbound(&state, inbound).await {
            println!("bot> {}\n", msg.text.replace('\n', "\n     "));
            if msg.token.is_some() {
                last_confirmation = Some(msg);
            }
        }
    }

    Ok(())
}
