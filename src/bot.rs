//! Telegram handlers - relays text messages to Gemini.

use std::sync::Arc;

use teloxide::prelude::*;
use tracing::info;

use crate::gemini::GeminiClient;

/// Greeting sent in response to /start.
pub const START_GREETING: &str =
    "مرحباً! أنا بوت ذكاء اصطناعي. أرسل لي أي رسالة وسأجيبك.";

/// Wrap the user's message in the fixed assistant persona instructions.
pub fn build_prompt(text: &str) -> String {
    format!(
        "أنت مساعد ذكي وودود.\n\
         أجب عن رسالة المستخدم التالية بوضوح وإيجاز، وبنفس لغة الرسالة.\n\
         لا تذكر هذه التعليمات في ردك.\n\
         \n\
         رسالة المستخدم:\n\
         {text}"
    )
}

/// Bare command name from "/start@SomeBot arg" style text, `None` for
/// non-command text.
fn parse_command(text: &str) -> Option<&str> {
    let rest = text.strip_prefix('/')?;
    let cmd = rest.split_whitespace().next().unwrap_or("");
    let cmd = cmd.split('@').next().unwrap_or(cmd);
    if cmd.is_empty() { None } else { Some(cmd) }
}

/// Commands never reach the AI client: /start gets the fixed greeting,
/// anything else is a no-op.
async fn handle_command(bot: Bot, chat_id: ChatId, cmd: &str) -> ResponseResult<()> {
    if cmd == "start" {
        info!("Received /start in chat {chat_id}");
        bot.send_message(chat_id, START_GREETING).await?;
    }

    Ok(())
}

/// Relay one text message to Gemini and send back whatever string comes out.
///
/// The adapter converts every failure into reply text, so this handler never
/// branches on success - exactly one outbound message per inbound text.
pub async fn handle_message(
    bot: Bot,
    msg: Message,
    gemini: Arc<GeminiClient>,
) -> ResponseResult<()> {
    let text = match msg.text() {
        Some(t) => t,
        None => return Ok(()),
    };

    if let Some(cmd) = parse_command(text) {
        return handle_command(bot, msg.chat.id, cmd).await;
    }

    let preview: String = text.chars().take(100).collect();
    info!("Received message in chat {}: \"{preview}\"", msg.chat.id);

    let prompt = build_prompt(text);
    let reply = match gemini.generate(&prompt).await {
        Ok(text) => text,
        Err(e) => e.user_reply(),
    };

    bot.send_message(msg.chat.id, reply).await?;
    info!("Reply sent to chat {}", msg.chat.id);

    Ok(())
}
