use crate::platform::telegram::IncomingMessage;
use crate::platform::OutboundMessage;

pub const START_GREETING: &str = "Hi! I respond by echoing messages. Give it a try!";

/// Build the reply for an incoming message: a greeting for `/start`,
/// otherwise the text itself. Either way it is threaded under the original.
pub fn reply_for(msg: &IncomingMessage) -> OutboundMessage {
    let text = msg.text.as_deref().unwrap_or_default();

    let body = if text == "/start" {
        START_GREETING.to_string()
    } else {
        text.to_string()
    };

    OutboundMessage {
        chat_id: msg.chat.id,
        text: body,
        reply_to: Some(msg.message_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::telegram::Chat;

    fn incoming(message_id: i32, chat_id: i64, text: Option<&str>) -> IncomingMessage {
        IncomingMessage {
            message_id,
            chat: Chat { id: chat_id },
            text: text.map(str::to_string),
        }
    }

    #[test]
    fn test_start_gets_greeting() {
        let reply = reply_for(&incoming(7, 42, Some("/start")));
        assert_eq!(
            reply,
            OutboundMessage {
                chat_id: 42,
                text: START_GREETING.to_string(),
                reply_to: Some(7),
            }
        );
    }

    #[test]
    fn test_other_text_is_echoed() {
        let reply = reply_for(&incoming(8, 42, Some("hello")));
        assert_eq!(reply.text, "hello");
        assert_eq!(reply.reply_to, Some(8));
        assert_eq!(reply.chat_id, 42);
    }

    #[test]
    fn test_only_exact_start_is_a_command() {
        assert_eq!(reply_for(&incoming(1, 1, Some("/start "))).text, "/start ");
        assert_eq!(reply_for(&incoming(1, 1, Some("/START"))).text, "/START");
        assert_eq!(
            reply_for(&incoming(1, 1, Some("/start@echo_bot"))).text,
            "/start@echo_bot"
        );
    }

    #[test]
    fn test_missing_text_echoes_empty() {
        let reply = reply_for(&incoming(3, -100, None));
        assert_eq!(reply.text, "");
        assert_eq!(reply.reply_to, Some(3));
    }
}
