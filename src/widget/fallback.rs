use crate::config::assistant::AssistantConfig;

/// Picks the canned reply for a message the assistant could not answer.
pub fn get_fallback_response<'a>(config: &'a AssistantConfig, message: &str) -> &'a str {
    let lower_message = message.to_lowercase();

    config.fallback_rules
        .iter()
        .find(|rule| {
            rule.keywords
                .iter()
                .filter(|k| !k.is_empty())
                .any(|k| lower_message.contains(&k.to_lowercase()))
        })
        .map(|rule| rule.reply.as_str())
        .unwrap_or(config.default_reply.as_str())
}
