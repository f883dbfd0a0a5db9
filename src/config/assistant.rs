use log::info;
use serde::{ Deserialize, Serialize };
use std::error::Error;
use std::fs;
use std::sync::Arc;

pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful AI healthcare assistant for \"HealthCare Connect\", an NGO providing healthcare support to underserved communities. Answer questions about volunteer opportunities, healthcare services, and provide general health guidance. Be warm, compassionate, and concise.";

const VOLUNTEER_REPLY: &str =
    "Thank you for your interest in volunteering! Here's how you can join:\n\n1. Fill out the volunteer registration form on this page\n2. Select your healthcare skills and availability\n3. Our team will review your application within 2-3 business days\n4. You'll receive an email with next steps and orientation details\n\nWe welcome volunteers with various backgrounds including nursing, medical practice, counseling, first aid, and administrative support!";

const SERVICES_REPLY: &str =
    "HealthCare Connect provides:\n\n- Free health checkups and screenings\n- Mental health counseling\n- Nutrition and dietary guidance\n- Emergency medical support\n- Health education programs\n- Medicine distribution in underserved areas\n\nTo access our services, contact us through this form or call our support line. For emergencies, dial 102.";

const EMERGENCY_REPLY: &str =
    "For medical emergencies:\n\n🚨 Call 102 immediately\n🏥 Visit the nearest hospital emergency room\n\nOur AI assistant provides general guidance, but for urgent medical situations, always seek immediate professional care.\n\nHow else can I help you?";

const MENU_REPLY: &str =
    "I'm here to help with:\n\n- Volunteer opportunities\n- Healthcare services details\n- Support access guidance\n- General NGO questions\n\nHow can I assist you today?";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Assistant config '{path}' could not be read: {source}")] Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Assistant config '{path}' is not valid JSON: {source}")] Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Assistant config is invalid: {0}")] Invalid(String),
}

/// One row of the keyword fallback table. A rule matches when any keyword is
/// a case-insensitive substring of the user message.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct FallbackRule {
    pub keywords: Vec<String>,
    pub reply: String,
}

impl FallbackRule {
    fn new(keywords: &[&str], reply: &str) -> Self {
        Self {
            keywords: keywords
                .iter()
                .map(|k| k.to_string())
                .collect(),
            reply: reply.to_string(),
        }
    }
}

/// A suggested query the page renders as a `.quick-reply-btn` with `data-query`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct QuickReply {
    pub label: String,
    pub query: String,
}

impl QuickReply {
    fn new(label: &str, query: &str) -> Self {
        Self { label: label.to_string(), query: query.to_string() }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct AssistantConfig {
    pub system_prompt: String,
    /// Checked in order, first match wins.
    pub fallback_rules: Vec<FallbackRule>,
    pub default_reply: String,
    #[serde(default)]
    pub quick_replies: Vec<QuickReply>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            fallback_rules: vec![
                FallbackRule::new(&["volunteer", "join"], VOLUNTEER_REPLY),
                FallbackRule::new(&["service", "help", "support"], SERVICES_REPLY),
                FallbackRule::new(&["emergency", "urgent"], EMERGENCY_REPLY)
            ],
            default_reply: MENU_REPLY.to_string(),
            quick_replies: vec![
                QuickReply::new("Volunteer", "How can I volunteer?"),
                QuickReply::new("Services", "What healthcare services do you provide?"),
                QuickReply::new("Get support", "How can I access support?"),
                QuickReply::new("Emergency", "What should I do in a medical emergency?")
            ],
        }
    }
}

impl AssistantConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.system_prompt.trim().is_empty() {
            return Err(ConfigError::Invalid("system_prompt is empty".to_string()));
        }
        if self.fallback_rules.is_empty() {
            return Err(ConfigError::Invalid("fallback_rules has no entries".to_string()));
        }
        for (index, rule) in self.fallback_rules.iter().enumerate() {
            if rule.keywords.iter().all(|k| k.trim().is_empty()) {
                return Err(
                    ConfigError::Invalid(format!("fallback_rules[{}] has no keywords", index))
                );
            }
        }
        if self.default_reply.trim().is_empty() {
            return Err(ConfigError::Invalid("default_reply is empty".to_string()));
        }
        for (index, reply) in self.quick_replies.iter().enumerate() {
            if reply.label.trim().is_empty() || reply.query.trim().is_empty() {
                return Err(
                    ConfigError::Invalid(format!("quick_replies[{}] needs a label and a query", index))
                );
            }
        }
        Ok(())
    }

    /// Builds the single user message sent upstream. Prior turns are never included.
    pub fn build_prompt(&self, user_message: &str) -> String {
        format!("{}\n\nUser query: {}", self.system_prompt, user_message)
    }
}

pub fn load_assistant_config(path: &str) -> Result<AssistantConfig, ConfigError> {
    let file_content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_string(),
        source,
    })?;
    let config: AssistantConfig = serde_json
        ::from_str(&file_content)
        .map_err(|source| ConfigError::Json {
            path: path.to_string(),
            source,
        })?;
    config.validate()?;
    Ok(config)
}

pub fn initialize_assistant_config(
    path: Option<&str>
) -> Result<Arc<AssistantConfig>, Box<dyn Error + Send + Sync>> {
    let config = match path {
        Some(path) => {
            info!("Loading assistant config from: {}", path);
            load_assistant_config(path)?
        }
        None => {
            info!("No assistant config path given, using built-in defaults.");
            AssistantConfig::default()
        }
    };
    info!(
        "Assistant config ready: {} fallback rule(s), {} quick reply(ies)",
        config.fallback_rules.len(),
        config.quick_replies.len()
    );
    Ok(Arc::new(config))
}
