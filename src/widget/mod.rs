pub mod bindings;
pub mod fallback;
pub mod form;
pub mod format;
pub mod view;

use log::{ debug, error, info, warn };
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::assistant::AssistantConfig;
use crate::history::ConversationHistory;
use crate::llm::chat::{ AssistantError, ChatClient, CompletionResponse };
use crate::models::chat::{ MessageBubble, Role, Sender };
use crate::models::volunteer::{ AvailabilityOption, FormField, VolunteerApplication };
use crate::models::websocket::NotificationKind;
use self::bindings::{ default_bindings, resolve_action, Action, Binding, DomEvent };
use self::fallback::get_fallback_response;
use self::form::{ collect_application, NOTIFICATION_DURATION_MS, SUBMIT_SUCCESS_MESSAGE };
use self::format::format_message_content;
use self::view::WidgetView;

/// An assistant request that has been announced to the page but not answered.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingReply {
    pub token: Uuid,
    pub query: String,
    pub prompt: String,
}

impl PendingReply {
    pub fn typing_id(&self) -> String {
        typing_id(&self.token)
    }
}

fn typing_id(token: &Uuid) -> String {
    format!("typing-indicator-{}", token.simple())
}

/// Per-page-session state: panel visibility, quick-reply visibility, the
/// conversation log and the requests still in flight.
pub struct ChatWidget {
    config: Arc<AssistantConfig>,
    bindings: Vec<Binding>,
    history: ConversationHistory,
    panel_visible: bool,
    quick_replies_visible: bool,
    in_flight: HashSet<Uuid>,
}

impl ChatWidget {
    pub fn new(config: Arc<AssistantConfig>) -> Self {
        Self {
            config,
            bindings: default_bindings(),
            history: ConversationHistory::new(),
            panel_visible: false,
            quick_replies_visible: true,
            in_flight: HashSet::new(),
        }
    }

    pub fn setup<V: WidgetView>(&self, view: &mut V) {
        view.install_bindings(self.bindings.clone());
        view.show_quick_replies(self.config.quick_replies.clone());
    }

    pub fn is_panel_visible(&self) -> bool {
        self.panel_visible
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Routes a forwarded DOM event through the binding table. Returns the
    /// request to run when the event sent a message.
    pub fn handle_event<V: WidgetView>(
        &mut self,
        selector: &str,
        event: DomEvent,
        key: Option<&str>,
        value: Option<&str>,
        view: &mut V
    ) -> Option<PendingReply> {
        let Some(action) = resolve_action(&self.bindings, selector, event, key) else {
            debug!("No binding for {:?} ({:?}) on '{}', ignoring", event, key, selector);
            return None;
        };

        match action {
            Action::TogglePanel => {
                self.toggle_panel(view);
                None
            }
            Action::SendInput => self.send_input(value.unwrap_or_default(), view),
            Action::QuickReply => self.send_message(value.unwrap_or_default(), view),
            Action::SubmitForm => {
                warn!("Form submit event arrived without its payload, ignoring");
                None
            }
        }
    }

    pub fn toggle_panel<V: WidgetView>(&mut self, view: &mut V) {
        self.panel_visible = !self.panel_visible;
        view.set_panel_visible(self.panel_visible);
        if self.panel_visible {
            view.focus_input();
        }
    }

    /// Sends what the user typed. The input box is cleared only when
    /// something was actually sent.
    pub fn send_input<V: WidgetView>(&mut self, input: &str, view: &mut V) -> Option<PendingReply> {
        let pending = self.send_message(input, view)?;
        view.clear_input();
        Some(pending)
    }

    pub fn send_message<V: WidgetView>(
        &mut self,
        message: &str,
        view: &mut V
    ) -> Option<PendingReply> {
        let message = message.trim();
        if message.is_empty() {
            return None;
        }

        self.add_message_to_chat(message, Sender::User, view);
        self.history.add_message(Role::User, message);

        if self.quick_replies_visible {
            view.hide_quick_replies();
            self.quick_replies_visible = false;
        }

        let token = Uuid::new_v4();
        self.in_flight.insert(token);
        view.show_typing(&typing_id(&token));

        Some(PendingReply {
            token,
            query: message.to_string(),
            prompt: self.config.build_prompt(message),
        })
    }

    /// Replaces the request's typing placeholder with the assistant reply, or
    /// with the fallback text when the request failed.
    pub fn finish_reply<V: WidgetView>(
        &mut self,
        pending: &PendingReply,
        result: Result<CompletionResponse, AssistantError>,
        view: &mut V
    ) {
        if !self.in_flight.remove(&pending.token) {
            warn!("Reply for unknown or finished request {}, dropping", pending.token);
            return;
        }
        view.remove_typing(&pending.typing_id());

        match result {
            Ok(completion) => {
                self.add_message_to_chat(&completion.response, Sender::Bot, view);
                self.history.add_message(Role::Assistant, &completion.response);
            }
            Err(e) => {
                error!("Error getting AI response: {}", e);
                let fallback = get_fallback_response(&self.config, &pending.query).to_string();
                self.add_message_to_chat(&fallback, Sender::Bot, view);
            }
        }
    }

    /// Runs one request to completion in place.
    pub async fn respond<V: WidgetView>(
        &mut self,
        pending: &PendingReply,
        client: &dyn ChatClient,
        view: &mut V
    ) {
        let result = client.complete(&pending.prompt).await;
        self.finish_reply(pending, result, view);
    }

    pub fn submit_form<V: WidgetView>(
        &mut self,
        fields: &[FormField],
        availability: &[AvailabilityOption],
        view: &mut V
    ) -> VolunteerApplication {
        let application = collect_application(fields, availability);
        match serde_json::to_string(&application) {
            Ok(json) => info!("Form Data: {}", json),
            Err(e) => error!("Failed to serialize volunteer application: {}", e),
        }

        view.notify(SUBMIT_SUCCESS_MESSAGE, NotificationKind::Success, NOTIFICATION_DURATION_MS);
        view.reset_form();
        view.scroll_to_top();
        application
    }

    fn add_message_to_chat<V: WidgetView>(&self, content: &str, sender: Sender, view: &mut V) {
        view.append_message(MessageBubble {
            sender,
            text: content.to_string(),
            html: format_message_content(content),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::chat::testing::ScriptedChatClient;
    use crate::widget::view::testing::FakePage;

    fn widget() -> ChatWidget {
        ChatWidget::new(Arc::new(AssistantConfig::default()))
    }

    #[test]
    fn test_setup_installs_bindings() {
        let widget = widget();
        let mut page = FakePage::new();
        widget.setup(&mut page);
        assert_eq!(page.bindings.len(), 7);
        assert_eq!(page.quick_replies, AssistantConfig::default().quick_replies);
        assert!(page.quick_replies_visible);
    }

    #[test]
    fn test_toggle_parity() {
        for toggles in 1..=6 {
            let mut widget = widget();
            let mut page = FakePage::new();
            for _ in 0..toggles {
                widget.toggle_panel(&mut page);
            }
            let expect_open = toggles % 2 == 1;
            assert_eq!(widget.is_panel_visible(), expect_open);
            assert_eq!(page.panel_visible, expect_open);
        }
    }

    #[test]
    fn test_each_trigger_toggles_and_focuses() {
        let mut widget = widget();
        let mut page = FakePage::new();

        widget.handle_event("#floatingChatBtn", DomEvent::Click, None, None, &mut page);
        assert!(page.panel_visible);
        assert!(page.input_focused);

        widget.handle_event("#closeChatbot", DomEvent::Click, None, None, &mut page);
        assert!(!page.panel_visible);

        widget.handle_event("#openChatbot", DomEvent::Click, None, None, &mut page);
        assert!(page.panel_visible);
    }

    #[test]
    fn test_empty_message_is_ignored() {
        let mut widget = widget();
        let mut page = FakePage::new();
        page.input_value = "   \t ".to_string();

        assert!(widget.send_input("   \t ", &mut page).is_none());
        assert!(widget.send_message("", &mut page).is_none());
        assert!(page.bubbles.is_empty());
        assert!(page.typing.is_empty());
        assert!(page.quick_replies_visible);
        assert_eq!(page.input_value, "   \t ");
        assert!(widget.history().is_empty());
    }

    #[test]
    fn test_send_appends_user_bubble_and_typing() {
        let mut widget = widget();
        let mut page = FakePage::new();
        page.input_value = "  Where are you located?  ".to_string();

        let pending = widget
            .handle_event("#sendBtn", DomEvent::Click, None, Some("  Where are you located?  "), &mut page)
            .unwrap();

        assert_eq!(pending.query, "Where are you located?");
        assert!(pending.prompt.ends_with("User query: Where are you located?"));
        assert_eq!(page.bubbles.len(), 1);
        assert_eq!(page.bubbles[0].sender, Sender::User);
        assert_eq!(page.bubbles[0].text, "Where are you located?");
        assert_eq!(page.typing, vec![pending.typing_id()]);
        assert!(page.input_value.is_empty());
        assert_eq!(widget.history().len(), 1);
        assert_eq!(widget.in_flight(), 1);
    }

    #[test]
    fn test_quick_replies_hidden_on_first_send_only() {
        let mut widget = widget();
        let mut page = FakePage::new();

        widget.handle_event(".quick-reply-btn", DomEvent::Click, None, Some("How can I volunteer?"), &mut page);
        widget.send_message("second", &mut page);
        widget.send_message("third", &mut page);

        assert!(!page.quick_replies_visible);
        assert_eq!(page.quick_reply_hides, 1);
    }

    #[tokio::test]
    async fn test_successful_reply_joins_text_blocks() {
        let mut widget = widget();
        let mut page = FakePage::new();
        let client = ScriptedChatClient::new(vec![Ok("Hi\nthere".to_string())]);

        let pending = widget.send_message("hello", &mut page).unwrap();
        widget.respond(&pending, &client, &mut page).await;

        let bot = page.bubbles.last().unwrap();
        assert_eq!(bot.sender, Sender::Bot);
        assert_eq!(bot.text, "Hi\nthere");
        assert_eq!(bot.html, "Hi<br>there");
        assert!(page.typing.is_empty());

        let history = widget.history().messages();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].role, Role::Assistant);
        assert_eq!(history[1].content, "Hi\nthere");

        let prompts = client.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].starts_with(crate::config::assistant::DEFAULT_SYSTEM_PROMPT));
    }

    #[tokio::test]
    async fn test_failed_reply_uses_volunteer_fallback() {
        let mut widget = widget();
        let mut page = FakePage::new();
        let client = ScriptedChatClient::failing();

        let pending = widget.send_message("I want to volunteer", &mut page).unwrap();
        widget.respond(&pending, &client, &mut page).await;

        let bot = page.bubbles.last().unwrap();
        assert_eq!(bot.sender, Sender::Bot);
        assert!(bot.text.contains("registration form"));
        assert!(bot.text.contains("2-3 business days"));
        assert!(page.typing.is_empty());
        // Fallback replies are not recorded.
        assert_eq!(widget.history().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_reply_emergency_fallback() {
        let mut widget = widget();
        let mut page = FakePage::new();
        let client = ScriptedChatClient::new(vec![Err(AssistantError::Status {
            status: 529,
            message: "Overloaded".to_string(),
        })]);

        let pending = widget.send_message("emergency", &mut page).unwrap();
        widget.respond(&pending, &client, &mut page).await;

        assert!(page.bubbles.last().unwrap().text.contains("102"));
    }

    #[test]
    fn test_services_fallback_renders_list() {
        let mut widget = widget();
        let mut page = FakePage::new();

        let pending = widget.send_message("what services do you offer", &mut page).unwrap();
        widget.finish_reply(&pending, Err(AssistantError::Parse("eof".to_string())), &mut page);

        let html = &page.bubbles.last().unwrap().html;
        assert!(html.contains("<ul><li>Free health checkups and screenings</li>"));
        assert_eq!(html.matches("<ul>").count(), 1);
    }

    #[test]
    fn test_stale_reply_keeps_newer_placeholder() {
        let mut widget = widget();
        let mut page = FakePage::new();

        let first = widget.send_message("first", &mut page).unwrap();
        let second = widget.send_message("second", &mut page).unwrap();
        assert_ne!(first.typing_id(), second.typing_id());

        widget.finish_reply(
            &first,
            Ok(CompletionResponse { response: "late answer".to_string() }),
            &mut page
        );

        assert_eq!(page.typing, vec![second.typing_id()]);
        assert_eq!(widget.in_flight(), 1);

        widget.finish_reply(
            &second,
            Ok(CompletionResponse { response: "answer".to_string() }),
            &mut page
        );
        assert!(page.typing.is_empty());
        assert_eq!(page.bubbles.len(), 4);
    }

    #[test]
    fn test_duplicate_reply_is_dropped() {
        let mut widget = widget();
        let mut page = FakePage::new();

        let pending = widget.send_message("hello", &mut page).unwrap();
        widget.finish_reply(&pending, Ok(CompletionResponse { response: "a".into() }), &mut page);
        widget.finish_reply(&pending, Ok(CompletionResponse { response: "b".into() }), &mut page);

        assert_eq!(page.bubbles.len(), 2);
        assert_eq!(page.bubbles[1].text, "a");
    }

    #[test]
    fn test_submit_form_collects_and_resets() {
        let mut widget = widget();
        let mut page = FakePage::new();
        page.form_values = vec![("fullName".into(), "Asha".into())];

        let application = widget.submit_form(
            &[FormField { name: "fullName".into(), value: "Asha".into() }],
            &[
                AvailabilityOption { value: "weekday".into(), checked: true },
                AvailabilityOption { value: "weekend".into(), checked: false },
                AvailabilityOption { value: "evening".into(), checked: true },
            ],
            &mut page
        );

        assert_eq!(application.availability, vec!["weekday", "evening"]);
        assert!(page.form_values.is_empty());
        assert!(page.scrolled_to_top);
        assert_eq!(
            page.notifications,
            vec![(SUBMIT_SUCCESS_MESSAGE.to_string(), NotificationKind::Success, 3000)]
        );
    }

    #[test]
    fn test_only_enter_keypress_sends() {
        let mut widget = widget();
        let mut page = FakePage::new();

        let typed = widget.handle_event(
            "#chatbotInput",
            DomEvent::Keypress,
            Some("h"),
            Some("hello"),
            &mut page
        );
        assert!(typed.is_none());
        assert!(page.bubbles.is_empty());

        let entered = widget.handle_event(
            "#chatbotInput",
            DomEvent::Keypress,
            Some("Enter"),
            Some("hello"),
            &mut page
        );
        assert!(entered.is_some());
        assert_eq!(page.bubbles.len(), 1);
    }

    #[test]
    fn test_unknown_event_is_ignored() {
        let mut widget = widget();
        let mut page = FakePage::new();
        assert!(widget.handle_event("#nope", DomEvent::Click, None, Some("x"), &mut page).is_none());
        assert!(widget.handle_event("#volunteerForm", DomEvent::Submit, None, None, &mut page).is_none());
        assert!(page.bubbles.is_empty());
        assert!(!page.panel_visible);
    }
}
