use crate::config::assistant::QuickReply;
use crate::models::chat::MessageBubble;
use crate::models::websocket::{ NotificationKind, ServerMessage };
use crate::widget::bindings::Binding;

/// The page-side collaborators the widget drives.
pub trait WidgetView {
    fn install_bindings(&mut self, bindings: Vec<Binding>);
    fn show_quick_replies(&mut self, replies: Vec<QuickReply>);
    fn set_panel_visible(&mut self, visible: bool);
    fn focus_input(&mut self);
    fn clear_input(&mut self);
    fn append_message(&mut self, bubble: MessageBubble);
    fn show_typing(&mut self, id: &str);
    fn remove_typing(&mut self, id: &str);
    fn hide_quick_replies(&mut self);
    fn notify(&mut self, message: &str, kind: NotificationKind, duration_ms: u64);
    fn reset_form(&mut self);
    fn scroll_to_top(&mut self);
}

/// Collects view updates as wire messages until the connection flushes them.
#[derive(Debug, Default)]
pub struct UpdateBuffer {
    updates: Vec<ServerMessage>,
}

impl UpdateBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&mut self) -> Vec<ServerMessage> {
        std::mem::take(&mut self.updates)
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }
}

impl WidgetView for UpdateBuffer {
    fn install_bindings(&mut self, bindings: Vec<Binding>) {
        self.updates.push(ServerMessage::Bindings { bindings });
    }

    fn show_quick_replies(&mut self, replies: Vec<QuickReply>) {
        self.updates.push(ServerMessage::QuickReplies { replies });
    }

    fn set_panel_visible(&mut self, visible: bool) {
        self.updates.push(ServerMessage::Panel { visible });
    }

    fn focus_input(&mut self) {
        self.updates.push(ServerMessage::FocusInput);
    }

    fn clear_input(&mut self) {
        self.updates.push(ServerMessage::ClearInput);
    }

    fn append_message(&mut self, bubble: MessageBubble) {
        self.updates.push(ServerMessage::AppendMessage { bubble });
    }

    fn show_typing(&mut self, id: &str) {
        self.updates.push(ServerMessage::ShowTyping { id: id.to_string() });
    }

    fn remove_typing(&mut self, id: &str) {
        self.updates.push(ServerMessage::RemoveTyping { id: id.to_string() });
    }

    fn hide_quick_replies(&mut self) {
        self.updates.push(ServerMessage::HideQuickReplies);
    }

    fn notify(&mut self, message: &str, kind: NotificationKind, duration_ms: u64) {
        self.updates.push(ServerMessage::Notification {
            message: message.to_string(),
            kind,
            duration_ms,
        });
    }

    fn reset_form(&mut self) {
        self.updates.push(ServerMessage::ResetForm);
    }

    fn scroll_to_top(&mut self) {
        self.updates.push(ServerMessage::ScrollToTop { smooth: true });
    }
}
