use serde::{ Serialize, Deserialize };
use crate::config::assistant::QuickReply;
use crate::models::chat::MessageBubble;
use crate::models::volunteer::{ AvailabilityOption, FormField };
use crate::widget::bindings::{ Binding, DomEvent };

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "event")] Event {
        selector: String,
        event: DomEvent,
        /// `KeyboardEvent.key` for keypress events.
        #[serde(default)]
        key: Option<String>,
        /// Input box value for `SendInput`, `data-query` for quick replies.
        #[serde(default)]
        value: Option<String>,
    },
    #[serde(rename = "submit_form")] SubmitForm {
        fields: Vec<FormField>,
        #[serde(default)]
        availability: Vec<AvailabilityOption>,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "bindings")] Bindings {
        bindings: Vec<Binding>,
    },
    #[serde(rename = "quick_replies")] QuickReplies {
        replies: Vec<QuickReply>,
    },
    #[serde(rename = "panel")] Panel {
        visible: bool,
    },
    #[serde(rename = "focus_input")]
    FocusInput,
    #[serde(rename = "clear_input")]
    ClearInput,
    #[serde(rename = "append_message")] AppendMessage {
        bubble: MessageBubble,
    },
    #[serde(rename = "show_typing")] ShowTyping {
        id: String,
    },
    #[serde(rename = "remove_typing")] RemoveTyping {
        id: String,
    },
    #[serde(rename = "hide_quick_replies")]
    HideQuickReplies,
    #[serde(rename = "notification")] Notification {
        message: String,
        kind: NotificationKind,
        duration_ms: u64,
    },
    #[serde(rename = "reset_form")]
    ResetForm,
    #[serde(rename = "scroll_to_top")] ScrollToTop {
        smooth: bool,
    },
    #[serde(rename = "error")] Error {
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_send_event() {
        let msg: ClientMessage = serde_json
            ::from_str(r##"{"type":"event","selector":"#sendBtn","event":"click","value":"hello"}"##)
            .unwrap();
        assert_eq!(msg, ClientMessage::Event {
            selector: "#sendBtn".to_string(),
            event: DomEvent::Click,
            key: None,
            value: Some("hello".to_string()),
        });
    }

    #[test]
    fn test_parse_keypress_event_carries_key() {
        let msg: ClientMessage = serde_json
            ::from_str(
                r##"{"type":"event","selector":"#chatbotInput","event":"keypress","key":"Enter","value":"hi"}"##
            )
            .unwrap();
        match msg {
            ClientMessage::Event { key, .. } => assert_eq!(key.as_deref(), Some("Enter")),
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_parse_submit_form_without_availability() {
        let msg: ClientMessage = serde_json
            ::from_str(r#"{"type":"submit_form","fields":[{"name":"fullName","value":"Asha"}]}"#)
            .unwrap();
        match msg {
            ClientMessage::SubmitForm { fields, availability } => {
                assert_eq!(fields.len(), 1);
                assert!(availability.is_empty());
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_server_message_tags() {
        let json = serde_json::to_value(&ServerMessage::ShowTyping { id: "typing-1".into() }).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "show_typing", "id": "typing-1" }));

        let json = serde_json::to_value(&ServerMessage::HideQuickReplies).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "hide_quick_replies" }));
    }
}
