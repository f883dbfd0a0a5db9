use serde::{ Deserialize, Serialize };

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DomEvent {
    Click,
    Keypress,
    Submit,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    TogglePanel,
    SendInput,
    QuickReply,
    SubmitForm,
}

/// One listener the page registers on load. `key` narrows keypress events.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Binding {
    pub selector: String,
    pub event: DomEvent,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub key: Option<String>,
    pub action: Action,
}

const BINDING_TABLE: &[(&str, DomEvent, Option<&str>, Action)] = &[
    ("#volunteerForm", DomEvent::Submit, None, Action::SubmitForm),
    ("#floatingChatBtn", DomEvent::Click, None, Action::TogglePanel),
    ("#openChatbot", DomEvent::Click, None, Action::TogglePanel),
    ("#closeChatbot", DomEvent::Click, None, Action::TogglePanel),
    ("#sendBtn", DomEvent::Click, None, Action::SendInput),
    ("#chatbotInput", DomEvent::Keypress, Some("Enter"), Action::SendInput),
    (".quick-reply-btn", DomEvent::Click, None, Action::QuickReply),
];

pub fn default_bindings() -> Vec<Binding> {
    BINDING_TABLE.iter()
        .map(|(selector, event, key, action)| Binding {
            selector: selector.to_string(),
            event: *event,
            key: key.map(str::to_string),
            action: *action,
        })
        .collect()
}

/// A binding with a `key` only matches events carrying that same key.
pub fn resolve_action(
    bindings: &[Binding],
    selector: &str,
    event: DomEvent,
    key: Option<&str>
) -> Option<Action> {
    bindings
        .iter()
        .find(|b| {
            b.selector == selector &&
                b.event == event &&
                (b.key.is_none() || b.key.as_deref() == key)
        })
        .map(|b| b.action)
}
