use serde::{Deserialize, Serialize};

/// One inline button: a visible label plus the callback action string the
/// transport echoes back when the button is pressed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub label: String,
    pub action: String,
}

impl Button {
    pub fn new(label: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: action.into(),
        }
    }
}

/// Rows of inline buttons attached to an outbound message.
pub type Keyboard = Vec<Vec<Button>>;

/// Everything the service can hand to the chat transport for delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outbound {
    Message {
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        keyboard: Option<Keyboard>,
    },
    /// One to three photo references with a shared caption. The transport
    /// renders the first photo as the cover.
    Photos {
        file_refs: Vec<String>,
        caption: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        keyboard: Option<Keyboard>,
    },
    Invoice {
        title: String,
        description: String,
        payload: String,
        amount: u32,
        currency: String,
    },
    PreCheckoutAnswer {
        query_id: String,
        ok: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

impl Outbound {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Message {
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn message(text: impl Into<String>, keyboard: Keyboard) -> Self {
        Self::Message {
            text: text.into(),
            keyboard: Some(keyboard),
        }
    }

    pub fn photos(file_refs: Vec<String>, caption: impl Into<String>, keyboard: Option<Keyboard>) -> Self {
        Self::Photos {
            file_refs,
            caption: caption.into(),
            keyboard,
        }
    }
}
