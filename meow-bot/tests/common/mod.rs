//! Shared test doubles: a recording Bot and a scripted LlmClient. No network.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use dbot_core::{Bot, Chat, DbotError, Message, MessageKind, Result as DbotResult, User};
use llm_client::LlmClient;
use meow_bot::{AllowList, ChatDispatcher, ModelRegistry, SessionStore};
use prompt::ChatMessage;
use std::sync::{Arc, Mutex};

/// Something the bot sent: plain text or text with a keyboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Text { chat_id: i64, text: String },
    Choices { chat_id: i64, text: String, choices: Vec<String> },
}

/// Records everything sent and every photo requested; `fetch_photo` returns fixed bytes or fails
/// when `photo` is None.
#[derive(Default)]
pub struct MockBot {
    pub sent: Mutex<Vec<Sent>>,
    pub photo: Option<Vec<u8>>,
    pub photo_requests: Mutex<Vec<String>>,
}

impl MockBot {
    pub fn with_photo(bytes: &[u8]) -> Self {
        Self {
            photo: Some(bytes.to_vec()),
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    /// Text of the last message sent, keyboard or not.
    pub fn last_text(&self) -> Option<String> {
        self.sent().last().map(|s| match s {
            Sent::Text { text, .. } | Sent::Choices { text, .. } => text.clone(),
        })
    }
}

#[async_trait]
impl Bot for MockBot {
    async fn send_message(&self, chat: &Chat, text: &str) -> DbotResult<()> {
        self.sent.lock().unwrap().push(Sent::Text {
            chat_id: chat.id,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_choices(&self, chat: &Chat, text: &str, choices: &[String]) -> DbotResult<()> {
        self.sent.lock().unwrap().push(Sent::Choices {
            chat_id: chat.id,
            text: text.to_string(),
            choices: choices.to_vec(),
        });
        Ok(())
    }

    async fn fetch_photo(&self, file_id: &str) -> DbotResult<Vec<u8>> {
        self.photo_requests.lock().unwrap().push(file_id.to_string());
        self.photo
            .clone()
            .ok_or_else(|| DbotError::Bot(format!("no such file: {}", file_id)))
    }
}

/// One recorded LLM call.
#[derive(Debug, Clone)]
pub enum LlmCall {
    Complete { model: String, messages: Vec<ChatMessage> },
    DescribeImage { model: String, image_url: String, prompt: String },
}

/// Replies with `reply`, or fails every call when `fail` is set.
pub struct MockLlmClient {
    pub reply: String,
    pub fail: bool,
    pub calls: Mutex<Vec<LlmCall>>,
}

impl MockLlmClient {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: String::new(),
            fail: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<LlmCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, model: &str, messages: Vec<ChatMessage>) -> anyhow::Result<String> {
        self.calls.lock().unwrap().push(LlmCall::Complete {
            model: model.to_string(),
            messages,
        });
        if self.fail {
            anyhow::bail!("connection refused");
        }
        Ok(self.reply.clone())
    }

    async fn describe_image(&self, model: &str, image_url: &str, prompt: &str) -> anyhow::Result<String> {
        self.calls.lock().unwrap().push(LlmCall::DescribeImage {
            model: model.to_string(),
            image_url: image_url.to_string(),
            prompt: prompt.to_string(),
        });
        if self.fail {
            anyhow::bail!("connection refused");
        }
        Ok(self.reply.clone())
    }
}

/// Dispatcher with alice and bob registered, default models, and a fresh session store.
pub fn dispatcher(bot: Arc<MockBot>, llm: Arc<MockLlmClient>) -> ChatDispatcher {
    ChatDispatcher::new(
        bot,
        llm,
        SessionStore::new(),
        Arc::new(AllowList::new(["alice", "bob"])),
        Arc::new(ModelRegistry::default()),
    )
    .with_default_model("gpt-4o-mini")
    .with_vision_model("gpt-4o")
}

pub fn user(username: Option<&str>, first_name: Option<&str>) -> User {
    User {
        id: 42,
        username: username.map(String::from),
        first_name: first_name.map(String::from),
        last_name: None,
    }
}

pub fn message_from(user: User, kind: MessageKind, content: &str) -> Message {
    Message {
        id: "1".to_string(),
        user,
        chat: Chat {
            id: 1000,
            chat_type: "private".to_string(),
        },
        content: content.to_string(),
        kind,
        created_at: Utc::now(),
    }
}

pub fn text_from(username: &str, content: &str) -> Message {
    let first_name = capitalize(username);
    message_from(
        user(Some(username), Some(first_name.as_str())),
        MessageKind::Text,
        content,
    )
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
