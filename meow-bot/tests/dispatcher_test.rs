//! Behavior tests for ChatDispatcher driven through the handler chain with a mock bot and LLM.
//! No Telegram or OpenAI traffic.

mod common;

use common::{dispatcher, message_from, text_from, user, LlmCall, MockBot, MockLlmClient, Sent};
use dbot_core::{Handler, HandlerResponse, MessageKind};
use handler_chain::HandlerChain;
use meow_bot::handlers::{
    denial_text, greeting_text, MSG_CHOOSE_MODEL, MSG_NEW_CHAT, MSG_REQUEST_FAILED,
};
use meow_bot::{LoggingHandler, ModelRegistry};
use prompt::{ChatMessage, MessageRole};
use std::sync::Arc;

fn complete_calls(llm: &MockLlmClient) -> Vec<(String, Vec<ChatMessage>)> {
    llm.calls()
        .into_iter()
        .filter_map(|c| match c {
            LlmCall::Complete { model, messages } => Some((model, messages)),
            _ => None,
        })
        .collect()
}

/// **Test: /newchat, then "hello" sends exactly [user: hello] and stores the assistant reply.**
#[tokio::test]
async fn test_new_chat_then_hello() {
    let bot = Arc::new(MockBot::default());
    let llm = Arc::new(MockLlmClient::replying("hi there"));
    let d = dispatcher(bot.clone(), llm.clone());
    let chain = HandlerChain::new()
        .add_handler(Arc::new(LoggingHandler))
        .add_handler(Arc::new(d.clone()));

    let resp = chain.handle(&text_from("alice", "/newchat")).await.unwrap();
    assert_eq!(resp, HandlerResponse::Reply(MSG_NEW_CHAT.to_string()));

    let resp = chain.handle(&text_from("alice", "hello")).await.unwrap();
    assert_eq!(resp, HandlerResponse::Reply("hi there".to_string()));

    let calls = complete_calls(&llm);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "gpt-4o-mini");
    assert_eq!(calls[0].1, vec![ChatMessage::user("hello")]);

    assert_eq!(
        d.sessions().history("alice").await,
        vec![ChatMessage::user("hello"), ChatMessage::assistant("hi there")]
    );
    assert_eq!(bot.last_text().as_deref(), Some("hi there"));
}

/// **Test: history grows across turns and every turn is sent in order.**
#[tokio::test]
async fn test_follow_up_includes_previous_turns() {
    let bot = Arc::new(MockBot::default());
    let llm = Arc::new(MockLlmClient::replying("ok"));
    let d = dispatcher(bot, llm.clone());

    d.handle(&text_from("alice", "first")).await.unwrap();
    d.handle(&text_from("alice", "second")).await.unwrap();

    let calls = complete_calls(&llm);
    assert_eq!(calls.len(), 2);
    assert_eq!(
        calls[1].1,
        vec![
            ChatMessage::user("first"),
            ChatMessage::assistant("ok"),
            ChatMessage::user("second"),
        ]
    );
    assert_eq!(d.sessions().history("alice").await.len(), 4);
}

/// **Test: an unregistered user is denied; no session entry and no API call.**
#[tokio::test]
async fn test_unregistered_user_is_denied() {
    let bot = Arc::new(MockBot::default());
    let llm = Arc::new(MockLlmClient::replying("never"));
    let d = dispatcher(bot.clone(), llm.clone());

    let resp = d.handle(&text_from("mallory", "hello")).await.unwrap();

    assert_eq!(resp, HandlerResponse::Reply(denial_text("Mallory")));
    assert_eq!(bot.last_text(), Some("👿 Mallory, you are not registered".to_string()));
    assert!(llm.calls().is_empty());
    assert!(!d.sessions().contains("mallory").await);
    assert!(d.sessions().is_empty().await);
}

/// **Test: commands from unregistered users are denied too and change nothing.**
#[tokio::test]
async fn test_unregistered_commands_are_denied() {
    let bot = Arc::new(MockBot::default());
    let llm = Arc::new(MockLlmClient::replying("never"));
    let d = dispatcher(bot.clone(), llm);

    for text in ["/start", "/newchat", "/setmodel", "GPT-4o"] {
        let resp = d.handle(&text_from("mallory", text)).await.unwrap();
        assert_eq!(resp, HandlerResponse::Reply(denial_text("Mallory")));
    }
    assert!(d.sessions().is_empty().await);
    assert!(bot.sent().iter().all(|s| matches!(s, Sent::Text { .. })));
}

/// **Test: a user without a username is always denied.**
#[tokio::test]
async fn test_missing_username_is_denied() {
    let bot = Arc::new(MockBot::default());
    let llm = Arc::new(MockLlmClient::replying("never"));
    let d = dispatcher(bot.clone(), llm.clone());

    let msg = message_from(user(None, Some("Ghost")), MessageKind::Text, "hello");
    let resp = d.handle(&msg).await.unwrap();

    assert_eq!(resp, HandlerResponse::Reply(denial_text("Ghost")));
    assert!(llm.calls().is_empty());
    assert!(d.sessions().is_empty().await);
}

/// **Test: on API failure the user gets the failure text and no assistant turn is stored.**
#[tokio::test]
async fn test_api_failure_leaves_no_phantom_turn() {
    let bot = Arc::new(MockBot::default());
    let llm = Arc::new(MockLlmClient::failing());
    let d = dispatcher(bot.clone(), llm);

    let resp = d.handle(&text_from("bob", "hello")).await.unwrap();

    assert_eq!(resp, HandlerResponse::Reply(MSG_REQUEST_FAILED.to_string()));
    assert_eq!(bot.last_text().as_deref(), Some(MSG_REQUEST_FAILED));
    assert_eq!(
        d.sessions().history("bob").await,
        vec![ChatMessage::user("hello")]
    );
}

/// **Test: /start greets a registered user by first name and does not touch the session.**
#[tokio::test]
async fn test_start_greets_registered_user() {
    let bot = Arc::new(MockBot::default());
    let llm = Arc::new(MockLlmClient::replying("never"));
    let d = dispatcher(bot.clone(), llm.clone());

    let resp = d.handle(&text_from("alice", "/start")).await.unwrap();

    assert_eq!(resp, HandlerResponse::Reply(greeting_text("Alice")));
    assert_eq!(bot.last_text(), Some("Meowello 😺 Alice!".to_string()));
    assert!(llm.calls().is_empty());
    assert!(!d.sessions().contains("alice").await);
}

/// **Test: /setmodel sends the keyboard with every label in registry order.**
#[tokio::test]
async fn test_set_model_shows_labels() {
    let bot = Arc::new(MockBot::default());
    let llm = Arc::new(MockLlmClient::replying("never"));
    let d = dispatcher(bot.clone(), llm);

    let resp = d.handle(&text_from("alice", "/setmodel")).await.unwrap();

    assert_eq!(resp, HandlerResponse::Reply(MSG_CHOOSE_MODEL.to_string()));
    assert_eq!(
        bot.sent(),
        vec![Sent::Choices {
            chat_id: 1000,
            text: MSG_CHOOSE_MODEL.to_string(),
            choices: ModelRegistry::default().labels(),
        }]
    );
}

/// **Test: tapping a label selects the model; later chats use it.**
#[tokio::test]
async fn test_selected_model_is_used() {
    let bot = Arc::new(MockBot::default());
    let llm = Arc::new(MockLlmClient::replying("ok"));
    let d = dispatcher(bot.clone(), llm.clone());

    let resp = d.handle(&text_from("alice", "GPT-4 Turbo")).await.unwrap();
    assert_eq!(
        resp,
        HandlerResponse::Reply("Model set to GPT-4 Turbo (gpt-4-turbo) 😺".to_string())
    );
    assert_eq!(d.sessions().model("alice").await.as_deref(), Some("gpt-4-turbo"));
    assert!(d.sessions().history("alice").await.is_empty());

    d.handle(&text_from("alice", "hello")).await.unwrap();
    let calls = complete_calls(&llm);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "gpt-4-turbo");
}

/// **Test: /newchat clears history but keeps the selected model.**
#[tokio::test]
async fn test_new_chat_keeps_model() {
    let bot = Arc::new(MockBot::default());
    let llm = Arc::new(MockLlmClient::replying("ok"));
    let d = dispatcher(bot, llm);

    d.handle(&text_from("alice", "GPT-4o")).await.unwrap();
    d.handle(&text_from("alice", "hello")).await.unwrap();
    assert_eq!(d.sessions().history("alice").await.len(), 2);

    d.handle(&text_from("alice", "/newchat")).await.unwrap();

    assert!(d.sessions().history("alice").await.is_empty());
    assert_eq!(d.sessions().model("alice").await.as_deref(), Some("gpt-4o"));
}

/// **Test: sessions are per user.**
#[tokio::test]
async fn test_sessions_are_isolated() {
    let bot = Arc::new(MockBot::default());
    let llm = Arc::new(MockLlmClient::replying("ok"));
    let d = dispatcher(bot, llm.clone());

    d.handle(&text_from("alice", "GPT-4o")).await.unwrap();
    d.handle(&text_from("alice", "from alice")).await.unwrap();
    d.handle(&text_from("bob", "from bob")).await.unwrap();

    let calls = complete_calls(&llm);
    assert_eq!(calls[1].0, "gpt-4o-mini");
    assert_eq!(calls[1].1, vec![ChatMessage::user("from bob")]);
    assert_eq!(d.sessions().history("alice").await.len(), 2);
    assert_eq!(d.sessions().history("bob").await.len(), 2);
}

/// **Test: a photo goes to the vision model as a data URL and leaves history untouched.**
#[tokio::test]
async fn test_photo_uses_vision_model() {
    let bot = Arc::new(MockBot::with_photo(b"\xff\xd8\xff"));
    let llm = Arc::new(MockLlmClient::replying("a cat"));
    let d = dispatcher(bot.clone(), llm.clone());

    d.handle(&text_from("alice", "hello")).await.unwrap();
    let before = d.sessions().history("alice").await;

    let photo = message_from(
        user(Some("alice"), Some("Alice")),
        MessageKind::Photo {
            file_id: "file-1".to_string(),
        },
        "",
    );
    let resp = d.handle(&photo).await.unwrap();

    assert_eq!(resp, HandlerResponse::Reply("a cat".to_string()));
    match llm.calls().last() {
        Some(LlmCall::DescribeImage {
            model,
            image_url,
            prompt: text,
        }) => {
            assert_eq!(model, "gpt-4o");
            assert_eq!(image_url, "data:image/jpeg;base64,/9j/");
            assert_eq!(text, prompt::DEFAULT_IMAGE_PROMPT);
        }
        other => panic!("expected an image call, got {:?}", other),
    }
    assert_eq!(d.sessions().history("alice").await, before);
}

/// **Test: the caption becomes the image prompt.**
#[tokio::test]
async fn test_photo_caption_is_prompt() {
    let bot = Arc::new(MockBot::with_photo(b"img"));
    let llm = Arc::new(MockLlmClient::replying("a dog"));
    let d = dispatcher(bot, llm.clone());

    let photo = message_from(
        user(Some("bob"), Some("Bob")),
        MessageKind::Photo {
            file_id: "file-2".to_string(),
        },
        "what breed?",
    );
    d.handle(&photo).await.unwrap();

    match llm.calls().last() {
        Some(LlmCall::DescribeImage { prompt: text, .. }) => assert_eq!(text, "what breed?"),
        other => panic!("expected an image call, got {:?}", other),
    }
}

/// **Test: a photo that cannot be downloaded yields the failure text and no API call.**
#[tokio::test]
async fn test_photo_download_failure() {
    let bot = Arc::new(MockBot::default());
    let llm = Arc::new(MockLlmClient::replying("never"));
    let d = dispatcher(bot.clone(), llm.clone());

    let photo = message_from(
        user(Some("alice"), Some("Alice")),
        MessageKind::Photo {
            file_id: "missing".to_string(),
        },
        "",
    );
    let resp = d.handle(&photo).await.unwrap();

    assert_eq!(resp, HandlerResponse::Reply(MSG_REQUEST_FAILED.to_string()));
    assert!(llm.calls().is_empty());
}

/// **Test: a vision API failure yields the failure text and leaves history alone.**
#[tokio::test]
async fn test_photo_api_failure() {
    let bot = Arc::new(MockBot::with_photo(b"img"));
    let llm = Arc::new(MockLlmClient::failing());
    let d = dispatcher(bot.clone(), llm.clone());

    let photo = message_from(
        user(Some("alice"), Some("Alice")),
        MessageKind::Photo {
            file_id: "file-3".to_string(),
        },
        "",
    );
    let resp = d.handle(&photo).await.unwrap();

    assert_eq!(resp, HandlerResponse::Reply(MSG_REQUEST_FAILED.to_string()));
    assert_eq!(bot.last_text().as_deref(), Some(MSG_REQUEST_FAILED));
    assert!(matches!(
        llm.calls().as_slice(),
        [LlmCall::DescribeImage { .. }]
    ));
    assert!(d.sessions().history("alice").await.is_empty());
}

/// **Test: a photo from an unregistered user is denied before it is downloaded.**
#[tokio::test]
async fn test_unregistered_photo_is_denied() {
    let bot = Arc::new(MockBot::with_photo(b"img"));
    let llm = Arc::new(MockLlmClient::replying("never"));
    let d = dispatcher(bot.clone(), llm.clone());

    let photo = message_from(
        user(Some("mallory"), Some("Mallory")),
        MessageKind::Photo {
            file_id: "file-4".to_string(),
        },
        "what is this?",
    );
    let resp = d.handle(&photo).await.unwrap();

    assert_eq!(resp, HandlerResponse::Reply(denial_text("Mallory")));
    assert!(bot.photo_requests.lock().unwrap().is_empty());
    assert!(llm.calls().is_empty());
    assert!(!d.sessions().contains("mallory").await);
}

/// **Test: unsupported messages are ignored silently, even from unregistered users.**
#[tokio::test]
async fn test_other_messages_are_ignored() {
    let bot = Arc::new(MockBot::default());
    let llm = Arc::new(MockLlmClient::replying("never"));
    let d = dispatcher(bot.clone(), llm.clone());

    for name in ["alice", "mallory"] {
        let msg = message_from(user(Some(name), None), MessageKind::Other, "");
        assert_eq!(d.handle(&msg).await.unwrap(), HandlerResponse::Ignore);
    }
    assert!(bot.sent().is_empty());
    assert!(llm.calls().is_empty());
}
