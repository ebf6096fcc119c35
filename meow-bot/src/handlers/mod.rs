//! Handlers run by the chain: request logging and the chat dispatcher.

mod dispatcher;
mod logging;

pub use dispatcher::{
    denial_text, greeting_text, model_selected_text, ChatDispatcher, MSG_CHOOSE_MODEL,
    MSG_NEW_CHAT, MSG_REQUEST_FAILED,
};
pub use logging::LoggingHandler;
