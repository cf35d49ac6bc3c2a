pub mod openai_chat;
pub mod stub;

pub use openai_chat::OpenAiChatIdeaSource;
pub use stub::DeterministicStub;
