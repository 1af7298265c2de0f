//! Client side of the chat stream: server-sent-event decoding and the chat
//! session state machine used by `chat_probe`.

use serde::Deserialize;
use thiserror::Error;

use super::{ChatRole, ChatTurn};

/// Assistant text shown when a chat exchange fails.
pub const FAILURE_REPLY: &str =
    "Sorry, I encountered an error. Please make sure the OPENAI_API_KEY is configured.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    /// Payload of a `data:` line
    Data(String),
    /// The `data: [DONE]` terminator
    Done,
}

/// Incremental decoder; frames may be split anywhere across chunks.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(chunk);
        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(event) = parse_line(&line) {
                events.push(event);
            }
        }
        events
    }

    /// Flush a trailing line that was not newline-terminated.
    pub fn finish(&mut self) -> Option<SseEvent> {
        let rest = std::mem::take(&mut self.buffer);
        parse_line(&rest)
    }
}

fn parse_line(line: &[u8]) -> Option<SseEvent> {
    let line = String::from_utf8_lossy(line);
    let line = line.trim_end_matches(['\r', '\n']);
    let data = line.strip_prefix("data:")?;
    let data = data.strip_prefix(' ').unwrap_or(data);
    if data == "[DONE]" {
        Some(SseEvent::Done)
    } else {
        Some(SseEvent::Data(data.to_string()))
    }
}

#[derive(Deserialize)]
struct CompletionChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: Delta,
}

#[derive(Deserialize, Default)]
struct Delta {
    content: Option<String>,
}

/// Text delta of one completion chunk (`choices[0].delta.content`).
/// Invalid JSON and empty deltas yield `None`.
pub fn delta_text(payload: &str) -> Option<String> {
    let chunk: CompletionChunk = serde_json::from_str(payload).ok()?;
    chunk
        .choices
        .into_iter()
        .next()?
        .delta
        .content
        .filter(|c| !c.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatState {
    Idle,
    Sending,
    Streaming,
    Error(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("a reply is still in progress")]
    Busy,
    #[error("message is empty")]
    EmptyMessage,
}

/// Conversation as seen by a chat client.
///
/// Idle -> Sending (submit) -> Streaming (first byte) -> Idle (end of stream),
/// any failure -> Error, and Error -> Sending on the next submit. Nothing is
/// retried automatically.
#[derive(Debug)]
pub struct ChatSession {
    state: ChatState,
    messages: Vec<ChatTurn>,
    decoder: SseDecoder,
    // History length before the pending exchange, restored on failure
    checkpoint: usize,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            state: ChatState::Idle,
            messages: Vec::new(),
            decoder: SseDecoder::new(),
            checkpoint: 0,
        }
    }

    pub fn state(&self) -> &ChatState {
        &self.state
    }

    pub fn messages(&self) -> &[ChatTurn] {
        &self.messages
    }

    /// Records the user turn and returns the full history to send.
    pub fn submit(&mut self, content: &str) -> Result<Vec<ChatTurn>, SessionError> {
        if matches!(self.state, ChatState::Sending | ChatState::Streaming) {
            return Err(SessionError::Busy);
        }
        let content = content.trim();
        if content.is_empty() {
            return Err(SessionError::EmptyMessage);
        }

        self.checkpoint = self.messages.len();
        self.messages.push(ChatTurn::new(ChatRole::User, content));
        self.decoder = SseDecoder::new();
        self.state = ChatState::Sending;
        Ok(self.messages.clone())
    }

    /// Feeds raw response bytes; returns the text appended by this chunk.
    pub fn on_chunk(&mut self, chunk: &[u8]) -> String {
        match self.state {
            ChatState::Sending => {
                self.messages.push(ChatTurn::new(ChatRole::Assistant, String::new()));
                self.state = ChatState::Streaming;
            }
            ChatState::Streaming => {}
            _ => return String::new(),
        }

        let events = self.decoder.feed(chunk);
        self.apply(events)
    }

    /// Upstream closed the stream.
    pub fn finish(&mut self) -> String {
        let appended = match self.state {
            ChatState::Streaming => {
                let tail: Vec<SseEvent> = self.decoder.finish().into_iter().collect();
                self.apply(tail)
            }
            _ => String::new(),
        };
        if matches!(self.state, ChatState::Sending | ChatState::Streaming) {
            self.state = ChatState::Idle;
        }
        appended
    }

    /// Any failure: drops the pending exchange and shows an apology instead.
    pub fn fail(&mut self, reason: impl Into<String>) {
        self.messages.truncate(self.checkpoint);
        self.messages.push(ChatTurn::new(ChatRole::Assistant, FAILURE_REPLY));
        self.state = ChatState::Error(reason.into());
    }

    fn apply(&mut self, events: Vec<SseEvent>) -> String {
        let mut appended = String::new();
        for event in events {
            if let SseEvent::Data(payload) = event {
                if let Some(text) = delta_text(&payload) {
                    appended.push_str(&text);
                }
            }
        }
        if let Some(reply) = self.messages.last_mut() {
            reply.content.push_str(&appended);
        }
        appended
    }
}
