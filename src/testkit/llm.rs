//! Scripted completion provider.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::port::Llm;

#[derive(Debug, Clone)]
enum Reply {
    Text(String),
    Status(u16),
}

/// [`Llm`] that replays queued replies in order and records every prompt.
///
/// Once the queue is drained the last reply repeats.
#[derive(Debug)]
pub struct ScriptedLlm {
    replies: Mutex<VecDeque<Reply>>,
    last: Mutex<Option<Reply>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    fn with(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            last: Mutex::new(None),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Always answer with `text`.
    #[must_use]
    pub fn replying(text: impl Into<String>) -> Self {
        Self::with(vec![Reply::Text(text.into())])
    }

    /// Always fail as if the provider answered with `status`.
    #[must_use]
    pub fn failing(status: u16) -> Self {
        Self::with(vec![Reply::Status(status)])
    }

    /// Queue another text reply.
    #[must_use]
    pub fn then(self, text: impl Into<String>) -> Self {
        self.replies.lock().push_back(Reply::Text(text.into()));
        self
    }

    /// Prompts received so far.
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    #[must_use]
    pub fn calls(&self) -> usize {
        self.prompts.lock().len()
    }
}

#[async_trait]
impl Llm for ScriptedLlm {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn complete(&self, _system: Option<&str>, prompt: &str) -> Result<String> {
        self.prompts.lock().push(prompt.to_string());
        let reply = match self.replies.lock().pop_front() {
            Some(reply) => {
                *self.last.lock() = Some(reply.clone());
                Some(reply)
            }
            None => self.last.lock().clone(),
        };
        match reply {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Status(status)) => Err(Error::Upstream {
                source_name: "scripted",
                status,
            }),
            None => Err(Error::UpstreamUnavailable("no scripted reply".into())),
        }
    }
}
