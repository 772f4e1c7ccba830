//! Bridges rig's `CompletionModel` to our `LlmProvider` trait.

use async_trait::async_trait;
use rig::completion::{CompletionModel, Message};
use rig::message::AssistantContent;

use crate::error::LlmError;
use crate::llm::provider::{
    ChatMessage, CompletionRequest, CompletionResponse, LlmProvider, ResponseFormat, Role,
};

/// Wraps any rig completion model.
pub struct RigAdapter<M> {
    model: M,
    model_name: String,
    /// Provider-specific request parameters that switch on JSON output.
    json_mode_params: Option<serde_json::Value>,
}

impl<M> RigAdapter<M>
where
    M: CompletionModel,
{
    pub fn new(model: M, model_name: &str) -> Self {
        Self {
            model,
            model_name: model_name.to_string(),
            json_mode_params: None,
        }
    }

    /// Extra parameters merged into the request when JSON output is requested.
    pub fn with_json_mode_params(mut self, params: serde_json::Value) -> Self {
        self.json_mode_params = Some(params);
        self
    }
}

/// Split our message list into (preamble, history, prompt) as rig expects.
fn split_messages(
    messages: Vec<ChatMessage>,
) -> Result<(Option<String>, Vec<Message>, String), LlmError> {
    let mut system = Vec::new();
    let mut turns = Vec::new();
    for msg in messages {
        match msg.role {
            Role::System => system.push(msg.content),
            _ => turns.push(msg),
        }
    }

    let prompt = match turns.pop() {
        Some(last) if last.role == Role::User => last.content,
        _ => {
            return Err(LlmError::RequestFailed {
                provider: "rig".into(),
                reason: "completion request must end with a user message".into(),
            });
        }
    };

    let history = turns
        .into_iter()
        .map(|m| match m.role {
            Role::Assistant => Message::assistant(m.content),
            _ => Message::user(m.content),
        })
        .collect();

    let preamble = if system.is_empty() {
        None
    } else {
        Some(system.join("\n\n"))
    };

    Ok((preamble, history, prompt))
}

#[async_trait]
impl<M> LlmProvider for RigAdapter<M>
where
    M: CompletionModel + Send + Sync + 'static,
{
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let (preamble, history, prompt) = split_messages(request.messages)?;

        let mut builder = self
            .model
            .completion_request(Message::user(prompt))
            .messages(history);
        if let Some(preamble) = preamble {
            builder = builder.preamble(preamble);
        }
        if let Some(temperature) = request.temperature {
            builder = builder.temperature(f64::from(temperature));
        }
        if let Some(max_tokens) = request.max_tokens {
            builder = builder.max_tokens(u64::from(max_tokens));
        }
        if request.response_format == ResponseFormat::JsonObject
            && let Some(ref params) = self.json_mode_params
        {
            builder = builder.additional_params(params.clone());
        }

        let response = builder.send().await.map_err(|e| LlmError::RequestFailed {
            provider: self.model_name.clone(),
            reason: e.to_string(),
        })?;

        let content: String = response
            .choice
            .iter()
            .filter_map(|c| match c {
                AssistantContent::Text(text) => Some(text.text.clone()),
                _ => None,
            })
            .collect();

        if content.is_empty() {
            return Err(LlmError::InvalidResponse {
                provider: self.model_name.clone(),
                reason: "response contained no text".into(),
            });
        }

        Ok(CompletionResponse {
            content,
            input_tokens: u32::try_from(response.usage.input_tokens).unwrap_or(u32::MAX),
            output_tokens: u32::try_from(response.usage.output_tokens).unwrap_or(u32::MAX),
        })
    }
}
