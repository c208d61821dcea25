pub mod openai;
pub mod prompt_builder;
pub mod prompts;

use crate::error::Error;
use openai::{ChatRequest, ChatResponse};
use prompt_builder::PromptPair;

/// Generation parameters sent alongside the two prompt messages.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestConfig {
    pub model: String,
    pub system_instructions: String,
    pub max_output_tokens: u32,
    pub sample_count: u32,
    pub stop_sequences: Vec<String>,
    pub temperature: f32,
}

impl RequestConfig {
    pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 50;
    pub const DEFAULT_SAMPLE_COUNT: u32 = 1;

    pub fn new(
        model: impl Into<String>,
        system_instructions: impl Into<String>,
        temperature: f32,
    ) -> Self {
        RequestConfig {
            model: model.into(),
            system_instructions: system_instructions.into(),
            max_output_tokens: Self::DEFAULT_MAX_OUTPUT_TOKENS,
            sample_count: Self::DEFAULT_SAMPLE_COUNT,
            stop_sequences: vec!["\n".to_string()],
            temperature,
        }
    }
}

/// Raw outcome of one HTTP exchange, before any interpretation.
#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Something that can deliver a chat request and hand back the reply.
///
/// Implementations perform exactly one round trip per call and never retry.
pub trait ChatTransport {
    fn send(&self, request: &ChatRequest) -> Result<HttpReply, Error>;
}

/// Prepare `raw_prompt` against `max_chars` and ask for a commit message.
pub fn generate_commit_message(
    raw_prompt: &str,
    max_chars: usize,
    config: &RequestConfig,
    transport: &dyn ChatTransport,
) -> Result<String, Error> {
    let prompts =
        prompt_builder::commit_message_prompt(raw_prompt, max_chars, &config.system_instructions);
    send_prompts(prompts, config, transport)
}

/// Send an already-prepared prompt and return the trimmed first choice.
pub fn request_completion(
    prepared_prompt: &str,
    config: &RequestConfig,
    transport: &dyn ChatTransport,
) -> Result<String, Error> {
    let prompts = PromptPair {
        system: config.system_instructions.clone(),
        user: prepared_prompt.to_owned(),
    };
    send_prompts(prompts, config, transport)
}

fn send_prompts(
    prompts: PromptPair,
    config: &RequestConfig,
    transport: &dyn ChatTransport,
) -> Result<String, Error> {
    log::trace!("Commit-message prompt:\n{}", prompts.user);

    let req = ChatRequest::new(config, prompts);
    let reply = transport.send(&req)?;

    if !reply.is_success() {
        return Err(Error::Remote {
            status: reply.status,
            body: reply.body,
        });
    }

    extract_message(&reply.body)
}

fn extract_message(body: &str) -> Result<String, Error> {
    let chat_resp: ChatResponse = serde_json::from_str(body)
        .map_err(|e| Error::MalformedResponse(format!("failed to parse response body: {e}")))?;

    if let Some(usage) = &chat_resp.usage {
        log::debug!(
            "Token usage: prompt={}, completion={}, total={}",
            usage.prompt_tokens,
            usage.completion_tokens,
            usage.total_tokens
        );
    }

    let choice = chat_resp
        .choices
        .as_deref()
        .and_then(|choices| choices.first())
        .ok_or_else(|| Error::MalformedResponse("no choices returned".into()))?;

    let content = choice
        .message
        .as_ref()
        .and_then(|m| m.content.as_deref())
        .ok_or_else(|| Error::MalformedResponse("first choice has no message content".into()))?;

    let message = content.trim();
    if message.is_empty() {
        return Err(Error::EmptyResult);
    }

    Ok(message.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    struct StubTransport {
        reply: Result<HttpReply, String>,
        calls: Cell<usize>,
        last_request: RefCell<Option<serde_json::Value>>,
    }

    impl StubTransport {
        fn replying(status: u16, body: &str) -> Self {
            StubTransport {
                reply: Ok(HttpReply {
                    status,
                    body: body.to_owned(),
                }),
                calls: Cell::new(0),
                last_request: RefCell::new(None),
            }
        }

        fn failing(msg: &str) -> Self {
            StubTransport {
                reply: Err(msg.to_owned()),
                calls: Cell::new(0),
                last_request: RefCell::new(None),
            }
        }
    }

    impl ChatTransport for StubTransport {
        fn send(&self, request: &ChatRequest) -> Result<HttpReply, Error> {
            self.calls.set(self.calls.get() + 1);
            *self.last_request.borrow_mut() = Some(serde_json::to_value(request).unwrap());
            self.reply.clone().map_err(Error::Transport)
        }
    }

    fn config() -> RequestConfig {
        RequestConfig::new("gpt-4.1-nano", "write commit messages", 0.9)
    }

    #[test]
    fn returns_trimmed_first_choice() {
        let stub = StubTransport::replying(
            200,
            r#"{"choices":[{"message":{"content":" Fix mobile layout \n"}}]}"#,
        );
        let msg = request_completion("diff", &config(), &stub).unwrap();
        assert_eq!(msg, "Fix mobile layout");
        assert_eq!(stub.calls.get(), 1);
    }

    #[test]
    fn request_body_matches_wire_contract() {
        let stub = StubTransport::replying(200, r#"{"choices":[{"message":{"content":"ok"}}]}"#);
        request_completion("the diff", &config(), &stub).unwrap();

        let body = stub.last_request.borrow().clone().unwrap();
        assert_eq!(body["model"], "gpt-4.1-nano");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "write commit messages");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "the diff");
        assert_eq!(body["max_tokens"], 50);
        assert_eq!(body["n"], 1);
        assert_eq!(body["stop"], serde_json::json!(["\n"]));
        assert!((body["temperature"].as_f64().unwrap() - 0.9).abs() < 1e-6);
    }

    #[test]
    fn empty_choices_is_malformed() {
        let stub = StubTransport::replying(200, r#"{"choices":[]}"#);
        let err = request_completion("diff", &config(), &stub).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
        assert!(err.to_string().contains("no choices"));
    }

    #[test]
    fn missing_choices_is_malformed() {
        let stub = StubTransport::replying(200, r#"{"id":"x"}"#);
        let err = request_completion("diff", &config(), &stub).unwrap_err();
        assert!(err.to_string().contains("no choices"));
    }

    #[test]
    fn missing_or_null_content_is_malformed() {
        for body in [
            r#"{"choices":[{}]}"#,
            r#"{"choices":[{"message":{}}]}"#,
            r#"{"choices":[{"message":{"content":null}}]}"#,
        ] {
            let stub = StubTransport::replying(200, body);
            let err = request_completion("diff", &config(), &stub).unwrap_err();
            assert!(matches!(err, Error::MalformedResponse(_)), "body {body}");
        }
    }

    #[test]
    fn non_json_body_is_malformed() {
        let stub = StubTransport::replying(200, "<html>gateway</html>");
        let err = request_completion("diff", &config(), &stub).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[test]
    fn whitespace_only_content_is_empty_result() {
        let stub = StubTransport::replying(200, r#"{"choices":[{"message":{"content":"  \n "}}]}"#);
        let err = request_completion("diff", &config(), &stub).unwrap_err();
        assert!(matches!(err, Error::EmptyResult));
    }

    #[test]
    fn server_error_carries_status_and_body() {
        let stub = StubTransport::replying(500, r#"{"error":"server busy"}"#);
        let err = request_completion("diff", &config(), &stub).unwrap_err();
        match &err {
            Error::Remote { status, body } => {
                assert_eq!(*status, 500);
                assert_eq!(body, r#"{"error":"server busy"}"#);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        let msg = err.to_string();
        assert!(msg.contains("500") && msg.contains("server busy"));
    }

    #[test]
    fn transport_failure_is_not_retried() {
        let stub = StubTransport::failing("connection refused");
        let err = request_completion("diff", &config(), &stub).unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        assert_eq!(stub.calls.get(), 1);
    }

    #[test]
    fn usage_block_is_tolerated() {
        let stub = StubTransport::replying(
            200,
            r#"{"choices":[{"message":{"role":"assistant","content":"Change pricing"}}],
                "usage":{"prompt_tokens":12,"completion_tokens":3,"total_tokens":15}}"#,
        );
        assert_eq!(request_completion("diff", &config(), &stub).unwrap(), "Change pricing");
    }

    #[test]
    fn generate_truncates_before_sending() {
        let stub = StubTransport::replying(200, r#"{"choices":[{"message":{"content":"ok"}}]}"#);
        let raw = "a".repeat(10_000);
        generate_commit_message(&raw, 8000, &config(), &stub).unwrap();

        let body = stub.last_request.borrow().clone().unwrap();
        let sent = body["messages"][1]["content"].as_str().unwrap();
        assert_eq!(sent.len(), 8000);
    }
}
