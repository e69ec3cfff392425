//! Help-desk assistant.
//!
//! Questions are first matched against canned FAQ answers; anything else is
//! forwarded to a [`ReplySource`], usually a hosted text-generation model.
//! A failing source never surfaces as an error to the user, it produces
//! [`FALLBACK_REPLY`] instead.

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value as Json;

use crate::error::ApiError;
use crate::error::Error;

/// Default text-generation endpoint.
pub const DEFAULT_ASSISTANT_URL: &str =
    "https://generative.googleapis.com/v1beta2/models/gemini-1.0:generateText";

/// Upper bound on the length of a generated reply.
pub const MAX_OUTPUT_TOKENS: u32 = 512;

/// First message of every conversation.
pub const GREETING: &str = "Hi! I'm the virtual assistant. Ask a question or pick an FAQ.";

/// Reply when the source answered with nothing.
pub const NO_ANSWER: &str = "Sorry, I don't have an answer right now.";

/// Reply when the source could not be reached.
pub const FALLBACK_REPLY: &str = "Sorry, something went wrong while contacting the assistant service.";

/// A canned answer and the phrases that trigger it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Faq {
    pub question: String,
    /// Lowercase substrings; any one of them matches.
    pub patterns: Vec<String>,
    pub answer: String,
}

impl Faq {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            patterns: Vec::new(),
            answer: answer.into(),
        }
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.patterns.push(pattern.into().to_lowercase());
        self
    }

    /// `text` must already be lowercase.
    fn matches(&self, text: &str) -> bool {
        self.patterns.iter().any(|p| text.contains(p.as_str()))
    }
}

/// FAQs for the delivery dashboard.
pub fn default_faqs() -> Vec<Faq> {
    vec![
        Faq::new(
            "What is this system for?",
            "This system manages orders and deliveries for restaurants and drivers.",
        )
        .pattern("what is this system for")
        .pattern("what does it do")
        .pattern("what does this do"),
        Faq::new(
            "Where do I register a driver?",
            "Drivers are registered in the \"Drivers\" section of the menu, or on the sign-up page if you are an administrator.",
        )
        .pattern("register a driver")
        .pattern("driver registration")
        .pattern("register driver"),
        Faq::new(
            "Where do I place an order?",
            "Go to the \"Orders\" section and choose \"New order\"; there you can pick products and confirm.",
        )
        .pattern("place an order")
        .pattern("where do i order")
        .pattern("how do i order"),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
}

/// One line of the conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub from: Speaker,
    pub text: String,
    pub time: DateTime<Utc>,
}

/// Produces a reply for questions no FAQ covers.
#[async_trait]
pub trait ReplySource: Send + Sync {
    async fn reply(&self, message: &str) -> Result<String, Error>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    prompt: &'a str,
    max_output_tokens: u32,
}

/// Hosted text-generation model.
///
/// The request is `{"prompt": ..., "maxOutputTokens": 512}`; the reply text
/// is pulled out of whichever response shape comes back (see
/// [`extract_reply`]).
#[derive(Debug, Clone)]
pub struct TextGenerationSource {
    url: String,
    api_key: Option<String>,
    http_client: reqwest::Client,
}

impl Default for TextGenerationSource {
    fn default() -> Self {
        Self::new(DEFAULT_ASSISTANT_URL)
    }
}

impl TextGenerationSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: None,
            http_client: reqwest::Client::new(),
        }
    }

    /// Sent as a bearer token.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = client;
        self
    }
}

#[async_trait]
impl ReplySource for TextGenerationSource {
    async fn reply(&self, message: &str) -> Result<String, Error> {
        if message.trim().is_empty() {
            return Ok(String::new());
        }

        let mut request = self.http_client.post(&self.url).json(&GenerateRequest {
            prompt: message,
            max_output_tokens: MAX_OUTPUT_TOKENS,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        log::debug!("POST {}", self.url);

        let response = request.send().await.map_err(ApiError::from)?;
        let status = response.status();
        let body = response.text().await.map_err(ApiError::from)?;
        if !status.is_success() {
            return Err(ApiError::from_response_body(status, &body).into());
        }

        let json: Json = serde_json::from_str(&body)
            .map_err(|e| ApiError::parse_with_body(e.to_string(), body.clone()))?;
        Ok(extract_reply(&json))
    }
}

/// Best-effort reply text from a text-generation response.
///
/// Understands `{"candidates": [{"output" | "content" | "text": ...}]}`,
/// `{"output": [{"content": [{"text": ...}]}]}` and top-level
/// `output_text` / `text`. Anything else comes back as raw JSON.
pub fn extract_reply(response: &Json) -> String {
    if response.is_null() {
        return NO_ANSWER.to_string();
    }

    if let Some(first) = response
        .get("candidates")
        .and_then(Json::as_array)
        .and_then(|c| c.first())
    {
        return ["output", "content", "text"]
            .iter()
            .find_map(|field| non_empty_str(first.get(field)))
            .unwrap_or_else(|| first.to_string());
    }

    if let Some(output) = response
        .get("output")
        .and_then(Json::as_array)
        .filter(|o| !o.is_empty())
    {
        let text = output
            .iter()
            .map(|part| match part.get("content").and_then(Json::as_array) {
                Some(content) if !content.is_empty() => content
                    .iter()
                    .map(|c| non_empty_str(c.get("text")).unwrap_or_else(|| text_of(c)))
                    .collect::<Vec<_>>()
                    .join("\n"),
                _ => non_empty_str(part.get("text")).unwrap_or_else(|| part.to_string()),
            })
            .collect::<Vec<_>>()
            .join("\n");
        return if text.is_empty() {
            response.to_string()
        } else {
            text
        };
    }

    non_empty_str(response.get("output_text"))
        .or_else(|| non_empty_str(response.get("text")))
        .unwrap_or_else(|| response.to_string())
}

fn non_empty_str(value: Option<&Json>) -> Option<String> {
    value
        .and_then(Json::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn text_of(value: &Json) -> String {
    match value {
        Json::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// A conversation with FAQ matching in front of a [`ReplySource`].
///
/// # Example
///
/// ```ignore
/// let mut assistant = Assistant::new(TextGenerationSource::default());
/// let reply = assistant.send("How do I place an order?").await;
/// ```
#[derive(Debug)]
pub struct Assistant<S> {
    faqs: Vec<Faq>,
    source: S,
    history: Vec<Message>,
}

impl<S: ReplySource> Assistant<S> {
    /// Starts a conversation with the default FAQs and a greeting.
    pub fn new(source: S) -> Self {
        let mut assistant = Self {
            faqs: default_faqs(),
            source,
            history: Vec::new(),
        };
        assistant.push(Speaker::Assistant, GREETING.to_string());
        assistant
    }

    pub fn with_faqs(mut self, faqs: Vec<Faq>) -> Self {
        self.faqs = faqs;
        self
    }

    pub fn faqs(&self) -> &[Faq] {
        &self.faqs
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// First FAQ with a pattern contained in `text`, ignoring case.
    pub fn find_faq(&self, text: &str) -> Option<&Faq> {
        let text = text.to_lowercase();
        self.faqs.iter().find(|faq| faq.matches(&text))
    }

    /// Records `text` and the reply, and returns the reply.
    ///
    /// Blank input is ignored and returns `None`. FAQ matches never reach the
    /// source.
    pub async fn send(&mut self, text: &str) -> Option<String> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        self.push(Speaker::User, text.to_string());

        let reply = match self.find_faq(text).map(|faq| faq.answer.clone()) {
            Some(answer) => answer,
            None => match self.source.reply(text).await {
                Ok(reply) if !reply.trim().is_empty() => reply,
                Ok(_) => NO_ANSWER.to_string(),
                Err(e) => {
                    log::warn!("Assistant reply failed: {}", e.message());
                    FALLBACK_REPLY.to_string()
                }
            },
        };
        self.push(Speaker::Assistant, reply.clone());
        Some(reply)
    }

    /// Asks the FAQ at `index` as if the user had typed its question.
    pub fn choose_faq(&mut self, index: usize) -> Option<String> {
        let faq = self.faqs.get(index)?.clone();
        self.push(Speaker::User, faq.question);
        self.push(Speaker::Assistant, faq.answer.clone());
        Some(faq.answer)
    }

    fn push(&mut self, from: Speaker, text: String) {
        self.history.push(Message {
            from,
            text,
            time: Utc::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    struct CannedSource {
        reply: Result<&'static str, u16>,
        calls: AtomicUsize,
    }

    impl CannedSource {
        fn answering(reply: &'static str) -> Self {
            Self {
                reply: Ok(reply),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(status: u16) -> Self {
            Self {
                reply: Err(status),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ReplySource for CannedSource {
        async fn reply(&self, _message: &str) -> Result<String, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.reply {
                Ok(reply) => Ok(reply.to_string()),
                Err(status) => Err(ApiError::http(status, "unavailable").into()),
            }
        }
    }

    #[test]
    fn test_faq_matching_ignores_case() {
        let assistant = Assistant::new(CannedSource::answering(""));
        let faq = assistant.find_faq("Hello, how do I REGISTER A DRIVER?").unwrap();
        assert!(faq.answer.contains("Drivers"));
        assert!(assistant.find_faq("what's the weather").is_none());
    }

    #[tokio::test]
    async fn test_faq_answers_without_calling_source() {
        let mut assistant = Assistant::new(CannedSource::answering("model reply"));
        let reply = assistant.send("Where do I place an order?").await.unwrap();
        assert!(reply.starts_with("Go to the \"Orders\" section"));
        assert_eq!(assistant.source.calls.load(Ordering::SeqCst), 0);

        let reply = assistant.send("Which driver is fastest?").await.unwrap();
        assert_eq!(reply, "model reply");
        assert_eq!(assistant.source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_source_failure_gives_fallback_reply() {
        let mut assistant = Assistant::new(CannedSource::failing(503));
        assert_eq!(assistant.send("anything").await.as_deref(), Some(FALLBACK_REPLY));
    }

    #[tokio::test]
    async fn test_empty_reply_gives_no_answer() {
        let mut assistant = Assistant::new(CannedSource::answering("   "));
        assert_eq!(assistant.send("anything").await.as_deref(), Some(NO_ANSWER));
    }

    #[tokio::test]
    async fn test_history_records_both_sides() {
        let mut assistant = Assistant::new(CannedSource::answering("sure"));
        assert_eq!(assistant.send("   ").await, None);
        assistant.send("hello").await;
        assistant.choose_faq(0);
        assert_eq!(assistant.choose_faq(99), None);

        let lines: Vec<(Speaker, &str)> = assistant
            .history()
            .iter()
            .map(|m| (m.from, m.text.as_str()))
            .collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], (Speaker::Assistant, GREETING));
        assert_eq!(lines[1], (Speaker::User, "hello"));
        assert_eq!(lines[2], (Speaker::Assistant, "sure"));
        assert_eq!(lines[3], (Speaker::User, "What is this system for?"));
    }

    #[test]
    fn test_extract_reply_shapes() {
        assert_eq!(
            extract_reply(&json!({"candidates": [{"output": "from output"}]})),
            "from output"
        );
        assert_eq!(
            extract_reply(&json!({"candidates": [{"content": "from content"}, {"output": "x"}]})),
            "from content"
        );
        assert_eq!(
            extract_reply(&json!({"output": [
                {"content": [{"text": "line one"}, "line two"]},
                {"text": "line three"}
            ]})),
            "line one\nline two\nline three"
        );
        assert_eq!(extract_reply(&json!({"output_text": "plain"})), "plain");
        assert_eq!(extract_reply(&json!({"unknown": 1})), r#"{"unknown":1}"#);
        assert_eq!(extract_reply(&Json::Null), NO_ANSWER);
    }
}
