use crate::model::{ChatRequest, Message, ModelDescriptor, ResponseFormat};

const JSON_DIRECTIVE: &str = "Please provide the response in JSON format.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest {
    text: String,
    json_mode: bool,
}

impl PromptRequest {
    /// JSON mode is on when forced or when the prompt already mentions "json"
    /// (any case). Only the forced case rewrites the prompt.
    pub fn new(prompt: impl Into<String>, force_json: bool) -> Self {
        let mut text = prompt.into();
        let mentions_json = text.to_lowercase().contains("json");
        let json_mode = force_json || mentions_json;

        if json_mode && !mentions_json {
            text.push(' ');
            text.push_str(JSON_DIRECTIVE);
        }

        Self { text, json_mode }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn json_mode(&self) -> bool {
        self.json_mode
    }

    pub fn response_format(&self) -> Option<ResponseFormat> {
        self.json_mode.then(ResponseFormat::json_object)
    }

    pub fn to_chat_request(&self, model: &ModelDescriptor) -> ChatRequest {
        ChatRequest {
            model: model.clone(),
            messages: vec![Message::user(self.text.clone())],
            response_format: self.response_format(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{JSON_DIRECTIVE, PromptRequest};
    use crate::model::{MessageRole, ModelDescriptor, ResponseFormat};

    #[test]
    fn plain_prompt_is_sent_unchanged_without_json_mode() {
        let request = PromptRequest::new("tell me a joke", false);
        assert!(!request.json_mode());
        assert_eq!(request.text(), "tell me a joke");
        assert_eq!(request.response_format(), None);
    }

    #[test]
    fn prompt_mentioning_json_enables_json_mode_without_rewrite() {
        for prompt in ["list colors as json", "Return JSON please", "a JsOn blob"] {
            for force in [false, true] {
                let request = PromptRequest::new(prompt, force);
                assert!(request.json_mode(), "prompt: {prompt}");
                assert_eq!(request.text(), prompt);
                assert_eq!(
                    request.response_format(),
                    Some(ResponseFormat::json_object())
                );
            }
        }
    }

    #[test]
    fn forced_json_appends_directive_once() {
        let request = PromptRequest::new("list three colors", true);
        assert!(request.json_mode());
        assert_eq!(
            request.text(),
            "list three colors Please provide the response in JSON format."
        );
        assert_eq!(request.text().matches(JSON_DIRECTIVE).count(), 1);
    }

    #[test]
    fn chat_request_carries_single_user_message() {
        let model = ModelDescriptor::new("llama-3.1-8b-instant");
        let chat = PromptRequest::new("hi", true).to_chat_request(&model);

        assert_eq!(chat.model, model);
        assert_eq!(chat.messages.len(), 1);
        assert_eq!(chat.messages[0].role, MessageRole::User);
        assert_eq!(
            chat.messages[0].content,
            "hi Please provide the response in JSON format."
        );
        assert_eq!(chat.response_format, Some(ResponseFormat::json_object()));
    }
}
