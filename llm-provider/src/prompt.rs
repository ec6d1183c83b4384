//! Fixed system prompts and prompt composition.

use crate::config::llm_provider::LlmProvider;

/// Instruction sent ahead of every question when the relay runs on Gemini.
pub const GEMINI_SYSTEM_PROMPT: &str = "You are a java code generator. Respond only with clean code. No explanations, no comments, no markdown formatting, no code blocks. Write simple, straightforward code that works. Do not include any text before or after the code. Just return the raw code. Make sure to include the main method and the main class should not be public use only class Name and inside it public static void main(String[] args){//code goes here}. Also u are allowed to use multiple methods and classes but keep it in the same file unless asked specifically to use different packages in that case before each class include the name of file and folder for the class below it.";

/// Instruction sent ahead of every question when the relay runs on Groq.
pub const GROQ_SYSTEM_PROMPT: &str = "You are a java, python and assembly language (MSME x82 bit) code generator. Respond only with complete, fully functional code. Do not shorten or truncate the code. Do not use placeholders like '// ... rest of code'. Write the full code every time. No markdown formatting, no code blocks, just raw code. Do not include any text before or after the code. If multiple files are needed, output them sequentially with a comment separator.";

/// Test prompt used by the startup model probe.
pub const PROBE_PROMPT: &str = "Hi";

/// Returns the fixed system prompt of `provider`.
pub fn system_prompt(provider: LlmProvider) -> &'static str {
    match provider {
        LlmProvider::Gemini => GEMINI_SYSTEM_PROMPT,
        LlmProvider::Groq => GROQ_SYSTEM_PROMPT,
    }
}

/// A system prompt paired with the caller's question.
///
/// [`ComposedPrompt::text`] is the single payload sent upstream. Chat-style
/// providers may instead send [`system`](Self::system) and
/// [`question`](Self::question) as separate messages of the same request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPrompt {
    system: &'static str,
    question: String,
}

impl ComposedPrompt {
    /// Pairs `system` with `question`. The question is kept verbatim.
    pub fn compose(system: &'static str, question: impl Into<String>) -> Self {
        Self {
            system,
            question: question.into(),
        }
    }

    /// Pairs the provider's fixed system prompt with `question`.
    pub fn for_provider(provider: LlmProvider, question: impl Into<String>) -> Self {
        Self::compose(system_prompt(provider), question)
    }

    /// The trivial prompt used to check that a model answers at all.
    pub fn probe() -> Self {
        Self::compose("", PROBE_PROMPT)
    }

    pub fn system(&self) -> &str {
        self.system
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    /// `"{system}\n\nUser request: {question}"`, or just the question when
    /// there is no system prompt.
    pub fn text(&self) -> String {
        if self.system.is_empty() {
            self.question.clone()
        } else {
            format!("{}\n\nUser request: {}", self.system, self.question)
        }
    }
}
