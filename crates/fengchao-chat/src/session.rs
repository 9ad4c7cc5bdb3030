//! Conversation state and REPL commands.

use std::io::Write;

use fengchao::{ChatClient, ClientError, CompletionOptions, Message, PromptTemplate};
use futures_util::StreamExt;
use tracing::debug;

pub const HELP: &str = "\
:help     show this help
:clear    forget the conversation so far
:history  print the conversation so far
:exit     quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    Help,
    Clear,
    History,
    Exit,
    Empty,
    Ask(&'a str),
}

impl<'a> Command<'a> {
    pub fn parse(line: &'a str) -> Self {
        match line.trim() {
            ":help" => Self::Help,
            ":clear" => Self::Clear,
            ":history" => Self::History,
            ":exit" | ":quit" => Self::Exit,
            "" => Self::Empty,
            text => Self::Ask(text),
        }
    }
}

/// Running conversation: optional system prompt plus alternating turns.
pub struct ChatSession {
    system: Option<String>,
    history: Vec<Message>,
}

impl ChatSession {
    pub fn new(system: Option<String>) -> Self {
        Self {
            system: system.filter(|s| !s.trim().is_empty()),
            history: Vec::new(),
        }
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub fn history_lines(&self) -> Vec<String> {
        if self.history.is_empty() {
            return vec!["(no history)".to_string()];
        }
        self.history
            .iter()
            .map(|m| format!(">> {}: {}", m.role, m.content))
            .collect()
    }

    fn prompt_for(&self, input: &str) -> PromptTemplate {
        let mut prompt = PromptTemplate::new();
        if let Some(system) = &self.system {
            prompt.push(Message::system(system.clone()));
        }
        for message in &self.history {
            prompt.push(message.clone());
        }
        prompt.push(Message::user(input));
        prompt
    }

    /// Stream an answer to `input`, writing chunks to `out` as they arrive.
    /// The turn is recorded only if the stream finishes cleanly.
    pub async fn ask<W: Write>(
        &mut self,
        client: &dyn ChatClient,
        options: CompletionOptions,
        input: &str,
        out: &mut W,
    ) -> fengchao_common::Result<String> {
        let prompt = self.prompt_for(input);
        debug!(turns = self.history.len() / 2, "sending chat turn");

        let mut frames = client.complete_streaming(Some(&prompt), options).await?;
        let mut answer = String::new();
        while let Some(frame) = frames.next().await {
            let frame = frame.map_err(ClientError::from)?;
            let chunk = frame.text();
            write!(out, "{chunk}")?;
            out.flush()?;
            answer.push_str(chunk);
        }
        writeln!(out)?;

        self.history.push(Message::user(input));
        self.history.push(Message::assistant(answer.clone()));
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use fengchao::stream::BufferedLineSource;
    use fengchao::{
        chat_completion_error_handler, ChatCompletionResult, EventStream, FrameStream, Prompt,
        Role,
    };

    struct ScriptedClient {
        body: &'static str,
        prompts: Mutex<Vec<Vec<Message>>>,
    }

    impl ScriptedClient {
        fn new(body: &'static str) -> Self {
            Self {
                body,
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatClient for ScriptedClient {
        async fn complete(
            &self,
            _prompt: Option<&dyn Prompt>,
            _options: CompletionOptions,
        ) -> Result<ChatCompletionResult, ClientError> {
            Err(ClientError::InvalidOption("not scripted".into()))
        }

        async fn complete_streaming(
            &self,
            prompt: Option<&dyn Prompt>,
            _options: CompletionOptions,
        ) -> Result<FrameStream<ChatCompletionResult>, ClientError> {
            if let Some(prompt) = prompt {
                let messages = prompt.render_messages(&serde_json::Value::Null)?;
                self.prompts.lock().unwrap().push(messages);
            }
            let source = BufferedLineSource::new(self.body.as_bytes());
            Ok(EventStream::new(source, chat_completion_error_handler).into_stream())
        }
    }

    const ANSWER: &str = "event: add\n\
        data: {\"choices\":[{\"message\":{\"content\":\"Hi \"}}],\"status\":200}\n\
        event: stop\n\
        data: {\"choices\":[{\"message\":{\"content\":\"there\"}}],\"status\":200}\n";

    #[test]
    fn parses_commands() {
        assert_eq!(Command::parse(":help"), Command::Help);
        assert_eq!(Command::parse(" :exit "), Command::Exit);
        assert_eq!(Command::parse(":clear"), Command::Clear);
        assert_eq!(Command::parse(":history"), Command::History);
        assert_eq!(Command::parse("   "), Command::Empty);
        assert_eq!(Command::parse("hello "), Command::Ask("hello"));
    }

    #[tokio::test]
    async fn ask_streams_answer_and_records_turn() {
        let client = ScriptedClient::new(ANSWER);
        let mut session = ChatSession::new(Some("be nice".into()));
        let mut out = Vec::new();

        let answer = session
            .ask(&client, CompletionOptions::default(), "hello", &mut out)
            .await
            .unwrap();
        assert_eq!(answer, "Hi there");
        assert_eq!(String::from_utf8(out).unwrap(), "Hi there\n");
        assert_eq!(
            session.history(),
            [Message::user("hello"), Message::assistant("Hi there")]
        );

        session
            .ask(&client, CompletionOptions::default(), "again", &mut Vec::new())
            .await
            .unwrap();
        let prompts = client.prompts.lock().unwrap();
        let roles: Vec<Role> = prompts[1].iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            [Role::System, Role::User, Role::Assistant, Role::User]
        );
    }

    #[tokio::test]
    async fn failed_stream_leaves_history_untouched() {
        let client = ScriptedClient::new(
            "event: error\ndata: {\"status\":500,\"msg\":\"busy\"}\n",
        );
        let mut session = ChatSession::new(None);
        let err = session
            .ask(&client, CompletionOptions::default(), "hello", &mut Vec::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("chat completion failed: [500]busy"));
        assert!(session.history().is_empty());
    }

    #[test]
    fn history_lines_and_clear() {
        let mut session = ChatSession::new(None);
        assert_eq!(session.history_lines(), ["(no history)"]);
        session.history.push(Message::user("q"));
        session.history.push(Message::assistant("a"));
        assert_eq!(session.history_lines(), [">> user: q", ">> assistant: a"]);
        session.clear();
        assert!(session.history().is_empty());
    }
}
