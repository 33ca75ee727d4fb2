use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::parser::Parser;
use super::{is_own_message, reply, Handler};
use crate::eval::Evaluator;
use crate::platform::{InboundMessage, Session};

/// `ivy <expression>`: evaluates the expression and replies with the result
/// or the error text, never both.
pub struct CalculatorHandler {
    parser: Parser,
    evaluator: Arc<dyn Evaluator>,
    max_reply_chars: usize,
}

impl CalculatorHandler {
    pub fn new(parser: Parser, evaluator: Arc<dyn Evaluator>, max_reply_chars: usize) -> Self {
        Self {
            parser,
            evaluator,
            max_reply_chars,
        }
    }
}

/// Cut `text` to at most `max_chars` characters, marking the cut with `…`.
fn truncate_reply(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", kept)
}

#[async_trait]
impl Handler for CalculatorHandler {
    fn name(&self) -> &str {
        "calculator"
    }

    async fn handle(&self, session: &dyn Session, msg: &InboundMessage) {
        let parsed = self.parser.parse(&msg.content);
        if !parsed.matched || is_own_message(session, msg) {
            return;
        }
        if parsed.command() != Some("ivy") {
            return;
        }

        let expression = format!("{}\n", parsed.args().join(" "));
        debug!("Evaluating {:?} for {}", expression, msg.author_id);

        let text = match self.evaluator.evaluate(&expression) {
            Ok(output) => output,
            Err(e) => e.to_string(),
        };

        reply(session, msg, &truncate_reply(&text, self.max_reply_chars)).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::eval::{EvalError, IvyEvaluator};
    use crate::platform::testing::{message, RecordingSession};

    /// Returns a fixed result and remembers what it was asked.
    struct StubEvaluator {
        result: Result<String, EvalError>,
        seen: Mutex<Vec<String>>,
    }

    impl StubEvaluator {
        fn new(result: Result<String, EvalError>) -> Arc<Self> {
            Arc::new(Self {
                result,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    impl Evaluator for StubEvaluator {
        fn evaluate(&self, expression: &str) -> Result<String, EvalError> {
            self.seen.lock().unwrap().push(expression.to_string());
            self.result.clone()
        }
    }

    async fn run(evaluator: Arc<dyn Evaluator>, author: &str, content: &str) -> Vec<String> {
        let session = RecordingSession::new("bot-id");
        CalculatorHandler::new(Parser::default(), evaluator, 1900)
            .handle(&session, &message(author, content))
            .await;
        session.sent().into_iter().map(|(_, text)| text).collect()
    }

    #[tokio::test]
    async fn test_result_is_the_only_reply() {
        let stub = StubEvaluator::new(Ok("4".to_string()));
        let sent = run(stub.clone(), "user-1", "!hugot ivy 2 + 2").await;
        assert_eq!(sent, vec!["4"]);
        assert_eq!(*stub.seen.lock().unwrap(), vec!["2 + 2\n"]);
    }

    #[tokio::test]
    async fn test_error_is_the_only_reply() {
        let stub = StubEvaluator::new(Err(EvalError::DivisionByZero));
        let sent = run(stub, "user-1", "!hugot ivy 1 / 0").await;
        assert_eq!(sent, vec!["division by zero"]);
    }

    #[tokio::test]
    async fn test_reply_goes_to_source_channel() {
        let session = RecordingSession::new("bot-id");
        let mut msg = message("user-1", "!hugot ivy 1");
        msg.channel_id = "elsewhere".to_string();
        CalculatorHandler::new(Parser::default(), Arc::new(IvyEvaluator::new()), 1900)
            .handle(&session, &msg)
            .await;
        assert_eq!(session.sent(), vec![("elsewhere".to_string(), "1".to_string())]);
    }

    #[tokio::test]
    async fn test_args_joined_with_single_spaces() {
        let stub = StubEvaluator::new(Ok("x".to_string()));
        run(stub.clone(), "user-1", "!hugot ivy 1  +\t2").await;
        assert_eq!(*stub.seen.lock().unwrap(), vec!["1  +\t2\n"]);
    }

    #[tokio::test]
    async fn test_no_args_still_evaluates_once() {
        let sent = run(Arc::new(IvyEvaluator::new()), "user-1", "!hugot ivy").await;
        assert_eq!(sent, vec!["empty expression"]);
    }

    #[tokio::test]
    async fn test_other_commands_are_ignored() {
        let stub = StubEvaluator::new(Ok("4".to_string()));
        assert!(run(stub.clone(), "user-1", "!hugot ping").await.is_empty());
        assert!(run(stub.clone(), "user-1", "!hugot ivy2 1").await.is_empty());
        assert!(run(stub.clone(), "user-1", "ivy 2 + 2").await.is_empty());
        assert!(stub.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_own_message_is_ignored() {
        let stub = StubEvaluator::new(Ok("4".to_string()));
        assert!(run(stub.clone(), "bot-id", "!hugot ivy 2 + 2").await.is_empty());
        assert!(stub.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_real_evaluator() {
        let sent = run(Arc::new(IvyEvaluator::new()), "user-1", "!hugot ivy +/ iota 10").await;
        assert_eq!(sent, vec!["55"]);
    }

    #[tokio::test]
    async fn test_deeply_nested_expression_replies_with_error() {
        let text = format!("!hugot ivy {}1", "(".repeat(2000));
        let sent = run(Arc::new(IvyEvaluator::new()), "user-1", &text).await;
        assert_eq!(sent, vec!["expression nested too deeply"]);
    }

    #[test]
    fn test_truncate_reply() {
        assert_eq!(truncate_reply("short", 10), "short");
        assert_eq!(truncate_reply("abcdef", 4), "abc…");
        assert_eq!(truncate_reply("ééééé", 3), "éé…");
    }
}
