/// Prefix used when the config does not set one
pub const DEFAULT_PREFIX: &str = "!hugot";

/// A message split into space-separated tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand<'a> {
    /// Whether the first token is the bot's prefix
    pub matched: bool,
    pub tokens: Vec<&'a str>,
}

impl<'a> ParsedCommand<'a> {
    /// The token right after the prefix, if any
    pub fn command(&self) -> Option<&'a str> {
        self.tokens.get(1).copied()
    }

    /// Everything after the command name
    pub fn args(&self) -> &[&'a str] {
        self.tokens.get(2..).unwrap_or(&[])
    }
}

/// Decides whether a message is addressed to the bot.
#[derive(Debug, Clone)]
pub struct Parser {
    prefix: String,
}

impl Parser {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Split on every single space. No trimming and no collapsing of runs,
    /// so `"a  b"` yields an empty token between `a` and `b`.
    pub fn parse<'a>(&self, text: &'a str) -> ParsedCommand<'a> {
        let tokens: Vec<&str> = text.split(' ').collect();
        let matched = tokens[0] == self.prefix;
        ParsedCommand { matched, tokens }
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_and_command() {
        let parsed = Parser::default().parse("!hugot ping");
        assert!(parsed.matched);
        assert_eq!(parsed.tokens, vec!["!hugot", "ping"]);
        assert_eq!(parsed.command(), Some("ping"));
        assert!(parsed.args().is_empty());
    }

    #[test]
    fn test_args_follow_command() {
        let parsed = Parser::default().parse("!hugot ivy 2 + 2");
        assert_eq!(parsed.command(), Some("ivy"));
        assert_eq!(parsed.args(), &["2", "+", "2"]);
    }

    #[test]
    fn test_no_prefix_does_not_match() {
        let parser = Parser::default();
        for text in ["ping", "hugot ping", "!hugotping", " !hugot ping", "!HUGOT ping", "!hugot2 x"] {
            assert!(!parser.parse(text).matched, "{:?} should not match", text);
        }
    }

    #[test]
    fn test_any_rest_after_prefix_matches() {
        let parser = Parser::default();
        for rest in ["", "ping", "  spaced", "ünïcødé text"] {
            let text = format!("!hugot {}", rest);
            let parsed = parser.parse(&text);
            assert!(parsed.matched);
            assert_eq!(parsed.tokens[0], "!hugot");
        }
    }

    #[test]
    fn test_double_space_yields_empty_token() {
        let parsed = Parser::default().parse("!hugot  ping");
        assert!(parsed.matched);
        assert_eq!(parsed.tokens, vec!["!hugot", "", "ping"]);
        assert_eq!(parsed.command(), Some(""));
    }

    #[test]
    fn test_empty_input() {
        let parsed = Parser::default().parse("");
        assert!(!parsed.matched);
        assert_eq!(parsed.tokens, vec![""]);
    }

    #[test]
    fn test_empty_prefix_matches_empty_input() {
        assert!(Parser::new("").parse("").matched);
    }

    #[test]
    fn test_prefix_only_has_no_command() {
        let parsed = Parser::default().parse("!hugot");
        assert!(parsed.matched);
        assert_eq!(parsed.command(), None);
        assert!(parsed.args().is_empty());
    }

    #[test]
    fn test_no_trimming_of_newlines() {
        let parsed = Parser::default().parse("!hugot ping\n");
        assert_eq!(parsed.command(), Some("ping\n"));
    }
}
