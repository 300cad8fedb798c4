//! Inline directive grammar.
//!
//! Two forms are recognized inside message content:
//! - commands, `c:<name>` with a lowercase name (`c:echo`, `c:editor`, `c:print`);
//! - injections, `i:<role>:<content>`, which queue an extra message.

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

const COMMAND_PATTERN: &str = r"\bc:([a-z]+)";
const INJECTION_PATTERN: &str = r"\bi:([^:\s]+):([^\n]*)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Echo,
    Editor,
    Print,
    Unsupported(String),
}

impl Command {
    pub fn from_name(name: &str) -> Self {
        match name {
            "echo" => Self::Echo,
            "editor" => Self::Editor,
            "print" => Self::Print,
            _ => Self::Unsupported(name.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Echo => "echo",
            Self::Editor => "editor",
            Self::Print => "print",
            Self::Unsupported(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDirective {
    pub command: Command,
    /// Byte range of the whole `c:<name>` match.
    pub span: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectionDirective {
    /// Role as written; validated when the message is appended.
    pub role: String,
    pub content: String,
    /// Byte range of the whole `i:<role>:<content>` match.
    pub span: Range<usize>,
}

fn command_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(COMMAND_PATTERN).expect("command pattern is valid"))
}

fn injection_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(INJECTION_PATTERN).expect("injection pattern is valid"))
}

/// First command directive in `content`, if any.
pub fn find_command(content: &str) -> Option<CommandDirective> {
    let captures = command_regex().captures(content)?;
    let whole = captures.get(0)?;
    let name = captures.get(1)?;

    Some(CommandDirective {
        command: Command::from_name(name.as_str()),
        span: whole.range(),
    })
}

/// First injection directive in `content`, if any.
pub fn find_injection(content: &str) -> Option<InjectionDirective> {
    let captures = injection_regex().captures(content)?;
    let whole = captures.get(0)?;
    let role = captures.get(1)?;
    let injected = captures.get(2)?;

    Some(InjectionDirective {
        role: role.as_str().to_string(),
        content: injected.as_str().trim_end_matches('\r').to_string(),
        span: whole.range(),
    })
}

/// Remove `span` from `content` and drop the blank-line characters left
/// around what remains.
pub fn strip(content: &str, span: Range<usize>) -> String {
    let mut stripped = String::with_capacity(content.len());
    stripped.push_str(&content[..span.start]);
    stripped.push_str(&content[span.end..]);
    trim_line_breaks(&stripped).to_string()
}

pub fn trim_line_breaks(content: &str) -> &str {
    content.trim_matches(|ch| ch == '\r' || ch == '\n')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_command_reports_name_and_span() {
        let found = find_command("Hello\nc:echo").expect("command present");
        assert_eq!(found.command, Command::Echo);
        assert_eq!(found.span, 6..12);
    }

    #[test]
    fn find_command_maps_unknown_names_to_unsupported() {
        let found = find_command("please c:bogus now").expect("command present");
        assert_eq!(found.command, Command::Unsupported("bogus".to_string()));
        assert_eq!(found.command.name(), "bogus");
    }

    #[test]
    fn find_command_requires_word_boundary_and_lowercase_name() {
        assert!(find_command("abc:echo").is_none());
        assert!(find_command("c:Echo").is_none());
        assert!(find_command("c:").is_none());
        assert_eq!(
            find_command("c:Echo c:print").map(|found| found.command),
            Some(Command::Print)
        );
    }

    #[test]
    fn find_command_returns_first_occurrence() {
        let found = find_command("c:echo then c:print").expect("command present");
        assert_eq!(found.command, Command::Echo);
        assert_eq!(found.span, 0..6);
    }

    #[test]
    fn find_injection_captures_role_and_rest_of_line() {
        let found = find_injection("Question\ni:system:Be terse, please\nmore").expect("injection");
        assert_eq!(found.role, "system");
        assert_eq!(found.content, "Be terse, please");
        assert_eq!(&"Question\ni:system:Be terse, please\nmore"[found.span], "i:system:Be terse, please");
    }

    #[test]
    fn find_injection_drops_carriage_return() {
        let found = find_injection("i:user:hi\r\nnext").expect("injection");
        assert_eq!(found.content, "hi");
    }

    #[test]
    fn strip_removes_span_and_surrounding_line_breaks() {
        let content = "Hello\nc:echo";
        let found = find_command(content).expect("command present");
        assert_eq!(strip(content, found.span), "Hello");

        let content = "c:print\r\nkeep this";
        let found = find_command(content).expect("command present");
        assert_eq!(strip(content, found.span), "keep this");
    }

    #[test]
    fn strip_keeps_inline_spacing() {
        let content = "say c:echo this";
        let found = find_command(content).expect("command present");
        assert_eq!(strip(content, found.span), "say  this");
    }
}
