//! Slash command parsing for the REPL.

use eclipse_core::settings::{ModelId, Theme};

/// Every slash command, for completion and hints.
pub const COMMANDS: &[&str] = &[
    "/new",
    "/chats",
    "/select",
    "/show",
    "/delete",
    "/export",
    "/search",
    "/settings",
    "/model",
    "/temperature",
    "/tokens",
    "/theme",
    "/prompts",
    "/purge",
    "/help",
    "/quit",
];

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Plain text sent as a user turn.
    Submit(String),
    New,
    Chats,
    /// Chat reference: 1-based list position or id prefix.
    Select(String),
    Show,
    Delete(Option<String>),
    Export(Option<String>),
    Search(String),
    Settings,
    Model(ModelId),
    Temperature(f32),
    Tokens(u32),
    /// `None` toggles.
    Theme(Option<Theme>),
    /// `None` lists; `Some(n)` prefills the next input with prompt `n`.
    Prompts(Option<usize>),
    Purge,
    Help,
    Quit,
    Invalid(String),
}

pub fn parse(line: &str) -> Command {
    let line = line.trim();
    if !line.starts_with('/') {
        return Command::Submit(line.to_string());
    }

    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };
    let arg = (!rest.is_empty()).then(|| rest.to_string());

    match name {
        "/new" => Command::New,
        "/chats" => Command::Chats,
        "/select" => match arg {
            Some(reference) => Command::Select(reference),
            None => Command::Invalid("usage: /select <number|id>".to_string()),
        },
        "/show" => Command::Show,
        "/delete" => Command::Delete(arg),
        "/export" => Command::Export(arg),
        "/search" => Command::Search(rest.to_string()),
        "/settings" => Command::Settings,
        "/model" => match rest.parse::<ModelId>() {
            Ok(model) => Command::Model(model),
            Err(e) => Command::Invalid(e.to_string()),
        },
        "/temperature" => match rest.parse::<f32>() {
            Ok(value) => Command::Temperature(value),
            Err(_) => Command::Invalid("usage: /temperature <0.0-1.0>".to_string()),
        },
        "/tokens" => match rest.parse::<u32>() {
            Ok(value) => Command::Tokens(value),
            Err(_) => Command::Invalid("usage: /tokens <100-8000>".to_string()),
        },
        "/theme" => match arg {
            None => Command::Theme(None),
            Some(value) => match value.parse::<Theme>() {
                Ok(theme) => Command::Theme(Some(theme)),
                Err(e) => Command::Invalid(e.to_string()),
            },
        },
        "/prompts" => match arg {
            None => Command::Prompts(None),
            Some(value) => match value.parse::<usize>() {
                Ok(n) if n > 0 => Command::Prompts(Some(n)),
                _ => Command::Invalid("usage: /prompts [number]".to_string()),
            },
        },
        "/purge" => Command::Purge,
        "/help" => Command::Help,
        "/quit" | "/exit" => Command::Quit,
        other => Command::Invalid(format!("Unknown command: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_submitted_trimmed() {
        assert_eq!(parse("  Hello  "), Command::Submit("Hello".to_string()));
    }

    #[test]
    fn test_optional_arguments() {
        assert_eq!(parse("/delete"), Command::Delete(None));
        assert_eq!(parse("/export 2"), Command::Export(Some("2".to_string())));
        assert_eq!(parse("/theme"), Command::Theme(None));
        assert_eq!(parse("/theme light"), Command::Theme(Some(Theme::Light)));
    }

    #[test]
    fn test_settings_values() {
        assert_eq!(parse("/temperature 0.3"), Command::Temperature(0.3));
        assert_eq!(parse("/tokens 2000"), Command::Tokens(2000));
        assert_eq!(parse("/model claude-2.1"), Command::Model(ModelId::Claude21));
        assert!(matches!(parse("/model gpt"), Command::Invalid(_)));
        assert!(matches!(parse("/tokens many"), Command::Invalid(_)));
    }

    #[test]
    fn test_search_keeps_inner_spaces() {
        assert_eq!(
            parse("/search  rust  traits "),
            Command::Search("rust  traits".to_string())
        );
    }

    #[test]
    fn test_unknown_and_missing_arguments() {
        assert!(matches!(parse("/select"), Command::Invalid(_)));
        assert!(matches!(parse("/prompts 0"), Command::Invalid(_)));
        assert!(matches!(parse("/frobnicate"), Command::Invalid(_)));
    }
}
