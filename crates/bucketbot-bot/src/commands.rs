//! Command parsing and the command menu.

use bucketbot_core::constants::DEFAULT_LIST_LIMIT;
use bucketbot_core::normalize_key;

use crate::telegram::types::BotCommand;

/// A recognized command with its parsed arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Delete(String),
    MakePublic(String),
    MakePrivate(String),
    Exist(String),
    CopyFile { src: String, dest: String },
    GetFileAcl(String),
    List { prefix: String, limit: usize },
    GetMeta(String),
    PurgeCache(String),
    BadCommand,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Help => "help",
            Command::Delete(_) => "delete",
            Command::MakePublic(_) => "make_public",
            Command::MakePrivate(_) => "make_private",
            Command::Exist(_) => "exist",
            Command::CopyFile { .. } => "copy_file",
            Command::GetFileAcl(_) => "get_file_acl",
            Command::List { .. } => "list",
            Command::GetMeta(_) => "get_meta",
            Command::PurgeCache(_) => "purge_cache",
            Command::BadCommand => "bad_command",
        }
    }

    /// Commands anyone may run. Everything else is restricted to the authorized user.
    pub fn is_public(&self) -> bool {
        matches!(self, Command::Start | Command::Help)
    }
}

/// Classification of an inbound text message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedText {
    Command(Command),
    /// A known command whose arguments are missing or malformed
    Invalid { command: String, reason: String },
    /// A slash command the bot does not know
    Unknown(String),
    /// Anything that is not a command
    Text(String),
}

/// Parse a message text into a command.
///
/// A `@BotName` suffix on the command is ignored. Arguments are
/// whitespace-separated and keys are normalized.
pub fn parse_text(text: &str) -> ParsedText {
    let trimmed = text.trim();
    let Some(body) = trimmed.strip_prefix('/') else {
        return ParsedText::Text(text.to_string());
    };

    let mut parts = body.split_whitespace();
    let head = parts.next().unwrap_or("");
    let name = head.split('@').next().unwrap_or(head).to_lowercase();
    let args: Vec<&str> = parts.collect();

    let key_arg = |index: usize| -> Result<String, String> {
        args.get(index)
            .map(|arg| normalize_key(arg))
            .filter(|key| !key.is_empty())
            .ok_or_else(|| format!("missing argument {}", index + 1))
    };

    let parsed = match name.as_str() {
        "start" => Ok(Command::Start),
        "help" => Ok(Command::Help),
        "bad_command" => Ok(Command::BadCommand),
        "delete" => key_arg(0).map(Command::Delete),
        "make_public" => key_arg(0).map(Command::MakePublic),
        "make_private" => key_arg(0).map(Command::MakePrivate),
        "exist" => key_arg(0).map(Command::Exist),
        "get_file_acl" => key_arg(0).map(Command::GetFileAcl),
        "get_meta" => key_arg(0).map(Command::GetMeta),
        "purge_cache" => key_arg(0).map(Command::PurgeCache),
        "copy_file" => key_arg(0).and_then(|src| key_arg(1).map(|dest| Command::CopyFile { src, dest })),
        "list" => parse_list(&args),
        _ => return ParsedText::Unknown(name),
    };

    match parsed {
        Ok(command) => ParsedText::Command(command),
        Err(reason) => ParsedText::Invalid {
            command: name,
            reason,
        },
    }
}

fn parse_list(args: &[&str]) -> Result<Command, String> {
    let prefix = args
        .first()
        .map(|arg| normalize_key(arg))
        .ok_or_else(|| "missing prefix".to_string())?;
    let limit = match args.get(1) {
        Some(raw) => raw
            .parse::<usize>()
            .map_err(|_| format!("invalid limit '{}'", raw))?,
        None => DEFAULT_LIST_LIMIT,
    };
    Ok(Command::List { prefix, limit })
}

/// Entries of the bot's command menu, in display order.
pub const MENU: &[(&str, &str)] = &[
    ("start", "Start the bot"),
    ("help", "Show help message"),
    ("exist", "Check if file exists"),
    ("delete", "Delete a file from S3"),
    ("make_public", "Make file publicly accessible"),
    ("make_private", "Make file private"),
    ("copy_file", "Copy file: /copy_file src dest"),
    ("list", "List objects: /list PREFIX [LIMIT]"),
    ("get_file_acl", "Get file ACL status"),
    ("get_meta", "Get object metadata"),
    ("purge_cache", "Purge CDN cache (DigitalOcean)"),
];

pub fn menu() -> Vec<BotCommand> {
    MENU.iter()
        .map(|(command, description)| BotCommand {
            command: command.to_string(),
            description: description.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_key_commands() {
        assert_eq!(
            parse_text("/delete /docs/a.txt"),
            ParsedText::Command(Command::Delete("docs/a.txt".into()))
        );
        assert_eq!(
            parse_text("/exist  photo.jpg "),
            ParsedText::Command(Command::Exist("photo.jpg".into()))
        );
    }

    #[test]
    fn strips_bot_name_suffix() {
        assert_eq!(
            parse_text("/delete@my_bot key"),
            ParsedText::Command(Command::Delete("key".into()))
        );
        assert_eq!(parse_text("/start@my_bot"), ParsedText::Command(Command::Start));
    }

    #[test]
    fn missing_arguments_are_invalid() {
        assert!(matches!(parse_text("/delete"), ParsedText::Invalid { .. }));
        assert!(matches!(parse_text("/copy_file a.txt"), ParsedText::Invalid { .. }));
        assert!(matches!(parse_text("/list"), ParsedText::Invalid { .. }));
    }

    #[test]
    fn copy_takes_two_keys() {
        assert_eq!(
            parse_text("/copy_file /a.txt backup/a.txt"),
            ParsedText::Command(Command::CopyFile {
                src: "a.txt".into(),
                dest: "backup/a.txt".into()
            })
        );
    }

    #[test]
    fn list_limit_defaults_and_parses() {
        assert_eq!(
            parse_text("/list logs/"),
            ParsedText::Command(Command::List {
                prefix: "logs/".into(),
                limit: 10
            })
        );
        assert_eq!(
            parse_text("/list logs/ 3"),
            ParsedText::Command(Command::List {
                prefix: "logs/".into(),
                limit: 3
            })
        );
        assert!(matches!(parse_text("/list logs/ many"), ParsedText::Invalid { .. }));
    }

    #[test]
    fn unknown_and_plain_text() {
        assert_eq!(parse_text("/frobnicate x"), ParsedText::Unknown("frobnicate".into()));
        assert_eq!(parse_text("hello there"), ParsedText::Text("hello there".into()));
    }

    #[test]
    fn menu_lists_every_command_but_debug_ones() {
        let names: Vec<String> = menu().into_iter().map(|c| c.command).collect();
        assert_eq!(names.len(), 11);
        assert!(names.contains(&"purge_cache".to_string()));
        assert!(!names.contains(&"bad_command".to_string()));
    }
}
