/// Largest file the Telegram Bot API lets a bot download (`getFile`).
pub const MAX_ATTACHMENT_BYTES: u64 = 20 * 1024 * 1024;

/// Number of entries `/list` returns when no limit is given.
pub const DEFAULT_LIST_LIMIT: usize = 10;

/// Telegram rejects messages longer than this many characters.
pub const TELEGRAM_MESSAGE_LIMIT: usize = 4096;

/// Content type used when neither the attachment nor the file extension tells us.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";
