//! User-facing reply copy.
//!
//! Single source of truth for the bot's wording, so handlers and tests never
//! drift apart. Strings use Telegram's legacy Markdown (`*bold*`, `_italic_`).

/// Bot brand name, used in the welcome footer.
pub const BRAND: &str = "FileSort Bot";

/// Welcome message body for `/start`.
pub const START_BODY: &str = "I organize your uploads and forward them back in clean, alphabetical order.\n\n\
How it works:\n\
1) Send /first to start a capture session.\n\
2) Upload all your files (photos, docs, videos, etc.).\n\
3) Send /last and I\u{2019}ll sort & forward them by *file name*.\n\n\
Need help? Use /help";

/// Quick guide for `/help`.
pub const HELP: &str = "*Quick Guide*\n\
\u{2022} /first \u{2014} start capture mode\n\
\u{2022} Send files \u{2014} I\u{2019}ll quietly collect them\n\
\u{2022} /last \u{2014} stop, sort (A\u{2192}Z), and forward\n\
\u{2022} /cancel \u{2014} abort current session\n\n\
*Notes*\n\
\u{2022} Sorting uses natural A\u{2192}Z (so 2 < 10)\n\
\u{2022} If a file has no name (e.g., photos), I assign a sensible one\n\
\u{2022} Works in DMs and groups (I track per user)";

/// Reply to `/first` when a fresh session was opened.
pub const FIRST_STARTED: &str = "Capture started. \u{1F534}\n\n\
Now send *all files* you want me to arrange. When you\u{2019}re done, send /last.\n\
_Tip: you can keep adding files in multiple messages._";

/// Reply to `/first` while a session is already collecting.
pub const ALREADY_CAPTURING: &str = "You already have an active capture session.\n\
Send more files, or finish with /last. To abort, use /cancel.";

/// Reply to `/last` or `/cancel` with nothing in progress.
pub const NOT_CAPTURING: &str = "No active session found.\nStart a new one with /first.";

/// Reply to `/last` when the session captured nothing.
pub const LAST_NONE: &str = "I didn\u{2019}t receive any files in this session.\n\
Start again with /first and upload your files.";

/// Reply to `/cancel` with an active session.
pub const CANCEL_OK: &str = "Session cancelled. Nothing was forwarded.";

/// Generic failure reply.
pub const ERROR_GENERIC: &str = "Something went wrong while processing that. Please try again.";

/// Help footer call-to-action.
pub const FOOTER_CTA: &str = "Need a refresher? Try /help";

/// Compose the full `/start` welcome message.
#[must_use]
pub fn welcome() -> String {
    format!("\u{1F5C2}\u{FE0F} *Welcome to FileSort Bot*\n\n{START_BODY}\n\n\u{2014} _{BRAND}_")
}

/// Compose the `/help` message with its footer.
#[must_use]
pub fn help_with_footer() -> String {
    format!("{HELP}\n\n_{FOOTER_CTA}_")
}

/// Confirmation for a captured file with a usable name.
#[must_use]
pub fn file_received(name: &str) -> String {
    format!("Got it: *{name}*")
}

/// Confirmation for a captured file that got the fallback name.
#[must_use]
pub fn file_received_noname(name: &str) -> String {
    format!("Got it (no name, assigned): *{name}*")
}

/// Progress message sent when a flush begins.
#[must_use]
pub fn last_processing(count: usize) -> String {
    format!(
        "Wrapping up your session\u{2026}\n\
         \u{2022} Total files captured: *{count}*\n\
         \u{2022} Sorting by name (A\u{2192}Z)\u{2026}\n\
         \u{2022} Forwarding in order\u{2026}"
    )
}

/// Completion message sent after the flush loop.
#[must_use]
pub fn last_done(count: usize) -> String {
    format!(
        "All set! \u{2705}\n\
         I forwarded *{count}* files in sorted order.\n\n\
         Start another round with /first whenever you like."
    )
}

/// Access-denied reply when no contact handle is configured.
pub const DENIED: &str = "\u{26D4} *Access Denied!*\nYou are not authorized to use this bot.";

/// Access-denied reply for users outside the allow-list.
#[must_use]
pub fn denied(contact_handle: &str) -> String {
    format!("{DENIED}\n\n\u{2709}\u{FE0F} Contact @{contact_handle} for access!")
}

/// Reply to `/whoami`.
#[must_use]
pub fn whoami(user_id: i64) -> String {
    format!("*Your Telegram user ID:* `{user_id}`")
}
