//! Terminal output: colored notes and small aligned tables.

// ANSI styles
pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Check if the terminal supports color output.
pub fn supports_color() -> bool {
    std::env::var("NO_COLOR").is_err()
        && (std::env::var("COLORTERM").is_ok()
            || std::env::var("TERM").map(|t| t != "dumb").unwrap_or(false))
}

/// Strip ANSI escape codes from a string.
pub fn strip_ansi(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
        } else {
            result.push(c);
        }
    }
    result
}

/// Visible width in characters. Lithuanian forms are multi-byte.
fn visible_width(s: &str) -> usize {
    strip_ansi(s).chars().count()
}

pub fn note_info(msg: &str) {
    if supports_color() {
        println!("{CYAN}{BOLD}i{RESET} {msg}");
    } else {
        println!("INFO: {msg}");
    }
}

pub fn note_warn(msg: &str) {
    if supports_color() {
        println!("{YELLOW}{BOLD}!{RESET} {msg}");
    } else {
        println!("WARN: {msg}");
    }
}

pub fn note_success(msg: &str) {
    if supports_color() {
        println!("{GREEN}{BOLD}✓{RESET} {msg}");
    } else {
        println!("OK: {msg}");
    }
}

/// Dim text when color is on.
pub fn dim(msg: &str) -> String {
    if supports_color() {
        format!("{DIM}{msg}{RESET}")
    } else {
        msg.to_string()
    }
}

/// Render label/value rows with the labels padded to a common width.
pub fn render_rows(rows: &[(&str, String)]) -> String {
    let width = rows.iter().map(|(l, _)| visible_width(l)).max().unwrap_or(0);
    let mut out = String::new();
    for (label, value) in rows {
        let pad = width.saturating_sub(visible_width(label));
        out.push_str(&format!("  {label}{}  {value}\n", " ".repeat(pad)));
    }
    out
}
