// Turns arbitrary rule names into safe relative paths

use once_cell::sync::Lazy;
use regex::Regex;

static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ &_=+:]").unwrap());
static ILLEGAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^[:alnum:]~\-./]").unwrap());
static DASHES: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").unwrap());

/// Lowercases `name`, strips traversal, joining characters become `-` and
/// anything outside `[a-z0-9~-./]` is dropped. May return `"."` or `"/"`.
///
/// Dropping characters can join dots into a new `..`, so the steps repeat
/// until the result no longer changes.
pub fn sanitize_path(name: &str) -> String {
    let mut current = name.to_string();
    loop {
        let next = sanitize_once(&current);
        if next == current {
            return next;
        }
        current = next;
    }
}

fn sanitize_once(name: &str) -> String {
    let lowered = name.to_lowercase().replace("..", "");
    let cleaned = clean_path(&lowered);
    let trimmed = cleaned.trim_matches(' ');
    let dashed = SEPARATORS.replace_all(trimmed, "-");
    let legal = ILLEGAL.replace_all(&dashed, "");
    DASHES.replace_all(&legal, "-").into_owned()
}

/// Lexical path cleanup: repeated separators and `.` segments collapse.
fn clean_path(path: &str) -> String {
    let rooted = path.starts_with('/');
    let segments: Vec<&str> = path
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();
    let joined = segments.join("/");

    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{}", joined),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}
