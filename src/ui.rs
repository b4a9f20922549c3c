use colored::Colorize;

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a section header
pub fn section(title: &str) {
    println!();
    println!("{}", title.cyan().bold());
}

/// Print a key-value pair, values aligned after the widest key
pub fn kv(key: &str, value: &str) {
    let key = format!("{:<width$}", format!("{key}:"), width = KEY_WIDTH);
    println!("  {} {}", key.dimmed(), value);
}

/// Print a step indicator
pub fn step(num: usize, total: usize, msg: &str) {
    println!("{} {}", format!("[{num}/{total}]").blue().bold(), msg);
}

const KEY_WIDTH: usize = 26;

/// Join a list for display, or a dimmed placeholder when it is empty
pub fn format_list(items: &[String]) -> String {
    if items.is_empty() {
        "(none)".dimmed().to_string()
    } else {
        items.join(", ")
    }
}

/// Format a bool as yes/no
pub fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_list() {
        colored::control::set_override(false);
        assert_eq!(format_list(&[]), "(none)");
        assert_eq!(
            format_list(&["roles/editor".to_string(), "roles/viewer".to_string()]),
            "roles/editor, roles/viewer"
        );
    }

    #[test]
    fn test_yes_no() {
        assert_eq!(yes_no(true), "yes");
        assert_eq!(yes_no(false), "no");
    }
}
