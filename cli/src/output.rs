//! CLI output helpers for consistent formatting.

use colored::Colorize;

pub fn heading(text: &str) -> String {
    format!("{}", text.bright_cyan())
}

pub fn label(text: &str) -> String {
    format!("{}", text.bright_blue())
}

pub fn muted(text: &str) -> String {
    format!("{}", text.bright_black())
}

pub fn err_line(text: &str) -> String {
    format!("{} {}", "Error:".red().bold(), text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_survives_without_color() {
        colored::control::set_override(false);
        assert_eq!(heading("Queries"), "Queries");
        assert_eq!(label("application"), "application");
        assert_eq!(muted("(3)"), "(3)");
        assert_eq!(err_line("boom"), "Error: boom");
        colored::control::unset_override();
    }
}
