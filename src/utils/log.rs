// src/utils/log.rs

//! Console section formatting on top of the `log` facade.
//!
//! Run banners, step markers and summaries are formatted here and emitted at
//! `info` level, so they share timestamps and filtering with every other
//! log line.

const RULE_WIDTH: usize = 60;

/// Log a header
pub fn header(title: &str) {
    for line in format_header(title) {
        log::info!("{}", line);
    }
}

/// Log a step in a process
pub fn step(step_num: usize, total: usize, message: &str) {
    log::info!("{}", format_step(step_num, total, message));
}

/// Log a sub-item (indented)
pub fn sub_item(message: &str) {
    log::info!("    {}", message);
}

/// Log a summary section
pub fn summary(title: &str, items: &[(&str, String)]) {
    for line in format_summary(title, items) {
        log::info!("{}", line);
    }
}

fn format_header(title: &str) -> Vec<String> {
    let border = "═".repeat(RULE_WIDTH);
    vec![border.clone(), format!("  {}", title), border]
}

fn format_step(step_num: usize, total: usize, message: &str) -> String {
    format!("[STEP {}/{}] {}", step_num, total, message)
}

fn format_summary(title: &str, items: &[(&str, String)]) -> Vec<String> {
    let width = items.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut lines = vec![format!("[SUMMARY] {}", title)];
    lines.extend(
        items
            .iter()
            .map(|(key, value)| format!("    {:<width$} : {}", key, value)),
    );
    lines
}
