// src/utils/report.rs

//! Run report formatting on top of the `log` facade.
//!
//! Plain messages use `log::info!` and friends directly; these helpers
//! only add the framing used for headers, steps and summaries.

/// Log a header
pub fn header(title: &str) {
    let border = "═".repeat(60);
    log::info!("{}", border);
    log::info!("  {}", title);
    log::info!("{}", border);
}

/// Log a step in a process
pub fn step(step_num: usize, total: usize, message: &str) {
    log::info!("[STEP {}/{}] {}", step_num, total, message);
}

/// Log a sub-item (indented)
pub fn sub_item(message: &str) {
    log::info!("    {}", message);
}

/// Log a summary section
pub fn summary(title: &str, items: &[(&str, String)]) {
    log::info!("[SUMMARY] {}", title);
    for (key, value) in items {
        log::info!("    {}: {}", key, value);
    }
}

/// Render a progress counter such as `[ 3/40]`.
pub fn progress_label(current: usize, total: Option<usize>) -> String {
    match total {
        Some(total) => {
            let width = total.to_string().len();
            format!("[{current:>width$}/{total}]")
        }
        None => format!("[{current}]"),
    }
}
