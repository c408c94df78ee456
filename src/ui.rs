use colored::Colorize;
use std::path::Path;

/// Print a success message
pub fn success_message(message: &str) {
    println!("{} {}", "✅".green(), message.green());
}

/// Print a warning message
pub fn warning_message(message: &str) {
    println!("{} {}", "⚠️ ".yellow(), message.yellow());
}

/// Print a section header to separate logical sections of output
pub fn section_header(title: &str) {
    println!("\n{}", format!("==== {} ====", title).cyan().bold());
}

/// Print a simple informational message
pub fn info_message(message: &str) {
    println!("{} {}", "ℹ️ ".blue(), message.blue());
}

/// Print one numbered file of the run
pub fn file_entry(index: usize, server: &str, path: &Path) {
    println!(
        "  {}. {} {}",
        format!("{}", index).cyan(),
        path.display(),
        format!("({})", server).dimmed()
    );
}
