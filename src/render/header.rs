//! Instructional header placed at the top of the artifact.

use chrono::{DateTime, Local};
use std::fmt::Write;

/// Render the header for `project_name`.
///
/// `include_patterns` are listed as given so a reader knows what was asked
/// for; an empty list reads as "None".
pub fn instructions(
    project_name: &str,
    include_patterns: &[String],
    generated_at: Option<DateTime<Local>>,
) -> String {
    let mut out = String::new();
    out.push_str("\n**Project Analysis Instructions**\n\n");

    let _ = writeln!(
        out,
        "Below is a summary of the project **{project_name}**, starting with the directory tree \
         structure to provide an overview. This is followed by the main file, if specified, which \
         serves as the primary runner for this tool. Use the main file to inform your \
         understanding of all subsequent files, as it orchestrates the execution flow and primary \
         logic of the project. Additional files are included for a comprehensive analysis.\n"
    );

    let patterns = if include_patterns.is_empty() {
        "None".to_string()
    } else {
        include_patterns.join(", ")
    };
    let _ = writeln!(out, "User-specified include patterns: {patterns}");
    if let Some(ts) = generated_at {
        let _ = writeln!(out, "Generated: {}", ts.format("%Y-%m-%d %H:%M:%S"));
    }
    out.push('\n');

    out.push_str(
        "Each file below starts with a `--- <path> ---` line giving its path relative to the \
         project root; the main file is marked `(Main File)`. Content may end early when the \
         character limit was reached.\n\n",
    );

    out.push_str("Please perform the following tasks:\n\n");
    out.push_str(
        "1. **Summarize the Tool/Code Purpose**: Provide a high-level summary of what this tool \
         or code is designed to do.\n",
    );
    out.push_str(
        "2. **Identify and Summarize Critical Functions and Dependencies**: Note any critical \
         functions, methods, or dependencies within the project. Summarize their roles and how \
         they interact with the main file.\n",
    );
    out.push_str(
        "3. **Contextual Analysis**: Use the main file to contextualize the functionality and \
         importance of the subsequent files.\n\n",
    );

    out.push_str("*Prompt Engineering Instructions*:\n");
    out.push_str(
        "- **Contextual Understanding**: Keep the main file in mind when analyzing the other files.\n",
    );
    out.push_str(
        "- **Focus on Dependencies**: Pay attention to how files depend on each other and shape the \
         execution flow.\n",
    );
    out.push_str(
        "- **Execution Flow**: Outline the execution flow starting from the main file.\n",
    );
    out.push_str(
        "- **Avoid Redundancy**: Do not reproduce the code verbatim; summarize structure and logic.\n",
    );
    out
}
