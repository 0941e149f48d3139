//! Prompt builders for the generation and review calls
//!
//! Pure functions assembling the exact user-prompt text sent to the model.
//! The generation prompt pins the structured-output contract (a single JSON
//! object with `files`, `preview`, and `debug`) that [`crate::contract`]
//! later enforces on the completion.

use crate::manifest::ProjectManifest;

/// Build the user prompt for the project generation call.
pub fn build_generation_prompt(instruction: &str) -> String {
    format!(
        "Generate a complete coding project based on the following instruction: {instruction}\n\n\
         The project should include all necessary files (HTML, CSS, JavaScript, backend code, etc.) \
         and determine the appropriate programming languages and frameworks. Your output must be a \
         valid JSON object with exactly three keys: 'files', 'preview', and 'debug'.\n\n\
         • 'files': an object mapping file paths (e.g., 'index.html', 'app.js', 'styles.css', \
         'server.py') to their code content.\n\
         • 'preview': an HTML snippet that, when rendered, shows a preview of the website or \
         application (if applicable).\n\
         • 'debug': a detailed debugging analysis and suggestions for the generated project.\n\n\
         Do not include any extra text outside of the JSON object."
    )
}

/// Build the user prompt for the review call over a parsed manifest.
///
/// The manifest is embedded as pretty-printed JSON so the reviewer sees the
/// same path → content mapping that was materialized.
pub fn build_review_prompt(manifest: &ProjectManifest) -> String {
    let files_json = serde_json::to_string_pretty(manifest.files()).unwrap_or_default();

    format!(
        "Review the following generated project files and provide a detailed debugging analysis \
         with suggestions for improvements:\n\n{files_json}\n\nReturn only the debugging analysis text."
    )
}
