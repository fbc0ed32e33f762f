/*!
 * Placeholder substitution for shot prompts.
 *
 * Prompts reference project-wide data through two placeholder forms:
 * - `[Style Block Name]` is replaced by the flattened style block
 * - `([Ref: Character])` is replaced by the character's description
 *
 * Unknown placeholders are left in the text untouched.
 */

use serde_json::Value;

pub mod processor;
pub mod references;
pub mod style_blocks;

pub use processor::{process_all_prompts, ProcessingSummary, PromptProcessor};
pub use references::CharacterReferenceTable;
pub use style_blocks::StyleBlockTable;

/// Render a JSON value as prompt text: strings as-is, null as nothing,
/// everything else in its JSON form.
pub(crate) fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
