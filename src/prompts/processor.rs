/*!
 * Prompt processor: resolves style-block and character-reference
 * placeholders in every prompt of a project.
 *
 * Style blocks are resolved before references. Placeholders that do not
 * match anything stay in the text verbatim so incomplete style data is
 * visible in the output instead of failing the whole document.
 */

use log::debug;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::project::{FrameSlot, ProjectDocument};
use crate::prompts::{CharacterReferenceTable, StyleBlockTable};

/// `[Some Block]`
static STYLE_BLOCK_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[([^\[\]]+)\]").expect("style block pattern is valid")
});

/// `([Ref: Name])`
static REFERENCE_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\(\[Ref:\s*([^\]]+)\]\)").expect("reference pattern is valid")
});

/// Counts gathered while processing prompts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessingSummary {
    /// Non-empty prompts that went through both passes
    pub prompts_processed: usize,
    pub style_blocks_resolved: usize,
    pub references_resolved: usize,
    /// Bracketed tokens left in place because no style block matched
    pub unresolved_style_blocks: usize,
    /// Reference directives left in place because no character matched
    pub unresolved_references: usize,
}

impl ProcessingSummary {
    pub fn has_unresolved(&self) -> bool {
        self.unresolved_style_blocks > 0 || self.unresolved_references > 0
    }
}

/// Rewrites prompt text using the style blocks and character references of one project
#[derive(Debug, Clone, Default)]
pub struct PromptProcessor {
    style_blocks: StyleBlockTable,
    references: CharacterReferenceTable,
}

impl PromptProcessor {
    pub fn new(style_blocks: StyleBlockTable, references: CharacterReferenceTable) -> Self {
        Self {
            style_blocks,
            references,
        }
    }

    /// Build both tables from the document's own style and reference data.
    pub fn from_document(document: &ProjectDocument) -> Self {
        Self::new(
            StyleBlockTable::from_core_style(&document.core_style),
            CharacterReferenceTable::from_map(&document.character_references),
        )
    }

    pub fn style_blocks(&self) -> &StyleBlockTable {
        &self.style_blocks
    }

    pub fn references(&self) -> &CharacterReferenceTable {
        &self.references
    }

    /// Resolve all placeholders in a single prompt.
    pub fn process_prompt(&self, prompt: &str) -> String {
        self.process_counted(prompt, &mut ProcessingSummary::default())
    }

    /// Replace `[Block Name]` tokens with flattened style blocks.
    pub fn replace_style_blocks(&self, prompt: &str) -> String {
        self.replace_style_blocks_counted(prompt, &mut ProcessingSummary::default())
    }

    /// Replace `([Ref: Name])` directives with character descriptions.
    pub fn replace_references(&self, prompt: &str) -> String {
        self.replace_references_counted(prompt, &mut ProcessingSummary::default())
    }

    /// Rewrite every image and video prompt of the document in place.
    pub fn process_document(&self, document: &mut ProjectDocument) -> ProcessingSummary {
        let mut summary = ProcessingSummary::default();

        for scene in &mut document.scenes {
            for shot in &mut scene.shots {
                for slot in FrameSlot::ALL {
                    let prompt = shot.image_prompts.get_mut(slot);
                    *prompt = self.process_counted(prompt, &mut summary);
                }

                if let Some(video_prompt) = shot.video_prompt.as_mut() {
                    *video_prompt = self.process_counted(video_prompt, &mut summary);
                }
            }
        }

        debug!(
            "Processed {} prompt(s) for '{}': {} style block(s), {} reference(s) resolved",
            summary.prompts_processed,
            document.project_name,
            summary.style_blocks_resolved,
            summary.references_resolved
        );

        summary
    }

    fn process_counted(&self, prompt: &str, summary: &mut ProcessingSummary) -> String {
        if prompt.is_empty() {
            return String::new();
        }

        summary.prompts_processed += 1;
        let with_styles = self.replace_style_blocks_counted(prompt, summary);
        self.replace_references_counted(&with_styles, summary)
    }

    fn replace_style_blocks_counted(&self, prompt: &str, summary: &mut ProcessingSummary) -> String {
        STYLE_BLOCK_TOKEN
            .replace_all(prompt, |caps: &Captures| {
                let key = &caps[1];
                match self.style_blocks.get(key) {
                    Some(flattened) => {
                        summary.style_blocks_resolved += 1;
                        flattened.to_string()
                    }
                    None => {
                        // the inner part of a reference directive is not a style block
                        if !key.starts_with("Ref:") {
                            debug!("No style block for placeholder [{}]", key);
                            summary.unresolved_style_blocks += 1;
                        }
                        caps[0].to_string()
                    }
                }
            })
            .into_owned()
    }

    fn replace_references_counted(&self, prompt: &str, summary: &mut ProcessingSummary) -> String {
        REFERENCE_TOKEN
            .replace_all(prompt, |caps: &Captures| {
                match self.references.resolve(&caps[1]) {
                    Some(text) => {
                        summary.references_resolved += 1;
                        text.to_string()
                    }
                    None => {
                        debug!("No character reference for '{}'", caps[1].trim());
                        summary.unresolved_references += 1;
                        caps[0].to_string()
                    }
                }
            })
            .into_owned()
    }
}

/// Build a processor from the document and resolve all of its prompts in place.
pub fn process_all_prompts(document: &mut ProjectDocument) -> ProcessingSummary {
    PromptProcessor::from_document(document).process_document(document)
}
