use serde::Deserialize;
use validator::Validate;

use crate::domain::quality_check::NewQualityCheck;
use crate::forms::{
    FormResult, empty_string_as_none, optional_multiline, optional_text, sanitize_inline_text,
};

/// Form payload for recording a quality check.
///
/// Any checkpoint text is accepted, blank included, and the same checkpoint
/// may be recorded any number of times. The text is only sanitized.
#[derive(Debug, Deserialize, Validate)]
pub struct QualityCheckForm {
    #[validate(range(min = 1, message = "work order is required"))]
    pub work_order_id: i32,
    #[serde(default)]
    pub checkpoint: String,
    /// Unchecked HTML checkboxes are not submitted at all.
    #[serde(default)]
    pub passed: bool,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[validate(url)]
    pub image_url: Option<String>,
}

impl QualityCheckForm {
    pub fn into_new_quality_check(self) -> FormResult<NewQualityCheck> {
        self.validate()?;

        let checkpoint = sanitize_inline_text(&self.checkpoint);
        let mut check = NewQualityCheck::new(self.work_order_id, checkpoint, self.passed);

        if let Some(notes) = optional_multiline(self.notes.as_deref()) {
            check = check.with_notes(notes);
        }
        if let Some(image_url) = optional_text(self.image_url.as_deref()) {
            check = check.with_image_url(image_url);
        }

        Ok(check)
    }
}
