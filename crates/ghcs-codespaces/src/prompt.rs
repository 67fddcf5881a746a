use ghcs_utils::error::PromptError;

/// Interactive questions asked during the codespace and issue flows.
///
/// `field` names the flag that would have supplied the answer, so a
/// non-interactive implementation can say which one is missing.
pub trait Prompter: Send + Sync {
    /// Whether questions can be asked at all.
    fn is_interactive(&self) -> bool {
        true
    }

    /// Free-text answer; must be non-empty.
    fn input(&self, message: &str, field: &str) -> Result<String, PromptError>;

    /// Free-text answer where a blank line keeps `default`.
    fn input_with_default(
        &self,
        message: &str,
        field: &str,
        default: &str,
    ) -> Result<String, PromptError>;

    /// Index into `options`.
    fn select(&self, message: &str, options: &[String], default: usize)
    -> Result<usize, PromptError>;

    /// Indexes into `options`, in option order; a blank answer keeps `defaults`.
    fn multi_select(
        &self,
        message: &str,
        options: &[String],
        defaults: &[usize],
    ) -> Result<Vec<usize>, PromptError>;
}

/// Use `given` when present, otherwise ask.
pub(crate) fn value_or_prompt(
    given: Option<&str>,
    prompter: &dyn Prompter,
    message: &str,
    field: &str,
) -> Result<String, PromptError> {
    match given {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => {
            let answer = prompter.input(message, field)?;
            if answer.trim().is_empty() {
                return Err(PromptError::EmptyAnswer {
                    field: field.to_string(),
                });
            }
            Ok(answer.trim().to_string())
        }
    }
}
