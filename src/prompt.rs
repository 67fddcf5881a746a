//! Line-based terminal prompts.
//!
//! Questions go to stderr so stdout stays clean for command output. When
//! stdin is not a terminal every question fails with
//! [`PromptError::NotInteractive`], naming the flag that would have answered it.

use std::io::{BufRead, BufReader, IsTerminal, Write};
use std::sync::Mutex;

use ghcs_codespaces::Prompter;
use ghcs_utils::error::PromptError;

struct PromptIo {
    input: Box<dyn BufRead + Send>,
    output: Box<dyn Write + Send>,
}

pub struct LinePrompter {
    io: Mutex<PromptIo>,
    interactive: bool,
}

impl LinePrompter {
    /// Prompter over the process's stdin and stderr.
    #[must_use]
    pub fn stdin() -> Self {
        let interactive = std::io::stdin().is_terminal();
        Self::with_io(
            Box::new(BufReader::new(std::io::stdin())),
            Box::new(std::io::stderr()),
            interactive,
        )
    }

    #[must_use]
    pub fn with_io(
        input: Box<dyn BufRead + Send>,
        output: Box<dyn Write + Send>,
        interactive: bool,
    ) -> Self {
        Self {
            io: Mutex::new(PromptIo { input, output }),
            interactive,
        }
    }

    fn ask(&self, question: &str, field: &str) -> Result<Option<String>, PromptError> {
        if !self.interactive {
            return Err(PromptError::NotInteractive {
                field: field.to_string(),
            });
        }

        let mut io = self
            .io
            .lock()
            .map_err(|_| PromptError::Io("prompt state poisoned".to_string()))?;
        io.output.write_all(question.as_bytes()).map_err(io_error)?;
        io.output.flush().map_err(io_error)?;

        let mut line = String::new();
        let read = io.input.read_line(&mut line).map_err(io_error)?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

fn io_error(err: std::io::Error) -> PromptError {
    PromptError::Io(err.to_string())
}

impl Prompter for LinePrompter {
    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn input(&self, message: &str, field: &str) -> Result<String, PromptError> {
        self.ask(&format!("? {message}: "), field)?
            .ok_or_else(|| PromptError::EmptyAnswer {
                field: field.to_string(),
            })
    }

    fn input_with_default(
        &self,
        message: &str,
        field: &str,
        default: &str,
    ) -> Result<String, PromptError> {
        let question = if default.is_empty() {
            format!("? {message}: ")
        } else {
            format!("? {message} [{}]: ", preview(default))
        };
        Ok(self
            .ask(&question, field)?
            .filter(|answer| !answer.is_empty())
            .unwrap_or_else(|| default.to_string()))
    }

    fn multi_select(
        &self,
        message: &str,
        options: &[String],
        defaults: &[usize],
    ) -> Result<Vec<usize>, PromptError> {
        if options.is_empty() {
            return Ok(Vec::new());
        }

        let mut question = format!("? {message}\n");
        for (i, option) in options.iter().enumerate() {
            let mark = if defaults.contains(&i) { 'x' } else { ' ' };
            question.push_str(&format!("  [{mark}] {}) {option}\n", i + 1));
        }
        question.push_str("Enter numbers separated by commas, - for none, blank to keep: ");

        let answer = self.ask(&question, message)?.unwrap_or_default();
        parse_choices(&answer, options, defaults)
    }

    fn select(
        &self,
        message: &str,
        options: &[String],
        default: usize,
    ) -> Result<usize, PromptError> {
        if options.is_empty() {
            return Err(PromptError::InvalidSelection(format!(
                "{message} has no options"
            )));
        }
        let default = default.min(options.len() - 1);

        let mut question = format!("? {message}\n");
        for (i, option) in options.iter().enumerate() {
            let marker = if i == default { " (default)" } else { "" };
            question.push_str(&format!("  {}) {option}{marker}\n", i + 1));
        }
        question.push_str(&format!("Enter a number [{}]: ", default + 1));

        let answer = self.ask(&question, message)?.unwrap_or_default();
        parse_choice(&answer, options, default)
    }
}

/// Blank picks the default; otherwise a 1-based number or an option's exact text.
fn parse_choice(answer: &str, options: &[String], default: usize) -> Result<usize, PromptError> {
    if answer.is_empty() {
        return Ok(default);
    }
    if let Ok(n) = answer.parse::<usize>()
        && (1..=options.len()).contains(&n)
    {
        return Ok(n - 1);
    }
    options
        .iter()
        .position(|option| option == answer)
        .ok_or_else(|| PromptError::InvalidSelection(answer.to_string()))
}

/// Blank keeps `defaults`, `-` picks nothing; otherwise comma-separated
/// choices as accepted by [`parse_choice`], returned in option order.
fn parse_choices(
    answer: &str,
    options: &[String],
    defaults: &[usize],
) -> Result<Vec<usize>, PromptError> {
    let mut chosen = match answer {
        "" => defaults.to_vec(),
        "-" => Vec::new(),
        _ => answer
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| parse_choice(part, options, 0))
            .collect::<Result<Vec<_>, _>>()?,
    };
    chosen.sort_unstable();
    chosen.dedup();
    Ok(chosen)
}

/// First line of `text`, cut to 30 characters.
fn preview(text: &str) -> String {
    let line = text.lines().next().unwrap_or_default();
    if line.chars().count() > 30 || text.contains('\n') {
        let cut: String = line.chars().take(30).collect();
        format!("{cut}...")
    } else {
        line.to_string()
    }
}
