use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

// ---------------------------------------------------------------------------
// Policy and outcome
// ---------------------------------------------------------------------------

/// What to do when the output file already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverwritePolicy {
    /// Replace existing files silently.
    Clobber,
    /// Ask the user: overwrite, rename or cancel.
    Ask,
}

/// Where the content ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Written(PathBuf),
    /// The user declined to overwrite and did not pick a new name.
    Skipped,
}

// ---------------------------------------------------------------------------
// Prompt – the interactive side of `OverwritePolicy::Ask`
// ---------------------------------------------------------------------------

/// Source of answers to overwrite questions.
pub trait Prompt {
    /// Show `question` and return the trimmed answer.
    fn ask(&mut self, question: &str) -> io::Result<String>;
}

/// Prompts on stdout, reads answers from stdin.
#[derive(Debug, Default)]
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn ask(&mut self, question: &str) -> io::Result<String> {
        let mut stdout = io::stdout().lock();
        write!(stdout, "{question}")?;
        stdout.flush()?;

        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        Ok(answer.trim().to_string())
    }
}

// ---------------------------------------------------------------------------
// Saving
// ---------------------------------------------------------------------------

/// Write to `path` through `render`, applying the overwrite policy.
///
/// With [`OverwritePolicy::Ask`] an existing file is never touched without a
/// `y` answer; a renamed target keeps its extension and is checked
/// again.
pub fn save_to_file<F>(
    path: &Path,
    policy: OverwritePolicy,
    prompt: &mut dyn Prompt,
    mut render: F,
) -> Result<SaveOutcome>
where
    F: FnMut(&mut dyn Write) -> Result<()>,
{
    let mut target = path.to_path_buf();
    let mut policy = policy;

    loop {
        let file = match open_output(&target, policy) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                match resolve_conflict(&target, prompt)? {
                    Conflict::Overwrite => policy = OverwritePolicy::Clobber,
                    Conflict::Rename(new_target) => {
                        target = new_target;
                        policy = OverwritePolicy::Ask;
                    }
                    Conflict::Cancel => {
                        log::info!("{} not saved", target.display());
                        return Ok(SaveOutcome::Skipped);
                    }
                }
                continue;
            }
            Err(e) => {
                return Err(e).with_context(|| format!("creating {}", target.display()));
            }
        };

        let mut out = BufWriter::new(file);
        render(&mut out).with_context(|| format!("writing {}", target.display()))?;
        out.flush()
            .with_context(|| format!("flushing {}", target.display()))?;
        return Ok(SaveOutcome::Written(target));
    }
}

fn open_output(path: &Path, policy: OverwritePolicy) -> io::Result<File> {
    match policy {
        OverwritePolicy::Clobber => File::create(path),
        OverwritePolicy::Ask => OpenOptions::new().write(true).create_new(true).open(path),
    }
}

enum Conflict {
    Overwrite,
    Rename(PathBuf),
    Cancel,
}

fn resolve_conflict(target: &Path, prompt: &mut dyn Prompt) -> Result<Conflict> {
    let answer = prompt
        .ask(&format!(
            "{} already exists!\nDo you want to overwrite it? (y/N): ",
            target.display()
        ))
        .context("reading answer")?;
    if answer.eq_ignore_ascii_case("y") {
        return Ok(Conflict::Overwrite);
    }

    let answer = prompt.ask("Rename or cancel? (r/C): ").context("reading answer")?;
    if !answer.eq_ignore_ascii_case("r") {
        return Ok(Conflict::Cancel);
    }

    let ext = target
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let stem = prompt
        .ask(&format!("New filename ({ext}): "))
        .context("reading answer")?;
    if stem.is_empty() {
        return Ok(Conflict::Cancel);
    }
    Ok(Conflict::Rename(target.with_file_name(format!("{stem}{ext}"))))
}
