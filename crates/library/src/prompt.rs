//! Questions the library asks before destructive or ambiguous actions.

use pwassets_core::Identifier;
use std::collections::VecDeque;
use std::fmt;
use std::path::{Path, PathBuf};

/// A yes/no/cancel question.
#[derive(Debug, Clone, Copy)]
pub enum PromptRequest<'a> {
    /// Delete this asset?
    ConfirmDelete {
        /// Asset about to be deleted.
        identifier: &'a Identifier,
    },
    /// Several files would be orphaned. Yes deletes all of them, No keeps
    /// everything but the asset's JSON file.
    DeleteUnusedFiles {
        /// Files that no other asset references.
        files: &'a [PathBuf],
    },
    /// The identifier changed. Yes rewrites every reference to it.
    ConfirmRefactor {
        /// Old identifier.
        from: &'a Identifier,
        /// New identifier.
        to: &'a Identifier,
    },
    /// A resource lives outside the asset's folder. Yes copies it in.
    CopyIntoAssetFolder {
        /// File picked by the user.
        source: &'a Path,
        /// Where the copy would go.
        destination: &'a Path,
    },
    /// The copy destination already exists. Yes overwrites it.
    OverwriteFile {
        /// Existing file.
        path: &'a Path,
    },
}

impl fmt::Display for PromptRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptRequest::ConfirmDelete { identifier } => {
                write!(f, "Delete asset {identifier}? This cannot be undone.")
            }
            PromptRequest::DeleteUnusedFiles { files } => {
                writeln!(f, "These files are not used by any other asset:")?;
                for file in files.iter() {
                    writeln!(f, "  {}", file.display())?;
                }
                write!(f, "Delete all of them? (no = delete only the asset's JSON file)")
            }
            PromptRequest::ConfirmRefactor { from, to } => write!(
                f,
                "Identifier changed from {from} to {to}. Update every asset that references it?"
            ),
            PromptRequest::CopyIntoAssetFolder {
                source,
                destination,
            } => write!(
                f,
                "'{}' is outside the asset folder. Copy it to '{}'?",
                source.display(),
                destination.display()
            ),
            PromptRequest::OverwriteFile { path } => {
                write!(f, "'{}' already exists. Overwrite it?", path.display())
            }
        }
    }
}

/// Answer to a [`PromptRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptAnswer {
    /// Proceed.
    Yes,
    /// Take the conservative alternative.
    No,
    /// Abort the whole operation.
    Cancel,
}

/// Something that can answer questions, usually a person.
pub trait Prompt {
    /// Ask `request` and wait for the answer.
    fn ask(&mut self, request: &PromptRequest<'_>) -> PromptAnswer;
}

/// Answers every question the same way.
#[derive(Debug, Clone, Copy)]
pub struct AutoAnswer(pub PromptAnswer);

impl Prompt for AutoAnswer {
    fn ask(&mut self, _request: &PromptRequest<'_>) -> PromptAnswer {
        self.0
    }
}

/// Replays a fixed list of answers and records every question asked.
///
/// Once the list runs out every further question is answered with
/// [`PromptAnswer::Cancel`].
#[derive(Debug, Default, Clone)]
pub struct ScriptedPrompt {
    answers: VecDeque<PromptAnswer>,
    asked: Vec<String>,
}

impl ScriptedPrompt {
    /// Answer with `answers`, in order.
    pub fn new(answers: impl IntoIterator<Item = PromptAnswer>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            asked: Vec::new(),
        }
    }

    /// Rendered text of every question asked so far.
    pub fn asked(&self) -> &[String] {
        &self.asked
    }
}

impl Prompt for ScriptedPrompt {
    fn ask(&mut self, request: &PromptRequest<'_>) -> PromptAnswer {
        self.asked.push(request.to_string());
        self.answers.pop_front().unwrap_or(PromptAnswer::Cancel)
    }
}
