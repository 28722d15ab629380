//! Line-editor integration: tab completion backed by the shell session.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use drivesh_core::{DriveApi, Shell};
use rustyline::completion::{Completer, FilenameCompleter, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

/// Completes verbs and remote paths through the [`Shell`], and local paths
/// through the filesystem.
pub struct DriveHelper<D: DriveApi, W: Write> {
    shell: Rc<RefCell<Shell<D, W>>>,
    files: FilenameCompleter,
}

impl<D: DriveApi, W: Write> DriveHelper<D, W> {
    pub fn new(shell: Rc<RefCell<Shell<D, W>>>) -> Self {
        Self {
            shell,
            files: FilenameCompleter::new(),
        }
    }
}

impl<D: DriveApi, W: Write> Completer for DriveHelper<D, W> {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let completion = self.shell.borrow().complete(&line[..pos]);
        match completion {
            Ok(Some((start, candidates))) => Ok((
                start,
                candidates
                    .into_iter()
                    .map(|c| Pair {
                        display: c.clone(),
                        replacement: c,
                    })
                    .collect(),
            )),
            Ok(None) => self.files.complete(line, pos, ctx),
            Err(e) => {
                tracing::warn!(error = %e, "completion failed");
                Ok((pos, Vec::new()))
            }
        }
    }
}

impl<D: DriveApi, W: Write> Hinter for DriveHelper<D, W> {
    type Hint = String;
}

impl<D: DriveApi, W: Write> Highlighter for DriveHelper<D, W> {}

impl<D: DriveApi, W: Write> Validator for DriveHelper<D, W> {}

impl<D: DriveApi, W: Write> Helper for DriveHelper<D, W> {}
