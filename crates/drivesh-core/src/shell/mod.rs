//! The interactive session: one [`Shell`] owns the working-directory stack
//! and maps each [`Command`] onto the resolver and transfer engine.
//!
//! Every command error is caught in [`Shell::execute`] and printed as a
//! single line; only `exit` and `logout` end the session.

pub mod args;
pub mod render;

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::auth::TokenStore;
use crate::config::settings::Config;
use crate::error::{CoreError, CoreResult};
use crate::event::{Command, Event};
use crate::nav::complete::{classify, complete_remote, complete_verb, CompletionKind};
use crate::nav::{Lookup, PathResolver, Target, WorkingDirectoryStack};
use crate::remote::{ChildQuery, DirectoryIndex, DriveApi, ROOT_ID};
use crate::transfer::{local_name, TransferEngine};

const HELP: &str = "\
commands:
  pwd                       print the current folder
  ls [-r] [path]            list a folder, or show a file
  cd [path]                 change folder; no path returns to the root
  get [-r] source [dest]    download a file, or a folder with -r
  put [-r] source [dest]    upload local paths matching a glob; dest
                            defaults to the current folder
  rm [-r] source            move an item to the trash
  shell <cmd>, !<cmd>       run a local command
  logout                    forget stored credentials and leave
  exit, quit                leave the shell";

/// Whether the read loop should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// A shell session over one drive, writing its output to `W`.
pub struct Shell<D: DriveApi, W: Write> {
    drive: D,
    cwd: WorkingDirectoryStack,
    config: Config,
    tokens: Option<TokenStore>,
    out: W,
}

impl<D: DriveApi, W: Write> Shell<D, W> {
    pub fn new(drive: D, config: Config, out: W) -> Self {
        Self {
            drive,
            cwd: WorkingDirectoryStack::new(),
            config,
            tokens: None,
            out,
        }
    }

    /// Attaches the credential store that `logout` clears.
    pub fn with_token_store(self, tokens: TokenStore) -> Self {
        Self {
            tokens: Some(tokens),
            ..self
        }
    }

    pub fn drive(&self) -> &D {
        &self.drive
    }

    pub fn cwd(&self) -> &WorkingDirectoryStack {
        &self.cwd
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn output_mut(&mut self) -> &mut W {
        &mut self.out
    }

    /// Prompt text: the current path followed by the configured suffix.
    pub fn prompt(&self) -> String {
        format!("{}{}", self.cwd.display_path(), self.config.ui.prompt)
    }

    /// Prints the signed-in account.
    pub fn greet(&mut self) -> CoreResult<()> {
        let account = self.drive.account()?;
        writeln!(self.out, "{} <{}>", account.display_name, account.email)?;
        Ok(())
    }

    /// Parses and runs one input line, printing any failure.
    pub fn execute(&mut self, line: &str) -> Flow {
        let result = args::parse_line(line).and_then(|command| match command {
            Some(command) => self.run(command),
            None => Ok(Flow::Continue),
        });
        let flow = match result {
            Ok(flow) => flow,
            Err(err) => {
                tracing::warn!(error = %err, line, "command failed");
                let _ = writeln!(self.out, "{err}");
                Flow::Continue
            }
        };
        let _ = self.out.flush();
        flow
    }

    /// Runs a parsed command.
    pub fn run(&mut self, command: Command) -> CoreResult<Flow> {
        tracing::debug!(?command, cwd = %self.cwd.display_path(), "running command");
        match command {
            Command::Pwd => writeln!(self.out, "{}", self.cwd.display_path())?,
            Command::Ls { path, recursive } => self.ls(&path, recursive)?,
            Command::Cd { path } => self.cd(path.as_deref())?,
            Command::Get {
                source,
                dest,
                recursive,
            } => self.get(&source, dest.as_deref(), recursive)?,
            Command::Put {
                source,
                dest,
                recursive,
            } => self.put(&source, dest.as_deref(), recursive)?,
            Command::Rm { source, recursive } => self.rm(&source, recursive)?,
            Command::Shell(line) => self.shell(&line)?,
            Command::Usage(usage) => writeln!(self.out, "{usage}")?,
            Command::Help => writeln!(self.out, "{HELP}")?,
            Command::Logout => {
                if let Some(tokens) = &self.tokens {
                    tokens.remove()?;
                    tracing::info!(path = %tokens.path().display(), "credentials removed");
                }
                return Ok(Flow::Exit);
            }
            Command::Exit => return Ok(Flow::Exit),
        }
        Ok(Flow::Continue)
    }

    /// Completion for the word ending at the end of `line`, as a byte
    /// offset into `line` plus replacement candidates.
    ///
    /// Returns `None` when the word is a local path, which the frontend
    /// completes on its own.
    pub fn complete(&self, line: &str) -> CoreResult<Option<(usize, Vec<String>)>> {
        let (kind, start, word) = classify(line);
        let (folders_only, syntax) = match kind {
            CompletionKind::Verb => return Ok(Some((start, complete_verb(word)))),
            CompletionKind::Local => return Ok(None),
            CompletionKind::Nothing => return Ok(Some((start, Vec::new()))),
            CompletionKind::RemoteFolder(syntax) => (true, syntax),
            CompletionKind::RemoteAny(syntax) => (false, syntax),
        };
        let (offset, candidates) =
            complete_remote(self.index(), &self.cwd, word, folders_only, syntax)?;
        Ok(Some((start + offset, candidates)))
    }

    fn index(&self) -> DirectoryIndex<'_, D> {
        DirectoryIndex::new(&self.drive, self.config.remote.page_size)
    }

    fn cd(&mut self, path: Option<&str>) -> CoreResult<()> {
        let Some(path) = path else {
            self.cwd = std::mem::take(&mut self.cwd).truncated(1);
            return Ok(());
        };
        let resolution = PathResolver::new(self.index()).resolve(&self.cwd, path, Lookup::Folder)?;
        self.cwd = resolution.stack.clone();
        resolution.into_target().map(|_| ())
    }

    fn ls(&mut self, path: &str, recursive: bool) -> CoreResult<()> {
        let index = DirectoryIndex::new(&self.drive, self.config.remote.page_size);
        let target = PathResolver::new(index)
            .resolve(&self.cwd, path, Lookup::Any)?
            .into_target()?;
        match target {
            Target::File(item) => writeln!(self.out, "{}", item.name)?,
            Target::Folder(entry) => {
                let listing = Listing {
                    recursive,
                    color: self.config.ui.color,
                    max_depth: self.config.transfer.max_depth,
                };
                listing.write(index, &mut self.out, &entry.id, 0)?;
            }
        }
        Ok(())
    }

    fn get(&mut self, source: &str, dest: Option<&str>, recursive: bool) -> CoreResult<()> {
        let index = DirectoryIndex::new(&self.drive, self.config.remote.page_size);
        let target = PathResolver::new(index)
            .resolve(&self.cwd, source, Lookup::Any)?
            .into_target()?;

        let local = match &target {
            Target::Folder(entry) => {
                let name = if entry.id == ROOT_ID {
                    self.config.transfer.root_dir_name.clone()
                } else {
                    local_name(&entry.name)
                };
                dest.map_or_else(|| PathBuf::from(&name), |d| Path::new(d).join(&name))
            }
            Target::File(item) => match dest {
                Some(d) if Path::new(d).is_dir() => Path::new(d).join(local_name(&item.name)),
                Some(d) => PathBuf::from(d),
                None => PathBuf::from(local_name(&item.name)),
            },
        };

        let out = &mut self.out;
        TransferEngine::new(index, &self.config.transfer).download(
            &target,
            &local,
            recursive,
            &mut |event| emit(out, &event),
        )
    }

    fn put(&mut self, source: &str, dest: Option<&str>, recursive: bool) -> CoreResult<()> {
        let index = DirectoryIndex::new(&self.drive, self.config.remote.page_size);
        let parent_id = match dest {
            Some(dest) => PathResolver::new(index)
                .resolve(&self.cwd, dest, Lookup::Folder)?
                .into_target()?
                .id()
                .to_string(),
            None => self.cwd.current().id.clone(),
        };

        let out = &mut self.out;
        TransferEngine::new(index, &self.config.transfer).upload(
            source,
            &parent_id,
            recursive,
            &mut |event| emit(out, &event),
        )?;
        Ok(())
    }

    fn rm(&mut self, source: &str, recursive: bool) -> CoreResult<()> {
        let index = DirectoryIndex::new(&self.drive, self.config.remote.page_size);
        let target = PathResolver::new(index)
            .resolve(&self.cwd, source, Lookup::Any)?
            .into_target()?;

        let out = &mut self.out;
        let trashed = TransferEngine::new(index, &self.config.transfer).trash(
            target.id(),
            recursive,
            &mut |event| emit(out, &event),
        )?;

        // Leave a trashed folder if the shell is inside it.
        if let Some(pos) = self.cwd.entries().iter().position(|e| e.id == trashed.id) {
            self.cwd = std::mem::take(&mut self.cwd).truncated(pos);
        }
        Ok(())
    }

    fn shell(&mut self, line: &str) -> CoreResult<()> {
        if line.is_empty() {
            return Ok(());
        }
        self.out.flush()?;
        let status = std::process::Command::new("sh")
            .arg("-c")
            .arg(line)
            .status()
            .map_err(CoreError::Io)?;
        tracing::debug!(command = line, %status, "local command finished");
        Ok(())
    }
}

fn emit<W: Write>(out: &mut W, event: &Event) {
    if let Some(line) = render::event_line(event) {
        let _ = writeln!(out, "{line}");
    }
}

/// Options for printing a folder's children.
struct Listing {
    recursive: bool,
    color: bool,
    max_depth: usize,
}

impl Listing {
    fn write<D: DriveApi + ?Sized, W: Write>(
        &self,
        index: DirectoryIndex<'_, D>,
        out: &mut W,
        folder_id: &str,
        depth: usize,
    ) -> CoreResult<()> {
        for child in index.children(folder_id, ChildQuery::all()) {
            let child = child?;
            writeln!(out, "{}{}", "  ".repeat(depth), render::item_name(&child, self.color))?;
            if self.recursive && child.is_folder() {
                if depth >= self.max_depth {
                    return Err(CoreError::DepthExceeded(self.max_depth, child.name));
                }
                self.write(index, out, &child.id, depth + 1)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::memory::MemoryDrive;
    use crate::remote::RemoteItem;
    use tempfile::TempDir;

    struct Fixture {
        a: RemoteItem,
        b: RemoteItem,
    }

    /// root
    /// ├── a/
    /// │   ├── b/
    /// │   │   └── deep.txt
    /// │   └── notes.txt
    /// ├── empty/
    /// └── top.txt
    fn shell() -> (Shell<MemoryDrive, Vec<u8>>, Fixture) {
        let drive = MemoryDrive::new();
        let a = drive.add_folder(ROOT_ID, "a");
        let b = drive.add_folder(&a.id, "b");
        drive.add_file(&b.id, "deep.txt", b"deep");
        drive.add_file(&a.id, "notes.txt", b"notes");
        drive.add_folder(ROOT_ID, "empty");
        drive.add_file(ROOT_ID, "top.txt", b"top");
        drive.reset_requests();

        let mut config = Config::default();
        config.ui.color = false;
        (Shell::new(drive, config, Vec::new()), Fixture { a, b })
    }

    fn output(shell: &mut Shell<MemoryDrive, Vec<u8>>) -> String {
        String::from_utf8(std::mem::take(shell.output_mut())).unwrap()
    }

    fn run(shell: &mut Shell<MemoryDrive, Vec<u8>>, line: &str) -> String {
        assert_eq!(shell.execute(line), Flow::Continue, "line {line}");
        output(shell)
    }

    #[test]
    fn pwd_starts_at_root() {
        let (mut sh, _) = shell();
        assert_eq!(run(&mut sh, "pwd"), "/\n");
        assert_eq!(sh.prompt(), "/> ");
    }

    #[test]
    fn cd_and_pwd() {
        let (mut sh, _) = shell();
        run(&mut sh, "cd a/b");
        assert_eq!(run(&mut sh, "pwd"), "/a/b/\n");
        run(&mut sh, "cd ..");
        assert_eq!(run(&mut sh, "pwd"), "/a/\n");
    }

    #[test]
    fn cd_without_argument_returns_to_root_offline() {
        let (mut sh, _) = shell();
        run(&mut sh, "cd a/b");
        sh.drive().reset_requests();

        run(&mut sh, "cd");
        assert!(sh.cwd().is_root());
        assert_eq!(sh.drive().list_calls(), 0);
    }

    #[test]
    fn failed_cd_keeps_resolved_prefix() {
        let (mut sh, fx) = shell();
        run(&mut sh, "cd a");
        assert_eq!(run(&mut sh, "cd x/y"), "folder x does not exist\n");
        assert_eq!(sh.cwd().len(), 2);
        assert_eq!(sh.cwd().current().id, fx.a.id);
    }

    #[test]
    fn ls_lists_folders_then_files() {
        let (mut sh, _) = shell();
        assert_eq!(run(&mut sh, "ls"), "a\nempty\ntop.txt\n");
        assert_eq!(run(&mut sh, "ls a"), "b\nnotes.txt\n");
    }

    #[test]
    fn ls_of_file_prints_its_name() {
        let (mut sh, _) = shell();
        assert_eq!(run(&mut sh, "ls a/notes.txt"), "notes.txt\n");
    }

    #[test]
    fn ls_recursive_indents_by_depth() {
        let (mut sh, _) = shell();
        assert_eq!(run(&mut sh, "ls -r a"), "b\n  deep.txt\nnotes.txt\n");
    }

    #[test]
    fn ls_missing_item() {
        let (mut sh, _) = shell();
        assert_eq!(run(&mut sh, "ls a/nope"), "file \"nope\" does not exist\n");
    }

    #[test]
    fn get_folder_without_recursive_creates_nothing() {
        let (mut sh, _) = shell();
        let tmp = TempDir::new().unwrap();

        let out = run(&mut sh, &format!("get a {}", tmp.path().display()));
        assert_eq!(out, "use recursive mode to download folders\n");
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn get_recursive_mirrors_folder_under_dest() {
        let (mut sh, _) = shell();
        let tmp = TempDir::new().unwrap();

        run(&mut sh, &format!("get -r a {}", tmp.path().display()));
        let root = tmp.path().join("a");
        assert_eq!(std::fs::read(root.join("notes.txt")).unwrap(), b"notes");
        assert_eq!(std::fs::read(root.join("b").join("deep.txt")).unwrap(), b"deep");
    }

    #[test]
    fn get_root_uses_drive_directory_name() {
        let (mut sh, _) = shell();
        let tmp = TempDir::new().unwrap();

        run(&mut sh, &format!("get -r / {}", tmp.path().display()));
        let root = tmp.path().join("GDrive");
        assert_eq!(std::fs::read(root.join("top.txt")).unwrap(), b"top");
        assert!(root.join("empty").is_dir());
    }

    #[test]
    fn get_file_into_existing_directory() {
        let (mut sh, _) = shell();
        let tmp = TempDir::new().unwrap();

        let out = run(&mut sh, &format!("get top.txt {}", tmp.path().display()));
        let dest = tmp.path().join("top.txt");
        assert_eq!(out, format!("{}\n", dest.display()));
        assert_eq!(std::fs::read(&dest).unwrap(), b"top");

        let again = run(&mut sh, &format!("get top.txt {}", tmp.path().display()));
        assert_eq!(again, format!("destination already exists: {}\n", dest.display()));
    }

    #[test]
    fn get_file_to_explicit_path() {
        let (mut sh, _) = shell();
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("renamed.txt");

        run(&mut sh, &format!("get a/notes.txt {}", dest.display()));
        assert_eq!(std::fs::read(&dest).unwrap(), b"notes");
    }

    #[test]
    fn put_defaults_to_current_folder() {
        let (mut sh, fx) = shell();
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("up.txt");
        std::fs::write(&file, "up").unwrap();

        run(&mut sh, "cd a/b");
        let out = run(&mut sh, &format!("put {}", file.display()));
        assert_eq!(out, format!("{}\n", file.display()));
        let names: Vec<String> = sh
            .drive()
            .children_of(&fx.b.id)
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["deep.txt", "up.txt"]);
    }

    #[test]
    fn put_recursive_into_named_folder_reuses_existing() {
        let (mut sh, fx) = shell();
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("b");
        std::fs::create_dir(&src).unwrap();
        std::fs::write(src.join("new.txt"), "n").unwrap();

        run(&mut sh, &format!("put -r {} /a", src.display()));
        let folders: Vec<String> = sh
            .drive()
            .children_of(&fx.a.id)
            .into_iter()
            .filter(|i| i.is_folder())
            .map(|i| i.name)
            .collect();
        assert_eq!(folders, vec!["b"]);
        let names: Vec<String> = sh
            .drive()
            .children_of(&fx.b.id)
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["deep.txt", "new.txt"]);
    }

    #[test]
    fn put_into_missing_folder_fails() {
        let (mut sh, _) = shell();
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("x");
        std::fs::write(&file, "x").unwrap();

        let out = run(&mut sh, &format!("put {} nowhere", file.display()));
        assert_eq!(out, "folder nowhere does not exist\n");
    }

    #[test]
    fn rm_folder_needs_recursive() {
        let (mut sh, fx) = shell();
        assert_eq!(run(&mut sh, "rm a"), "use recursive mode to delete folders\n");
        assert_eq!(run(&mut sh, "rm -r a"), "a\n");
        let trashed = sh.drive().metadata(&fx.a.id).unwrap();
        assert!(trashed.trashed);
        assert_eq!(run(&mut sh, "ls"), "empty\ntop.txt\n");
    }

    #[test]
    fn rm_current_folder_moves_shell_up() {
        let (mut sh, _) = shell();
        run(&mut sh, "cd a/b");
        run(&mut sh, "rm -r .");
        assert_eq!(run(&mut sh, "pwd"), "/a/\n");
    }

    #[test]
    fn rm_root_is_refused() {
        let (mut sh, _) = shell();
        assert_eq!(run(&mut sh, "rm -r /"), "refusing to remove the root folder\n");
    }

    #[test]
    fn argument_errors_print_usage() {
        let (mut sh, _) = shell();
        assert_eq!(
            run(&mut sh, "get"),
            "usage: get [-h] [-r] source [dest]\nthe following arguments are required: source\n"
        );
        assert_eq!(run(&mut sh, "rm -h"), "usage: rm [-h] [-r] source\n");
    }

    #[test]
    fn unknown_command_is_reported() {
        let (mut sh, _) = shell();
        assert_eq!(run(&mut sh, "mv a b"), "unknown command: mv\n");
    }

    #[test]
    fn exit_and_logout_end_session() {
        let (mut sh, _) = shell();
        assert_eq!(sh.execute("exit"), Flow::Exit);
        assert_eq!(sh.execute("EOF"), Flow::Exit);

        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("token.json");
        std::fs::write(&path, r#"{"access_token":"x"}"#).unwrap();
        let (sh, _) = shell();
        let mut sh = sh.with_token_store(TokenStore::new(path.clone()));
        assert_eq!(sh.execute("logout"), Flow::Exit);
        assert!(!path.exists());
    }

    #[test]
    fn greeting_names_account() {
        let (mut sh, _) = shell();
        sh.greet().unwrap();
        assert_eq!(output(&mut sh), "Local User <local@localhost>\n");
    }

    #[test]
    fn help_lists_commands() {
        let (mut sh, _) = shell();
        let out = run(&mut sh, "help");
        for verb in ["pwd", "ls", "cd", "get", "put", "rm", "shell", "logout"] {
            assert!(out.contains(verb), "missing {verb}");
        }
        assert!(out.contains("defaults to the current folder"));
    }

    #[cfg(unix)]
    #[test]
    fn shell_command_runs_locally() {
        let (mut sh, _) = shell();
        let tmp = TempDir::new().unwrap();
        let marker = tmp.path().join("ran");
        run(&mut sh, &format!("!touch {}", marker.display()));
        assert!(marker.exists());
    }

    #[test]
    fn completion_by_verb() {
        let (mut sh, _) = shell();
        assert_eq!(
            sh.complete("p").unwrap(),
            Some((0, vec!["put".to_string(), "pwd".to_string()]))
        );
        assert_eq!(
            sh.complete("cd ").unwrap(),
            Some((3, vec!["a/".to_string(), "empty/".to_string()]))
        );
        assert_eq!(
            sh.complete("get a/n").unwrap(),
            Some((4, vec!["a/notes.txt".to_string()]))
        );
        assert_eq!(sh.complete("put ./lo").unwrap(), None);

        run(&mut sh, "cd a");
        assert_eq!(sh.complete("cd ../e").unwrap(), Some((6, vec!["empty/".to_string()])));
    }

    fn completed(sh: &Shell<MemoryDrive, Vec<u8>>, line: &str) -> String {
        let (start, candidates) = sh.complete(line).unwrap().unwrap();
        assert_eq!(candidates.len(), 1, "{candidates:?}");
        format!("{}{}", &line[..start], candidates[0])
    }

    #[test]
    fn completed_names_with_separators_resolve_for_get() {
        let (mut sh, fx) = shell();
        let odd = sh.drive().add_folder(&fx.a.id, "x/y");
        sh.drive().add_file(&odd.id, "inner.txt", b"inner");
        let tmp = TempDir::new().unwrap();

        let line = completed(&sh, "get -r a/x");
        assert_eq!(line, r"get -r a/x\\/y/");
        run(&mut sh, &format!("{line} {}", tmp.path().display()));
        let inner = tmp.path().join("x_y").join("inner.txt");
        assert_eq!(std::fs::read(inner).unwrap(), b"inner");
    }

    #[test]
    fn completed_names_with_backslashes_resolve_for_rm() {
        let (mut sh, _) = shell();
        sh.drive().add_file(ROOT_ID, r"c\d.txt", b"");

        let line = completed(&sh, "rm c");
        assert_eq!(run(&mut sh, &line), "c\\d.txt\n");
    }

    #[test]
    fn completed_names_with_spaces_resolve_for_put() {
        let (mut sh, _) = shell();
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("up.txt"), "up").unwrap();
        let spaced = sh.drive().add_folder(ROOT_ID, "My Stuff");

        let line = completed(&sh, &format!("put {} My", tmp.path().join("up.txt").display()));
        run(&mut sh, &line);
        let names: Vec<String> = sh
            .drive()
            .children_of(&spaced.id)
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["up.txt"]);
    }
}
