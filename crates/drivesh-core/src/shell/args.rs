//! Turns a typed line into a [`Command`].
//!
//! `cd` and `ls` take their argument verbatim so backslash escapes reach
//! the path parser untouched. `get`, `put` and `rm` split their arguments
//! with POSIX shell quoting rules and accept `-r`/`--recursive`, `-h` and
//! `--`.

use crate::error::{CoreError, CoreResult};
use crate::event::Command;

pub const GET_USAGE: &str = "usage: get [-h] [-r] source [dest]";
pub const PUT_USAGE: &str = "usage: put [-h] [-r] source [dest]";
pub const RM_USAGE: &str = "usage: rm [-h] [-r] source";

/// Parses one input line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> CoreResult<Option<Command>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    if let Some(rest) = line.strip_prefix('!') {
        return Ok(Some(Command::Shell(rest.trim().to_string())));
    }

    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb {
        "pwd" => Command::Pwd,
        "ls" => parse_ls(rest),
        "cd" => Command::Cd {
            path: (!rest.is_empty()).then(|| rest.to_string()),
        },
        "get" => match parse_flags(GET_USAGE, rest, 2)? {
            None => Command::Usage(GET_USAGE),
            Some((recursive, mut positionals)) => {
                let dest = (positionals.len() > 1).then(|| positionals.remove(1));
                Command::Get {
                    source: positionals.remove(0),
                    dest,
                    recursive,
                }
            }
        },
        "put" => match parse_flags(PUT_USAGE, rest, 2)? {
            None => Command::Usage(PUT_USAGE),
            Some((recursive, mut positionals)) => {
                let dest = (positionals.len() > 1).then(|| positionals.remove(1));
                Command::Put {
                    source: positionals.remove(0),
                    dest,
                    recursive,
                }
            }
        },
        "rm" => match parse_flags(RM_USAGE, rest, 1)? {
            None => Command::Usage(RM_USAGE),
            Some((recursive, mut positionals)) => Command::Rm {
                source: positionals.remove(0),
                recursive,
            },
        },
        "shell" => Command::Shell(rest.to_string()),
        "help" | "?" => Command::Help,
        "logout" => Command::Logout,
        "exit" | "quit" | "EOF" => Command::Exit,
        other => return Err(CoreError::UnknownCommand(other.to_string())),
    };
    Ok(Some(command))
}

fn parse_ls(rest: &str) -> Command {
    for flag in ["-r", "--recursive"] {
        if let Some(path) = rest.strip_prefix(flag) {
            if path.is_empty() || path.starts_with(char::is_whitespace) {
                return Command::Ls {
                    path: path.trim_start().to_string(),
                    recursive: true,
                };
            }
        }
    }
    Command::Ls {
        path: rest.to_string(),
        recursive: false,
    }
}

/// Splits `rest` into the recursive flag and between 1 and `max`
/// positionals. `None` means help was requested.
fn parse_flags(
    usage: &'static str,
    rest: &str,
    max: usize,
) -> CoreResult<Option<(bool, Vec<String>)>> {
    let invalid = |message: String| CoreError::InvalidArguments { usage, message };

    let words = shlex::split(rest).ok_or_else(|| invalid("no closing quotation".to_string()))?;
    let mut recursive = false;
    let mut positionals = Vec::new();
    let mut unrecognized = Vec::new();
    let mut only_positionals = false;

    for word in words {
        if only_positionals || !word.starts_with('-') || word == "-" {
            positionals.push(word);
            continue;
        }
        match word.as_str() {
            "--" => only_positionals = true,
            "-r" | "--recursive" => recursive = true,
            "-h" | "--help" => return Ok(None),
            _ => unrecognized.push(word),
        }
    }

    if positionals.is_empty() {
        return Err(invalid(
            "the following arguments are required: source".to_string(),
        ));
    }
    if positionals.len() > max {
        unrecognized.extend(positionals.drain(max..));
    }
    if !unrecognized.is_empty() {
        return Err(invalid(format!(
            "unrecognized arguments: {}",
            unrecognized.join(" ")
        )));
    }
    Ok(Some((recursive, positionals)))
}
