//! System clipboard access
//!
//! Text is piped into the platform's clipboard command:
//! - macOS: pbcopy
//! - Linux: wl-copy, then xclip, then xsel
//! - Windows: clip

use anyhow::{bail, Context, Result};
use std::io::Write;
use std::process::{Command, Stdio};

#[cfg(target_os = "macos")]
const CANDIDATES: &[(&str, &[&str])] = &[("pbcopy", &[])];

#[cfg(target_os = "linux")]
const CANDIDATES: &[(&str, &[&str])] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
];

#[cfg(target_os = "windows")]
const CANDIDATES: &[(&str, &[&str])] = &[("clip", &[])];

#[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
const CANDIDATES: &[(&str, &[&str])] = &[];

/// Copy text to the system clipboard
///
/// Tries each clipboard command for the platform in turn.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut last_error = None;

    for (program, args) in CANDIDATES {
        match pipe_to(program, args, text) {
            Ok(()) => {
                tracing::debug!("Copied {} byte(s) with {}", text.len(), program);
                return Ok(());
            }
            Err(e) => last_error = Some(e),
        }
    }

    match last_error {
        Some(e) => Err(e),
        None => bail!("Clipboard not supported on this platform"),
    }
}

fn pipe_to(program: &str, args: &[&str], text: &str) -> Result<()> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("Failed to spawn {}", program))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(text.as_bytes())
            .with_context(|| format!("Failed to write to {}", program))?;
    }

    let status = child
        .wait()
        .with_context(|| format!("Failed to wait for {}", program))?;

    if !status.success() {
        bail!("{} exited with {}", program, status);
    }
    Ok(())
}
