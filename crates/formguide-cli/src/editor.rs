//! Terminal interaction: $VISUAL/$EDITOR for instructions, line prompts

use anyhow::{bail, Context, Result};
use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process::Command;

/// Editors tried in order when neither variable is set
const FALLBACK_EDITORS: [&str; 6] = ["nano", "vim", "vi", "emacs", "code", "notepad"];

/// Edit an item's instructions in the user's editor
///
/// The file opens with a comment naming the item; comment lines are removed
/// from the result.
pub fn edit_instructions(title: &str, current: &str) -> Result<String> {
    let initial = format!("<!-- Instructions for: {} -->\n\n{}\n", title.trim(), current);
    let edited = edit_text(&initial).context("Failed to edit instructions")?;
    Ok(strip_hints(&edited))
}

/// Open `initial_content` in the editor and return what was saved
fn edit_text(initial_content: &str) -> Result<String> {
    let editor = editor_from(|name| env::var(name).ok())
        .or_else(|| {
            FALLBACK_EDITORS
                .iter()
                .find(|name| command_exists(name))
                .map(|name| name.to_string())
        })
        .ok_or_else(|| {
            anyhow::anyhow!(
                "No editor found. Set $EDITOR environment variable.\n\
                 Example: export EDITOR=nano"
            )
        })?;

    let temp_path = env::temp_dir().join(format!("formguide_edit_{}.md", std::process::id()));
    fs::write(&temp_path, initial_content)
        .with_context(|| format!("Failed to create temp file: {:?}", temp_path))?;

    let result = run_editor(&editor, &temp_path);
    let _ = fs::remove_file(&temp_path);
    result
}

/// Run `editor` on `path`; the editor value may carry arguments (`code -w`)
fn run_editor(editor: &str, path: &Path) -> Result<String> {
    let mut parts = editor.split_whitespace();
    let program = parts.next().unwrap_or(editor);
    let status = Command::new(program)
        .args(parts)
        .arg(path)
        .status()
        .with_context(|| format!("Failed to run editor: {}", editor))?;

    if !status.success() {
        bail!(
            "Editor '{}' exited with {}. Your changes were not applied.",
            editor,
            status
        );
    }

    fs::read_to_string(path).with_context(|| format!("Failed to read edited file: {:?}", path))
}

/// Editor named by $VISUAL, then $EDITOR, ignoring empty values
fn editor_from(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    ["VISUAL", "EDITOR"]
        .iter()
        .filter_map(|name| lookup(name))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

/// Whether `cmd` is an executable file somewhere on PATH
fn command_exists(cmd: &str) -> bool {
    let Some(paths) = env::var_os("PATH") else {
        return false;
    };
    env::split_paths(&paths).any(|dir| dir.join(cmd).is_file())
}

/// Drop the `<!-- ... -->` hint lines written above editable text
pub fn strip_hints(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim_start().starts_with("<!--"))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Ask a yes/no question, defaulting to no
///
/// Declines without asking when stdin is not a terminal.
pub fn confirm(prompt: &str) -> Result<bool> {
    if !atty::is(atty::Stream::Stdin) {
        return Ok(false);
    }

    let answer = read_answer(&format!("{} [y/N] ", prompt))?.to_lowercase();
    Ok(answer == "y" || answer == "yes")
}

/// Approval for a destructive change
///
/// `--yes` approves outright. Otherwise only an interactive reader can
/// approve; JSON and quiet runs decline without asking.
pub fn approve(prompt: &str, yes: bool, interactive: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    if !interactive {
        return Ok(false);
    }
    confirm(prompt)
}

/// Ask for a field value; `None` means keep `current`
pub fn prompt_with_default(label: &str, current: &str) -> Result<Option<String>> {
    let prompt = if current.is_empty() {
        format!("{}: ", label)
    } else {
        format!("{} [{}]: ", label, current)
    };

    let answer = read_answer(&prompt)?;
    Ok(if answer.is_empty() { None } else { Some(answer) })
}

fn read_answer(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_editor_from_prefers_visual() {
        let env = lookup(&[("VISUAL", "code -w"), ("EDITOR", "vim")]);
        assert_eq!(editor_from(env).as_deref(), Some("code -w"));
    }

    #[test]
    fn test_editor_from_skips_blank() {
        let env = lookup(&[("VISUAL", "  "), ("EDITOR", "nano")]);
        assert_eq!(editor_from(env).as_deref(), Some("nano"));
        assert!(editor_from(lookup(&[])).is_none());
    }

    #[test]
    fn test_command_exists() {
        #[cfg(unix)]
        assert!(command_exists("sh"));

        assert!(!command_exists("definitely_not_a_real_command_12345"));
    }

    #[test]
    fn test_approve_without_prompting() {
        assert!(approve("Replace?", true, false).unwrap());
        assert!(approve("Replace?", true, true).unwrap());
        assert!(!approve("Replace?", false, false).unwrap());
    }

    #[test]
    fn test_strip_hints() {
        let text = "<!-- Instructions for: Squat -->\n\nFeet apart\n  <!-- note -->\nSit back\n";
        assert_eq!(strip_hints(text), "Feet apart\nSit back");
    }
}
