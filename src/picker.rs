use std::path::PathBuf;
use std::process::Command;

use anyhow::{bail, Context, Result};

/// Native file/folder chooser. egui is a single-threaded immediate-mode UI
/// and native dialog toolkits may insist on owning a main thread, so every
/// backend opens the dialog in a separate short-lived process.
pub trait PickerService {
    /// `None` means the user cancelled.
    fn select_folder(&self, title: &str) -> Result<Option<PathBuf>>;
    fn select_file(&self, title: &str, extensions: &[&str]) -> Result<Option<PathBuf>>;
}

/// Picks the backend once at startup.
pub fn default_picker() -> Box<dyn PickerService> {
    if cfg!(target_os = "macos") {
        Box::new(OsaScriptPicker)
    } else {
        Box::new(HelperPicker)
    }
}

/// macOS backend: AppleScript via `osascript`.
pub struct OsaScriptPicker;

impl OsaScriptPicker {
    fn run_script(script: &str) -> Result<Option<PathBuf>> {
        let output = Command::new("osascript")
            .args(["-e", script])
            .output()
            .context("failed to spawn osascript")?;
        // Cancelling the dialog makes osascript exit non-zero.
        if !output.status.success() {
            return Ok(None);
        }
        parse_picker_output(&output.stdout)
    }
}

impl PickerService for OsaScriptPicker {
    fn select_folder(&self, title: &str) -> Result<Option<PathBuf>> {
        Self::run_script(&format!(
            "POSIX path of (choose folder with prompt \"{}\")",
            escape_prompt(title)
        ))
    }

    fn select_file(&self, title: &str, _extensions: &[&str]) -> Result<Option<PathBuf>> {
        Self::run_script(&format!(
            "POSIX path of (choose file with prompt \"{}\")",
            escape_prompt(title)
        ))
    }
}

/// Other platforms: re-invoke this binary in helper mode and let rfd open
/// the dialog in the child process (see `--pick-folder` / `--pick-file`
/// handling in main.rs).
pub struct HelperPicker;

impl HelperPicker {
    fn spawn_helper(args: &[&str]) -> Result<Option<PathBuf>> {
        let exe = std::env::current_exe().context("cannot resolve own executable path")?;
        let output = Command::new(exe)
            .args(args)
            .output()
            .context("failed to spawn picker helper")?;
        if !output.status.success() {
            bail!("picker helper exited with code {:?}", output.status.code());
        }
        parse_picker_output(&output.stdout)
    }
}

impl PickerService for HelperPicker {
    fn select_folder(&self, title: &str) -> Result<Option<PathBuf>> {
        Self::spawn_helper(&["--pick-folder", title])
    }

    fn select_file(&self, title: &str, extensions: &[&str]) -> Result<Option<PathBuf>> {
        let joined = extensions.join(",");
        Self::spawn_helper(&["--pick-file", title, &joined])
    }
}

fn escape_prompt(title: &str) -> String {
    title.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Empty output is a cancel; anything that is not a single path is
/// unexpected and reported as an error, leaving the field unchanged.
fn parse_picker_output(stdout: &[u8]) -> Result<Option<PathBuf>> {
    let text = String::from_utf8_lossy(stdout);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.lines().count() > 1 {
        bail!("unexpected picker output: {trimmed}");
    }
    Ok(Some(PathBuf::from(trimmed)))
}
