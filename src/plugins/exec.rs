//! Plugin action execution.
//!
//! All four action kinds are synchronous and bounded by the action
//! timeout. Failures are logged as warnings and folded into `false`;
//! nothing here may propagate an error into the dispatcher.

use super::action::Action;
use crate::ui;
use crate::utils::proc::{run_command_with_timeout, ACTION_TIMEOUT};
use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::process::Command;

/// Execute one action whose payload has already been substituted.
/// Returns false on any failure.
pub fn execute(action: &Action, plugin_name: &str, plugin_dir: &Path) -> bool {
    match action {
        Action::Run(cmd) => run_shell(cmd, plugin_name),
        Action::Script(path) => run_script(path, plugin_name, plugin_dir),
        Action::Notify(msg) => notify(msg),
        Action::Log(msg) => append_log(msg, plugin_name, plugin_dir),
    }
}

fn run_shell(command: &str, plugin_name: &str) -> bool {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    match run_command_with_timeout(&mut cmd, ACTION_TIMEOUT) {
        Ok(output) if output.status.success() => true,
        Ok(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            ui::warning(&format!(
                "Plugin '{}': command failed: {}",
                plugin_name,
                stderr.lines().last().unwrap_or("non-zero exit").trim()
            ));
            false
        }
        Err(e) => {
            ui::warning(&format!("Plugin '{}': {}", plugin_name, e));
            false
        }
    }
}

fn run_script(rel_path: &str, plugin_name: &str, plugin_dir: &Path) -> bool {
    let script = plugin_dir.join(rel_path);
    if !script.exists() {
        ui::warning(&format!(
            "Plugin '{}': script not found: {}",
            plugin_name,
            script.display()
        ));
        return false;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Err(e) = std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)) {
            ui::warning(&format!(
                "Plugin '{}': cannot mark script executable: {}",
                plugin_name, e
            ));
            return false;
        }
    }

    let mut cmd = Command::new(&script);
    match run_command_with_timeout(&mut cmd, ACTION_TIMEOUT) {
        Ok(output) if output.status.success() => true,
        Ok(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            ui::warning(&format!(
                "Plugin '{}': script failed: {}",
                plugin_name,
                stderr.lines().last().unwrap_or("non-zero exit").trim()
            ));
            false
        }
        Err(e) => {
            ui::warning(&format!("Plugin '{}': {}", plugin_name, e));
            false
        }
    }
}

/// Try the known desktop notification commands in order, falling back to
/// stdout. The fallback always succeeds.
fn notify(message: &str) -> bool {
    let candidates: [&[&str]; 3] = [
        &["notify-send", "PAKA"],
        &["zenity", "--info", "--title", "PAKA", "--text"],
        &["kdialog", "--title", "PAKA", "--msgbox"],
    ];

    if try_notifiers(&candidates, message) {
        return true;
    }

    println!("PAKA: {}", message);
    true
}

/// True once a candidate runs and exits successfully. A notifier that
/// spawns but fails does not count; the next candidate gets its turn.
fn try_notifiers(candidates: &[&[&str]], message: &str) -> bool {
    for candidate in candidates {
        if which::which(candidate[0]).is_err() {
            continue;
        }
        let mut cmd = Command::new(candidate[0]);
        cmd.args(&candidate[1..]).arg(message);
        match run_command_with_timeout(&mut cmd, ACTION_TIMEOUT) {
            Ok(output) if output.status.success() => return true,
            _ => {}
        }
    }
    false
}

fn append_log(message: &str, plugin_name: &str, plugin_dir: &Path) -> bool {
    let log_file = plugin_dir.join("plugin.log");
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
    let result = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file)
        .and_then(|mut f| writeln!(f, "[{}] {}", timestamp, message));
    match result {
        Ok(()) => true,
        Err(e) => {
            ui::warning(&format!(
                "Plugin '{}': cannot write {}: {}",
                plugin_name,
                log_file.display(),
                e
            ));
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn run_action_reports_exit_status() {
        let dir = tempdir().expect("tempdir");
        assert!(execute(&Action::Run("true".into()), "t", dir.path()));
        assert!(!execute(&Action::Run("false".into()), "t", dir.path()));
    }

    #[test]
    fn missing_script_fails_without_panicking() {
        let dir = tempdir().expect("tempdir");
        assert!(!execute(&Action::Script("nope.sh".into()), "t", dir.path()));
    }

    #[test]
    fn script_is_made_executable_and_runs() {
        let dir = tempdir().expect("tempdir");
        let script = dir.path().join("hello.sh");
        std::fs::write(&script, "#!/bin/sh\nexit 0\n").expect("write script");
        assert!(execute(&Action::Script("hello.sh".into()), "t", dir.path()));
    }

    #[test]
    fn failed_notifier_falls_through_to_next_candidate() {
        let candidates: [&[&str]; 2] = [&["sh", "-c", "exit 1"], &["sh", "-c", "exit 0"]];
        assert!(try_notifiers(&candidates, "hello"));
        assert!(!try_notifiers(&candidates[..1], "hello"));
    }

    #[test]
    fn log_action_appends_timestamped_lines() {
        let dir = tempdir().expect("tempdir");
        assert!(execute(&Action::Log("first".into()), "t", dir.path()));
        assert!(execute(&Action::Log("second".into()), "t", dir.path()));
        let content = std::fs::read_to_string(dir.path().join("plugin.log")).expect("log exists");
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('['));
        assert!(lines[1].ends_with("second"));
    }
}
