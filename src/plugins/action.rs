//! Typed plugin actions and context variable substitution.
//!
//! Action strings come from `plugin.conf` with an optional prefix
//! (`run:`, `script:`, `notify:`, `log:`); an untyped string is a shell
//! command. Parsing is total so a malformed config line can never crash
//! an event dispatch; `lint` surfaces suspicious prefixes separately.

use crate::events::{ContextValue, EventContext};
use chrono::Local;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Shell command executed through `sh -c`.
    Run(String),
    /// Script file relative to the plugin's own directory.
    Script(String),
    /// Desktop notification with stdout fallback.
    Notify(String),
    /// Timestamped line appended to the plugin's log file.
    Log(String),
}

impl Action {
    /// Total parser. An unrecognized prefix falls through to `Run` of the
    /// whole string, matching the untyped default.
    pub fn parse(raw: &str) -> Action {
        if let Some(rest) = raw.strip_prefix("run:") {
            Action::Run(rest.to_string())
        } else if let Some(rest) = raw.strip_prefix("script:") {
            Action::Script(rest.to_string())
        } else if let Some(rest) = raw.strip_prefix("notify:") {
            Action::Notify(rest.to_string())
        } else if let Some(rest) = raw.strip_prefix("log:") {
            Action::Log(rest.to_string())
        } else {
            Action::Run(raw.to_string())
        }
    }

    /// Lint warning for `config plugins check`: an action that looks like
    /// it carries a prefix (`word:` before any space) that is not one we
    /// recognize probably holds a typo.
    pub fn lint(raw: &str) -> Option<String> {
        let head = raw.split_whitespace().next().unwrap_or("");
        if let Some((prefix, _)) = head.split_once(':') {
            if !matches!(prefix, "run" | "script" | "notify" | "log")
                && !prefix.is_empty()
                && prefix.chars().all(|c| c.is_ascii_alphanumeric())
            {
                return Some(format!(
                    "Unrecognized action prefix '{}:' (treated as a shell command)",
                    prefix
                ));
            }
        }
        None
    }

    pub fn payload(&self) -> &str {
        match self {
            Action::Run(s) | Action::Script(s) | Action::Notify(s) | Action::Log(s) => s,
        }
    }

    pub fn to_config_line(&self) -> String {
        match self {
            Action::Run(s) => format!("run:{}", s),
            Action::Script(s) => format!("script:{}", s),
            Action::Notify(s) => format!("notify:{}", s),
            Action::Log(s) => format!("log:{}", s),
        }
    }
}

fn context_str(ctx: &EventContext, key: &str) -> String {
    ctx.get(key).map(ContextValue::as_display).unwrap_or_default()
}

fn env_or_empty(key: &str) -> String {
    std::env::var(key).unwrap_or_default()
}

/// Expand all builtin variables. Total: every builtin is always defined
/// (empty when absent from context and environment), and any leftover
/// `$name` token resolves to the empty string.
pub fn substitute(
    text: &str,
    ctx: &EventContext,
    plugin_name: &str,
    plugin_dir: &str,
) -> String {
    let packages = ctx.packages();
    let now = Local::now();

    let mut out = text.to_string();
    // Longer names first so `$timestamp` is not eaten by `$time`.
    let replacements: [(&str, String); 14] = [
        ("$package-manager", context_str(ctx, "package-manager")),
        ("$package-count", packages.len().to_string()),
        ("$packages", packages.join(" ")),
        ("$operation", context_str(ctx, "operation")),
        ("$success", context_str(ctx, "success")),
        ("$error", context_str(ctx, "error")),
        ("$user", env_or_empty("USER")),
        ("$home", env_or_empty("HOME")),
        ("$hostname", env_or_empty("HOSTNAME")),
        ("$plugin-name", plugin_name.to_string()),
        ("$plugin-dir", plugin_dir.to_string()),
        ("$timestamp", now.format("%Y-%m-%d %H:%M:%S").to_string()),
        ("$date", now.format("%Y-%m-%d").to_string()),
        ("$time", now.format("%H:%M:%S").to_string()),
    ];
    for (var, value) in replacements {
        out = out.replace(var, &value);
    }
    scrub_unknown_vars(&out)
}

/// Replace any remaining `$identifier` token with the empty string.
fn scrub_unknown_vars(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '$' {
            let mut consumed = false;
            while let Some(&next) = chars.peek() {
                if next.is_ascii_alphanumeric() || next == '-' || next == '_' {
                    chars.next();
                    consumed = true;
                } else {
                    break;
                }
            }
            if !consumed {
                out.push('$');
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventContext;

    #[test]
    fn parse_recognizes_prefixes() {
        assert_eq!(Action::parse("run:echo hi"), Action::Run("echo hi".into()));
        assert_eq!(
            Action::parse("script:backup.sh"),
            Action::Script("backup.sh".into())
        );
        assert_eq!(Action::parse("notify:done"), Action::Notify("done".into()));
        assert_eq!(Action::parse("log:installed"), Action::Log("installed".into()));
    }

    #[test]
    fn untyped_action_defaults_to_run() {
        assert_eq!(Action::parse("echo hi"), Action::Run("echo hi".into()));
    }

    #[test]
    fn unknown_prefix_falls_through_to_run_but_lints() {
        assert_eq!(
            Action::parse("shout:hello"),
            Action::Run("shout:hello".into())
        );
        assert!(Action::lint("shout:hello").is_some());
        assert!(Action::lint("run:echo ok").is_none());
        // URLs inside a plain command should not trip the lint
        assert!(Action::lint("curl https://example.com").is_none());
    }

    #[test]
    fn substitute_expands_context_variables() {
        let ctx = EventContext::new()
            .with_list("packages", &["htop".into(), "vim".into()])
            .with_str("package-manager", "apt")
            .with_bool("success", true);
        let out = substitute(
            "$package-manager got $package-count: $packages ($success)",
            &ctx,
            "demo",
            "/tmp/demo",
        );
        assert_eq!(out, "apt got 2: htop vim (true)");
    }

    #[test]
    fn substitute_never_fails_on_unknown_variables() {
        let ctx = EventContext::new();
        assert_eq!(substitute("x $no-such-var y", &ctx, "p", "/p"), "x  y");
        // A bare dollar sign survives
        assert_eq!(substitute("cost: 5$", &ctx, "p", "/p"), "cost: 5$");
    }

    #[test]
    fn timestamp_is_not_eaten_by_time() {
        let ctx = EventContext::new();
        let out = substitute("$timestamp", &ctx, "p", "/p");
        // Full "YYYY-mm-dd HH:MM:SS", not a date glued to a stray suffix
        assert_eq!(out.len(), 19, "got: {}", out);
    }

    #[test]
    fn plugin_variables_expand() {
        let ctx = EventContext::new();
        let out = substitute("$plugin-name in $plugin-dir", &ctx, "snapper", "/etc/paka/plugins/snapper");
        assert_eq!(out, "snapper in /etc/paka/plugins/snapper");
    }

    #[test]
    fn config_line_round_trips() {
        for raw in ["run:echo hi", "script:a.sh", "notify:msg", "log:msg"] {
            assert_eq!(Action::parse(raw).to_config_line(), raw);
        }
    }
}
