//! Config-driven command adapter.
//!
//! Every supported manager is described by a `CommandSpec`: argv templates
//! for each operation. The adapter stays deliberately thin; dependency
//! resolution, prompting and flag handling belong to the real manager.

use super::{BackendAdapter, OpOutcome, PackageInfo};
use crate::error::{PakaError, Result};
use crate::utils::proc::{run_command_with_timeout, BACKEND_TIMEOUT, SEARCH_TIMEOUT};
use std::collections::HashSet;
use std::process::Command;

/// Argv templates for one package manager. `{query}` in `search` is
/// replaced with the search term; package names are appended to the
/// mutating templates.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub name: &'static str,
    /// Binary probed on PATH for availability.
    pub binary: &'static str,
    pub search: &'static [&'static str],
    pub list_installed: &'static [&'static str],
    pub install: &'static [&'static str],
    pub remove: &'static [&'static str],
    /// Falls back to `remove` when the manager has no purge notion.
    pub purge: Option<&'static [&'static str]>,
    pub update: &'static [&'static str],
    pub upgrade: &'static [&'static str],
}

pub struct CommandAdapter {
    spec: CommandSpec,
    enabled: bool,
}

impl CommandAdapter {
    pub fn new(spec: CommandSpec) -> Self {
        Self {
            spec,
            enabled: true,
        }
    }

    pub fn with_enabled(spec: CommandSpec, enabled: bool) -> Self {
        Self { spec, enabled }
    }

    fn build_command(&self, template: &[&str], query: Option<&str>) -> Command {
        let mut cmd = Command::new(template[0]);
        for arg in &template[1..] {
            match query {
                Some(q) if *arg == "{query}" => {
                    cmd.arg(q);
                }
                _ => {
                    cmd.arg(arg);
                }
            }
        }
        cmd
    }

    fn run_mutation(&self, template: &[&str], packages: &[String]) -> OpOutcome {
        let mut cmd = self.build_command(template, None);
        cmd.args(packages);
        match run_command_with_timeout(&mut cmd, BACKEND_TIMEOUT) {
            Ok(output) if output.status.success() => OpOutcome::ok(),
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                let reason = stderr
                    .lines()
                    .last()
                    .unwrap_or("command exited with non-zero status")
                    .trim()
                    .to_string();
                OpOutcome::failed(reason)
            }
            Err(e) => OpOutcome::failed(e.to_string()),
        }
    }

    fn installed_names(&self) -> Result<HashSet<String>> {
        let mut cmd = self.build_command(self.spec.list_installed, None);
        let output = run_command_with_timeout(&mut cmd, SEARCH_TIMEOUT)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = stderr
                .lines()
                .last()
                .unwrap_or("command exited with non-zero status")
                .trim()
                .to_string();
            return Err(PakaError::SystemCommandFailed {
                command: self.spec.list_installed.join(" "),
                reason,
            });
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(parse_name_lines(&stdout))
    }
}

impl BackendAdapter for CommandAdapter {
    fn name(&self) -> &str {
        self.spec.name
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn is_available(&self) -> bool {
        which::which(self.spec.binary).is_ok()
    }

    fn search(&self, query: &str) -> Result<Vec<PackageInfo>> {
        let mut cmd = self.build_command(self.spec.search, Some(query));
        let output = run_command_with_timeout(&mut cmd, SEARCH_TIMEOUT)?;

        // A manager that ran but found nothing may exit non-zero; that is
        // an empty result, not a query failure.
        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut packages = parse_search_lines(&stdout, self.spec.name);
        packages.retain(|p| p.name.to_lowercase().contains(&query.to_lowercase()));

        // Installed state must come from a successful query. Treating a
        // failed listing as "nothing installed" would let reconciliation
        // flag live packages as removed.
        let installed = self.installed_names()?;
        for pkg in &mut packages {
            pkg.installed = installed.contains(&pkg.name);
        }
        Ok(packages)
    }

    fn install(&self, packages: &[String]) -> OpOutcome {
        self.run_mutation(self.spec.install, packages)
    }

    fn remove(&self, packages: &[String]) -> OpOutcome {
        self.run_mutation(self.spec.remove, packages)
    }

    fn purge(&self, packages: &[String]) -> OpOutcome {
        self.run_mutation(self.spec.purge.unwrap_or(self.spec.remove), packages)
    }

    fn update(&self) -> OpOutcome {
        self.run_mutation(self.spec.update, &[])
    }

    fn upgrade(&self) -> OpOutcome {
        self.run_mutation(self.spec.upgrade, &[])
    }
}

/// Parse search output: one package per line, first token is the name
/// (an optional `repo/` prefix is stripped), a second version-looking
/// token becomes the version, the rest the description. Indented
/// continuation lines and column headers are skipped.
fn parse_search_lines(stdout: &str, manager: &str) -> Vec<PackageInfo> {
    let mut packages = Vec::new();
    for line in stdout.lines() {
        if line.starts_with(' ') || line.starts_with('\t') || line.trim().is_empty() {
            continue;
        }
        let mut tokens = line.split_whitespace();
        let raw_name = match tokens.next() {
            Some(t) => t,
            None => continue,
        };
        if raw_name == "Name" || raw_name.starts_with('=') {
            continue;
        }
        let name = raw_name
            .rsplit('/')
            .next()
            .unwrap_or(raw_name)
            .to_string();

        let second = tokens.next();
        let version = second.filter(|t| looks_like_version(t)).map(String::from);
        let mut description: Vec<&str> = Vec::new();
        if version.is_none() {
            if let Some(tok) = second {
                if tok != "-" && tok != ":" {
                    description.push(tok);
                }
            }
        }
        description.extend(tokens);

        packages.push(PackageInfo {
            name,
            version,
            description: if description.is_empty() {
                None
            } else {
                Some(description.join(" "))
            },
            manager: manager.to_string(),
            installed: false,
        });
    }
    packages
}

fn parse_name_lines(stdout: &str) -> HashSet<String> {
    stdout
        .lines()
        .filter(|line| !line.starts_with(' ') && !line.trim().is_empty())
        .filter_map(|line| line.split_whitespace().next())
        .filter(|name| *name != "Name")
        .map(|name| name.rsplit('/').next().unwrap_or(name).to_string())
        .collect()
}

fn looks_like_version(token: &str) -> bool {
    token.chars().next().map_or(false, |c| c.is_ascii_digit())
}

pub const BUILTIN_SPECS: &[CommandSpec] = &[
    CommandSpec {
        name: "apt",
        binary: "apt-get",
        search: &["apt-cache", "search", "--names-only", "{query}"],
        list_installed: &["dpkg-query", "-W", "-f", "${binary:Package}\n"],
        install: &["apt-get", "install", "-y"],
        remove: &["apt-get", "remove", "-y"],
        purge: Some(&["apt-get", "purge", "-y"]),
        update: &["apt-get", "update"],
        upgrade: &["apt-get", "upgrade", "-y"],
    },
    CommandSpec {
        name: "dnf",
        binary: "dnf",
        search: &["dnf", "search", "{query}"],
        list_installed: &["rpm", "-qa", "--qf", "%{NAME}\n"],
        install: &["dnf", "install", "-y"],
        remove: &["dnf", "remove", "-y"],
        purge: None,
        update: &["dnf", "makecache"],
        upgrade: &["dnf", "upgrade", "-y"],
    },
    CommandSpec {
        name: "pacman",
        binary: "pacman",
        search: &["pacman", "-Ss", "{query}"],
        list_installed: &["pacman", "-Qq"],
        install: &["pacman", "-S", "--noconfirm"],
        remove: &["pacman", "-R", "--noconfirm"],
        purge: Some(&["pacman", "-Rns", "--noconfirm"]),
        update: &["pacman", "-Sy"],
        upgrade: &["pacman", "-Syu", "--noconfirm"],
    },
    CommandSpec {
        name: "flatpak",
        binary: "flatpak",
        search: &["flatpak", "search", "{query}"],
        list_installed: &["flatpak", "list", "--columns=application"],
        install: &["flatpak", "install", "-y"],
        remove: &["flatpak", "uninstall", "-y"],
        purge: Some(&["flatpak", "uninstall", "--delete-data", "-y"]),
        update: &["flatpak", "update", "--appstream"],
        upgrade: &["flatpak", "update", "-y"],
    },
    CommandSpec {
        name: "snap",
        binary: "snap",
        search: &["snap", "find", "{query}"],
        list_installed: &["snap", "list"],
        install: &["snap", "install"],
        remove: &["snap", "remove"],
        purge: Some(&["snap", "remove", "--purge"]),
        update: &["snap", "refresh", "--list"],
        upgrade: &["snap", "refresh"],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_apt_cache_style() {
        let out = "htop - interactive processes viewer\nhtop-dev - headers\n";
        let pkgs = parse_search_lines(out, "apt");
        assert_eq!(pkgs.len(), 2);
        assert_eq!(pkgs[0].name, "htop");
        assert_eq!(
            pkgs[0].description.as_deref(),
            Some("interactive processes viewer")
        );
        assert!(pkgs[0].version.is_none());
    }

    #[test]
    fn parse_pacman_ss_style_strips_repo_and_skips_continuations() {
        let out = "extra/htop 3.2.2-1\n    Interactive process viewer\n";
        let pkgs = parse_search_lines(out, "pacman");
        assert_eq!(pkgs.len(), 1);
        assert_eq!(pkgs[0].name, "htop");
        assert_eq!(pkgs[0].version.as_deref(), Some("3.2.2-1"));
    }

    #[test]
    fn parse_snap_find_skips_header() {
        let out = "Name  Version  Publisher  Notes  Summary\nhtop  3.2.2  maxiberta  -  Interactive viewer\n";
        let pkgs = parse_search_lines(out, "snap");
        assert_eq!(pkgs.len(), 1);
        assert_eq!(pkgs[0].name, "htop");
    }

    fn scripted_spec(list_installed: &'static [&'static str]) -> CommandSpec {
        CommandSpec {
            name: "scripted",
            binary: "sh",
            search: &["sh", "-c", "echo 'ghostpkg 1.0 scripted package'"],
            list_installed,
            install: &["true"],
            remove: &["true"],
            purge: None,
            update: &["true"],
            upgrade: &["true"],
        }
    }

    #[test]
    fn search_fails_when_listing_binary_is_missing() {
        let adapter = CommandAdapter::new(scripted_spec(&["paka-missing-binary-xyzzy"]));
        assert!(adapter.search("ghostpkg").is_err());
    }

    #[test]
    fn search_fails_when_listing_exits_nonzero() {
        let adapter =
            CommandAdapter::new(scripted_spec(&["sh", "-c", "echo listing broke >&2; exit 3"]));
        let err = adapter.search("ghostpkg").unwrap_err();
        assert!(err.to_string().contains("listing broke"));
    }

    #[test]
    fn search_marks_installed_from_successful_listing() {
        let adapter = CommandAdapter::new(scripted_spec(&["sh", "-c", "echo ghostpkg"]));
        let pkgs = adapter.search("ghostpkg").unwrap();
        assert_eq!(pkgs.len(), 1);
        assert!(pkgs[0].installed);
    }

    #[test]
    fn installed_name_lines_take_first_token() {
        let names = parse_name_lines("htop 3.2.2 stable\nvim\n");
        assert!(names.contains("htop"));
        assert!(names.contains("vim"));
        assert_eq!(names.len(), 2);
    }
}
