use crate::core::Scope;
use crate::error::{PakaError, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("io", "paka", "paka")
        .ok_or_else(|| PakaError::PathError("Could not determine user directories".to_string()))
}

pub fn user_config_dir() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().to_path_buf())
}

pub fn user_data_dir() -> Result<PathBuf> {
    Ok(project_dirs()?.data_dir().to_path_buf())
}

pub fn system_config_dir() -> PathBuf {
    PathBuf::from("/etc/paka")
}

pub fn system_data_dir() -> PathBuf {
    PathBuf::from("/var/lib/paka")
}

/// Root directory scanned for plugin units, one subdirectory per unit.
pub fn plugin_root(scope: Scope) -> Result<PathBuf> {
    match scope {
        Scope::User => Ok(user_config_dir()?.join("plugins")),
        Scope::System => Ok(system_config_dir().join("plugins")),
    }
}

/// Per-scope history ledger document.
pub fn history_file(scope: Scope) -> Result<PathBuf> {
    match scope {
        Scope::User => Ok(user_data_dir()?.join("history.json")),
        Scope::System => Ok(system_data_dir().join("history.json")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_roots_are_disjoint() {
        let user = plugin_root(Scope::User).expect("user plugin root");
        let system = plugin_root(Scope::System).expect("system plugin root");
        assert_ne!(user, system);
        assert!(system.starts_with("/etc/paka"));
    }
}
