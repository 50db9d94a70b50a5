use std::path::{Path, PathBuf};

use super::error::{ConfigError, ConfigResult};

/// Explicit config path, checked before any other location.
pub static CONFIG_PATH_ENV: &str = "COURSEHUB_CONFIG";

static LOCAL_CONFIG: &str = "./config.toml";

/// Where the config is looked up, most specific first.
///
/// `COURSEHUB_CONFIG` wins, then `./config.toml` for local (debug) runs, then
/// the per-user directory (`$HOME/.config/coursehub` or `%APPDATA%\coursehub`),
/// with `./config.toml` as the last resort.
pub fn config_candidates(use_local: bool, explicit: Option<PathBuf>) -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = explicit.into_iter().collect();

    if use_local {
        candidates.push(PathBuf::from(LOCAL_CONFIG));
        return candidates;
    }

    if let Some(dir) = user_config_dir() {
        candidates.push(dir.join(crate::APPLICATION_NAME).join("config.toml"));
    }
    candidates.push(PathBuf::from(LOCAL_CONFIG));
    candidates
}

fn user_config_dir() -> Option<PathBuf> {
    #[cfg(unix)]
    {
        std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"))
    }
    #[cfg(windows)]
    {
        std::env::var_os("APPDATA").map(PathBuf::from)
    }
    #[cfg(not(any(unix, windows)))]
    {
        None
    }
}

pub fn find_config_file(use_local: bool) -> Option<PathBuf> {
    let explicit = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
    first_existing(config_candidates(use_local, explicit))
}

fn first_existing(candidates: Vec<PathBuf>) -> Option<PathBuf> {
    candidates.into_iter().find(|path| {
        tracing::trace!("looking for config at: {}", path.display());
        path.is_file()
    })
}

pub fn read_config(use_local: bool) -> ConfigResult<String> {
    let path = find_config_file(use_local).ok_or(ConfigError::ConfigNotFound)?;
    read_config_at(&path)
}

pub fn read_config_at(path: &Path) -> ConfigResult<String> {
    let path = path.canonicalize()?;
    tracing::debug!("using {} as configuration file", path.display());
    Ok(std::fs::read_to_string(path)?)
}

#[cfg(test)]
mod test {
    use std::fs;

    use super::*;

    #[test]
    fn local_runs_only_look_in_the_working_directory() {
        let candidates = config_candidates(true, None);
        assert_eq!(candidates, vec![PathBuf::from("./config.toml")]);
    }

    #[test]
    fn explicit_path_comes_first() {
        let explicit = PathBuf::from("/etc/coursehub.toml");
        let candidates = config_candidates(false, Some(explicit.clone()));
        assert_eq!(candidates.first(), Some(&explicit));
        assert_eq!(candidates.last(), Some(&PathBuf::from("./config.toml")));
    }

    #[test]
    fn first_existing_skips_missing_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let missing = temp_dir.path().join("missing.toml");
        let present = temp_dir
            .path()
            .join(crate::APPLICATION_NAME)
            .join("config.toml");
        fs::create_dir_all(present.parent().unwrap()).unwrap();
        fs::write(&present, "[host]\nbindto = \"127.0.0.1:0\"\n").unwrap();

        let found = first_existing(vec![missing, present.clone()]);
        assert_eq!(found, Some(present.clone()));
        assert!(read_config_at(&present).unwrap().contains("bindto"));
    }
}
