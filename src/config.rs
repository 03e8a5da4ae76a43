use std::path::PathBuf;

/// Runtime configuration, resolved from the environment and then
/// overridden by command-line flags.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_path: PathBuf,
    /// Keep everything in memory; nothing survives the process.
    pub ephemeral: bool,
    pub log_filter: String,
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            data_path: std::env::var_os("HUNT_DATA")
                .map(PathBuf::from)
                .unwrap_or_else(default_data_path),
            ephemeral: false,
            log_filter: std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string()),
        }
    }
}

fn default_data_path() -> PathBuf {
    // XDG data directory, or the current directory as a last resort
    match directories::ProjectDirs::from("", "", "hunt") {
        Some(dirs) => dirs.data_dir().join("hunt.db"),
        None => PathBuf::from("hunt.db"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_path_names_the_database_file() {
        assert!(default_data_path().ends_with("hunt.db"));
    }
}
