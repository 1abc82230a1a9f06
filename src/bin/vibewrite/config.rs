use std::env;
use std::path::{Path, PathBuf};

use vibewrite::config::{read_config, Config};

use crate::CFG_FILE_NAME;

fn get_config_path() -> Option<PathBuf> {
    let exe_dir = env::current_exe().ok().and_then(|exe| exe.parent().map(Path::to_path_buf));
    let candidates = [exe_dir, env::current_dir().ok(), dirs::config_dir()];

    candidates
        .into_iter()
        .flatten()
        .map(|dir| dir.join(CFG_FILE_NAME))
        .find(|path| path.exists())
}

pub(crate) fn open_config(cfg_path: Option<PathBuf>) -> Result<Config, String> {
    let config_path = match cfg_path.or_else(get_config_path) {
        None => return Err("Could not find VibeWrite configuration".to_string()),
        Some(x) => x,
    };

    eprintln!("Reading config from {}", config_path.display());
    let mut config = read_config(&config_path).map_err(|e| e.to_string())?;

    if let Some(mut log) = config.log {
        let location = log.location.or_else(|| {
            dirs::cache_dir().map(|dir| dir.join("VibeWrite").join("log").join("client.log"))
        });
        match &location {
            Some(path) => eprintln!("Log enabled. Files will be written in {}", path.display()),
            None => eprintln!("Log enabled but no cache dir found. Using stdout"),
        }
        log.location = location;
        config.log = Some(log);
    }

    Ok(config)
}
