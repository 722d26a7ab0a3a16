use anyhow::Result;

use plinth_core::AppConfig;

pub fn run(config: &AppConfig, path_only: bool) -> Result<()> {
    if path_only {
        println!("{}", AppConfig::config_path().display());
        return Ok(());
    }

    let path = AppConfig::config_path();
    if path.exists() {
        println!("# Loaded from {}", path.display());
    } else {
        println!("# {} not found, showing defaults", path.display());
    }
    print!("{}", config.to_toml()?);
    Ok(())
}
