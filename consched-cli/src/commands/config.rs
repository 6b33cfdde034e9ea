use anyhow::Result;
use consched_core::config::SchedConfig;
use owo_colors::OwoColorize;

pub fn run(config: &SchedConfig) -> Result<()> {
    let config_path = SchedConfig::config_path()?;

    println!("{}", "Paths".bold());
    println!("  Config:  {}", config_path.display());
    println!("  Cache:   {}", config.data_path().display());
    println!();
    println!("{}", "Effective config".bold());
    print!("{}", config.to_toml()?);

    Ok(())
}
