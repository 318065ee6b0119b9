use crate::error::Result;
use crate::settings::{save_settings, settings_path, Settings};

pub fn run(
    mut settings: Settings,
    auto_accept: Option<u8>,
    sample_rows: Option<usize>,
    log_level: Option<String>,
) -> Result<()> {
    if let Some(threshold) = auto_accept {
        settings.auto_accept_confidence = threshold;
    }
    if let Some(rows) = sample_rows {
        settings.sample_rows = rows;
    }
    if let Some(level) = log_level {
        settings.log_level = level;
    }

    save_settings(&settings)?;

    println!("Saved settings to {}", settings_path().display());
    println!("  auto-accept confidence: {}%", settings.auto_accept_confidence);
    println!("  sample rows:            {}", settings.sample_rows);
    println!("  log level:              {}", settings.log_level);
    Ok(())
}
