use std::fs;
use std::path::Path;

use crate::config::WatcherConfig;
use crate::utils::error::{AppError, Result};

/// Tracked identifiers in processing order: the embedded list when one is
/// configured, otherwise the line-delimited file.
pub fn load(config: &WatcherConfig) -> Result<Vec<String>> {
    let asins = if config.asins.is_empty() {
        load_file(&config.asins_file)?
    } else {
        parse_lines(&config.asins.join("\n"))
    };

    if asins.is_empty() {
        return Err(AppError::Watchlist("no identifiers to watch".to_string()));
    }
    Ok(asins)
}

pub fn load_file(path: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(path)
        .map_err(|e| AppError::Watchlist(format!("cannot read {}: {}", path.display(), e)))?;
    Ok(parse_lines(&text))
}

/// One identifier per line; surrounding whitespace trimmed, blank lines skipped.
pub fn parse_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
