use std::path::PathBuf;

use colored::Colorize;

use crate::cli::{confidence_label, print_xray, read_export};
use crate::detector::{detect, needs_manual_mapping};
use crate::error::{FolioError, Result};
use crate::settings::Settings;
use crate::tokenizer;

pub fn run(file: &str, settings: &Settings) -> Result<()> {
    let content = read_export(&PathBuf::from(file))?;

    let headers = tokenizer::headers(&content);
    if headers.is_empty() {
        return Err(FolioError::HeaderNotFound);
    }
    let detection = detect(&headers);

    println!("Custodian:  {}", detection.custodian.bold());
    println!("Format:     {}", detection.format);
    println!("Confidence: {}", confidence_label(detection.confidence));

    let samples = tokenizer::sample_rows(&content, settings.sample_rows);
    print_xray(&headers, &detection, &samples);

    if needs_manual_mapping(&detection, settings.auto_accept_confidence) {
        println!(
            "{}",
            "Manual mapping required: run `folio import` with --map FIELD=COLUMN".yellow()
        );
    } else {
        println!("{}", "Auto-import ready".green());
    }
    Ok(())
}
