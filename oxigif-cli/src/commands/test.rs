//! Test command implementation.

use crate::utils::expand_patterns;
use oxigif::{GifComponent, GifDecoder};

pub fn cmd_test(patterns: &[String], verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let files = expand_patterns(patterns)?;

    let mut ok_count = 0usize;
    let mut errors: Vec<(String, String)> = Vec::new();

    for path in &files {
        let name = path.display().to_string();
        match GifDecoder::from_file(path) {
            Ok(decoder) => {
                let state = decoder.consolidated_state();
                if state.is_ok() {
                    ok_count += 1;
                    if verbose {
                        println!(
                            "  OK: {} ({} frame(s))",
                            name,
                            decoder.frames().len()
                        );
                    }
                } else {
                    println!("  FAILED: {} ({})", name, state);
                    errors.push((name, state.to_string()));
                }
            }
            Err(e) => {
                println!("  FAILED: {} ({})", name, e);
                errors.push((name, e.to_string()));
            }
        }
    }

    println!();
    println!(
        "Tested {} file(s): {} OK, {} with errors",
        files.len(),
        ok_count,
        errors.len()
    );

    if errors.is_empty() {
        Ok(())
    } else {
        Err(format!("{} file(s) failed", errors.len()).into())
    }
}
