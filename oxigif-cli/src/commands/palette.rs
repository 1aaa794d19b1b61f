//! Palette command implementations.

use oxigif::{GifDecoder, Palette};
use serde_json::json;
use std::path::Path;

pub fn cmd_palette_show(file: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let palette = Palette::from_file(file)?;

    if json {
        let colours: Vec<String> = palette
            .colours()
            .iter()
            .map(|c| format!("#{:06X}", c.to_rgb24()))
            .collect();
        let output = json!({
            "file": file.display().to_string(),
            "colours": colours,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Palette: {}", file.display());
    for (row, chunk) in palette.colours().chunks(8).enumerate() {
        let line: Vec<String> = chunk
            .iter()
            .map(|c| format!("#{:06X}", c.to_rgb24()))
            .collect();
        println!("{:>3}: {}", row * 8, line.join(" "));
    }
    Ok(())
}

pub fn cmd_palette_extract(input: &Path, output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let decoder = GifDecoder::from_file(input)?;
    let table = decoder
        .global_colour_table()
        .or_else(|| {
            decoder
                .frames()
                .iter()
                .find_map(|frame| frame.local_colour_table())
        })
        .ok_or_else(|| format!("{} has no colour table", input.display()))?;

    Palette::from(table).write_to_file(output)?;
    println!(
        "Extracted {} colour(s) from {} to {}",
        table.len(),
        input.display(),
        output.display()
    );
    Ok(())
}
