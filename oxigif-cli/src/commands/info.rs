//! Info command implementation.

use crate::utils::format_delay;
use oxigif::{GifComponent, GifDecoder, GifFrame};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// JSON representation of a decoded GIF.
#[derive(Debug, Serialize, Deserialize)]
struct GifInfoJson {
    file: String,
    version: Option<String>,
    width: u16,
    height: u16,
    global_colour_table: Option<usize>,
    background_colour_index: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    loop_count: Option<u16>,
    frames: Vec<FrameInfoJson>,
    comments: Vec<String>,
    application_extensions: Vec<String>,
    state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

/// JSON representation of one frame.
#[derive(Debug, Serialize, Deserialize)]
struct FrameInfoJson {
    left: u16,
    top: u16,
    width: u16,
    height: u16,
    delay: u16,
    disposal: String,
    interlaced: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    local_colour_table: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    transparent_index: Option<u8>,
    state: String,
}

fn frame_json(frame: &GifFrame) -> FrameInfoJson {
    let descriptor = frame.image_descriptor();
    let gce = frame.graphic_control_extension();
    FrameInfoJson {
        left: descriptor.map_or(0, |d| d.left()),
        top: descriptor.map_or(0, |d| d.top()),
        width: descriptor.map_or(0, |d| d.width()),
        height: descriptor.map_or(0, |d| d.height()),
        delay: frame.delay(),
        disposal: format!("{:?}", frame.disposal_method()),
        interlaced: descriptor.is_some_and(|d| d.is_interlaced()),
        local_colour_table: frame.local_colour_table().map(|t| t.len()),
        transparent_index: gce.and_then(|g| g.transparent_index()),
        state: frame.consolidated_state().to_string(),
    }
}

fn first_message(decoder: &GifDecoder) -> Option<String> {
    let mut pending: Vec<&dyn GifComponent> = vec![decoder as &dyn GifComponent];
    while let Some(component) = pending.pop() {
        if !component.error_message().is_empty() {
            return Some(component.error_message().to_string());
        }
        pending.extend(component.children().into_iter().rev());
    }
    None
}

pub fn cmd_info(file: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let decoder = GifDecoder::from_file(file)?;
    let screen = decoder.logical_screen_descriptor();

    let info = GifInfoJson {
        file: file.display().to_string(),
        version: decoder
            .header()
            .map(|h| format!("{}{}", h.signature(), h.version())),
        width: screen.map_or(0, |s| s.width()),
        height: screen.map_or(0, |s| s.height()),
        global_colour_table: decoder.global_colour_table().map(|t| t.len()),
        background_colour_index: screen.map_or(0, |s| s.background_colour_index()),
        loop_count: decoder.loop_count(),
        frames: decoder.frames().iter().map(frame_json).collect(),
        comments: decoder
            .comments()
            .iter()
            .map(|c| c.text().to_string())
            .collect(),
        application_extensions: decoder
            .application_extensions()
            .iter()
            .map(|a| format!("{}{}", a.identifier(), a.authentication_code()))
            .collect(),
        state: decoder.consolidated_state().to_string(),
        message: first_message(&decoder),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("File: {}", info.file);
    println!("Version: {}", info.version.as_deref().unwrap_or("(missing)"));
    println!("Logical screen: {}x{}", info.width, info.height);
    match info.global_colour_table {
        Some(len) => println!(
            "Global colour table: {} colours (background index {})",
            len, info.background_colour_index
        ),
        None => println!("Global colour table: none"),
    }
    match info.loop_count {
        Some(0) => println!("Loop: forever"),
        Some(n) => println!("Loop: {} times", n),
        None => println!("Loop: none"),
    }
    for comment in &info.comments {
        println!("Comment: {}", comment);
    }
    for app in &info.application_extensions {
        println!("Application extension: {}", app);
    }

    println!();
    println!(
        "{:>5}  {:>11}  {:>11}  {:>7}  {:<26}  {:>5}  State",
        "Frame", "Position", "Size", "Delay", "Disposal", "LCT"
    );
    println!("{}", "-".repeat(85));
    for (i, frame) in info.frames.iter().enumerate() {
        println!(
            "{:>5}  {:>11}  {:>11}  {:>7}  {:<26}  {:>5}  {}",
            i,
            format!("{},{}", frame.left, frame.top),
            format!("{}x{}", frame.width, frame.height),
            format_delay(frame.delay),
            format!(
                "{}{}",
                frame.disposal,
                if frame.interlaced { " (interlaced)" } else { "" }
            ),
            frame
                .local_colour_table
                .map_or_else(|| "-".to_string(), |n| n.to_string()),
            frame.state
        );
    }
    println!("{}", "-".repeat(85));
    println!("{} frame(s)", info.frames.len());
    println!();
    println!("State: {}", info.state);
    if let Some(message) = &info.message {
        println!("First problem: {}", message);
    }

    Ok(())
}
