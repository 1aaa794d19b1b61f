//! Recode command implementation.

use crate::utils::create_progress_bar;
use oxigif::{
    AnimatedGifEncoder, Colour, ColourTableStrategy, EncoderConfig, GifComponent, GifDecoder,
    Palette, Progress, QuantizerType,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Options for [`cmd_recode`].
pub struct RecodeOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub strategy: ColourTableStrategy,
    pub quantizer: QuantizerType,
    pub quality: usize,
    pub repeat: Option<i32>,
    pub transparent: Option<String>,
    pub palette: Option<PathBuf>,
    pub progress: bool,
}

pub fn cmd_recode(options: RecodeOptions) -> Result<(), Box<dyn std::error::Error>> {
    let decoder = GifDecoder::from_file(&options.input)?;
    let state = decoder.consolidated_state();
    if !state.is_ok() {
        tracing::warn!(%state, "input decoded with errors");
    }
    if decoder.frames().is_empty() {
        return Err(format!("{} has no frames", options.input.display()).into());
    }

    let repeat = options
        .repeat
        .unwrap_or_else(|| decoder.loop_count().map_or(-1, i32::from));
    let mut config = EncoderConfig::new()
        .with_strategy(options.strategy)
        .with_quality(options.quality)
        .with_quantizer(options.quantizer)
        .with_repeat_count(repeat);
    if let Some(screen) = decoder.logical_screen_descriptor() {
        config = config.with_logical_screen_size(screen.width(), screen.height());
    }
    if let Some(path) = &options.palette {
        config = config
            .with_palette(Palette::from_file(path)?)
            .with_quantizer(QuantizerType::UseSuppliedPalette);
    }

    let progress = Arc::new(Progress::new());
    let mut encoder = AnimatedGifEncoder::with_config(config).with_progress(Arc::clone(&progress));
    if let Some(hex) = &options.transparent {
        encoder.set_transparent(Some(Colour::from_hex(hex)?));
    }
    for frame in decoder.frames() {
        encoder.add_image(frame.image().clone(), frame.delay())?;
    }
    let frame_count = decoder.frames().len();
    drop(decoder);

    let output = options.output.clone();
    let worker = thread::spawn(move || encoder.write_to_file(&output));

    let pb = create_progress_bar(frame_count as u64, options.progress);
    while !worker.is_finished() {
        pb.set_position(progress.processing_frame().min(frame_count) as u64);
        pb.set_message(progress.status());
        thread::sleep(Duration::from_millis(50));
    }
    let result = worker
        .join()
        .map_err(|_| "encoder thread panicked".to_string())?;
    pb.finish_and_clear();
    result?;

    println!(
        "Wrote {} frame(s) to {}",
        frame_count,
        options.output.display()
    );
    Ok(())
}
