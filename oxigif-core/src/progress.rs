//! Lock-free progress reporting.
//!
//! Long-running decode, analysis and encode operations update a shared
//! [`Progress`] that another thread may poll at any time.

use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

/// Stage of a long-running operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Stage {
    /// Nothing started yet.
    Idle = 0,
    /// Reading header and logical screen descriptor.
    ReadingHeader = 1,
    /// Reading frames and extensions.
    ReadingContent = 2,
    /// Collecting the colours used by the source images.
    AnalysingColours = 3,
    /// Training or running a colour quantizer.
    Quantizing = 4,
    /// Mapping pixels to colour table indices.
    MappingPixels = 5,
    /// Writing frames to the output stream.
    WritingFrames = 6,
    /// Finished.
    Done = 7,
}

impl Stage {
    fn from_u8(n: u8) -> Stage {
        match n {
            1 => Stage::ReadingHeader,
            2 => Stage::ReadingContent,
            3 => Stage::AnalysingColours,
            4 => Stage::Quantizing,
            5 => Stage::MappingPixels,
            6 => Stage::WritingFrames,
            7 => Stage::Done,
            _ => Stage::Idle,
        }
    }

    /// Short human readable description.
    pub fn description(&self) -> &'static str {
        match self {
            Stage::Idle => "Idle",
            Stage::ReadingHeader => "Reading header",
            Stage::ReadingContent => "Reading frames",
            Stage::AnalysingColours => "Analysing colours",
            Stage::Quantizing => "Quantizing colours",
            Stage::MappingPixels => "Mapping pixels",
            Stage::WritingFrames => "Writing frames",
            Stage::Done => "Done",
        }
    }
}

/// Progress of a decode or encode, readable from any thread.
#[derive(Debug, Default)]
pub struct Progress {
    stage: AtomicU8,
    frame: AtomicUsize,
    frame_count: AtomicUsize,
}

impl Progress {
    /// A progress tracker in the idle stage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter a new stage.
    pub fn set_stage(&self, stage: Stage) {
        self.stage.store(stage as u8, Ordering::Release);
    }

    /// Record the frame currently being processed, counting from 1.
    /// 0 means no frame has started.
    pub fn set_frame(&self, frame: usize) {
        self.frame.store(frame, Ordering::Release);
    }

    /// Record the total number of frames, if known.
    pub fn set_frame_count(&self, count: usize) {
        self.frame_count.store(count, Ordering::Release);
    }

    /// Current stage.
    pub fn stage(&self) -> Stage {
        Stage::from_u8(self.stage.load(Ordering::Acquire))
    }

    /// Frame being processed, counting from 1 (0 before the first).
    pub fn processing_frame(&self) -> usize {
        self.frame.load(Ordering::Acquire)
    }

    /// Total number of frames (0 while unknown).
    pub fn frame_count(&self) -> usize {
        self.frame_count.load(Ordering::Acquire)
    }

    /// Status line such as `"Writing frames (3/10)"`.
    pub fn status(&self) -> String {
        let stage = self.stage();
        let count = self.frame_count();
        match stage {
            Stage::ReadingContent | Stage::MappingPixels | Stage::WritingFrames if count > 0 => {
                format!(
                    "{} ({}/{})",
                    stage.description(),
                    self.processing_frame().min(count),
                    count
                )
            }
            Stage::ReadingContent => {
                format!("{} ({})", stage.description(), self.processing_frame())
            }
            _ => stage.description().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_status_text() {
        let progress = Progress::new();
        assert_eq!(progress.status(), "Idle");

        progress.set_stage(Stage::WritingFrames);
        progress.set_frame_count(10);
        progress.set_frame(3);
        assert_eq!(progress.status(), "Writing frames (3/10)");
        assert_eq!(progress.processing_frame(), 3);

        progress.set_frame(10);
        assert_eq!(progress.status(), "Writing frames (10/10)");
    }

    #[test]
    fn test_reading_without_count() {
        let progress = Progress::new();
        progress.set_stage(Stage::ReadingContent);
        assert_eq!(progress.status(), "Reading frames (0)");
        progress.set_frame(4);
        assert_eq!(progress.status(), "Reading frames (4)");
    }

    #[test]
    fn test_shared_between_threads() {
        let progress = Arc::new(Progress::new());
        let worker = {
            let progress = Arc::clone(&progress);
            thread::spawn(move || {
                progress.set_stage(Stage::Quantizing);
                progress.set_stage(Stage::Done);
            })
        };
        worker.join().unwrap();
        assert_eq!(progress.stage(), Stage::Done);
    }
}
