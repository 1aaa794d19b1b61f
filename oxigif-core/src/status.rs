//! Permissive error-state model shared by every GIF component.
//!
//! Parsing never fails on malformed input. Instead each component records
//! one or more [`ErrorState`] bits together with a human readable message,
//! and carries on with a best-effort default. A parent component reports the
//! union of its own state and the states of all of its descendants through
//! [`GifComponent::consolidated_state`].

use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Malformed-input conditions detected while reading a GIF stream.
    ///
    /// The empty set is [`ErrorState::OK`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ErrorState: u32 {
        /// The stream ended before the component was complete.
        const END_OF_INPUT_STREAM = 1 << 0;
        /// The header signature was not `GIF`.
        const BAD_SIGNATURE = 1 << 1;
        /// A data block held fewer bytes than its declared size.
        const DATA_BLOCK_TOO_SHORT = 1 << 2;
        /// A data block held more bytes than its declared size.
        const DATA_BLOCK_TOO_LONG = 1 << 3;
        /// A colour table held fewer colours than declared.
        const COLOUR_TABLE_TOO_SHORT = 1 << 4;
        /// A frame had neither a local nor a global colour table.
        const FRAME_HAS_NO_COLOUR_TABLE = 1 << 5;
        /// The LZW minimum code size would overflow a 12-bit dictionary.
        const LZW_MINIMUM_CODE_SIZE_TOO_LARGE = 1 << 6;
        /// The image data decoded to fewer pixels than the image needs.
        const TOO_FEW_PIXELS_IN_IMAGE_DATA = 1 << 7;
        /// An LZW code referenced a dictionary entry that did not exist.
        const CODE_NOT_IN_DICTIONARY = 1 << 8;
        /// A zero-length block appeared where data was required.
        const UNEXPECTED_BLOCK_TERMINATOR = 1 << 9;
        /// A byte that does not introduce any known block was found.
        const BAD_DATA_BLOCK_INTRODUCER = 1 << 10;
        /// An application extension identification block exceeded 11 bytes.
        const IDENTIFICATION_BLOCK_TOO_LONG = 1 << 11;
        /// An application extension identification block was under 11 bytes.
        const IDENTIFICATION_BLOCK_TOO_SHORT = 1 << 12;
        /// A Netscape extension did not carry a loop-count sub-block.
        const MISSING_LOOP_COUNT = 1 << 13;
        /// A palette index in the image data exceeded the active colour table.
        const BAD_COLOUR_INDEX = 1 << 14;
        /// A logical screen or image was larger than the decoder will allocate.
        const IMAGE_TOO_LARGE = 1 << 15;
    }
}

impl ErrorState {
    /// No error recorded.
    pub const OK: Self = Self::empty();

    /// Returns `true` when no error bit is set.
    pub fn is_ok(&self) -> bool {
        self.is_empty()
    }
}

impl fmt::Display for ErrorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("Ok");
        }
        let mut first = true;
        for (name, _) in self.iter_names() {
            if !first {
                f.write_str(" | ")?;
            }
            f.write_str(name)?;
            first = false;
        }
        Ok(())
    }
}

/// The error state and message owned by a single component.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentStatus {
    state: ErrorState,
    message: String,
}

impl ComponentStatus {
    /// A status with no error recorded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `state` and append `message`, newline separated from any
    /// earlier message.
    pub fn set(&mut self, state: ErrorState, message: impl AsRef<str>) {
        let message = message.as_ref();
        tracing::warn!(state = %state, "{}", message);
        self.state |= state;
        if !self.message.is_empty() {
            self.message.push('\n');
        }
        self.message.push_str(message);
    }

    /// Merge another status (bits and message) into this one.
    pub fn absorb(&mut self, other: &ComponentStatus) {
        if other.state.is_empty() {
            return;
        }
        self.state |= other.state;
        if !other.message.is_empty() {
            if !self.message.is_empty() {
                self.message.push('\n');
            }
            self.message.push_str(&other.message);
        }
    }

    /// Own error state.
    pub fn state(&self) -> ErrorState {
        self.state
    }

    /// Own error message (empty when the state is OK).
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A parsed or constructed part of a GIF stream.
pub trait GifComponent {
    /// The status owned by this component alone.
    fn status(&self) -> &ComponentStatus;

    /// Components owned by this one.
    fn children(&self) -> Vec<&dyn GifComponent> {
        Vec::new()
    }

    /// This component's own error state.
    fn error_state(&self) -> ErrorState {
        self.status().state()
    }

    /// This component's own error message.
    fn error_message(&self) -> &str {
        self.status().message()
    }

    /// Own state OR-ed with the consolidated state of every descendant.
    ///
    /// Computed on each call, so it always reflects the current tree.
    fn consolidated_state(&self) -> ErrorState {
        self.children()
            .iter()
            .fold(self.error_state(), |acc, child| {
                acc | child.consolidated_state()
            })
    }

    /// Whether `state` is set anywhere in this component's tree.
    fn test_state(&self, state: ErrorState) -> bool {
        self.consolidated_state().contains(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Leaf(ComponentStatus);

    impl GifComponent for Leaf {
        fn status(&self) -> &ComponentStatus {
            &self.0
        }
    }

    struct Parent {
        status: ComponentStatus,
        leaves: Vec<Leaf>,
    }

    impl GifComponent for Parent {
        fn status(&self) -> &ComponentStatus {
            &self.status
        }

        fn children(&self) -> Vec<&dyn GifComponent> {
            self.leaves.iter().map(|l| l as &dyn GifComponent).collect()
        }
    }

    #[test]
    fn test_messages_are_newline_joined() {
        let mut status = ComponentStatus::new();
        status.set(ErrorState::BAD_SIGNATURE, "first");
        status.set(ErrorState::END_OF_INPUT_STREAM, "second");
        assert_eq!(status.message(), "first\nsecond");
        assert!(status.state().contains(ErrorState::BAD_SIGNATURE));
        assert!(status.state().contains(ErrorState::END_OF_INPUT_STREAM));
    }

    #[test]
    fn test_consolidated_state() {
        let mut bad = ComponentStatus::new();
        bad.set(ErrorState::DATA_BLOCK_TOO_SHORT, "short");
        let mut parent = Parent {
            status: ComponentStatus::new(),
            leaves: vec![Leaf(ComponentStatus::new()), Leaf(bad)],
        };

        assert_eq!(parent.error_state(), ErrorState::OK);
        assert_eq!(parent.consolidated_state(), ErrorState::DATA_BLOCK_TOO_SHORT);
        assert!(parent.test_state(ErrorState::DATA_BLOCK_TOO_SHORT));

        parent.leaves.pop();
        assert_eq!(parent.consolidated_state(), ErrorState::OK);
    }

    #[test]
    fn test_display() {
        assert_eq!(ErrorState::OK.to_string(), "Ok");
        let state = ErrorState::BAD_SIGNATURE | ErrorState::END_OF_INPUT_STREAM;
        let text = state.to_string();
        assert!(text.contains("BAD_SIGNATURE"));
        assert!(text.contains("END_OF_INPUT_STREAM"));
    }
}
