//! Decoder behaviour on malformed, truncated and garbage input.

use oxigif::{AnimatedGifEncoder, ColourTable, DecoderState, ErrorState, GifComponent, GifDecoder, GifHeader};
use oxigif_core::{Bitmap, Colour, DataBlock};
use std::io::{self, Cursor, Read};

fn sample_gif() -> Vec<u8> {
    let mut encoder = AnimatedGifEncoder::new();
    let pixels = (0..64u32).map(|i| Colour::rgb((i * 4) as u8, 0, 255 - (i * 4) as u8)).collect();
    encoder.add_image(Bitmap::from_pixels(8, 8, pixels).unwrap(), 5).unwrap();
    encoder.add_image(Bitmap::filled(8, 8, Colour::WHITE), 5).unwrap();
    let mut out = Vec::new();
    encoder.write_to_stream(&mut out).unwrap();
    out
}

#[test]
fn test_header_ok() {
    let header = GifHeader::read_from(&mut Cursor::new(b"GIF89a"));
    assert_eq!(header.signature(), "GIF");
    assert_eq!(header.version(), "89a");
    assert_eq!(header.error_state(), ErrorState::OK);
}

#[test]
fn test_bad_signature_still_parses() {
    let mut bytes = sample_gif();
    bytes[..3].copy_from_slice(b"FIG");
    let decoder = GifDecoder::from_bytes(&bytes).unwrap();
    assert_eq!(decoder.header().unwrap().signature(), "FIG");
    assert!(decoder.test_state(ErrorState::BAD_SIGNATURE));
    assert_eq!(decoder.frames().len(), 2);
}

#[test]
fn test_data_block_too_short() {
    let block = DataBlock::new(5, vec![1, 2, 3, 4]);
    assert_eq!(block.declared_block_size(), 5);
    assert_eq!(block.actual_block_size(), 4);
    assert!(block.test_state(ErrorState::DATA_BLOCK_TOO_SHORT));
}

#[test]
fn test_colour_table_too_short() {
    let table = ColourTable::read_from(&mut Cursor::new(vec![9u8; 12]), 5);
    assert_eq!(table.len(), 5);
    assert_eq!(table[4], Colour::rgba(0, 0, 0, 0));
    assert_ne!(table[3], table[4]);
    assert!(table.test_state(ErrorState::COLOUR_TABLE_TOO_SHORT));
}

#[test]
fn test_every_truncation_is_permissive() {
    let bytes = sample_gif();
    for len in 0..bytes.len() {
        let decoder = GifDecoder::from_bytes(&bytes[..len]).unwrap();
        assert_eq!(decoder.state(), DecoderState::Done);
        assert!(
            decoder.test_state(ErrorState::END_OF_INPUT_STREAM),
            "truncated at {len}: {}",
            decoder.consolidated_state()
        );
        for frame in decoder.frames() {
            let data = frame.image_data().unwrap();
            let descriptor = frame.image_descriptor().unwrap();
            assert_eq!(data.pixel_count(), descriptor.pixel_count());
        }
    }
    let complete = GifDecoder::from_bytes(&bytes).unwrap();
    assert!(complete.consolidated_state().is_ok());
}

#[test]
fn test_garbage_input() {
    let mut state = 0x1234_5678u32;
    let garbage: Vec<u8> = (0..4096)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        })
        .collect();
    let decoder = GifDecoder::from_bytes(&garbage).unwrap();
    assert!(!decoder.consolidated_state().is_ok());
    assert!(decoder.test_state(ErrorState::BAD_SIGNATURE));
}

#[test]
fn test_garbage_after_header() {
    let mut bytes = b"GIF89a".to_vec();
    bytes.extend_from_slice(&[4, 0, 4, 0, 0x80, 0, 0]);
    bytes.extend_from_slice(&[0; 6]);
    bytes.extend_from_slice(&[0x2C, 0, 0, 0, 0, 4, 0, 4, 0, 0, 12, 3, 0xFF, 0xFF, 0xFF, 0]);
    let decoder = GifDecoder::from_bytes(&bytes).unwrap();
    assert!(decoder.test_state(ErrorState::LZW_MINIMUM_CODE_SIZE_TOO_LARGE));
    assert_eq!(decoder.frames().len(), 1);
    assert_eq!(decoder.frames()[0].indexed_pixels(), &[0; 16]);
}

#[test]
fn test_empty_stream() {
    let decoder = GifDecoder::from_bytes(&[]).unwrap();
    assert!(decoder.test_state(ErrorState::END_OF_INPUT_STREAM));
    assert!(decoder.logical_screen_descriptor().is_none());
    assert!(decoder.frames().is_empty());
}

#[test]
fn test_unknown_extension_skipped() {
    let mut bytes = sample_gif();
    // Insert an unknown extension right after the looping extension, before
    // the first graphic control extension.
    let gce = bytes.windows(2).position(|w| w == [0x21, 0xF9]).unwrap();
    let unknown = [0x21, 0x42, 3, b'a', b'b', b'c', 0];
    let tail = bytes.split_off(gce);
    bytes.extend_from_slice(&unknown);
    bytes.extend_from_slice(&tail);
    let decoder = GifDecoder::from_bytes(&bytes).unwrap();
    assert!(decoder.consolidated_state().is_ok());
    assert_eq!(decoder.frames().len(), 2);
}

#[test]
fn test_missing_file() {
    let result = GifDecoder::from_file("/nonexistent/definitely/missing.gif");
    assert!(matches!(result, Err(oxigif::GifError::Io(_))));
}

#[test]
fn test_png_is_not_a_gif() {
    let png = b"\x89PNG\r\n\x1a\n\x00\x00\x00\x0dIHDR\x00\x00\x00\x01\x00\x00\x00\x01\x08\x06\x00\x00\x00";
    let decoder = GifDecoder::from_bytes(png).unwrap();
    assert!(decoder.test_state(ErrorState::BAD_SIGNATURE));
    assert_eq!(decoder.state(), DecoderState::Done);
}

/// Serves `data`, then fails every read.
struct FailingReader {
    data: Cursor<Vec<u8>>,
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.data.read(buf)? {
            0 => Err(io::Error::new(io::ErrorKind::PermissionDenied, "read denied")),
            n => Ok(n),
        }
    }
}

#[test]
fn test_unreadable_stream_is_an_io_error() {
    let result = GifDecoder::from_reader(FailingReader {
        data: Cursor::new(Vec::new()),
    });
    match result {
        Err(oxigif::GifError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::PermissionDenied),
        other => panic!("expected an I/O error, got {other:?}"),
    }
}

#[test]
fn test_read_error_mid_stream() {
    let mut bytes = sample_gif();
    bytes.truncate(bytes.len() / 2);
    let mut decoder = GifDecoder::new();
    let err = decoder
        .decode(FailingReader {
            data: Cursor::new(bytes),
        })
        .unwrap_err();
    assert!(matches!(err, oxigif::GifError::Io(_)));
    assert_eq!(decoder.state(), DecoderState::Done);
    assert!(decoder.header().is_some());
}

#[test]
fn test_oversized_logical_screen_is_not_allocated() {
    // 65535x65535 screen, no global table, then one 1x1 image and a trailer.
    let mut bytes = b"GIF89a".to_vec();
    bytes.extend_from_slice(&[0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0, 0]);
    bytes.extend_from_slice(&[0x2C, 0, 0, 0, 0, 1, 0, 1, 0, 0, 2, 2, 0x44, 0x01, 0, 0x3B]);
    let decoder = GifDecoder::from_bytes(&bytes).unwrap();
    assert!(decoder.test_state(ErrorState::IMAGE_TOO_LARGE));
    assert!(decoder.frames().is_empty());
    assert_eq!(decoder.state(), DecoderState::Done);
}
