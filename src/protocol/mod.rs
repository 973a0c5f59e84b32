//! Protocol module - wire format, framing, and frame types.
//!
//! This module implements the native messaging framing:
//! - 4-byte little-endian length header encoding/decoding
//! - Frame buffer for accumulating partial reads
//! - Frame struct and frame building

mod frame;
mod frame_buffer;
mod wire_format;

pub use frame::{build_frame, Frame};
pub use frame_buffer::FrameBuffer;
pub use wire_format::{Header, DEFAULT_MAX_MESSAGE_SIZE, HEADER_SIZE, MAX_OUTBOUND_MESSAGE_SIZE};
