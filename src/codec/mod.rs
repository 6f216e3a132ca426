//! QR encoding and decoding.
//!
//! The symbol work itself is delegated to `qrcode` (encode) and `rqrr` (decode); this
//! module adapts them to the crate's types:
//!
//! - [`Encode`] / [`QrEncoder`]: text + [`ErrorCorrection`] -> PNG [`Artifact`](crate::models::Artifact)
//! - [`Decode`] / [`QrDecoder`]: [`PixelFrame`] -> [`DecodeOutcome`]
//!
//! Blank input is rejected by [`validate_input`] before any encoder sees it, and a frame
//! without a symbol is [`DecodeOutcome::NotFound`], never an error.

pub mod decoder;
pub mod encoder;
pub mod frame;
pub mod level;

pub use decoder::{Decode, DecodeOutcome, QrDecoder};
pub use encoder::{Encode, EncodedQr, QrEncoder, validate_input};
pub use frame::PixelFrame;
pub use level::ErrorCorrection;
