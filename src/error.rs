//! Caller-visible failures of the encoding pipeline.
//!
//! There is exactly one way a generation request can fail: the payload does
//! not fit any supported version at the requested error correction level.
//! Everything else that can go wrong (table data, field arithmetic, module
//! bookkeeping) is an implementation defect and is enforced with assertions
//! rather than surfaced as an error value.

use crate::types::EcLevel;

/// Error type for when data exceeds QR code capacity.
///
/// Ways to handle this error include:
///
/// - Decrease the error correction level if it was greater than [`EcLevel::L`].
/// - Shorten the input text or binary data.
/// - Change the text to fit the character set of a denser mode (e.g. alphanumeric).
/// - Propagate the error upward to the caller/user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QrError {
    /// The payload needs more bits than version 40 provides at the requested
    /// error correction level.
    #[error(
        "payload needs {required_bits} bits but version 40 at level {level:?} \
         holds {capacity_bits}"
    )]
    CapacityExceeded {
        /// Bits needed for the payload, including mode indicator and count field.
        required_bits: usize,
        /// Data capacity in bits of version 40 at `level`.
        capacity_bits: usize,
        /// The requested error correction level.
        level: EcLevel,
    },
}
