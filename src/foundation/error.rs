/// Convenience result type used across fxchain.
pub type FxResult<T> = Result<T, FxError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Programmer-error invariants (transform stack underflow/overflow, rendering an
/// uninitialized node) are not represented here: they panic.
#[derive(thiserror::Error, Debug)]
pub enum FxError {
    /// Invalid parameter blocks, frame plans or configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// Malformed Cube LUT data.
    #[error("lut error: {0}")]
    Lut(#[from] LutError),

    /// Cache-level asset failures (unknown entry, refused asset).
    #[error("asset error: {0}")]
    Asset(String),

    /// Failures reported by the GPU device seam.
    #[error("device error: {0}")]
    Device(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FxError {
    /// Build a [`FxError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FxError::Asset`] value.
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build a [`FxError::Device`] value.
    pub fn device(msg: impl Into<String>) -> Self {
        Self::Device(msg.into())
    }
}

/// Reasons a Cube LUT file is rejected.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum LutError {
    /// Neither `LUT_1D_SIZE` nor `LUT_3D_SIZE` was declared.
    #[error("missing LUT_1D_SIZE or LUT_3D_SIZE declaration")]
    MissingSize,

    /// Both `LUT_1D_SIZE` and `LUT_3D_SIZE` were declared.
    #[error("line {line}: both LUT_1D_SIZE and LUT_3D_SIZE declared")]
    ConflictingSize {
        /// 1-based line number of the second declaration.
        line: usize,
    },

    /// Declared size outside the allowed range for its dimension.
    #[error("line {line}: {keyword} {size} outside [{min}, {max}]")]
    SizeOutOfRange {
        /// 1-based line number.
        line: usize,
        /// `LUT_1D_SIZE` or `LUT_3D_SIZE`.
        keyword: &'static str,
        /// Declared size.
        size: u64,
        /// Inclusive lower bound.
        min: u32,
        /// Inclusive upper bound.
        max: u32,
    },

    /// `DOMAIN_MIN` exceeds `DOMAIN_MAX` on some channel.
    #[error("DOMAIN_MIN {min:?} exceeds DOMAIN_MAX {max:?} on channel {channel}")]
    InvertedDomain {
        /// 0 = red, 1 = green, 2 = blue.
        channel: usize,
        /// Declared minimum.
        min: [f32; 3],
        /// Declared maximum.
        max: [f32; 3],
    },

    /// A numeric token could not be parsed.
    #[error("line {line}: malformed number '{token}'")]
    MalformedNumber {
        /// 1-based line number.
        line: usize,
        /// Offending token.
        token: String,
    },

    /// A line had the wrong number of fields.
    #[error("line {line}: expected {expected} values, found {found}")]
    WrongArity {
        /// 1-based line number.
        line: usize,
        /// Expected field count.
        expected: usize,
        /// Actual field count.
        found: usize,
    },

    /// A line exceeded the maximum Cube line length.
    #[error("line {line}: {len} bytes exceeds the {max} byte line limit")]
    LineTooLong {
        /// 1-based line number.
        line: usize,
        /// Line length in bytes.
        len: usize,
        /// Maximum accepted length.
        max: usize,
    },

    /// Table data appeared before the size declaration or a header after the data.
    #[error("line {line}: unexpected '{text}'")]
    Unexpected {
        /// 1-based line number.
        line: usize,
        /// Offending line (trimmed).
        text: String,
    },

    /// Number of table rows does not match the declared size.
    #[error("expected {expected} table entries, found {found}")]
    EntryCount {
        /// `n` or `n³`.
        expected: usize,
        /// Rows actually present.
        found: usize,
    },
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
