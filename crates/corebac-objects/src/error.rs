use corebac_core::types::{AbortReason, ErrorClass, ErrorCode};
use corebac_core::{DecodeError, EncodeError};
use thiserror::Error;

/// Failure of a property read or write, carrying enough to answer the
/// remote peer with either an Error PDU or an Abort PDU.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PropertyError {
    #[error("unknown object")]
    UnknownObject,
    #[error("unknown property")]
    UnknownProperty,
    #[error("property is not an array")]
    PropertyIsNotAnArray,
    #[error("invalid array index")]
    InvalidArrayIndex,
    #[error("invalid data type")]
    InvalidDataType,
    #[error("value out of range")]
    ValueOutOfRange,
    #[error("write access denied")]
    WriteAccessDenied,
    #[error("response requires segmentation")]
    SegmentationNotSupported,
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),
}

impl PropertyError {
    /// The `(error class, error code)` pair an Error PDU reports, or
    /// `None` when the failure is an abort instead.
    pub fn error_class_code(&self) -> Option<(ErrorClass, ErrorCode)> {
        let pair = match self {
            Self::UnknownObject => (ErrorClass::Object, ErrorCode::UnknownObject),
            Self::UnknownProperty => (ErrorClass::Property, ErrorCode::UnknownProperty),
            Self::PropertyIsNotAnArray => (ErrorClass::Property, ErrorCode::PropertyIsNotAnArray),
            Self::InvalidArrayIndex => (ErrorClass::Property, ErrorCode::InvalidArrayIndex),
            Self::InvalidDataType => (ErrorClass::Property, ErrorCode::InvalidDataType),
            Self::ValueOutOfRange => (ErrorClass::Property, ErrorCode::ValueOutOfRange),
            Self::WriteAccessDenied => (ErrorClass::Property, ErrorCode::WriteAccessDenied),
            // Malformed request data reads back as a range failure, the
            // way fielded stacks answer undecodable writes.
            Self::Decode(_) => (ErrorClass::Property, ErrorCode::ValueOutOfRange),
            Self::Encode(_) => (ErrorClass::Resources, ErrorCode::Other),
            Self::SegmentationNotSupported => return None,
        };
        Some(pair)
    }

    /// The abort reason, when this failure aborts the transaction.
    pub fn abort_reason(&self) -> Option<AbortReason> {
        match self {
            Self::SegmentationNotSupported => Some(AbortReason::SegmentationNotSupported),
            _ => None,
        }
    }

    /// Translates a decode failure from request data into the error the
    /// peer sees: tag disagreements are type errors, everything else is a
    /// range failure.
    pub(crate) fn from_write_decode(err: DecodeError) -> Self {
        match err {
            DecodeError::TypeMismatch => Self::InvalidDataType,
            _ => Self::ValueOutOfRange,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PropertyError;
    use corebac_core::types::{AbortReason, ErrorClass, ErrorCode};

    #[test]
    fn errors_translate_to_class_code_pairs() {
        assert_eq!(
            PropertyError::UnknownProperty.error_class_code(),
            Some((ErrorClass::Property, ErrorCode::UnknownProperty))
        );
        assert_eq!(
            PropertyError::WriteAccessDenied.error_class_code(),
            Some((ErrorClass::Property, ErrorCode::WriteAccessDenied))
        );
    }

    #[test]
    fn segmentation_failure_is_an_abort_not_an_error() {
        let err = PropertyError::SegmentationNotSupported;
        assert_eq!(err.error_class_code(), None);
        assert_eq!(err.abort_reason(), Some(AbortReason::SegmentationNotSupported));
    }
}
