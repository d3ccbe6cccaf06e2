use std::fmt::{Debug, Display};

/// Broad category of a [`CropError`], so that callers can react to a failed
/// load differently from a failed export without parsing messages.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The source could not be turned into a bitmap. The session never opened.
    Load,
    /// The crop rectangle was degenerate at confirm time. The session stays open.
    Export,
    /// A session is already open on this editor.
    Busy,
    /// The operation needs an open session and there is none.
    NotOpen,
    /// The output contract was rejected at the call boundary.
    InvalidContract,
    /// Resizing or encoding the final pixels failed.
    Encode,
    /// Reading or writing files outside of image decoding.
    Io,
    /// Malformed command line or interaction script.
    Usage,
}

impl ErrorKind {
    pub fn is_load(&self) -> bool {
        *self == ErrorKind::Load
    }

    pub fn is_export(&self) -> bool {
        *self == ErrorKind::Export
    }
}

pub struct CropError {
    pub kind: ErrorKind,
    pub message: String,
}

impl CropError {
    pub fn new(kind: ErrorKind, message: String) -> Self {
        Self { kind, message }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl Display for CropError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl Debug for CropError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CropError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for CropError {}

#[macro_export]
macro_rules! crop_err {
    ($kind:expr, $($arg:tt)+) => {
        $crate::error::CropError::new(
            $kind,
            format!(
                "cropkit: {} @ {}:{}:{}",
                format_args!($($arg)+),
                file!(),
                line!(),
                column!()
            ),
        )
    };
}

#[macro_export]
macro_rules! load_err {
    ($($arg:tt)+) => {
        $crate::crop_err!($crate::error::ErrorKind::Load, $($arg)+)
    };
}

#[macro_export]
macro_rules! export_err {
    ($($arg:tt)+) => {
        $crate::crop_err!($crate::error::ErrorKind::Export, $($arg)+)
    };
}

/// Like `?`, but wraps any foreign error into a [`CropError`] of the given kind.
#[macro_export]
macro_rules! crop_try {
    ($kind:expr, $expr:expr $(,)?) => {
        match $expr {
            std::result::Result::Ok(val) => val,
            std::result::Result::Err(err) => {
                return std::result::Result::Err($crate::crop_err!($kind, "{}", err));
            }
        }
    };
}
