pub type SheetResult<T> = Result<T, SheetError>;

#[derive(thiserror::Error, Debug)]
pub enum SheetError {
    /// A single frame could not be decoded by the frame source.
    #[error("decode error at frame {frame}: {message}")]
    Decode { frame: usize, message: String },

    /// The container itself could not be read (header, stream, palette).
    #[error("decode error: {0}")]
    Container(String),

    #[error("empty frame selection: frame_skip={stride} left no frames out of {frame_count}")]
    EmptySelection { stride: u32, frame_count: usize },

    #[error("invalid config `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("sprite sheet build was cancelled")]
    Cancelled,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SheetError {
    pub fn decode(frame: usize, msg: impl Into<String>) -> Self {
        Self::Decode {
            frame,
            message: msg.into(),
        }
    }

    pub fn container(msg: impl Into<String>) -> Self {
        Self::Container(msg.into())
    }

    pub fn invalid_config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}
