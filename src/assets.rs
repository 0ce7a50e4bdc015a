mod decode;

pub use decode::GifFrameSource;
