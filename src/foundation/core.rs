use crate::foundation::error::{SheetError, SheetResult};

/// One straight-alpha RGBA8 pixel.
pub type Rgba8 = [u8; 4];

pub(crate) const TRANSPARENT: Rgba8 = [0, 0, 0, 0];

/// A fixed-size RGBA8 pixel grid.
///
/// Pixels are tightly packed, row-major, and keep whatever alpha the producer supplied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bitmap {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA8 bytes, `width * height * 4` long.
    pub data: Vec<u8>,
}

impl Bitmap {
    /// Fully transparent bitmap.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, TRANSPARENT)
    }

    /// Bitmap with every pixel set to `rgba`.
    pub fn filled(width: u32, height: u32, rgba: Rgba8) -> Self {
        let pixels = (width as usize) * (height as usize);
        Self {
            width,
            height,
            data: rgba.repeat(pixels),
        }
    }

    /// Wrap an existing RGBA8 buffer, checking it matches `width * height * 4`.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> SheetResult<Self> {
        let expected = rgba_len(width, height)?;
        if data.len() != expected {
            return Err(SheetError::container(format!(
                "rgba buffer is {} bytes, expected {expected} for {width}x{height}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn fill(&mut self, rgba: Rgba8) {
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        Some([
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ])
    }

    pub fn has_same_size(&self, other: &Bitmap) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Copy into an `image` buffer for resampling.
    pub fn to_rgba_image(&self) -> SheetResult<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.data.clone()).ok_or_else(|| {
            SheetError::container(format!(
                "bitmap buffer is {} bytes, expected {}x{} rgba8",
                self.data.len(),
                self.width,
                self.height
            ))
        })
    }
}

impl From<image::RgbaImage> for Bitmap {
    fn from(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            data: img.into_raw(),
        }
    }
}

pub(crate) fn rgba_len(width: u32, height: u32) -> SheetResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| SheetError::container(format!("bitmap size overflow ({width}x{height})")))
}
