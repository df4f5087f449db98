//! Raster buffer - flat RGBA8 pixels

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use super::FillError;

/// One RGBA8 pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    pub const BLACK: Self = Self([0, 0, 0, 255]);
    pub const WHITE: Self = Self([255, 255, 255, 255]);
    pub const TRANSPARENT: Self = Self([0, 0, 0, 0]);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self([r, g, b, a])
    }

    /// Euclidean distance over normalized (0-1) R, G, B, A; ranges 0 - 2.
    pub fn distance(&self, other: &Rgba) -> f32 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| {
                let d = (*a as f32 - *b as f32) / 255.0;
                d * d
            })
            .sum::<f32>()
            .sqrt()
    }
}

/// Flat pixel buffer. `data.len() == width * height * 4` always holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl RasterBuffer {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, FillError> {
        let expected = byte_len(width, height);
        if expected != Some(data.len()) {
            return Err(FillError::InvalidBuffer {
                expected: expected.unwrap_or(usize::MAX),
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Buffer with every pixel set to `color`
    pub fn filled(width: u32, height: u32, color: Rgba) -> Self {
        Self {
            width,
            height,
            data: color.0.repeat(width as usize * height as usize),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        let offset = self.offset(x, y)?;
        let px = &self.data[offset..offset + 4];
        Some(Rgba([px[0], px[1], px[2], px[3]]))
    }

    /// Returns false when (x, y) lies outside the buffer.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgba) -> bool {
        match self.offset(x, y) {
            Some(offset) => {
                self.data[offset..offset + 4].copy_from_slice(&color.0);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.width as i64 && y < self.height as i64
    }

    pub(super) fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * 4)
    }
}

fn byte_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(4)
}

impl From<RgbaImage> for RasterBuffer {
    fn from(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            data: image.into_raw(),
        }
    }
}

impl TryFrom<RasterBuffer> for RgbaImage {
    type Error = FillError;

    fn try_from(buffer: RasterBuffer) -> Result<Self, Self::Error> {
        let actual = buffer.data.len();
        let expected = byte_len(buffer.width, buffer.height).unwrap_or(usize::MAX);
        RgbaImage::from_raw(buffer.width, buffer.height, buffer.data)
            .ok_or(FillError::InvalidBuffer { expected, actual })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_length_checked() {
        assert!(RasterBuffer::new(2, 2, vec![0; 16]).is_ok());
        let err = RasterBuffer::new(2, 2, vec![0; 15]).unwrap_err();
        assert_eq!(
            err,
            FillError::InvalidBuffer {
                expected: 16,
                actual: 15
            }
        );
    }

    #[test]
    fn test_pixel_access() {
        let mut buffer = RasterBuffer::filled(3, 2, Rgba::WHITE);
        assert_eq!(buffer.pixel(2, 1), Some(Rgba::WHITE));
        assert_eq!(buffer.pixel(3, 0), None);

        assert!(buffer.set_pixel(1, 1, Rgba::BLACK));
        assert!(!buffer.set_pixel(0, 2, Rgba::BLACK));
        assert_eq!(buffer.pixel(1, 1), Some(Rgba::BLACK));
        assert_eq!(&buffer.as_bytes()[16..20], &[0, 0, 0, 255]);
    }

    #[test]
    fn test_color_distance() {
        assert_eq!(Rgba::WHITE.distance(&Rgba::WHITE), 0.0);
        assert!((Rgba::WHITE.distance(&Rgba::BLACK) - 3.0_f32.sqrt()).abs() < 1e-6);
        assert!((Rgba::TRANSPARENT.distance(&Rgba::WHITE) - 2.0).abs() < 1e-6);
        let near = Rgba::new(255, 255, 250, 255);
        assert!(Rgba::WHITE.distance(&near) < 0.02);
    }

    #[test]
    fn test_image_round_trip() {
        let mut image = RgbaImage::new(4, 3);
        image.put_pixel(1, 2, image::Rgba([9, 8, 7, 6]));

        let buffer = RasterBuffer::from(image.clone());
        assert_eq!(buffer.width(), 4);
        assert_eq!(buffer.pixel(1, 2), Some(Rgba::new(9, 8, 7, 6)));

        let back = RgbaImage::try_from(buffer).unwrap();
        assert_eq!(back, image);
    }
}
