//! # 像素缓冲区模块
//!
//! 定义隐写核心所操作的像素数据。像素按光栅顺序 (自上而下、自左向右) 存放，
//! 每个像素由 `ChannelLayout` 描述的若干个 8 位通道组成。

use crate::error::{Result, StegoError};
use image::RgbImage;

/// 像素的通道布局描述。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelLayout {
    /// 每个像素的通道数。
    pub channels: usize,
    /// 每个通道的位深。
    pub bits_per_channel: u8,
}

impl ChannelLayout {
    /// 三个 8 位通道 (R, G, B)。
    pub const RGB8: ChannelLayout = ChannelLayout {
        channels: 3,
        bits_per_channel: 8,
    };

    /// `width * height` 个像素共有的通道数。
    pub fn sample_count(&self, width: u32, height: u32) -> u64 {
        u64::from(width) * u64::from(height) * self.channels as u64
    }
}

/// 不可变尺寸的像素缓冲区。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    layout: ChannelLayout,
    samples: Vec<u8>,
}

impl PixelBuffer {
    /// 由原始 RGB 采样创建缓冲区。
    ///
    /// # Errors
    ///
    /// 如果 `samples` 的长度不等于 `width * height * 3`，返回 `StegoError::InvalidBuffer`。
    pub fn new(width: u32, height: u32, samples: Vec<u8>) -> Result<Self> {
        let layout = ChannelLayout::RGB8;
        let expected = layout.sample_count(width, height);
        let actual = samples.len() as u64;
        if expected != actual {
            return Err(StegoError::InvalidBuffer { expected, actual });
        }

        Ok(Self {
            width,
            height,
            layout,
            samples,
        })
    }

    /// 创建一个所有通道都为 `value` 的缓冲区。
    pub fn filled(width: u32, height: u32, value: u8) -> Self {
        let layout = ChannelLayout::RGB8;
        let len = layout.sample_count(width, height) as usize;
        Self {
            width,
            height,
            layout,
            samples: vec![value; len],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }

    /// 按光栅顺序排列的全部通道值。
    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    /// 返回 `(x, y)` 处像素的通道切片，越界时返回 `None`。
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let channels = self.layout.channels;
        let start = (y as usize * self.width as usize + x as usize) * channels;
        self.samples.get(start..start + channels)
    }

    /// 可用于隐写的最低位总数，即 `通道数 * 宽 * 高`，每个通道贡献一位。
    pub fn capacity_bits(&self) -> u64 {
        self.layout.sample_count(self.width, self.height)
    }

    /// 用新的通道值构造一个同尺寸、同布局的缓冲区。
    ///
    /// # Panics
    ///
    /// `samples` 的长度与当前缓冲区不同时 panic。
    pub(crate) fn with_samples(&self, samples: Vec<u8>) -> Self {
        assert_eq!(
            samples.len(),
            self.samples.len(),
            "replacement samples must keep the buffer dimensions"
        );
        Self {
            width: self.width,
            height: self.height,
            layout: self.layout,
            samples,
        }
    }
}

impl From<RgbImage> for PixelBuffer {
    fn from(image: RgbImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            layout: ChannelLayout::RGB8,
            samples: image.into_raw(),
        }
    }
}

impl From<PixelBuffer> for RgbImage {
    fn from(buffer: PixelBuffer) -> Self {
        let PixelBuffer {
            width,
            height,
            samples,
            ..
        } = buffer;
        RgbImage::from_raw(width, height, samples)
            .expect("PixelBuffer always holds width * height * 3 samples")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_mismatched_sample_count() {
        let err = PixelBuffer::new(2, 2, vec![0; 11]).unwrap_err();
        assert_eq!(
            err,
            StegoError::InvalidBuffer {
                expected: 12,
                actual: 11
            }
        );
    }

    #[test]
    fn pixel_reads_raster_order() {
        let samples: Vec<u8> = (0..12).collect();
        let buffer = PixelBuffer::new(2, 2, samples).unwrap();

        assert_eq!(buffer.pixel(0, 0), Some(&[0, 1, 2][..]));
        assert_eq!(buffer.pixel(1, 0), Some(&[3, 4, 5][..]));
        assert_eq!(buffer.pixel(0, 1), Some(&[6, 7, 8][..]));
        assert_eq!(buffer.pixel(2, 0), None);
        assert_eq!(buffer.capacity_bits(), 12);
    }

    #[test]
    fn capacity_follows_the_layout() {
        let buffer = PixelBuffer::filled(7, 5, 0);
        assert_eq!(buffer.layout(), ChannelLayout::RGB8);
        assert_eq!(buffer.layout().bits_per_channel, 8);
        assert_eq!(buffer.capacity_bits(), 7 * 5 * 3);
        assert_eq!(buffer.samples().len() as u64, buffer.capacity_bits());
    }

    #[test]
    #[should_panic(expected = "replacement samples must keep the buffer dimensions")]
    fn with_samples_rejects_a_different_length() {
        let buffer = PixelBuffer::filled(2, 2, 0);
        let _ = buffer.with_samples(vec![0; 5]);
    }

    #[test]
    fn converts_to_and_from_rgb_image() {
        let samples: Vec<u8> = (0..18).collect();
        let buffer = PixelBuffer::new(3, 2, samples.clone()).unwrap();

        let image: RgbImage = buffer.clone().into();
        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(image.get_pixel(1, 1).0, [12, 13, 14]);

        assert_eq!(PixelBuffer::from(image), buffer);
    }
}
