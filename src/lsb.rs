//! # 最低有效位读写模块
//!
//! 按光栅顺序遍历像素，在每个像素内按 R、G、B 顺序访问通道，
//! 写入或读取每个通道的最低位。

use crate::pixels::PixelBuffer;

/// 将 `byte` 的最低位替换为 `bit`，其余 7 位保持不变。
pub fn replace_lsb(byte: u8, bit: bool) -> u8 {
    (byte & !1) | u8::from(bit)
}

/// 取出 `byte` 的最低位。
pub fn recover_lsb(byte: u8) -> bool {
    byte & 1 == 1
}

/// 将位序列依次写入各通道的最低位，返回新的缓冲区。
///
/// 位序列耗尽后，剩余通道原样复制；多出通道容量的位会被忽略，
/// 容量检查由调用方 (`encode`) 负责。输入缓冲区不会被修改。
pub fn embed<I>(buffer: &PixelBuffer, bits: I) -> PixelBuffer
where
    I: IntoIterator<Item = bool>,
{
    let mut samples = buffer.samples().to_vec();
    samples
        .iter_mut()
        .zip(bits)
        .for_each(|(channel, bit)| *channel = replace_lsb(*channel, bit));
    buffer.with_samples(samples)
}

/// 按写入顺序惰性读取缓冲区中各通道的最低位。
///
/// 迭代器是有限的 (长度为 `capacity_bits`)；重新调用即可从头读取。
pub fn extract(buffer: &PixelBuffer) -> LsbBits<'_> {
    LsbBits {
        samples: buffer.samples(),
        cursor: 0,
    }
}

/// `extract` 返回的位迭代器。
#[derive(Debug, Clone)]
pub struct LsbBits<'a> {
    samples: &'a [u8],
    cursor: usize,
}

impl LsbBits<'_> {
    /// 已经读出的位数。
    pub fn position(&self) -> usize {
        self.cursor
    }
}

impl Iterator for LsbBits<'_> {
    type Item = bool;

    fn next(&mut self) -> Option<bool> {
        let byte = *self.samples.get(self.cursor)?;
        self.cursor += 1;
        Some(recover_lsb(byte))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.samples.len() - self.cursor;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for LsbBits<'_> {}
