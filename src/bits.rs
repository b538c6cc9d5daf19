//! # 位编解码模块
//!
//! 在文本与位序列之间转换。位序列用 `bool` 表示，高位在前 (大端序)。

use crate::constants::{BITS_PER_CHAR, HEADER_BITS, MAX_CODE_POINT};
use crate::error::{Result, StegoError};

/// 将文本转换为位序列，每个字符占 8 位，高位在前。
///
/// 结果长度总是 `8 * 字符数`。
///
/// # Errors
///
/// 如果某个字符的码点大于 255，返回 `StegoError::UnrepresentableChar`。
pub fn string_to_bits(text: &str) -> Result<Vec<bool>> {
    let mut bits = Vec::with_capacity(text.len() * BITS_PER_CHAR);
    for (index, ch) in text.chars().enumerate() {
        let code = u32::from(ch);
        if code > MAX_CODE_POINT {
            return Err(StegoError::UnrepresentableChar { ch, index });
        }
        bits.extend(byte_to_bits(code as u8));
    }
    Ok(bits)
}

/// 将位序列按 8 位一组还原为文本，每组对应一个码点为 0-255 的字符。
///
/// 调用方需保证 `bits.len()` 为 8 的整数倍；末尾不足 8 位的部分会被丢弃。
pub fn bits_to_string(bits: &[bool]) -> String {
    bits.chunks_exact(BITS_PER_CHAR)
        .map(|group| char::from(bits_to_byte(group)))
        .collect()
}

/// 32 位大端序的长度头部。
pub fn u32_to_bits(value: u32) -> [bool; HEADER_BITS] {
    std::array::from_fn(|i| (value >> (HEADER_BITS - 1 - i)) & 1 == 1)
}

/// 将最多 32 位按大端序解释为无符号整数。
pub fn bits_to_u32(bits: &[bool]) -> u32 {
    bits.iter()
        .take(HEADER_BITS)
        .fold(0, |acc, &bit| (acc << 1) | u32::from(bit))
}

fn byte_to_bits(byte: u8) -> impl Iterator<Item = bool> {
    (0..BITS_PER_CHAR).rev().map(move |shift| (byte >> shift) & 1 == 1)
}

fn bits_to_byte(bits: &[bool]) -> u8 {
    bits.iter().fold(0, |acc, &bit| (acc << 1) | u8::from(bit))
}
