//! # 隐写核心模块
//!
//! 编码：`[32 位大端序总位数][每字符 8 位的载荷]` 依次写入各通道的最低位。
//! 头部的值包含头部自身的 32 位，解码时据此判断何时停止读取。

use crate::bits::{bits_to_string, bits_to_u32, string_to_bits, u32_to_bits};
use crate::constants::{BITS_PER_CHAR, HEADER_BITS};
use crate::error::{Result, StegoError};
use crate::lsb;
use crate::pixels::PixelBuffer;
use log::debug;

/// 嵌入 `message_len` 个字符所需的总位数 (含头部)。
pub fn required_bits(message_len: usize) -> u64 {
    HEADER_BITS as u64 + (message_len as u64) * BITS_PER_CHAR as u64
}

/// 该缓冲区最多能容纳的字符数。
pub fn max_message_len(buffer: &PixelBuffer) -> u64 {
    let usable = buffer.capacity_bits().min(u64::from(u32::MAX));
    usable.saturating_sub(HEADER_BITS as u64) / BITS_PER_CHAR as u64
}

/// 将 `message` 隐藏到 `buffer` 中，返回新的缓冲区。
///
/// 操作是全有或全无的：任何检查失败时都不会产生部分写入的结果。
///
/// # Errors
///
/// * `StegoError::UnrepresentableChar` - 消息包含码点大于 255 的字符。
/// * `StegoError::Capacity` - 消息加头部超出图像容量，或总位数无法用 32 位头部表示。
pub fn encode(buffer: &PixelBuffer, message: &str) -> Result<PixelBuffer> {
    let payload = string_to_bits(message)?;
    let required = required_bits(payload.len() / BITS_PER_CHAR);
    let available = buffer.capacity_bits();

    if required > available {
        return Err(StegoError::Capacity {
            required,
            available,
        });
    }

    let total = u32::try_from(required).map_err(|_| StegoError::Capacity {
        required,
        available: u64::from(u32::MAX),
    })?;

    debug!(
        "Embedding {} bits ({} header + {} payload) into {} available",
        total,
        HEADER_BITS,
        payload.len(),
        available
    );

    let bits = u32_to_bits(total).into_iter().chain(payload);
    Ok(lsb::embed(buffer, bits))
}

/// 从 `buffer` 中恢复隐藏的消息。
///
/// 图像在读到头部声明的位数之前耗尽时返回空字符串；
/// 载荷末尾不足 8 位的部分会被丢弃。该函数不会失败，需要区分这些情况时使用 [`try_decode`]。
pub fn decode(buffer: &PixelBuffer) -> String {
    match read_frame(buffer) {
        Frame::Complete { payload, .. } => bits_to_string(&payload),
        Frame::Exhausted { .. } => String::new(),
    }
}

/// [`decode`] 的严格版本，把无法识别的帧作为错误返回。
///
/// # Errors
///
/// * `StegoError::Exhausted` - 图像中的位数不足以读完头部或头部声明的长度。
/// * `StegoError::MalformedHeader` - 头部的值小于 32。
/// * `StegoError::MalformedPayloadLength` - 载荷位数不是 8 的整数倍。
pub fn try_decode(buffer: &PixelBuffer) -> Result<String> {
    match read_frame(buffer) {
        Frame::Exhausted { claimed } => Err(StegoError::Exhausted {
            claimed: claimed.unwrap_or(HEADER_BITS as u64),
            available: buffer.capacity_bits(),
        }),
        Frame::Complete { claimed, .. } if claimed < HEADER_BITS as u64 => {
            Err(StegoError::MalformedHeader { claimed })
        }
        Frame::Complete { payload, .. } if payload.len() % BITS_PER_CHAR != 0 => {
            Err(StegoError::MalformedPayloadLength {
                bits: payload.len() as u64,
            })
        }
        Frame::Complete { payload, .. } => Ok(bits_to_string(&payload)),
    }
}

/// 解码状态机的状态。
#[derive(Debug, Clone, Copy)]
enum DecodeState {
    ReadingHeader,
    ReadingPayload { total: u64 },
}

/// 读帧的结果。
enum Frame {
    /// 已读到头部声明的位数。
    Complete { claimed: u64, payload: Vec<bool> },
    /// 图像耗尽；`claimed` 为 `None` 表示连头部都没有读完。
    Exhausted { claimed: Option<u64> },
}

fn read_frame(buffer: &PixelBuffer) -> Frame {
    let mut bits = lsb::extract(buffer);
    let mut accumulator: Vec<bool> = Vec::with_capacity(HEADER_BITS);
    let mut state = DecodeState::ReadingHeader;

    loop {
        match state {
            DecodeState::ReadingHeader if accumulator.len() == HEADER_BITS => {
                let total = u64::from(bits_to_u32(&accumulator));
                debug!("Header claims {} bits", total);
                accumulator.clear();
                let remaining = total.saturating_sub(HEADER_BITS as u64);
                accumulator.reserve(remaining.min(bits.len() as u64) as usize);
                state = DecodeState::ReadingPayload { total };
            }
            DecodeState::ReadingHeader => match bits.next() {
                Some(bit) => accumulator.push(bit),
                None => {
                    debug!("Image exhausted before the header was complete");
                    return Frame::Exhausted { claimed: None };
                }
            },
            DecodeState::ReadingPayload { total } if bits.position() as u64 >= total => {
                return Frame::Complete {
                    claimed: total,
                    payload: accumulator,
                };
            }
            DecodeState::ReadingPayload { total } => match bits.next() {
                Some(bit) => accumulator.push(bit),
                None => {
                    debug!(
                        "Image exhausted after {} of {} claimed bits",
                        bits.position(),
                        total
                    );
                    return Frame::Exhausted {
                        claimed: Some(total),
                    };
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_value(buffer: &PixelBuffer) -> u32 {
        let bits: Vec<bool> = lsb::extract(buffer).take(HEADER_BITS).collect();
        bits_to_u32(&bits)
    }

    /// 用给定的头部值和载荷位构造缓冲区。
    fn framed(width: u32, height: u32, header: u32, payload: &[bool]) -> PixelBuffer {
        let cover = PixelBuffer::filled(width, height, 0x80);
        let bits = u32_to_bits(header).into_iter().chain(payload.iter().copied());
        lsb::embed(&cover, bits)
    }

    #[test]
    fn single_char_in_4x4_image() {
        let cover = PixelBuffer::filled(4, 4, 0xAA);
        let stego = encode(&cover, "A").unwrap();

        assert_eq!(header_value(&stego), 40);
        let payload: Vec<bool> = lsb::extract(&stego).skip(32).take(8).collect();
        assert_eq!(
            payload,
            vec![false, true, false, false, false, false, false, true]
        );
        // 第 40 位之后的通道保持不变
        assert_eq!(&stego.samples()[40..], &cover.samples()[40..]);
        assert_eq!(decode(&stego), "A");
        assert_eq!(try_decode(&stego).unwrap(), "A");
    }

    #[test]
    fn tiny_image_cannot_hold_even_an_empty_message() {
        let cover = PixelBuffer::filled(2, 2, 0);
        assert_eq!(
            encode(&cover, "").unwrap_err(),
            StegoError::Capacity {
                required: 32,
                available: 12
            }
        );
        assert!(matches!(
            encode(&cover, "x"),
            Err(StegoError::Capacity { .. })
        ));
    }

    #[test]
    fn capacity_boundary_is_inclusive() {
        // 5x4 像素 = 60 位 = 32 + 8 * 3 + 4
        let cover = PixelBuffer::filled(5, 4, 7);
        assert_eq!(max_message_len(&cover), 3);

        let stego = encode(&cover, "abc").unwrap();
        assert_eq!(decode(&stego), "abc");

        // 4x4 像素 = 48 位，恰好容纳 2 个字符
        let exact = PixelBuffer::filled(4, 4, 7);
        assert_eq!(required_bits(2), exact.capacity_bits());
        assert_eq!(decode(&encode(&exact, "hi").unwrap()), "hi");
        assert_eq!(
            encode(&exact, "hi!").unwrap_err(),
            StegoError::Capacity {
                required: 56,
                available: 48
            }
        );
    }

    #[test]
    fn empty_message_round_trips() {
        let cover = PixelBuffer::filled(3, 4, 0xFF);
        let stego = encode(&cover, "").unwrap();
        assert_eq!(header_value(&stego), 32);
        assert_eq!(decode(&stego), "");
        assert_eq!(try_decode(&stego).unwrap(), "");
    }

    #[test]
    fn unrepresentable_char_fails_before_capacity_check() {
        let cover = PixelBuffer::filled(1, 1, 0);
        assert_eq!(
            encode(&cover, "€").unwrap_err(),
            StegoError::UnrepresentableChar { ch: '€', index: 0 }
        );
    }

    #[test]
    fn exhausted_image_decodes_to_empty_string() {
        // 头部声明 1000 位，但图像只有 60 位
        let stego = framed(5, 4, 1000, &[true; 8]);
        assert_eq!(decode(&stego), "");
        assert_eq!(
            try_decode(&stego).unwrap_err(),
            StegoError::Exhausted {
                claimed: 1000,
                available: 60
            }
        );
    }

    #[test]
    fn image_smaller_than_header_decodes_to_empty_string() {
        let cover = PixelBuffer::filled(2, 2, 0xFF);
        assert_eq!(decode(&cover), "");
        assert_eq!(
            try_decode(&cover).unwrap_err(),
            StegoError::Exhausted {
                claimed: 32,
                available: 12
            }
        );
    }

    #[test]
    fn header_shorter_than_itself_stops_immediately() {
        let stego = framed(4, 4, 5, &[true; 8]);
        assert_eq!(decode(&stego), "");
        assert_eq!(
            try_decode(&stego).unwrap_err(),
            StegoError::MalformedHeader { claimed: 5 }
        );
    }

    #[test]
    fn partial_payload_is_truncated() {
        // 'A' 的 8 位加 3 位多余数据
        let payload = [false, true, false, false, false, false, false, true, true, true, true];
        let stego = framed(5, 4, 43, &payload);
        assert_eq!(decode(&stego), "A");
        assert_eq!(
            try_decode(&stego).unwrap_err(),
            StegoError::MalformedPayloadLength { bits: 11 }
        );
    }

    #[test]
    fn decode_stops_at_claimed_length() {
        let cover = PixelBuffer::filled(10, 10, 0);
        let stego = encode(&cover, "ok").unwrap();
        // 在载荷之后写入干扰位，不应影响结果
        let mut samples = stego.samples().to_vec();
        samples[48..].iter_mut().for_each(|b| *b |= 1);
        let noisy = PixelBuffer::new(10, 10, samples).unwrap();
        assert_eq!(decode(&noisy), "ok");
    }
}
