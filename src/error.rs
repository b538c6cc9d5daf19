//! # 错误类型模块
//!
//! 隐写核心返回的所有错误。核心本身不做任何文件 I/O，
//! 因此这里只包含容量、字符范围以及解码帧格式相关的错误。

use thiserror::Error;

/// 隐写核心操作的结果类型别名。
pub type Result<T> = std::result::Result<T, StegoError>;

/// 隐写核心可能产生的错误。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StegoError {
    /// 消息 (加上 32 位长度头部) 超出了图像的最低位容量。
    #[error("Not enough space in the image: required {required} bits, available {available} bits")]
    Capacity { required: u64, available: u64 },

    /// 消息中包含无法用单字节表示的字符。
    #[error("Character {ch:?} at index {index} is outside the single-byte range (U+0000..=U+00FF)")]
    UnrepresentableChar { ch: char, index: usize },

    /// 原始像素数据的长度与图像尺寸不符。
    #[error("Pixel data has {actual} samples, expected {expected}")]
    InvalidBuffer { expected: u64, actual: u64 },

    /// 头部声明的位数超过了图像可提供的位数。
    #[error("Header claims {claimed} bits but the image only holds {available} bits")]
    Exhausted { claimed: u64, available: u64 },

    /// 头部声明的位数小于头部自身的长度。
    #[error("Header claims {claimed} bits, which is shorter than the header itself")]
    MalformedHeader { claimed: u64 },

    /// 载荷位数不是 8 的整数倍。
    #[error("Payload length of {bits} bits is not a whole number of characters")]
    MalformedPayloadLength { bits: u64 },
}
