//! # lsb_text 库
//!
//! 本库包含 LSB 文本隐写工具的核心逻辑：
//! 文本按每字符 8 位展开，加上 32 位大端序长度头部，
//! 依次写入 RGB 图像每个通道的最低位。

// 声明库包含的所有模块。

pub mod bits;
pub mod cli;
pub mod constants;
pub mod error;
pub mod handler;
pub mod lsb;
pub mod pixels;
pub mod steganography;

pub use error::{Result, StegoError};
pub use pixels::{ChannelLayout, PixelBuffer};
pub use steganography::{decode, encode, try_decode};
