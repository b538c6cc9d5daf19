/// 长度头部占用的位数。
/// 头部以大端序 `u32` 存储嵌入的总位数 (包括头部自身的 32 位)。
pub const HEADER_BITS: usize = 32;

/// 每个消息字符占用的位数。
/// 每个字符按单字节 (码点 0-255) 处理，高位在前。
pub const BITS_PER_CHAR: usize = 8;

/// 可编码字符的最大码点 (Latin-1 范围)。
pub const MAX_CODE_POINT: u32 = 0xFF;

/// 未指定输出路径时，隐写图像文件名的前缀。
pub const STEGO_PREFIX: &str = "stego_";

/// 未指定输出路径时，隐写图像使用的扩展名。
/// BMP 为无压缩格式，可以原样保留每个通道的最低位。
pub const STEGO_EXTENSION: &str = "bmp";

/// 未指定输出路径时，恢复文本文件名的前缀。
pub const RECOVERED_PREFIX: &str = "recovered_";
