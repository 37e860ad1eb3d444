//! ### English
//! Cache-line padding used to keep producer-written and consumer-written atomics apart.
//!
//! ### 中文
//! cache line 填充工具，用于隔离生产者写入与消费者写入的原子字段。

/// ### English
/// Cache line size the ring metadata is laid out for (bytes).
///
/// ### 中文
/// 环元数据布局所针对的 cache line 大小（字节）。
pub(crate) const CACHE_LINE_BYTES: usize = 64;

/// ### English
/// Padding needed after `bytes_used` bytes to reach the next cache-line boundary.
///
/// ### 中文
/// 在已占用 `bytes_used` 字节后推进到下一个 cache line 边界所需的填充字节数。
#[inline]
pub(crate) const fn pad_to_cache_line(bytes_used: usize) -> usize {
    let rem = bytes_used % CACHE_LINE_BYTES;
    if rem == 0 { 0 } else { CACHE_LINE_BYTES - rem }
}

/// ### English
/// Padding needed after two fields (`A` then `B`) to reach the next cache line.
///
/// ### 中文
/// 两个字段（先 `A` 后 `B`）之后推进到下一个 cache line 所需的填充字节数。
#[inline]
pub(crate) const fn pad_after2<A, B>() -> usize {
    pad_to_cache_line(std::mem::size_of::<A>() + std::mem::size_of::<B>())
}
