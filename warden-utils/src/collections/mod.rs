//! Fixed-size collection types.

mod ring_buffer;

pub use ring_buffer::RingBuffer;
