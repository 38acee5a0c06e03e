pub mod buffer;

pub use buffer::HistoryBuffer;
