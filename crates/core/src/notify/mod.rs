pub mod sink;

pub use sink::{ChannelSink, MemorySink, NotificationSink};
