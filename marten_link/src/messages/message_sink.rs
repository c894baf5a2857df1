use super::OutboundMessage;

/// Trait describing an object to which a server protocol message can be sent
pub trait MessageSink {
    /// Send a protocol message to this sink
    fn send(&self, msg: OutboundMessage);

    /// Ask the transport to close the connection once pending output has
    /// been flushed
    fn close(&self);
}
