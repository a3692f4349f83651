use aggregation_buffer::Aggregation;
use futures::channel::{mpsc::UnboundedSender, oneshot::Sender};
use tracing::debug;

pub enum ReporterMessage {
    /// Report immediately and send the snapshot back.
    Flush(Sender<Aggregation>),
    /// Emit a final report and stop.
    Stop,
}

impl ReporterMessage {
    pub fn send(self, tx: &UnboundedSender<Self>) {
        if tx.unbounded_send(self).is_err() {
            debug!("send to aggregation reporter failed because the receiver was dropped");
        }
    }
}
