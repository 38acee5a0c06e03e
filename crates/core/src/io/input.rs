use tokio::sync::mpsc;

/// User action delivered to the runtime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Restore the battery to 100%.
    Recharge,
    /// Commit a new low-battery threshold.
    SetThreshold(f64),
}

/// Command channel sender: the UI pushes actions here.
pub type CommandSender = mpsc::Sender<Command>;
/// Command channel receiver: the runtime consumes from here.
pub type CommandReceiver = mpsc::Receiver<Command>;

/// Create a command channel with the given buffer size.
pub fn channel(buffer: usize) -> (CommandSender, CommandReceiver) {
    mpsc::channel(buffer)
}

/// Request a full recharge.
pub async fn submit_recharge(tx: &CommandSender) -> Result<(), mpsc::error::SendError<Command>> {
    tx.send(Command::Recharge).await
}

/// Commit a threshold value.
pub async fn submit_threshold(
    tx: &CommandSender,
    threshold: f64,
) -> Result<(), mpsc::error::SendError<Command>> {
    tx.send(Command::SetThreshold(threshold)).await
}
