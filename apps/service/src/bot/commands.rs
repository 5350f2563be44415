/// Chat commands the bot understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Reply with the current status report
    Status,
    /// Reply with the list of commands and the sender's chat id
    Start,
    /// Acknowledge, run a check right away, then reply with the fresh report
    Ping,
}

impl Command {
    /// Match on the command prefix, so `/status@my_bot` and `/status now`
    /// both count. Anything unrecognised is `None`.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();

        if text.starts_with("/status") {
            Some(Command::Status)
        } else if text.starts_with("/start") {
            Some(Command::Start)
        } else if text.starts_with("/ping") {
            Some(Command::Ping)
        } else {
            None
        }
    }
}
