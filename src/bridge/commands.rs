//! Direct methods accepted from the cloud

/// Command accepted and executed
pub const STATUS_ACCEPTED: u16 = 202;
/// Command name not recognized
pub const STATUS_REJECTED: u16 = 404;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ToggleOutput1,
    ToggleOutput2,
    DisplayText,
}

impl Command {
    /// Accepts both the device-template names and their kebab-case aliases
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "ToggleLed1" | "toggle-output-1" => Some(Command::ToggleOutput1),
            "ToggleLed2" | "toggle-output-2" => Some(Command::ToggleOutput2),
            "DisplayText" | "display-text" => Some(Command::DisplayText),
            _ => None,
        }
    }
}

/// Inbound command invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    pub request_id: u32,
    pub name: String,
    pub payload: Vec<u8>,
}

impl CommandRequest {
    pub fn new(request_id: u32, name: &str, payload: &[u8]) -> Self {
        Self {
            request_id,
            name: name.to_string(),
            payload: payload.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResponse {
    pub status: u16,
    pub payload: Vec<u8>,
}

impl CommandResponse {
    pub fn accepted() -> Self {
        Self {
            status: STATUS_ACCEPTED,
            payload: Vec::new(),
        }
    }

    pub fn rejected() -> Self {
        Self {
            status: STATUS_REJECTED,
            payload: Vec::new(),
        }
    }
}

/// Local outputs driven by commands
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputState {
    pub output1: bool,
    pub output2: bool,
    pub display_text: String,
}

impl OutputState {
    /// Execute `command`; returns a short description for the log
    pub fn apply(&mut self, command: Command, payload: &[u8]) -> String {
        match command {
            Command::ToggleOutput1 => {
                self.output1 = !self.output1;
                format!("Output 1 {}", on_off(self.output1))
            }
            Command::ToggleOutput2 => {
                self.output2 = !self.output2;
                format!("Output 2 {}", on_off(self.output2))
            }
            Command::DisplayText => {
                self.display_text = strip_enclosing(payload);
                format!("Displaying \"{}\"", self.display_text)
            }
        }
    }
}

fn on_off(state: bool) -> &'static str {
    if state { "on" } else { "off" }
}

/// Drop exactly one leading and one trailing byte (the JSON string quotes)
pub fn strip_enclosing(payload: &[u8]) -> String {
    if payload.len() < 2 {
        return String::new();
    }
    String::from_utf8_lossy(&payload[1..payload.len() - 1]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_names() {
        assert_eq!(Command::parse("ToggleLed1"), Some(Command::ToggleOutput1));
        assert_eq!(Command::parse("toggle-output-2"), Some(Command::ToggleOutput2));
        assert_eq!(Command::parse("display-text"), Some(Command::DisplayText));
        assert_eq!(Command::parse("Reboot"), None);
        assert_eq!(Command::parse("togglefoo"), None);
    }

    #[test]
    fn strip_one_char_each_side() {
        assert_eq!(strip_enclosing(b"\"hello\""), "hello");
        assert_eq!(strip_enclosing(b"\"\"\"\""), "\"\"");
        assert_eq!(strip_enclosing(b"ab"), "");
        assert_eq!(strip_enclosing(b"a"), "");
        assert_eq!(strip_enclosing(b""), "");
    }

    #[test]
    fn toggles_flip() {
        let mut state = OutputState::default();
        assert_eq!(state.apply(Command::ToggleOutput1, b""), "Output 1 on");
        assert_eq!(state.apply(Command::ToggleOutput1, b""), "Output 1 off");
        state.apply(Command::ToggleOutput2, b"");
        assert!(state.output2);
        state.apply(Command::DisplayText, b"\"Hi\"");
        assert_eq!(state.display_text, "Hi");
    }
}
