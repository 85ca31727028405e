use freshness::{ResumeSource, Visibility};

/// One line typed on stdin, standing in for host-environment events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCommand {
    Resume(ResumeSource),
    Visibility(Visibility),
    Refresh,
    Status,
    Quit,
}

pub fn parse_command(line: &str) -> Option<HostCommand> {
    let cmd = match line.trim().to_ascii_lowercase().as_str() {
        "focus" => HostCommand::Resume(ResumeSource::WindowFocus),
        "visible" => HostCommand::Visibility(Visibility::Visible),
        "hidden" => HostCommand::Visibility(Visibility::Hidden),
        "refresh" => HostCommand::Refresh,
        "status" => HostCommand::Status,
        "quit" | "exit" => HostCommand::Quit,
        _ => return None,
    };
    Some(cmd)
}
