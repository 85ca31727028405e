//! Typed inputs to the engine.

use std::fmt;

use crate::push::PushMessage;

/// Which producer an input came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalSource {
    Push,
    Poll,
    Resume,
    Sweep,
    Manual,
}

impl fmt::Display for SignalSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SignalSource::Push => "push",
            SignalSource::Poll => "poll",
            SignalSource::Resume => "resume",
            SignalSource::Sweep => "sweep",
            SignalSource::Manual => "manual",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeSource {
    WindowFocus,
    DocumentVisible,
}

impl fmt::Display for ResumeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResumeSource::WindowFocus => f.write_str("window-focus"),
            ResumeSource::DocumentVisible => f.write_str("document-visible"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepKind {
    /// Runs every few minutes while visible.
    General,
    /// Runs more often, but only acts during key hours.
    CriticalHour,
}

impl fmt::Display for SweepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SweepKind::General => f.write_str("general"),
            SweepKind::CriticalHour => f.write_str("critical-hour"),
        }
    }
}

/// Something that may warrant a refresh. Sweeps are generated inside the
/// engine and never arrive as signals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    /// A message from the server-push channel.
    Push(PushMessage),
    /// The server version observed by the version poller.
    VersionReported { version: String },
    /// Focus gained or page became visible.
    Resume(ResumeSource),
    /// Visibility transition. `Visible` also counts as a resume.
    VisibilityChanged(Visibility),
    /// Operator asked for a full refresh.
    ManualRefresh,
}

impl Signal {
    pub fn source(&self) -> SignalSource {
        match self {
            Signal::Push(_) => SignalSource::Push,
            Signal::VersionReported { .. } => SignalSource::Poll,
            Signal::Resume(_) | Signal::VisibilityChanged(_) => SignalSource::Resume,
            Signal::ManualRefresh => SignalSource::Manual,
        }
    }
}
