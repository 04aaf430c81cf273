/// Structured event ids attached to tracing records as `event = ...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionEvent {
    SessionCreated,
    SessionResumed,
    SessionSaved,
    SessionExpired,
    SessionReset,
    SessionSweepCompleted,
    SessionSweeperStarted,
    SessionSweeperStopped,
    TurnStarted,
    TurnCompleted,
    TurnFailed,
    TurnTimedOut,
    CompletionFailed,
    FallbackSucceeded,
    FallbackFailed,
    AttemptsExhausted,
    ToolDispatched,
    ToolSucceeded,
    ToolFailed,
    ToolUnsupported,
    ToolInvalidArguments,
    GatewayListening,
    GatewayStopped,
    GatewayRequestRejected,
    GatewayRequestTimedOut,
}

impl SessionEvent {
    pub const ALL: [Self; 25] = [
        Self::SessionCreated,
        Self::SessionResumed,
        Self::SessionSaved,
        Self::SessionExpired,
        Self::SessionReset,
        Self::SessionSweepCompleted,
        Self::SessionSweeperStarted,
        Self::SessionSweeperStopped,
        Self::TurnStarted,
        Self::TurnCompleted,
        Self::TurnFailed,
        Self::TurnTimedOut,
        Self::CompletionFailed,
        Self::FallbackSucceeded,
        Self::FallbackFailed,
        Self::AttemptsExhausted,
        Self::ToolDispatched,
        Self::ToolSucceeded,
        Self::ToolFailed,
        Self::ToolUnsupported,
        Self::ToolInvalidArguments,
        Self::GatewayListening,
        Self::GatewayStopped,
        Self::GatewayRequestRejected,
        Self::GatewayRequestTimedOut,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SessionCreated => "session.created",
            Self::SessionResumed => "session.resumed",
            Self::SessionSaved => "session.saved",
            Self::SessionExpired => "session.expired",
            Self::SessionReset => "session.reset",
            Self::SessionSweepCompleted => "session.sweep.completed",
            Self::SessionSweeperStarted => "session.sweeper.started",
            Self::SessionSweeperStopped => "session.sweeper.stopped",
            Self::TurnStarted => "agent.turn.started",
            Self::TurnCompleted => "agent.turn.completed",
            Self::TurnFailed => "agent.turn.failed",
            Self::TurnTimedOut => "agent.turn.timed_out",
            Self::CompletionFailed => "agent.completion.failed",
            Self::FallbackSucceeded => "agent.fallback.succeeded",
            Self::FallbackFailed => "agent.fallback.failed",
            Self::AttemptsExhausted => "agent.attempts.exhausted",
            Self::ToolDispatched => "agent.tool.dispatched",
            Self::ToolSucceeded => "agent.tool.succeeded",
            Self::ToolFailed => "agent.tool.failed",
            Self::ToolUnsupported => "agent.tool.unsupported",
            Self::ToolInvalidArguments => "agent.tool.invalid_arguments",
            Self::GatewayListening => "gateway.listening",
            Self::GatewayStopped => "gateway.stopped",
            Self::GatewayRequestRejected => "gateway.request.rejected",
            Self::GatewayRequestTimedOut => "gateway.request.timed_out",
        }
    }
}
