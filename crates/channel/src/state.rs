//! Channel bootstrap lifecycle.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An operation performed while bootstrapping a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BootstrapStep {
    /// Enroll organization identities against their CA.
    Enroll,
    /// Build ordering node handles and pick the anchor.
    SelectAnchor,
    /// Load the genesis configuration and have it signed.
    SignGenesis,
    /// Create the channel and join every configured peer.
    JoinPeers,
    /// Attach the non-anchor ordering nodes.
    AttachOrderers,
    /// Attach every configured event hub.
    AttachEventHubs,
    /// Initialize the channel.
    Initialize,
    /// Tear the channel down.
    Shutdown,
}

impl BootstrapStep {
    /// The state a channel must be in for this step to run, if the step is
    /// part of the bootstrap sequence.
    pub fn required_state(&self) -> Option<ChannelState> {
        match self {
            Self::SelectAnchor => Some(ChannelState::Created),
            Self::SignGenesis => Some(ChannelState::AnchorSelected),
            Self::JoinPeers => Some(ChannelState::GenesisSigned),
            Self::AttachOrderers => Some(ChannelState::PeersJoined),
            Self::AttachEventHubs => Some(ChannelState::OrderersAttached),
            Self::Initialize => Some(ChannelState::EventHubsAttached),
            Self::Enroll | Self::Shutdown => None,
        }
    }
}

impl fmt::Display for BootstrapStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Enroll => "enroll",
            Self::SelectAnchor => "select anchor",
            Self::SignGenesis => "sign genesis",
            Self::JoinPeers => "join peers",
            Self::AttachOrderers => "attach orderers",
            Self::AttachEventHubs => "attach event hubs",
            Self::Initialize => "initialize",
            Self::Shutdown => "shutdown",
        };
        f.write_str(name)
    }
}

/// Lifecycle state of a channel under construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelState {
    Created,
    AnchorSelected,
    GenesisSigned,
    PeersJoined,
    OrderersAttached,
    EventHubsAttached,
    Initialized,
    ShutDown,
    /// A step failed; the channel keeps whatever completed before it.
    Failed {
        step: BootstrapStep,
        reason: String,
    },
}

impl ChannelState {
    /// Whether no further bootstrap step can run.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Initialized | Self::ShutDown | Self::Failed { .. }
        )
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

impl fmt::Display for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::AnchorSelected => write!(f, "anchor selected"),
            Self::GenesisSigned => write!(f, "genesis signed"),
            Self::PeersJoined => write!(f, "peers joined"),
            Self::OrderersAttached => write!(f, "orderers attached"),
            Self::EventHubsAttached => write!(f, "event hubs attached"),
            Self::Initialized => write!(f, "initialized"),
            Self::ShutDown => write!(f, "shut down"),
            Self::Failed { step, reason } => write!(f, "failed at {step}: {reason}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_follow_state_order() {
        let sequence = [
            BootstrapStep::SelectAnchor,
            BootstrapStep::SignGenesis,
            BootstrapStep::JoinPeers,
            BootstrapStep::AttachOrderers,
            BootstrapStep::AttachEventHubs,
            BootstrapStep::Initialize,
        ];
        let states = [
            ChannelState::Created,
            ChannelState::AnchorSelected,
            ChannelState::GenesisSigned,
            ChannelState::PeersJoined,
            ChannelState::OrderersAttached,
            ChannelState::EventHubsAttached,
        ];
        for (step, state) in sequence.iter().zip(states) {
            assert_eq!(step.required_state(), Some(state));
        }
        assert_eq!(BootstrapStep::Shutdown.required_state(), None);
    }

    #[test]
    fn test_terminal_states() {
        assert!(ChannelState::Initialized.is_terminal());
        assert!(ChannelState::ShutDown.is_terminal());
        assert!(!ChannelState::PeersJoined.is_terminal());

        let failed = ChannelState::Failed {
            step: BootstrapStep::JoinPeers,
            reason: "boom".to_string(),
        };
        assert!(failed.is_terminal());
        assert_eq!(failed.to_string(), "failed at join peers: boom");
    }
}
