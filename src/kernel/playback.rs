use serde::{Deserialize, Serialize};

/// Lifecycle of a presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlaybackMode {
    /// Mounted, nothing started yet.
    #[default]
    Idle,
    /// Advancing on the segment timer, audio bound to the current segment.
    Playing,
    /// Timer and audio suspended, position retained.
    Paused,
    /// Ran past the last segment without looping.
    Ended,
}

/// Requests that may move the playback mode. The graph decides; callers never set modes directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackRequest {
    Start,
    TogglePlayPause,
    Navigate,
    AutoAdvance,
    Finish,
    Restart,
}

pub struct PlaybackGraph;

impl PlaybackGraph {
    /// Pure function: (Current Mode, Request) -> New Mode.
    /// Returns None when the request is not valid from `current` (callers treat that as a no-op).
    pub fn transition(current: PlaybackMode, request: PlaybackRequest) -> Option<PlaybackMode> {
        use PlaybackMode::*;
        use PlaybackRequest::*;

        match (current, request) {
            (Idle, Start) | (Idle, TogglePlayPause) => Some(Playing),

            (Playing, TogglePlayPause) => Some(Paused),
            (Paused, TogglePlayPause) => Some(Playing),
            // A finished presentation plays again from the top.
            (Ended, TogglePlayPause) => Some(Playing),

            (Playing, Navigate) => Some(Playing),
            (Paused, Navigate) => Some(Paused),
            (Ended, Navigate) => Some(Paused),

            (Playing, AutoAdvance) => Some(Playing),
            (Playing, Finish) => Some(Ended),

            // Rewinds to Idle; the controller starts again from there.
            (_, Restart) => Some(Idle),

            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PlaybackMode::*;
    use PlaybackRequest::*;

    #[test]
    fn start_only_from_idle() {
        assert_eq!(PlaybackGraph::transition(Idle, Start), Some(Playing));
        assert_eq!(PlaybackGraph::transition(Playing, Start), None);
        assert_eq!(PlaybackGraph::transition(Paused, Start), None);
        assert_eq!(PlaybackGraph::transition(Ended, Start), None);
    }

    #[test]
    fn toggle_cycle() {
        assert_eq!(PlaybackGraph::transition(Idle, TogglePlayPause), Some(Playing));
        assert_eq!(PlaybackGraph::transition(Playing, TogglePlayPause), Some(Paused));
        assert_eq!(PlaybackGraph::transition(Paused, TogglePlayPause), Some(Playing));
    }

    #[test]
    fn navigation_needs_a_started_presentation() {
        assert_eq!(PlaybackGraph::transition(Idle, Navigate), None);
        assert_eq!(PlaybackGraph::transition(Ended, Navigate), Some(Paused));
    }

    #[test]
    fn timer_only_acts_while_playing() {
        assert_eq!(PlaybackGraph::transition(Paused, AutoAdvance), None);
        assert_eq!(PlaybackGraph::transition(Paused, Finish), None);
        assert_eq!(PlaybackGraph::transition(Playing, Finish), Some(Ended));
    }

    #[test]
    fn restart_from_anywhere() {
        for mode in [Idle, Playing, Paused, Ended] {
            assert_eq!(PlaybackGraph::transition(mode, Restart), Some(Idle));
        }
    }
}
