use serde::{Deserialize, Serialize};

/// Track state enumeration for the track lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TrackState {
    /// Associated with a detection this frame, or newly created
    #[default]
    Active,
    /// Missed between 1 and `max_frames_to_skip` consecutive frames
    Coasting,
    /// Missed too long; removed from the live set
    Retired,
}
