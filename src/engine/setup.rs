/// One step of the per-session setup protocol, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SetupStep {
    /// Push the stored volume into the widget.
    SeedVolume,
    /// Jump to the page's requested start time, if any.
    SeekToStart,
    /// Pause before any quality work. Changing quality on a playing widget
    /// restarts the video from the beginning.
    Pause,
    /// Must follow `SeedVolume`, or the seed is reported back as a change.
    AttachVolumeListener,
    /// Derive the session target from the stored preference.
    ResolveQuality,
    /// Compares reports against the target, so needs `ResolveQuality`.
    AttachQualityListener,
    /// Pin once the widget offers levels, then resume playback.
    NegotiateQuality,
}

impl SetupStep {
    pub const SEQUENCE: [SetupStep; 7] = [
        SetupStep::SeedVolume,
        SetupStep::SeekToStart,
        SetupStep::Pause,
        SetupStep::AttachVolumeListener,
        SetupStep::ResolveQuality,
        SetupStep::AttachQualityListener,
        SetupStep::NegotiateQuality,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::SeedVolume => "seed-volume",
            Self::SeekToStart => "seek-to-start",
            Self::Pause => "pause",
            Self::AttachVolumeListener => "attach-volume-listener",
            Self::ResolveQuality => "resolve-quality",
            Self::AttachQualityListener => "attach-quality-listener",
            Self::NegotiateQuality => "negotiate-quality",
        }
    }
}
