#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Content script injected into a page at `url`.
    PageLoaded { url: String },
    /// A batch of DOM mutations was observed; `url` is the location at that moment.
    PageMutated { url: String },
    /// One discovery poll for the given page view finished.
    DiscoveryTick {
        arm_id: crate::ArmId,
        audio_url: Option<String>,
    },
    /// User activated the affordance.
    DownloadClicked { titles: crate::TitleCandidates },
    /// Engine moved a conversion job to its next step.
    ConversionStep {
        arm_id: crate::ArmId,
        step: ConversionStep,
    },
    /// Engine finished a conversion job (including the sink hand-off).
    ConversionFinished {
        arm_id: crate::ArmId,
        result: Result<(), crate::PipelineError>,
    },
    /// Download sink refused a raw download request.
    DownloadRejected {
        arm_id: crate::ArmId,
        error: crate::PipelineError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionStep {
    Fetching,
    Transcoding,
}
