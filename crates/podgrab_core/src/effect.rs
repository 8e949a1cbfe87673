use crate::{ArmId, DiscoveryPolicy};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Drop any affordance left over from a previous page view.
    RemoveAffordance,
    StartDiscovery {
        arm_id: ArmId,
        policy: DiscoveryPolicy,
    },
    CancelDiscovery {
        arm_id: ArmId,
    },
    /// Hand the original URL to the download sink as-is.
    Download {
        arm_id: ArmId,
        url: String,
        file_name: String,
    },
    /// Fetch, transcode and hand the converted artifact to the download sink.
    Convert {
        arm_id: ArmId,
        url: String,
        file_name: String,
    },
    Notify(Notice),
}

/// Transient user-facing notifications (toasts).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    TranscodeDetected,
    FetchingInput,
    Transcoding,
    ConversionComplete,
    ConversionFailed,
    ConversionInProgress,
    DownloadStarted,
    DownloadFailed,
    SourceMissing,
}

impl Notice {
    pub fn text(self) -> &'static str {
        match self {
            Notice::TranscodeDetected => "M4A detected, converting to MP3...",
            Notice::FetchingInput => "Downloading M4A file...",
            Notice::Transcoding => "Converting to MP3...",
            Notice::ConversionComplete => "MP3 conversion complete!",
            Notice::ConversionFailed => "Conversion failed, please retry",
            Notice::ConversionInProgress => "A conversion is already running",
            Notice::DownloadStarted => "Download started...",
            Notice::DownloadFailed => "Download could not be started",
            Notice::SourceMissing => "Audio file not found",
        }
    }
}
