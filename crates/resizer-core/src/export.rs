//! Delivering an encoded blob to the user.
//!
//! Two paths: a plain download, or a native share sheet. Sharing that is
//! unavailable, refused or cancelled is not an error to the caller; it falls
//! back to a download followed by a prefilled `mailto:` link.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use thiserror::Error;
use tracing::{info, warn};

use crate::dimensions::TargetDimensions;
use crate::encode::{OutputBlob, OutputSpec};

/// Characters `encodeURIComponent` leaves alone.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShareError {
    #[error("Native sharing is not available")]
    Unavailable,
    #[error("Sharing was cancelled")]
    Cancelled,
    #[error("Sharing failed: {0}")]
    Failed(String),
}

/// A native share sheet.
#[allow(async_fn_in_trait)]
pub trait ShareTarget {
    async fn share(&self, blob: &OutputBlob, file_name: &str) -> Result<(), ShareError>;
}

/// Platforms without native sharing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoShare;

impl ShareTarget for NoShare {
    async fn share(&self, _blob: &OutputBlob, _file_name: &str) -> Result<(), ShareError> {
        Err(ShareError::Unavailable)
    }
}

/// Saves a blob as a file (an anchor-click download in a browser).
pub trait DownloadSink {
    fn download(&self, blob: &OutputBlob, file_name: &str);
}

/// How [`share_or_fallback`] ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared,
    /// The blob was downloaded instead; `mailto` should be opened next.
    Downloaded { mailto: String },
}

/// Everything the export dialog needs once dimensions are settled.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportPlan {
    pub target: TargetDimensions,
    pub spec: OutputSpec,
    /// Editable basename offered to the user, e.g. `cat_800x600`.
    pub suggested_basename: String,
}

/// `{stem}_{width}x{height}`, where stem drops the last extension.
pub fn suggested_basename(file_name: &str, target: TargetDimensions) -> String {
    let stem = match file_name.rsplit_once('.') {
        Some((stem, _)) => stem,
        None => file_name,
    };
    format!("{stem}_{}x{}", target.width, target.height)
}

/// Final filename from the user's (possibly empty) basename.
pub fn export_file_name(basename: &str, default_basename: &str, spec: &OutputSpec) -> String {
    let trimmed = basename.trim();
    let name = if trimmed.is_empty() {
        default_basename
    } else {
        trimmed
    };
    format!("{name}.{}", spec.format.extension())
}

/// Prefilled compose link asking the user to attach the downloaded file.
pub fn mailto_link(file_name: &str) -> String {
    let subject = format!("Photo: {file_name}");
    let body = format!("Attach the downloaded file {file_name}");
    format!(
        "mailto:?subject={}&body={}",
        utf8_percent_encode(&subject, URI_COMPONENT),
        utf8_percent_encode(&body, URI_COMPONENT)
    )
}

/// Share the blob natively, or download it and hand back a mail link.
pub async fn share_or_fallback<S, D>(
    share: &S,
    download: &D,
    blob: &OutputBlob,
    file_name: &str,
) -> ShareOutcome
where
    S: ShareTarget,
    D: DownloadSink,
{
    match share.share(blob, file_name).await {
        Ok(()) => ShareOutcome::Shared,
        Err(e) => {
            match e {
                ShareError::Failed(_) => warn!(error = %e, "share failed, downloading instead"),
                _ => info!(error = %e, "share skipped, downloading instead"),
            }
            download.download(blob, file_name);
            ShareOutcome::Downloaded {
                mailto: mailto_link(file_name),
            }
        }
    }
}
