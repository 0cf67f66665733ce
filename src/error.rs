//! Error handling.
//!
//! Only two conditions in a separation run are hard errors: a page the
//! renderer could not rasterize, and a colorant catalog too wide for a
//! DeviceN rendering request. Conditions that merely look exceptional
//! (translucent content, pages without any announced ink) are routing
//! outcomes and are handled inline by the run loop.

use std::fmt;

use crate::colorant::MAX_DEVICE_N_COLORANTS;

/// A wrapper type for separation errors.
pub type SeparationResult<T> = Result<T, SeparationError>;

/// An error during a separation run.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum SeparationError {
    /// The renderer failed to produce a usable raster for a page. The run
    /// records the page as skipped and continues with the next one.
    RenderingFailure {
        /// Zero-based index of the failing page.
        page: usize,
        /// The renderer's own description of the failure.
        reason: String,
    },
    /// A page announced more colorants than a DeviceN raster can carry.
    /// This aborts the run; callers that want partial separation must
    /// restrict the colorant list themselves, plates are never dropped
    /// silently.
    ColorantOverflow {
        /// The number of colorants the page would have needed.
        found: usize,
    },
}

impl fmt::Display for SeparationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeparationError::RenderingFailure { page, reason } => {
                write!(f, "page {} could not be rendered: {}", page + 1, reason)
            }
            SeparationError::ColorantOverflow { found } => {
                write!(
                    f,
                    "page uses {} colorants, but a DeviceN rendering supports at most {}",
                    found, MAX_DEVICE_N_COLORANTS
                )
            }
        }
    }
}

impl std::error::Error for SeparationError {}
