//! Rendering module
//!
//! Every frame is composed off-screen into a [`FrameBuffer`] and then handed
//! to a [`Surface`] in one call, so a viewer never sees a half-drawn scene.
//! The browser surface uploads the finished frame to a wgpu texture.

use std::fmt;

pub mod blit_pipeline;
pub mod font;
pub mod frame;
pub mod scene;

pub use blit_pipeline::BlitPresenter;
pub use frame::{FrameBuffer, Rgba};
pub use scene::Renderer;

/// Why a finished frame could not be shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresentError {
    /// Surface must be reconfigured before the next present
    Lost,
    Outdated,
    OutOfMemory,
    /// Timeouts and anything else the backend reports
    Other(String),
}

impl fmt::Display for PresentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresentError::Lost => write!(f, "surface lost"),
            PresentError::Outdated => write!(f, "surface outdated"),
            PresentError::OutOfMemory => write!(f, "out of memory"),
            PresentError::Other(msg) => write!(f, "present failed: {}", msg),
        }
    }
}

impl std::error::Error for PresentError {}

/// Anything that can display a finished frame
pub trait Surface {
    /// Drawable size in pixels
    fn size(&self) -> (u32, u32);

    /// Show `frame` in full; called once per paint
    fn present(&mut self, frame: &FrameBuffer) -> Result<(), PresentError>;
}

/// Surface that keeps only the latest frame, used by the headless runner
#[derive(Debug, Default)]
pub struct MemorySurface {
    last: Option<FrameBuffer>,
    presented: u64,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_frame(&self) -> Option<&FrameBuffer> {
        self.last.as_ref()
    }

    /// Number of frames presented so far
    pub fn presented(&self) -> u64 {
        self.presented
    }
}

impl Surface for MemorySurface {
    fn size(&self) -> (u32, u32) {
        self.last
            .as_ref()
            .map_or((0, 0), |f| (f.width(), f.height()))
    }

    fn present(&mut self, frame: &FrameBuffer) -> Result<(), PresentError> {
        match &mut self.last {
            Some(last) if last.width() == frame.width() && last.height() == frame.height() => {
                last.clone_from(frame);
            }
            _ => self.last = Some(frame.clone()),
        }
        self.presented += 1;
        Ok(())
    }
}
