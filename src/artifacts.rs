//! Checkpoint screenshots, the only files a run leaves behind.

use crate::browser::Page;
use crate::error::Result;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkpoint {
    SetupFilled,
    DetailsFilled,
    ExperienceFilled,
    VerificationFilled,
    FinalResult,
    ErrorState,
}

impl Checkpoint {
    pub fn file_name(self) -> &'static str {
        match self {
            Checkpoint::SetupFilled => "step1-filled.png",
            Checkpoint::DetailsFilled => "step2-filled.png",
            Checkpoint::ExperienceFilled => "step3-filled.png",
            Checkpoint::VerificationFilled => "step4-filled.png",
            Checkpoint::FinalResult => "final-result.png",
            Checkpoint::ErrorState => "error-state.png",
        }
    }
}

pub struct ScreenshotStore {
    dir: PathBuf,
}

impl ScreenshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, checkpoint: Checkpoint) -> PathBuf {
        self.dir.join(checkpoint.file_name())
    }

    /// Capture `page` and write it under the checkpoint's file name.
    pub async fn capture<P: Page>(&self, page: &P, checkpoint: Checkpoint) -> Result<PathBuf> {
        let png = page.screenshot().await?;
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(checkpoint);
        tokio::fs::write(&path, &png).await?;
        tracing::debug!("Saved screenshot {:?} ({} bytes)", path, png.len());
        Ok(path)
    }
}
