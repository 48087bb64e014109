// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Frame sources (image sequences and videos).
//!
//! This module opens the media being annotated and hands out its frames one
//! at a time, already resized to the display size so that click coordinates
//! and overlay coordinates share one space.

use crate::config::DisplaySize;
use anyhow::{bail, Context, Result};
use image::imageops::FilterType;
use image::RgbaImage;
use std::path::{Path, PathBuf};

/// A decoded frame.
pub type Frame = RgbaImage;

/// Image file extensions recognized in a frame directory.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tif", "tiff"];

/// An ordered, finite, forward-only stream of frames.
pub trait FrameSource {
    /// The next frame, or `None` once the stream is exhausted.
    fn next_frame(&mut self) -> Result<Option<Frame>>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        (**self).next_frame()
    }
}

/// Frames stored as individual image files in one directory, played in
/// file name order.
pub struct ImageSequence {
    files: std::vec::IntoIter<PathBuf>,
}

impl ImageSequence {
    pub fn open(dir: &Path) -> Result<Self> {
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to open frame directory {}", dir.display()))?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.is_file() && is_image(&path) {
                files.push(path);
            }
        }
        if files.is_empty() {
            bail!("No image frames found in {}", dir.display());
        }
        files.sort();

        log::info!("Opened {} frames from {}", files.len(), dir.display());
        Ok(Self {
            files: files.into_iter(),
        })
    }
}

impl FrameSource for ImageSequence {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        let Some(path) = self.files.next() else {
            return Ok(None);
        };
        let img = image::open(&path)
            .with_context(|| format!("Failed to decode frame {}", path.display()))?;
        Ok(Some(img.to_rgba8()))
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Wraps a source and resizes every frame to the display size.
pub struct Resized<S> {
    inner: S,
    size: DisplaySize,
}

impl<S: FrameSource> Resized<S> {
    pub fn new(inner: S, size: DisplaySize) -> Self {
        Self { inner, size }
    }
}

impl<S: FrameSource> FrameSource for Resized<S> {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        let Some(frame) = self.inner.next_frame()? else {
            return Ok(None);
        };
        if frame.dimensions() == (self.size.width, self.size.height) {
            return Ok(Some(frame));
        }
        Ok(Some(image::imageops::resize(
            &frame,
            self.size.width,
            self.size.height,
            FilterType::Triangle,
        )))
    }
}

/// Open the source at `path`: a directory is an image sequence, a file is a
/// video. Frames come out resized to `size`.
pub fn open_source(path: &Path, size: DisplaySize) -> Result<Box<dyn FrameSource>> {
    if path.is_dir() {
        return Ok(Box::new(Resized::new(ImageSequence::open(path)?, size)));
    }
    if !path.exists() {
        bail!("Frame source not found: {}", path.display());
    }
    open_video(path, size)
}

#[cfg(feature = "video-opencv")]
fn open_video(path: &Path, size: DisplaySize) -> Result<Box<dyn FrameSource>> {
    Ok(Box::new(Resized::new(video::VideoFile::open(path)?, size)))
}

#[cfg(not(feature = "video-opencv"))]
fn open_video(path: &Path, _size: DisplaySize) -> Result<Box<dyn FrameSource>> {
    bail!(
        "Cannot open {}: video files need the `video-opencv` feature; \
         pass a directory of frames instead",
        path.display()
    )
}

#[cfg(feature = "video-opencv")]
mod video {
    use super::{Frame, FrameSource};
    use anyhow::{anyhow, bail, Context, Result};
    use opencv::core::Mat;
    use opencv::prelude::*;
    use opencv::{imgproc, videoio};
    use std::path::Path;

    /// A video file decoded with OpenCV.
    pub struct VideoFile {
        capture: videoio::VideoCapture,
    }

    impl VideoFile {
        pub fn open(path: &Path) -> Result<Self> {
            let name = path
                .to_str()
                .ok_or_else(|| anyhow!("Non UTF-8 video path: {}", path.display()))?;
            let capture = videoio::VideoCapture::from_file(name, videoio::CAP_ANY)
                .with_context(|| format!("Failed to open video {}", path.display()))?;
            if !capture.is_opened()? {
                bail!("Failed to open video {}", path.display());
            }
            log::info!("Opened video {}", path.display());
            Ok(Self { capture })
        }
    }

    impl FrameSource for VideoFile {
        fn next_frame(&mut self) -> Result<Option<Frame>> {
            let mut bgr = Mat::default();
            if !self.capture.read(&mut bgr)? || bgr.empty() {
                return Ok(None);
            }
            let mut rgba = Mat::default();
            imgproc::cvt_color(&bgr, &mut rgba, imgproc::COLOR_BGR2RGBA, 0)?;

            let width = u32::try_from(rgba.cols())?;
            let height = u32::try_from(rgba.rows())?;
            let pixels = rgba.data_bytes()?.to_vec();
            Frame::from_raw(width, height, pixels)
                .map(Some)
                .ok_or_else(|| anyhow!("Decoded frame has unexpected buffer size"))
        }
    }
}
