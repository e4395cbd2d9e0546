//! # Animation export
//!
//! Frames are streamed into an animated GIF (infinite repeat) through a buffered file
//! writer. Frames are consumed one at a time, so a lazily rendered sequence never
//! holds more than one image in memory. On any failure the partially written file is
//! removed.

use std::fs::{self, File};
use std::io::{BufWriter, Seek, Write};
use std::path::Path;
use std::time::Duration;

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, ImageError, ImageFormat};
use tracing::{debug, info, warn};

use crate::error::{RenderError, Result};
use crate::renderer::Frame;

/// NeuQuant sampling factor: 1 is best quality, 30 is fastest.
const GIF_SPEED: i32 = 10;

/// Write `frames` to `path` as an animated GIF, each shown for `frame_duration`.
///
/// Returns the number of frames written.
///
/// # Errors
///
/// * [`RenderError::EmptyAnimation`] if `frames` yields nothing; no file is created
/// * [`RenderError::Io`] if `path` cannot be created or written
/// * [`RenderError::Encode`] if GIF encoding fails
pub fn export_animation<I>(frames: I, path: &Path, frame_duration: Duration) -> Result<usize>
where
    I: IntoIterator<Item = Frame>,
{
    let mut frames = frames.into_iter().peekable();
    if frames.peek().is_none() {
        return Err(RenderError::EmptyAnimation(path.to_path_buf()));
    }

    let file = File::create(path).map_err(|source| RenderError::io(path, source))?;
    let mut writer = BufWriter::new(file);

    let written = encode_gif(&mut writer, frames, frame_duration)
        .map_err(|source| image_error(path, source))
        .and_then(|count| {
            writer
                .flush()
                .map(|()| count)
                .map_err(|source| RenderError::io(path, source))
        });

    match written {
        Ok(count) => {
            info!(
                path = %path.display(),
                frames = count,
                frame_ms = frame_duration.as_millis(),
                "Exported animation"
            );
            Ok(count)
        }
        Err(err) => {
            drop(writer);
            discard_partial(path);
            Err(err)
        }
    }
}

/// The encoder writes the GIF trailer when dropped, so it lives only inside this call.
fn encode_gif<W, I>(writer: W, frames: I, frame_duration: Duration) -> image::ImageResult<usize>
where
    W: Write,
    I: Iterator<Item = Frame>,
{
    let mut encoder = GifEncoder::new_with_speed(writer, GIF_SPEED);
    encoder.set_repeat(Repeat::Infinite)?;

    let delay = Delay::from_saturating_duration(frame_duration);
    let mut count = 0;
    for frame in frames {
        encoder.encode_frame(image::Frame::from_parts(frame.into_image(), 0, 0, delay))?;
        count += 1;
        debug!(frame = count, "Encoded frame");
    }
    Ok(count)
}

/// Write a single frame to `path` as PNG.
///
/// # Errors
///
/// [`RenderError::Io`] if the file cannot be written, [`RenderError::Encode`] if PNG
/// encoding fails.
pub fn export_still(frame: &Frame, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|source| RenderError::io(path, source))?;
    let mut writer = BufWriter::new(file);

    let written = write_png(frame, &mut writer)
        .map_err(|source| image_error(path, source))
        .and_then(|()| writer.flush().map_err(|source| RenderError::io(path, source)));

    match written {
        Ok(()) => {
            info!(path = %path.display(), "Exported still frame");
            Ok(())
        }
        Err(err) => {
            drop(writer);
            discard_partial(path);
            Err(err)
        }
    }
}

fn write_png<W: Write + Seek>(frame: &Frame, writer: &mut W) -> image::ImageResult<()> {
    frame.image().write_to(writer, ImageFormat::Png)
}

fn image_error(path: &Path, source: ImageError) -> RenderError {
    match source {
        ImageError::IoError(io) => RenderError::io(path, io),
        other => RenderError::encode(path, other),
    }
}

fn discard_partial(path: &Path) {
    if let Err(err) = fs::remove_file(path) {
        warn!(path = %path.display(), error = %err, "Could not remove partial output");
    }
}
