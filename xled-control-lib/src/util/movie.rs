use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use bytes::{BufMut, Bytes, BytesMut};

use crate::led::pixel::{Frame, LedMovie, LedProfile, Pixel};
use crate::util::error::ValidationError;

/// Tracks an attribute that has to be the same for every item of a sequence.
///
/// The first value seen becomes the reference, every later value is compared to it.
#[derive(Debug, Default)]
pub struct Uniformity<T> {
    reference: Option<T>,
}

impl<T: PartialEq + Copy> Uniformity<T> {
    pub fn new() -> Self {
        Uniformity { reference: None }
    }

    /// Returns the reference value on a mismatch.
    pub fn check(&mut self, value: T) -> Result<(), T> {
        match self.reference {
            None => {
                self.reference = Some(value);
                Ok(())
            }
            Some(reference) if reference == value => Ok(()),
            Some(reference) => Err(reference),
        }
    }

    pub fn reference(&self) -> Option<T> {
        self.reference
    }
}

/// Shape of a movie that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovieShape {
    pub frames: usize,
    pub leds_per_frame: usize,
    pub profile: LedProfile,
}

impl MovieShape {
    pub fn byte_len(&self) -> usize {
        self.frames * self.leds_per_frame * self.profile.bytes_per_led()
    }
}

/// Checks that a movie can be serialized and returns its shape.
pub fn validate(movie: &LedMovie) -> Result<MovieShape, ValidationError> {
    if movie.frames.is_empty() {
        return Err(ValidationError::EmptyMovie);
    }

    let mut frame_size = Uniformity::new();
    let mut profile = Uniformity::new();
    for (frame_index, frame) in movie.frames.iter().enumerate() {
        if frame.is_empty() {
            return Err(ValidationError::EmptyFrame { frame: frame_index });
        }
        frame_size
            .check(frame.len())
            .map_err(|expected| ValidationError::InconsistentFrameSize {
                frame: frame_index,
                expected,
                found: frame.len(),
            })?;
        for (pixel_index, led) in frame.leds.iter().enumerate() {
            profile
                .check(led.profile())
                .map_err(|expected| ValidationError::MixedPixelFormat {
                    frame: frame_index,
                    pixel: pixel_index,
                    expected,
                    found: led.profile(),
                })?;
        }
    }

    // Both references are set once a non-empty frame was seen.
    match (frame_size.reference(), profile.reference()) {
        (Some(leds_per_frame), Some(profile)) => Ok(MovieShape {
            frames: movie.frames.len(),
            leds_per_frame,
            profile,
        }),
        _ => Err(ValidationError::EmptyMovie),
    }
}

/// Serializes a movie into the binary layout the device plays back:
/// frame after frame, LED after LED, channels in r, g, b[, w] order.
pub fn encode(movie: &LedMovie) -> Result<Bytes, ValidationError> {
    let shape = validate(movie)?;
    let mut buffer = BytesMut::with_capacity(shape.byte_len());
    for frame in &movie.frames {
        for led in &frame.leds {
            buffer.put_u8(led.red());
            buffer.put_u8(led.green());
            buffer.put_u8(led.blue());
            if shape.profile.has_white() {
                buffer.put_u8(led.white());
            }
        }
    }
    Ok(buffer.freeze())
}

/// Loads a movie stored in the text format written by [`save_movie`].
///
/// The first line is the header `frames leds bytes_per_led fps`, followed by
/// one line of hex encoded LED data per frame.
pub fn load_movie<P: AsRef<Path>>(path: P) -> Result<(LedMovie, f64)> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    read_movie(BufReader::new(file))
}

pub fn read_movie<R: BufRead>(mut reader: R) -> Result<(LedMovie, f64)> {
    let mut header = String::new();
    reader.read_line(&mut header)?;
    let header_parts: Vec<&str> = header.split_whitespace().collect();
    if header_parts.len() != 4 {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "Invalid header format").into());
    }

    let num_frames: usize = header_parts[0].parse().context("Invalid frame count")?;
    let num_leds: usize = header_parts[1].parse().context("Invalid LED count")?;
    let bytes_per_led: usize = header_parts[2].parse().context("Invalid bytes per LED")?;
    let fps: f64 = header_parts[3].parse().context("Invalid frame rate")?;
    let Some(profile) = LedProfile::from_bytes_per_led(bytes_per_led) else {
        bail!("Unsupported bytes per LED: {}", bytes_per_led);
    };

    let frame_len = num_leds
        .checked_mul(bytes_per_led)
        .context("LED count too large")?;

    // The header is untrusted, frames are only allocated as their lines arrive.
    let mut frames = Vec::new();
    for index in 0..num_frames {
        let mut frame_hex = String::new();
        if reader.read_line(&mut frame_hex)? == 0 {
            bail!("Movie ends after {} of {} frames", index, num_frames);
        }
        let frame_bytes = hex::decode(frame_hex.trim())
            .with_context(|| format!("Frame {} is not valid hex", index))?;
        if frame_bytes.len() != frame_len {
            bail!(
                "Frame {} has {} bytes, expected {}",
                index,
                frame_bytes.len(),
                frame_len
            );
        }

        let frame: Frame = frame_bytes
            .chunks(bytes_per_led)
            .map(|chunk| match profile {
                LedProfile::RGB => Pixel::rgb(chunk[0], chunk[1], chunk[2]),
                LedProfile::RGBW => Pixel::rgbw(chunk[0], chunk[1], chunk[2], chunk[3]),
            })
            .collect();
        frames.push(frame);
    }

    Ok((LedMovie::new(frames), fps))
}

/// Saves a movie to a file in a text-based format.
pub fn save_movie<P: AsRef<Path>>(path: P, movie: &LedMovie, fps: f64) -> Result<()> {
    let path = path.as_ref();
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_movie(&mut writer, movie, fps)?;
    writer.flush()?;
    Ok(())
}

pub fn write_movie<W: Write>(writer: &mut W, movie: &LedMovie, fps: f64) -> Result<()> {
    let shape = validate(movie)?;
    writeln!(
        writer,
        "{} {} {} {}",
        shape.frames,
        shape.leds_per_frame,
        shape.profile.bytes_per_led(),
        fps
    )?;

    let data = encode(movie)?;
    let frame_len = shape.leds_per_frame * shape.profile.bytes_per_led();
    for frame in data.chunks(frame_len) {
        writeln!(writer, "{}", hex::encode_upper(frame))?;
    }
    Ok(())
}
