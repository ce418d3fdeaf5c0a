//! Depth-sensor boundary types.
//!
//! The simulation never talks to sensor hardware. Whatever acquires
//! frames (a Kinect reader, a file replay, [`crate::SyntheticSource`])
//! implements [`DepthSource`] and hands over validated [`DepthFrame`]s.

use thiserror::Error;

/// Depth-frame validation failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("depth frame has {got} samples, expected {expected} ({width}x{height})")]
    LengthMismatch {
        width: usize,
        height: usize,
        expected: usize,
        got: usize,
    },
}

/// One raw scan: row-major unsigned distance samples in
/// `[0, MAX_DEPTH]`. A sample of 0 is valid data (maximum proximity).
#[derive(Clone, Debug)]
pub struct DepthFrame {
    width: usize,
    height: usize,
    samples: Vec<u16>,
}

impl DepthFrame {
    pub fn new(width: usize, height: usize, samples: Vec<u16>) -> Result<Self, FrameError> {
        let expected = width * height;
        if samples.len() != expected {
            return Err(FrameError::LengthMismatch {
                width,
                height,
                expected,
                got: samples.len(),
            });
        }
        Ok(Self {
            width,
            height,
            samples,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn samples(&self) -> &[u16] {
        &self.samples
    }
}

/// Supplier of depth frames, polled once per rebuild cycle.
///
/// Returning `None` means no fresh frame was available; the rebuild is
/// skipped for that cycle and the previous terrain stays in effect.
pub trait DepthSource: Send {
    fn latest_frame(&mut self) -> Option<DepthFrame>;
}
