//! Resampling algorithm selection

use std::fmt;
use std::str::FromStr;

use fast_image_resize::{FilterType, ResizeAlg};

use crate::error::ShrinkError;

/// The supported resampling algorithms
///
/// Names resolve case-insensitively; anything outside this set is an
/// [`ShrinkError::UnknownAlgorithm`], never a panic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeAlgorithm {
    Lanczos,
    Nearest,
    Bilinear,
    Bicubic,
    Hamming,
    Box,
}

impl ResizeAlgorithm {
    /// Every supported algorithm, in the order shown to users
    pub const ALL: [ResizeAlgorithm; 6] = [
        ResizeAlgorithm::Lanczos,
        ResizeAlgorithm::Nearest,
        ResizeAlgorithm::Bilinear,
        ResizeAlgorithm::Bicubic,
        ResizeAlgorithm::Hamming,
        ResizeAlgorithm::Box,
    ];

    /// Canonical lowercase name
    pub fn name(self) -> &'static str {
        match self {
            Self::Lanczos => "lanczos",
            Self::Nearest => "nearest",
            Self::Bilinear => "bilinear",
            Self::Bicubic => "bicubic",
            Self::Hamming => "hamming",
            Self::Box => "box",
        }
    }

    /// Map onto the resampler's filter kernels
    ///
    /// `bicubic` uses the Catmull-Rom kernel, the a=-0.5 member of the
    /// cubic family.
    pub fn resize_alg(self) -> ResizeAlg {
        match self {
            Self::Lanczos => ResizeAlg::Convolution(FilterType::Lanczos3),
            Self::Nearest => ResizeAlg::Nearest,
            Self::Bilinear => ResizeAlg::Convolution(FilterType::Bilinear),
            Self::Bicubic => ResizeAlg::Convolution(FilterType::CatmullRom),
            Self::Hamming => ResizeAlg::Convolution(FilterType::Hamming),
            Self::Box => ResizeAlg::Convolution(FilterType::Box),
        }
    }
}

impl fmt::Display for ResizeAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ResizeAlgorithm {
    type Err = ShrinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|alg| alg.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ShrinkError::unknown_algorithm(s))
    }
}
