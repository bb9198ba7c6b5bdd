//! Enumerations carried by directory entries: pixel layout, compression
//! scheme, and pyramid membership kind.

/// Pixel storage layout, decoded from a `DirectoryEntry`'s 4-byte pixel-type
/// code. Unknown codes decode to [`PixelType::Unknown`] rather than failing
/// the parse — pixel interpretation is left to an external decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelType {
    Gray8,
    Gray16,
    Gray32Float,
    Bgr24,
    Bgr48,
    Bgr96Float,
    Bgra32,
    Gray64ComplexFloat,
    Bgr192ComplexFloat,
    Gray32,
    Gray64,
    Unknown(i32),
}

impl PixelType {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => PixelType::Gray8,
            1 => PixelType::Gray16,
            2 => PixelType::Gray32Float,
            3 => PixelType::Bgr24,
            4 => PixelType::Bgr48,
            8 => PixelType::Bgr96Float,
            9 => PixelType::Bgra32,
            10 => PixelType::Gray64ComplexFloat,
            11 => PixelType::Bgr192ComplexFloat,
            12 => PixelType::Gray32,
            13 => PixelType::Gray64,
            other => PixelType::Unknown(other),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PixelType::Gray8 => "gray-8",
            PixelType::Gray16 => "gray-16",
            PixelType::Gray32Float => "gray-32-float",
            PixelType::Bgr24 => "bgr-24",
            PixelType::Bgr48 => "bgr-48",
            PixelType::Bgr96Float => "bgr-96-float",
            PixelType::Bgra32 => "bgra-32",
            PixelType::Gray64ComplexFloat => "gray-64-complex-float",
            PixelType::Bgr192ComplexFloat => "bgr-192-complex-float",
            PixelType::Gray32 => "gray-32",
            PixelType::Gray64 => "gray-64",
            PixelType::Unknown(_) => "unknown",
        }
    }
}

/// Sub-block compression scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompressionKind {
    Uncompressed,
    Jpeg,
    Lzw,
    JpegXr,
    CameraSpec,
    SystemSpec,
    Unknown(i32),
}

impl CompressionKind {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => CompressionKind::Uncompressed,
            1 => CompressionKind::Jpeg,
            2 => CompressionKind::Lzw,
            4 => CompressionKind::JpegXr,
            100 => CompressionKind::CameraSpec,
            1000 => CompressionKind::SystemSpec,
            other => CompressionKind::Unknown(other),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CompressionKind::Uncompressed => "uncompressed",
            CompressionKind::Jpeg => "jpeg",
            CompressionKind::Lzw => "lzw",
            CompressionKind::JpegXr => "jpeg-xr",
            CompressionKind::CameraSpec => "camera-spec",
            CompressionKind::SystemSpec => "system-spec",
            CompressionKind::Unknown(_) => "unknown",
        }
    }
}

/// Pyramid membership kind, the first coordinate of a level's identifying
/// triple `(pyramid_kind, ssX, ssY)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PyramidKind {
    None,
    Single,
    Multi,
    Unknown(u8),
}

impl PyramidKind {
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => PyramidKind::None,
            1 => PyramidKind::Single,
            2 => PyramidKind::Multi,
            other => PyramidKind::Unknown(other),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PyramidKind::None => "none",
            PyramidKind::Single => "single",
            PyramidKind::Multi => "multi",
            PyramidKind::Unknown(_) => "unknown",
        }
    }
}
