//! Wire-stable constants for parameterized opaque compute types.
//!
//! The extended materialization strategy reconstructs builtins as target
//! extension types named here, with their image shape spread over a fixed
//! tuple of integer parameters. Every index and value in this module is part
//! of the persisted symbol contract and must never be renumbered.

/// Target extension type names.
pub const EVENT_NAME: &str = "spirv.Event";
pub const SAMPLER_NAME: &str = "spirv.Sampler";
pub const IMAGE_NAME: &str = "spirv.Image";

/// Integer parameter indices of an image target extension type. The sampled
/// element type is the sole type parameter and precedes all of these.
pub const IMAGE_DIM_IDX: usize = 0;
pub const IMAGE_DEPTH_IDX: usize = 1;
pub const IMAGE_ARRAYED_IDX: usize = 2;
pub const IMAGE_MS_IDX: usize = 3;
pub const IMAGE_SAMPLED_IDX: usize = 4;
pub const IMAGE_FORMAT_IDX: usize = 5;
pub const IMAGE_ACCESS_QUAL_IDX: usize = 6;

/// Number of integer parameters an image target extension type carries.
pub const IMAGE_INT_PARAMS: usize = 7;

fake_enum::fake_enum! {
    #[repr(u32)]
    #[derive(Default, Hash)]
    /// Value space of the dimensionality parameter.
    pub enum struct ImageDimCode {
        Dim1D = 0,
        Dim2D = 1,
        Dim3D = 2,
        DimCube = 3,
        DimRect = 4,
        DimBuffer = 5,
        DimSubpassData = 6,
    }
}

fake_enum::fake_enum! {
    #[repr(u32)]
    #[derive(Default, Hash)]
    /// Value space of the depth parameter.
    pub enum struct ImageDepthCode {
        NoDepth = 0,
        Depth = 1,
        DepthUnknown = 2,
    }
}

fake_enum::fake_enum! {
    #[repr(u32)]
    #[derive(Default, Hash)]
    /// Whether an image is statically known to be used with a sampler.
    pub enum struct ImageSampled {
        Runtime = 0,
        Sampled = 1,
        Storage = 2,
    }
}

fake_enum::fake_enum! {
    #[repr(u32)]
    #[derive(Default, Hash)]
    /// The access qualifier parameter.
    pub enum struct AccessQual {
        ReadOnly = 0,
        WriteOnly = 1,
        ReadWrite = 2,
    }
}

impl ImageSampled {
    pub const fn value(self) -> u32 {
        self.0
    }

    pub const fn from_value(n: u32) -> Self {
        Self(n)
    }
}

impl AccessQual {
    pub const fn value(self) -> u32 {
        self.0
    }

    pub const fn from_value(n: u32) -> Self {
        Self(n)
    }
}

impl ImageDimCode {
    pub const fn value(self) -> u32 {
        self.0
    }

    pub const fn from_value(n: u32) -> Self {
        Self(n)
    }
}

impl ImageDepthCode {
    pub const fn value(self) -> u32 {
        self.0
    }

    pub const fn from_value(n: u32) -> Self {
        Self(n)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_wire_values_are_stable() {
        assert_eq!(ImageDimCode::Dim1D.value(), 0);
        assert_eq!(ImageDimCode::Dim2D.value(), 1);
        assert_eq!(ImageDimCode::Dim3D.value(), 2);
        assert_eq!(ImageDimCode::DimBuffer.value(), 5);
        assert_eq!(ImageDepthCode::NoDepth.value(), 0);
        assert_eq!(ImageDepthCode::Depth.value(), 1);
        assert_eq!(ImageSampled::Runtime.value(), 0);
        assert_eq!(AccessQual::ReadOnly.value(), 0);
        assert_eq!(AccessQual::ReadWrite.value(), 2);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(ImageSampled::default(), ImageSampled::Runtime);
        assert_eq!(AccessQual::default(), AccessQual::ReadOnly);
    }
}
