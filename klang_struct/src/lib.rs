//! Crate for the structural representation of kernel parameter types.
//!
//! The types in this crate describe a function signature as the mangling
//! engine sees it: scalars and vectors, pointers with an address space,
//! opaque compute builtins (events, samplers, images), parameterized target
//! extension types, and named opaque aggregates. They are plain owned data,
//! immutable once constructed, and compare structurally.

use core::fmt::Display;

use crate::tgtext::{AccessQual, ImageSampled};

pub mod tgtext;

fake_enum::fake_enum! {
    #[repr(u16)]
    #[derive(Default, Hash)]
    /// A numbered disjoint address space.
    ///
    /// The numbering is wire-stable: `Global = 1`, `Constant = 2`,
    /// `Local = 3`, `Generic = 4`. `Private` is address space `0` and never
    /// contributes mangled text. Numbers outside the named set remain
    /// representable so that symbols from newer producers stay decodable.
    pub enum struct AddrSpace {
        Private = 0,
        Global = 1,
        Constant = 2,
        Local = 3,
        Generic = 4,
    }
}

impl AddrSpace {
    /// The raw address space number, as it appears in an `AS<n>` qualifier.
    pub const fn number(self) -> u16 {
        self.0
    }

    /// The address space with the raw number `n`.
    pub const fn from_number(n: u16) -> Self {
        Self(n)
    }
}

impl core::fmt::Display for AddrSpace {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match *self {
            Self::Private => f.write_str("private"),
            Self::Global => f.write_str("global"),
            Self::Constant => f.write_str("constant"),
            Self::Local => f.write_str("local"),
            Self::Generic => f.write_str("generic"),
            Self(n) => f.write_fmt(format_args!("addrspace({})", n)),
        }
    }
}

bitflags::bitflags! {
    #[repr(transparent)]
    #[derive(Copy, Clone, Debug, Default, Hash, PartialEq, Eq)]
    pub struct QualFlags : u8 {
        const RESTRICT = 1;
        const VOLATILE = 2;
        const CONST = 4;
    }
}

/// The qualifiers attached to one parameter.
///
/// A value equal to `Qualifiers::default()` contributes no mangled text at
/// all; structural equality over the whole record decides whether two
/// parameters share one substitution entry.
#[derive(Copy, Clone, Debug, Default, Hash, PartialEq, Eq)]
pub struct Qualifiers {
    pub addr_space: AddrSpace,
    pub flags: QualFlags,
}

impl Qualifiers {
    /// Whether this is the all-default value that mangles to nothing.
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl core::fmt::Display for Qualifiers {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let mut sep = "";
        if self.addr_space != AddrSpace::Private {
            self.addr_space.fmt(f)?;
            sep = " ";
        }
        if self.flags.contains(QualFlags::RESTRICT) {
            f.write_str(sep)?;
            f.write_str("restrict")?;
            sep = " ";
        }
        if self.flags.contains(QualFlags::VOLATILE) {
            f.write_str(sep)?;
            f.write_str("volatile")?;
            sep = " ";
        }
        if self.flags.contains(QualFlags::CONST) {
            f.write_str(sep)?;
            f.write_str("const")?;
        }
        Ok(())
    }
}

/// The width and vector arity of a scalar type.
///
/// A header with `vectorsize: Some(n)` describes an `n`-element vector whose
/// element is the scalar described by the rest of the type.
#[derive(Copy, Clone, Debug, Default, Hash, PartialEq, Eq)]
pub struct ScalarTypeHeader {
    pub bitsize: u16,
    pub vectorsize: Option<u16>,
}

#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub enum ScalarTypeKind {
    Bool,
    Integer { signed: bool },
    Float,
}

#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub struct ScalarType {
    pub header: ScalarTypeHeader,
    pub kind: ScalarTypeKind,
}

impl ScalarType {
    /// An integer scalar with the given width in bits.
    pub const fn int(bitsize: u16, signed: bool) -> Self {
        Self {
            header: ScalarTypeHeader {
                bitsize,
                vectorsize: None,
            },
            kind: ScalarTypeKind::Integer { signed },
        }
    }

    /// A binary float scalar with the given width in bits.
    pub const fn float(bitsize: u16) -> Self {
        Self {
            header: ScalarTypeHeader {
                bitsize,
                vectorsize: None,
            },
            kind: ScalarTypeKind::Float,
        }
    }

    pub const fn boolean() -> Self {
        Self {
            header: ScalarTypeHeader {
                bitsize: 8,
                vectorsize: None,
            },
            kind: ScalarTypeKind::Bool,
        }
    }

    /// The same scalar as an `n`-element vector.
    pub const fn vector(self, n: u16) -> Self {
        Self {
            header: ScalarTypeHeader {
                bitsize: self.header.bitsize,
                vectorsize: Some(n),
            },
            kind: self.kind,
        }
    }

    /// The element type, with the vector arity stripped.
    pub const fn element(self) -> Self {
        Self {
            header: ScalarTypeHeader {
                bitsize: self.header.bitsize,
                vectorsize: None,
            },
            kind: self.kind,
        }
    }
}

impl core::fmt::Display for ScalarType {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self.kind {
            ScalarTypeKind::Bool => f.write_str("bool")?,
            ScalarTypeKind::Integer { signed } => {
                if !signed {
                    f.write_str("u")?;
                }
                match self.header.bitsize {
                    8 => f.write_str("char")?,
                    16 => f.write_str("short")?,
                    32 => f.write_str("int")?,
                    64 => f.write_str("long")?,
                    n => f.write_fmt(format_args!("int{}", n))?,
                }
            }
            ScalarTypeKind::Float => match self.header.bitsize {
                16 => f.write_str("half")?,
                32 => f.write_str("float")?,
                64 => f.write_str("double")?,
                n => f.write_fmt(format_args!("float{}", n))?,
            },
        }
        if let Some(n) = self.header.vectorsize {
            n.fmt(f)?;
        }
        Ok(())
    }
}

/// The dimensionality of an image, with arraying and buffering folded in.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub enum ImageDim {
    Dim1D,
    Dim1DArray,
    Dim1DBuffer,
    Dim2D,
    Dim2DArray,
    Dim3D,
}

impl ImageDim {
    pub const ALL: [Self; 6] = [
        Self::Dim1D,
        Self::Dim1DArray,
        Self::Dim1DBuffer,
        Self::Dim2D,
        Self::Dim2DArray,
        Self::Dim3D,
    ];

    /// Whether this dimensionality admits the depth and multisample flags.
    pub const fn accepts_shape_flags(self) -> bool {
        matches!(self, Self::Dim2D | Self::Dim2DArray)
    }
}

/// The shape of an opaque image type.
///
/// `sampled` and `access` exist to carry decode-side fidelity into the
/// materialized host type; the canonical name of an image is derived from
/// `dim`, `depth`, and `multisampled` alone.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub struct ImageType {
    pub dim: ImageDim,
    pub depth: bool,
    pub multisampled: bool,
    pub sampled: ImageSampled,
    pub access: AccessQual,
}

impl ImageType {
    /// A plain single-sampled, non-depth image of the given dimensionality.
    pub const fn new(dim: ImageDim) -> Self {
        Self {
            dim,
            depth: false,
            multisampled: false,
            sampled: ImageSampled::Runtime,
            access: AccessQual::ReadOnly,
        }
    }

    pub const fn with_depth(mut self) -> Self {
        self.depth = true;
        self
    }

    pub const fn with_multisampling(mut self) -> Self {
        self.multisampled = true;
        self
    }
}

impl core::fmt::Display for ImageType {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str("image")?;
        match self.dim {
            ImageDim::Dim1D => f.write_str("1d")?,
            ImageDim::Dim1DArray => f.write_str("1d_array")?,
            ImageDim::Dim1DBuffer => f.write_str("1d_buffer")?,
            ImageDim::Dim2D => f.write_str("2d")?,
            ImageDim::Dim2DArray => f.write_str("2d_array")?,
            ImageDim::Dim3D => f.write_str("3d")?,
        }
        if self.multisampled {
            f.write_str("_msaa")?;
        }
        if self.depth {
            f.write_str("_depth")?;
        }
        f.write_str("_t")
    }
}

/// An opaque compute builtin, identified by kind and shape alone.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub enum BuiltinType {
    Event,
    Sampler,
    Image(ImageType),
}

impl core::fmt::Display for BuiltinType {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            Self::Event => f.write_str("event_t"),
            Self::Sampler => f.write_str("sampler_t"),
            Self::Image(img) => img.fmt(f),
        }
    }
}

#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct PointerType {
    pub addr_space: AddrSpace,
    pub inner: Box<Type>,
}

impl core::fmt::Display for PointerType {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        if self.addr_space != AddrSpace::Private {
            self.addr_space.fmt(f)?;
            f.write_str(" ")?;
        }
        self.inner.fmt(f)?;
        f.write_str("*")
    }
}

/// A parameterized opaque target extension type, as produced by the extended
/// materialization strategy.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct TargetExtType {
    pub name: String,
    pub int_params: Vec<u32>,
    pub type_params: Vec<Type>,
}

impl TargetExtType {
    pub const fn new(name: String) -> Self {
        Self {
            name,
            int_params: Vec::new(),
            type_params: Vec::new(),
        }
    }
}

impl core::fmt::Display for TargetExtType {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_fmt(format_args!("target(\"{}\"", self.name))?;
        for ty in &self.type_params {
            f.write_str(", ")?;
            ty.fmt(f)?;
        }
        for n in &self.int_params {
            f.write_str(", ")?;
            n.fmt(f)?;
        }
        f.write_str(")")
    }
}

/// A parameter type as the mangling engine sees it.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum Type {
    Void,
    Scalar(ScalarType),
    Pointer(PointerType),
    Builtin(BuiltinType),
    TargetExt(TargetExtType),
    /// A named opaque aggregate, such as the legacy `opencl.image2d_t`.
    Named(String),
}

impl Type {
    /// A pointer to `self` in the given address space.
    pub fn pointer_to(self, addr_space: AddrSpace) -> Self {
        Self::Pointer(PointerType {
            addr_space,
            inner: Box::new(self),
        })
    }
}

impl core::fmt::Display for Type {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            Self::Void => f.write_str("void"),
            Self::Scalar(st) => st.fmt(f),
            Self::Pointer(pty) => pty.fmt(f),
            Self::Builtin(b) => b.fmt(f),
            Self::TargetExt(t) => t.fmt(f),
            Self::Named(name) => f.write_str(name),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_default_qualifiers() {
        let quals = Qualifiers::default();
        assert!(quals.is_default());
        assert_eq!(quals.addr_space, AddrSpace::Private);
        assert!(quals.flags.is_empty());
    }

    #[test]
    fn test_addr_space_numbers() {
        assert_eq!(AddrSpace::Private.number(), 0);
        assert_eq!(AddrSpace::Global.number(), 1);
        assert_eq!(AddrSpace::Constant.number(), 2);
        assert_eq!(AddrSpace::Local.number(), 3);
        assert_eq!(AddrSpace::Generic.number(), 4);
        assert_eq!(AddrSpace::from_number(1), AddrSpace::Global);
        assert_eq!(AddrSpace::from_number(7).number(), 7);
    }

    #[test]
    fn test_scalar_display() {
        assert_eq!(ScalarType::int(32, true).to_string(), "int");
        assert_eq!(ScalarType::int(8, false).to_string(), "uchar");
        assert_eq!(ScalarType::float(64).to_string(), "double");
        assert_eq!(ScalarType::float(32).vector(4).to_string(), "float4");
        assert_eq!(ScalarType::int(16, true).vector(8).to_string(), "short8");
    }

    #[test]
    fn test_pointer_display() {
        let ty = Type::Scalar(ScalarType::int(32, true)).pointer_to(AddrSpace::Global);
        assert_eq!(ty.to_string(), "global int*");
        let ty = Type::Scalar(ScalarType::int(32, false)).pointer_to(AddrSpace::Private);
        assert_eq!(ty.to_string(), "uint*");
    }

    #[test]
    fn test_image_display() {
        let img = ImageType::new(ImageDim::Dim2DArray)
            .with_multisampling()
            .with_depth();
        assert_eq!(img.to_string(), "image2d_array_msaa_depth_t");
        assert_eq!(
            ImageType::new(ImageDim::Dim1DBuffer).to_string(),
            "image1d_buffer_t"
        );
    }

    #[test]
    fn test_qualifier_display() {
        let quals = Qualifiers {
            addr_space: AddrSpace::Global,
            flags: QualFlags::CONST | QualFlags::VOLATILE,
        };
        assert_eq!(quals.to_string(), "global volatile const");
        assert_eq!(Qualifiers::default().to_string(), "");
    }

    #[test]
    fn test_vector_element() {
        let v = ScalarType::float(32).vector(4);
        assert_eq!(v.element(), ScalarType::float(32));
        assert_eq!(v.header.vectorsize, Some(4));
    }
}
