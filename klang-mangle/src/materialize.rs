//! Reconstruction of decoded builtins as concrete host types.
//!
//! The two strategies correspond to the two encoding epochs: legacy host
//! types are named opaque aggregates, extended host types are parameterized
//! target extension types. The epoch is fixed at process configuration time
//! and never inspected inside the codec, so neither direction branches on a
//! version flag per call.

use klang_struct::tgtext;
use klang_struct::tgtext::{AccessQual, ImageDepthCode, ImageDimCode, ImageSampled};
use klang_struct::{BuiltinType, ImageDim, ImageType, TargetExtType, Type};

/// The compiler-version-scoped policy governing how decoded descriptors
/// materialize into host types. It never changes the mangled text.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub enum EncodingEpoch {
    Legacy,
    Extended,
}

impl EncodingEpoch {
    pub fn materializer(self) -> &'static dyn TypeMaterializer {
        match self {
            Self::Legacy => &LegacyTypes,
            Self::Extended => &ExtendedTypes,
        }
    }
}

/// The seam between decoded descriptors and the host type system.
///
/// Both implementations are registry-consistent: materializing a descriptor
/// and describing the result reaches a builtin with the same canonical name
/// the descriptor had, up to the fidelity the epoch can express.
pub trait TypeMaterializer {
    /// The host type for a decoded descriptor. `None` when the strategy has
    /// no representation for it.
    fn materialize(&self, ty: &Type) -> Option<Type>;

    /// The canonical descriptor for a host type. `None` when the host type
    /// does not belong to this strategy.
    fn describe(&self, ty: &Type) -> Option<Type>;
}

/// Builtins as named opaque aggregates, `opencl.image2d_t` style. The name
/// encodes dimensionality only; depth and multisample distinctions do not
/// survive materialization in this epoch.
pub struct LegacyTypes;

/// Builtins as parameterized target extension types carrying the full shape
/// tuple.
pub struct ExtendedTypes;

fn legacy_struct_name(builtin: &BuiltinType) -> &'static str {
    match builtin {
        BuiltinType::Event => "opencl.event_t",
        BuiltinType::Sampler => "opencl.sampler_t",
        BuiltinType::Image(img) => match img.dim {
            ImageDim::Dim1D => "opencl.image1d_t",
            ImageDim::Dim1DArray => "opencl.image1d_array_t",
            ImageDim::Dim1DBuffer => "opencl.image1d_buffer_t",
            ImageDim::Dim2D => "opencl.image2d_t",
            ImageDim::Dim2DArray => "opencl.image2d_array_t",
            ImageDim::Dim3D => "opencl.image3d_t",
        },
    }
}

pub(crate) fn legacy_builtin(name: &str) -> Option<BuiltinType> {
    let dim = match name {
        "opencl.event_t" => return Some(BuiltinType::Event),
        "opencl.sampler_t" => return Some(BuiltinType::Sampler),
        "opencl.image1d_t" => ImageDim::Dim1D,
        "opencl.image1d_array_t" => ImageDim::Dim1DArray,
        "opencl.image1d_buffer_t" => ImageDim::Dim1DBuffer,
        "opencl.image2d_t" => ImageDim::Dim2D,
        "opencl.image2d_array_t" => ImageDim::Dim2DArray,
        "opencl.image3d_t" => ImageDim::Dim3D,
        _ => return None,
    };
    Some(BuiltinType::Image(ImageType::new(dim)))
}

fn dim_codes(dim: ImageDim) -> (ImageDimCode, bool) {
    match dim {
        ImageDim::Dim1D => (ImageDimCode::Dim1D, false),
        ImageDim::Dim1DArray => (ImageDimCode::Dim1D, true),
        ImageDim::Dim1DBuffer => (ImageDimCode::DimBuffer, false),
        ImageDim::Dim2D => (ImageDimCode::Dim2D, false),
        ImageDim::Dim2DArray => (ImageDimCode::Dim2D, true),
        ImageDim::Dim3D => (ImageDimCode::Dim3D, false),
    }
}

fn dim_from_codes(code: ImageDimCode, arrayed: bool) -> Option<ImageDim> {
    if code == ImageDimCode::Dim1D {
        Some(if arrayed {
            ImageDim::Dim1DArray
        } else {
            ImageDim::Dim1D
        })
    } else if code == ImageDimCode::Dim2D {
        Some(if arrayed {
            ImageDim::Dim2DArray
        } else {
            ImageDim::Dim2D
        })
    } else if code == ImageDimCode::DimBuffer && !arrayed {
        Some(ImageDim::Dim1DBuffer)
    } else if code == ImageDimCode::Dim3D && !arrayed {
        Some(ImageDim::Dim3D)
    } else {
        None
    }
}

fn ext_type(builtin: &BuiltinType) -> TargetExtType {
    match builtin {
        BuiltinType::Event => TargetExtType::new(String::from(tgtext::EVENT_NAME)),
        BuiltinType::Sampler => TargetExtType::new(String::from(tgtext::SAMPLER_NAME)),
        BuiltinType::Image(img) => {
            let (code, arrayed) = dim_codes(img.dim);
            let mut int_params = vec![0u32; tgtext::IMAGE_INT_PARAMS];
            int_params[tgtext::IMAGE_DIM_IDX] = code.value();
            int_params[tgtext::IMAGE_DEPTH_IDX] = if img.depth {
                ImageDepthCode::Depth.value()
            } else {
                ImageDepthCode::NoDepth.value()
            };
            int_params[tgtext::IMAGE_ARRAYED_IDX] = u32::from(arrayed);
            int_params[tgtext::IMAGE_MS_IDX] = u32::from(img.multisampled);
            int_params[tgtext::IMAGE_SAMPLED_IDX] = img.sampled.value();
            int_params[tgtext::IMAGE_ACCESS_QUAL_IDX] = img.access.value();
            TargetExtType {
                name: String::from(tgtext::IMAGE_NAME),
                int_params,
                type_params: vec![Type::Void],
            }
        }
    }
}

pub(crate) fn ext_builtin(t: &TargetExtType) -> Option<BuiltinType> {
    match t.name.as_str() {
        tgtext::EVENT_NAME => Some(BuiltinType::Event),
        tgtext::SAMPLER_NAME => Some(BuiltinType::Sampler),
        tgtext::IMAGE_NAME => {
            if t.int_params.len() < tgtext::IMAGE_INT_PARAMS {
                return None;
            }
            let code = ImageDimCode::from_value(t.int_params[tgtext::IMAGE_DIM_IDX]);
            let arrayed = t.int_params[tgtext::IMAGE_ARRAYED_IDX] != 0;
            let dim = dim_from_codes(code, arrayed)?;
            let depth = ImageDepthCode::from_value(t.int_params[tgtext::IMAGE_DEPTH_IDX])
                == ImageDepthCode::Depth;
            let multisampled = t.int_params[tgtext::IMAGE_MS_IDX] != 0;
            if (depth || multisampled) && !dim.accepts_shape_flags() {
                return None;
            }
            Some(BuiltinType::Image(ImageType {
                dim,
                depth,
                multisampled,
                sampled: ImageSampled::from_value(t.int_params[tgtext::IMAGE_SAMPLED_IDX]),
                access: AccessQual::from_value(t.int_params[tgtext::IMAGE_ACCESS_QUAL_IDX]),
            }))
        }
        _ => None,
    }
}

/// The builtin a type denotes, across all three spellings a host may use:
/// the descriptor itself, the legacy aggregate name, or the extended target
/// extension form. Encoding consults this so that every spelling renders to
/// the identical canonical name.
pub(crate) fn canonical_builtin(ty: &Type) -> Option<BuiltinType> {
    match ty {
        Type::Builtin(builtin) => Some(*builtin),
        Type::Named(name) => legacy_builtin(name),
        Type::TargetExt(t) => ext_builtin(t),
        _ => None,
    }
}

impl TypeMaterializer for LegacyTypes {
    fn materialize(&self, ty: &Type) -> Option<Type> {
        match ty {
            Type::Builtin(builtin) => Some(Type::Named(String::from(legacy_struct_name(builtin)))),
            Type::Pointer(pty) => {
                let inner = self.materialize(&pty.inner)?;
                Some(inner.pointer_to(pty.addr_space))
            }
            other => Some(other.clone()),
        }
    }

    fn describe(&self, ty: &Type) -> Option<Type> {
        match ty {
            Type::Named(name) => legacy_builtin(name).map(Type::Builtin),
            Type::Builtin(_) => Some(ty.clone()),
            Type::TargetExt(_) => None,
            Type::Pointer(pty) => {
                let inner = self.describe(&pty.inner)?;
                Some(inner.pointer_to(pty.addr_space))
            }
            other => Some(other.clone()),
        }
    }
}

impl TypeMaterializer for ExtendedTypes {
    fn materialize(&self, ty: &Type) -> Option<Type> {
        match ty {
            Type::Builtin(builtin) => Some(Type::TargetExt(ext_type(builtin))),
            Type::Pointer(pty) => {
                let inner = self.materialize(&pty.inner)?;
                Some(inner.pointer_to(pty.addr_space))
            }
            other => Some(other.clone()),
        }
    }

    fn describe(&self, ty: &Type) -> Option<Type> {
        match ty {
            Type::TargetExt(t) => ext_builtin(t).map(Type::Builtin),
            Type::Builtin(_) => Some(ty.clone()),
            Type::Named(_) => None,
            Type::Pointer(pty) => {
                let inner = self.describe(&pty.inner)?;
                Some(inner.pointer_to(pty.addr_space))
            }
            other => Some(other.clone()),
        }
    }
}
