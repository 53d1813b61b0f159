//! The encoder half of the engine.

use klang_struct::{AddrSpace, QualFlags, Qualifiers, ScalarType, ScalarTypeKind, Type};
use unicode_xid::UnicodeXID;

use crate::builtins;
use crate::materialize::canonical_builtin;
use crate::sub::{self, Substitutions};
use crate::{EncodingEpoch, Mangler};

#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum MangleError {
    /// The function name is empty or not a valid identifier.
    InvalidName,
    /// The descriptor has no defined mangling in the active encoding epoch.
    /// The payload is the spelling of the rejected type.
    UnsupportedType(String),
}

pub type Result<T> = core::result::Result<T, MangleError>;

impl core::fmt::Display for MangleError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            Self::InvalidName => f.write_str("function name is not a valid identifier"),
            Self::UnsupportedType(ty) => {
                f.write_fmt(format_args!("type {} has no defined mangling", ty))
            }
        }
    }
}

impl std::error::Error for MangleError {}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_xid_start()
}

fn is_ident_part(c: char) -> bool {
    c == '_' || c.is_xid_continue()
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if is_ident_start(c) => chars.all(is_ident_part),
        _ => false,
    }
}

fn push_source_name(out: &mut String, name: &str) {
    out.push_str(&name.len().to_string());
    out.push_str(name);
}

fn push_addr_space(out: &mut String, space: AddrSpace) {
    let n = space.number();
    if n != 0 {
        let qual = format!("AS{}", n);
        out.push('U');
        push_source_name(out, &qual);
    }
}

fn scalar_code(st: &ScalarType) -> Result<&'static str> {
    match (st.kind, st.header.bitsize) {
        (ScalarTypeKind::Bool, _) => Ok("b"),
        (ScalarTypeKind::Integer { signed: true }, 8) => Ok("c"),
        (ScalarTypeKind::Integer { signed: false }, 8) => Ok("h"),
        (ScalarTypeKind::Integer { signed: true }, 16) => Ok("s"),
        (ScalarTypeKind::Integer { signed: false }, 16) => Ok("t"),
        (ScalarTypeKind::Integer { signed: true }, 32) => Ok("i"),
        (ScalarTypeKind::Integer { signed: false }, 32) => Ok("j"),
        (ScalarTypeKind::Integer { signed: true }, 64) => Ok("l"),
        (ScalarTypeKind::Integer { signed: false }, 64) => Ok("m"),
        (ScalarTypeKind::Float, 16) => Ok("Dh"),
        (ScalarTypeKind::Float, 32) => Ok("f"),
        (ScalarTypeKind::Float, 64) => Ok("d"),
        _ => Err(MangleError::UnsupportedType(st.to_string())),
    }
}

impl Mangler {
    /// Mangles a function name and its parameter list into a symbol.
    ///
    /// Components repeat within one call as `S_`, `S0_`, ... back-references
    /// whenever a structurally equal `(type, qualifiers)` pair was already
    /// emitted. On error nothing is returned; no partial symbol escapes.
    pub fn mangle(&self, name: &str, params: &[(Type, Qualifiers)]) -> Result<String> {
        if !is_valid_name(name) {
            return Err(MangleError::InvalidName);
        }
        let mut out = String::from("_Z");
        push_source_name(&mut out, name);
        let mut subs = Substitutions::new();
        for (ty, quals) in params {
            match subs.find(ty, quals) {
                Some(index) => out.push_str(&sub::token(index)),
                None => {
                    out.push_str(&self.component(ty, quals)?);
                    subs.register(ty.clone(), *quals);
                }
            }
        }
        Ok(out)
    }

    /// Mangles a single type, without the `_Z<name>` envelope and without
    /// any substitution context.
    pub fn mangle_type(&self, ty: &Type, quals: &Qualifiers) -> Result<String> {
        self.component(ty, quals)
    }

    fn component(&self, ty: &Type, quals: &Qualifiers) -> Result<String> {
        let mut out = String::new();
        push_addr_space(&mut out, quals.addr_space);
        if quals.flags.contains(QualFlags::RESTRICT) {
            out.push('r');
        }
        if quals.flags.contains(QualFlags::VOLATILE) {
            out.push('V');
        }
        if quals.flags.contains(QualFlags::CONST) {
            out.push('K');
        }
        self.core(&mut out, ty)?;
        Ok(out)
    }

    fn core(&self, out: &mut String, ty: &Type) -> Result<()> {
        if let Some(builtin) = canonical_builtin(ty) {
            let name = builtins::lookup_name(&builtin)
                .ok_or_else(|| MangleError::UnsupportedType(ty.to_string()))?;
            push_source_name(out, &name);
            return Ok(());
        }
        match ty {
            Type::Void => out.push('v'),
            Type::Scalar(st) => match st.header.vectorsize {
                Some(n) => {
                    if n < 2 {
                        return Err(MangleError::UnsupportedType(st.to_string()));
                    }
                    out.push_str("Dv");
                    out.push_str(&n.to_string());
                    out.push('_');
                    out.push_str(scalar_code(&st.element())?);
                }
                None => out.push_str(scalar_code(st)?),
            },
            Type::Pointer(pty) => {
                out.push('P');
                push_addr_space(out, pty.addr_space);
                match canonical_builtin(&pty.inner) {
                    Some(builtin) => {
                        // A legacy pointer carries no element type for opaque
                        // builtins; refusing is the contract, guessing is not.
                        if self.epoch == EncodingEpoch::Legacy {
                            return Err(MangleError::UnsupportedType(format!(
                                "pointer to opaque builtin type {}",
                                pty.inner
                            )));
                        }
                        let name = builtins::lookup_name(&builtin)
                            .ok_or_else(|| MangleError::UnsupportedType(pty.inner.to_string()))?;
                        push_source_name(out, &name);
                    }
                    None => self.core(out, &pty.inner)?,
                }
            }
            // canonical_builtin already declined these
            Type::Builtin(_) | Type::TargetExt(_) | Type::Named(_) => {
                return Err(MangleError::UnsupportedType(ty.to_string()));
            }
        }
        Ok(())
    }
}
