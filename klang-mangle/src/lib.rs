//! Encoding and decoding of kernel function symbols.
//!
//! A mangled name carries a function's source name and one component per
//! parameter, compressed with back-references to previously emitted
//! components. The full grammar:
//!
//! ```abnf
//! mangled-name := "_Z" <source-name> *<parameter>
//!
//! source-name := <decimal-number> <identifier> ; length prefix, no leading zeros
//!
//! parameter := <substitution> / [<qualifiers>] <type>
//!
//! qualifiers := [<as-qualifier>] ["r"] ["V"] ["K"]
//!
//! as-qualifier := "U" <decimal-number> "AS" <decimal-number> ; length-prefixed vendor qualifier
//!
//! type := <scalar-code> / <vector-type> / <pointer-type> / <builtin-name>
//!
//! scalar-code := "v" / "b" / "c" / "h" / "s" / "t" / "i" / "j" / "l" / "m" / "Dh" / "f" / "d"
//!
//! vector-type := "Dv" <decimal-number> "_" <scalar-code>
//!
//! pointer-type := "P" [<as-qualifier>] <type>
//!
//! builtin-name := <decimal-number> <name> ; length prefix, name drawn from the builtin registry
//!
//! substitution := "S" [<decimal-number>] "_" ; "S_" is the first component, "S0_" the second
//! ```
//!
//! Builtin names and the substitution syntax are append-only: any symbol a
//! past encoder produced stays decodable, and no canonical name is ever
//! reassigned to a different shape.

pub mod builtins;
pub mod demangle;
pub mod mangle;
pub mod materialize;
mod sub;

pub use demangle::{base_name, DemangleError, Demangled};
pub use mangle::MangleError;
pub use materialize::{EncodingEpoch, ExtendedTypes, LegacyTypes, TypeMaterializer};

/// The mangling engine, configured with the encoding epoch in effect for the
/// process.
///
/// The epoch never changes the mangled text; it decides how decoded
/// descriptors materialize into host types, and which descriptors the
/// encoder must reject as unrepresentable. Both directions are pure: all
/// mutable state lives in a table scoped to one call, so a single `Mangler`
/// may be shared freely across threads.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub struct Mangler {
    epoch: EncodingEpoch,
}

impl Mangler {
    pub const fn new(epoch: EncodingEpoch) -> Self {
        Self { epoch }
    }

    pub const fn epoch(&self) -> EncodingEpoch {
        self.epoch
    }

    /// The materialization strategy matching this mangler's epoch.
    pub fn materializer(&self) -> &'static dyn TypeMaterializer {
        self.epoch.materializer()
    }
}
