//! The decoder half of the engine.
//!
//! Decoding is a single left-to-right scan. Substitution indices line up
//! with the encoder because every fully parsed component registers in the
//! same order the encoder registered it.

use klang_struct::{AddrSpace, PointerType, QualFlags, Qualifiers, ScalarType, Type};

use crate::builtins;
use crate::sub::Substitutions;
use crate::Mangler;

#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum DemangleError {
    /// The input does not begin with `_Z`.
    NotMangled,
    /// A decimal length prefix is missing, overlong, or runs past the input.
    MalformedLength { at: usize },
    /// A substitution token is malformed or references an entry that does
    /// not exist yet.
    BadSubstitution { at: usize },
    /// A length-prefixed name is not in the builtin registry, or a type code
    /// is not part of the grammar.
    UnknownBuiltin { at: usize, name: String },
    /// A qualifier code is repeated or out of order.
    MalformedQualifiers { at: usize },
    /// The input ends inside a component.
    TrailingGarbage { at: usize },
}

pub type Result<T> = core::result::Result<T, DemangleError>;

impl core::fmt::Display for DemangleError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            Self::NotMangled => f.write_str("not a mangled symbol"),
            Self::MalformedLength { at } => {
                f.write_fmt(format_args!("malformed length prefix at offset {}", at))
            }
            Self::BadSubstitution { at } => {
                f.write_fmt(format_args!("invalid substitution reference at offset {}", at))
            }
            Self::UnknownBuiltin { at, name } => f.write_fmt(format_args!(
                "unknown builtin name \"{}\" at offset {}",
                name, at
            )),
            Self::MalformedQualifiers { at } => {
                f.write_fmt(format_args!("malformed qualifiers at offset {}", at))
            }
            Self::TrailingGarbage { at } => {
                f.write_fmt(format_args!("trailing garbage at offset {}", at))
            }
        }
    }
}

impl std::error::Error for DemangleError {}

/// A successfully decoded symbol: the source name plus one type and one
/// qualifier record per parameter, in parameter order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Demangled {
    pub name: String,
    pub types: Vec<Type>,
    pub quals: Vec<Qualifiers>,
}

struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn done(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.as_bytes().get(self.pos + offset).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consumes a run of decimal digits. `None` if there is no digit at the
    /// cursor or the value overflows.
    fn number(&mut self) -> Option<usize> {
        let start = self.pos;
        let mut value = 0usize;
        while let Some(b @ b'0'..=b'9') = self.peek() {
            value = value
                .checked_mul(10)?
                .checked_add(usize::from(b - b'0'))?;
            self.pos += 1;
        }
        if self.pos == start {
            None
        } else {
            Some(value)
        }
    }

    /// Consumes exactly `n` bytes. `None` if fewer remain or the cut would
    /// split a character.
    fn take(&mut self, n: usize) -> Option<&'a str> {
        let end = self.pos.checked_add(n)?;
        let s = self.input.get(self.pos..end)?;
        self.pos = end;
        Some(s)
    }

    /// The character at the cursor, for error payloads.
    fn current_char(&self) -> Option<char> {
        self.input.get(self.pos..)?.chars().next()
    }
}

impl Mangler {
    /// Decodes a mangled symbol back into its source name, parameter types,
    /// and parameter qualifiers.
    pub fn demangle(&self, mangled: &str) -> Result<Demangled> {
        let mut scanner = Scanner::new(mangled);
        if !(scanner.eat(b'_') && scanner.eat(b'Z')) {
            return Err(DemangleError::NotMangled);
        }
        let at = scanner.pos;
        let len = scanner
            .number()
            .filter(|len| *len > 0)
            .ok_or(DemangleError::MalformedLength { at })?;
        let name = scanner
            .take(len)
            .ok_or(DemangleError::MalformedLength { at })?;
        let mut subs = Substitutions::new();
        let mut types = Vec::new();
        let mut quals = Vec::new();
        while !scanner.done() {
            let (ty, q) = parse_param(&mut scanner, &mut subs)?;
            types.push(ty);
            quals.push(q);
        }
        Ok(Demangled {
            name: String::from(name),
            types,
            quals,
        })
    }
}

/// The demangled base name of a symbol, or the input unchanged when it is
/// not a mangled symbol.
pub fn base_name(mangled: &str) -> &str {
    let mut scanner = Scanner::new(mangled);
    if scanner.eat(b'_') && scanner.eat(b'Z') {
        if let Some(len) = scanner.number().filter(|len| *len > 0) {
            if let Some(name) = scanner.take(len) {
                return name;
            }
        }
    }
    mangled
}

fn parse_param(s: &mut Scanner, subs: &mut Substitutions) -> Result<(Type, Qualifiers)> {
    if s.peek() == Some(b'S') {
        return parse_substitution(s, subs);
    }
    let quals = parse_qualifiers(s)?;
    let ty = parse_core(s)?;
    subs.register(ty.clone(), quals);
    Ok((ty, quals))
}

fn parse_substitution(s: &mut Scanner, subs: &Substitutions) -> Result<(Type, Qualifiers)> {
    let at = s.pos;
    s.bump(); // 'S'
    let index = if s.eat(b'_') {
        0
    } else {
        let n = s.number().ok_or(DemangleError::BadSubstitution { at })?;
        if !s.eat(b'_') {
            return Err(DemangleError::BadSubstitution { at });
        }
        n.checked_add(1)
            .ok_or(DemangleError::BadSubstitution { at })?
    };
    let (ty, quals) = subs
        .get(index)
        .ok_or(DemangleError::BadSubstitution { at })?;
    Ok((ty.clone(), *quals))
}

fn parse_qualifiers(s: &mut Scanner) -> Result<Qualifiers> {
    let mut quals = Qualifiers::default();
    if s.peek() == Some(b'U') {
        quals.addr_space = parse_addr_space(s)?;
    }
    if s.eat(b'r') {
        quals.flags |= QualFlags::RESTRICT;
    }
    if s.eat(b'V') {
        quals.flags |= QualFlags::VOLATILE;
    }
    if s.eat(b'K') {
        quals.flags |= QualFlags::CONST;
    }
    Ok(quals)
}

fn parse_addr_space(s: &mut Scanner) -> Result<AddrSpace> {
    let at = s.pos;
    s.bump(); // 'U'
    let len = s
        .number()
        .ok_or(DemangleError::MalformedQualifiers { at })?;
    let name = s
        .take(len)
        .ok_or(DemangleError::MalformedQualifiers { at })?;
    let digits = name
        .strip_prefix("AS")
        .ok_or(DemangleError::MalformedQualifiers { at })?;
    let n = digits
        .parse::<u16>()
        .map_err(|_| DemangleError::MalformedQualifiers { at })?;
    Ok(AddrSpace::from_number(n))
}

fn scalar_for(b: u8) -> Option<ScalarType> {
    match b {
        b'b' => Some(ScalarType::boolean()),
        b'c' => Some(ScalarType::int(8, true)),
        b'h' => Some(ScalarType::int(8, false)),
        b's' => Some(ScalarType::int(16, true)),
        b't' => Some(ScalarType::int(16, false)),
        b'i' => Some(ScalarType::int(32, true)),
        b'j' => Some(ScalarType::int(32, false)),
        b'l' => Some(ScalarType::int(64, true)),
        b'm' => Some(ScalarType::int(64, false)),
        b'f' => Some(ScalarType::float(32)),
        b'd' => Some(ScalarType::float(64)),
        _ => None,
    }
}

fn parse_core(s: &mut Scanner) -> Result<Type> {
    let at = s.pos;
    match s.peek() {
        None => Err(DemangleError::TrailingGarbage { at }),
        Some(b'v') => {
            s.bump();
            Ok(Type::Void)
        }
        Some(b'D') if s.peek_at(1) == Some(b'h') => {
            s.bump();
            s.bump();
            Ok(Type::Scalar(ScalarType::float(16)))
        }
        Some(b'D') if s.peek_at(1) == Some(b'v') => {
            s.bump();
            s.bump();
            parse_vector(s, at)
        }
        Some(b'P') => {
            s.bump();
            let addr_space = if s.peek() == Some(b'U') {
                parse_addr_space(s)?
            } else {
                AddrSpace::Private
            };
            let inner = parse_core(s)?;
            Ok(Type::Pointer(PointerType {
                addr_space,
                inner: Box::new(inner),
            }))
        }
        Some(b'0'..=b'9') => parse_builtin(s),
        Some(b'U' | b'r' | b'V' | b'K') => Err(DemangleError::MalformedQualifiers { at }),
        Some(b) => match scalar_for(b) {
            Some(st) => {
                s.bump();
                Ok(Type::Scalar(st))
            }
            None => Err(DemangleError::UnknownBuiltin {
                at,
                name: s.current_char().map(String::from).unwrap_or_default(),
            }),
        },
    }
}

fn parse_vector(s: &mut Scanner, at: usize) -> Result<Type> {
    let len = s.number().ok_or(DemangleError::MalformedLength { at })?;
    if len < 2 || len > usize::from(u16::MAX) {
        return Err(DemangleError::MalformedLength { at });
    }
    if !s.eat(b'_') {
        return Err(DemangleError::MalformedLength { at });
    }
    let elem_at = s.pos;
    let element = match s.peek() {
        None => return Err(DemangleError::TrailingGarbage { at: elem_at }),
        Some(b'D') if s.peek_at(1) == Some(b'h') => {
            s.bump();
            s.bump();
            ScalarType::float(16)
        }
        Some(b) => match scalar_for(b) {
            Some(st) => {
                s.bump();
                st
            }
            None => {
                return Err(DemangleError::UnknownBuiltin {
                    at: elem_at,
                    name: s.current_char().map(String::from).unwrap_or_default(),
                })
            }
        },
    };
    Ok(Type::Scalar(element.vector(len as u16)))
}

fn parse_builtin(s: &mut Scanner) -> Result<Type> {
    let at = s.pos;
    let len = s.number().ok_or(DemangleError::MalformedLength { at })?;
    let name = s
        .take(len)
        .ok_or(DemangleError::MalformedLength { at })?;
    let builtin = builtins::lookup_kind(name).ok_or_else(|| DemangleError::UnknownBuiltin {
        at,
        name: String::from(name),
    })?;
    Ok(Type::Builtin(builtin))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::EncodingEpoch;
    use klang_struct::tgtext::{AccessQual, ImageSampled};
    use klang_struct::{BuiltinType, ImageDim, ScalarTypeKind};

    fn mangler() -> Mangler {
        Mangler::new(EncodingEpoch::Extended)
    }

    #[test]
    fn test_demangle_image1d() {
        let got = mangler().demangle("_Z4test11ocl_image1d").unwrap();
        assert_eq!(got.name, "test");
        assert_eq!(got.types.len(), 1);
        assert_eq!(got.quals.len(), 1);
        match &got.types[0] {
            Type::Builtin(BuiltinType::Image(img)) => {
                assert_eq!(img.dim, ImageDim::Dim1D);
                assert!(!img.depth);
                assert!(!img.multisampled);
                assert_eq!(img.sampled, ImageSampled::Runtime);
                assert_eq!(img.access, AccessQual::ReadOnly);
            }
            other => panic!("expected an image, got {:?}", other),
        }
        assert!(got.quals[0].is_default());
    }

    #[test]
    fn test_demangle_event() {
        let got = mangler().demangle("_Z4test9ocl_event").unwrap();
        assert_eq!(got.name, "test");
        assert_eq!(got.types, vec![Type::Builtin(BuiltinType::Event)]);
    }

    #[test]
    fn test_demangle_unknown_builtin() {
        let got = mangler().demangle("_Z1f7garbage");
        assert_eq!(
            got,
            Err(DemangleError::UnknownBuiltin {
                at: 4,
                name: String::from("garbage"),
            })
        );
    }

    #[test]
    fn test_demangle_rejects_unmangled() {
        assert_eq!(mangler().demangle("test"), Err(DemangleError::NotMangled));
        assert_eq!(mangler().demangle(""), Err(DemangleError::NotMangled));
        assert_eq!(mangler().demangle("_Y3foo"), Err(DemangleError::NotMangled));
    }

    #[test]
    fn test_demangle_malformed_lengths() {
        assert!(matches!(
            mangler().demangle("_Zfoo"),
            Err(DemangleError::MalformedLength { .. })
        ));
        assert!(matches!(
            mangler().demangle("_Z0"),
            Err(DemangleError::MalformedLength { .. })
        ));
        assert!(matches!(
            mangler().demangle("_Z4te"),
            Err(DemangleError::MalformedLength { .. })
        ));
        assert!(matches!(
            mangler().demangle("_Z1f99ocl_event"),
            Err(DemangleError::MalformedLength { .. })
        ));
    }

    #[test]
    fn test_demangle_qualifiers() {
        let got = mangler().demangle("_Z1fU3AS1rVKi").unwrap();
        assert_eq!(got.name, "f");
        assert_eq!(got.types.len(), 1);
        let quals = got.quals[0];
        assert_eq!(quals.addr_space, klang_struct::AddrSpace::Global);
        assert!(quals.flags.contains(QualFlags::RESTRICT));
        assert!(quals.flags.contains(QualFlags::VOLATILE));
        assert!(quals.flags.contains(QualFlags::CONST));
    }

    #[test]
    fn test_demangle_qualifier_misuse() {
        // repeated
        assert!(matches!(
            mangler().demangle("_Z1fKKi"),
            Err(DemangleError::MalformedQualifiers { .. })
        ));
        // out of order: const may not precede restrict
        assert!(matches!(
            mangler().demangle("_Z1fKri"),
            Err(DemangleError::MalformedQualifiers { .. })
        ));
        // address-space qualifier after a flag
        assert!(matches!(
            mangler().demangle("_Z1fKU3AS1i"),
            Err(DemangleError::MalformedQualifiers { .. })
        ));
        // vendor qualifier that is not an address space
        assert!(matches!(
            mangler().demangle("_Z1fU3fooi"),
            Err(DemangleError::MalformedQualifiers { .. })
        ));
    }

    #[test]
    fn test_demangle_unknown_address_space() {
        let got = mangler().demangle("_Z1fU4AS17i").unwrap();
        assert_eq!(got.quals[0].addr_space.number(), 17);
    }

    #[test]
    fn test_demangle_vector() {
        let got = mangler().demangle("_Z1fDv4_f").unwrap();
        match got.types[0] {
            Type::Scalar(st) => {
                assert_eq!(st.kind, ScalarTypeKind::Float);
                assert_eq!(st.header.bitsize, 32);
                assert_eq!(st.header.vectorsize, Some(4));
            }
            ref other => panic!("expected a vector, got {:?}", other),
        }
        let got = mangler().demangle("_Z1fDv8_Dh").unwrap();
        match got.types[0] {
            Type::Scalar(st) => {
                assert_eq!(st.header.bitsize, 16);
                assert_eq!(st.header.vectorsize, Some(8));
            }
            ref other => panic!("expected a vector, got {:?}", other),
        }
    }

    #[test]
    fn test_demangle_pointer() {
        let got = mangler().demangle("_Z1fPU3AS3Dv2_j").unwrap();
        match &got.types[0] {
            Type::Pointer(pty) => {
                assert_eq!(pty.addr_space, klang_struct::AddrSpace::Local);
                match *pty.inner {
                    Type::Scalar(st) => assert_eq!(st.header.vectorsize, Some(2)),
                    ref other => panic!("expected a vector pointee, got {:?}", other),
                }
            }
            other => panic!("expected a pointer, got {:?}", other),
        }
    }

    #[test]
    fn test_demangle_substitutions() {
        let got = mangler().demangle("_Z3foo11ocl_image1dS_").unwrap();
        assert_eq!(got.types.len(), 2);
        assert_eq!(got.types[0], got.types[1]);
        assert_eq!(got.quals[0], got.quals[1]);

        let got = mangler().demangle("_Z3fooiKjS0_").unwrap();
        assert_eq!(got.types.len(), 3);
        assert_eq!(got.types[2], got.types[1]);
        assert_eq!(got.quals[2], got.quals[1]);
    }

    #[test]
    fn test_demangle_bad_substitutions() {
        // empty table
        assert!(matches!(
            mangler().demangle("_Z3fooS_"),
            Err(DemangleError::BadSubstitution { .. })
        ));
        // index one past the table
        assert!(matches!(
            mangler().demangle("_Z3fooiS0_"),
            Err(DemangleError::BadSubstitution { .. })
        ));
        // missing terminator
        assert!(matches!(
            mangler().demangle("_Z3fooiS0"),
            Err(DemangleError::BadSubstitution { .. })
        ));
    }

    #[test]
    fn test_demangle_trailing_garbage() {
        assert!(matches!(
            mangler().demangle("_Z1fK"),
            Err(DemangleError::TrailingGarbage { .. })
        ));
        assert!(matches!(
            mangler().demangle("_Z1fPU3AS1"),
            Err(DemangleError::TrailingGarbage { .. })
        ));
    }

    #[test]
    fn test_demangle_accepts_uncompressed_repeats() {
        // older encoders may not compress; both spellings decode alike
        let compressed = mangler().demangle("_Z3fooii").unwrap();
        assert_eq!(compressed.types[0], compressed.types[1]);
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("_Z4test11ocl_image1d"), "test");
        assert_eq!(base_name("_Z3foo"), "foo");
        assert_eq!(base_name("main"), "main");
        assert_eq!(base_name("_Zbroken"), "_Zbroken");
    }

    #[test]
    fn test_round_trip_over_registry() {
        let m = mangler();
        for builtin in crate::builtins::enumerate() {
            let ty = Type::Builtin(builtin);
            let quals = Qualifiers::default();
            let sym = m.mangle("kernel_fn", &[(ty.clone(), quals)]).unwrap();
            let got = m.demangle(&sym).unwrap();
            assert_eq!(got.name, "kernel_fn");
            assert_eq!(got.types, vec![ty]);
            assert_eq!(got.quals, vec![quals]);
        }
    }

    #[test]
    fn test_round_trip_scalars_and_pointers() {
        use klang_struct::AddrSpace;

        let m = mangler();
        let quals = Qualifiers {
            addr_space: AddrSpace::Constant,
            flags: QualFlags::CONST,
        };
        let params = [
            (Type::Void, Qualifiers::default()),
            (Type::Scalar(ScalarType::int(64, false)), quals),
            (
                Type::Scalar(ScalarType::float(32).vector(16)).pointer_to(AddrSpace::Global),
                Qualifiers::default(),
            ),
            (Type::Scalar(ScalarType::int(64, false)), quals),
        ];
        let sym = m.mangle("kernel_fn", &params).unwrap();
        let got = m.demangle(&sym).unwrap();
        assert_eq!(got.types.len(), 4);
        for (i, (ty, q)) in params.iter().enumerate() {
            assert_eq!(&got.types[i], ty);
            assert_eq!(&got.quals[i], q);
        }
    }
}
