//! Intermediate model — probed facts sitting between extraction and emission.

use crate::catalog::{ConstantSpec, TypeSpec};

/// Probed representation of one primitive SDK type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasKind {
    /// Fixed-width integer; width and signedness are read back from the
    /// probe translation unit, never written down in source.
    Integer { width_bits: u32, signed: bool },
    /// Floating-point type; width is probed, the representation is IEEE.
    Float { width_bits: u32 },
    /// NUL-terminated wide-character string, rendered as `Cwstring`.
    WideString,
    /// Pointer to another emitted alias, rendered as `Ptr{name}`.
    Pointer(&'static str),
}

impl AliasKind {
    /// The target-language spelling of this representation.
    pub fn render(&self) -> String {
        match self {
            AliasKind::Integer { width_bits, signed } => {
                format!("{}Int{}", if *signed { "" } else { "U" }, width_bits)
            }
            AliasKind::Float { width_bits } => format!("Float{}", width_bits),
            AliasKind::WideString => "Cwstring".to_string(),
            AliasKind::Pointer(name) => format!("Ptr{{{}}}", name),
        }
    }
}

/// A probed type alias: the static catalog entry plus what the probe saw.
#[derive(Debug, Clone)]
pub struct TypeAlias {
    pub spec: &'static TypeSpec,
    pub kind: AliasKind,
}

/// A vendor or platform constant whose guarding macro was present.
#[derive(Debug, Clone)]
pub struct ResolvedConstant {
    pub spec: &'static ConstantSpec,
    pub value: i64,
}

/// Byte offset of a named field inside an SDK structure.
#[derive(Debug, Clone)]
pub struct OffsetEntry {
    pub identifier: String,
    pub byte_offset: u64,
}

/// Byte size of an SDK structure.
#[derive(Debug, Clone)]
pub struct SizeEntry {
    pub identifier: String,
    pub byte_size: u64,
}

/// Everything the emitter needs, in final declaration order.
#[derive(Debug, Clone)]
pub struct Module {
    /// Absolute path of the vendor shared library to declare.
    pub library: String,
    pub types: Vec<TypeAlias>,
    pub constants: Vec<ResolvedConstant>,
    pub offsets: Vec<OffsetEntry>,
    pub sizes: Vec<SizeEntry>,
}

#[cfg(test)]
mod tests {
    use super::AliasKind;

    #[test]
    fn alias_rendering() {
        assert_eq!(
            AliasKind::Integer {
                width_bits: 32,
                signed: true
            }
            .render(),
            "Int32"
        );
        assert_eq!(
            AliasKind::Integer {
                width_bits: 8,
                signed: false
            }
            .render(),
            "UInt8"
        );
        assert_eq!(AliasKind::Float { width_bits: 64 }.render(), "Float64");
        assert_eq!(AliasKind::WideString.render(), "Cwstring");
        assert_eq!(AliasKind::Pointer("WCHAR").render(), "Ptr{WCHAR}");
    }
}
