//! Static catalog — the superset of SDK types and constants the binding
//! should expose, independent of which SDK version is installed.
//!
//! Vendor constants are listed by their bare suffix; the probed macro is
//! always `AT_<suffix>` and the emitted public name is the suffix itself.
//! Whether an entry actually appears in the output is decided at generation
//! time by `#ifdef` presence in the probe translation unit, so the catalog
//! can safely cover several SDK releases at once.

/// The textual prefix shared by every vendor macro.
pub const VENDOR_PREFIX: &str = "AT_";

/// How a probed type is represented in the emitted module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeRender {
    /// Fixed-width integer; width and signedness are probed.
    Int,
    /// Floating point; width is probed.
    Float,
    /// Wide-character string, emitted verbatim as `Cwstring`.
    WideString,
    /// Pointer to a previously emitted alias.
    Pointer(&'static str),
}

/// One primitive SDK type of interest.
#[derive(Debug)]
pub struct TypeSpec {
    /// Public alias name in the emitted module.
    pub public_name: &'static str,
    /// C spelling used to declare the probe variable.
    pub c_type: &'static str,
    pub render: TypeRender,
    /// Inline comment naming the original vendor type.
    pub comment: Option<&'static str>,
}

/// Semantic grouping of a constant; also fixes its section in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConstGroup {
    /// Timeout sentinel (`AT_INFINITE`).
    Timeout,
    /// Boolean literals (`AT_TRUE`, `AT_FALSE`).
    Bool,
    /// Handle sentinels (`AT_HANDLE_*`).
    Handle,
    /// Host-OS constants, not vendor SDK ones.
    Platform,
    /// Status and error codes.
    Status,
}

/// Numeric rendering of a constant value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Dec,
    Hex,
}

/// One conditionally-available constant.
#[derive(Debug)]
pub struct ConstantSpec {
    /// Bare suffix for vendor constants, full macro name for platform ones.
    pub suffix: &'static str,
    pub group: ConstGroup,
    pub format: Format,
    /// Emitted wrapper type, e.g. `STATUS(17)`; `None` prints a bare number.
    pub wrap: Option<&'static str>,
    pub comment: Option<&'static str>,
}

impl ConstantSpec {
    /// The macro probed for in the SDK or host headers.
    pub fn macro_name(&self) -> String {
        if self.group == ConstGroup::Platform {
            self.suffix.to_string()
        } else {
            format!("{}{}", VENDOR_PREFIX, self.suffix)
        }
    }

    /// The name declared in the emitted module.
    pub fn public_name(&self) -> &'static str {
        self.suffix
    }
}

macro_rules! ty {
    ($name:literal, $c:literal, $render:expr) => {
        TypeSpec {
            public_name: $name,
            c_type: $c,
            render: $render,
            comment: None,
        }
    };
    ($name:literal, $c:literal, $render:expr, $comment:literal) => {
        TypeSpec {
            public_name: $name,
            c_type: $c,
            render: $render,
            comment: Some($comment),
        }
    };
}

/// The primitive types the binding exposes, in emission order.
pub static TYPES: &[TypeSpec] = &[
    ty!("STATUS", "int", TypeRender::Int, "int, for returned status"),
    ty!("HANDLE", "AT_H", TypeRender::Int, "AT_H in <atcore.h>"),
    ty!("INDEX", "int", TypeRender::Int, "int, for camera index"),
    ty!("ENUM", "int", TypeRender::Int, "int, for enumeration"),
    ty!("BOOL", "AT_BOOL", TypeRender::Int, "AT_BOOL in <atcore.h>"),
    ty!("INT", "AT_64", TypeRender::Int, "AT_64 in <atcore.h>"),
    ty!("FLOAT", "double", TypeRender::Float, "double"),
    ty!("BYTE", "AT_U8", TypeRender::Int, "AT_U8 in <atcore.h>"),
    ty!("WCHAR", "AT_WC", TypeRender::Int, "AT_WC in <atcore.h>"),
    ty!("STRING", "AT_WC *", TypeRender::WideString),
    ty!("FEATURE", "AT_WC *", TypeRender::Pointer("WCHAR")),
    ty!("LENGTH", "int", TypeRender::Int, "int, for string length"),
    ty!(
        "MSEC",
        "unsigned int",
        TypeRender::Int,
        "unsigned int, for timeout in milliseconds"
    ),
];

macro_rules! status {
    ($suffix:literal) => {
        ConstantSpec {
            suffix: $suffix,
            group: ConstGroup::Status,
            format: Format::Dec,
            wrap: Some("STATUS"),
            comment: None,
        }
    };
}

/// Sentinel constants, emitted in the `# Constants.` section.
pub static SENTINELS: &[ConstantSpec] = &[
    ConstantSpec {
        suffix: "INFINITE",
        group: ConstGroup::Timeout,
        format: Format::Hex,
        wrap: Some("MSEC"),
        comment: None,
    },
    ConstantSpec {
        suffix: "TRUE",
        group: ConstGroup::Bool,
        format: Format::Dec,
        wrap: Some("BOOL"),
        comment: None,
    },
    ConstantSpec {
        suffix: "FALSE",
        group: ConstGroup::Bool,
        format: Format::Dec,
        wrap: Some("BOOL"),
        comment: None,
    },
    ConstantSpec {
        suffix: "HANDLE_UNINITIALISED",
        group: ConstGroup::Handle,
        format: Format::Dec,
        wrap: Some("HANDLE"),
        comment: None,
    },
    ConstantSpec {
        suffix: "HANDLE_SYSTEM",
        group: ConstGroup::Handle,
        format: Format::Dec,
        wrap: Some("HANDLE"),
        comment: None,
    },
];

/// Host-OS constants, probed from the platform headers rather than the
/// vendor SDK. Only meaningful inside the Linux branch of the probe TU.
pub static PLATFORM: &[ConstantSpec] = &[
    ConstantSpec {
        suffix: "USBDEVFS_RESET",
        group: ConstGroup::Platform,
        format: Format::Dec,
        wrap: None,
        comment: Some("ioctl() request to reset USB device"),
    },
    ConstantSpec {
        suffix: "O_WRONLY",
        group: ConstGroup::Platform,
        format: Format::Dec,
        wrap: None,
        comment: None,
    },
];

/// Status and error codes, emitted in the `# Status codes.` section.
/// Covers every code any supported SDK release defines; the installed
/// headers decide the emitted subset.
pub static STATUS_CODES: &[ConstantSpec] = &[
    status!("SUCCESS"),
    status!("CALLBACK_SUCCESS"),
    status!("ERR_NOTINITIALISED"),
    status!("ERR_NOTIMPLEMENTED"),
    status!("ERR_READONLY"),
    status!("ERR_NOTREADABLE"),
    status!("ERR_NOTWRITABLE"),
    status!("ERR_OUTOFRANGE"),
    status!("ERR_INDEXNOTAVAILABLE"),
    status!("ERR_INDEXNOTIMPLEMENTED"),
    status!("ERR_EXCEEDEDMAXSTRINGLENGTH"),
    status!("ERR_CONNECTION"),
    status!("ERR_NODATA"),
    status!("ERR_INVALIDHANDLE"),
    status!("ERR_TIMEDOUT"),
    status!("ERR_BUFFERFULL"),
    status!("ERR_INVALIDSIZE"),
    status!("ERR_INVALIDALIGNMENT"),
    status!("ERR_COMM"),
    status!("ERR_STRINGNOTAVAILABLE"),
    status!("ERR_STRINGNOTIMPLEMENTED"),
    status!("ERR_NULL_FEATURE"),
    status!("ERR_NULL_HANDLE"),
    status!("ERR_NULL_IMPLEMENTED_VAR"),
    status!("ERR_NULL_READABLE_VAR"),
    status!("ERR_NULL_READONLY_VAR"),
    status!("ERR_NULL_WRITABLE_VAR"),
    status!("ERR_NULL_MINVALUE"),
    status!("ERR_NULL_MAXVALUE"),
    status!("ERR_NULL_VALUE"),
    status!("ERR_NULL_STRING"),
    status!("ERR_NULL_COUNT_VAR"),
    status!("ERR_NULL_ISAVAILABLE_VAR"),
    status!("ERR_NULL_MAXSTRINGLENGTH"),
    status!("ERR_NULL_EVCALLBACK"),
    status!("ERR_NULL_QUEUE_PTR"),
    status!("ERR_NULL_WAIT_PTR"),
    status!("ERR_NULL_PTRSIZE"),
    status!("ERR_NOMEMORY"),
    status!("ERR_DEVICEINUSE"),
    status!("ERR_DEVICENOTFOUND"),
    status!("ERR_HARDWARE_OVERFLOW"),
];

/// All constant specs in emission order. `platform` selects whether the
/// host-OS entries take part; the caller decides based on the target OS
/// and the configuration.
pub fn constants(platform: bool) -> impl Iterator<Item = &'static ConstantSpec> {
    let platform_specs: &'static [ConstantSpec] = if platform { PLATFORM } else { &[] };
    SENTINELS
        .iter()
        .chain(platform_specs.iter())
        .chain(STATUS_CODES.iter())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn suffixes_are_unique() {
        let mut seen = HashSet::new();
        for spec in constants(true) {
            assert!(
                seen.insert(spec.public_name()),
                "duplicate catalog entry {}",
                spec.public_name()
            );
        }
    }

    #[test]
    fn vendor_suffixes_are_bare() {
        for spec in SENTINELS.iter().chain(STATUS_CODES.iter()) {
            assert!(
                !spec.suffix.starts_with(VENDOR_PREFIX),
                "{} should be listed without the vendor prefix",
                spec.suffix
            );
            assert_eq!(spec.macro_name(), format!("AT_{}", spec.suffix));
        }
    }

    #[test]
    fn platform_entries_keep_their_host_names() {
        for spec in PLATFORM {
            assert_eq!(spec.group, ConstGroup::Platform);
            assert_eq!(spec.macro_name(), spec.suffix);
            assert!(spec.wrap.is_none());
        }
    }

    #[test]
    fn emission_order_is_sentinels_platform_status() {
        let groups: Vec<ConstGroup> = constants(true).map(|s| s.group).collect();
        let first_status = groups.iter().position(|g| *g == ConstGroup::Status).unwrap();
        assert!(
            groups[..first_status]
                .iter()
                .all(|g| *g != ConstGroup::Status)
        );
        assert!(
            groups[first_status..]
                .iter()
                .all(|g| *g == ConstGroup::Status)
        );
        let first_platform = groups
            .iter()
            .position(|g| *g == ConstGroup::Platform)
            .unwrap();
        assert!(first_platform < first_status);
    }

    #[test]
    fn status_section_disabled_platform_is_a_subset() {
        let with: Vec<_> = constants(true).map(|s| s.public_name()).collect();
        let without: Vec<_> = constants(false).map(|s| s.public_name()).collect();
        for name in &without {
            assert!(with.contains(name));
        }
        assert_eq!(with.len(), without.len() + PLATFORM.len());
    }
}
