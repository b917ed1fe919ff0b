//! Probing — synthesize one C translation unit against the installed SDK
//! headers and read representation facts back through libclang.
//!
//! The translation unit carries three kinds of probe variables:
//!
//! - `at_typeof_<NAME>` / `at_signof_<NAME>` — a variable of the source C
//!   type (for `sizeof`) and an all-bits-set sign test
//!   (`(T)(~(T)0) < 0`), so width and signedness are computed for the
//!   machine at hand, never assumed.
//! - `at_const_<NAME>` — the constant's value, wrapped in `#ifdef` on the
//!   guarding macro: an undefined macro simply leaves the variable out of
//!   the TU, which is how SDK-version availability is decided.
//! - `at_layout_<IDENT>` / `at_sizeof_<IDENT>` — a variable of a record
//!   type, for field offsets and record sizes.
//!
//! Host-OS extension constants sit inside an `#ifdef __linux__` block that
//! also pulls in the platform headers; they never leak onto other systems.

use std::collections::HashMap;
use std::io::Write as _;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use clang::diagnostic::Severity;
use clang::{Clang, Entity, EntityKind, EvaluationResult, Index};
use tracing::{debug, info};

use crate::catalog::{self, TypeRender};
use crate::config::Config;
use crate::model::{AliasKind, Module, OffsetEntry, ResolvedConstant, SizeEntry, TypeAlias};

/// Whether host-OS extension constants take part in this run.
fn platform_enabled(cfg: &Config) -> bool {
    cfg!(target_os = "linux") && cfg.sdk.platform_extensions
}

/// Probe the SDK described by `cfg` and return the module to emit.
pub fn probe(cfg: &Config, base_dir: &Path) -> Result<Module> {
    let source = probe_source(cfg, base_dir)?;
    debug!(bytes = source.len(), "synthesized probe translation unit");

    let mut file = tempfile::Builder::new()
        .prefix("atdeps_probe")
        .suffix(".c")
        .tempfile()
        .context("creating probe translation unit file")?;
    file.write_all(source.as_bytes())
        .and_then(|_| file.flush())
        .context("writing probe translation unit")?;

    let clang = Clang::new().map_err(|e| anyhow!("failed to load libclang: {}", e))?;
    let index = Index::new(&clang, false, false);
    let tu = index
        .parser(file.path().to_str().context("probe path is not UTF-8")?)
        .arguments(
            &cfg.sdk
                .clang_args
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>(),
        )
        .parse()
        .map_err(|e| anyhow!("failed to parse probe translation unit: {:?}", e))?;

    // A missing vendor type or record field is a build-environment error:
    // abort with no output rather than emit a partial module.
    for diag in tu.get_diagnostics() {
        if matches!(diag.get_severity(), Severity::Error | Severity::Fatal) {
            bail!("SDK headers rejected the probe: {}", diag.get_text());
        }
    }

    let vars: HashMap<String, Entity> = tu
        .get_entity()
        .get_children()
        .into_iter()
        .filter(|e| e.get_kind() == EntityKind::VarDecl)
        .filter_map(|e| e.get_name().map(|n| (n, e)))
        .collect();

    let types = probe_types(&vars)?;
    let constants = probe_constants(&vars, platform_enabled(cfg))?;
    let offsets = probe_offsets(&vars, cfg)?;
    let sizes = probe_sizes(&vars, cfg)?;

    info!(
        types = types.len(),
        constants = constants.len(),
        offsets = offsets.len(),
        "probe complete"
    );

    Ok(Module {
        library: cfg.output.library.clone(),
        types,
        constants,
        offsets,
        sizes,
    })
}

/// Synthesize the probe translation unit source.
pub(crate) fn probe_source(cfg: &Config, base_dir: &Path) -> Result<String> {
    let platform = platform_enabled(cfg);
    let mut src = String::new();

    for header in cfg.sdk.header_paths(base_dir) {
        src.push_str(&format!("#include \"{}\"\n", header.display()));
    }
    if platform {
        src.push_str("#ifdef __linux__\n");
        src.push_str("#include <fcntl.h>\n");
        src.push_str("#include <sys/ioctl.h>\n");
        src.push_str("#include <linux/usbdevice_fs.h>\n");
        src.push_str("#endif\n");
    }

    for spec in catalog::TYPES {
        match spec.render {
            TypeRender::Int => {
                src.push_str(&format!(
                    "static {} at_typeof_{};\n",
                    spec.c_type, spec.public_name
                ));
                src.push_str(&format!(
                    "static const int at_signof_{name} = ({t})(~({t})0) < 0;\n",
                    name = spec.public_name,
                    t = spec.c_type
                ));
            }
            TypeRender::Float => {
                src.push_str(&format!(
                    "static {} at_typeof_{};\n",
                    spec.c_type, spec.public_name
                ));
            }
            TypeRender::WideString | TypeRender::Pointer(_) => {}
        }
    }

    for spec in catalog::constants(platform) {
        let guard = if spec.group == catalog::ConstGroup::Platform {
            "__linux__".to_string()
        } else {
            spec.macro_name()
        };
        src.push_str(&format!(
            "#ifdef {guard}\nstatic const long long at_const_{name} = (long long)({mac});\n#endif\n",
            name = spec.public_name(),
            mac = spec.macro_name()
        ));
    }

    for off in &cfg.offset {
        check_ident(&off.ident)?;
        check_record(&off.record)?;
        src.push_str(&format!("static {} at_layout_{};\n", off.record, off.ident));
    }
    for sz in &cfg.size {
        check_ident(&sz.ident)?;
        check_record(&sz.record)?;
        src.push_str(&format!("static {} at_sizeof_{};\n", sz.record, sz.ident));
    }

    Ok(src)
}

fn is_ident(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with(|c: char| c.is_ascii_digit())
        && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Identifiers are spliced into C source; restrict them accordingly.
fn check_ident(ident: &str) -> Result<()> {
    if !is_ident(ident) {
        bail!("'{}' is not a valid C identifier", ident);
    }
    Ok(())
}

/// Record spellings are spliced too: a typedef name, or a `struct`/`union`
/// tag. Anything else is a config error, not a clang parse error.
fn check_record(record: &str) -> Result<()> {
    let name = record
        .strip_prefix("struct ")
        .or_else(|| record.strip_prefix("union "))
        .unwrap_or(record);
    if !is_ident(name.trim()) {
        bail!("'{}' is not a valid C record type spelling", record);
    }
    Ok(())
}

fn probe_types(vars: &HashMap<String, Entity>) -> Result<Vec<TypeAlias>> {
    let mut types = Vec::with_capacity(catalog::TYPES.len());
    for spec in catalog::TYPES {
        let kind = match spec.render {
            TypeRender::Int => {
                let width_bits = probed_width(vars, spec.public_name, spec.c_type)?;
                let sign_var = vars
                    .get(&format!("at_signof_{}", spec.public_name))
                    .with_context(|| format!("missing sign probe for {}", spec.public_name))?;
                let signed = eval_int(sign_var)? != 0;
                AliasKind::Integer { width_bits, signed }
            }
            TypeRender::Float => AliasKind::Float {
                width_bits: probed_width(vars, spec.public_name, spec.c_type)?,
            },
            TypeRender::WideString => AliasKind::WideString,
            TypeRender::Pointer(target) => AliasKind::Pointer(target),
        };
        debug!(name = spec.public_name, kind = ?kind, "probed type");
        types.push(TypeAlias { spec, kind });
    }
    Ok(types)
}

fn probed_width(vars: &HashMap<String, Entity>, name: &str, c_type: &str) -> Result<u32> {
    let var = vars
        .get(&format!("at_typeof_{}", name))
        .with_context(|| format!("missing type probe for {}", name))?;
    let ty = var
        .get_type()
        .with_context(|| format!("type probe for {} has no type", name))?;
    let size = ty
        .get_sizeof()
        .map_err(|e| anyhow!("sizeof({}) failed: {:?}", c_type, e))?;
    Ok(8 * size as u32)
}

fn probe_constants(
    vars: &HashMap<String, Entity>,
    platform: bool,
) -> Result<Vec<ResolvedConstant>> {
    let mut constants = Vec::new();
    for spec in catalog::constants(platform) {
        match vars.get(&format!("at_const_{}", spec.public_name())) {
            Some(var) => {
                let value = eval_int(var)
                    .with_context(|| format!("evaluating {}", spec.macro_name()))?;
                debug!(name = spec.public_name(), value, "resolved constant");
                constants.push(ResolvedConstant { spec, value });
            }
            // Not an error: an undefined macro is how older SDK versions
            // drop out of the catalog.
            None => debug!(
                name = %spec.macro_name(),
                "macro not defined by this SDK, omitted"
            ),
        }
    }
    Ok(constants)
}

fn probe_offsets(vars: &HashMap<String, Entity>, cfg: &Config) -> Result<Vec<OffsetEntry>> {
    let mut offsets = Vec::with_capacity(cfg.offset.len());
    for off in &cfg.offset {
        let var = vars
            .get(&format!("at_layout_{}", off.ident))
            .with_context(|| format!("missing layout probe for {}", off.ident))?;
        let record = var
            .get_type()
            .with_context(|| format!("layout probe for {} has no type", off.ident))?
            .get_canonical_type()
            .get_declaration()
            .with_context(|| format!("{} is not a record type", off.record))?;
        let field = record
            .get_children()
            .into_iter()
            .filter(|c| c.get_kind() == EntityKind::FieldDecl)
            .find(|c| c.get_name().as_deref() == Some(off.field.as_str()))
            .with_context(|| format!("no field '{}' in {}", off.field, off.record))?;
        let bits = field
            .get_offset_of_field()
            .map_err(|e| anyhow!("offsetof({}, {}) failed: {:?}", off.record, off.field, e))?;
        offsets.push(OffsetEntry {
            identifier: off.ident.clone(),
            byte_offset: (bits / 8) as u64,
        });
    }
    Ok(offsets)
}

fn probe_sizes(vars: &HashMap<String, Entity>, cfg: &Config) -> Result<Vec<SizeEntry>> {
    let mut sizes = Vec::with_capacity(cfg.size.len());
    for sz in &cfg.size {
        let var = vars
            .get(&format!("at_sizeof_{}", sz.ident))
            .with_context(|| format!("missing size probe for {}", sz.ident))?;
        let ty = var
            .get_type()
            .with_context(|| format!("size probe for {} has no type", sz.ident))?;
        let bytes = ty
            .get_sizeof()
            .map_err(|e| anyhow!("sizeof({}) failed: {:?}", sz.record, e))?;
        sizes.push(SizeEntry {
            identifier: sz.ident.clone(),
            byte_size: bytes as u64,
        });
    }
    Ok(sizes)
}

fn eval_int(entity: &Entity) -> Result<i64> {
    match entity.evaluate() {
        Some(EvaluationResult::SignedInteger(v)) => Ok(v),
        Some(EvaluationResult::UnsignedInteger(v)) => Ok(v as i64),
        other => bail!("probe variable did not evaluate to an integer: {:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, OffsetConfig, OutputConfig, SdkConfig};
    use std::path::PathBuf;

    fn test_config(platform_extensions: bool) -> Config {
        Config {
            output: OutputConfig {
                library: "/usr/local/lib/libatcore.so".into(),
            },
            sdk: SdkConfig {
                headers: vec![PathBuf::from("atcore.h")],
                clang_args: vec![],
                platform_extensions,
            },
            offset: vec![],
            size: vec![],
        }
    }

    #[test]
    fn source_includes_headers_and_guards() {
        let src = probe_source(&test_config(false), Path::new("/opt/andor")).unwrap();
        assert!(src.contains("#include \"/opt/andor/atcore.h\""));
        assert!(src.contains("#ifdef AT_SUCCESS"));
        assert!(src.contains("static const long long at_const_SUCCESS = (long long)(AT_SUCCESS);"));
        assert!(src.contains("static AT_H at_typeof_HANDLE;"));
        assert!(src.contains("static const int at_signof_HANDLE = (AT_H)(~(AT_H)0) < 0;"));
        // FLOAT is probed for width only; a sign test on double would not compile.
        assert!(src.contains("static double at_typeof_FLOAT;"));
        assert!(!src.contains("at_signof_FLOAT"));
    }

    #[test]
    fn extensions_disabled_leaves_no_platform_trace() {
        let src = probe_source(&test_config(false), Path::new("/opt/andor")).unwrap();
        assert!(!src.contains("__linux__"));
        assert!(!src.contains("USBDEVFS_RESET"));
        assert!(!src.contains("O_WRONLY"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn extensions_enabled_sit_inside_the_linux_branch() {
        let src = probe_source(&test_config(true), Path::new("/opt/andor")).unwrap();
        assert!(src.contains("#ifdef __linux__"));
        assert!(src.contains("#include <linux/usbdevice_fs.h>"));
        assert!(
            src.contains("#ifdef __linux__\nstatic const long long at_const_USBDEVFS_RESET")
        );
        assert!(src.contains("at_const_O_WRONLY"));
    }

    #[test]
    fn offset_idents_are_validated() {
        let mut cfg = test_config(false);
        cfg.offset.push(OffsetConfig {
            ident: "bad ident".into(),
            record: "AT_Frame".into(),
            field: "first".into(),
        });
        let err = probe_source(&cfg, Path::new("/opt/andor")).unwrap_err();
        assert!(err.to_string().contains("not a valid C identifier"));
    }

    #[test]
    fn record_spellings_are_validated() {
        let mut cfg = test_config(false);
        cfg.offset.push(OffsetConfig {
            ident: "frame_first".into(),
            record: "AT_Frame;".into(),
            field: "first".into(),
        });
        let err = probe_source(&cfg, Path::new("/opt/andor")).unwrap_err();
        assert!(err.to_string().contains("not a valid C record type"));

        cfg.offset[0].record = "struct frame".into();
        let src = probe_source(&cfg, Path::new("/opt/andor")).unwrap();
        assert!(src.contains("static struct frame at_layout_frame_first;"));
    }

    #[test]
    fn offset_probe_declares_the_record() {
        let mut cfg = test_config(false);
        cfg.offset.push(OffsetConfig {
            ident: "frame_first".into(),
            record: "AT_Frame".into(),
            field: "first".into(),
        });
        let src = probe_source(&cfg, Path::new("/opt/andor")).unwrap();
        assert!(src.contains("static AT_Frame at_layout_frame_first;"));
    }
}
