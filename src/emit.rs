//! Emission — render the probed module as one deterministic text stream.
//!
//! Layout follows the historical generated file: banner, dynamic-library
//! path, aligned type aliases, sentinel constants, host-OS extensions,
//! status codes, then any requested structure offsets and sizes.

use std::io::Write;

use crate::catalog::{ConstGroup, Format};
use crate::model::Module;

const BANNER: &str = "\
#
# deps.jl --
#
# Definitions of types and constants for interfacing Andor cameras.
#
# *DO NOT EDIT* as this file is automatically generated for your machine.
#
#------------------------------------------------------------------------------
#
# This file was produced by atdeps, released under the MIT license.
#
";

/// Render `module` to `out` in a single pass.
pub fn render<W: Write>(module: &Module, out: &mut W) -> std::io::Result<()> {
    out.write_all(BANNER.as_bytes())?;

    writeln!(out)?;
    writeln!(out, "# Path to the dynamic library.")?;
    writeln!(out, "const _DLL = \"{}\"", module.library)?;

    writeln!(out)?;
    writeln!(out, "# Types.")?;
    for alias in &module.types {
        let decl = format!(
            "const {:<7} = {}",
            alias.spec.public_name,
            alias.kind.render()
        );
        match alias.spec.comment {
            Some(comment) => writeln!(out, "{:<22} # {}", decl, comment)?,
            None => writeln!(out, "{}", decl)?,
        }
    }

    writeln!(out)?;
    writeln!(out, "# Constants.")?;
    for constant in module
        .constants
        .iter()
        .filter(|c| c.spec.group != ConstGroup::Status)
    {
        writeln!(out, "{}", constant_line(constant))?;
    }

    writeln!(out)?;
    writeln!(out, "# Status codes.")?;
    for constant in module
        .constants
        .iter()
        .filter(|c| c.spec.group == ConstGroup::Status)
    {
        writeln!(out, "{}", constant_line(constant))?;
    }

    if !module.offsets.is_empty() || !module.sizes.is_empty() {
        writeln!(out)?;
        writeln!(out, "# Structure layout.")?;
        for off in &module.offsets {
            writeln!(out, "const _offsetof_{} = {:>3}", off.identifier, off.byte_offset)?;
        }
        for sz in &module.sizes {
            writeln!(out, "const _sizeof_{} = {:>3}", sz.identifier, sz.byte_size)?;
        }
    }

    out.flush()
}

fn constant_line(constant: &crate::model::ResolvedConstant) -> String {
    let literal = match constant.spec.format {
        Format::Dec => format!("{}", constant.value),
        Format::Hex => format!("0x{:X}", constant.value),
    };
    let value = match constant.spec.wrap {
        Some(wrap) => format!("{}({})", wrap, literal),
        None => literal,
    };
    match constant.spec.comment {
        Some(comment) => format!(
            "const {} = {} # {}",
            constant.spec.public_name(),
            value,
            comment
        ),
        None => format!("const {} = {}", constant.spec.public_name(), value),
    }
}
