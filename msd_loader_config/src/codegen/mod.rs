use anyhow::{anyhow, Result};
use std::{fs::OpenOptions, io::Write, path::Path};

use crate::Configuration;

use self::{layout::generate_layout, linker_script::generate_linker_script};

mod layout;
mod linker_script;

/// Generates every artifact the loader build needs from a configuration:
/// the `layout.rs` module included by the port, and the `memory.x` linker
/// script describing the region the loader itself lives in.
pub fn generate_modules<P: AsRef<Path>>(
    output_directory: P,
    configuration: &Configuration,
) -> Result<()> {
    if let Some(problem) = configuration.configuration_problems().next() {
        return Err(anyhow!("Invalid configuration: {}", problem));
    }

    let directory = output_directory.as_ref();
    let mut layout_file = open(&directory.join("layout.rs"))?;
    layout_file.write_all(generate_layout(configuration).to_string().as_bytes())?;

    let mut linker_file = open(&directory.join("memory.x"))?;
    linker_file.write_all(generate_linker_script(configuration).as_bytes())?;
    Ok(())
}

fn open(path: &Path) -> Result<std::fs::File> {
    Ok(OpenOptions::new().write(true).create(true).truncate(true).open(path)?)
}
