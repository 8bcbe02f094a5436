//! This msd_loader sub-crate contains all definitions to help generate
//! final loader binaries.
//!
//! NOTE: This code is not included anywhere from the loader itself! This
//! is a dependency of the loader **build script**. The build script
//! uses this dependency to help generate the code that the loader includes
//! (the target memory layout and the linker script).

use std::fmt::Display;

use memory::MemoryConfiguration;
use port::Port;
use serde::{Deserialize, Serialize};

pub mod codegen;
pub mod memory;
pub mod port;

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct Configuration {
    pub port: Port,
    pub memory_configuration: MemoryConfiguration,
}

impl Configuration {
    pub fn new(port: Port, memory_configuration: MemoryConfiguration) -> Self {
        Self { port, memory_configuration }
    }

    pub fn complete(&self) -> bool { self.configuration_problems().next().is_none() }

    /// Lists every reason this configuration can't produce a sound memory layout.
    pub fn configuration_problems(&self) -> impl Iterator<Item = ConfigurationProblem> {
        let flash = self.port.internal_flash();
        let ram = self.port.ram();
        let protected = self.memory_configuration.protected_address(&self.port);

        [
            (self.memory_configuration.bootloader_length_kb == 0)
                .then_some(ConfigurationProblem::EmptyBootloaderRegion),
            (protected > flash.end).then_some(ConfigurationProblem::BootloaderTooBig),
            ((protected - flash.start) % flash.sector_size != 0)
                .then_some(ConfigurationProblem::ProtectedAddressMisaligned),
            (flash.end >= ram.start && ram.end >= flash.start)
                .then_some(ConfigurationProblem::OverlappingRanges),
        ]
        .into_iter()
        .flatten()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConfigurationProblem {
    EmptyBootloaderRegion,
    BootloaderTooBig,
    ProtectedAddressMisaligned,
    OverlappingRanges,
}

impl Display for ConfigurationProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ConfigurationProblem::EmptyBootloaderRegion => {
                "[Memory Map] The bootloader region must be at least one KB long"
            }
            ConfigurationProblem::BootloaderTooBig => {
                "[Memory Map] The bootloader region doesn't fit in MCU flash"
            }
            ConfigurationProblem::ProtectedAddressMisaligned => {
                "[Memory Map] The bootloader region must end on a sector boundary"
            }
            ConfigurationProblem::OverlappingRanges => {
                "[Target] Flash and RAM ranges overlap"
            }
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::memory::Endianness;

    #[test]
    fn parsing_a_sample_configuration() {
        let text = include_str!("../sample_configurations/frdm_k64f_default_config.ron");
        let configuration: Configuration = ron::from_str(text).unwrap();

        assert_eq!(configuration.port, Port::FrdmK64F);
        assert_eq!(configuration.memory_configuration.header_endianness, Endianness::Big);
        assert!(configuration.complete());
    }

    #[test]
    fn bootloader_regions_must_end_on_sector_boundaries() {
        // KL26 sectors are 1KB, K64 sectors are 4KB
        let memory_configuration =
            MemoryConfiguration { bootloader_length_kb: 6, ..Default::default() };

        let kl26 = Configuration::new(Port::FrdmKl26Z, memory_configuration.clone());
        let k64 = Configuration::new(Port::FrdmK64F, memory_configuration);

        assert!(kl26.complete());
        assert_eq!(
            k64.configuration_problems().collect::<Vec<_>>(),
            vec![ConfigurationProblem::ProtectedAddressMisaligned]
        );
    }

    #[test]
    fn oversized_bootloaders_are_rejected() {
        let memory_configuration =
            MemoryConfiguration { bootloader_length_kb: 2048, ..Default::default() };
        let configuration = Configuration::new(Port::FrdmK64F, memory_configuration);
        assert!(configuration
            .configuration_problems()
            .any(|p| p == ConfigurationProblem::BootloaderTooBig));
    }
}
