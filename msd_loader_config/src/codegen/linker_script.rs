use crate::Configuration;

/// Generates the linker script `memory.x`, which confines the loader to
/// the protected region at the bottom of MCU flash.
pub fn generate_linker_script(configuration: &Configuration) -> String {
    let port = &configuration.port;
    let flash = port.internal_flash();
    let ram = port.ram();
    let protected_address = configuration.memory_configuration.protected_address(port);
    let bootloader_length = protected_address - flash.start;

    format!(
        "MEMORY\n\
         {{\n\
             FLASH : ORIGIN = 0x{:08X}, LENGTH = {}K\n\
             RAM : ORIGIN = 0x{:08X}, LENGTH = {}K\n\
         }}\n",
        flash.start,
        bootloader_length / 1024,
        ram.start,
        (ram.end - ram.start) / 1024,
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{memory::MemoryConfiguration, port::Port};

    #[test]
    fn linker_script_only_covers_the_bootloader_region() {
        let configuration = Configuration::new(Port::FrdmK64F, MemoryConfiguration::default());
        let script = generate_linker_script(&configuration);
        assert!(script.contains("FLASH : ORIGIN = 0x00000000, LENGTH = 64K"));
        assert!(script.contains("RAM : ORIGIN = 0x1FFF0000, LENGTH = 256K"));
    }
}
