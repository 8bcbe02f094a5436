use proc_macro2::{Literal, TokenStream};
use quote::{quote, ToTokens};

use crate::{
    memory::{Endianness, ProgramUnit},
    Configuration,
};

/// Produces the `layout.rs` module: a single `LAYOUT` constant describing
/// the target memory map, consumed by the loader's board port.
pub fn generate_layout(configuration: &Configuration) -> TokenStream {
    let port = &configuration.port;
    let flash = port.internal_flash();
    let ram = port.ram();

    let flash_start = hex(flash.start);
    let flash_end = hex(flash.end);
    let ram_start = hex(ram.start);
    let ram_end = hex(ram.end);
    let protected_address = hex(configuration.memory_configuration.protected_address(port));
    let sector_size = Literal::usize_unsuffixed(flash.sector_size as usize);

    let program_unit = match flash.program_unit {
        ProgramUnit::Word => quote! { ProgramUnit::Word },
        ProgramUnit::Phrase => quote! { ProgramUnit::Phrase },
    };

    let header_endianness = match configuration.memory_configuration.header_endianness {
        Endianness::Little => quote! { Endianness::Little },
        Endianness::Big => quote! { Endianness::Big },
    };

    quote! {
        use crate::devices::layout::Layout;
        use crate::hal::flash::ProgramUnit;
        use crate::utilities::{endian::Endianness, memory::AddressRange};

        pub const LAYOUT: Layout = Layout {
            flash: AddressRange::new(#flash_start, #flash_end),
            ram: AddressRange::new(#ram_start, #ram_end),
            protected_address: #protected_address,
            sector_size: #sector_size,
            program_unit: #program_unit,
            header_endianness: #header_endianness,
        };
    }
}

// Printed in hex so the generated file reads like a datasheet.
fn hex(value: u32) -> TokenStream {
    format!("0x{:08X}", value)
        .parse()
        .unwrap_or_else(|_| Literal::u32_unsuffixed(value).into_token_stream())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{memory::MemoryConfiguration, port::Port};

    #[test]
    fn generated_layout_reflects_the_port() {
        let configuration = Configuration::new(
            Port::FrdmKl26Z,
            MemoryConfiguration { bootloader_length_kb: 32, header_endianness: Endianness::Big },
        );

        let code = generate_layout(&configuration).to_string();

        assert!(code.contains("0x0001FFFF"));
        assert!(code.contains("0x00008000"));
        assert!(code.contains("0x20003000"));
        assert!(code.contains("ProgramUnit :: Word"));
        assert!(code.contains("Endianness :: Big"));
    }
}
