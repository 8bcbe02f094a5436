use std::fmt::Display;

use crate::{
    memory::{FlashChip, ProgramUnit, Ram},
    KB,
};
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Port {
    FrdmK64F,
    FrdmKl26Z,
}

impl Default for Port {
    // Arbitrary default port for the purposes of seeding defaults
    fn default() -> Self { Self::FrdmK64F }
}

pub mod family {
    pub const KINETIS: &str = "kinetis";
}

pub mod subfamily {
    pub const KINETIS_K: &str = "k";
    pub const KINETIS_L: &str = "l";
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Family {
    Kinetis,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Subfamily {
    KinetisK,
    KinetisL,
}

impl Display for Port {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Port::FrdmK64F => "frdm_k64f",
            Port::FrdmKl26Z => "frdm_kl26z",
        })
    }
}

impl Display for Family {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Family::Kinetis => family::KINETIS,
        })
    }
}

impl Display for Subfamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Subfamily::KinetisK => subfamily::KINETIS_K,
            Subfamily::KinetisL => subfamily::KINETIS_L,
        })
    }
}

impl Port {
    pub fn family(&self) -> Family {
        match self {
            Port::FrdmK64F | Port::FrdmKl26Z => Family::Kinetis,
        }
    }

    pub fn subfamily(&self) -> Subfamily {
        match self {
            Port::FrdmK64F => Subfamily::KinetisK,
            Port::FrdmKl26Z => Subfamily::KinetisL,
        }
    }

    pub fn family_name(&self) -> String { self.family().to_string() }
    pub fn subfamily_name(&self) -> String { self.subfamily().to_string() }

    pub fn internal_flash(&self) -> FlashChip {
        match self {
            Port::FrdmK64F => FlashChip {
                name: "MK64FN1M0 FTFE Flash",
                start: 0x0000_0000,
                end: KB!(1024) - 1,
                sector_size: KB!(4),
                program_unit: ProgramUnit::Phrase,
            },
            Port::FrdmKl26Z => FlashChip {
                name: "MKL26Z128 FTFA Flash",
                start: 0x0000_0000,
                end: KB!(128) - 1,
                sector_size: KB!(1),
                program_unit: ProgramUnit::Word,
            },
        }
    }

    pub fn ram(&self) -> Ram {
        match self {
            Port::FrdmK64F => Ram { start: 0x1FFF_0000, end: 0x2003_0000 },
            Port::FrdmKl26Z => Ram { start: 0x1FFF_F000, end: 0x2000_3000 },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ports_map_to_their_families() {
        assert_eq!(Port::FrdmK64F.family_name(), family::KINETIS);
        assert_eq!(Port::FrdmK64F.subfamily_name(), subfamily::KINETIS_K);
        assert_eq!(Port::FrdmKl26Z.subfamily_name(), subfamily::KINETIS_L);
    }

    #[test]
    fn flash_sectors_are_whole_program_units() {
        for port in [Port::FrdmK64F, Port::FrdmKl26Z] {
            let flash = port.internal_flash();
            let unit = match flash.program_unit {
                ProgramUnit::Word => 4,
                ProgramUnit::Phrase => 8,
            };
            assert_eq!(flash.sector_size % unit, 0);
            assert_eq!((flash.end + 1 - flash.start) % flash.sector_size, 0);
        }
    }
}
