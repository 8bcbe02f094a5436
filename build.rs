use anyhow::Result;
#[allow(unused_imports)]
use msd_loader_config::{
    codegen::generate_modules,
    port::{family, subfamily},
    Configuration,
};
#[allow(unused_imports)]
use std::{
    env,
    fs::File,
    io::{BufReader, Read},
    path::PathBuf,
};

#[cfg(feature = "frdm_k64f")]
const DEFAULT_CONFIG_FILENAME: &str = "frdm_k64f_default_config.ron";

#[cfg(feature = "frdm_kl26z")]
const DEFAULT_CONFIG_FILENAME: &str = "frdm_kl26z_default_config.ron";

#[cfg(any(feature = "frdm_k64f", feature = "frdm_kl26z"))]
fn main() -> Result<()> {
    let out_directory = PathBuf::from(env::var("OUT_DIR")?);
    process_configuration_file(&out_directory)?;

    // `memory.x` is generated next to `layout.rs`; point the linker at it.
    println!("cargo:rustc-link-search={}", out_directory.display());
    println!("cargo:rerun-if-changed=build.rs");
    Ok(())
}

// Host builds (unit tests) carry no board port, so there is nothing to generate.
#[cfg(not(any(feature = "frdm_k64f", feature = "frdm_kl26z")))]
fn main() -> Result<()> { Ok(()) }

#[cfg(any(feature = "frdm_k64f", feature = "frdm_kl26z"))]
fn process_configuration_file(out_directory: &PathBuf) -> Result<()> {
    println!("cargo:rerun-if-env-changed=MSD_LOADER_CONFIG");
    println!(
        "cargo:rerun-if-changed=./msd_loader_config/sample_configurations/{}",
        DEFAULT_CONFIG_FILENAME
    );

    let filename = if let Some(filename) = option_env!("MSD_LOADER_CONFIG") {
        filename.into()
    } else {
        format!("./msd_loader_config/sample_configurations/{}", DEFAULT_CONFIG_FILENAME)
    };

    let file = File::open(filename)?;
    let mut buf_reader = BufReader::new(file);
    let mut contents = String::new();
    buf_reader.read_to_string(&mut contents)?;
    let configuration: Configuration = ron::from_str(&contents)?;
    validate_feature_flags_against_configuration(&configuration);
    generate_modules(out_directory, &configuration)?;

    Ok(())
}

#[cfg(any(feature = "frdm_k64f", feature = "frdm_kl26z"))]
fn validate_feature_flags_against_configuration(configuration: &Configuration) {
    #[cfg(feature = "kinetis_any")]
    assert_eq!(configuration.port.family_name(), family::KINETIS,
        "Mismatching MCU family in configuration file. \
         Features require {}, configuration requires {}",
         family::KINETIS,
         configuration.port.family_name());

    #[cfg(feature = "kinetis_k_any")]
    assert_eq!(configuration.port.subfamily_name(), subfamily::KINETIS_K,
        "Mismatching MCU subfamily in configuration file. \
         Features require {}, configuration requires {}",
         subfamily::KINETIS_K,
         configuration.port.subfamily_name());

    #[cfg(feature = "kinetis_l_any")]
    assert_eq!(configuration.port.subfamily_name(), subfamily::KINETIS_L,
        "Mismatching MCU subfamily in configuration file. \
         Features require {}, configuration requires {}",
         subfamily::KINETIS_L,
         configuration.port.subfamily_name());
}
