//! Configuration tables read from JSON.
#![cfg(feature = "serde")]

use tne2_rs::config::{AusmPwInputs, GasConfig, NumericsConfig};
use tne2_rs::flux::FluxSchemeKind;
use tne2_rs::source::SourceKind;
use tne2_rs::viscous::TransportProperties;

#[test]
fn test_gas_config_survives_json() {
    let gas = GasConfig::nitrogen();
    let json = serde_json::to_string(&gas).unwrap();
    let back: GasConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, gas);
    assert!(back.validate().is_ok());
}

#[test]
fn test_species_table_defaults() {
    let json = r#"{
        "species": [
            {
                "name": "N2",
                "molar_mass": 28.0134,
                "rotational_modes": 2.0,
                "theta_v": 3395.0,
                "formation_enthalpy": 0.0,
                "reference_temperature": 0.0
            }
        ]
    }"#;
    let gas: GasConfig = serde_json::from_str(json).unwrap();
    assert!(gas.reactions.is_empty());
    assert!(!gas.ionization);
    assert!(gas.species[0].electronic_levels.is_empty());
    assert!(gas.validate().is_ok());
}

#[test]
fn test_numerics_config_from_json() {
    let config = NumericsConfig::new(3)
        .with_implicit(true)
        .with_lax_kappa(0.3)
        .with_ausmpw_inputs(AusmPwInputs::Restored);
    let json = serde_json::to_string(&config).unwrap();
    let back: NumericsConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}

#[test]
fn test_selectors_from_json() {
    let schemes: Vec<FluxSchemeKind> =
        serde_json::from_str(r#"["Roe", "Msw", "AusmPwPlus"]"#).unwrap();
    assert_eq!(
        schemes,
        [FluxSchemeKind::Roe, FluxSchemeKind::Msw, FluxSchemeKind::AusmPwPlus]
    );
    let sources: Vec<SourceKind> = serde_json::from_str(r#"["Chemistry", "Axisymmetric"]"#).unwrap();
    assert_eq!(sources, [SourceKind::Chemistry, SourceKind::Axisymmetric]);

    let transport = TransportProperties::uniform(2, 1e-4, 2e-5, 0.05, 0.01);
    let back: TransportProperties =
        serde_json::from_str(&serde_json::to_string(&transport).unwrap()).unwrap();
    assert_eq!(back, transport);
}
