//! Convective threat assessment from sounding analysis summaries.
//!
//! Applies the CAPE/SRH/LCL/shear decision ladder to the output of the
//! sounding package, producing graded threat levels for display.

use serde::{Deserialize, Serialize};

use forecast_common::SoundingSummary;

/// Graded threat level for one hazard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreatLevel {
    None,
    Slight,
    Moderate,
    High,
}

/// One hazard assessment with the contributing factors spelled out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreatAssessment {
    pub level: ThreatLevel,
    pub factors: Vec<String>,
}

impl ThreatAssessment {
    fn none() -> Self {
        Self {
            level: ThreatLevel::None,
            factors: Vec::new(),
        }
    }
}

/// Threat panel covering the four convective hazards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvectiveThreat {
    pub tornado: ThreatAssessment,
    pub hail: ThreatAssessment,
    pub wind: ThreatAssessment,
    pub flash_flood: ThreatAssessment,
}

/// Assess convective hazards from a sounding summary.
pub fn assess_threat(summary: &SoundingSummary) -> ConvectiveThreat {
    ConvectiveThreat {
        tornado: tornado_threat(summary),
        hail: hail_threat(summary),
        wind: wind_threat(summary),
        flash_flood: flash_flood_threat(summary),
    }
}

fn tornado_threat(s: &SoundingSummary) -> ThreatAssessment {
    let cape = s.cape.surface;
    let srh = s.helicity.sfc_1km;
    let lcl = s.lcl_height_m.surface;
    let shear = s.shear_kt.sfc_1km;

    if cape > 1000.0 && srh > 100.0 {
        if lcl < 1000.0 && shear > 20.0 {
            ThreatAssessment {
                level: ThreatLevel::High,
                factors: vec![
                    format!("CAPE: {:.0} J/kg (>1000)", cape),
                    format!("0-1km SRH: {:.0} m²/s² (>100)", srh),
                    format!("LCL Height: {:.0} m (<1000)", lcl),
                    format!("0-1km Shear: {:.0} kts (>20)", shear),
                ],
            }
        } else if lcl < 1500.0 && shear > 15.0 {
            ThreatAssessment {
                level: ThreatLevel::Moderate,
                factors: vec![
                    format!("CAPE: {:.0} J/kg (>1000)", cape),
                    format!("0-1km SRH: {:.0} m²/s² (>100)", srh),
                    format!("LCL Height: {:.0} m (<1500)", lcl),
                    format!("0-1km Shear: {:.0} kts (>15)", shear),
                ],
            }
        } else {
            ThreatAssessment {
                level: ThreatLevel::Slight,
                factors: vec![
                    format!("CAPE: {:.0} J/kg (>1000)", cape),
                    format!("0-1km SRH: {:.0} m²/s² (>100)", srh),
                ],
            }
        }
    } else if cape > 500.0 && srh > 50.0 {
        ThreatAssessment {
            level: ThreatLevel::Slight,
            factors: vec![
                format!("CAPE: {:.0} J/kg (>500)", cape),
                format!("0-1km SRH: {:.0} m²/s² (>50)", srh),
            ],
        }
    } else {
        ThreatAssessment::none()
    }
}

fn hail_threat(s: &SoundingSummary) -> ThreatAssessment {
    let mucape = s.cape.most_unstable;
    let shear = s.shear_kt.sfc_6km;

    if mucape > 2000.0 && shear > 40.0 {
        ThreatAssessment {
            level: ThreatLevel::High,
            factors: vec![
                format!("MUCAPE: {:.0} J/kg (>2000)", mucape),
                format!("0-6km Shear: {:.0} kts (>40)", shear),
                "Favorable thermodynamic profile for large hail".to_string(),
            ],
        }
    } else if mucape > 1500.0 && shear > 30.0 {
        ThreatAssessment {
            level: ThreatLevel::Moderate,
            factors: vec![
                format!("MUCAPE: {:.0} J/kg (>1500)", mucape),
                format!("0-6km Shear: {:.0} kts (>30)", shear),
            ],
        }
    } else if mucape > 1000.0 && shear > 20.0 {
        ThreatAssessment {
            level: ThreatLevel::Slight,
            factors: vec![
                format!("MUCAPE: {:.0} J/kg (>1000)", mucape),
                format!("0-6km Shear: {:.0} kts (>20)", shear),
            ],
        }
    } else {
        ThreatAssessment::none()
    }
}

fn wind_threat(s: &SoundingSummary) -> ThreatAssessment {
    let mlcape = s.cape.mixed_layer;
    let shear = s.shear_kt.sfc_6km;

    if mlcape > 1500.0 && shear > 30.0 {
        ThreatAssessment {
            level: ThreatLevel::High,
            factors: vec![
                format!("MLCAPE: {:.0} J/kg (>1500)", mlcape),
                format!("0-6km Shear: {:.0} kts (>30)", shear),
                "Favorable for organized convection with strong winds".to_string(),
            ],
        }
    } else if mlcape > 1000.0 && shear > 20.0 {
        ThreatAssessment {
            level: ThreatLevel::Moderate,
            factors: vec![
                format!("MLCAPE: {:.0} J/kg (>1000)", mlcape),
                format!("0-6km Shear: {:.0} kts (>20)", shear),
            ],
        }
    } else if mlcape > 500.0 {
        ThreatAssessment {
            level: ThreatLevel::Slight,
            factors: vec![format!("MLCAPE: {:.0} J/kg (>500)", mlcape)],
        }
    } else {
        ThreatAssessment::none()
    }
}

fn flash_flood_threat(s: &SoundingSummary) -> ThreatAssessment {
    let pwat = s.pwat_mm;
    let k_index = s.indices.k_index;

    if pwat > 50.0 && k_index > 35.0 {
        ThreatAssessment {
            level: ThreatLevel::High,
            factors: vec![
                format!("PWAT: {:.1} mm (>50mm)", pwat),
                format!("K-Index: {:.1} (>35)", k_index),
                "Favorable for heavy precipitation".to_string(),
            ],
        }
    } else if pwat > 40.0 && k_index > 30.0 {
        ThreatAssessment {
            level: ThreatLevel::Moderate,
            factors: vec![
                format!("PWAT: {:.1} mm (>40mm)", pwat),
                format!("K-Index: {:.1} (>30)", k_index),
            ],
        }
    } else if pwat > 30.0 && k_index > 25.0 {
        ThreatAssessment {
            level: ThreatLevel::Slight,
            factors: vec![
                format!("PWAT: {:.1} mm (>30mm)", pwat),
                format!("K-Index: {:.1} (>25)", k_index),
            ],
        }
    } else {
        ThreatAssessment::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forecast_common::sounding::{HelicitySet, IndexSet, ParcelSet, ShearSet};

    fn summary() -> SoundingSummary {
        SoundingSummary {
            cape: ParcelSet {
                surface: 0.0,
                mixed_layer: 0.0,
                most_unstable: 0.0,
            },
            cin: ParcelSet {
                surface: -10.0,
                mixed_layer: -20.0,
                most_unstable: -5.0,
            },
            lcl_height_m: ParcelSet {
                surface: 1200.0,
                mixed_layer: 1400.0,
                most_unstable: 1100.0,
            },
            shear_kt: ShearSet {
                sfc_1km: 5.0,
                sfc_3km: 10.0,
                sfc_6km: 15.0,
            },
            helicity: HelicitySet {
                sfc_1km: 20.0,
                sfc_3km: 60.0,
            },
            indices: IndexSet {
                stp: 0.0,
                scp: 0.0,
                lifted_index: 2.0,
                k_index: 20.0,
                total_totals: 40.0,
            },
            pwat_mm: 20.0,
        }
    }

    #[test]
    fn test_quiet_sounding_no_threat() {
        let threat = assess_threat(&summary());
        assert_eq!(threat.tornado.level, ThreatLevel::None);
        assert_eq!(threat.hail.level, ThreatLevel::None);
        assert_eq!(threat.wind.level, ThreatLevel::None);
        assert_eq!(threat.flash_flood.level, ThreatLevel::None);
    }

    #[test]
    fn test_high_tornado_threat() {
        let mut s = summary();
        s.cape.surface = 2500.0;
        s.helicity.sfc_1km = 250.0;
        s.lcl_height_m.surface = 700.0;
        s.shear_kt.sfc_1km = 30.0;
        let threat = assess_threat(&s);
        assert_eq!(threat.tornado.level, ThreatLevel::High);
        assert_eq!(threat.tornado.factors.len(), 4);
    }

    #[test]
    fn test_slight_tornado_with_high_lcl() {
        // Strong CAPE/SRH but a high cloud base degrades to slight.
        let mut s = summary();
        s.cape.surface = 1500.0;
        s.helicity.sfc_1km = 150.0;
        s.lcl_height_m.surface = 2000.0;
        let threat = assess_threat(&s);
        assert_eq!(threat.tornado.level, ThreatLevel::Slight);
    }

    #[test]
    fn test_hail_ladder() {
        let mut s = summary();
        s.cape.most_unstable = 2500.0;
        s.shear_kt.sfc_6km = 50.0;
        assert_eq!(assess_threat(&s).hail.level, ThreatLevel::High);

        s.cape.most_unstable = 1600.0;
        s.shear_kt.sfc_6km = 35.0;
        assert_eq!(assess_threat(&s).hail.level, ThreatLevel::Moderate);

        s.cape.most_unstable = 1100.0;
        s.shear_kt.sfc_6km = 25.0;
        assert_eq!(assess_threat(&s).hail.level, ThreatLevel::Slight);
    }

    #[test]
    fn test_flash_flood_high() {
        let mut s = summary();
        s.pwat_mm = 55.0;
        s.indices.k_index = 38.0;
        assert_eq!(assess_threat(&s).flash_flood.level, ThreatLevel::High);
    }

    #[test]
    fn test_wind_slight_on_cape_alone() {
        let mut s = summary();
        s.cape.mixed_layer = 800.0;
        assert_eq!(assess_threat(&s).wind.level, ThreatLevel::Slight);
    }
}
