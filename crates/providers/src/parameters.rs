//! Per-provider parameter support tables.
//!
//! Each table maps pipeline parameter codes to the provider's own field name
//! and the unit that provider delivers values in. The native unit feeds the
//! normalizer as an explicit hint so unit conversion never relies on the
//! magnitude heuristic for these sources.

use forecast_common::{ParameterCode, ValueUnit};

/// One entry in a provider's supported set.
#[derive(Debug, Clone, Copy)]
pub struct ParameterMapping {
    pub parameter: ParameterCode,
    /// The provider's field or query name for this parameter.
    pub provider_code: &'static str,
    /// Unit the provider delivers values in.
    pub native_unit: ValueUnit,
}

/// Model-grid (GDPS) parameters. The model delivers NCEP-style fields:
/// temperatures in Kelvin, precipitation as accumulated kg/m², winds in m/s.
pub const GDPS_PARAMETERS: &[ParameterMapping] = &[
    ParameterMapping {
        parameter: ParameterCode::Temperature2m,
        provider_code: "TMP_TGL_2",
        native_unit: ValueUnit::Kelvin,
    },
    ParameterMapping {
        parameter: ParameterCode::Precipitation,
        provider_code: "APCP_SFC",
        native_unit: ValueUnit::KgPerSquareMetre,
    },
    ParameterMapping {
        parameter: ParameterCode::WindSpeed10m,
        provider_code: "WIND_TGL_10",
        native_unit: ValueUnit::MetresPerSecond,
    },
    ParameterMapping {
        parameter: ParameterCode::WindDirection10m,
        provider_code: "WDIR_TGL_10",
        native_unit: ValueUnit::Degrees,
    },
    ParameterMapping {
        parameter: ParameterCode::WindGust10m,
        provider_code: "GUST_TGL_10",
        native_unit: ValueUnit::MetresPerSecond,
    },
    ParameterMapping {
        parameter: ParameterCode::RelativeHumidity2m,
        provider_code: "RH_TGL_2",
        native_unit: ValueUnit::Percent,
    },
    ParameterMapping {
        parameter: ParameterCode::DewPoint2m,
        provider_code: "DPT_TGL_2",
        native_unit: ValueUnit::Kelvin,
    },
    ParameterMapping {
        parameter: ParameterCode::PressureMsl,
        provider_code: "PRMSL_MSL",
        native_unit: ValueUnit::Pascals,
    },
    ParameterMapping {
        parameter: ParameterCode::CapeSurface,
        provider_code: "CAPE_SFC",
        native_unit: ValueUnit::JoulesPerKg,
    },
    ParameterMapping {
        parameter: ParameterCode::CinSurface,
        provider_code: "CIN_SFC",
        native_unit: ValueUnit::JoulesPerKg,
    },
    ParameterMapping {
        parameter: ParameterCode::CloudCover,
        provider_code: "TCDC_SFC",
        native_unit: ValueUnit::Percent,
    },
];

/// Timeline API hourly elements under the metric unit group. CAPE and CIN
/// are not served by this source.
pub const TIMELINE_PARAMETERS: &[ParameterMapping] = &[
    ParameterMapping {
        parameter: ParameterCode::Temperature2m,
        provider_code: "temp",
        native_unit: ValueUnit::Celsius,
    },
    ParameterMapping {
        parameter: ParameterCode::Precipitation,
        provider_code: "precip",
        native_unit: ValueUnit::Millimetres,
    },
    ParameterMapping {
        parameter: ParameterCode::WindSpeed10m,
        provider_code: "windspeed",
        native_unit: ValueUnit::KmPerHour,
    },
    ParameterMapping {
        parameter: ParameterCode::WindDirection10m,
        provider_code: "winddir",
        native_unit: ValueUnit::Degrees,
    },
    ParameterMapping {
        parameter: ParameterCode::WindGust10m,
        provider_code: "windgust",
        native_unit: ValueUnit::KmPerHour,
    },
    ParameterMapping {
        parameter: ParameterCode::RelativeHumidity2m,
        provider_code: "humidity",
        native_unit: ValueUnit::Percent,
    },
    ParameterMapping {
        parameter: ParameterCode::DewPoint2m,
        provider_code: "dew",
        native_unit: ValueUnit::Celsius,
    },
    ParameterMapping {
        parameter: ParameterCode::PressureMsl,
        provider_code: "pressure",
        native_unit: ValueUnit::HectoPascals,
    },
    ParameterMapping {
        parameter: ParameterCode::CloudCover,
        provider_code: "cloudcover",
        native_unit: ValueUnit::Percent,
    },
];

/// Look up a parameter in a support table.
pub fn lookup(
    table: &'static [ParameterMapping],
    parameter: ParameterCode,
) -> Option<&'static ParameterMapping> {
    table.iter().find(|m| m.parameter == parameter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gdps_covers_all_parameters() {
        for p in ParameterCode::all() {
            assert!(
                lookup(GDPS_PARAMETERS, *p).is_some(),
                "missing GDPS mapping for {:?}",
                p
            );
        }
    }

    #[test]
    fn test_gdps_codes_match_wire_codes() {
        for m in GDPS_PARAMETERS {
            assert_eq!(m.provider_code, m.parameter.code());
        }
    }

    #[test]
    fn test_timeline_excludes_convective_parameters() {
        assert!(lookup(TIMELINE_PARAMETERS, ParameterCode::CapeSurface).is_none());
        assert!(lookup(TIMELINE_PARAMETERS, ParameterCode::CinSurface).is_none());
        assert_eq!(
            lookup(TIMELINE_PARAMETERS, ParameterCode::Temperature2m)
                .unwrap()
                .provider_code,
            "temp"
        );
    }
}
