//! Simulation parameters as supplied by callers (every field optional) and the
//! resolved form the encoders consume (every field set).
//!
//! Resolution is a pure merge of the caller's values over [`canonical`]. It is
//! done field by field, so a partially given sub-section keeps what it has and
//! only its missing entries come from the defaults.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Bumped whenever a value returned by [`canonical`] changes.
pub const DEFAULTS_VERSION: u32 = 1;

/// Timesteps per hour accepted by the simulation engine (divisors of 60).
pub const ALLOWED_TIMESTEPS: [u32; 12] = [1, 2, 3, 4, 5, 6, 10, 12, 15, 20, 30, 60];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportingFrequency {
    Timestep,
    Hourly,
    Daily,
    Monthly,
    Annual,
}

impl ReportingFrequency {
    pub fn name(self) -> &'static str {
        match self {
            ReportingFrequency::Timestep => "Timestep",
            ReportingFrequency::Hourly => "Hourly",
            ReportingFrequency::Daily => "Daily",
            ReportingFrequency::Monthly => "Monthly",
            ReportingFrequency::Annual => "Annual",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayOfWeek {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl DayOfWeek {
    pub fn name(self) -> &'static str {
        match self {
            DayOfWeek::Sunday => "Sunday",
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolarDistribution {
    MinimalShadowing,
    FullExterior,
    FullInteriorAndExterior,
    FullExteriorWithReflections,
    FullInteriorAndExteriorWithReflections,
}

impl SolarDistribution {
    pub fn name(self) -> &'static str {
        match self {
            SolarDistribution::MinimalShadowing => "MinimalShadowing",
            SolarDistribution::FullExterior => "FullExterior",
            SolarDistribution::FullInteriorAndExterior => "FullInteriorAndExterior",
            SolarDistribution::FullExteriorWithReflections => "FullExteriorWithReflections",
            SolarDistribution::FullInteriorAndExteriorWithReflections => {
                "FullInteriorAndExteriorWithReflections"
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalculationMethod {
    PolygonClipping,
    PixelCounting,
}

impl CalculationMethod {
    pub fn name(self) -> &'static str {
        match self {
            CalculationMethod::PolygonClipping => "PolygonClipping",
            CalculationMethod::PixelCounting => "PixelCounting",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerrainType {
    Ocean,
    Country,
    Suburbs,
    Urban,
    City,
}

impl TerrainType {
    pub fn name(self) -> &'static str {
        match self {
            TerrainType::Ocean => "Ocean",
            TerrainType::Country => "Country",
            TerrainType::Suburbs => "Suburbs",
            TerrainType::Urban => "Urban",
            TerrainType::City => "City",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthDay {
    pub month: u32,
    pub day: u32,
}

// ---- caller input -------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OutputParameters {
    pub reporting_frequency: Option<ReportingFrequency>,
    pub include_sqlite: Option<bool>,
    pub include_html: Option<bool>,
    pub summary_reports: Option<Vec<String>>,
    pub outputs: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RunPeriodParameters {
    pub start_month: Option<u32>,
    pub start_day: Option<u32>,
    pub end_month: Option<u32>,
    pub end_day: Option<u32>,
    pub start_day_of_week: Option<DayOfWeek>,
    pub holidays: Option<Vec<MonthDay>>,
    pub daylight_saving: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SimulationControlParameters {
    pub do_zone_sizing: Option<bool>,
    pub do_system_sizing: Option<bool>,
    pub do_plant_sizing: Option<bool>,
    pub run_for_sizing_periods: Option<bool>,
    pub run_for_run_periods: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ShadowCalculationParameters {
    pub solar_distribution: Option<SolarDistribution>,
    pub calculation_method: Option<CalculationMethod>,
    pub calculation_frequency: Option<u32>,
    pub maximum_figures: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SizingParameters {
    pub heating_factor: Option<f64>,
    pub cooling_factor: Option<f64>,
}

/// Simulation settings as supplied by a caller. Anything left out is taken from
/// the canonical defaults when resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SimulationParameters {
    pub output: Option<OutputParameters>,
    pub run_period: Option<RunPeriodParameters>,
    pub timestep: Option<u32>,
    pub simulation_control: Option<SimulationControlParameters>,
    pub shadow_calculation: Option<ShadowCalculationParameters>,
    pub sizing_parameter: Option<SizingParameters>,
    pub north_angle: Option<f64>,
    pub terrain_type: Option<TerrainType>,
}

// ---- resolved -----------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Output {
    pub reporting_frequency: ReportingFrequency,
    pub include_sqlite: bool,
    pub include_html: bool,
    pub summary_reports: Vec<String>,
    pub outputs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunPeriod {
    pub start_month: u32,
    pub start_day: u32,
    pub end_month: u32,
    pub end_day: u32,
    pub start_day_of_week: DayOfWeek,
    pub holidays: Vec<MonthDay>,
    pub daylight_saving: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationControl {
    pub do_zone_sizing: bool,
    pub do_system_sizing: bool,
    pub do_plant_sizing: bool,
    pub run_for_sizing_periods: bool,
    pub run_for_run_periods: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShadowCalculation {
    pub solar_distribution: SolarDistribution,
    pub calculation_method: CalculationMethod,
    pub calculation_frequency: u32,
    pub maximum_figures: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sizing {
    pub heating_factor: f64,
    pub cooling_factor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedSimulationParameters {
    pub output: Output,
    pub run_period: RunPeriod,
    pub timestep: u32,
    pub simulation_control: SimulationControl,
    pub shadow_calculation: ShadowCalculation,
    pub sizing_parameter: Sizing,
    pub north_angle: f64,
    pub terrain_type: TerrainType,
}

/// The built-in settings: a full calendar year at one step per hour with the
/// minimal output set.
pub fn canonical() -> ResolvedSimulationParameters {
    ResolvedSimulationParameters {
        output: Output {
            reporting_frequency: ReportingFrequency::Hourly,
            include_sqlite: false,
            include_html: false,
            summary_reports: vec!["AllSummary".to_string()],
            outputs: Vec::new(),
        },
        run_period: RunPeriod {
            start_month: 1,
            start_day: 1,
            end_month: 12,
            end_day: 31,
            start_day_of_week: DayOfWeek::Sunday,
            holidays: Vec::new(),
            daylight_saving: false,
        },
        timestep: 1,
        simulation_control: SimulationControl {
            do_zone_sizing: true,
            do_system_sizing: true,
            do_plant_sizing: true,
            run_for_sizing_periods: false,
            run_for_run_periods: true,
        },
        shadow_calculation: ShadowCalculation {
            solar_distribution: SolarDistribution::FullExteriorWithReflections,
            calculation_method: CalculationMethod::PolygonClipping,
            calculation_frequency: 30,
            maximum_figures: 15000,
        },
        sizing_parameter: Sizing {
            heating_factor: 1.25,
            cooling_factor: 1.15,
        },
        north_angle: 0.0,
        terrain_type: TerrainType::City,
    }
}

pub fn resolve(input: Option<&SimulationParameters>) -> ResolvedSimulationParameters {
    resolve_with_notes(input).0
}

/// Like [`resolve`] but also returns a note for every value that had to be
/// adjusted to something the simulation engine accepts.
pub fn resolve_with_notes(
    input: Option<&SimulationParameters>,
) -> (ResolvedSimulationParameters, Vec<String>) {
    let base = canonical();
    let Some(input) = input else {
        return (base, Vec::new());
    };
    let mut notes = Vec::new();

    let output = merge_output(input.output.as_ref(), base.output);
    let run_period = merge_run_period(input.run_period.as_ref(), base.run_period, &mut notes);
    let timestep = match input.timestep {
        Some(ts) => clamp_timestep(ts, &mut notes),
        None => base.timestep,
    };
    let simulation_control =
        merge_simulation_control(input.simulation_control.as_ref(), base.simulation_control);
    let shadow_calculation =
        merge_shadow_calculation(input.shadow_calculation.as_ref(), base.shadow_calculation);
    let sizing_parameter = merge_sizing(input.sizing_parameter.as_ref(), base.sizing_parameter);

    let north_angle = match input.north_angle {
        Some(angle) if angle.is_finite() => angle.rem_euclid(360.0),
        Some(angle) => {
            notes.push(format!("north angle {angle} is not finite; using {}", base.north_angle));
            base.north_angle
        }
        None => base.north_angle,
    };

    for note in &notes {
        warn!("{note}");
    }

    (
        ResolvedSimulationParameters {
            output,
            run_period,
            timestep,
            simulation_control,
            shadow_calculation,
            sizing_parameter,
            north_angle,
            terrain_type: input.terrain_type.unwrap_or(base.terrain_type),
        },
        notes,
    )
}

fn merge_output(input: Option<&OutputParameters>, base: Output) -> Output {
    let Some(input) = input else {
        return base;
    };
    Output {
        reporting_frequency: input.reporting_frequency.unwrap_or(base.reporting_frequency),
        include_sqlite: input.include_sqlite.unwrap_or(base.include_sqlite),
        include_html: input.include_html.unwrap_or(base.include_html),
        summary_reports: input.summary_reports.clone().unwrap_or(base.summary_reports),
        outputs: input.outputs.clone().unwrap_or(base.outputs),
    }
}

fn merge_run_period(
    input: Option<&RunPeriodParameters>,
    base: RunPeriod,
    notes: &mut Vec<String>,
) -> RunPeriod {
    let Some(input) = input else {
        return base;
    };
    let start_month = clamp_month(input.start_month.unwrap_or(base.start_month), notes);
    let end_month = clamp_month(input.end_month.unwrap_or(base.end_month), notes);
    let start_day = clamp_day(start_month, input.start_day.unwrap_or(base.start_day), notes);
    let end_day = clamp_day(end_month, input.end_day.unwrap_or(base.end_day), notes);
    let holidays = match &input.holidays {
        Some(days) => days
            .iter()
            .map(|d| {
                let month = clamp_month(d.month, notes);
                MonthDay {
                    month,
                    day: clamp_day(month, d.day, notes),
                }
            })
            .collect(),
        None => base.holidays,
    };
    RunPeriod {
        start_month,
        start_day,
        end_month,
        end_day,
        start_day_of_week: input.start_day_of_week.unwrap_or(base.start_day_of_week),
        holidays,
        daylight_saving: input.daylight_saving.unwrap_or(base.daylight_saving),
    }
}

fn merge_simulation_control(
    input: Option<&SimulationControlParameters>,
    base: SimulationControl,
) -> SimulationControl {
    let Some(input) = input else {
        return base;
    };
    SimulationControl {
        do_zone_sizing: input.do_zone_sizing.unwrap_or(base.do_zone_sizing),
        do_system_sizing: input.do_system_sizing.unwrap_or(base.do_system_sizing),
        do_plant_sizing: input.do_plant_sizing.unwrap_or(base.do_plant_sizing),
        run_for_sizing_periods: input
            .run_for_sizing_periods
            .unwrap_or(base.run_for_sizing_periods),
        run_for_run_periods: input.run_for_run_periods.unwrap_or(base.run_for_run_periods),
    }
}

fn merge_shadow_calculation(
    input: Option<&ShadowCalculationParameters>,
    base: ShadowCalculation,
) -> ShadowCalculation {
    let Some(input) = input else {
        return base;
    };
    ShadowCalculation {
        solar_distribution: input.solar_distribution.unwrap_or(base.solar_distribution),
        calculation_method: input.calculation_method.unwrap_or(base.calculation_method),
        calculation_frequency: input
            .calculation_frequency
            .filter(|f| *f > 0)
            .unwrap_or(base.calculation_frequency),
        maximum_figures: input
            .maximum_figures
            .filter(|f| *f > 0)
            .unwrap_or(base.maximum_figures),
    }
}

fn merge_sizing(input: Option<&SizingParameters>, base: Sizing) -> Sizing {
    let Some(input) = input else {
        return base;
    };
    Sizing {
        heating_factor: input
            .heating_factor
            .filter(|f| f.is_finite() && *f > 0.0)
            .unwrap_or(base.heating_factor),
        cooling_factor: input
            .cooling_factor
            .filter(|f| f.is_finite() && *f > 0.0)
            .unwrap_or(base.cooling_factor),
    }
}

/// Nearest allowed timestep; ties go to the smaller value.
pub fn clamp_timestep(timestep: u32, notes: &mut Vec<String>) -> u32 {
    if ALLOWED_TIMESTEPS.contains(&timestep) {
        return timestep;
    }
    let mut best = ALLOWED_TIMESTEPS[0];
    for candidate in ALLOWED_TIMESTEPS {
        if candidate.abs_diff(timestep) < best.abs_diff(timestep) {
            best = candidate;
        }
    }
    notes.push(format!(
        "timestep {timestep} per hour is not supported; using {best}"
    ));
    best
}

fn clamp_month(month: u32, notes: &mut Vec<String>) -> u32 {
    let clamped = month.clamp(1, 12);
    if clamped != month {
        notes.push(format!("month {month} is out of range; using {clamped}"));
    }
    clamped
}

fn clamp_day(month: u32, day: u32, notes: &mut Vec<String>) -> u32 {
    let clamped = day.clamp(1, days_in_month(month));
    if clamped != day {
        notes.push(format!(
            "day {day} does not exist in month {month}; using {clamped}"
        ));
    }
    clamped
}

fn days_in_month(month: u32) -> u32 {
    match month {
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}
