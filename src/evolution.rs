use crate::error::{Error, Result};
use serde::Serialize;

/// Rates are stored in Hz and charted in kHz.
pub const RATE_SCALE: f64 = 1000.0;

pub const CHART_TOP: f64 = 0.06;
pub const CHART_BOTTOM: f64 = 0.12;
pub const CHART_V_MARGIN: f64 = 0.011;
pub const CHART_PADS: usize = 3;

/// Year whose numbers only cover the start of data taking.
pub const PARTIAL_YEAR: u16 = 2025;

/// Fill-averaged HLT rates (Hz) and instantaneous luminosity
/// (1e34 cm^-2 s^-1) of one data-taking year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearSummary {
    pub year: u16,
    pub prompt_hz: f64,
    pub parking_hz: f64,
    pub scouting_hz: f64,
    pub fill: u32,
    pub lumi: f64,
}

impl YearSummary {
    const fn new(year: u16, prompt_hz: f64, parking_hz: f64, scouting_hz: f64, fill: u32, lumi: f64) -> Self {
        Self { year, prompt_hz, parking_hz, scouting_hz, fill, lumi }
    }
}

pub const YEARS: [YearSummary; 9] = [
    YearSummary::new(2012, 420.0, 400.0, 996.0, 2998, 0.50),
    YearSummary::new(2015, 992.5, 98.8, 1057.1, 4452, 0.25),
    YearSummary::new(2016, 1005.8, 514.5, 4467.8, 5418, 0.91),
    YearSummary::new(2017, 976.0, 409.7, 4635.0, 6324, 1.01),
    YearSummary::new(2018, 1046.4, 2918.7, 4855.6, 7124, 1.18),
    YearSummary::new(2022, 1776.7, 2438.3, 22296.7, 8489, 1.45),
    YearSummary::new(2023, 1683.8, 2660.2, 17114.2, 9044, 1.66),
    YearSummary::new(2024, 2350.8, 4768.19, 26530.02, 10116, 1.87),
    YearSummary::new(2025, 2894.48, 7647.65, 37723.05, 10690, 2.04),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearBin {
    pub year: u16,
    pub label: String,
    /// Bin centre on an axis with unit-width bins starting at 0.
    pub x: f64,
    pub fill: u32,
    pub partial: bool,
}

/// One value per bin, in bin order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EvolutionSeries {
    pub prompt: Vec<f64>,
    pub parking: Vec<f64>,
    pub prompt_plus_parking: Vec<f64>,
    pub scouting: Vec<f64>,
    pub lumi: Vec<f64>,
    /// The partial year only; every other bin holds 0.
    pub prompt_partial: Vec<f64>,
    pub prompt_plus_parking_partial: Vec<f64>,
    pub scouting_partial: Vec<f64>,
}

impl EvolutionSeries {
    /// Bins `years` ascending and converts rates to kHz. The bars of
    /// `partial_year` are moved to the `*_partial` series.
    pub fn build(years: &[YearSummary], partial_year: Option<u16>) -> (Vec<YearBin>, Self) {
        let mut sorted = years.to_vec();
        sorted.sort_by_key(|y| y.year);

        let mut bins = Vec::with_capacity(sorted.len());
        let mut series = Self::default();
        for (idx, summary) in sorted.iter().enumerate() {
            let partial = partial_year == Some(summary.year);
            let label = if partial {
                format!("{}*", summary.year)
            } else {
                summary.year.to_string()
            };
            bins.push(YearBin {
                year: summary.year,
                label,
                x: idx as f64 + 0.5,
                fill: summary.fill,
                partial,
            });

            let prompt = summary.prompt_hz / RATE_SCALE;
            let parking = summary.parking_hz / RATE_SCALE;
            let scouting = summary.scouting_hz / RATE_SCALE;
            let stacked = prompt + parking;

            series.parking.push(parking);
            series.lumi.push(summary.lumi);
            let (regular, moved) = if partial { (0.0, 1.0) } else { (1.0, 0.0) };
            series.prompt.push(prompt * regular);
            series.prompt_plus_parking.push(stacked * regular);
            series.scouting.push(scouting * regular);
            series.prompt_partial.push(prompt * moved);
            series.prompt_plus_parking_partial.push(stacked * moved);
            series.scouting_partial.push(scouting * moved);
        }
        (bins, series)
    }
}

/// Vertical extent of one pad in canvas coordinates, with its margins
/// expressed as fractions of the pad's own height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Pad {
    pub y_min: f64,
    pub y_max: f64,
    pub factor_y: f64,
    pub bottom_margin: f64,
    pub top_margin: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PadLayout {
    pub pad_height: f64,
    /// Bottom pad first.
    pub pads: Vec<Pad>,
}

impl PadLayout {
    /// Stacks `n` pads of equal plot height over the unit canvas. The
    /// canvas margins `bottom` and `top` go to the outer pads and every
    /// inner edge gets `v_margin`.
    pub fn stacked(n: usize, top: f64, bottom: f64, v_margin: f64) -> Result<Self> {
        if n == 0 {
            return Err(Error::Layout("at least one pad is required".into()));
        }
        let pad_height = (1.0 - top - bottom - (2 * n - 2) as f64 * v_margin) / n as f64;
        if pad_height <= 0.0 {
            return Err(Error::Layout(format!(
                "margins leave no room for {} pads (pad height {:.4})",
                n, pad_height
            )));
        }

        let mut pads = Vec::with_capacity(n);
        let mut y_min = 0.0;
        for i in 0..n {
            let lower = if i == 0 { bottom } else { v_margin };
            let upper = if i + 1 == n { top } else { v_margin };
            let y_max = y_min + lower + pad_height + upper;
            let factor_y = 1.0 / (y_max - y_min);
            pads.push(Pad {
                y_min,
                y_max,
                factor_y,
                bottom_margin: lower * factor_y,
                top_margin: upper * factor_y,
            });
            y_min = y_max;
        }
        Ok(Self { pad_height, pads })
    }
}

/// Everything the renderer needs, as written by `hlt-rate-evolution`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvolutionChart {
    pub bins: Vec<YearBin>,
    pub series: EvolutionSeries,
    pub pads: Vec<Pad>,
}

impl EvolutionChart {
    pub fn build(years: &[YearSummary], partial_year: Option<u16>) -> Result<Self> {
        let (bins, series) = EvolutionSeries::build(years, partial_year);
        let layout = PadLayout::stacked(CHART_PADS, CHART_TOP, CHART_BOTTOM, CHART_V_MARGIN)?;
        Ok(Self {
            bins,
            series,
            pads: layout.pads,
        })
    }
}
