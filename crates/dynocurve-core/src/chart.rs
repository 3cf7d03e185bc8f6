//! Comparison chart
//!
//! Builds a chart model from one or two smoothed runs and renders it to an
//! image file with `plotters`.

use std::path::Path;

use plotters::coord::Shift;
use plotters::element::DashedPathElement;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use plotters::style::{FontDesc, FontFamily, FontStyle};
use serde::{Deserialize, Serialize};

use crate::error::DynoError;
use crate::smoothing::SmoothedCurve;

/// Default image size in pixels
pub const DEFAULT_SIZE: (u32, u32) = (1024, 768);

/// Width of a peak summary box (px)
pub const ANNOTATION_WIDTH: i32 = 320;

const ANNOTATION_MARGIN: i32 = 12;
const ANNOTATION_GAP: i32 = 6;
const ANNOTATION_LINE_HEIGHT: i32 = 18;
const ANNOTATION_PADDING: i32 = 8;

/// Which of the two runs to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Only the first run
    First,
    /// Only the second run
    Second,
    /// Both runs on one chart
    #[default]
    Both,
}

impl DisplayMode {
    /// Whether the first run is drawn
    pub fn shows_first(&self) -> bool {
        matches!(self, DisplayMode::First | DisplayMode::Both)
    }

    /// Whether the second run is drawn
    pub fn shows_second(&self) -> bool {
        matches!(self, DisplayMode::Second | DisplayMode::Both)
    }
}

/// Physical quantity of a series; fixes its colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Quantity {
    /// Flywheel power (hp), blue
    Power,
    /// Flywheel torque (N·m), red
    Torque,
}

impl Quantity {
    fn color(&self) -> RGBColor {
        match self {
            Quantity::Power => BLUE,
            Quantity::Torque => RED,
        }
    }
}

/// Line pattern; tells the two runs apart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LineStyle {
    /// First run
    Solid,
    /// Second run
    Dashed,
}

/// Length of a legend sample line (px)
pub const LEGEND_SAMPLE_LENGTH: i32 = 20;

impl LineStyle {
    /// `(dash, gap)` in pixels for lines in this style, `None` when solid
    pub fn dash_pattern(&self) -> Option<(i32, i32)> {
        match self {
            LineStyle::Solid => None,
            LineStyle::Dashed => Some((10, 6)),
        }
    }

    /// `(dash, gap)` for the legend sample, short enough to show a gap
    pub fn legend_dash_pattern(&self) -> Option<(i32, i32)> {
        self.dash_pattern().map(|_| (6, 4))
    }
}

/// A line on the chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    /// Legend text
    pub label: String,
    /// Power or torque
    pub quantity: Quantity,
    /// Solid or dashed
    pub line: LineStyle,
    /// `(rpm, value)` pairs in ascending rpm
    pub points: Vec<(f64, f64)>,
}

/// A peak marker
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeakMarker {
    /// Power or torque peak
    pub quantity: Quantity,
    /// Engine speed of the peak
    pub rpm: f64,
    /// Peak value
    pub value: f64,
}

/// Peak summary box for one run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    /// Stacking position from the top, 0 first
    pub slot: usize,
    /// Text lines
    pub lines: Vec<String>,
}

impl Annotation {
    /// Pixel height of the box
    pub fn height(&self) -> i32 {
        ANNOTATION_LINE_HEIGHT * self.lines.len() as i32 + ANNOTATION_PADDING
    }

    /// Top and bottom pixel rows of the box, relative to the plot area
    ///
    /// Every box holds the same number of lines, so slot `n` starts below the
    /// `n` boxes above it. The layout does not depend on the image size.
    pub fn pixel_rows(&self) -> (i32, i32) {
        let height = self.height();
        let top = ANNOTATION_MARGIN + self.slot as i32 * (height + ANNOTATION_GAP);
        (top, top + height)
    }
}

/// A complete chart, ready for export
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    /// Caption
    pub title: String,
    /// X axis description
    pub x_label: String,
    /// Y axis description
    pub y_label: String,
    /// Lines, two per drawn run
    pub series: Vec<ChartSeries>,
    /// Peak markers, two per drawn run
    pub markers: Vec<PeakMarker>,
    /// Summary boxes, one per drawn run
    pub annotations: Vec<Annotation>,
}

/// Build the comparison chart
///
/// Returns `None` when nothing would be drawn: both curves absent, or
/// `mode` selects only absent curves.
pub fn render(
    first: Option<&SmoothedCurve>,
    second: Option<&SmoothedCurve>,
    mode: DisplayMode,
    label1: &str,
    label2: &str,
) -> Option<Chart> {
    let mut chart = Chart {
        title: "Flywheel power and torque".to_string(),
        x_label: "Engine speed (rpm)".to_string(),
        y_label: "Value".to_string(),
        series: Vec::new(),
        markers: Vec::new(),
        annotations: Vec::new(),
    };

    let runs = [
        (first.filter(|_| mode.shows_first()), label1, LineStyle::Solid),
        (second.filter(|_| mode.shows_second()), label2, LineStyle::Dashed),
    ];

    for (curve, label, line) in runs {
        if let Some(curve) = curve {
            chart.add_run(curve, label, line);
        }
    }

    if chart.series.is_empty() {
        tracing::debug!("No curve selected for {:?}, skipping chart", mode);
        return None;
    }
    Some(chart)
}

/// Summary text for one run's annotation box
pub fn peak_summary(label: &str, curve: &SmoothedCurve) -> Vec<String> {
    vec![
        label.to_string(),
        format!(
            "Max power: {:.2} hp @ {:.0} rpm",
            curve.peak_power.value, curve.peak_power.rpm
        ),
        format!(
            "Max torque: {:.2} N·m @ {:.0} rpm",
            curve.peak_torque.value, curve.peak_torque.rpm
        ),
    ]
}

impl Chart {
    fn add_run(&mut self, curve: &SmoothedCurve, label: &str, line: LineStyle) {
        let rpms = curve.rpms();
        self.series.push(ChartSeries {
            label: format!("Power (hp) - {label}"),
            quantity: Quantity::Power,
            line,
            points: rpms.iter().copied().zip(curve.power()).collect(),
        });
        self.series.push(ChartSeries {
            label: format!("Torque (N·m) - {label}"),
            quantity: Quantity::Torque,
            line,
            points: rpms.iter().copied().zip(curve.torque()).collect(),
        });

        self.markers.push(PeakMarker {
            quantity: Quantity::Power,
            rpm: curve.peak_power.rpm,
            value: curve.peak_power.value,
        });
        self.markers.push(PeakMarker {
            quantity: Quantity::Torque,
            rpm: curve.peak_torque.rpm,
            value: curve.peak_torque.value,
        });

        self.annotations.push(Annotation {
            slot: self.annotations.len(),
            lines: peak_summary(label, curve),
        });
    }

    /// Number of runs drawn
    pub fn run_count(&self) -> usize {
        self.annotations.len()
    }

    /// Axis ranges covering every series, padded so flat data stays visible
    pub fn bounds(&self) -> ((f64, f64), (f64, f64)) {
        let points = self.series.iter().flat_map(|s| s.points.iter());
        let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut y_min, mut y_max) = (0.0f64, f64::NEG_INFINITY);
        for &(x, y) in points {
            x_min = x_min.min(x);
            x_max = x_max.max(x);
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }

        if !x_min.is_finite() || !x_max.is_finite() {
            (x_min, x_max) = (0.0, 1.0);
        } else if x_max - x_min < f64::EPSILON {
            (x_min, x_max) = (x_min - 1.0, x_max + 1.0);
        }
        if !y_max.is_finite() || y_max - y_min < f64::EPSILON {
            y_max = y_min + 1.0;
        }

        ((x_min, x_max), (y_min, y_max + (y_max - y_min) * 0.1))
    }

    /// Render to an image file at the default size
    ///
    /// The format follows the extension: `.svg` writes SVG, anything else PNG.
    pub fn export<P: AsRef<Path>>(&self, path: P) -> Result<(), DynoError> {
        self.export_sized(path, DEFAULT_SIZE)
    }

    /// Render to an image file with an explicit pixel size
    pub fn export_sized<P: AsRef<Path>>(&self, path: P, size: (u32, u32)) -> Result<(), DynoError> {
        let path = path.as_ref();
        let is_svg = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("svg"));

        let result = if is_svg {
            self.draw_on(SVGBackend::new(path, size).into_drawing_area())
                .map_err(|e| e.to_string())
        } else {
            self.draw_on(BitMapBackend::new(path, size).into_drawing_area())
                .map_err(|e| e.to_string())
        };

        result.map_err(|e| DynoError::Render(format!("{}: {e}", path.display())))?;
        tracing::info!("Chart written to {}", path.display());
        Ok(())
    }

    fn draw_on<DB: DrawingBackend>(
        &self,
        root: DrawingArea<DB, Shift>,
    ) -> DrawResult<(), DB> {
        root.fill(&WHITE)?;

        let ((x_min, x_max), (y_min, y_max)) = self.bounds();
        let mut chart = ChartBuilder::on(&root)
            .caption(&self.title, ("sans-serif", 26))
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

        chart
            .configure_mesh()
            .x_desc(self.x_label.as_str())
            .y_desc(self.y_label.as_str())
            .draw()?;

        for series in &self.series {
            let style = series.quantity.color().stroke_width(2);
            let points = series.points.clone();
            let sample = LEGEND_SAMPLE_LENGTH;
            match (series.line.dash_pattern(), series.line.legend_dash_pattern()) {
                (Some((dash, gap)), Some((legend_dash, legend_gap))) => {
                    chart
                        .draw_series(DashedLineSeries::new(points, dash, gap, style))?
                        .label(series.label.as_str())
                        .legend(move |(x, y)| {
                            DashedPathElement::new(
                                vec![(x, y), (x + sample, y)],
                                legend_dash,
                                legend_gap,
                                style,
                            )
                        });
                }
                _ => {
                    chart
                        .draw_series(LineSeries::new(points, style))?
                        .label(series.label.as_str())
                        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + sample, y)], style));
                }
            }
        }

        for marker in &self.markers {
            chart.draw_series(std::iter::once(Circle::new(
                (marker.rpm, marker.value),
                5,
                marker.quantity.color().filled(),
            )))?;
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;

        let plot = chart.plotting_area().strip_coord_spec();
        let text_style = FontDesc::new(FontFamily::SansSerif, 15.0, FontStyle::Normal).color(&BLACK);
        let left = ANNOTATION_MARGIN;
        let right = left + ANNOTATION_WIDTH;
        for annotation in &self.annotations {
            let (top, bottom) = annotation.pixel_rows();

            plot.draw(&Rectangle::new(
                [(left, top), (right, bottom)],
                WHITE.mix(0.8).filled(),
            ))?;
            plot.draw(&Rectangle::new([(left, top), (right, bottom)], BLACK.stroke_width(1)))?;
            for (i, text) in annotation.lines.iter().enumerate() {
                let baseline = top + ANNOTATION_PADDING / 2 + ANNOTATION_LINE_HEIGHT * i as i32;
                plot.draw_text(text, &text_style, (left + 6, baseline))?;
            }
        }

        root.present()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smoothing::{CurvePoint, Peak};

    fn curve(scale: f64) -> SmoothedCurve {
        let points = vec![
            CurvePoint { rpm: 2000.0, power_hp: 50.0 * scale, torque_nm: 180.0 * scale },
            CurvePoint { rpm: 4000.0, power_hp: 110.0 * scale, torque_nm: 200.0 * scale },
            CurvePoint { rpm: 6000.0, power_hp: 130.0 * scale, torque_nm: 160.0 * scale },
        ];
        SmoothedCurve {
            peak_power: Peak { value: 130.0 * scale, rpm: 6000.0, index: 2 },
            peak_torque: Peak { value: 200.0 * scale, rpm: 4000.0, index: 1 },
            points,
        }
    }

    #[test]
    fn test_mode_flags() {
        assert!(DisplayMode::First.shows_first());
        assert!(!DisplayMode::First.shows_second());
        assert!(DisplayMode::Both.shows_first() && DisplayMode::Both.shows_second());
        assert_eq!(DisplayMode::default(), DisplayMode::Both);
    }

    #[test]
    fn test_render_nothing() {
        assert!(render(None, None, DisplayMode::Both, "a", "b").is_none());
        let only_first = curve(1.0);
        assert!(render(Some(&only_first), None, DisplayMode::Second, "a", "b").is_none());
    }

    #[test]
    fn test_render_both_styles() {
        let (a, b) = (curve(1.0), curve(1.2));
        let chart = render(Some(&a), Some(&b), DisplayMode::Both, "Stock", "Tuned").unwrap();

        assert_eq!(chart.series.len(), 4);
        assert_eq!(chart.markers.len(), 4);
        assert_eq!(chart.run_count(), 2);
        assert_eq!(chart.series[0].line, LineStyle::Solid);
        assert_eq!(chart.series[2].line, LineStyle::Dashed);
        assert_eq!(chart.series[2].quantity, Quantity::Power);
        assert_eq!(chart.annotations[1].slot, 1);
        assert_eq!(chart.annotations[1].lines[0], "Tuned");
    }

    #[test]
    fn test_second_only_takes_top_slot() {
        let (a, b) = (curve(1.0), curve(1.2));
        let chart = render(Some(&a), Some(&b), DisplayMode::Second, "Stock", "Tuned").unwrap();
        assert_eq!(chart.run_count(), 1);
        assert_eq!(chart.annotations[0].slot, 0);
        assert_eq!(chart.series[0].line, LineStyle::Dashed);
    }

    #[test]
    fn test_annotation_boxes_do_not_overlap() {
        let (a, b) = (curve(1.0), curve(1.2));
        let chart = render(Some(&a), Some(&b), DisplayMode::Both, "Stock", "Tuned").unwrap();

        let (top0, bottom0) = chart.annotations[0].pixel_rows();
        let (top1, bottom1) = chart.annotations[1].pixel_rows();
        assert!(top0 < bottom0 && top1 < bottom1);
        assert!(bottom0 < top1, "boxes {top0}..{bottom0} and {top1}..{bottom1} overlap");
    }

    #[test]
    fn test_legend_sample_shows_dash() {
        assert_eq!(LineStyle::Solid.legend_dash_pattern(), None);

        // at least two dashes with a gap between them fit in the sample
        let (dash, gap) = LineStyle::Dashed.legend_dash_pattern().unwrap();
        assert!(dash > 0 && gap > 0);
        assert!(2 * dash + gap <= LEGEND_SAMPLE_LENGTH);
    }

    #[test]
    fn test_peak_summary_text() {
        let lines = peak_summary("Stock", &curve(1.0));
        assert_eq!(lines[1], "Max power: 130.00 hp @ 6000 rpm");
        assert_eq!(lines[2], "Max torque: 200.00 N·m @ 4000 rpm");
    }

    #[test]
    fn test_bounds_pad_degenerate_ranges() {
        let single = SmoothedCurve {
            points: vec![CurvePoint { rpm: 3000.0, power_hp: 0.0, torque_nm: 0.0 }],
            peak_power: Peak { value: 0.0, rpm: 3000.0, index: 0 },
            peak_torque: Peak { value: 0.0, rpm: 3000.0, index: 0 },
        };
        let chart = render(Some(&single), None, DisplayMode::First, "x", "").unwrap();
        let ((x0, x1), (y0, y1)) = chart.bounds();
        assert!(x1 > x0);
        assert!(y1 > y0);
    }
}
