//! Static SVG chart adapter implementing ReportPort.
//!
//! Two stacked panels sharing the date axis: price with both moving
//! averages and buy/sell markers on top, portfolio value below.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use tracing::info;

use crate::domain::backtest::BacktestRun;
use crate::domain::error::SmaCrossError;
use crate::ports::report_port::ReportPort;

const WIDTH: f64 = 1000.0;
const PANEL_HEIGHT: f64 = 320.0;
const PADDING: f64 = 50.0;
const MARKER_SIZE: f64 = 7.0;

/// Vertical slot of one panel and the value range it maps.
struct Panel {
    top: f64,
    min: f64,
    max: f64,
}

impl Panel {
    fn new(top: f64, values: impl Iterator<Item = f64>) -> Self {
        let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        let (min, max) = if min.is_finite() && max.is_finite() {
            (min, max)
        } else {
            (0.0, 1.0)
        };
        Panel { top, min, max }
    }

    fn plot_height(&self) -> f64 {
        PANEL_HEIGHT - 2.0 * PADDING
    }

    fn y(&self, value: f64) -> f64 {
        let range = self.max - self.min;
        let scaled = if range > 0.0 {
            (value - self.min) / range * self.plot_height()
        } else {
            self.plot_height() / 2.0
        };
        self.top + PANEL_HEIGHT - PADDING - scaled
    }
}

fn x_at(index: usize, count: usize) -> f64 {
    let plot_width = WIDTH - 2.0 * PADDING;
    if count > 1 {
        PADDING + index as f64 * plot_width / (count - 1) as f64
    } else {
        PADDING
    }
}

fn polyline(panel: &Panel, values: &[Option<f64>], style: &str) -> String {
    let points: Vec<String> = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| format!("{:.1},{:.1}", x_at(i, values.len()), panel.y(v))))
        .collect();
    if points.is_empty() {
        return String::new();
    }
    format!(
        "<polyline fill=\"none\" {} points=\"{}\"/>\n",
        style,
        points.join(" ")
    )
}

fn frame(panel: &Panel, title: &str) -> String {
    format!(
        "<rect x=\"{:.0}\" y=\"{:.0}\" width=\"{:.0}\" height=\"{:.0}\" fill=\"white\" stroke=\"#ccc\"/>\n\
         <text x=\"{:.0}\" y=\"{:.0}\" font-size=\"16\" font-family=\"sans-serif\">{}</text>\n\
         <text x=\"5\" y=\"{:.0}\" font-size=\"10\" font-family=\"sans-serif\">{:.2}</text>\n\
         <text x=\"5\" y=\"{:.0}\" font-size=\"10\" font-family=\"sans-serif\">{:.2}</text>\n",
        PADDING,
        panel.top + PADDING,
        WIDTH - 2.0 * PADDING,
        panel.plot_height(),
        PADDING,
        panel.top + PADDING - 10.0,
        title,
        panel.y(panel.max),
        panel.max,
        panel.y(panel.min),
        panel.min,
    )
}

fn legend(panel: &Panel, entries: &[(&str, &str)]) -> String {
    let mut out = String::new();
    for (i, (label, color)) in entries.iter().enumerate() {
        let y = panel.top + PADDING + 15.0 + i as f64 * 14.0;
        let _ = write!(
            out,
            "<rect x=\"{:.0}\" y=\"{:.0}\" width=\"10\" height=\"10\" fill=\"{}\"/>\
             <text x=\"{:.0}\" y=\"{:.0}\" font-size=\"11\" font-family=\"sans-serif\">{}</text>\n",
            PADDING + 10.0,
            y - 9.0,
            color,
            PADDING + 25.0,
            y,
            label
        );
    }
    out
}

fn marker(x: f64, y: f64, up: bool) -> String {
    let (tip, base, color) = if up {
        (y - MARKER_SIZE, y + MARKER_SIZE, "green")
    } else {
        (y + MARKER_SIZE, y - MARKER_SIZE, "red")
    };
    format!(
        "<polygon fill=\"{}\" points=\"{:.1},{:.1} {:.1},{:.1} {:.1},{:.1}\"/>\n",
        color,
        x,
        tip,
        x - MARKER_SIZE,
        base,
        x + MARKER_SIZE,
        base
    )
}

/// Renders the full two-panel chart for a run.
pub fn render_svg(run: &BacktestRun<'_>) -> String {
    let prices = run.prices();
    let n = prices.len();
    let closes: Vec<Option<f64>> = prices.closes().into_iter().map(Some).collect();
    let short_label = format!("SMA{}", run.params.short_window);
    let long_label = format!("SMA{}", run.params.long_window);

    let price_panel = Panel::new(
        0.0,
        closes
            .iter()
            .chain(&run.indicators.short_avg)
            .chain(&run.indicators.long_avg)
            .flatten()
            .copied(),
    );
    let value_panel = Panel::new(
        PANEL_HEIGHT,
        run.simulation.portfolio_value.iter().copied(),
    );

    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{:.0}\" height=\"{:.0}\" viewBox=\"0 0 {:.0} {:.0}\">\n",
        WIDTH,
        2.0 * PANEL_HEIGHT,
        WIDTH,
        2.0 * PANEL_HEIGHT
    );

    svg.push_str(&frame(&price_panel, "Price and Moving Averages"));
    svg.push_str(&polyline(
        &price_panel,
        &closes,
        "stroke=\"steelblue\" stroke-opacity=\"0.5\" stroke-width=\"1.5\"",
    ));
    svg.push_str(&polyline(
        &price_panel,
        &run.indicators.short_avg,
        "stroke=\"orange\" stroke-dasharray=\"6,3\" stroke-width=\"1.5\"",
    ));
    svg.push_str(&polyline(
        &price_panel,
        &run.indicators.long_avg,
        "stroke=\"purple\" stroke-dasharray=\"6,3\" stroke-width=\"1.5\"",
    ));

    for i in 0..n {
        let buy = run.positions.is_buy_signal(i);
        if buy || run.positions.is_sell_signal(i) {
            svg.push_str(&marker(x_at(i, n), price_panel.y(prices.close(i)), buy));
        }
    }

    svg.push_str(&legend(
        &price_panel,
        &[
            ("Price", "steelblue"),
            (short_label.as_str(), "orange"),
            (long_label.as_str(), "purple"),
            ("Buy Signal", "green"),
            ("Sell Signal", "red"),
        ],
    ));

    let values: Vec<Option<f64>> = run
        .simulation
        .portfolio_value
        .iter()
        .copied()
        .map(Some)
        .collect();
    svg.push_str(&frame(&value_panel, "Portfolio Performance"));
    svg.push_str(&polyline(
        &value_panel,
        &values,
        "stroke=\"blue\" stroke-width=\"1.5\"",
    ));
    svg.push_str(&legend(&value_panel, &[("Portfolio Value", "blue")]));

    if let (Some(first), Some(last)) = (prices.first_date(), prices.last_date()) {
        let _ = writeln!(
            svg,
            "<text x=\"{:.0}\" y=\"{:.0}\" font-size=\"10\" font-family=\"sans-serif\">{}</text>\
             <text x=\"{:.0}\" y=\"{:.0}\" font-size=\"10\" font-family=\"sans-serif\" text-anchor=\"end\">{}</text>",
            PADDING,
            2.0 * PANEL_HEIGHT - PADDING + 15.0,
            first,
            WIDTH - PADDING,
            2.0 * PANEL_HEIGHT - PADDING + 15.0,
            last
        );
    }

    svg.push_str("</svg>\n");
    svg
}

pub struct SvgChartAdapter;

impl SvgChartAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SvgChartAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPort for SvgChartAdapter {
    fn write(&self, run: &BacktestRun<'_>, output_path: &Path) -> Result<(), SmaCrossError> {
        let svg = render_svg(run);

        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(output_path, svg)?;

        info!(path = %output_path.display(), "chart written");
        Ok(())
    }
}
