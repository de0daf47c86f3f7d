use super::error::Result;
use super::SampleSeries;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::ops::Range;

pub const CHART_SIZE: (u32, u32) = (1600, 800);

const MARGIN: u32 = 20;
const X_LABEL_AREA: u32 = 60;
const Y_LABEL_AREA: u32 = 90;
// width of each offset y-axis strip left of the time panel
const AXIS_STRIP: u32 = 110;
const FONT_SIZE: u32 = 20;

pub const STROKE_COLOR: RGBColor = RGBColor(179, 179, 179);
pub const LOAD_COLOR: RGBColor = BLUE;
pub const STRAIN_COLOR: RGBColor = RED;
pub const CURVE_COLOR: RGBColor = RGBColor(31, 119, 180);

/// min and max of the finite values, None when there is none
pub fn finite_min_max(s: &[f64]) -> Option<(f64, f64)> {
    let mut finite = s.iter().copied().filter(|v| v.is_finite());
    let first = finite.next()?;
    Some(finite.fold((first, first), |(min, max), v| (min.min(v), max.max(v))))
}

/// axis range padded by a tenth of the span, or of the magnitude for flat data;
/// when padding overflows, falls back to the bare span,
/// then to half the extremes around zero
pub fn axis_range(s: &[f64]) -> Range<f64> {
    let (min, max) = match finite_min_max(s) {
        Some(mm) => mm,
        None => return 0.0..1.0,
    };
    let pad = if max > min {
        (max - min) / 10.0
    } else {
        (min.abs() / 10.0).max(0.5)
    };
    let (lo, hi) = (min - pad, max + pad);
    if lo.is_finite() && hi.is_finite() && (hi - lo).is_finite() {
        lo..hi
    } else if max > min && (max - min).is_finite() {
        min..max
    } else {
        (min.min(0.0) / 2.0 - 1.0)..(max.max(0.0) / 2.0 + 1.0)
    }
}

/// splits the paired samples into runs of finite points, dropping NAN gaps
pub fn finite_runs(xs: &[f64], ys: &[f64]) -> Vec<Vec<(f64, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for (&x, &y) in xs.iter().zip(ys.iter()) {
        if x.is_finite() && y.is_finite() {
            current.push((x, y));
        } else if !current.is_empty() {
            runs.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

fn colored_font(color: &RGBColor) -> TextStyle<'static> {
    ("sans-serif", FONT_SIZE).into_font().color(color)
}

/// Draws a bare y-axis in a narrow strip, vertically aligned with the time panel.
fn draw_offset_axis<DB: DrawingBackend>(
    strip: &DrawingArea<DB, Shift>,
    range: Range<f64>,
    desc: &str,
    color: &RGBColor,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let mut axis = ChartBuilder::on(strip)
        .margin_top(MARGIN)
        .margin_bottom(MARGIN)
        .x_label_area_size(X_LABEL_AREA)
        .y_label_area_size(AXIS_STRIP - 10)
        .build_cartesian_2d(0f64..1f64, range)?;
    axis.configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .x_label_formatter(&|_: &f64| String::new())
        .y_desc(desc)
        .y_label_style(colored_font(color))
        .axis_desc_style(colored_font(color))
        .axis_style(color.stroke_width(1))
        .draw()?;
    Ok(())
}

/// Draws one series on its own y scale over the time panel plotting area.
fn draw_overlay<DB: DrawingBackend>(
    panel: &DrawingArea<DB, Shift>,
    x_range: Range<f64>,
    elapsed: &[f64],
    values: &[f64],
    color: &RGBColor,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let mut overlay = ChartBuilder::on(panel)
        .margin(MARGIN)
        .x_label_area_size(X_LABEL_AREA)
        .y_label_area_size(Y_LABEL_AREA)
        .build_cartesian_2d(x_range, axis_range(values))?;
    for run in finite_runs(elapsed, values) {
        overlay.draw_series(LineSeries::new(run, color))?;
    }
    Ok(())
}

/// Time panel: stroke on the main axis, load and strain on offset axes.
fn draw_time_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    series: &SampleSeries,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let (axes, panel) = area.split_horizontally(2 * AXIS_STRIP);
    let (load_strip, strain_strip) = axes.split_horizontally(AXIS_STRIP);
    let x_range = axis_range(&series.elapsed);

    let mut chart = ChartBuilder::on(&panel)
        .margin(MARGIN)
        .x_label_area_size(X_LABEL_AREA)
        .y_label_area_size(Y_LABEL_AREA)
        .build_cartesian_2d(x_range.clone(), axis_range(&series.stroke))?;
    // grid and time axis
    chart
        .configure_mesh()
        .disable_y_axis()
        .y_label_formatter(&|_: &f64| String::new())
        .label_style(("sans-serif", FONT_SIZE))
        .x_desc("Time (s)")
        .draw()?;
    // stroke axis, in the stroke color
    chart
        .configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .x_label_formatter(&|_: &f64| String::new())
        .y_desc("Stroke")
        .y_label_style(colored_font(&STROKE_COLOR))
        .axis_desc_style(colored_font(&STROKE_COLOR))
        .axis_style(STROKE_COLOR.stroke_width(1))
        .draw()?;
    for run in finite_runs(&series.elapsed, &series.stroke) {
        chart.draw_series(LineSeries::new(run, &STROKE_COLOR))?;
    }

    draw_overlay(&panel, x_range.clone(), &series.elapsed, &series.load, &LOAD_COLOR)?;
    draw_overlay(&panel, x_range, &series.elapsed, &series.strain, &STRAIN_COLOR)?;
    draw_offset_axis(&load_strip, axis_range(&series.load), "Load", &LOAD_COLOR)?;
    draw_offset_axis(&strain_strip, axis_range(&series.strain), "Strain", &STRAIN_COLOR)?;

    // legend entries only, the series are drawn on three different scales
    for (label, color) in [
        ("Load", LOAD_COLOR),
        ("Strain", STRAIN_COLOR),
        ("Stroke", STROKE_COLOR),
    ]
    .iter()
    {
        let color = *color;
        chart
            .draw_series(LineSeries::new(std::iter::empty::<(f64, f64)>(), &color))?
            .label(*label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }
    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .label_font(("sans-serif", FONT_SIZE))
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;
    Ok(())
}

/// Strain against load panel.
fn draw_curve_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    series: &SampleSeries,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let mut chart = ChartBuilder::on(area)
        .margin(MARGIN)
        .x_label_area_size(X_LABEL_AREA)
        .y_label_area_size(Y_LABEL_AREA)
        .build_cartesian_2d(axis_range(&series.strain), axis_range(&series.load))?;
    chart
        .configure_mesh()
        .label_style(("sans-serif", FONT_SIZE))
        .x_desc("Strain")
        .y_desc("Load")
        .draw()?;
    for run in finite_runs(&series.strain, &series.load) {
        chart.draw_series(LineSeries::new(run, &CURVE_COLOR))?;
    }
    Ok(())
}

/// Draws the full chart, time panel on the left two thirds
/// and the strain-load curve on the right third.
pub fn draw_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    series: &SampleSeries,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;
    let (width, _) = root.dim_in_pixel();
    let (left, right) = root.split_horizontally(width * 2 / 3);
    draw_time_panel(&left, series)?;
    draw_curve_panel(&right, series)?;
    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_max_skips_nan() {
        assert_eq!(finite_min_max(&[f64::NAN, 3., -1., 2.]), Some((-1., 3.)));
        assert_eq!(finite_min_max(&[f64::NAN]), None);
        assert_eq!(finite_min_max(&[]), None);
    }

    #[test]
    fn ranges_are_padded_and_never_empty() {
        assert_eq!(axis_range(&[0., 10.]), -1.0..11.0);
        assert_eq!(axis_range(&[5., 5.]), 4.5..5.5);
        assert_eq!(axis_range(&[100., 100.]), 90.0..110.0);
        assert_eq!(axis_range(&[]), 0.0..1.0);
    }

    #[test]
    fn ranges_stay_finite_near_f64_max() {
        // padding the end overflows, the bare span does not
        assert_eq!(axis_range(&[0., 1.73e308]), 0.0..1.73e308);
        for values in &[[1e308, -1e308], [1e308, 1e308], [1.7e308, 1.7e308]] {
            let r = axis_range(values);
            assert!(r.start.is_finite() && r.end.is_finite(), "{:?}", r);
            assert!((r.end - r.start).is_finite(), "{:?}", r);
            assert!(r.start < r.end, "{:?}", r);
        }
    }

    #[test]
    fn runs_break_at_nan() {
        let xs = [0., 1., 2., 3., 4.];
        let ys = [1., f64::NAN, 2., 3., f64::NAN];
        assert_eq!(
            finite_runs(&xs, &ys),
            vec![vec![(0., 1.)], vec![(2., 2.), (3., 3.)]]
        );
    }

    fn render_svg(series: &SampleSeries) -> String {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
            draw_chart(&root, series).unwrap();
        }
        svg
    }

    fn sample() -> SampleSeries {
        SampleSeries {
            elapsed: vec![0., 1., 2.],
            load: vec![10., 12., 15.],
            stroke: vec![0.1, 0.2, 0.3],
            strain: vec![0.01, 0.02, 0.03],
        }
    }

    #[test]
    fn renders_all_axis_titles_to_svg() {
        let svg = render_svg(&sample());
        for title in &["Time (s)", "Stroke", "Load", "Strain"] {
            assert!(svg.contains(title), "missing {}", title);
        }
    }

    #[test]
    fn axes_and_lines_use_the_series_colors() {
        let svg = render_svg(&sample());
        for color in &["#0000FF", "#FF0000", "#B3B3B3"] {
            assert!(svg.contains(&format!("fill=\"{}\"", color)), "no {} text", color);
            assert!(svg.contains(&format!("stroke=\"{}\"", color)), "no {} line", color);
        }
    }

    #[test]
    fn legend_and_curve_panel_repeat_the_labels() {
        let svg = render_svg(&sample());
        // offset axis, legend and strain-load panel
        assert!(svg.matches(">Load<").count() >= 3);
        assert!(svg.matches(">Strain<").count() >= 3);
        // stroke axis and legend
        assert!(svg.matches(">Stroke<").count() >= 2);
    }

    #[test]
    fn single_sample_renders() {
        let series = SampleSeries {
            elapsed: vec![0.],
            load: vec![10.],
            stroke: vec![0.1],
            strain: vec![0.01],
        };
        let svg = render_svg(&series);
        assert!(svg.contains("#0000FF"));
        assert!(svg.contains("#FF0000"));
    }

    #[test]
    fn huge_values_render() {
        let series = SampleSeries {
            elapsed: vec![0., 1.73e308],
            load: vec![1e308, -1e308],
            stroke: vec![1., 2.],
            strain: vec![0.01, 0.02],
        };
        render_svg(&series);
    }
}
