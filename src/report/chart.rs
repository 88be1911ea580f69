//! SVG rendering of charts and pages.

use anyhow::{Result, bail};
use plotters::coord::Shift;
use plotters::element::Pie;
use plotters::prelude::*;
use plotters::style::FontTransform;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::f64::consts::{FRAC_PI_2, TAU};

use crate::report::types::{Chart, Page, PageBody, Shape, Tile};

pub type Area<'a> = DrawingArea<SVGBackend<'a>, Shift>;

/// Size of a standalone chart.
pub const CHART_SIZE: (u32, u32) = (960, 600);
/// Size of a document page.
pub const PAGE_SIZE: (u32, u32) = (1400, 900);

pub const BACKGROUND: RGBColor = RGBColor(0x0d, 0x0f, 0x14);
pub const SURFACE: RGBColor = RGBColor(0x14, 0x17, 0x20);
pub const SURFACE_ALT: RGBColor = RGBColor(0x1c, 0x20, 0x30);
pub const BORDER: RGBColor = RGBColor(0x25, 0x2a, 0x3a);
pub const INK: RGBColor = RGBColor(0xe8, 0xea, 0xf0);
pub const MUTED: RGBColor = RGBColor(0x7a, 0x80, 0x99);

pub const PALETTE: [RGBColor; 6] = [
    RGBColor(0xf9, 0x73, 0x16),
    RGBColor(0x38, 0xbd, 0xf8),
    RGBColor(0xa7, 0x8b, 0xfa),
    RGBColor(0x34, 0xd3, 0x99),
    RGBColor(0xfb, 0x71, 0x85),
    RGBColor(0xf4, 0x72, 0xb6),
];

const FONT: &str = "sans-serif";

fn color(i: usize) -> RGBColor {
    PALETTE[i % PALETTE.len()]
}

fn text(size: f64, color: &RGBColor) -> TextStyle<'static> {
    (FONT, size).into_font().color(color)
}

fn centered(style: TextStyle<'static>, v: VPos) -> TextStyle<'static> {
    style.pos(Pos::new(HPos::Center, v))
}

/// Label for a tick at `x`; only integral ticks name a category.
fn category_at(categories: &[String], x: f64) -> String {
    let i = x.round();
    if (x - i).abs() > 1e-6 || i < 0.0 {
        return String::new();
    }
    categories.get(i as usize).cloned().unwrap_or_default()
}

fn bar_span(chart: &Chart) -> (f64, f64) {
    if let Some(range) = chart.value_range {
        return range;
    }
    let min = chart.values().fold(f64::INFINITY, f64::min);
    let max = chart.values().fold(f64::NEG_INFINITY, f64::max);
    let lo = if min < 0.0 { min * 1.15 } else { 0.0 };
    let hi = if max > 0.0 { max * 1.15 } else { 1.0 };
    (lo, hi)
}

fn line_span(chart: &Chart) -> (f64, f64) {
    if let Some(range) = chart.value_range {
        return range;
    }
    let min = chart.values().fold(f64::INFINITY, f64::min);
    let max = chart.values().fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    let pad = if max > min { (max - min) * 0.1 } else { 1.0 };
    (min - pad, max + pad)
}

/// Renders one chart to a standalone SVG document.
pub fn render_chart(chart: &Chart, size: (u32, u32)) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        root.fill(&BACKGROUND)?;
        draw_chart(&root.margin(8, 8, 8, 8), chart)?;
        root.present()?;
    }
    Ok(svg)
}

/// Renders a page (title, optional subtitle, body, footnotes) to an SVG document.
pub fn render_page(page: &Page, size: (u32, u32)) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        root.fill(&BACKGROUND)?;

        let body = root.titled(&page.title, text(26.0, &INK))?;
        let body = match &page.subtitle {
            Some(subtitle) => body.titled(subtitle, text(14.0, &MUTED))?,
            None => body,
        };

        let body = if page.notes.is_empty() {
            body
        } else {
            let (_, height) = body.dim_in_pixel();
            let footer_height = 26 * page.notes.len() as i32 + 12;
            let (content, footer) = body.split_vertically(height as i32 - footer_height);
            for (i, note) in page.notes.iter().enumerate() {
                footer.draw(&Text::new(
                    note.as_str(),
                    (24, 6 + 26 * i as i32),
                    text(13.0, &PALETTE[0]),
                ))?;
            }
            content
        };

        match &page.body {
            PageBody::Tiles(tiles) => draw_tiles(&body, tiles)?,
            PageBody::Panels(charts) => {
                let cells = body.split_evenly((1, charts.len().max(1)));
                for (chart, cell) in charts.iter().zip(&cells) {
                    draw_chart(&cell.margin(8, 8, 8, 8), chart)?;
                }
            }
        }

        root.present()?;
    }
    Ok(svg)
}

/// Draws `chart` into `area` according to its shape.
pub fn draw_chart(area: &Area<'_>, chart: &Chart) -> Result<()> {
    if chart.categories.is_empty() || chart.series.is_empty() {
        bail!("chart {:?} has no data", chart.title);
    }
    match chart.shape {
        Shape::Bar | Shape::GroupedBar => draw_bars(area, chart),
        Shape::HorizontalBar => draw_horizontal_bars(area, chart),
        Shape::Line => draw_line(area, chart),
        Shape::Pie => draw_pie(area, chart),
        Shape::Radar => draw_radar(area, chart),
        Shape::Heatmap => draw_heatmap(area, chart),
    }
}

fn draw_bars(area: &Area<'_>, chart: &Chart) -> Result<()> {
    let n = chart.categories.len();
    let (lo, hi) = bar_span(chart);
    let base = if lo > 0.0 { lo } else { 0.0 };

    let mut ctx = ChartBuilder::on(area)
        .caption(&chart.title, text(20.0, &INK))
        .margin(16)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), lo..hi)?;

    let categories = |x: &f64| category_at(&chart.categories, *x);
    ctx.configure_mesh()
        .disable_x_mesh()
        .x_labels(n + 1)
        .x_label_formatter(&categories)
        .x_desc(chart.x_label.as_str())
        .y_desc(chart.y_label.as_str())
        .axis_style(MUTED.stroke_width(1))
        .bold_line_style(BORDER.stroke_width(1))
        .light_line_style(SURFACE.stroke_width(1))
        .label_style(text(12.0, &MUTED))
        .axis_desc_style(text(13.0, &MUTED))
        .draw()?;

    let multi = chart.series.len() > 1;
    let slot = 0.8 / chart.series.len() as f64;

    for (s, series) in chart.series.iter().enumerate() {
        let offset = -0.4 + slot * s as f64;
        let bars: Vec<(usize, f64)> = series
            .values
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|v| (i, v)))
            .collect();
        let fill = |i: usize| if multi { color(s) } else { color(i) };

        let anno = ctx.draw_series(bars.iter().map(|&(i, v)| {
            let x0 = i as f64 + offset + slot * 0.05;
            let x1 = i as f64 + offset + slot * 0.95;
            Rectangle::new([(x0, base), (x1, v)], fill(i).filled())
        }))?;
        if multi {
            let swatch = color(s);
            anno.label(series.name.as_str()).legend(move |(x, y)| {
                Rectangle::new([(x, y - 5), (x + 10, y + 5)], swatch.filled())
            });
        }

        ctx.draw_series(bars.iter().map(|&(i, v)| {
            Text::new(
                format!("{v:.2}"),
                (i as f64 + offset + slot / 2.0, v),
                centered(text(11.0, &INK), VPos::Bottom),
            )
        }))?;
    }

    if multi {
        ctx.configure_series_labels()
            .background_style(SURFACE_ALT.filled())
            .border_style(BORDER.stroke_width(1))
            .label_font(text(12.0, &INK))
            .draw()?;
    }
    Ok(())
}

fn draw_horizontal_bars(area: &Area<'_>, chart: &Chart) -> Result<()> {
    let n = chart.categories.len();
    let (lo, hi) = bar_span(chart);
    let base = if lo > 0.0 { lo } else { 0.0 };
    // First category on top.
    let row = |i: usize| (n - 1 - i) as f64;

    let mut ctx = ChartBuilder::on(area)
        .caption(&chart.title, text(20.0, &INK))
        .margin(16)
        .x_label_area_size(40)
        .y_label_area_size(130)
        .build_cartesian_2d(lo..hi, -0.5f64..(n as f64 - 0.5))?;

    let categories = |y: &f64| category_at(&chart.categories, (n as f64 - 1.0) - *y);
    ctx.configure_mesh()
        .disable_y_mesh()
        .y_labels(n + 1)
        .y_label_formatter(&categories)
        .x_desc(chart.y_label.as_str())
        .y_desc(chart.x_label.as_str())
        .axis_style(MUTED.stroke_width(1))
        .bold_line_style(BORDER.stroke_width(1))
        .light_line_style(SURFACE.stroke_width(1))
        .label_style(text(12.0, &MUTED))
        .axis_desc_style(text(13.0, &MUTED))
        .draw()?;

    let slot = 0.6 / chart.series.len() as f64;
    for (s, series) in chart.series.iter().enumerate() {
        let offset = -0.3 + slot * s as f64;
        let bars: Vec<(usize, f64)> = series
            .values
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|v| (i, v)))
            .collect();

        ctx.draw_series(bars.iter().map(|&(i, v)| {
            let y0 = row(i) + offset;
            Rectangle::new([(base, y0), (v, y0 + slot * 0.9)], color(i + s).filled())
        }))?;
        ctx.draw_series(bars.iter().map(|&(i, v)| {
            Text::new(
                format!(" {v:.2}"),
                (v, row(i) + offset + slot * 0.45),
                text(11.0, &INK).pos(Pos::new(HPos::Left, VPos::Center)),
            )
        }))?;
    }
    Ok(())
}

fn draw_line(area: &Area<'_>, chart: &Chart) -> Result<()> {
    let n = chart.categories.len();
    let (lo, hi) = line_span(chart);
    let x_max = (n.max(2) - 1) as f64;

    let mut ctx = ChartBuilder::on(area)
        .caption(&chart.title, text(20.0, &INK))
        .margin(16)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.3f64..(x_max + 0.3), lo..hi)?;

    let categories = |x: &f64| category_at(&chart.categories, *x);
    ctx.configure_mesh()
        .x_labels(n.min(12) + 1)
        .x_label_formatter(&categories)
        .x_desc(chart.x_label.as_str())
        .y_desc(chart.y_label.as_str())
        .axis_style(MUTED.stroke_width(1))
        .bold_line_style(BORDER.stroke_width(1))
        .light_line_style(SURFACE.stroke_width(1))
        .label_style(text(12.0, &MUTED))
        .axis_desc_style(text(13.0, &MUTED))
        .draw()?;

    let multi = chart.series.len() > 1;
    for (s, series) in chart.series.iter().enumerate() {
        let c = color(s);
        let points: Vec<(f64, f64)> = series
            .values
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|v| (i as f64, v)))
            .collect();

        let anno = ctx.draw_series(LineSeries::new(points.clone(), c.stroke_width(2)))?;
        if multi {
            anno.label(series.name.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 16, y)], c.stroke_width(2)));
        }
        ctx.draw_series(points.iter().map(|&p| Circle::new(p, 3, c.filled())))?;
    }

    if multi {
        ctx.configure_series_labels()
            .background_style(SURFACE_ALT.filled())
            .border_style(BORDER.stroke_width(1))
            .label_font(text(12.0, &INK))
            .draw()?;
    }
    Ok(())
}

fn draw_pie(area: &Area<'_>, chart: &Chart) -> Result<()> {
    let area = area.titled(&chart.title, text(20.0, &INK))?;
    let series = &chart.series[0];

    let slices: Vec<(&String, f64)> = chart
        .categories
        .iter()
        .zip(&series.values)
        .filter_map(|(c, v)| v.filter(|v| *v > 0.0).map(|v| (c, v)))
        .collect();
    let total: f64 = slices.iter().map(|(_, v)| v).sum();
    if total <= 0.0 {
        bail!("pie {:?} has nothing to show", chart.title);
    }

    let sizes: Vec<f64> = slices.iter().map(|(_, v)| *v).collect();
    let colors: Vec<RGBColor> = (0..slices.len()).map(color).collect();
    let labels: Vec<String> = slices
        .iter()
        .map(|(c, v)| format!("{c} ({:.1}%)", v / total * 100.0))
        .collect();

    let (w, h) = area.dim_in_pixel();
    let center = ((w / 2) as i32, (h / 2) as i32);
    let radius = f64::from(w.min(h)) * 0.3;

    let mut pie = Pie::new(
        &center,
        &radius,
        sizes.as_slice(),
        colors.as_slice(),
        labels.as_slice(),
    );
    pie.label_style(text(13.0, &INK));
    area.draw(&pie)?;
    Ok(())
}

fn draw_radar(area: &Area<'_>, chart: &Chart) -> Result<()> {
    let area = area.titled(&chart.title, text(20.0, &INK))?;
    let (w, _) = area.dim_in_pixel();
    let (plot, legend) = area.split_horizontally(w.saturating_sub(200) as i32);

    let (pw, ph) = plot.dim_in_pixel();
    let (cx, cy) = (f64::from(pw) / 2.0, f64::from(ph) / 2.0);
    let radius = f64::from(pw.min(ph)) * 0.36;
    let (lo, hi) = chart.value_range.unwrap_or((0.0, 10.0));
    let axes = chart.categories.len();

    let polar = |axis: usize, r: f64| -> (i32, i32) {
        let angle = -FRAC_PI_2 + TAU * axis as f64 / axes as f64;
        (
            (cx + r * angle.cos()).round() as i32,
            (cy + r * angle.sin()).round() as i32,
        )
    };
    let point = |axis: usize, value: f64| {
        let scaled = if hi > lo { ((value - lo) / (hi - lo)).clamp(0.0, 1.0) } else { 0.0 };
        polar(axis, radius * scaled)
    };

    for ring in 1..=5 {
        let r = radius * ring as f64 / 5.0;
        let mut outline: Vec<(i32, i32)> = (0..axes).map(|a| polar(a, r)).collect();
        outline.push(polar(0, r));
        plot.draw(&PathElement::new(outline, BORDER.stroke_width(1)))?;
    }
    for (a, label) in chart.categories.iter().enumerate() {
        plot.draw(&PathElement::new(
            vec![polar(a, 0.0), polar(a, radius)],
            BORDER.stroke_width(1),
        ))?;
        plot.draw(&Text::new(
            label.as_str(),
            polar(a, radius * 1.15),
            centered(text(13.0, &INK), VPos::Center),
        ))?;
    }

    for (s, series) in chart.series.iter().enumerate() {
        let c = color(s);
        let vertices: Vec<(i32, i32)> = series
            .values
            .iter()
            .enumerate()
            .map(|(a, v)| point(a, v.unwrap_or(lo)))
            .collect();

        plot.draw(&Polygon::new(vertices.clone(), c.mix(0.12).filled()))?;
        let mut outline = vertices.clone();
        outline.push(vertices[0]);
        plot.draw(&PathElement::new(outline, c.stroke_width(2)))?;
        for v in &vertices {
            plot.draw(&Circle::new(*v, 4, c.filled()))?;
        }

        let y = 40 + 26 * s as i32;
        legend.draw(&Rectangle::new([(10, y), (24, y + 14)], c.filled()))?;
        legend.draw(&Text::new(series.name.as_str(), (32, y), text(13.0, &INK)))?;
    }
    Ok(())
}

/// Diverging scale: blue for negative, orange for positive, grey for undefined.
fn heat_color(v: f64) -> RGBColor {
    if !v.is_finite() {
        return BORDER;
    }
    let k = v.clamp(-1.0, 1.0);
    let to = if k < 0.0 { PALETTE[1] } else { PALETTE[0] };
    let from = SURFACE_ALT;
    let lerp = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * k.abs()).round() as u8;
    RGBColor(lerp(from.0, to.0), lerp(from.1, to.1), lerp(from.2, to.2))
}

fn draw_heatmap(area: &Area<'_>, chart: &Chart) -> Result<()> {
    let area = area.titled(&chart.title, text(20.0, &INK))?;
    let (w, h) = area.dim_in_pixel();
    let n = chart.categories.len() as i32;

    let (left, top, right, bottom) = (180, 10, 90, 170);
    let cell = ((w as i32 - left - right).min(h as i32 - top - bottom) / n).max(4);

    for (i, row) in chart.series.iter().enumerate() {
        let y0 = top + i as i32 * cell;
        for (j, value) in row.values.iter().enumerate() {
            let x0 = left + j as i32 * cell;
            let v = value.unwrap_or(f64::NAN);
            let corners = [(x0, y0), (x0 + cell, y0 + cell)];
            area.draw(&Rectangle::new(corners, heat_color(v).filled()))?;
            area.draw(&Rectangle::new(corners, BACKGROUND.stroke_width(1)))?;
            if cell >= 32 {
                let label = if v.is_finite() { format!("{v:.2}") } else { "n/a".to_string() };
                area.draw(&Text::new(
                    label,
                    (x0 + cell / 2, y0 + cell / 2),
                    centered(text(11.0, &INK), VPos::Center),
                ))?;
            }
        }
        area.draw(&Text::new(
            row.name.as_str(),
            (left - 8, y0 + cell / 2),
            text(12.0, &INK).pos(Pos::new(HPos::Right, VPos::Center)),
        ))?;
    }

    for (j, label) in chart.categories.iter().enumerate() {
        area.draw(&Text::new(
            label.as_str(),
            (left + j as i32 * cell + cell / 2, top + n * cell + 8),
            text(12.0, &INK).transform(FontTransform::Rotate90),
        ))?;
    }

    let scale_x = left + n * cell + 24;
    for (k, v) in [1.0, 0.5, 0.0, -0.5, -1.0].into_iter().enumerate() {
        let y = top + k as i32 * 24;
        area.draw(&Rectangle::new([(scale_x, y), (scale_x + 16, y + 18)], heat_color(v).filled()))?;
        area.draw(&Text::new(format!("{v:+.1}"), (scale_x + 22, y + 2), text(11.0, &MUTED)))?;
    }
    Ok(())
}

fn draw_tiles(area: &Area<'_>, tiles: &[Tile]) -> Result<()> {
    const COLUMNS: usize = 3;
    let rows = tiles.len().div_ceil(COLUMNS).max(1);
    let cells = area.split_evenly((rows, COLUMNS));

    for (tile, cell) in tiles.iter().zip(&cells) {
        let (w, h) = cell.dim_in_pixel();
        let (w, h) = (w as i32, h as i32);
        let corners = [(16, 16), (w - 16, h - 16)];
        cell.draw(&Rectangle::new(corners, SURFACE_ALT.filled()))?;
        cell.draw(&Rectangle::new(corners, BORDER.stroke_width(1)))?;
        cell.draw(&Text::new(
            tile.value.as_str(),
            (w / 2, h / 2 - 6),
            centered(text(32.0, &PALETTE[0]), VPos::Bottom),
        ))?;
        cell.draw(&Text::new(
            tile.label.as_str(),
            (w / 2, h / 2 + 6),
            centered(text(14.0, &MUTED), VPos::Top),
        ))?;
    }
    Ok(())
}

/// An artifact that renders to a standalone SVG document.
pub trait Render {
    fn title(&self) -> &str;
    fn to_svg(&self) -> Result<String>;
}

impl Render for Chart {
    fn title(&self) -> &str {
        &self.title
    }

    fn to_svg(&self) -> Result<String> {
        render_chart(self, CHART_SIZE)
    }
}

impl Render for Page {
    fn title(&self) -> &str {
        &self.title
    }

    fn to_svg(&self) -> Result<String> {
        render_page(self, PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::types::Series;

    fn bar() -> Chart {
        Chart {
            categories: vec!["Student".into(), "Freelancer".into()],
            series: vec![Series::dense("Stress_Level", &[5.55, 5.49])],
            ..Chart::new(Shape::Bar, "Average Stress Level per Occupation")
        }
        .axes("Occupation", "Average Stress Level")
    }

    #[test]
    fn test_category_at_integral_ticks_only() {
        let cats = vec!["a".to_string(), "b".to_string()];
        assert_eq!(category_at(&cats, 0.0), "a");
        assert_eq!(category_at(&cats, 1.0), "b");
        assert_eq!(category_at(&cats, 0.5), "");
        assert_eq!(category_at(&cats, -1.0), "");
        assert_eq!(category_at(&cats, 2.0), "");
    }

    #[test]
    fn test_spans() {
        let chart = bar();
        let (lo, hi) = bar_span(&chart);
        assert_eq!(lo, 0.0);
        assert!(hi > 5.55);
        assert_eq!(bar_span(&chart.clone().range(5.3, 5.7)), (5.3, 5.7));

        let (lo, hi) = line_span(&chart);
        assert!(lo < 5.49 && hi > 5.55);
    }

    #[test]
    fn test_heat_color_extremes() {
        assert_eq!(heat_color(1.0), PALETTE[0]);
        assert_eq!(heat_color(-1.0), PALETTE[1]);
        assert_eq!(heat_color(0.0), SURFACE_ALT);
        assert_eq!(heat_color(f64::NAN), BORDER);
    }

    #[test]
    fn test_render_every_shape() {
        let radar = Chart {
            categories: vec!["Phone".into(), "Sleep".into(), "Stress".into()],
            series: vec![
                Series::dense("Student", &[6.5, 4.2, 5.0]),
                Series::dense("Freelancer", &[6.0, 5.0, 4.0]),
            ],
            value_range: Some((0.0, 10.0)),
            ..Chart::new(Shape::Radar, "Radar")
        };
        let heat = Chart {
            categories: vec!["a".into(), "b".into()],
            series: vec![
                Series::dense("a", &[1.0, -0.4]),
                Series::new("b", vec![Some(-0.4), None]),
            ],
            ..Chart::new(Shape::Heatmap, "Correlation Matrix")
        };

        for shape in [Shape::Bar, Shape::HorizontalBar, Shape::Line, Shape::Pie, Shape::GroupedBar] {
            let chart = Chart { shape, ..bar() };
            let svg = render_chart(&chart, CHART_SIZE).unwrap();
            assert!(svg.contains("<svg"), "{shape:?}");
        }
        assert!(render_chart(&radar, CHART_SIZE).unwrap().contains("Student"));
        assert!(render_chart(&heat, CHART_SIZE).unwrap().contains("<svg"));
    }

    #[test]
    fn test_render_empty_chart_fails() {
        let chart = Chart::new(Shape::Bar, "empty");
        assert!(render_chart(&chart, CHART_SIZE).is_err());
    }

    #[test]
    fn test_render_page_with_tiles_and_notes() {
        let page = Page::tiles(
            "Smartphone Usage & Stress",
            vec![Tile::new("50,000", "Respondents"), Tile::new("4", "Occupations")],
        )
        .subtitle("overview")
        .note("generated for testing");
        let svg = render_page(&page, PAGE_SIZE).unwrap();
        assert!(svg.contains("Respondents"));
        assert!(svg.contains("generated for testing"));

        let panels = Page::panels("Two panels", vec![bar(), Chart { shape: Shape::Pie, ..bar() }]);
        assert!(render_page(&panels, PAGE_SIZE).unwrap().contains("<svg"));
    }
}
