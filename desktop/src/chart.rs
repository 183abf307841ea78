use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, Sense, Shape, Stroke, Vec2};
use quiz_core::history::ScoreHistory;

const LINE: Color32 = Color32::from_rgb(37, 117, 252);
const FILL: Color32 = Color32::from_rgba_premultiplied(7, 23, 50, 51);
const AXIS_MARGIN: f32 = 32.0;
const MAX_TICKS: u32 = 8;

/// Top of the y axis and the spacing of its ticks. The axis always starts
/// at zero and ticks are whole scores.
pub fn y_axis(highest: u32) -> (u32, u32) {
    let top = highest.max(1);
    let step = top.div_ceil(MAX_TICKS).max(1);
    (top.div_ceil(step) * step, step)
}

fn x_at(index: usize, count: usize, plot: Rect) -> f32 {
    if count <= 1 {
        return plot.center().x;
    }
    plot.left() + plot.width() * index as f32 / (count - 1) as f32
}

fn y_at(score: u32, top: u32, plot: Rect) -> f32 {
    plot.bottom() - plot.height() * score as f32 / top as f32
}

/// Line chart of every saved round, one point per session.
pub fn score_chart(ui: &mut egui::Ui, history: &ScoreHistory, size: Vec2) {
    let (response, painter) = ui.allocate_painter(size, Sense::hover());
    let rect = response.rect;
    let plot = Rect::from_min_max(
        rect.min + Vec2::new(AXIS_MARGIN, 8.0),
        rect.max - Vec2::new(8.0, AXIS_MARGIN),
    );
    let text_color = ui.visuals().text_color();
    let grid = Stroke::new(1.0, ui.visuals().widgets.noninteractive.bg_stroke.color);

    let (top, step) = y_axis(history.highest());
    let mut tick = 0;
    while tick <= top {
        let y = y_at(tick, top, plot);
        painter.line_segment([Pos2::new(plot.left(), y), Pos2::new(plot.right(), y)], grid);
        painter.text(
            Pos2::new(plot.left() - 6.0, y),
            Align2::RIGHT_CENTER,
            tick.to_string(),
            FontId::proportional(11.0),
            text_color,
        );
        tick += step;
    }

    let series = history.series();
    if series.is_empty() {
        painter.text(
            plot.center(),
            Align2::CENTER_CENTER,
            "No saved scores",
            FontId::proportional(14.0),
            text_color,
        );
        return;
    }

    let points: Vec<Pos2> = series
        .iter()
        .enumerate()
        .map(|(i, &(_, score))| Pos2::new(x_at(i, series.len(), plot), y_at(score, top, plot)))
        .collect();

    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        painter.add(Shape::convex_polygon(
            vec![a, b, Pos2::new(b.x, plot.bottom()), Pos2::new(a.x, plot.bottom())],
            FILL,
            Stroke::NONE,
        ));
    }
    painter.add(Shape::line(points.clone(), Stroke::new(2.0, LINE)));
    for point in &points {
        painter.circle_filled(*point, 3.0, LINE);
    }

    // Label at most a handful of sessions so the axis stays readable.
    let labels = history.labels();
    let every = labels.len().div_ceil(6).max(1);
    for (i, label) in labels.iter().enumerate().filter(|(i, _)| i % every == 0) {
        painter.text(
            Pos2::new(points[i].x, plot.bottom() + 6.0),
            Align2::CENTER_TOP,
            label,
            FontId::proportional(11.0),
            text_color,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_scores_tick_by_one() {
        assert_eq!(y_axis(0), (1, 1));
        assert_eq!(y_axis(5), (5, 1));
        assert_eq!(y_axis(8), (8, 1));
    }

    #[test]
    fn large_scores_widen_the_step() {
        assert_eq!(y_axis(9), (10, 2));
        assert_eq!(y_axis(37), (40, 5));
    }

    #[test]
    fn single_session_sits_in_the_middle() {
        let plot = Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(100.0, 50.0));
        assert_eq!(x_at(0, 1, plot), 50.0);
        assert_eq!(x_at(2, 3, plot), 100.0);
        assert_eq!(y_at(0, 10, plot), 50.0);
        assert_eq!(y_at(10, 10, plot), 0.0);
    }
}
