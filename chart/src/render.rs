use charming::component::{Axis, Legend, Title};
use charming::element::{AxisLabel, AxisType, LineStyle, NameLocation, Tooltip};
use charming::series::Line;
use charming::Chart;

use crate::table::ResultTable;

const X_AXIS_TITLE: &str = "payload size [B]";
const Y_AXIS_TITLE: &str = "messages delivery rate [1/s]";

/// Builds an XY line chart with one series per result column. The rate axis
/// is logarithmic, delivery rates drop by orders of magnitude as payloads
/// grow.
pub fn build_chart(table: &ResultTable) -> Chart {
    let mut chart = Chart::new()
        .title(Title::new().text("Message delivery rate"))
        .tooltip(Tooltip::new())
        .legend(Legend::new().show(true).bottom("1%"))
        .x_axis(
            Axis::new()
                .type_(AxisType::Value)
                .name(X_AXIS_TITLE)
                .name_location(NameLocation::End)
                .name_gap(15)
                .axis_label(AxisLabel::new().rotate(-90.0)),
        )
        .y_axis(
            Axis::new()
                .type_(AxisType::Log)
                .name(Y_AXIS_TITLE)
                .name_location(NameLocation::End)
                .name_gap(15),
        );

    for series in &table.series {
        let points: Vec<Vec<f64>> = series
            .points
            .iter()
            .map(|&(x, y)| vec![x, y])
            .collect();
        chart = chart.series(
            Line::new()
                .name(series.name.as_str())
                .data(points)
                .line_style(LineStyle::new().width(3.0)),
        );
    }

    chart
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table;
    use charming::HtmlRenderer;

    #[test]
    fn rendered_markup_contains_every_series_and_point() {
        let table = table::parse("message size\trate-A\n10\t5.0\n20\t7.0\n").unwrap();
        let chart = build_chart(&table);
        let markup = HtmlRenderer::new("test", 800, 600).render(&chart).unwrap();
        assert!(!markup.is_empty());
        assert!(markup.contains("rate-A"));
        assert!(markup.contains("10"));
        assert!(markup.contains("20"));
    }

    #[test]
    fn x_axis_labels_are_rotated() {
        let table = table::parse("message size\trate-A\n10\t5.0\n").unwrap();
        let chart = build_chart(&table);
        let markup = HtmlRenderer::new("test", 800, 600).render(&chart).unwrap();
        assert!(markup.contains("rotate"));
    }
}
