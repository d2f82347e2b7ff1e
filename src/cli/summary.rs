use super::ui;
use crate::core::Artifact;
use crate::core::series::PartialData;
use comfy_table::{Cell, CellAlignment};

impl Artifact {
    /// Renders the statistics block printed after a fetch or by `show`.
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![ui::header_cell("Statistic"), ui::header_cell("Premium")]);

        let stats = &self.stats;
        for (label, value) in [
            ("Current", stats.current),
            ("Minimum", stats.min),
            ("Maximum", stats.max),
            ("Average", stats.average),
            ("Median", stats.median),
            ("25th %", stats.p25),
            ("75th %", stats.p75),
        ] {
            table.add_row(vec![Cell::new(label), ui::premium_cell(value)]);
        }
        table.add_row(vec![
            Cell::new("Std Dev"),
            Cell::new(format!("{:.2}%", stats.std)).set_alignment(CellAlignment::Right),
        ]);

        let range = self.date_range().map_or("N/A".to_string(), |(from, to)| {
            format!("{} to {}", from.format("%Y-%m-%d"), to.format("%Y-%m-%d"))
        });

        let mut output = format!(
            "{}\n\n",
            ui::style_text("Premium Summary", ui::StyleType::Title)
        );
        output.push_str(&format!(
            "{} {}\n",
            ui::style_text("Total data points:", ui::StyleType::Label),
            self.data_points
        ));
        output.push_str(&format!(
            "{} {}\n",
            ui::style_text("Date range:", ui::StyleType::Label),
            range
        ));
        output.push_str(&format!(
            "{} {}\n\n",
            ui::style_text("Last updated:", ui::StyleType::Label),
            ui::style_text(&self.last_updated.to_rfc3339(), ui::StyleType::Subtle)
        ));
        output.push_str(&table.to_string());
        output
    }
}

/// One warning line per missing stretch of data.
pub fn display_partial_data(partial: &[PartialData]) -> String {
    partial
        .iter()
        .flat_map(|p| {
            p.missing.iter().map(move |range| {
                ui::style_text(
                    &format!(
                        "Warning: {} has no data from {} to {} ({} days)",
                        p.series,
                        range.from,
                        range.to,
                        range.days()
                    ),
                    ui::StyleType::Warning,
                )
            })
        })
        .collect::<Vec<_>>()
        .join("\n")
}
