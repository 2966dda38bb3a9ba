use crate::models::PortfolioRow;

/// Section openings that get promoted to markdown headings.
const SECTION_HEADINGS: [&str; 11] = [
    "Analysis for",
    "Overview",
    "Financial Performance",
    "Key Metrics",
    "Valuation",
    "Growth Prospects",
    "Recent News",
    "Investment Recommendation",
    "Performance Analysis",
    "Allocation Analysis",
    "Cost Basis Analysis",
];

/// Turn known section openings of a generated analysis into `###` headings.
/// Paragraphs are separated by blank lines; everything else is kept as is.
pub fn format_analysis(analysis: &str) -> String {
    analysis
        .split("\n\n")
        .map(|section| {
            if SECTION_HEADINGS.iter().any(|h| section.starts_with(h)) {
                format!("### {}", section)
            } else {
                section.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Markdown block with performance, allocation and cost basis figures
/// taken straight from the uploaded row.
pub fn performance_analysis(row: &PortfolioRow) -> String {
    format!(
        "\n\
         \n### Performance Analysis\n\n\
         - Total Gain/Loss: {}\n\n\
         - Percentage Gain/Loss: {}%\n\n\
         - Today's Gain/Loss: {} ({}%)\n\n\
         \n### Allocation Analysis\n\n\
         - Percent of Account: {}%\n\n\
         \n### Cost Basis Analysis\n\n\
         - Average Cost Basis: {}\n\n\
         - Current Price: {}\n\n\
         - Total Gain/Loss Percent: {}%\n\n",
        row.total_gain_loss_dollar,
        row.total_gain_loss_percent,
        row.todays_gain_loss_dollar,
        row.todays_gain_loss_percent,
        row.percent_of_account,
        row.average_cost_basis,
        row.last_price,
        row.total_gain_loss_percent,
    )
}
