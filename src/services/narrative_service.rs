use tracing::info;

use crate::errors::LlmError;
use crate::services::llm_service::{collect_narrative, NarrativeGenerator};

/// Closing line the model adds when it recommends selling.
pub const SELL_MARKER: &str = "Sell the Stock";

/// Closing line the model adds when it recommends holding.
pub const HOLD_MARKER: &str = "Hold the Stock";

/// Generate the per-ticker analysis narrative.
///
/// `stock_data`, `financial_statements` and `news` are embedded verbatim;
/// any of them may already be an inline error string.
pub async fn generate_stock_analysis(
    generator: &dyn NarrativeGenerator,
    ticker: &str,
    stock_data: &str,
    financial_statements: &str,
    news: &str,
) -> Result<String, LlmError> {
    let prompt = build_analysis_prompt(ticker, stock_data, financial_statements, news);
    info!("Generating analysis for {} ({} chars of prompt)", ticker, prompt.len());
    let narrative = collect_narrative(generator, prompt).await?;
    info!("Analysis for {} complete ({} chars)", ticker, narrative.len());
    Ok(narrative)
}

/// Fixed analysis template: data sections, then formatting instructions and
/// a worked example of the expected output.
pub fn build_analysis_prompt(
    ticker: &str,
    stock_data: &str,
    financial_statements: &str,
    news: &str,
) -> String {
    format!(
        "Analyze the stock {ticker} based on the following information:\n\n\
         Stock Data: {stock_data}\n\n\
         Financial Statements: {financial_statements}\n\n\
         Recent News: {news}\n\n\
         Give a detailed stock analysis. Use the available data and provide an investment recommendation.\n\n\
         Based on your analysis, if the stock needs to be sold, add the following line - {SELL_MARKER} at the end of response\n\n\
         If the stock is supposed to be held based on the analysis, add the following line - {HOLD_MARKER} at the end of response.\n\n\
         The user is fully aware of the investment risk, so you don't need to include any kind of warning in the answer.\n\n\
         Make sure to include only these sections: Overview - Financial Performance - Key Metrics - Valuation - Growth Prospects - Recent News - Investment Recommendation - Hold/Sell.\n\n\
         Please use the following example as the output format for all the tickers to maintain consistency:\n\n\
         {ANALYSIS_EXAMPLE}"
    )
}

const ANALYSIS_EXAMPLE: &str = "Example:\n\
Analysis for MICROSOFT CORP: \n\
Microsoft Corporation (MSFT) is a multinational technology company that develops, manufactures, licenses, and supports a wide range of software products, services, and devices. The company is a leader in the technology industry and has a diverse product portfolio, including operating systems, productivity software, business software, and gaming consoles.\n\n\
Financial Performance\n\
Microsoft's financial performance has been strong, with consistent revenue growth over the past few years. The company's total revenue has increased from $528.57 billion in 2023 to $618.58 billion in 2024, representing a growth rate of 17%. The gross profit margin has remained stable at around 70%, indicating a strong pricing power and cost control. The operating income has also increased from $223.52 billion in 2023 to $275.81 billion in 2024, representing a growth rate of 23%.\n\n\
Key Metrics : \n\
- EBITDA Margin: 54.2% (higher than the industry average)\n\
- Net Income Margin: 35.4% (higher than the industry average)\n\
- Return on Equity (ROE): 43.5% (higher than the industry average)\n\
- Debt-to-Equity Ratio: 0.65 (lower than the industry average)\n\
- Interest Coverage Ratio: 15.33 (higher than the industry average)\n\n\
Valuation : \n\
Microsoft's valuation ratios are slightly higher than the industry average, indicating a premium valuation. The forward price-to-earnings (P/E) ratio is 32.12, compared to the industry average of 25.49. The price-to-book (P/B) ratio is 11.34, compared to the industry average of 8.13.\n\n\
Growth Prospects\n\
Microsoft has strong growth prospects, driven by its leadership in the technology industry, innovative products, and expanding presence in emerging markets. The company's cloud computing business, Azure, continues to grow rapidly, and its gaming console business is expected to benefit from the growing demand for online gaming.\n\n\
Recent News : \n\
There has been no significant recent news that may impact the company's stock price.\n\n\
Investment Recommendation : \n\
Based on Microsoft's strong financial performance, attractive valuation, and growth prospects, I recommend HOLDING the stock. The company's consistent revenue growth, high margins, and strong return on equity indicate a strong underlying business. While the valuation is slightly higher than the industry average, I believe it is justified by the company's leadership in the technology industry and its growth prospects.\n\n";
