use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::{ConversationTurn, Portfolio};
use crate::services::llm_service::{collect_narrative, NarrativeGenerator};
use crate::services::news_service::{NewsService, GENERAL_MARKET};

/// Exact reply the model is told to give for anything outside finance.
pub const FINANCE_ONLY_REFUSAL: &str =
    "I'm sorry, but I can only provide information related to finance and stocks.";

/// Answer a free-form follow-up question.
///
/// Topic filtering is left to the model through the prompt; nothing here
/// classifies the query.
pub async fn answer_follow_up(
    generator: &dyn NarrativeGenerator,
    news_service: &NewsService,
    portfolio: Option<&Portfolio>,
    query: &str,
) -> Result<ConversationTurn, AppError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(AppError::Validation("Question must not be empty".to_string()));
    }

    info!("Answering follow-up question: {}", query);

    let news = match news_service.recent_news(GENERAL_MARKET).await {
        Ok(digest) => digest.to_string(),
        Err(e) => {
            warn!("General market news unavailable: {}", e);
            format!("Error: Unable to retrieve recent market news. {}", e)
        }
    };

    let portfolio_table = portfolio
        .map(|p| p.to_string())
        .unwrap_or_else(|| "None".to_string());

    let prompt = build_follow_up_prompt(query, &news, &portfolio_table);
    let response = collect_narrative(generator, prompt).await.map_err(|e| {
        warn!("Follow-up generation failed: {}", e);
        AppError::Llm(e)
    })?;

    Ok(ConversationTurn {
        query: query.to_string(),
        response,
        asked_at: chrono::Utc::now(),
    })
}

/// Build the follow-up prompt: refusal rule, the query, optional news and
/// portfolio context, then worked examples.
pub fn build_follow_up_prompt(query: &str, news: &str, portfolio_table: &str) -> String {
    format!(
        "If the query is not related to finance or investment, strictly respond with the message: \
         {FINANCE_ONLY_REFUSAL}\n\n\
         Query: {query}\n\n\
         Otherwise, based on the following query, provide a detailed response:\n\n{query}\n\n \
         and strictly don't include anything from news and portfolio unless relevant\
         If the query is related to current/recent news only then include the following:\nRecent News: {news}\n\n\
         If the query is related to the portfolio stocks only then refer to the following data:\n{portfolio_table}\n\n\
         Use your knowledge, the available data, and the recent news (if applicable) to provide a precise and intuitive response.\n\n\
         Use these examples to understand the context and how the question should be answered:\n\n\
         {FOLLOW_UP_EXAMPLES}"
    )
}

const FOLLOW_UP_EXAMPLES: &str = "EXAMPLE 1:\n\
Query: What is the coronavirus?\n\
Response: I'm sorry, but I can only provide information related to finance and stocks.\n\n\
EXAMPLE 2:\n\
Query: How did the COVID-19 pandemic impact the US stock market?\n\
Response: The COVID-19 pandemic had a significant impact on the US stock market. Here's a concise overview:\n\
Initial Crash: In February and March 2020, the US stock market experienced a rapid decline as the severity of the pandemic became apparent. The S&P 500 dropped by about 34% from its peak in February to its low in March.\n\
Volatility: The stock market saw extreme volatility during the early months of the pandemic, with large daily swings in stock prices due to uncertainty and panic among investors.\n\
Government Response: The US government and the Federal Reserve implemented substantial fiscal and monetary measures to support the economy, including stimulus packages and interest rate cuts. These actions helped stabilize the market and restore investor confidence.\n\
Recovery and Growth: After the initial shock, the stock market began a recovery that continued through 2020 and 2021. Technology and healthcare sectors, in particular, performed well as they were seen as benefiting from the changes brought by the pandemic.\n\
Sector Disparities: Not all sectors recovered equally. While technology, healthcare, and consumer discretionary sectors saw strong gains, sectors such as travel, hospitality, and energy were more negatively affected and took longer to recover.\n\
Long-term Changes: The pandemic accelerated trends such as remote work, e-commerce, and digital transformation, benefiting companies in these areas.\n\
Overall, despite the initial crash, the US stock market rebounded strongly, with indices like the S&P 500 and NASDAQ reaching new highs in the months following the onset of the pandemic.\n\n\
EXAMPLE 3:\n\
Query: What are the recent stocks in the news?\n\
Response: Using my financial API, I'm able to provide you with a list of recent stocks making news. Here's a rundown of some of the latest updates:\n\
1. GameStop Corp. (GME) - The video game retailer announced a 10.6% increase in sales, despite a decline in same-store sales, indicating a shift towards online shopping.\n\
2. Amazon.com, Inc. (AMZN) - The e-commerce giant saw its stock price surge after it announced a partnership with JPMorgan Chase & Co. (JPM) to launch a new online bank, marking a significant move into the financial services sector.\n\
3. NVIDIA Corporation (NVDA) - The graphics processing unit (GPU) manufacturer announced a new visual computing platform, focusing on artificial intelligence (AI) and deep learning applications.\n\
4. Chevron Corporation (CVX) - The oil and gas company reported a slight increase in revenue, despite a decline in profits, due to lower oil prices.\n\
5. Netflix, Inc. (NFLX) - The streaming service provider announced plans to expand its services into more international markets, which could lead to further growth.\n\
6. Microsoft Corporation (MSFT) - Microsoft reported quarterly earnings that beat expectations, driven by strong sales of its cloud-based services and Azure computing platform.\n\
7. Intel Corporation (INTC) - The chipmaker announced plans to enter the smartphone manufacturing business, shifting its focus from PC-based processors to mobile devices.\n\
8. Coca-Cola Company (KO) - The beverage company reported a slight decline in revenue, citing higher operating costs and increased competition in the beverage market.\n\
9. Tesla, Inc. (TSLA) - The electric vehicle manufacturer announced plans to increase production and capacity at its factories, anticipating strong demand for its new models.\n\
10. Home Depot (HD) - The home improvement retailer reported robust sales, driven by increased spending on home renovations and construction.\n";
