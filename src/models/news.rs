use std::fmt;

use serde::{Deserialize, Serialize};

/// Most snippets a provider may return for one query.
pub const MAX_NEWS_SNIPPETS: usize = 10;

/// Ordered headline snippets returned for one news query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsDigest {
    pub query: String,
    pub snippets: Vec<String>,
}

impl NewsDigest {
    /// Keeps at most [`MAX_NEWS_SNIPPETS`] snippets, in provider order.
    pub fn new(query: impl Into<String>, mut snippets: Vec<String>) -> Self {
        snippets.truncate(MAX_NEWS_SNIPPETS);
        Self {
            query: query.into(),
            snippets,
        }
    }
}

/// Numbered list under a `Recent News:` heading, one snippet per line.
impl fmt::Display for NewsDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Recent News:\n\n")?;
        for (i, snippet) in self.snippets.iter().enumerate() {
            writeln!(f, "{}. {}", i + 1, snippet)?;
        }
        Ok(())
    }
}
