//! Prompt construction for use-case extraction

/// Builds the extraction prompt for one excerpt
pub struct PromptBuilder<'a> {
    excerpt: &'a str,
    headline: Option<&'a str>,
}

impl<'a> PromptBuilder<'a> {
    /// Create a prompt builder for an article excerpt
    pub fn new(excerpt: &'a str) -> Self {
        Self {
            excerpt,
            headline: None,
        }
    }

    /// Include the article headline as context
    pub fn with_headline(mut self, headline: &'a str) -> Self {
        let headline = headline.trim();
        self.headline = (!headline.is_empty()).then_some(headline);
        self
    }

    /// Build the complete prompt
    pub fn build(&self) -> String {
        let capacity = EXTRACTION_INSTRUCTIONS.len() + self.excerpt.len() + 64;
        let mut prompt = String::with_capacity(capacity);
        prompt.push_str(EXTRACTION_INSTRUCTIONS);
        prompt.push_str("\n\n");

        if let Some(headline) = self.headline {
            prompt.push_str("Article headline: ");
            prompt.push_str(headline);
            prompt.push('\n');
        }

        prompt.push_str("Article excerpt:\n");
        prompt.push_str(self.excerpt.trim());
        prompt
    }
}

const EXTRACTION_INSTRUCTIONS: &str = r#"You are an expert industrial analyst. Read the article excerpt below and select the single most relevant AI-in-manufacturing use case.
Return your answer ONLY in this exact label format (no JSON, no extra commentary except an optional single 'Note:' line at the end):

Title: <short title>
Problem: <what problem is solved>
AI Solution: <concise description of the AI / ML technique used>
Category: Manufacturing | Logistics | Supply Chain
Industry: <industry name or "General">
Note: <optional short note, e.g. "Article contains other minor use cases">

If the excerpt describes no AI use case in manufacturing, logistics or supply chain, reply with the single line:
Skip: true"#;
