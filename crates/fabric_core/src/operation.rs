use serde::{Deserialize, Serialize};

/// Pattern selection carried by the pattern-consuming operations.
///
/// Blank values are treated the same as missing ones.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PatternArgs {
    pub pattern: Option<String>,
    pub model: Option<String>,
    pub context: Option<String>,
}

impl PatternArgs {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: Some(pattern.into()),
            ..Self::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// The selected pattern, if one is present and not blank.
    pub fn pattern(&self) -> Option<&str> {
        non_blank(self.pattern.as_deref())
    }

    pub fn model(&self) -> Option<&str> {
        non_blank(self.model.as_deref())
    }

    pub fn context(&self) -> Option<&str> {
        non_blank(self.context.as_deref())
    }
}

/// What the user asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    RunPattern(PatternArgs),
    ScrapeUrl { url: String },
    SearchQuestion { question: String },
    ScrapeUrlThenPattern { url: String, args: PatternArgs },
    SearchQuestionThenPattern { question: String, args: PatternArgs },
    ClipboardThenPattern(PatternArgs),
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::RunPattern(_) => "run_pattern",
            Operation::ScrapeUrl { .. } => "scrape_url",
            Operation::SearchQuestion { .. } => "search_question",
            Operation::ScrapeUrlThenPattern { .. } => "scrape_url_then_pattern",
            Operation::SearchQuestionThenPattern { .. } => "search_question_then_pattern",
            Operation::ClipboardThenPattern(_) => "clipboard_then_pattern",
        }
    }

    pub fn pattern_args(&self) -> Option<&PatternArgs> {
        match self {
            Operation::RunPattern(args)
            | Operation::ClipboardThenPattern(args)
            | Operation::ScrapeUrlThenPattern { args, .. }
            | Operation::SearchQuestionThenPattern { args, .. } => Some(args),
            Operation::ScrapeUrl { .. } | Operation::SearchQuestion { .. } => None,
        }
    }

    pub fn pattern_args_mut(&mut self) -> Option<&mut PatternArgs> {
        match self {
            Operation::RunPattern(args)
            | Operation::ClipboardThenPattern(args)
            | Operation::ScrapeUrlThenPattern { args, .. }
            | Operation::SearchQuestionThenPattern { args, .. } => Some(args),
            Operation::ScrapeUrl { .. } | Operation::SearchQuestion { .. } => None,
        }
    }

    /// Operations that report through a notifier instead of returning their result.
    pub fn is_legacy_single_stage(&self) -> bool {
        matches!(
            self,
            Operation::RunPattern(_) | Operation::ScrapeUrl { .. } | Operation::SearchQuestion { .. }
        )
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_pattern_counts_as_missing() {
        let args = PatternArgs::new("   ");
        assert_eq!(args.pattern(), None);
        assert_eq!(PatternArgs::new("summarize").pattern(), Some("summarize"));
    }

    #[test]
    fn only_pattern_variants_carry_pattern_args() {
        assert!(Operation::RunPattern(PatternArgs::default()).pattern_args().is_some());
        assert!(Operation::ScrapeUrl { url: "http://x".into() }.pattern_args().is_none());
        assert!(Operation::SearchQuestion { question: "q".into() }.pattern_args().is_none());
    }
}
