use thiserror::Error;

use crate::operation::{Operation, PatternArgs};
use crate::plan::{ExecutionPlan, Stage, StructuredRequest};
use crate::platform::{ResolvedPlatform, UnsupportedPlatform};

/// Flag for the URL scraper in the chained scrape operation.
pub const URL_FLAG: &str = "-u";
/// Flag shared by questions and the single-stage URL scrape.
pub const QUERY_FLAG: &str = "-q";
pub const PATTERN_FLAG: &str = "--pattern";
pub const MODEL_FLAG: &str = "--model";
pub const CONTEXT_FLAG: &str = "--context";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("no pattern selected")]
    NoPatternSelected,
    #[error(transparent)]
    UnsupportedPlatform(#[from] UnsupportedPlatform),
}

/// Assembles the execution plan for `operation`. Performs no I/O.
pub fn build(operation: &Operation, platform: &ResolvedPlatform) -> Result<ExecutionPlan, BuildError> {
    let tool = platform.executable.as_str();
    let plan = match operation {
        Operation::RunPattern(args) => ExecutionPlan::single(pattern_stage(tool, args)?),
        // The single-stage scrape shares the query flag with questions.
        Operation::ScrapeUrl { url } => ExecutionPlan::single(Stage::new(tool, [QUERY_FLAG, url.as_str()])),
        Operation::SearchQuestion { question } => {
            ExecutionPlan::single(Stage::new(tool, [QUERY_FLAG, question.as_str()]))
        }
        Operation::ScrapeUrlThenPattern { url, args } => {
            chained(tool, URL_FLAG, url, args)?
        }
        Operation::SearchQuestionThenPattern { question, args } => {
            chained(tool, QUERY_FLAG, question, args)?
        }
        Operation::ClipboardThenPattern(args) => {
            ExecutionPlan::piped(platform.clipboard.clone(), pattern_stage(tool, args)?)
        }
    };
    Ok(plan)
}

fn chained(tool: &str, flag: &str, input: &str, args: &PatternArgs) -> Result<ExecutionPlan, BuildError> {
    let transform = pattern_stage(tool, args)?;
    let request = StructuredRequest {
        flag: flag.to_string(),
        input: input.to_string(),
        pattern: required_pattern(args)?.to_string(),
        model: args.model().map(ToOwned::to_owned),
        context: args.context().map(ToOwned::to_owned),
    };
    Ok(ExecutionPlan::piped(Stage::new(tool, [flag, input]), transform).with_structured(request))
}

fn pattern_stage(tool: &str, args: &PatternArgs) -> Result<Stage, BuildError> {
    let mut argv = vec![PATTERN_FLAG.to_string(), required_pattern(args)?.to_string()];
    if let Some(model) = args.model() {
        argv.push(MODEL_FLAG.to_string());
        argv.push(model.to_string());
    }
    if let Some(context) = args.context() {
        argv.push(CONTEXT_FLAG.to_string());
        argv.push(context.to_string());
    }
    Ok(Stage::new(tool, argv))
}

fn required_pattern(args: &PatternArgs) -> Result<&str, BuildError> {
    args.pattern().ok_or(BuildError::NoPatternSelected)
}

/// Resolves `platform` and builds the plan in one step.
///
/// A missing pattern is reported before the platform is looked at.
pub fn prepare(
    operation: &Operation,
    platform: &crate::platform::Platform,
    tool_name: &str,
) -> Result<(ResolvedPlatform, ExecutionPlan), BuildError> {
    if let Some(args) = operation.pattern_args() {
        required_pattern(args)?;
    }
    let resolved = crate::platform::resolve(platform, tool_name)?;
    let plan = build(operation, &resolved)?;
    Ok((resolved, plan))
}
