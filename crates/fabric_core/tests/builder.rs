use fabric_core::{
    build, prepare, resolve, BuildError, ExecutionPlan, Operation, PatternArgs, Platform, Stage,
    StructuredRequest,
};
use pretty_assertions::assert_eq;

fn linux() -> fabric_core::ResolvedPlatform {
    resolve(&Platform::Linux, "fabric").unwrap()
}

#[test]
fn scrape_url_then_pattern_pipes_url_scrape_into_pattern() {
    let op = Operation::ScrapeUrlThenPattern {
        url: "http://x".into(),
        args: PatternArgs::new("summarize"),
    };

    let plan = build(&op, &linux()).unwrap();

    assert_eq!(
        plan,
        ExecutionPlan::piped(
            Stage::new("fabric", ["-u", "http://x"]),
            Stage::new("fabric", ["--pattern", "summarize"]),
        )
        .with_structured(StructuredRequest {
            flag: "-u".into(),
            input: "http://x".into(),
            pattern: "summarize".into(),
            model: None,
            context: None,
        })
    );
}

#[test]
fn search_question_then_pattern_uses_query_flag() {
    let op = Operation::SearchQuestionThenPattern {
        question: "why is sky blue".into(),
        args: PatternArgs::new("explain"),
    };

    let plan = build(&op, &linux()).unwrap();

    assert_eq!(plan.stages[0], Stage::new("fabric", ["-q", "why is sky blue"]));
    assert_eq!(plan.stages[1], Stage::new("fabric", ["--pattern", "explain"]));
    assert_eq!(plan.structured.unwrap().flag, "-q");
}

#[test]
fn single_stage_scrape_and_search_share_the_query_flag() {
    let scrape = build(&Operation::ScrapeUrl { url: "http://x".into() }, &linux()).unwrap();
    let search = build(
        &Operation::SearchQuestion {
            question: "what".into(),
        },
        &linux(),
    )
    .unwrap();

    assert_eq!(scrape, ExecutionPlan::single(Stage::new("fabric", ["-q", "http://x"])));
    assert_eq!(search, ExecutionPlan::single(Stage::new("fabric", ["-q", "what"])));
}

#[test]
fn run_pattern_appends_model_and_context_when_present() {
    let op = Operation::RunPattern(
        PatternArgs::new("summarize")
            .with_model("gpt-4o")
            .with_context("notes"),
    );

    let plan = build(&op, &linux()).unwrap();

    assert_eq!(
        plan,
        ExecutionPlan::single(Stage::new(
            "fabric",
            ["--pattern", "summarize", "--model", "gpt-4o", "--context", "notes"]
        ))
    );
}

#[test]
fn blank_model_and_context_are_omitted() {
    let op = Operation::RunPattern(PatternArgs::new("summarize").with_model("").with_context("   "));

    let plan = build(&op, &linux()).unwrap();

    assert_eq!(plan.stages[0].args, vec!["--pattern", "summarize"]);
}

#[test]
fn context_goes_to_the_pattern_stage_only() {
    let op = Operation::SearchQuestionThenPattern {
        question: "q".into(),
        args: PatternArgs::new("p").with_context("ctx"),
    };

    let plan = build(&op, &linux()).unwrap();

    assert_eq!(plan.stages[0].args, vec!["-q", "q"]);
    assert_eq!(plan.stages[1].args, vec!["--pattern", "p", "--context", "ctx"]);
}

#[test]
fn clipboard_then_pattern_reads_platform_clipboard_first() {
    let op = Operation::ClipboardThenPattern(PatternArgs::new("summarize"));

    let mac = build(&op, &resolve(&Platform::MacOs, "fabric").unwrap()).unwrap();
    let win = build(&op, &resolve(&Platform::Windows, "fabric").unwrap()).unwrap();

    assert_eq!(mac.stages[0], Stage::new("pbpaste", Vec::<String>::new()));
    assert_eq!(win.stages[0].program, "powershell.exe");
    assert_eq!(win.stages[1], Stage::new("fabric.exe", ["--pattern", "summarize"]));
    assert!(mac.structured.is_none());
}

#[test]
fn clipboard_on_unknown_platform_fails_before_planning() {
    let op = Operation::ClipboardThenPattern(PatternArgs::new("summarize"));

    let err = prepare(&op, &Platform::Other("plan9".into()), "fabric").unwrap_err();

    match err {
        BuildError::UnsupportedPlatform(inner) => assert_eq!(inner.platform, "plan9"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn missing_pattern_wins_over_unknown_platform() {
    let op = Operation::ClipboardThenPattern(PatternArgs::default());

    let err = prepare(&op, &Platform::Other("plan9".into()), "fabric").unwrap_err();

    assert_eq!(err, BuildError::NoPatternSelected);
}

#[test]
fn pattern_variants_without_pattern_are_rejected() {
    let ops = [
        Operation::RunPattern(PatternArgs::default()),
        Operation::ScrapeUrlThenPattern {
            url: "http://x".into(),
            args: PatternArgs::new(" "),
        },
        Operation::SearchQuestionThenPattern {
            question: "q".into(),
            args: PatternArgs::default(),
        },
        Operation::ClipboardThenPattern(PatternArgs::default()),
    ];

    for op in ops {
        assert_eq!(build(&op, &linux()), Err(BuildError::NoPatternSelected), "{op:?}");
    }
}

#[test]
fn build_is_referentially_transparent() {
    let ops = [
        Operation::RunPattern(PatternArgs::new("a").with_model("m")),
        Operation::ScrapeUrl { url: "u".into() },
        Operation::SearchQuestion { question: "q".into() },
        Operation::ScrapeUrlThenPattern {
            url: "u".into(),
            args: PatternArgs::new("a"),
        },
        Operation::SearchQuestionThenPattern {
            question: "q".into(),
            args: PatternArgs::new("a").with_context("c"),
        },
        Operation::ClipboardThenPattern(PatternArgs::new("a")),
    ];

    for platform in [Platform::Windows, Platform::MacOs, Platform::Linux] {
        let resolved = resolve(&platform, "fabric").unwrap();
        for op in &ops {
            assert_eq!(build(op, &resolved), build(op, &resolved));
        }
    }
}

#[test]
fn shell_line_quotes_and_pipes_stages() {
    let resolved = linux();
    let op = Operation::SearchQuestionThenPattern {
        question: "why is sky blue".into(),
        args: PatternArgs::new("summarize"),
    };

    let plan = build(&op, &resolved).unwrap();

    assert_eq!(
        plan.shell_line(&resolved.shell),
        "fabric -q 'why is sky blue' | fabric --pattern summarize"
    );
}
