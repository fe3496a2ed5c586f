use pretty_assertions::assert_eq;
use reqtrace_cli::{
    run_analyze, run_lint, AnalyzeArgs, LintArgs, EXIT_CANCELLED, EXIT_LINT_ISSUES, EXIT_OK,
    EXIT_STRICT_FAILURE,
};
use reqtrace_report::{FORWARD_FILE, MANIFEST_FILE};
use reqtrace_scan::CancelToken;
use reqtrace_test_utils::{chain_corpus, complete_record, CorpusFixture};

fn analyze(args: &AnalyzeArgs) -> (i32, String) {
    let mut out = Vec::new();
    let code = run_analyze(args, CancelToken::new(), &mut out).unwrap();
    (code, String::from_utf8(out).unwrap())
}

fn lint(args: &LintArgs) -> (i32, String) {
    let mut out = Vec::new();
    let code = run_lint(args, CancelToken::new(), &mut out).unwrap();
    (code, String::from_utf8(out).unwrap())
}

#[test]
fn test_analyze_chain_corpus() {
    let fixture = chain_corpus();
    let mut args = AnalyzeArgs::new(fixture.root());
    args.output = fixture.output_dir("out");
    args.strict = true;

    let (code, stdout) = analyze(&args);
    assert_eq!(code, EXIT_OK);
    assert!(stdout.starts_with("Scanned 3 file(s): 3 record(s), 3 link(s), 0 read failure(s)\n"));
    assert!(stdout.contains("Wrote 5 file(s)"));
    assert!(args.output.join(FORWARD_FILE).exists());
    assert!(args.output.join(MANIFEST_FILE).exists());
}

#[test]
fn test_strict_mode_fails_on_findings() {
    let fixture = chain_corpus();
    fixture.record("srd/SRD-2.yml", "SRD-2", &["URD-404"]);
    let mut args = AnalyzeArgs::new(fixture.root());
    args.output = fixture.output_dir("out");

    let (code, stdout) = analyze(&args);
    assert_eq!(code, EXIT_OK);
    assert!(stdout.contains("  broken: URD-404\n"));

    args.strict = true;
    let (code, _) = analyze(&args);
    assert_eq!(code, EXIT_STRICT_FAILURE);
    assert!(args.output.join(FORWARD_FILE).exists());
}

#[test]
fn test_patterns_file_changes_classification() {
    let fixture = CorpusFixture::new();
    fixture.record("srd/SRD-1.yml", "SRD-1", &["HIL-RUN-7"]);
    let patterns = fixture.output_dir("patterns.json");
    std::fs::write(&patterns, r#"{"evidence_patterns": ["hil-"]}"#).unwrap();

    let mut args = AnalyzeArgs::new(fixture.root());
    args.output = fixture.output_dir("out");
    args.strict = true;
    assert_eq!(analyze(&args).0, EXIT_STRICT_FAILURE);

    args.patterns_file = Some(patterns);
    assert_eq!(analyze(&args).0, EXIT_OK);
}

#[test]
fn test_missing_corpus_is_an_error() {
    let fixture = CorpusFixture::new();
    let mut args = AnalyzeArgs::new(fixture.root().join("nope"));
    args.output = fixture.output_dir("out");

    let err = run_analyze(&args, CancelToken::new(), &mut Vec::new()).unwrap_err();
    assert!(format!("{err:#}").starts_with("scanning "));
    assert!(!args.output.exists());
}

#[test]
fn test_unknown_category_is_an_error() {
    let fixture = chain_corpus();
    let mut args = AnalyzeArgs::new(fixture.root());
    args.output = fixture.output_dir("out");
    args.category = vec!["hw".to_string()];

    let err = run_analyze(&args, CancelToken::new(), &mut Vec::new()).unwrap_err();
    assert!(format!("{err:#}").contains("hw"));
    assert!(!args.output.exists());
}

#[test]
fn test_category_tables() {
    let fixture = chain_corpus();
    let mut args = AnalyzeArgs::new(fixture.root());
    args.output = fixture.output_dir("out");
    args.categories = true;

    let (code, stdout) = analyze(&args);
    assert_eq!(code, EXIT_OK);
    assert!(stdout.contains("Wrote 8 file(s)"));
    for category in ["srd", "swd", "urd"] {
        assert!(args.output.join(format!("by-category/{category}.csv")).exists());
    }
}

#[test]
fn test_cancelled_analyze_writes_nothing() {
    let fixture = chain_corpus();
    let mut args = AnalyzeArgs::new(fixture.root());
    args.output = fixture.output_dir("out");
    let token = CancelToken::new();
    token.cancel();

    let mut out = Vec::new();
    let code = run_analyze(&args, token, &mut out).unwrap();
    assert_eq!(code, EXIT_CANCELLED);
    assert!(String::from_utf8(out)
        .unwrap()
        .contains("Cancelled: 3 file(s) not scanned"));
    assert!(!args.output.exists());
}

#[test]
fn test_lint_clean_corpus() {
    let fixture = CorpusFixture::new();
    fixture.write("urd/URD-1.yml", complete_record("URD-1", &[]));
    fixture.write("srd/SRD-1.yml", complete_record("SRD-1", &["URD-1"]));
    let mut args = LintArgs::new(fixture.root());
    args.check_links = true;

    let (code, stdout) = lint(&args);
    assert_eq!(code, EXIT_OK);
    assert_eq!(stdout, "OK: no issues found in 2 file(s)\n");
}

#[test]
fn test_lint_errors_and_missing_fields_csv() {
    let fixture = CorpusFixture::new();
    fixture.write("srd/SRD-1.yml", complete_record("SRD-1", &["URD-404"]));
    fixture.write(
        "srd/SRD-2.yml",
        complete_record("SRD-2", &[]).replace("  ASIL: B\n", ""),
    );
    let csv = fixture.output_dir("reports/missing.csv");
    let mut args = LintArgs::new(fixture.root());
    args.check_links = true;
    args.missing_fields_csv = Some(csv.clone());

    let (code, stdout) = lint(&args);
    assert_eq!(code, EXIT_LINT_ISSUES);
    assert!(stdout.contains("[broken-link]"));
    assert!(stdout.ends_with("Found 1 error(s) and 1 warning(s) in 2 file(s)\n"));
    assert_eq!(
        std::fs::read_to_string(&csv).unwrap(),
        "file,missing_fields\r\nsrd/SRD-1.yml,\r\nsrd/SRD-2.yml,ASIL\r\n"
    );
}

#[test]
fn test_lint_warnings_do_not_fail() {
    let fixture = CorpusFixture::new();
    fixture.write(
        "srd/SRD-1.yml",
        complete_record("SRD-1", &[]).replace("  reviewed: 3f2a1c\n", "  reviewed:\n"),
    );

    let (code, stdout) = lint(&LintArgs::new(fixture.root()));
    assert_eq!(code, EXIT_OK);
    assert!(stdout.contains("[unreviewed]"));
}

#[test]
fn test_cancelled_lint_is_not_a_pass() {
    let fixture = CorpusFixture::new();
    fixture.write("srd/SRD-1.yml", "```yaml\nSRD-1:\n  text: x\n```\n");
    let csv = fixture.output_dir("missing.csv");
    let mut args = LintArgs::new(fixture.root());
    args.missing_fields_csv = Some(csv.clone());
    let token = CancelToken::new();
    token.cancel();

    let mut out = Vec::new();
    let code = run_lint(&args, token, &mut out).unwrap();
    assert_eq!(code, EXIT_CANCELLED);
    let stdout = String::from_utf8(out).unwrap();
    assert_eq!(stdout, "Cancelled: 1 file(s) not linted\n");
    assert!(!csv.exists());
}
