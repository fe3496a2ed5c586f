//! `reqtrace` binary

use reqtrace_cli::{
    command, init_tracing, run_analyze, run_lint, AnalyzeArgs, LintArgs, EXIT_USAGE,
};
use reqtrace_scan::CancelToken;

#[tokio::main]
async fn main() {
    let matches = command().get_matches();
    init_tracing(matches.get_count("verbose"));

    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupted, finishing in-flight files");
                cancel.cancel();
            }
        });
    }

    let task = match matches.subcommand() {
        Some(("analyze", args)) => match AnalyzeArgs::from_matches(args) {
            Ok(args) => tokio::task::spawn_blocking(move || {
                run_analyze(&args, cancel, &mut std::io::stdout().lock())
            }),
            Err(e) => fail(&e),
        },
        Some(("lint", args)) => match LintArgs::from_matches(args) {
            Ok(args) => tokio::task::spawn_blocking(move || {
                run_lint(&args, cancel, &mut std::io::stdout().lock())
            }),
            Err(e) => fail(&e),
        },
        _ => std::process::exit(EXIT_USAGE),
    };

    let code = match task.await {
        Ok(Ok(code)) => code,
        Ok(Err(e)) => fail(&e),
        Err(e) => {
            eprintln!("error: scan task failed: {e}");
            EXIT_USAGE
        }
    };
    std::process::exit(code);
}

fn fail(e: &anyhow::Error) -> ! {
    eprintln!("error: {e:#}");
    std::process::exit(EXIT_USAGE)
}
