use std::fs;
use std::path::Path;

use quizmark::utils::logging;
use quizmark::{App, Config, DocumentCtx, DocumentFlow, OutputMode};

const WEEK1: &str = "\
# week 1
-------
type: MC
prompt: Which of these is prime? @{fig/numbers.png}@
correct: $7$
incorrect: $8$
incorrect (25%): $9$
notes: Chapter 1

-------
type: TF
prompt: The sky is blue
answer: true

-------
type: ORD
prompt: Order from smallest to largest
answer: $1$
answer: $2$
answer: $3$

-------
type: MAT
prompt: Match the capitals
match_a: France
match_b: Paris
match_a: Italy
match_b: Rome
";

fn config_in(dir: &Path) -> Config {
    Config {
        report_file: dir.join("report.txt").display().to_string(),
        ..Config::default()
    }
}

fn write_input(dir: &Path, name: &str, text: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path
}

#[tokio::test]
async fn test_single_document_both_outputs() {
    logging::init(false);
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "week1.txt", WEEK1);

    let app = App::initialize(config_in(dir.path()), OutputMode::Both, vec![input], None).unwrap();
    let stats = app.run().await.unwrap();
    assert!(stats.all_succeeded());

    let import = fs::read_to_string(dir.path().join("week1_bb.txt")).unwrap();
    let lines: Vec<&str> = import.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(
        lines[0],
        "MC\tWhich of these is prime? <b>[INSERT FIGURE HERE: fig/numbers.png]</b><p></p>\t$7$\tcorrect\t$8$\tincorrect\t$9$\tincorrect"
    );
    assert_eq!(lines[1], "TF\tThe sky is blue<p></p>\ttrue");
    assert_eq!(lines[2], "ORD\tOrder from smallest to largest<p></p>\t$1$\t$2$\t$3$");
    assert_eq!(
        lines[3],
        "MAT\tMatch the capitals<p></p>\tFrance\tParis\tItaly\tRome"
    );

    let document = fs::read_to_string(dir.path().join("week1.tex")).unwrap();
    assert!(document.starts_with("\\documentclass{article}"));
    assert!(document.contains("\\includegraphics[width=0.5\\textwidth]{fig/numbers.png}"));
    assert!(document.contains("\\textbf{(25\\%)} \\emph{incorrect}: $9$"));
    assert!(document.contains("\\textbf{Notes:} Chapter 1"));
    assert!(document.contains("\\item\nThe sky is blue\n\n\\emph{answer}: true\n"));
    assert!(document.contains("\\emph{1b}: Paris"));
    assert!(document.trim_end().ends_with("\\end{document}"));

    let report = fs::read_to_string(dir.path().join("report.txt")).unwrap();
    assert!(report.contains("成功"));
}

#[tokio::test]
async fn test_explicit_output_path() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "week1.txt", WEEK1);
    let output = dir.path().join("upload.txt");

    let app = App::initialize(
        config_in(dir.path()),
        OutputMode::Import,
        vec![input],
        Some(output.clone()),
    )
    .unwrap();
    assert!(app.run().await.unwrap().all_succeeded());

    assert!(output.exists());
    assert!(!dir.path().join("week1_bb.txt").exists());
    assert!(!dir.path().join("week1.tex").exists());
}

#[tokio::test]
async fn test_bad_document_does_not_block_good_one() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_input(dir.path(), "good.txt", WEEK1);
    let bad = write_input(
        dir.path(),
        "bad.txt",
        "-------\ntype: MC\nprompt: Pick %{a, b}%\ncorrect: %{x, y, z}%\n",
    );

    let app = App::initialize(
        config_in(dir.path()),
        OutputMode::Both,
        vec![bad, good],
        None,
    )
    .unwrap();
    let stats = app.run().await.unwrap();

    assert_eq!(stats.success, 1);
    assert_eq!(stats.failed, 1);
    assert!(dir.path().join("good_bb.txt").exists());
    assert!(dir.path().join("good.tex").exists());
    assert!(!dir.path().join("bad_bb.txt").exists());
    assert!(!dir.path().join("bad.tex").exists());

    let report = fs::read_to_string(dir.path().join("report.txt")).unwrap();
    assert!(report.contains("失败"));
    assert!(report.contains("[2, 3]"));
}

#[tokio::test]
async fn test_missing_input_is_a_failure() {
    let dir = tempfile::tempdir().unwrap();
    let app = App::initialize(
        config_in(dir.path()),
        OutputMode::Both,
        vec![dir.path().join("nope.txt")],
        None,
    )
    .unwrap();
    let stats = app.run().await.unwrap();
    assert_eq!(stats.failed, 1);
    assert!(!stats.all_succeeded());
}

#[test]
fn test_flow_with_strict_config() {
    let config = Config {
        strict_lines: true,
        ..Config::default()
    };
    let flow = DocumentFlow::new(&config, OutputMode::Document).unwrap();
    let text = "-------\ntype: FIL\nprompt: Upload\nthis line has no key\n";
    let err = flow.run(text, &DocumentCtx::new(1, "strict.txt")).unwrap_err();
    assert!(err.to_string().contains("this line has no key"));
}

#[test]
fn test_config_file_feeds_flow() {
    tokio_test::block_on(async {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("quizmark.toml");
        tokio::fs::write(
            &config_path,
            "display_math_marker = \"@@\"\nprompt_spacer = \"\"\n",
        )
        .await
        .unwrap();

        let config = Config::from_file(&config_path).unwrap();
        let flow = DocumentFlow::new(&config, OutputMode::Import).unwrap();
        let rendered = flow
            .run(
                "-------\ntype: ESS\nprompt: Prove $$a = b$$\n",
                &DocumentCtx::new(1, "essay.txt"),
            )
            .unwrap();
        assert_eq!(rendered.import.as_deref(), Some("ESS\tProve @@a{}={}b@@\n"));
    });
}
