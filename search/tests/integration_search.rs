use std::fs::File;
use std::io::Write;

use core::build_corpus;
use core::config::BuildConfig;
use tempfile::tempdir;

fn write_jsonl(dir: &std::path::Path, name: &str, lines: &[&str]) {
    let mut f = File::create(dir.join(name)).unwrap();
    for line in lines {
        writeln!(f, "{line}").unwrap();
    }
}

#[test]
fn repl_answers_a_query_against_a_freshly_built_index() {
    let corpus = tempdir().unwrap();
    write_jsonl(
        corpus.path(),
        "docs.jsonl",
        &[
            r#"{"url":"http://rust-lang.org","content":"<h1>Rust</h1> systems programming language"}"#,
            r#"{"url":"http://example.com","content":"unrelated gardening tips"}"#,
        ],
    );

    let index_dir = tempdir().unwrap();
    build_corpus(corpus.path(), index_dir.path(), BuildConfig::default()).unwrap();

    let input = b"rust\n".as_slice();
    let mut output = Vec::new();
    search::run_repl(index_dir.path(), 1000, 10, input, &mut output).unwrap();

    let text = String::from_utf8(output).unwrap();
    assert!(text.contains("http://rust-lang.org"));
    assert!(!text.contains("http://example.com"));
}

#[test]
fn repl_handles_multiple_queries_in_one_session() {
    let corpus = tempdir().unwrap();
    write_jsonl(
        corpus.path(),
        "docs.jsonl",
        &[
            r#"{"url":"http://a","content":"apple pie recipe"}"#,
            r#"{"url":"http://b","content":"banana bread recipe"}"#,
        ],
    );

    let index_dir = tempdir().unwrap();
    build_corpus(corpus.path(), index_dir.path(), BuildConfig::default()).unwrap();

    let input = b"apple\nbanana\n".as_slice();
    let mut output = Vec::new();
    search::run_repl(index_dir.path(), 1000, 10, input, &mut output).unwrap();

    let text = String::from_utf8(output).unwrap();
    assert!(text.contains("http://a"));
    assert!(text.contains("http://b"));
}

#[test]
fn repl_respects_top_k_limit() {
    let corpus = tempdir().unwrap();
    write_jsonl(
        corpus.path(),
        "docs.jsonl",
        &[
            r#"{"url":"http://1","content":"widget widget widget"}"#,
            r#"{"url":"http://2","content":"widget widget"}"#,
            r#"{"url":"http://3","content":"widget"}"#,
        ],
    );

    let index_dir = tempdir().unwrap();
    build_corpus(corpus.path(), index_dir.path(), BuildConfig::default()).unwrap();

    let input = b"widget\n".as_slice();
    let mut output = Vec::new();
    search::run_repl(index_dir.path(), 1000, 1, input, &mut output).unwrap();

    let text = String::from_utf8(output).unwrap();
    let rank_lines = text.lines().filter(|l| l.starts_with(|c: char| c.is_ascii_digit())).count();
    assert_eq!(rank_lines, 1);
}
