//! End-to-end tests for the `billsplit` binary.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use lopdf::{dictionary, Document, Object, Stream};
use predicates::prelude::*;
use tempfile::TempDir;

/// Build a PDF with one Helvetica page per entry.
fn statement_pdf(pages: &[&[&str]]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });

    let mut kids = Vec::new();
    for lines in pages {
        let mut content = String::from("BT /F1 12 Tf 72 720 Td ");
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                content.push_str("0 -16 Td ");
            }
            content.push_str(&format!("({}) Tj ", line));
        }
        content.push_str("ET");

        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! { "Type" => "Pages", "Kids" => kids, "Count" => count }),
    );
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);

    let mut data = Vec::new();
    doc.save_to(&mut data).unwrap();
    data
}

/// Temporary config and pattern files so tests never touch the user's.
struct Env {
    dir: TempDir,
}

impl Env {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.json"), "{}").unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn write_pdf(&self, name: &str, pages: &[&[&str]]) -> PathBuf {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, statement_pdf(pages)).unwrap();
        path
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("billsplit").unwrap();
        cmd.arg("--config")
            .arg(self.path("config.json"))
            .arg("--patterns")
            .arg(self.path("patterns.json"));
        cmd
    }
}

fn three_customers() -> [&'static [&'static str]; 3] {
    [
        &["account nbr: ACC1001", "Customer Name: Jane Doe1"],
        &["account nbr: ACC1002", "Customer Name: Jane Doe2"],
        &["account nbr: ACC1003", "Customer Name: Jane Doe3"],
    ]
}

fn pdf_pages(path: &Path) -> usize {
    Document::load(path).unwrap().get_pages().len()
}

#[test]
fn test_help_lists_commands() {
    Command::cargo_bin("billsplit")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("split"))
        .stdout(predicate::str::contains("patterns"))
        .stdout(predicate::str::contains("--verbose"));
}

#[test]
fn test_split_writes_one_file_per_page() {
    let env = Env::new();
    let input = env.write_pdf("bills.pdf", &three_customers());
    let out = env.path("out");

    env.cmd()
        .arg("split")
        .arg(&input)
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("3 successful, 0 failed"));

    for name in ["ACC1001_JaneDoe1.pdf", "ACC1002_JaneDoe2.pdf", "ACC1003_JaneDoe3.pdf"] {
        let path = out.join(name);
        assert!(path.exists(), "missing {}", name);
        assert_eq!(pdf_pages(&path), 1);
    }
}

#[test]
fn test_split_reports_unmatched_page() {
    let env = Env::new();
    let input = env.write_pdf(
        "bills.pdf",
        &[&["account nbr: ACC2001", "Customer Name: Sam Roe"], &["Thank you"]],
    );
    let out = env.path("out");

    env.cmd()
        .args(["split", "--manifest", "--month-year", "01-2024", "-o"])
        .arg(&out)
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 successful, 1 failed"))
        .stdout(predicate::str::contains(
            "Page 2 (index 1): no account number or customer name pattern matched",
        ));

    assert!(out.join("ACC2001_SamRoe_Jan-2024.pdf").exists());
    let manifest = fs::read_to_string(out.join("manifest.csv")).unwrap();
    assert!(manifest.contains("0,success,ACC2001_SamRoe_Jan-2024.pdf"));
    assert!(manifest.contains("1,error"));
}

#[test]
fn test_split_dry_run_writes_nothing() {
    let env = Env::new();
    let input = env.write_pdf("bills.pdf", &three_customers());
    let out = env.path("out");

    env.cmd()
        .args(["split", "--dry-run", "-o"])
        .arg(&out)
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Would write 3 files"));

    assert!(!out.exists());
}

#[test]
fn test_split_rejects_non_pdf() {
    let env = Env::new();
    let input = env.path("notes.pdf");
    fs::write(&input, "just some text").unwrap();

    env.cmd()
        .arg("split")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a PDF"));
}

#[test]
fn test_split_missing_input() {
    let env = Env::new();
    env.cmd()
        .arg("split")
        .arg(env.path("nope.pdf"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_patterns_add_list_remove_reset() {
    let env = Env::new();

    env.cmd()
        .args(["patterns", "add", "--field", "account", r"customer id:\s*(\d+)"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added account pattern [3]"));

    env.cmd()
        .args(["patterns", "list", "--field", "account"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r"[3] 0.6  customer id:\s*(\d+)"));

    let stored = fs::read_to_string(env.path("patterns.json")).unwrap();
    assert!(stored.contains("accountPatterns"));
    assert!(stored.contains(r"customer id:\\s*(\\d+)"));

    env.cmd()
        .args(["patterns", "remove", "--field", "account", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed account pattern [3]"));

    env.cmd()
        .args(["patterns", "remove", "--field", "name", "42"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));

    env.cmd().args(["patterns", "reset"]).assert().success();
}

#[test]
fn test_patterns_add_rejects_invalid_regex() {
    let env = Env::new();
    env.cmd()
        .args(["patterns", "add", "--field", "name", "name: ([a-z"])
        .assert()
        .failure();
    assert!(!env.path("patterns.json").exists());
}

#[test]
fn test_custom_pattern_is_used_by_split() {
    let env = Env::new();
    env.cmd()
        .args(["patterns", "add", "--field", "account", r"member\s*id:\s*(\w+)"])
        .assert()
        .success();

    let input = env.write_pdf("bills.pdf", &[&["Member ID: M77", "Customer Name: Kim Li"]]);
    let out = env.path("out");
    env.cmd()
        .arg("split")
        .arg(&input)
        .arg("-o")
        .arg(&out)
        .assert()
        .success();

    assert!(out.join("M77_KimLi.pdf").exists());
}

#[test]
fn test_extract_json_respects_max_pages() {
    let env = Env::new();
    let input = env.write_pdf("bills.pdf", &three_customers());

    let output = env
        .cmd()
        .args(["extract", "--format", "json", "--max-pages", "1"])
        .arg(&input)
        .output()
        .unwrap();
    assert!(output.status.success());

    let pages: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let pages = pages.as_array().unwrap();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0]["pageIndex"], 0);
    assert_eq!(pages[0]["fields"][0]["value"], "ACC1001");
}

#[test]
fn test_batch_splits_each_source() {
    let env = Env::new();
    env.write_pdf("in/a.pdf", &three_customers());
    env.write_pdf("in/b.pdf", &[&["account nbr: BCC2002", "Customer Name: Bo Wu"]]);
    let out = env.path("out");
    let pattern = env.path("in").join("*.pdf");

    env.cmd()
        .args(["batch", "--summary", "--month-year", "01-2024", "-o"])
        .arg(&out)
        .arg(pattern.to_str().unwrap())
        .assert()
        .success()
        .stdout(predicate::str::contains("Processed 2 files"));

    assert!(out.join("ACC1001_Jan-2024").join("ACC1002_JaneDoe2_Jan-2024.pdf").exists());
    assert!(out.join("BCC2002_Jan-2024").join("BCC2002_BoWu_Jan-2024.pdf").exists());
    assert!(out.join("summary.csv").exists());
}

#[test]
fn test_config_set_and_get() {
    let env = Env::new();

    env.cmd()
        .args(["config", "set", "extraction.unknown_placeholder", "NA"])
        .assert()
        .success();

    env.cmd()
        .args(["config", "get", "extraction.unknown_placeholder"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"NA\""));

    env.cmd()
        .args(["config", "get", "output.missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration key not found"));

    let input = env.write_pdf("bills.pdf", &[&["account nbr: ACC5"]]);
    let out = env.path("out");
    env.cmd()
        .arg("split")
        .arg(&input)
        .arg("-o")
        .arg(&out)
        .assert()
        .success();
    assert!(out.join("ACC5_NA.pdf").exists());
}
