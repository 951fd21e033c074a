use assert_cmd::Command;
use predicates::prelude::*;
use std::error::Error;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn cli() -> Result<Command, Box<dyn Error>> {
    let mut cmd = Command::cargo_bin("cellshot")?;
    cmd.env_remove("RUST_LOG");
    Ok(cmd)
}

fn new_project(dir: &Path) -> Result<(), Box<dyn Error>> {
    cli()?
        .arg("--project")
        .arg(dir)
        .arg("new")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created new project in"));
    Ok(())
}

#[test]
fn new_creates_manifest() -> Result<(), Box<dyn Error>> {
    let temp = tempdir()?;
    new_project(temp.path())?;

    let manifest = fs::read_to_string(temp.path().join("file.imgnb"))?;
    let value: serde_json::Value = serde_json::from_str(&manifest)?;
    assert!(value["cells"].is_array());
    Ok(())
}

#[test]
fn commands_refuse_directories_without_project() -> Result<(), Box<dyn Error>> {
    let temp = tempdir()?;
    cli()?
        .arg("--project")
        .arg(temp.path())
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no project in"));
    assert!(!temp.path().join("file.imgnb").exists());
    Ok(())
}

#[test]
fn add_edit_and_list_cells() -> Result<(), Box<dyn Error>> {
    let temp = tempdir()?;
    new_project(temp.path())?;

    cli()?
        .arg("--project")
        .arg(temp.path())
        .args(["add", "--title", "Greeting", "--language", "Rust"])
        .args(["--code", "fn main() {\n    println!(\"hi\");\n}\n"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added cell 2"));

    cli()?
        .arg("--project")
        .arg(temp.path())
        .args(["edit", "1", "--title", "Setup", "--code", "import os"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated cell 1"));

    cli()?
        .arg("--project")
        .arg(temp.path())
        .arg("list")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Setup")
                .and(predicate::str::contains("import os"))
                .and(predicate::str::contains("rust"))
                .and(predicate::str::contains("Greeting"))
                .and(predicate::str::contains("3 lines")),
        );
    Ok(())
}

#[test]
fn add_reads_code_from_file() -> Result<(), Box<dyn Error>> {
    let temp = tempdir()?;
    new_project(temp.path())?;
    let source = temp.path().join("query.sql");
    fs::write(&source, "SELECT 1;\n")?;

    cli()?
        .arg("--project")
        .arg(temp.path())
        .args(["add", "--language", "sql", "--file"])
        .arg(&source)
        .assert()
        .success();

    let manifest = fs::read_to_string(temp.path().join("file.imgnb"))?;
    let value: serde_json::Value = serde_json::from_str(&manifest)?;
    let cells = value["cells"].as_array().ok_or("cells array")?;
    assert_eq!(cells.len(), 2);
    assert_eq!(cells[1]["language"], "sql");
    assert_eq!(cells[1]["code"], "SELECT 1;\n");
    Ok(())
}

#[test]
fn unknown_language_is_rejected() -> Result<(), Box<dyn Error>> {
    let temp = tempdir()?;
    new_project(temp.path())?;

    cli()?
        .arg("--project")
        .arg(temp.path())
        .args(["add", "--language", "brainfuck", "--code", "+"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported language 'brainfuck'"));
    Ok(())
}

#[test]
fn last_cell_cannot_be_removed() -> Result<(), Box<dyn Error>> {
    let temp = tempdir()?;
    new_project(temp.path())?;

    cli()?
        .arg("--project")
        .arg(temp.path())
        .args(["remove", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot remove the last cell"));

    cli()?
        .arg("--project")
        .arg(temp.path())
        .args(["remove", "0"])
        .assert()
        .failure();
    Ok(())
}

#[test]
fn export_writes_png_named_after_title() -> Result<(), Box<dyn Error>> {
    let temp = tempdir()?;
    new_project(temp.path())?;
    cli()?
        .arg("--project")
        .arg(temp.path())
        .args(["edit", "1", "--title", "Hello World", "--code", "print('hi')"])
        .assert()
        .success();

    cli()?
        .arg("--project")
        .arg(temp.path())
        .args(["export", "1", "--draft"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved:"));

    let png = temp.path().join("images").join("Hello World.png");
    let image = image::open(&png)?;
    assert!(image.width() > 0 && image.height() > 0);
    Ok(())
}

#[test]
fn export_of_empty_cell_fails() -> Result<(), Box<dyn Error>> {
    let temp = tempdir()?;
    new_project(temp.path())?;

    cli()?
        .arg("--project")
        .arg(temp.path())
        .args(["export", "1", "--draft"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot export a cell with no code"));
    Ok(())
}

#[test]
fn export_all_reports_skipped_cells() -> Result<(), Box<dyn Error>> {
    let temp = tempdir()?;
    new_project(temp.path())?;
    cli()?
        .arg("--project")
        .arg(temp.path())
        .args(["add", "--title", "query", "--language", "sql", "--code", "SELECT 1;"])
        .assert()
        .success();

    cli()?
        .arg("--project")
        .arg(temp.path())
        .args(["export-all", "--draft"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 1 images to"))
        .stderr(predicate::str::contains("cell 1"));

    assert!(temp.path().join("images").join("query.png").is_file());
    Ok(())
}

#[test]
fn draft_glyphs_can_come_from_preferences() -> Result<(), Box<dyn Error>> {
    let temp = tempdir()?;
    new_project(temp.path())?;
    cli()?
        .arg("--project")
        .arg(temp.path())
        .args(["config", "set", "export.draft_glyphs", "yes"])
        .assert()
        .success();
    cli()?
        .arg("--project")
        .arg(temp.path())
        .args(["edit", "1", "--code", "x = 1"])
        .assert()
        .success();

    cli()?
        .arg("--project")
        .arg(temp.path())
        .args(["export", "1"])
        .assert()
        .success();
    assert!(temp.path().join("images").join("untitled.png").is_file());
    Ok(())
}

#[test]
fn config_set_and_show() -> Result<(), Box<dyn Error>> {
    let temp = tempdir()?;
    let config = temp.path().join("prefs.json");

    cli()?
        .arg("--config")
        .arg(&config)
        .args(["config", "set", "export.font_size_px", "18"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated export.font_size_px"));

    cli()?
        .arg("--config")
        .arg(&config)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"font_size_px\": 18"));

    cli()?
        .arg("--config")
        .arg(&config)
        .args(["config", "set", "export.colour", "red"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown preference key"));
    Ok(())
}

#[test]
fn languages_lists_supported_tags() -> Result<(), Box<dyn Error>> {
    cli()?
        .arg("languages")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("python")
                .and(predicate::str::contains("rust"))
                .and(predicate::str::contains("javascript")),
        );
    Ok(())
}
