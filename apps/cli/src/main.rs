use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use cellshot_core::{
    ExportSettings, GlyphSource, NotebookApp, SystemClipboard, SystemFolderOpener,
};
use cellshot_highlight::LanguageTag;
use cellshot_project::{Cell, CellUpdate, LoadStatus, ProjectStore, DEFAULT_LANGUAGE};
use cellshot_settings::{Preferences, PreferencesStore};
use clap::{Args, Parser, Subcommand};
use log::{debug, LevelFilter};

#[derive(Parser)]
#[command(
    name = "cellshot",
    about = "Keep code cells in a project and export them as styled PNG cards",
    author,
    version
)]
struct Cli {
    /// 專案目錄；預設為目前目錄。 / Project directory (defaults to current directory).
    #[arg(long, global = true, value_name = "DIR")]
    project: Option<PathBuf>,
    /// 偏好設定檔；預設為 `<專案>/.cellshot/preferences.json`。 / Preferences file (defaults to `<project>/.cellshot/preferences.json`).
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    /// 顯示除錯記錄。 / Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 建立新專案（不會覆寫既有儲存格）。 / Create a project (existing cells are kept).
    New,
    /// 列出所有儲存格。 / List the cells of the project.
    List,
    /// 新增儲存格。 / Append a cell.
    Add(CellArgs),
    /// 修改儲存格。 / Change a cell's title, language or code.
    Edit(EditArgs),
    /// 移除儲存格（至少保留一個）。 / Remove a cell (the last one is kept).
    Remove {
        /// 儲存格編號（從 1 開始）。 / Cell number, starting at 1.
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        index: u32,
    },
    /// 重新寫入專案檔。 / Rewrite the project file.
    Save,
    /// 匯出單一儲存格為 PNG。 / Export one cell as a PNG card.
    Export {
        /// 儲存格編號（從 1 開始）。 / Cell number, starting at 1.
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        index: u32,
        #[command(flatten)]
        glyphs: GlyphArgs,
    },
    /// 匯出所有儲存格並儲存專案。 / Export every cell, then save the project.
    ExportAll {
        #[command(flatten)]
        glyphs: GlyphArgs,
    },
    /// 以檔案管理員開啟圖片資料夾。 / Open the images folder in the file manager.
    OpenFolder,
    /// 複製儲存格程式碼到剪貼簿。 / Copy a cell's code to the clipboard.
    Copy {
        /// 儲存格編號（從 1 開始）。 / Cell number, starting at 1.
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        index: u32,
    },
    /// 列出支援的語言。 / List supported language tags.
    Languages,
    /// 檢視或修改偏好設定。 / Show or change preferences.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Args)]
struct CellArgs {
    /// 標題（亦作為匯出檔名）。 / Title, also used as the export file name.
    #[arg(long, default_value = "")]
    title: String,
    /// 語言標記。 / Language tag.
    #[arg(long, default_value = DEFAULT_LANGUAGE)]
    language: String,
    #[command(flatten)]
    source: CodeSource,
}

#[derive(Args)]
struct EditArgs {
    /// 儲存格編號（從 1 開始）。 / Cell number, starting at 1.
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    index: u32,
    /// 新標題。 / New title.
    #[arg(long)]
    title: Option<String>,
    /// 新語言標記。 / New language tag.
    #[arg(long)]
    language: Option<String>,
    #[command(flatten)]
    source: CodeSource,
}

#[derive(Args)]
struct CodeSource {
    /// 程式碼內容。 / Code text.
    #[arg(long, conflicts_with = "file")]
    code: Option<String>,
    /// 從檔案讀取程式碼。 / Read the code from a file.
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,
}

impl CodeSource {
    fn read(&self) -> Result<Option<String>> {
        match (&self.code, &self.file) {
            (Some(code), _) => Ok(Some(code.clone())),
            (None, Some(path)) => fs::read_to_string(path)
                .with_context(|| format!("read code from {}", path.display()))
                .map(Some),
            (None, None) => Ok(None),
        }
    }
}

#[derive(Args)]
struct GlyphArgs {
    /// 以方塊代替字形（不需字型檔）。 / Draw glyphs as boxes; no font file needed.
    #[arg(long)]
    draft: bool,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// 顯示目前偏好設定。 / Print the current preferences.
    Show,
    /// 設定單一項目，例如 `export.font_size_px 16`。 / Set one key, e.g. `export.font_size_px 16`.
    Set {
        key: String,
        /// 空字串可清除可選項目。 / An empty string clears optional keys.
        value: String,
    },
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let Cli {
        project,
        config,
        verbose,
        command,
    } = Cli::parse();
    init_logging(verbose);

    let project_dir = resolve_project(project)?;
    let config_path = match config {
        Some(path) => absolutize(path)?,
        None => Preferences::path_for_project(&project_dir),
    };
    debug!(
        "project {}, preferences {}",
        project_dir.display(),
        config_path.display()
    );

    match command {
        Commands::New => {
            let mut app = NotebookApp::default();
            app.create_project(&project_dir)?;
            println!("{}", app.status());
            Ok(())
        }
        Commands::List => {
            let app = open_app(&project_dir, ExportSettings::default())?;
            print_cells(&app);
            Ok(())
        }
        Commands::Add(args) => {
            let mut app = open_app(&project_dir, ExportSettings::default())?;
            let code = args.source.read()?.unwrap_or_default();
            app.add_cell(Cell::new(args.title, args.language, code))?;
            let status = app.status().to_string();
            app.save()?;
            println!("{status}");
            Ok(())
        }
        Commands::Edit(args) => {
            let update = CellUpdate {
                title: args.title,
                language: args.language,
                code: args.source.read()?,
            };
            if update.is_empty() {
                bail!("nothing to change; pass --title, --language, --code or --file");
            }
            let mut app = open_app(&project_dir, ExportSettings::default())?;
            app.update_cell(cell_index(args.index), update)?;
            let status = app.status().to_string();
            app.save()?;
            println!("{status}");
            Ok(())
        }
        Commands::Remove { index } => {
            let mut app = open_app(&project_dir, ExportSettings::default())?;
            app.remove_cell(cell_index(index))?;
            let status = app.status().to_string();
            app.save()?;
            println!("{status}");
            Ok(())
        }
        Commands::Save => {
            let mut app = open_app(&project_dir, ExportSettings::default())?;
            app.save()?;
            println!("{}", app.status());
            Ok(())
        }
        Commands::Export { index, glyphs } => {
            let settings = export_settings(&config_path, &glyphs)?;
            let mut app = open_app(&project_dir, settings)?;
            app.export_cell(cell_index(index))?;
            println!("{}", app.status());
            Ok(())
        }
        Commands::ExportAll { glyphs } => {
            let settings = export_settings(&config_path, &glyphs)?;
            let mut app = open_app(&project_dir, settings)?;
            let summary = app.export_all()?;
            for failure in &summary.failures {
                eprintln!(
                    "warning: cell {} ({:?}) not exported: {}",
                    failure.index + 1,
                    failure.title,
                    failure.error
                );
            }
            println!("{}", app.status());
            Ok(())
        }
        Commands::OpenFolder => {
            let mut app = open_app(&project_dir, ExportSettings::default())?;
            app.open_images_folder(&SystemFolderOpener)?;
            println!("{}", app.status());
            Ok(())
        }
        Commands::Copy { index } => {
            let mut app = open_app(&project_dir, ExportSettings::default())?;
            app.copy_cell(cell_index(index), &mut SystemClipboard)?;
            println!("{}", app.status());
            Ok(())
        }
        Commands::Languages => {
            for tag in LanguageTag::ALL {
                println!("{:<12}{}", tag.as_str(), tag.display_name());
            }
            Ok(())
        }
        Commands::Config(subcommand) => execute_config_command(subcommand, &config_path),
    }
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.format_timestamp(None).init();
}

fn resolve_project(project: Option<PathBuf>) -> Result<PathBuf> {
    match project {
        Some(path) => absolutize(path),
        None => std::env::current_dir().context("determine current directory"),
    }
}

fn absolutize(path: PathBuf) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(std::env::current_dir()
            .context("determine current directory")?
            .join(path))
    }
}

/// Opens an existing project; refuses directories without a manifest.
fn open_app(project_dir: &Path, settings: ExportSettings) -> Result<NotebookApp> {
    let store = ProjectStore::new(project_dir);
    if !store.exists() {
        bail!(
            "no project in {} (run `cellshot new` first)",
            project_dir.display()
        );
    }
    let mut app = NotebookApp::new(settings);
    if let LoadStatus::Recovered { reason } = app.open_project(project_dir)? {
        eprintln!("warning: {} ({reason})", app.status());
    }
    Ok(app)
}

fn export_settings(config_path: &Path, glyphs: &GlyphArgs) -> Result<ExportSettings> {
    let store = PreferencesStore::load(config_path)?;
    let mut settings = ExportSettings::from_preferences(&store.preferences().export)?;
    if glyphs.draft {
        settings.glyphs = GlyphSource::Draft;
    }
    Ok(settings)
}

fn cell_index(number: u32) -> usize {
    number as usize - 1
}

fn print_cells(app: &NotebookApp) {
    for (index, cell) in app.notebook().iter().enumerate() {
        let first_line = cell.code.lines().find(|line| !line.trim().is_empty());
        let lines = cell.code.lines().count();
        println!(
            "{:>3}  {:<11} {:<24} {} line{}{}",
            index + 1,
            cell.language,
            if cell.title.is_empty() {
                "(untitled)"
            } else {
                cell.title.as_str()
            },
            lines,
            if lines == 1 { "" } else { "s" },
            first_line
                .map(|line| format!("  {}", line.trim()))
                .unwrap_or_default()
        );
    }
}

fn execute_config_command(command: ConfigCommand, config_path: &Path) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            let store = PreferencesStore::load(config_path)?;
            println!("# {}", store.path().display());
            println!(
                "{}",
                serde_json::to_string_pretty(store.preferences())
                    .context("serialize preferences")?
            );
        }
        ConfigCommand::Set { key, value } => {
            if !Preferences::KEYS.contains(&key.as_str()) {
                bail!(
                    "unknown preference key '{key}'; expected one of: {}",
                    Preferences::KEYS.join(", ")
                );
            }
            let mut store = PreferencesStore::load(config_path)?;
            store.set(&key, &value)?;
            println!("Updated {key} in {}", store.path().display());
        }
    }
    Ok(())
}
