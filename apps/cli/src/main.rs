use std::fs;
use std::io::{self, BufRead, Read};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use codegenius_catalog::{LanguageId, CATALOG};
use codegenius_controller::GENERATION_FAILED_MESSAGE;
use codegenius_generation::{CodeGenerator, GeminiService};
use codegenius_preview::{select_mode, PreviewEngine, RelayOutcome, RenderMode, ResourceStore};
use codegenius_settings::{default_preferences_path, PreferencesStore};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "codegenius-cli",
    about = "Generate code from a description and preview it",
    author,
    version
)]
struct Cli {
    /// 偏好設定檔路徑。 / Preferences file (defaults to the user config directory).
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    /// 提高記錄詳細程度。 / Increase log verbosity (-v, -vv).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 列出支援的語言。 / List supported languages and how they are previewed.
    Languages,
    /// 依描述產生程式碼。 / Generate code from a natural-language description.
    Generate(GenerateArgs),
    /// 建立預覽文件或模擬輸出。 / Build the preview document or simulated transcript.
    Preview(PreviewArgs),
    /// 將預覽區的主控台訊息轉為輸出紀錄。 / Feed console messages (JSON lines on stdin) through the relay.
    Relay(RelayArgs),
    /// 管理偏好設定。 / Manage preferences.
    #[command(subcommand)]
    Preferences(PreferencesCommand),
}

#[derive(Args)]
struct GenerateArgs {
    /// 目標語言。 / Target language (display name or alias).
    #[arg(long, short)]
    language: LanguageId,
    /// 需求描述。 / Description of the code to generate.
    #[arg(long, short)]
    prompt: String,
    /// 輸出檔案；預設寫到標準輸出。 / Write the code here instead of stdout.
    #[arg(long, short)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct PreviewArgs {
    /// 程式碼檔案；省略時讀取標準輸入。 / Code file; stdin when omitted.
    input: Option<PathBuf>,
    /// 語言；省略時依副檔名判斷。 / Language; inferred from the file extension when omitted.
    #[arg(long, short)]
    language: Option<LanguageId>,
    /// 預覽文件輸出路徑。 / Write the document or transcript here instead of stdout.
    #[arg(long, short)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct RelayArgs {
    /// 程式碼檔案。 / Code file to run.
    input: PathBuf,
    /// 語言；省略時依副檔名判斷。 / Language; inferred from the file extension when omitted.
    #[arg(long, short)]
    language: Option<LanguageId>,
}

#[derive(Subcommand)]
enum PreferencesCommand {
    /// 顯示目前設定。 / Print the effective preferences as JSON.
    Show,
    /// 寫出預設設定檔。 / Write a preferences file with default values.
    Init {
        /// 覆寫既有檔案。 / Overwrite an existing file.
        #[arg(long)]
        force: bool,
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
        config,
        verbose,
        command,
    } = Cli::parse();
    init_logging(verbose);
    let config_path = config.unwrap_or_else(default_preferences_path);
    match command {
        Commands::Languages => execute_languages(),
        Commands::Generate(args) => execute_generate(args, &config_path),
        Commands::Preview(args) => execute_preview(args),
        Commands::Relay(args) => execute_relay(args),
        Commands::Preferences(command) => execute_preferences(command, &config_path),
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn execute_languages() -> Result<()> {
    for info in CATALOG.iter() {
        let mode = match select_mode(info.id) {
            RenderMode::WebDocument => "web-document",
            RenderMode::Simulated => "simulated",
        };
        println!(
            "{:<12} {:<13} .{:<6} {}",
            info.display_name,
            mode,
            info.extension,
            info.icon.as_str()
        );
    }
    Ok(())
}

fn execute_generate(args: GenerateArgs, config_path: &Path) -> Result<()> {
    if args.prompt.trim().is_empty() {
        bail!("prompt must not be empty");
    }
    let store = PreferencesStore::load(config_path)
        .with_context(|| format!("failed to load preferences from {}", config_path.display()))?;
    let prefs = &store.preferences().generation;
    let service = GeminiService::from_env(prefs.endpoint.clone(), &prefs.api_key_vars())
        .map_err(|err| anyhow!("failed to prepare generation client: {err}"))?;
    let generator = CodeGenerator::new(service, prefs.model.clone());

    info!(language = %args.language, model = %generator.model(), "generating");
    let code = generator
        .generate(args.language, &args.prompt)
        .map_err(|_| anyhow!(GENERATION_FAILED_MESSAGE))?;
    write_output(args.output.as_deref(), &code)
}

fn execute_preview(args: PreviewArgs) -> Result<()> {
    let language = resolve_language(args.language, args.input.as_deref())?;
    let code = read_code(args.input.as_deref())?;

    let mut engine = PreviewEngine::new(language);
    let mode = engine.run_now(&code)?.mode();
    let output = match mode {
        RenderMode::WebDocument => {
            let url = engine
                .surface_handle()
                .map(|handle| handle.url().to_string())
                .ok_or_else(|| anyhow!("preview produced no document"))?;
            debug!(%url, "preview document ready");
            engine
                .store()
                .resolve(&url)
                .ok_or_else(|| anyhow!("preview document {url} was released"))?
                .to_string()
        }
        RenderMode::Simulated => render_transcript(&engine),
    };
    write_output(args.output.as_deref(), &output)
}

fn execute_relay(args: RelayArgs) -> Result<()> {
    let language = resolve_language(args.language, Some(&args.input))?;
    let code = read_code(Some(&args.input))?;

    let mut engine = PreviewEngine::new(language);
    engine.run_now(&code)?;

    let stdin = io::stdin();
    let mut ignored = 0usize;
    let mut stale = 0usize;
    for line in stdin.lock().lines() {
        let line = line.context("failed to read relay input")?;
        if line.trim().is_empty() {
            continue;
        }
        match engine.relay_raw(&line) {
            RelayOutcome::Appended => {}
            RelayOutcome::Stale => stale += 1,
            RelayOutcome::Ignored | RelayOutcome::NoSession => ignored += 1,
        }
    }
    if ignored + stale > 0 {
        info!(ignored, stale, "relay dropped messages");
    }
    print!("{}", render_transcript(&engine));
    Ok(())
}

fn execute_preferences(command: PreferencesCommand, config_path: &Path) -> Result<()> {
    match command {
        PreferencesCommand::Show => {
            let store = PreferencesStore::load(config_path).with_context(|| {
                format!("failed to load preferences from {}", config_path.display())
            })?;
            let payload = serde_json::to_string_pretty(store.preferences())
                .context("failed to serialize preferences")?;
            println!("{payload}");
        }
        PreferencesCommand::Init { force } => {
            if config_path.exists() && !force {
                bail!(
                    "preferences file '{}' already exists (use --force to overwrite)",
                    config_path.display()
                );
            }
            let store = PreferencesStore::new(config_path, Default::default());
            store
                .save()
                .with_context(|| format!("failed to write {}", config_path.display()))?;
            println!("Wrote default preferences to {}", store.path().display());
        }
    }
    Ok(())
}

fn resolve_language(explicit: Option<LanguageId>, input: Option<&Path>) -> Result<LanguageId> {
    if let Some(language) = explicit {
        return Ok(language);
    }
    let ext = input
        .and_then(|path| path.extension())
        .and_then(|ext| ext.to_str())
        .ok_or_else(|| anyhow!("--language is required when it cannot be inferred"))?;
    LanguageId::from_extension(ext)
        .ok_or_else(|| anyhow!("cannot infer language from extension '.{ext}'; pass --language"))
}

fn read_code(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut code = String::new();
            io::stdin()
                .read_to_string(&mut code)
                .context("failed to read code from stdin")?;
            Ok(code)
        }
    }
}

fn render_transcript<S: ResourceStore>(engine: &PreviewEngine<S>) -> String {
    let mut out = String::new();
    for line in engine.console() {
        if line.is_error() {
            out.push_str("[error] ");
        }
        out.push_str(line.text());
        out.push('\n');
    }
    out
}

fn write_output(path: Option<&Path>, contents: &str) -> Result<()> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            fs::write(path, contents)
                .with_context(|| format!("failed to write {}", path.display()))
        }
        None => {
            print!("{contents}");
            if !contents.ends_with('\n') {
                println!();
            }
            Ok(())
        }
    }
}
