use clap::{Parser, ValueEnum};
use fsroute::config::{Config, DEFAULT_CONFIG_PATH};
use fsroute::logger;
use fsroute::{FileSystem, Found, Resolution, Resolver, TargetKind};
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

/// Resolve request paths against a directory tree
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Config file path (extension optional)
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH, value_hint = clap::ValueHint::FilePath)]
    config: String,

    /// Directory request paths are resolved against
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    base_dir: Option<String>,

    /// Accepted extension, most preferred first (repeatable or comma-separated)
    #[arg(short, long = "ext", value_name = "EXT", value_delimiter = ',')]
    extensions: Vec<String>,

    /// Keep literal default page segments instead of redirecting
    #[arg(long)]
    no_squash: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Print the effective configuration and exit
    #[arg(long)]
    dump_config: bool,

    /// Request paths; read one per line from stdin when none are given
    #[arg(value_name = "PATH")]
    paths: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

impl Cli {
    /// Fold command-line overrides into the loaded configuration
    fn apply(&self, cfg: &mut Config) {
        if let Some(ref base_dir) = self.base_dir {
            cfg.resolver.base_dir.clone_from(base_dir);
        }
        if !self.extensions.is_empty() {
            cfg.resolver.extensions.clone_from(&self.extensions);
        }
        if self.no_squash {
            cfg.resolver.squash_default_page = false;
        }
    }
}

fn main() -> Result<ExitCode, Box<dyn Error>> {
    let cli = Cli::parse();
    let mut cfg = Config::load_from(&cli.config)?;
    cli.apply(&mut cfg);

    if cli.dump_config {
        print!("{}", cfg.to_toml()?);
        return Ok(ExitCode::SUCCESS);
    }

    logger::init(&cfg)?;
    logger::log_startup(&cfg);

    let resolver = Resolver::new(&cfg.resolver.base_dir, cfg.resolve_options());
    let paths: Vec<String> = if cli.paths.is_empty() {
        read_paths(io::stdin().lock())?
    } else {
        cli.paths.clone()
    };

    let mut stdout = io::stdout().lock();
    let failed = resolve_all(&resolver, &paths, cli.format, &cfg, &mut stdout)?;
    stdout.flush()?;
    logger::log_info(&format!("Resolved {} path(s), {failed} failed", paths.len()));

    Ok(if failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Resolve every path and write one result line each to `out`
///
/// Returns how many paths failed. Logging never goes to `out`.
fn resolve_all<F: FileSystem>(
    resolver: &Resolver<F>,
    paths: &[String],
    format: OutputFormat,
    cfg: &Config,
    out: &mut impl Write,
) -> io::Result<usize> {
    let mut failed = 0;
    for path in paths {
        let line = match resolver.resolve(path.as_str()) {
            Ok(resolution) => render(format, path, &resolution, cfg),
            Err(e) => {
                failed += 1;
                render_error(format, path, &e)
            }
        };
        writeln!(out, "{line}")?;
    }
    Ok(failed)
}

/// Non-blank lines of `input`, trimmed
fn read_paths(input: impl BufRead) -> io::Result<Vec<String>> {
    let mut paths = Vec::new();
    for line in input.lines() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            paths.push(trimmed.to_string());
        }
    }
    Ok(paths)
}

fn render(format: OutputFormat, path: &str, resolution: &Resolution, cfg: &Config) -> String {
    match format {
        OutputFormat::Text => render_text(resolution, cfg),
        OutputFormat::Json => render_json(path, resolution, cfg).to_string(),
    }
}

fn render_text(resolution: &Resolution, cfg: &Config) -> String {
    match resolution {
        Resolution::Redirect(redirect) => format!(
            "REDIRECT {}",
            redirect.location_with_base(&cfg.resolver.redirect_base)
        ),
        Resolution::Found(found) => {
            let mut line = format!("FOUND {}", relative_target(found));
            for param in &found.params {
                line.push_str(&format!(" {}={}", param.name, param.value));
            }
            line
        }
        Resolution::NotFound => "NOT FOUND".to_string(),
    }
}

fn render_json(path: &str, resolution: &Resolution, cfg: &Config) -> serde_json::Value {
    match resolution {
        Resolution::Redirect(redirect) => serde_json::json!({
            "path": path,
            "outcome": resolution.label(),
            "location": redirect.location_with_base(&cfg.resolver.redirect_base),
        }),
        Resolution::Found(found) => {
            let (kind, has_template) = match found.kind(cfg.resolver.template_extension.as_deref()) {
                TargetKind::Template => ("template", true),
                TargetKind::Module { has_template } => ("module", has_template),
            };
            serde_json::json!({
                "path": path,
                "outcome": resolution.label(),
                "file": relative_target(found),
                "extensions": found.extensions,
                "params": found.params,
                "kind": kind,
                "has_template": has_template,
            })
        }
        Resolution::NotFound => serde_json::json!({
            "path": path,
            "outcome": resolution.label(),
        }),
    }
}

fn render_error(format: OutputFormat, path: &str, err: &fsroute::ResolveError) -> String {
    match format {
        OutputFormat::Text => "ERROR".to_string(),
        OutputFormat::Json => serde_json::json!({
            "path": path,
            "outcome": "error",
            "error": err.to_string(),
        })
        .to_string(),
    }
}

/// Matched file relative to the base directory, with `/` separators
fn relative_target(found: &Found) -> String {
    let parent = found
        .file_path
        .parent()
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .unwrap_or_default();
    if parent.is_empty() {
        found.filename.clone()
    } else {
        format!("{parent}/{}", found.filename)
    }
}
