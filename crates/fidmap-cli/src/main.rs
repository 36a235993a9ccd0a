use fidmap_core::{Announcement, Map, MapConfig, TagId};
use fidmap_render::{
    DEFAULT_TAG_SIZE_MM, LARGE_TAG_SIZE_MM, ReedSolomon84, SvgOptions, Units, render_map,
    write_map_svg, write_tag_svg,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io { path: PathBuf, source: std::io::Error },
    Map(fidmap_core::Error),
    Render(fidmap_render::Error),
    Json { path: PathBuf, source: serde_json::Error },
    Logging(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io { path, source } => write!(f, "I/O error on {}: {source}", path.display()),
            CliError::Map(err) => write!(f, "{err}"),
            CliError::Render(err) => write!(f, "{err}"),
            CliError::Json { path, source } => {
                write!(f, "invalid announcement in {}: {source}", path.display())
            }
            CliError::Logging(msg) => write!(f, "logging setup failed: {msg}"),
        }
    }
}

impl From<fidmap_core::Error> for CliError {
    fn from(value: fidmap_core::Error) -> Self {
        Self::Map(value)
    }
}

impl From<fidmap_render::Error> for CliError {
    fn from(value: fidmap_render::Error) -> Self {
        Self::Render(value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Command {
    #[default]
    Build,
    Render,
    Tags,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    inputs: Vec<String>,
    config: Option<String>,
    dir: Option<String>,
    name: Option<String>,
    svg: Option<String>,
    out: Option<String>,
    units: Units,
    log: Option<String>,
    verbose: bool,
    large: bool,
    no_border: bool,
}

fn usage() -> &'static str {
    "fidmap-cli\n\
\n\
USAGE:\n\
  fidmap-cli build  [--config <cfg.json>] [--dir <dir>] [--name <base>] [--svg <file>] [--units in|cm|mm] [--log <file>] [--verbose] <announcements.jsonl>...\n\
  fidmap-cli render [--units in|cm|mm] [--out <file>] [--log <file>] [--verbose] <map.xml>\n\
  fidmap-cli tags   [-L] [--no-border] [--dir <dir>] [--log <file>] [--verbose] <id>...\n\
\n\
NOTES:\n\
  - build updates the map at every frame change, then saves <dir>/<base>.xml.\n\
  - render prints SVG to stdout unless --out is given.\n\
  - tags writes tag<ID>.svg per id; -L prints at ledger size.\n\
  - RUST_LOG overrides the log filter.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    let Some(command) = it.next() else {
        return Err(CliError::Usage(usage()));
    };
    args.command = match command.as_str() {
        "build" => Command::Build,
        "render" => Command::Render,
        "tags" => Command::Tags,
        _ => return Err(CliError::Usage(usage())),
    };

    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "--verbose" | "-v" => args.verbose = true,
            "-L" => args.large = true,
            "--no-border" => args.no_border = true,
            "--units" => {
                let Some(units) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.units = units
                    .parse::<Units>()
                    .map_err(|_| CliError::Usage(usage()))?;
            }
            "--config" | "--dir" | "--name" | "--svg" | "--out" | "--log" => {
                let Some(value) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                let slot = match a.as_str() {
                    "--config" => &mut args.config,
                    "--dir" => &mut args.dir,
                    "--name" => &mut args.name,
                    "--svg" => &mut args.svg,
                    "--out" => &mut args.out,
                    _ => &mut args.log,
                };
                *slot = Some(value.clone());
            }
            "--" => args.inputs.extend(it.by_ref().cloned()),
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            input => args.inputs.push(input.to_string()),
        }
    }

    let inputs_ok = match args.command {
        Command::Build | Command::Tags => !args.inputs.is_empty(),
        Command::Render => args.inputs.len() == 1,
    };
    if !inputs_ok {
        return Err(CliError::Usage(usage()));
    }
    Ok(args)
}

/// Installs a fmt subscriber on stderr, or on `log_file` when given.
fn setup_logging(verbose: bool, log_file: Option<&str>) -> Result<(), CliError> {
    let base_level = if verbose { "info" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(base_level))
        .map_err(|err| CliError::Logging(err.to_string()))?;

    let (console_layer, file_layer) = match log_file {
        Some(path) => {
            let file = std::fs::File::create(path).map_err(|source| CliError::Io {
                path: path.into(),
                source,
            })?;
            let layer = tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file));
            (None, Some(layer))
        }
        None => {
            let layer = tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr);
            (Some(layer), None)
        }
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|err| CliError::Logging(err.to_string()))
}

fn read_text(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn svg_options(units: Units) -> SvgOptions {
    let (width, height) = match units {
        Units::Inches => (8.0, 10.5),
        Units::Centimeters => (8.0 * 2.54, 10.5 * 2.54),
        Units::Millimeters => (8.0 * 25.4, 10.5 * 25.4),
    };
    SvgOptions {
        width,
        height,
        units,
        ..SvgOptions::default()
    }
}

fn build(args: &Args) -> Result<(), CliError> {
    let mut config = match &args.config {
        Some(path) => MapConfig::from_json_file(Path::new(path))?,
        None => MapConfig::default(),
    };
    if let Some(dir) = &args.dir {
        config.directory = PathBuf::from(dir);
    }
    if let Some(name) = &args.name {
        config.base_name = name.clone();
    }

    let mut map = Map::create(config)?;
    let mut frames = 0;
    for input in &args.inputs {
        let path = Path::new(input);
        let text = read_text(path)?;
        let records = Announcement::parse_json_lines(&text).map_err(|source| CliError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), records = records.len(), "replaying");
        frames += map.replay(&records)?;
    }
    map.save()?;

    if let Some(svg) = &args.svg {
        write_map_svg(&map, Path::new(svg), &svg_options(args.units))?;
    }
    eprintln!(
        "{frames} frames, {} tags, {} arcs",
        map.tag_count(),
        map.arc_count()
    );
    Ok(())
}

fn render(args: &Args) -> Result<(), CliError> {
    let path = Path::new(&args.inputs[0]);
    let (Some(stem), Some("xml")) = (
        path.file_stem().and_then(|s| s.to_str()),
        path.extension().and_then(|s| s.to_str()),
    ) else {
        return Err(CliError::Usage("render: the map file must end in .xml"));
    };
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let map = Map::load(MapConfig::new(directory, stem))?;
    let options = svg_options(args.units);

    match &args.out {
        Some(out) => write_map_svg(&map, Path::new(out), &options)?,
        None => {
            let svg = render_map(&map, &options)?;
            std::io::stdout()
                .lock()
                .write_all(svg.as_bytes())
                .map_err(|source| CliError::Io {
                    path: PathBuf::from("<stdout>"),
                    source,
                })?;
        }
    }
    Ok(())
}

fn tags(args: &Args) -> Result<(), CliError> {
    let ids = args
        .inputs
        .iter()
        .map(|id| id.parse::<TagId>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| CliError::Usage(usage()))?;
    let directory = PathBuf::from(args.dir.as_deref().unwrap_or("."));
    let size = if args.large {
        LARGE_TAG_SIZE_MM
    } else {
        DEFAULT_TAG_SIZE_MM
    };
    let encoder = ReedSolomon84::new();
    for id in ids {
        write_tag_svg(&directory, id, size, !args.no_border, &encoder)?;
    }
    Ok(())
}

fn run(args: Args) -> Result<(), CliError> {
    setup_logging(args.verbose, args.log.as_deref())?;
    match args.command {
        Command::Build => build(&args),
        Command::Render => render(&args),
        Command::Tags => tags(&args),
    }
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    match run(args) {
        Ok(()) => {}
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
