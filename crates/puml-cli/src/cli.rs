//! Command-line interface for the puml utility
//!
//! Reads a PlantUML file and either writes the first diagram as a sibling
//! `.json` file or prints the input together with its parsed form.

use anyhow::{anyhow, Result};
use clap::{Parser, ValueEnum};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use puml::core::logging::init_logging;
use puml::core::{Formatter, Parser as _};
use puml::plugins::class::{DefaultFormatter, Diagram, OutlineFormatter, PlantUmlParser};
use puml::{json_output_path, to_json, DiagramError};

/// Printed when no input file is given
pub const USAGE: &str = "This tool turns a PlantUML file into JSON.\nUsage: puml <plantuml-file>";

/// puml - Convert PlantUML class diagrams to JSON
#[derive(Parser)]
#[command(name = "puml")]
#[command(about = "A Rust utility to convert PlantUML class diagrams to JSON")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    /// PlantUML input file (use - for stdin)
    pub input: Option<PathBuf>,

    /// Print the input and its parsed form instead of writing a JSON file
    #[arg(short, long)]
    pub print: bool,

    /// Output file (use - for stdout); defaults to the input path with a .json extension
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write every diagram as a JSON array instead of only the first one
    #[arg(long)]
    pub all: bool,

    /// Formatter used by --print
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Set log level (trace|debug|info|warn|error)
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    /// Set log format (compact|pretty|json)
    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Log level options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

/// Rendering used by --print
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Pretty-printed JSON array of every diagram
    #[default]
    Json,
    /// Indented text summary
    Outline,
}

/// Main CLI application
pub struct PumlApp {
    parser: PlantUmlParser,
}

impl PumlApp {
    pub fn new() -> Self {
        Self {
            parser: PlantUmlParser::new(),
        }
    }

    /// Run the application with the given CLI arguments
    pub fn run(&self, cli: Cli) -> Result<()> {
        // Environment variables take precedence over flags
        let log_level_str = std::env::var("PUML_LOG_LEVEL")
            .ok()
            .or_else(|| std::env::var("RUST_LOG").ok())
            .unwrap_or_else(|| cli.log_level.as_str().to_string());

        let log_format_str = std::env::var("PUML_LOG_FORMAT")
            .ok()
            .unwrap_or_else(|| cli.log_format.as_str().to_string());

        if let Err(e) = init_logging(Some(&log_level_str), Some(&log_format_str)) {
            eprintln!("Warning: Failed to initialize logging: {}", e);
        }

        if cli.verbose {
            eprintln!("puml v{}", env!("CARGO_PKG_VERSION"));
        }

        let Some(input) = cli.input else {
            println!("{}", USAGE);
            return Ok(());
        };

        let content = self.read_input(&input)?;
        info!(path = %input.display(), bytes = content.len(), "Read input");
        if cli.verbose {
            eprintln!("Read {} bytes of input", content.len());
        }

        // The write variant needs a diagram; fail before parsing when there is none
        if !cli.print && !self.parser.can_parse(&content) {
            return Err(DiagramError::empty_input(input.display().to_string()).into());
        }

        let diagrams = self.parser.parse(&content)?;
        info!(
            parser = self.parser.name(),
            version = self.parser.version(),
            diagrams = diagrams.len(),
            "Parsed input"
        );
        if cli.verbose {
            eprintln!(
                "Parsed {} diagram(s) with {} parser v{}",
                diagrams.len(),
                self.parser.name(),
                self.parser.version()
            );
        }

        if cli.print {
            let printed = self.render_print(&content, &diagrams, cli.format)?;
            self.write_output(Path::new("-"), &printed)
        } else {
            self.write_command(&input, cli.output, &diagrams, cli.all)
        }
    }

    /// Raw input followed by the formatted diagrams
    pub fn render_print(
        &self,
        content: &str,
        diagrams: &[Diagram],
        format: OutputFormat,
    ) -> Result<String> {
        let formatter: Box<dyn Formatter<Diagram>> = match format {
            OutputFormat::Json => Box::new(DefaultFormatter::new()),
            OutputFormat::Outline => Box::new(OutlineFormatter::new()),
        };
        debug!(formatter = formatter.name(), diagrams = diagrams.len(), "Formatting diagrams");
        let formatted = formatter.format(diagrams)?;

        let mut printed = String::with_capacity(content.len() + formatted.len() + 2);
        printed.push_str(content);
        if !content.is_empty() && !content.ends_with('\n') {
            printed.push('\n');
        }
        printed.push_str(&formatted);
        Ok(printed)
    }

    /// Serialize the first diagram (or all of them) and write it next to the input.
    ///
    /// A failed write is logged and does not fail the run.
    fn write_command(
        &self,
        input: &Path,
        output: Option<PathBuf>,
        diagrams: &[Diagram],
        all: bool,
    ) -> Result<()> {
        let first = diagrams
            .first()
            .ok_or_else(|| DiagramError::empty_input(input.display().to_string()))?;

        let json = if all {
            to_json(diagrams)?
        } else {
            to_json(first)?
        };

        let target = match output {
            Some(path) => path,
            None if is_stdio(input) => PathBuf::from("-"),
            None => json_output_path(input),
        };

        match self.write_output(&target, &json) {
            Ok(()) => info!(path = %target.display(), bytes = json.len(), "Wrote JSON output"),
            Err(e) => error!(path = %target.display(), error = %e, "Failed to write JSON output"),
        }
        Ok(())
    }

    /// Read input from file or stdin
    pub fn read_input(&self, input: &Path) -> Result<String> {
        if is_stdio(input) {
            let mut content = String::new();
            io::stdin().read_to_string(&mut content)?;
            Ok(content)
        } else {
            fs::read_to_string(input)
                .map_err(|e| anyhow!("Failed to read input file '{}': {}", input.display(), e))
        }
    }

    /// Write output to file or stdout
    pub fn write_output(&self, output: &Path, content: &str) -> Result<()> {
        if is_stdio(output) {
            let mut stdout = io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            if !content.is_empty() && !content.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
            stdout.flush()?;
        } else {
            fs::write(output, content).map_err(|e| {
                anyhow!("Failed to write output file '{}': {}", output.display(), e)
            })?;
        }
        Ok(())
    }
}

impl Default for PumlApp {
    fn default() -> Self {
        Self::new()
    }
}

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == "-"
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use tempfile::tempdir;

    const SOURCE: &str = "@startuml first\nclass A\n@enduml\n@startuml second\nclass B\n@enduml\n";

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["puml"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_cli_parsing_defaults() {
        let cli = cli(&["model.puml"]);
        assert_eq!(cli.input.unwrap().to_string_lossy(), "model.puml");
        assert!(!cli.print);
        assert!(!cli.all);
        assert!(cli.output.is_none());
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.log_level, LogLevel::Warn);
        assert_eq!(cli.log_format, LogFormat::Compact);
    }

    #[test]
    fn test_cli_parsing_flags() {
        let cli = cli(&[
            "--print",
            "--format",
            "outline",
            "-o",
            "out.json",
            "--all",
            "--log-level",
            "debug",
            "--log-format",
            "json",
            "-v",
            "model.puml",
        ]);
        assert!(cli.print);
        assert!(cli.all);
        assert!(cli.verbose);
        assert_eq!(cli.format, OutputFormat::Outline);
        assert_eq!(cli.output.unwrap().to_string_lossy(), "out.json");
        assert_eq!(cli.log_level, LogLevel::Debug);
        assert_eq!(cli.log_format, LogFormat::Json);
    }

    #[test]
    fn test_cli_parsing_without_input() {
        assert!(cli(&[]).input.is_none());
    }

    #[test]
    fn test_read_input_from_file() {
        let app = PumlApp::new();
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("model.puml");
        fs::write(&file_path, SOURCE).unwrap();

        assert_eq!(app.read_input(&file_path).unwrap(), SOURCE);
    }

    #[test]
    fn test_read_input_missing_file() {
        let app = PumlApp::new();
        let dir = tempdir().unwrap();
        let err = app.read_input(&dir.path().join("missing.puml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read input file"));
    }

    #[test]
    fn test_write_output_to_file() {
        let app = PumlApp::new();
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("out.json");

        app.write_output(&file_path, "[]").unwrap();
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "[]");
    }

    #[test]
    fn test_write_command_writes_first_diagram() {
        let app = PumlApp::new();
        let dir = tempdir().unwrap();
        let input = dir.path().join("model.puml");
        let diagrams = app.parser.parse(SOURCE).unwrap();

        app.write_command(&input, None, &diagrams, false).unwrap();

        let written = fs::read_to_string(dir.path().join("model.json")).unwrap();
        assert_eq!(written, to_json(&diagrams[0]).unwrap());
    }

    #[test]
    fn test_write_command_all() {
        let app = PumlApp::new();
        let dir = tempdir().unwrap();
        let input = dir.path().join("model.puml");
        let target = dir.path().join("all.json");
        let diagrams = app.parser.parse(SOURCE).unwrap();

        app.write_command(&input, Some(target.clone()), &diagrams, true)
            .unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(target).unwrap()).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_write_command_empty_is_error() {
        let app = PumlApp::new();
        let dir = tempdir().unwrap();
        let input = dir.path().join("empty.puml");

        let err = app.write_command(&input, None, &[], false).unwrap_err();
        assert!(err.to_string().contains("No @startuml block found"));
        assert!(!dir.path().join("empty.json").exists());
    }

    #[test]
    fn test_write_command_failure_is_not_fatal() {
        let app = PumlApp::new();
        let dir = tempdir().unwrap();
        let input = dir.path().join("model.puml");
        let target = dir.path().join("missing").join("model.json");
        let diagrams = app.parser.parse(SOURCE).unwrap();

        assert!(app.write_command(&input, Some(target.clone()), &diagrams, false).is_ok());
        assert!(!target.exists());
    }

    #[test]
    fn test_render_print_json() {
        let app = PumlApp::new();
        let diagrams = app.parser.parse(SOURCE).unwrap();
        let printed = app
            .render_print(SOURCE, &diagrams, OutputFormat::Json)
            .unwrap();

        assert!(printed.starts_with(SOURCE));
        let json: serde_json::Value = serde_json::from_str(&printed[SOURCE.len()..]).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_render_print_outline() {
        let app = PumlApp::new();
        let diagrams = app.parser.parse(SOURCE).unwrap();
        let printed = app
            .render_print("@startuml\n@enduml", &diagrams, OutputFormat::Outline)
            .unwrap();

        assert!(printed.starts_with("@startuml\n@enduml\n"));
        assert!(printed.contains("diagram 1 first"));
        assert!(printed.contains("diagram 2 second"));
    }

    #[test]
    fn test_run_without_input_succeeds() {
        let app = PumlApp::default();
        assert!(app.run(cli(&[])).is_ok());
    }

    #[test]
    fn test_run_parse_error_fails() {
        let app = PumlApp::new();
        let dir = tempdir().unwrap();
        let input = dir.path().join("bad.puml");
        fs::write(&input, "@startuml\nclass A {\n").unwrap();

        let err = app
            .run(cli(&[input.to_str().unwrap()]))
            .unwrap_err();
        assert!(err.to_string().starts_with("Parse error:"));
        assert!(!dir.path().join("bad.json").exists());
    }

    #[test]
    fn test_run_write_without_block_fails_before_parsing() {
        let app = PumlApp::new();
        let dir = tempdir().unwrap();
        let input = dir.path().join("notes.puml");
        // Would be a parse error if it reached the parser
        fs::write(&input, "@enduml
").unwrap();

        let err = app.run(cli(&[input.to_str().unwrap()])).unwrap_err();
        assert!(err.to_string().contains("No @startuml block found"));
        assert!(!dir.path().join("notes.json").exists());
    }

    #[test]
    fn test_run_print_without_block_succeeds() {
        let app = PumlApp::new();
        let dir = tempdir().unwrap();
        let input = dir.path().join("notes.puml");
        fs::write(&input, "just notes\n").unwrap();

        assert!(app.run(cli(&["--print", input.to_str().unwrap()])).is_ok());
        assert!(!dir.path().join("notes.json").exists());
    }

    #[test]
    fn test_is_stdio() {
        assert!(is_stdio(Path::new("-")));
        assert!(!is_stdio(Path::new("-.puml")));
    }
}
