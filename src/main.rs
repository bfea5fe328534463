// Main entry point for xrtestify

use anyhow::Result;
use clap::Parser;
use tracing::{error, info, warn};

use xrtestify::cli::{Cli, Commands, ListArgs, LogFormat, RunArgs};
use xrtestify::config::{self, Config};
use xrtestify::execution::SuiteRunner;
use xrtestify::logging;
use xrtestify::parser;
use xrtestify::report::{ConsoleReporter, JsonReporter, JunitReporter, Reporter};
use xrtestify::state::TestSuiteResult;
use xrtestify::utils::FileUtils;

use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    // Load configuration from file (if exists)
    let config = Config::load();

    let cli = Cli::parse();
    logging::init(cli.verbose);

    if cli.verbose {
        info!("Starting xrtestify v{}", env!("CARGO_PKG_VERSION"));
    }

    if cli.config {
        print_configuration(&cli, config.as_ref());
        return Ok(());
    }

    if let Some(config_file) = &cli.init_config {
        let toml_content = Config::default().to_toml();
        FileUtils::write_file(config_file, &toml_content)?;
        println!("Configuration file created: {}", config_file.display());
        println!("\nYou can now edit the file to customize your settings.");
        print_precedence();
        return Ok(());
    }

    if let Some(shell_type) = &cli.completion {
        return handle_completion(shell_type);
    }

    let success = match &cli.command {
        Some(Commands::List(args)) => handle_list(args)?,
        Some(Commands::Run(args)) => run_tests(&cli, args, config.as_ref())?,
        None => {
            // Implicit Run
            let args = &cli.run_args;
            if args.test_paths.is_empty() {
                warn!("No test files provided. Use 'xrtestify --help' for usage.");
                return Ok(());
            }
            run_tests(&cli, args, config.as_ref())?
        }
    };

    if !success {
        std::process::exit(1);
    }
    Ok(())
}

fn print_precedence() {
    println!("\nConfiguration precedence:");
    println!("  1. Command-line arguments (highest)");
    println!("  2. Configuration file");
    println!("  3. Environment variables");
    println!("  4. Built-in defaults (lowest)");
}

fn print_configuration(cli: &Cli, config: Option<&Config>) {
    let args = cli.get_run_args();
    let display = cli.display_options(config.map(|c| c.output).unwrap_or_default());

    println!("Current configuration:");
    println!("    Crossplane: {}", cli.crossplane(config));
    println!("    Sort mode: {}", args.sort);
    println!("    Verbose: {}", display.verbose);
    println!("    Show render: {}", display.show_render);
    println!("    Show validate: {}", display.show_validate);
    println!("    Show hooks: {}", display.show_hooks);
    println!("    Show assertions: {}", display.show_assertions);
    if let Some(log_format) = &args.log_format {
        println!("    Log format: {}", log_format);
    }
    if let Some(log_output) = &args.log_output {
        println!("    Log output: {}", log_output.display());
    }

    match config {
        Some(_) => println!("\n  Configuration file loaded"),
        None => {
            println!("\n  No configuration file loaded");
            println!(
                "  Create one with: xrtestify --init-config {}",
                config::CONFIG_FILE_NAME
            );
        }
    }

    println!("\n  Environment variables:");
    match std::env::var(config::ENV_XRTESTIFY_CROSSPLANE) {
        Ok(value) => println!("    {}: {}", config::ENV_XRTESTIFY_CROSSPLANE, value),
        Err(_) => println!(
            "    {}: not set (default: crossplane)",
            config::ENV_XRTESTIFY_CROSSPLANE
        ),
    }

    print_precedence();
}

fn handle_completion(shell_type: &str) -> Result<()> {
    use clap::CommandFactory;
    use clap_complete::{Shell, generate};

    let shell = match shell_type {
        "bash" => Shell::Bash,
        "zsh" => Shell::Zsh,
        "fish" => Shell::Fish,
        "elvish" => Shell::Elvish,
        "powershell" => Shell::PowerShell,
        _ => {
            eprintln!("Error: Unsupported shell type '{}'", shell_type);
            eprintln!("Supported shells: bash, zsh, fish, elvish, powershell");
            return Err(anyhow::anyhow!("Unsupported shell type"));
        }
    };

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, &bin_name, &mut std::io::stdout());

    Ok(())
}

fn collect_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            files.extend(FileUtils::collect_test_files(path));
        } else if path.is_file() {
            files.push(path.clone());
        } else {
            anyhow::bail!("Path not found: {}", path.display());
        }
    }
    Ok(files)
}

fn handle_list(args: &ListArgs) -> Result<bool> {
    let path = args.path.as_deref().unwrap_or_else(|| Path::new("."));
    let mut files = collect_files(&[path.to_path_buf()])?;
    FileUtils::sort_files(&mut files, "path");

    let mut ok = true;
    let mut listing = Vec::new();
    for file in &files {
        match parser::parse_test_file(file) {
            Ok(test_file) => {
                let tests: Vec<serde_json::Value> = test_file
                    .tests
                    .iter()
                    .map(|test| serde_json::json!({ "name": test.name, "id": test.id }))
                    .collect();
                listing.push(serde_json::json!({
                    "file": file.to_string_lossy().replace('\\', "/"),
                    "tests": tests,
                }));
            }
            Err(e) => {
                error!("{:#}", e);
                ok = false;
            }
        }
    }

    if args.is_json() {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({ "files": listing }))?
        );
    } else {
        for entry in &listing {
            println!("{}", entry["file"].as_str().unwrap_or_default());
            for test in entry["tests"].as_array().into_iter().flatten() {
                println!("    {}", test["name"].as_str().unwrap_or_default());
            }
        }
    }

    Ok(ok)
}

fn build_reporters(cli: &Cli, args: &RunArgs) -> Vec<Box<dyn Reporter>> {
    let mut reporters: Vec<Box<dyn Reporter>> = vec![Box::new(ConsoleReporter::stdout())];

    if let Some(format) = cli.log_format_mode() {
        match &args.log_output {
            Some(output_path) => match format {
                LogFormat::Json => reporters.push(Box::new(JsonReporter::new(output_path.clone()))),
                LogFormat::JUnit => {
                    reporters.push(Box::new(JunitReporter::new(output_path.clone())))
                }
            },
            None => warn!(
                "--log-format specified but --log-output is missing. File report will be skipped."
            ),
        }
    }

    reporters
}

/// Run every collected file; false when anything failed
fn run_tests(cli: &Cli, args: &RunArgs, config: Option<&Config>) -> Result<bool> {
    let mut test_files = collect_files(&args.test_paths)?;
    info!("Found {} test file(s)", test_files.len());

    if test_files.is_empty() {
        warn!("No test files found");
        return Ok(true);
    }

    FileUtils::sort_files(&mut test_files, &args.sort);

    let display = cli.display_options(config.map(|c| c.output).unwrap_or_default());
    let runner = SuiteRunner::new(cli.crossplane(config), display);
    info!("Using {}", runner.crossplane());

    let reporters = build_reporters(cli, args);
    let mut suites: Vec<TestSuiteResult> = Vec::with_capacity(test_files.len());
    let mut load_failures = 0;

    for file in &test_files {
        let file_path_str = file.to_string_lossy().to_string();
        for r in &reporters {
            r.on_suite_start(&file_path_str);
        }

        let suite = match runner.run_file(file) {
            Ok(suite) => suite,
            Err(e) => {
                error!("{:#}", e);
                load_failures += 1;
                continue;
            }
        };

        for r in &reporters {
            if let Err(e) = r.on_suite_end(&suite) {
                error!("Reporter error: {:#}", e);
            }
        }
        suites.push(suite);
    }

    for r in &reporters {
        if let Err(e) = r.on_run_end(&suites) {
            error!("Reporter error: {:#}", e);
        }
    }

    Ok(load_failures == 0 && !suites.iter().any(TestSuiteResult::has_failures))
}
