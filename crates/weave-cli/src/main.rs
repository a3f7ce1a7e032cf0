use anyhow::{Context, Result, anyhow};
use std::{
    env, fs,
    io::{self, Read},
    process,
    sync::Arc,
};
use weave_config::Config;
use weave_engine::{Cmd, Editor, Schema};

const COMMANDS: &str =
    "delete, backspace, delete-forward, enter, bold, italic, underline, strike";

fn usage(program: &str) -> ! {
    eprintln!("Usage: {program} <markup-file|-> [command...]");
    eprintln!("Commands: {COMMANDS}");
    eprintln!("Selection markers in the markup: '[' anchor, ']' focus");
    process::exit(1);
}

fn read_input(source: &str) -> Result<String> {
    if source == "-" {
        let mut input = String::new();
        io::stdin()
            .read_to_string(&mut input)
            .context("Failed to read markup from stdin")?;
        return Ok(input);
    }
    fs::read_to_string(source).with_context(|| format!("Failed to read markup file '{source}'"))
}

fn run(source: &str, commands: &[String]) -> Result<()> {
    let config = Config::load_or_default().with_context(|| {
        format!(
            "Failed to load config file '{}'",
            Config::config_path().display()
        )
    })?;
    let schema = Arc::new(Schema::from_config(&config));

    let input = read_input(source)?;
    let mut editor = Editor::from_markup_with_schema(input.trim_end(), schema)
        .map_err(|e| anyhow!("Invalid markup in '{source}': {e}"))?;

    for name in commands {
        let cmd = Cmd::from_name(name)
            .ok_or_else(|| anyhow!("Unknown command '{name}' (expected one of: {COMMANDS})"))?;
        let patch = editor
            .apply(cmd)
            .with_context(|| format!("Command '{name}' failed"))?;
        log::info!(
            "{name}: changed={} version={}",
            patch.changed,
            patch.version
        );
    }

    println!("{}", editor.render());
    Ok(())
}

/// Logger reading its filter from `var`, at `info` when the variable is unset.
fn logger(var: &str) -> env_logger::Builder {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or(var, "info"))
}

fn main() {
    logger(env_logger::DEFAULT_FILTER_ENV).init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        usage(args.first().map_or("weave-cli", String::as_str));
    }

    if let Err(e) = run(&args[1], &args[2..]) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::LevelFilter;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_logger_defaults_to_info() {
        let logger = logger("WEAVE_CLI_TEST_LOG_UNSET").build();
        assert_eq!(logger.filter(), LevelFilter::Info);
    }

    #[test]
    fn test_logger_env_level_wins_over_default() {
        // SAFETY: the variable is only read by this test.
        unsafe { env::set_var("WEAVE_CLI_TEST_LOG_TRACE", "trace") };
        let logger = logger("WEAVE_CLI_TEST_LOG_TRACE").build();
        assert_eq!(logger.filter(), LevelFilter::Trace);

        unsafe { env::set_var("WEAVE_CLI_TEST_LOG_WARN", "warn") };
        let logger = super::logger("WEAVE_CLI_TEST_LOG_WARN").build();
        assert_eq!(logger.filter(), LevelFilter::Warn);
    }
}
