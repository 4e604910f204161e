use std::{
    io::{Read, Write},
    process::ExitCode,
};

use metromum::{
    stats::{algorithm_mix, compute_stats_with_progress, InputPattern},
    Algorithm, ConfigurationError,
};
use thiserror::Error;

const USAGE: &str = "\
usage:
    metromum digest [--seed N] [--algorithm NAME]... [FILE]...
    metromum bias [--bic] [--png] [--len N] [--rounds N] [NAME-FILTER]...";

#[derive(Debug, Error)]
enum CliError {
    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("{path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = match args.first().map(String::as_str) {
        Some("digest") => digest(&args[1..]),
        Some("bias") => bias(&args[1..]),
        Some("-h" | "--help") => {
            println!("{USAGE}");
            Ok(())
        }
        _ => Err(CliError::Usage(USAGE.to_string())),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("metromum: {err}");
            ExitCode::from(2)
        }
    }
}

/// Pulls the value following a flag.
fn flag_value<'a>(
    flag: &str,
    args: &mut impl Iterator<Item = &'a String>,
) -> Result<&'a str, CliError> {
    args.next()
        .map(String::as_str)
        .ok_or_else(|| CliError::Usage(format!("{flag} needs a value")))
}

fn parse_number(flag: &str, text: &str) -> Result<u64, CliError> {
    let parsed = match text.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => text.parse(),
    };
    parsed.map_err(|_| CliError::Usage(format!("{flag}: `{text}` is not a number")))
}

fn digest(args: &[String]) -> Result<(), CliError> {
    let mut seed = 0;
    let mut algorithms = Vec::new();
    let mut paths = Vec::new();

    let mut args = args.iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--seed" => seed = parse_number("--seed", flag_value("--seed", &mut args)?)?,
            "--algorithm" | "-a" => {
                algorithms.push(flag_value("--algorithm", &mut args)?.parse::<Algorithm>()?)
            }
            "-" => paths.push(arg.clone()),
            flag if flag.starts_with('-') => {
                return Err(CliError::Usage(format!("unknown flag `{flag}`")))
            }
            path => paths.push(path.to_string()),
        }
    }
    if algorithms.is_empty() {
        algorithms.extend(Algorithm::ALL);
    }
    if paths.is_empty() {
        paths.push("-".to_string());
    }

    for path in &paths {
        let bytes = read_input(path)?;
        for algorithm in &algorithms {
            println!("{:<16} {:>39}  {}", algorithm, algorithm.hash(seed, &bytes), path);
        }
    }

    Ok(())
}

fn read_input(path: &str) -> Result<Vec<u8>, CliError> {
    let io_error = |source| CliError::Io {
        path: path.to_string(),
        source,
    };
    if path == "-" {
        let mut bytes = Vec::new();
        std::io::stdin()
            .lock()
            .read_to_end(&mut bytes)
            .map_err(io_error)?;
        Ok(bytes)
    } else {
        std::fs::read(path).map_err(io_error)
    }
}

#[derive(Debug, PartialEq)]
struct BiasOptions {
    bic: bool,
    png: bool,
    input_len: usize,
    rounds: usize,
    name_filters: Vec<String>,
}

fn parse_bias_args(args: &[String]) -> Result<BiasOptions, CliError> {
    let mut options = BiasOptions {
        bic: false,
        png: false,
        input_len: 16,
        rounds: 1 << 14,
        name_filters: Vec::new(),
    };

    let mut args = args.iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--bic" => options.bic = true,
            "--png" => options.png = true,
            "--len" => {
                options.input_len =
                    parse_number("--len", flag_value("--len", &mut args)?)? as usize
            }
            "--rounds" => {
                options.rounds =
                    parse_number("--rounds", flag_value("--rounds", &mut args)?)? as usize
            }
            flag if flag.starts_with('-') => {
                return Err(CliError::Usage(format!("unknown flag `{flag}`")))
            }
            filter => options.name_filters.push(filter.to_lowercase()),
        }
    }
    if options.input_len == 0 {
        return Err(CliError::Usage("--len must be at least 1".to_string()));
    }
    if options.rounds == 0 {
        return Err(CliError::Usage("--rounds must be at least 1".to_string()));
    }

    Ok(options)
}

/// Overwrites the current terminal line with a round counter.
fn progress_line(out: &mut impl Write, round: usize, rounds: usize) -> std::io::Result<()> {
    write!(
        out,
        "\r                                                  \rRound {round}/{rounds}"
    )?;
    out.flush()
}

fn bias(args: &[String]) -> Result<(), CliError> {
    let options = parse_bias_args(args)?;
    let input_len = options.input_len;
    let stdout_error = |source| CliError::Io {
        path: "<stdout>".to_string(),
        source,
    };

    for algorithm in Algorithm::ALL {
        let name = algorithm.name();
        if !options.name_filters.is_empty()
            && !options.name_filters.iter().any(|filter| name.contains(filter))
        {
            continue;
        }

        println!("\n================================");
        println!("{name}, {input_len}-byte input");
        for pattern in InputPattern::ALL {
            println!("\nInput bit pattern: {}", pattern.name());

            // The first failed progress write is reported once the round
            // loop is done.
            let mut progress_error = None;
            let stats = compute_stats_with_progress(
                pattern,
                algorithm_mix(algorithm, 0),
                input_len,
                algorithm.digest_size_bytes(),
                pattern.rounds(input_len, options.rounds),
                true,
                options.bic,
                |round, rounds| {
                    if progress_error.is_none() {
                        progress_error = progress_line(&mut std::io::stdout(), round, rounds).err();
                    }
                },
            );
            if let Some(source) = progress_error {
                return Err(stdout_error(source));
            }
            print!("\r                                                  \r");
            print!("{stats}");

            if options.png {
                let path = format!("{name} - {}.png", pattern.name());
                stats
                    .write_avalanche_png(&path)
                    .map_err(|source| CliError::Io { path, source })?;
            }
        }
    }

    Ok(())
}
