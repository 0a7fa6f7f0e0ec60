// Command-line front end for jimdecomp.
//
// Subcommands decode a container to a raw file, list scan candidates, trace
// the instruction stream, and print build configuration. Exit status is 0
// for a completed decode, or a truncated one that still produced output.

use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, ValueHint};

use crate::codec::{Family, Instruction, LONG_FORM_COUNT_CAP, OutOfRange};
use crate::container::{ContainerLayout, MAP_JIM_PAYLOAD_OFFSET};
use crate::engine::DecodeEngine;
use crate::io::{self, DecodeStats};
use crate::scan::score::{
    DISTINCT_RANGE, ENTROPY_CAP, LENGTH_SATURATION, SMOOTH_DELTA, SMOOTH_PREFIX,
};
use crate::scan::{ByteStats, CURATED_OFFSETS, DEFAULT_MAX_OFFSET, OffsetScanner, ScanConfig};

const ANALYZE_TOP: usize = 16;

// ---------------------------------------------------------------------------
// Offset parsing (decimal or 0x-prefixed hex)
// ---------------------------------------------------------------------------

fn parse_offset(s: &str) -> Result<usize, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty offset".into());
    }
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid offset '{s}': {e}"))
}

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Decoder for compressed map.jim graphics payloads.
#[derive(Parser, Debug)]
#[command(
    name = "jimdecomp",
    version,
    about = "map.jim payload decoder",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Force overwrite existing output files.
    #[arg(short = 'f', long, global = true)]
    force: bool,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output stats as JSON to stderr.
    #[arg(long = "json", global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Decode a container's payload to a raw file.
    Decode(DecodeArgs),
    /// List every candidate payload offset with its score.
    Scan(ScanArgs),
    /// Print the instruction stream of a payload.
    Trace(TraceArgs),
    /// Print build/configuration details.
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LayoutArg {
    /// Search for the payload offset.
    Scan,
    /// Payload at the fixed map.jim offset.
    MapJim,
    /// Payload at offset 0.
    Raw,
}

#[derive(Args, Debug)]
struct ScanTuningArgs {
    /// Highest candidate offset to try (decimal or 0x hex).
    #[arg(long = "max-offset", value_parser = parse_offset, default_value_t = DEFAULT_MAX_OFFSET)]
    max_offset: usize,

    /// Try only the curated offset list.
    #[arg(long)]
    curated: bool,
}

#[derive(Args, Debug)]
struct LocateArgs {
    /// Explicit payload offset (decimal or 0x hex).
    #[arg(long, short = 'o', value_parser = parse_offset, conflicts_with = "layout")]
    offset: Option<usize>,

    /// Container layout.
    #[arg(long, value_enum, default_value_t = LayoutArg::Scan)]
    layout: LayoutArg,

    #[command(flatten)]
    tuning: ScanTuningArgs,
}

#[derive(Args, Debug)]
struct DecodeArgs {
    /// Container file.
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Raw output file.
    #[arg(value_hint = ValueHint::FilePath)]
    output: PathBuf,

    #[command(flatten)]
    locate: LocateArgs,

    /// Report byte frequencies and length of the output.
    #[arg(long, short = 'a')]
    analyze: bool,
}

#[derive(Args, Debug)]
struct ScanArgs {
    /// Container file.
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,

    #[command(flatten)]
    tuning: ScanTuningArgs,
}

#[derive(Args, Debug)]
struct TraceArgs {
    /// Container file.
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,

    #[command(flatten)]
    locate: LocateArgs,

    /// Stop listing after this many instructions.
    #[arg(long)]
    limit: Option<usize>,
}

// ---------------------------------------------------------------------------
// Resolved command + options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Decode,
    Scan,
    Trace,
    Config,
}

struct Options {
    command: Command,
    force: bool,
    quiet: bool,
    verbose: u8,
    json_output: bool,
    input_file: Option<PathBuf>,
    output_file: Option<PathBuf>,
    layout: ContainerLayout,
    analyze: bool,
    limit: Option<usize>,
}

fn scan_config(tuning: &ScanTuningArgs) -> ScanConfig {
    if tuning.curated {
        ScanConfig::curated()
    } else {
        ScanConfig::up_to(tuning.max_offset)
    }
}

fn resolve_layout(locate: &LocateArgs) -> ContainerLayout {
    if let Some(offset) = locate.offset {
        return ContainerLayout::Fixed { offset };
    }
    match locate.layout {
        LayoutArg::Scan => ContainerLayout::Scan(scan_config(&locate.tuning)),
        LayoutArg::MapJim => ContainerLayout::map_jim(),
        LayoutArg::Raw => ContainerLayout::raw(),
    }
}

fn resolve_options(cli: Cli) -> Options {
    let mut opts = Options {
        command: Command::Config,
        force: cli.force,
        quiet: cli.quiet,
        verbose: cli.verbose.min(3),
        json_output: cli.json_output,
        input_file: None,
        output_file: None,
        layout: ContainerLayout::default(),
        analyze: false,
        limit: None,
    };

    match cli.command {
        Cmd::Decode(args) => {
            opts.command = Command::Decode;
            opts.layout = resolve_layout(&args.locate);
            opts.input_file = Some(args.input);
            opts.output_file = Some(args.output);
            opts.analyze = args.analyze;
        }
        Cmd::Scan(args) => {
            opts.command = Command::Scan;
            opts.layout = ContainerLayout::Scan(scan_config(&args.tuning));
            opts.input_file = Some(args.input);
        }
        Cmd::Trace(args) => {
            opts.command = Command::Trace;
            opts.layout = resolve_layout(&args.locate);
            opts.input_file = Some(args.input);
            opts.limit = args.limit;
        }
        Cmd::Config => {}
    }

    opts
}

#[cfg(any(test, feature = "fuzzing"))]
pub fn fuzz_try_parse_args(args: &[String]) {
    let argv: Vec<String> = std::iter::once("jimdecomp".to_string())
        .chain(args.iter().cloned())
        .collect();
    if let Ok(cli) = Cli::try_parse_from(argv) {
        let _ = resolve_options(cli);
    }
}

fn read_input(opts: &Options) -> Option<Vec<u8>> {
    let Some(path) = &opts.input_file else {
        eprintln!("jimdecomp: an input file is required");
        return None;
    };
    match io::read_container(path) {
        Ok(data) => Some(data),
        Err(e) => {
            eprintln!("jimdecomp: input file: {e}");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Config command
// ---------------------------------------------------------------------------

fn cmd_config() -> i32 {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!("jimdecomp version {version}");

    let file_io = cfg!(feature = "file-io") as u8;
    let parallel = cfg!(feature = "parallel") as u8;

    eprintln!("FILE_IO={file_io}");
    eprintln!("PARALLEL_SCAN={parallel}");
    eprintln!("MAP_JIM_PAYLOAD_OFFSET={MAP_JIM_PAYLOAD_OFFSET:#x}");
    eprintln!("DEFAULT_MAX_OFFSET={DEFAULT_MAX_OFFSET}");
    eprintln!("CURATED_OFFSETS={CURATED_OFFSETS:?}");
    eprintln!("LONG_FORM_COUNT_CAP={LONG_FORM_COUNT_CAP}");
    eprintln!("LENGTH_SATURATION={LENGTH_SATURATION}");
    eprintln!("ENTROPY_CAP={ENTROPY_CAP}");
    eprintln!(
        "DISTINCT_RANGE={}..={}",
        DISTINCT_RANGE.start(),
        DISTINCT_RANGE.end()
    );
    eprintln!("SMOOTH_PREFIX={SMOOTH_PREFIX}");
    eprintln!("SMOOTH_DELTA={SMOOTH_DELTA}");

    0
}

// ---------------------------------------------------------------------------
// Decode command
// ---------------------------------------------------------------------------

fn print_analysis(output: &[u8]) {
    let stats = ByteStats::from_bytes(output);
    println!("Output length:          {}", stats.len);
    println!("Distinct byte values:   {}", stats.distinct);
    println!("Entropy (bits/byte):    {:.3}", stats.entropy);
    println!("Smooth prefix fraction: {:.3}", stats.smooth_fraction);
    println!("Most frequent bytes:");
    for (value, count) in stats.top(ANALYZE_TOP) {
        let pct = count as f64 * 100.0 / stats.len.max(1) as f64;
        println!("  {value:02X}  {count:8}  {pct:6.2}%");
    }
}

fn cmd_decode(opts: &Options) -> i32 {
    let Some(input_path) = &opts.input_file else {
        eprintln!("jimdecomp: an input file is required");
        return 1;
    };
    let Some(output_path) = &opts.output_file else {
        eprintln!("jimdecomp: decode requires an output file");
        return 1;
    };
    if output_path.exists() && !opts.force {
        eprintln!(
            "jimdecomp: output file exists, use -f to overwrite: {}",
            output_path.display()
        );
        return 1;
    }

    let stats = match io::decode_file(input_path, output_path, &opts.layout) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("jimdecomp: {e}");
            return 1;
        }
    };

    if !opts.quiet {
        if let Some(err) = &stats.error {
            eprintln!("jimdecomp: warning: payload truncated: {err}");
        }
        if opts.verbose > 0 {
            report_decode(&stats);
        }
    }

    if opts.analyze {
        match io::read_container(output_path) {
            Ok(output) => print_analysis(&output),
            Err(e) => {
                eprintln!("jimdecomp: output file: {e}");
                return 1;
            }
        }
    }

    if opts.json_output {
        let json = serde_json::json!({
            "command": "decode",
            "input_size": stats.input_size,
            "offset": stats.payload_offset,
            "score": stats.score,
            "status": stats.status.as_str(),
            "bytes_consumed": stats.bytes_consumed,
            "output_size": stats.output_size,
            "instructions": stats.instructions,
            "provisional": format!("{:?}", stats.provisional),
            "output_sha256": stats.output_sha256.map(|d| hex_string(&d)),
        });
        eprintln!("{json:#}");
    }

    0
}

fn report_decode(stats: &DecodeStats) {
    let offset = stats.payload_offset;
    match stats.score {
        Some(score) => eprintln!("jimdecomp: payload offset: {offset:#x} (score {score:.3})"),
        None => eprintln!("jimdecomp: payload offset: {offset:#x}"),
    }
    eprintln!(
        "jimdecomp: decoder: {}, consumed {}, output size {}, instructions {}",
        stats.status.as_str(),
        stats.bytes_consumed,
        stats.output_size,
        stats.instructions
    );
    if !stats.provisional.is_empty() {
        eprintln!(
            "jimdecomp: output relies on provisional opcodes: {:?}",
            stats.provisional
        );
    }
}

fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

// ---------------------------------------------------------------------------
// Scan command
// ---------------------------------------------------------------------------

fn cmd_scan(opts: &Options) -> i32 {
    let Some(data) = read_input(opts) else {
        return 1;
    };
    let ContainerLayout::Scan(config) = &opts.layout else {
        eprintln!("jimdecomp: scan requires a scan layout");
        return 1;
    };

    let scanner = OffsetScanner::new(config.clone());
    let candidates = scanner.scan(&data);
    let best = crate::scan::select_best(candidates.clone()).map(|c| c.offset);

    let Some(best) = best else {
        eprintln!(
            "jimdecomp: no valid decoding found ({} candidate offset(s) tried)",
            config.candidates.offsets(data.len()).len()
        );
        return 1;
    };

    if !opts.quiet {
        println!("  Offset      Size  Status      Score");
        for c in &candidates {
            let mark = if c.offset == best { '*' } else { ' ' };
            println!(
                "{mark} {:#06x} {:9}  {:<9} {:8.3}",
                c.offset,
                c.output().len(),
                c.result.status.as_str(),
                c.score
            );
        }
    }

    if opts.json_output {
        let rows: Vec<_> = candidates
            .iter()
            .map(|c| {
                serde_json::json!({
                    "offset": c.offset,
                    "output_size": c.output().len(),
                    "status": c.result.status.as_str(),
                    "score": c.score,
                })
            })
            .collect();
        let json = serde_json::json!({
            "command": "scan",
            "profile": config.name,
            "best": best,
            "candidates": rows,
        });
        eprintln!("{json:#}");
    }

    0
}

// ---------------------------------------------------------------------------
// Trace command
// ---------------------------------------------------------------------------

fn describe(inst: &Instruction<'_>) -> String {
    match *inst {
        Instruction::Literal(bytes) => format!("literal {}", bytes.len()),
        Instruction::Fill { value, count } => format!("fill {count} x {value:02X}"),
        Instruction::Copy {
            distance,
            count,
            policy,
        } => {
            let policy = match policy {
                OutOfRange::Skip => "skip",
                OutOfRange::ZeroFill => "zero",
            };
            format!("copy {count} from -{distance} ({policy})")
        }
        Instruction::CyclicCopy { period, count } => format!("cycle {count} over -{period}"),
        Instruction::Nop => "nop".to_string(),
        Instruction::End => "end".to_string(),
    }
}

fn cmd_trace(opts: &Options) -> i32 {
    let Some(data) = read_input(opts) else {
        return 1;
    };

    let offset = match &opts.layout {
        ContainerLayout::Fixed { offset } => {
            if let Err(e) = opts.layout.payload(&data) {
                eprintln!("jimdecomp: {e}");
                return 1;
            }
            *offset
        }
        ContainerLayout::Scan(config) => match OffsetScanner::new(config.clone()).best(&data) {
            Some(best) => best.offset,
            None => {
                eprintln!("jimdecomp: no valid decoding found");
                return 1;
            }
        },
    };

    println!("  Offset  Cmd  Family  Instruction                     Emitted");
    let mut engine = DecodeEngine::new(&data, offset);
    let mut listed = 0usize;
    while opts.limit.is_none_or(|limit| listed < limit) {
        let Some(step) = engine.step() else {
            break;
        };
        println!(
            "  {:06X}  {:02X}   {:<6}  {:<30}  {:7}",
            step.offset,
            step.command,
            Family::of(step.command).name(),
            describe(&step.instruction),
            step.emitted
        );
        listed += 1;
    }

    if let Some(err) = engine.error() {
        println!("  stopped: {err}");
    }
    let result = engine.finish();
    if !opts.quiet {
        eprintln!(
            "jimdecomp: trace: {} instruction(s) listed, {}, output size {}",
            listed,
            result.status.as_str(),
            result.output.len()
        );
    }

    if result.is_empty() && !result.is_completed() {
        1
    } else {
        0
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn log_filter(opts: &Options) -> &'static str {
    if opts.quiet {
        return "error";
    }
    match opts.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Main CLI entry point. Parses arguments via clap, dispatches commands.
pub fn run() -> ! {
    let cli = Cli::parse();
    let opts = resolve_options(cli);

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_filter(&opts)))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let exit_code = match opts.command {
        Command::Decode => cmd_decode(&opts),
        Command::Scan => cmd_scan(&opts),
        Command::Trace => cmd_trace(&opts),
        Command::Config => cmd_config(),
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
