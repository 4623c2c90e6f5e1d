//! groupstream CLI - stream records from a file or stdin, group and
//! aggregate them, print one row per group.

use clap::Parser;
use log::{error, info};
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::PathBuf;
use std::process;

use groupstream::{group_by, parse_spec, CsvConfig, GroupByError, GroupByResult, RowConf, AGGR_FUNCS};

#[derive(Parser)]
#[command(name = "groupstream")]
#[command(version)]
#[command(about = "Single-pass group-by aggregation over delimited text")]
#[command(long_about = "Reads delimited records, groups them by every column that is not \
bound to an aggregation function, and prints one row per group with the \
aggregated columns folded down. Columns are bound with -a 'RANGES:FUNC' \
assignments; unassigned columns form the grouping key.")]
struct Cli {
    /// Field assignment 'RANGES[:FUNC]', e.g. '2-4,6:sum' or '!1:last';
    /// without FUNC the columns go back to the grouping key. Repeatable,
    /// applied in order.
    #[arg(short = 'a', long = "aggregate", value_name = "SPEC")]
    aggregate: Vec<String>,

    /// Field delimiter
    #[arg(short = 'd', long, default_value = ",")]
    delimiter: char,

    /// Maximum size of a single record in bytes
    #[arg(long, default_value = "65536", value_name = "BYTES")]
    max_record_size: usize,

    /// Maximum number of columns per record
    #[arg(long, default_value = "1000", value_name = "N")]
    max_columns: usize,

    /// Input file (stdin when omitted)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output file (stdout when omitted)
    #[arg(short = 'o', long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// List the available aggregation functions and exit
    #[arg(long)]
    list_functions: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if cli.list_functions {
        for func in AGGR_FUNCS {
            let kind = if func.need_num { "numeric" } else { "text" };
            println!("{:10} {}", func.name, kind);
        }
        return;
    }

    if let Err(e) = run(&cli) {
        error!("{}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> GroupByResult<()> {
    if !cli.delimiter.is_ascii() {
        return Err(GroupByError::config_error(
            "delimiter must be a single ASCII character",
        ));
    }
    let csv = CsvConfig {
        delimiter: cli.delimiter as u8,
        max_record_size: cli.max_record_size,
    };

    let mut conf = RowConf::new(cli.max_columns);
    for spec in &cli.aggregate {
        conf.apply(&parse_spec(spec, cli.max_columns)?)?;
    }
    conf.finalize();

    let input: Box<dyn Read> = match &cli.input {
        Some(path) => Box::new(File::open(path).map_err(|e| {
            GroupByError::io_error(format!("cannot open {}: {}", path.display(), e))
        })?),
        None => Box::new(std::io::stdin().lock()),
    };
    let output: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(BufWriter::new(File::create(path).map_err(|e| {
            GroupByError::io_error(format!("cannot create {}: {}", path.display(), e))
        })?)),
        None => Box::new(BufWriter::new(std::io::stdout().lock())),
    };

    let stats = group_by(input, output, &conf, &csv)?;
    info!("{} records folded into {} groups", stats.records, stats.groups);
    Ok(())
}
