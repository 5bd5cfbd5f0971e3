use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use fmrecord::DecodedResultSet;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "fmrecord",
    version,
    about = "Decode fmresultset XML into JSON records"
)]
struct Args {
    /// Input file (defaults to stdin)
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,
    /// Print server and field metadata instead of records
    #[arg(short, long, conflicts_with = "summary")]
    metadata: bool,
    /// Print a one-line summary instead of records
    #[arg(short, long)]
    summary: bool,
    /// Pretty-print JSON output
    #[arg(short, long)]
    pretty: bool,
    /// Output file (defaults to stdout)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .without_time()
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let input_data = read_input(&args.input)?;
    debug!(bytes = input_data.len(), "read input");

    let decoded = fmrecord::decode(&input_data).context("failed to decode fmresultset")?;

    let mut output = if args.summary {
        summary(&decoded)
    } else if args.metadata {
        to_json(&metadata(&decoded), args.pretty)?
    } else {
        to_json(&decoded.records, args.pretty)?
    };
    output.push('\n');

    write_output(&args.output, output.as_bytes())?;
    Ok(())
}

fn metadata(decoded: &DecodedResultSet) -> serde_json::Value {
    serde_json::json!({
        "error_code": decoded.error_code,
        "product": decoded.product,
        "database": decoded.database,
        "field_names": decoded.field_names,
        "field_metadata": decoded.field_metadata,
    })
}

fn summary(decoded: &DecodedResultSet) -> String {
    let attr = |key: &str| decoded.database.get(key).map_or("-", String::as_str);
    format!(
        "{} record(s), {} field(s), database {} layout {}, status {}",
        decoded.len(),
        decoded.field_names.len(),
        attr("database"),
        attr("layout"),
        decoded.error_code
    )
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    json.context("failed to serialize output")
}

fn read_input(path: &Option<PathBuf>) -> Result<Vec<u8>> {
    match path {
        Some(path) => std::fs::read(path)
            .with_context(|| format!("failed to read input file {}", path.display())),
        None => {
            let mut buffer = Vec::new();
            io::stdin()
                .read_to_end(&mut buffer)
                .context("failed to read stdin")?;
            if buffer.iter().all(u8::is_ascii_whitespace) {
                bail!("no input provided on stdin");
            }
            Ok(buffer)
        }
    }
}

fn write_output(path: &Option<PathBuf>, data: &[u8]) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, data)
            .with_context(|| format!("failed to write output file {}", path.display())),
        None => {
            let mut stdout = io::stdout();
            stdout.write_all(data).context("failed to write stdout")?;
            Ok(())
        }
    }
}
