use std::ffi::OsString;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use lz77win::format::TokenReader;
use lz77win::{CodecConfig, CodecStats, Decoder, Encoder, MatchStrategy};
use memmap2::Mmap;
use tempfile::NamedTempFile;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "lz77win")]
#[command(about = "Compress and decompress files with a single-window LZ77 codec")]
#[command(version)]
struct Args {
    /// Input file (use - for stdin)
    #[arg(short, long)]
    input: PathBuf,

    /// Output file (use - for stdout); derived from the input name when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Decompress the input instead of compressing it
    #[arg(short, long, conflicts_with = "roundtrip")]
    decompress: bool,

    /// Window size in bytes (1-4095, larger values are clamped)
    #[arg(short, long, default_value = "4095")]
    window: usize,

    /// Longest run a single reference may cover (2-15)
    #[arg(long, default_value = "15")]
    max_match: usize,

    /// Reproduce the legacy encoder's streams (14-byte runs, farthest of equal matches)
    #[arg(long, conflicts_with = "max_match")]
    legacy: bool,

    /// Match search strategy
    #[arg(long, value_enum, default_value_t = Matcher::HashChain)]
    matcher: Matcher,

    /// Compress, then decompress the result and compare checksums
    #[arg(long)]
    roundtrip: bool,

    /// Print the tokens of a compressed input instead of decoding it
    #[arg(long, conflicts_with_all = ["roundtrip", "decompress"])]
    list: bool,

    /// Show statistics (repeat for debug and trace logging)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Matcher {
    /// Scan every position in the window
    Brute,
    /// Follow chains of positions with the same two leading bytes
    HashChain,
}

impl From<Matcher> for MatchStrategy {
    fn from(matcher: Matcher) -> Self {
        match matcher {
            Matcher::Brute => MatchStrategy::BruteForce,
            Matcher::HashChain => MatchStrategy::HashChain,
        }
    }
}

/// Exit codes
const EXIT_OK: u8 = 0;
const EXIT_MISMATCH: u8 = 1;
const EXIT_ERROR: u8 = 2;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// `-v` keeps logging at info, `-vv` enables debug, `-vvv` trace; `RUST_LOG` wins
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).try_init();
}

fn run(args: &Args) -> CliResult<u8> {
    let config = if args.legacy {
        CodecConfig::legacy(args.window)?
    } else {
        CodecConfig::new(args.window)?.with_max_match_length(args.max_match)?
    };
    let config = config.with_strategy(args.matcher.into());

    if args.list {
        return run_list_mode(args);
    }
    if args.roundtrip {
        return run_roundtrip_mode(args, &config);
    }

    let mode = if args.decompress { Mode::Decompress } else { Mode::Compress };
    let output_path = match &args.output {
        Some(path) => path.clone(),
        None => derive_output_path(&args.input, mode)?,
    };
    tracing::info!(
        input = %args.input.display(),
        output = %output_path.display(),
        ?mode,
        "starting"
    );

    let start = Instant::now();
    let stats = match mode {
        Mode::Compress => compress_file(&args.input, &output_path, &config)?,
        Mode::Decompress => decompress_file(&args.input, &output_path, &config)?,
    };
    let elapsed = start.elapsed();

    if args.verbose > 0 {
        let label = match mode {
            Mode::Compress => "Compression complete:",
            Mode::Decompress => "Decompression complete:",
        };
        print_stats(label, &stats, elapsed);
    }

    Ok(EXIT_OK)
}

/// Compress, decompress the result, and compare CRC32 of the input and the
/// restored bytes
fn run_roundtrip_mode(args: &Args, config: &CodecConfig) -> CliResult<u8> {
    if is_stdio(&args.input) {
        return Err("--roundtrip needs a file input".into());
    }

    let compressed_path = match &args.output {
        Some(path) => path.clone(),
        None => derive_output_path(&args.input, Mode::Compress)?,
    };
    let restored_path = derive_output_path(&compressed_path, Mode::Decompress)?;

    let input = InputBytes::open(&args.input)?;
    let input_crc = crc32fast::hash(&input);

    let start = Instant::now();
    let compress_stats =
        write_output(&compressed_path, |out| Encoder::new(config.clone()).encode(&input, out))?;
    let compress_time = start.elapsed();

    let start = Instant::now();
    let decompress_stats = decompress_file(&compressed_path, &restored_path, config)?;
    let decompress_time = start.elapsed();

    let restored_crc = crc32_of_file(&restored_path)?;

    eprintln!("Compressed:   {} ({:.2?})", compressed_path.display(), compress_time);
    eprintln!("Decompressed: {} ({:.2?})", restored_path.display(), decompress_time);
    if args.verbose > 0 {
        print_stats("Compression:", &compress_stats, compress_time);
        print_stats("Decompression:", &decompress_stats, decompress_time);
    }
    eprintln!("Input CRC32:    {:08x}", input_crc);
    eprintln!("Restored CRC32: {:08x}", restored_crc);

    if input_crc == restored_crc && decompress_stats.output_bytes == input.len() as u64 {
        eprintln!("Round trip: ok");
        Ok(EXIT_OK)
    } else {
        eprintln!("Round trip: MISMATCH");
        Ok(EXIT_MISMATCH)
    }
}

/// Print one line per token with the output offset it starts at
fn run_list_mode(args: &Args) -> CliResult<u8> {
    let tokens = TokenReader::new(open_reader(&args.input)?);
    let mut out = BufWriter::new(io::stdout().lock());

    let mut offset = 0u64;
    let mut count = 0u64;
    let mut bits = 0u64;
    for token in tokens {
        let token = token?;
        writeln!(out, "{:>10}  {}", offset, token)?;
        offset += token.uncompressed_size() as u64;
        count += 1;
        bits += token.encoded_bits() as u64;
    }
    out.flush()?;

    if args.verbose > 0 {
        eprintln!("Tokens:           {}", count);
        eprintln!("Encoded bits:     {} ({} bytes)", bits, (bits + 7) / 8);
        eprintln!("Decoded bytes:    {}", offset);
    }

    Ok(EXIT_OK)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Compress,
    Decompress,
}

fn compress_file(input: &Path, output: &Path, config: &CodecConfig) -> CliResult<CodecStats> {
    let data = InputBytes::open(input)?;
    write_output(output, |out| Encoder::new(config.clone()).encode(&data, out))
}

fn decompress_file(input: &Path, output: &Path, config: &CodecConfig) -> CliResult<CodecStats> {
    let reader = open_reader(input)?;
    write_output(output, |out| Decoder::new(config.clone()).decode(reader, out))
}

fn is_stdio(path: &Path) -> bool {
    path.to_str() == Some("-")
}

/// The whole input as a byte slice: memory-mapped for files, read fully for stdin
enum InputBytes {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

impl InputBytes {
    fn open(path: &Path) -> io::Result<Self> {
        if is_stdio(path) {
            let mut data = Vec::new();
            io::stdin().lock().read_to_end(&mut data)?;
            return Ok(Self::Owned(data));
        }

        let file = File::open(path)?;
        if file.metadata()?.len() == 0 {
            // Zero-length mappings are rejected on some platforms
            return Ok(Self::Owned(Vec::new()));
        }
        // SAFETY: Read-only mapping; the file must not be modified while mapped.
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(Self::Mapped(mmap))
    }
}

impl Deref for InputBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            Self::Mapped(mmap) => &mmap[..],
            Self::Owned(data) => data.as_slice(),
        }
    }
}

fn open_reader(path: &Path) -> io::Result<Box<dyn Read>> {
    if is_stdio(path) {
        Ok(Box::new(io::stdin().lock()))
    } else {
        Ok(Box::new(BufReader::new(File::open(path)?)))
    }
}

/// Run `write` against the output and keep the result only if it succeeds
///
/// File outputs are written to a temporary file next to the target and
/// renamed into place at the end, so a failed run leaves nothing behind.
fn write_output<T, F>(path: &Path, write: F) -> CliResult<T>
where
    F: FnOnce(&mut dyn Write) -> lz77win::Result<T>,
{
    if is_stdio(path) {
        let mut stdout = io::stdout().lock();
        let value = write(&mut stdout)?;
        stdout.flush()?;
        return Ok(value);
    }

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(dir)?;
    let value = write(temp.as_file_mut())?;
    temp.persist(path)?;
    Ok(value)
}

/// `name.ext` -> `name-compressed.ext` when compressing;
/// `name-compressed.ext` -> `name-decompressed.ext` when decompressing
fn derive_output_path(input: &Path, mode: Mode) -> CliResult<PathBuf> {
    if is_stdio(input) {
        return Err("an output path is required when reading from stdin".into());
    }

    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| format!("cannot derive an output name from {}", input.display()))?;

    let new_stem = match mode {
        Mode::Compress => format!("{}-compressed", stem),
        Mode::Decompress => match stem.rfind("-compressed") {
            Some(pos) => format!(
                "{}-decompressed{}",
                &stem[..pos],
                &stem[pos + "-compressed".len()..]
            ),
            None => format!("{}-decompressed", stem),
        },
    };

    let mut name = OsString::from(new_stem);
    if let Some(ext) = input.extension() {
        name.push(".");
        name.push(ext);
    }
    Ok(input.with_file_name(name))
}

/// Streams bytes into a CRC32 without keeping them
struct Crc32Writer(crc32fast::Hasher);

impl Write for Crc32Writer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn crc32_of_file(path: &Path) -> io::Result<u32> {
    let mut hasher = Crc32Writer(crc32fast::Hasher::new());
    io::copy(&mut BufReader::new(File::open(path)?), &mut hasher)?;
    Ok(hasher.0.finalize())
}

fn print_stats(label: &str, stats: &CodecStats, elapsed: Duration) {
    eprintln!("{}", label);
    eprintln!("  Input bytes:      {}", stats.input_bytes);
    eprintln!("  Output bytes:     {}", stats.output_bytes);
    eprintln!("  Literals:         {}", stats.literals);
    eprintln!("  References:       {}", stats.references);
    eprintln!("  Matched bytes:    {}", stats.matched_bytes);
    if stats.input_bytes > 0 {
        eprintln!(
            "  Ratio:            {:.3}",
            stats.output_bytes as f64 / stats.input_bytes as f64
        );
    }
    eprintln!("  Time:             {:.2?}", elapsed);
    eprintln!(
        "  Throughput:       {:.1} MB/s",
        stats.input_bytes as f64 / elapsed.as_secs_f64() / 1_000_000.0
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_compressed_name() {
        let path = derive_output_path(Path::new("dir/notes.txt"), Mode::Compress).unwrap();
        assert_eq!(path, PathBuf::from("dir/notes-compressed.txt"));

        let path = derive_output_path(Path::new("README"), Mode::Compress).unwrap();
        assert_eq!(path, PathBuf::from("README-compressed"));
    }

    #[test]
    fn test_derive_decompressed_name() {
        let path =
            derive_output_path(Path::new("dir/notes-compressed.txt"), Mode::Decompress).unwrap();
        assert_eq!(path, PathBuf::from("dir/notes-decompressed.txt"));

        let path = derive_output_path(Path::new("blob.lz"), Mode::Decompress).unwrap();
        assert_eq!(path, PathBuf::from("blob-decompressed.lz"));
    }

    #[test]
    fn test_derive_requires_file() {
        assert!(derive_output_path(Path::new("-"), Mode::Compress).is_err());
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from(["lz77win", "-i", "a.bin", "-d", "-w", "100"]).unwrap();
        assert!(args.decompress);
        assert_eq!(args.window, 100);
        assert_eq!(args.matcher, Matcher::HashChain);

        let args =
            Args::try_parse_from(["lz77win", "-i", "a.bin", "--matcher", "brute"]).unwrap();
        assert_eq!(MatchStrategy::from(args.matcher), MatchStrategy::BruteForce);

        assert!(Args::try_parse_from(["lz77win", "-i", "a", "-d", "--roundtrip"]).is_err());

        let args = Args::try_parse_from(["lz77win", "-i", "a", "--legacy"]).unwrap();
        assert!(args.legacy);
        assert!(
            Args::try_parse_from(["lz77win", "-i", "a", "--legacy", "--max-match", "9"]).is_err()
        );
    }
}
