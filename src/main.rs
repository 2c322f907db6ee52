use std::io::{self, Write};
use std::{env, fs};

use anyhow::Result;
use binsnp::{
    ClassificationStats, DefaultClassifier, SnpTable, SnpTableReader, compress, parse_features,
    write_annot,
};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn setup_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn write_file(ipath: &str, opath: &str, compressed: bool) -> Result<SnpTable> {
    let rhandle = fs::File::open(ipath).map(io::BufReader::new)?;
    let mut stats = ClassificationStats::new();
    let table = parse_features(rhandle, DefaultClassifier::default(), Some(&mut stats))?;
    stats.log_summary();

    let mut handle = io::BufWriter::new(fs::File::create(opath)?);
    if compressed {
        compress::write_compressed_annot(&mut handle, &table, compress::DEFAULT_COMPRESSION_LEVEL)?;
    } else {
        write_annot(&mut handle, &table)?;
    }
    handle.flush()?;
    Ok(table)
}

fn read_mmap(ipath: &str, compressed: bool) -> Result<SnpTable> {
    let reader = SnpTableReader::new();
    let table = if compressed {
        reader.read_compressed_annot_path(ipath)?
    } else {
        reader.read_annot_path(ipath)?
    };
    tracing::info!(
        seq_id = %table.seq_id(),
        simple = table.len(),
        complex = table.complex_features().len(),
        alleles = table.alleles().len(),
        comments = table.comments().len(),
        "read SNP table"
    );
    Ok(table)
}

fn main() -> Result<()> {
    setup_logging();

    let mut args = env::args().skip(1);
    let ipath = args.next().unwrap_or_else(|| "./data/features.json".to_string());
    let opath = args.next().unwrap_or_else(|| "./data/features.snp".to_string());
    let compressed = opath.ends_with(".zst");

    tracing::info!(%ipath, %opath, compressed, "writing annotation");
    let written = write_file(&ipath, &opath, compressed)?;

    tracing::info!(%opath, "reading annotation using memory mapping");
    let read = read_mmap(&opath, compressed)?;
    anyhow::ensure!(read == written, "table read from {opath} differs from the one written");

    Ok(())
}
