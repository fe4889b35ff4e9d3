use anyhow::Context;
use clap::*;
use genefeat::libs::gff::{read_gff_records, simplify_to_cds, write_gff_records};
use std::io::Write;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("simplify")
        .about("Trim genes and mRNAs to their CDS spans")
        .after_help(
            r###"
Keeps genes, their mRNAs and CDS; everything else (exons, UTR-only parts,
non-coding transcripts, regions) is dropped.

Notes:
* Each mRNA is trimmed to the span of its CDS, each gene to the span of all its CDS.
* Genes and mRNAs without CDS keep their coordinates.
* Genes are ordered by sequence and start; mRNAs and CDS by start.
* Attribute values are kept; their order within a line may change.

Examples:
1. Simplify a RefSeq annotation:
   genefeat simplify genomic.gff --accession GCF_000005845.2 -o simple.gff

"###,
        )
        .arg(
            Arg::new("infile")
                .required(true)
                .num_args(1)
                .index(1)
                .help("Input GFF3 file. [stdin] for standard input"),
        )
        .arg(
            Arg::new("accession")
                .long("accession")
                .short('a')
                .num_args(1)
                .help("Assembly accession recorded in the header"),
        )
        .arg(
            Arg::new("outfile")
                .long("outfile")
                .short('o')
                .num_args(1)
                .default_value("stdout")
                .help("Output filename. [stdout] for screen"),
        )
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let infile = args.get_one::<String>("infile").unwrap();
    let mut writer = intspan::writer(args.get_one::<String>("outfile").unwrap());

    let records =
        read_gff_records(intspan::reader(infile)).with_context(|| format!("reading {}", infile))?;
    let simple = simplify_to_cds(&records);
    log::info!("{} GFF records in, {} out", records.len(), simple.len());

    writer.write_all(b"##gff-version 3\n")?;
    if let Some(acc) = args.get_one::<String>("accession") {
        writer.write_fmt(format_args!(
            "#!genome-build-accession NCBI_Assembly:{}\n",
            acc
        ))?;
    }
    writer.write_all(b"##Note: UTRs removed; features span CDS only\n")?;
    write_gff_records(writer, &simple)?;

    Ok(())
}
