use clap::*;
use genefeat::libs::derive::{derive_all, DeriveOptions, IntronSource};
use genefeat::libs::feature::TSV_HEADER;
use std::io::Write;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("features")
        .about("Add intergenic regions and introns to a GFF3 gene model")
        .after_help(
            r###"
Reads region, gene, mRNA, exon and CDS records from a GFF3 file and derives:

* intergenic - gaps between genes, flanked by the region ends
* intron     - gaps between consecutive exons of each mRNA

Notes:
* Coordinates are 1-based and inclusive.
* Overlapping or abutting genes are merged before gaps are taken.
* Every sequence needs exactly one `region` record starting at 1.
* Hierarchy errors (missing parents, mixed exon strands, ...) abort the run.
* Existing intron/intergenic records are discarded and derived again.
* Reads from stdin if input file is 'stdin'; .gz input is supported.

Output columns:
    record  feature  start  end  strand  id  parent

Examples:
1. Derive both feature kinds:
   genefeat features genomic.gff -o features.tsv

2. Introns only, delimited by CDS segments:
   genefeat features genomic.gff --no-intergenic --cds-introns

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
            Arg::new("outfile")
                .long("outfile")
                .short('o')
                .num_args(1)
                .default_value("stdout")
                .help("Output filename. [stdout] for screen"),
        )
        .arg(
            Arg::new("no_intergenic")
                .long("no-intergenic")
                .action(ArgAction::SetTrue)
                .help("Do not derive intergenic regions"),
        )
        .arg(
            Arg::new("no_introns")
                .long("no-introns")
                .action(ArgAction::SetTrue)
                .help("Do not derive introns"),
        )
        .arg(
            Arg::new("cds_introns")
                .long("cds-introns")
                .action(ArgAction::SetTrue)
                .help("Delimit introns by CDS segments instead of exons"),
        )
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let infile = args.get_one::<String>("infile").unwrap();
    let mut writer = intspan::writer(args.get_one::<String>("outfile").unwrap());

    let opt = DeriveOptions {
        intergenic: !args.get_flag("no_intergenic"),
        introns: !args.get_flag("no_introns"),
        intron_source: if args.get_flag("cds_introns") {
            IntronSource::Cds
        } else {
            IntronSource::Exon
        },
    };

    //----------------------------
    // Operating
    //----------------------------
    let records = genefeat::libs::gff::read_gff(infile)?;
    let out = derive_all(records, &opt)?;

    log::info!(
        "Derived {} intergenic regions and {} introns",
        out.iter()
            .filter(|r| r.feature_type == genefeat::FeatureType::Intergenic)
            .count(),
        out.iter()
            .filter(|r| r.feature_type == genefeat::FeatureType::Intron)
            .count(),
    );

    //----------------------------
    // Output
    //----------------------------
    writer.write_fmt(format_args!("{}\n", TSV_HEADER))?;
    for rec in &out {
        writer.write_fmt(format_args!("{}\n", rec))?;
    }

    Ok(())
}
