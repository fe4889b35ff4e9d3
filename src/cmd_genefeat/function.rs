use anyhow::Context;
use clap::*;
use genefeat::libs::binning::{bin_genes, AnchorTable, TSV_HEADER};
use genefeat::libs::ontology::OntologyGraph;
use std::io::Write;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("function")
        .about("Bin genes by GO anchors reached from their Pfam domains")
        .after_help(
            r###"
Assigns every gene with at least one hmmscan hit to a function bin.

Steps:
* hmmscan hits (--tblout) are mapped from transcripts to genes through the GFF3 mRNA records
* Pfam domains are mapped to GO terms with pfam2go
* every GO term is expanded to its is_a ancestors from the OBO file
* Biological Process anchors of go-bins are consulted first; Molecular Function
  anchors only when no process anchor matched
* the lowest matching bin wins; no match gives bin 100

go-bins format (tab-separated, one header line):
    bin_id  label  BP_anchors(comma-separated)  MF_anchors(comma-separated)

Output columns:
    gene_id  pfam_ids  go_ids  bin_id

Examples:
1. Bin genes:
   genefeat function --hmmscan hits.tbl --gff genomic.gff --go-obo go-basic.obo \
       --pfam2go pfam2go --go-bins go_bins.tsv -o functions.tsv

"###,
        )
        .arg(
            Arg::new("hmmscan")
                .long("hmmscan")
                .required(true)
                .num_args(1)
                .help("hmmscan --tblout output against Pfam"),
        )
        .arg(
            Arg::new("gff")
                .long("gff")
                .required(true)
                .num_args(1)
                .help("GFF3 file linking transcripts to genes"),
        )
        .arg(
            Arg::new("go_obo")
                .long("go-obo")
                .required(true)
                .num_args(1)
                .help("GO ontology in OBO format"),
        )
        .arg(
            Arg::new("pfam2go")
                .long("pfam2go")
                .required(true)
                .num_args(1)
                .help("Pfam to GO mapping"),
        )
        .arg(
            Arg::new("go_bins")
                .long("go-bins")
                .required(true)
                .num_args(1)
                .help("GO anchors of each bin"),
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
            Arg::new("parallel")
                .long("parallel")
                .short('p')
                .num_args(1)
                .default_value("1")
                .value_parser(value_parser!(usize))
                .help("Number of threads for parallel processing"),
        )
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let hmmscan_file = args.get_one::<String>("hmmscan").unwrap();
    let gff_file = args.get_one::<String>("gff").unwrap();
    let obo_file = args.get_one::<String>("go_obo").unwrap();
    let pfam2go_file = args.get_one::<String>("pfam2go").unwrap();
    let bins_file = args.get_one::<String>("go_bins").unwrap();
    let mut writer = intspan::writer(args.get_one::<String>("outfile").unwrap());

    // Set the number of threads for rayon
    let opt_parallel = *args.get_one::<usize>("parallel").unwrap();
    rayon::ThreadPoolBuilder::new()
        .num_threads(opt_parallel)
        .build_global()?;

    //----------------------------
    // Loading
    //----------------------------
    let graph = OntologyGraph::from_obo(obo_file)?;
    let domain_to_categories =
        genefeat::libs::domain::read_pfam2go(intspan::reader(pfam2go_file))
            .with_context(|| format!("reading {}", pfam2go_file))?;
    let anchors =
        AnchorTable::from_file(bins_file).with_context(|| format!("reading {}", bins_file))?;

    let records = genefeat::libs::gff::read_gff(gff_file)?;
    let transcript_to_gene = genefeat::libs::gff::transcript_to_gene(&records);
    let gene_to_domains =
        genefeat::libs::domain::read_hmmscan(intspan::reader(hmmscan_file), &transcript_to_gene)
            .with_context(|| format!("reading {}", hmmscan_file))?;

    //----------------------------
    // Operating
    //----------------------------
    let results = bin_genes(&gene_to_domains, &domain_to_categories, &anchors, &graph);

    //----------------------------
    // Output
    //----------------------------
    writer.write_fmt(format_args!("{}\n", TSV_HEADER))?;
    for rec in &results {
        writer.write_fmt(format_args!("{}\n", rec))?;
    }

    Ok(())
}
