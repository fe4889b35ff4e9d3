extern crate clap;
use clap::*;

mod cmd_genefeat;

fn main() -> anyhow::Result<()> {
    let app = Command::new("genefeat")
        .version(crate_version!())
        .author(crate_authors!())
        .about("`genefeat` - Derived gene-model features and function bins")
        .propagate_version(true)
        .arg_required_else_help(true)
        .color(ColorChoice::Auto)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::Count)
                .help("Increase log verbosity (-v info, -vv debug)"),
        )
        .subcommand(cmd_genefeat::features::make_subcommand())
        .subcommand(cmd_genefeat::function::make_subcommand())
        .subcommand(cmd_genefeat::simplify::make_subcommand())
        .after_help(
            r###"Subcommand groups:

* Gene models:
    * features - Add intergenic regions and introns to a GFF3 gene model
    * simplify - Trim genes and mRNAs to their CDS spans

* Gene functions:
    * function - Bin genes by GO anchors reached from their Pfam domains

Log level follows -v, and RUST_LOG when set.

"###,
        );

    let matches = app.get_matches();
    init_logger(matches.get_count("verbose"));

    // Check which subcommand the user ran...
    match matches.subcommand() {
        Some(("features", sub_matches)) => cmd_genefeat::features::execute(sub_matches),
        Some(("function", sub_matches)) => cmd_genefeat::function::execute(sub_matches),
        Some(("simplify", sub_matches)) => cmd_genefeat::simplify::execute(sub_matches),
        _ => unreachable!(),
    }?;

    Ok(())
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    // RUST_LOG, when present, overrides the flag
    let _ = pretty_env_logger::formatted_builder()
        .filter_level(level)
        .parse_default_env()
        .try_init();
}
