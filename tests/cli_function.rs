use assert_cmd::Command;
use predicates::prelude::*;

fn function_cmd() -> anyhow::Result<Command> {
    let mut cmd = Command::cargo_bin("genefeat")?;
    cmd.arg("function")
        .arg("--hmmscan")
        .arg("tests/go/hmmscan.tbl")
        .arg("--gff")
        .arg("tests/gff/small.gff")
        .arg("--go-obo")
        .arg("tests/go/mini.obo")
        .arg("--pfam2go")
        .arg("tests/go/pfam2go.txt")
        .arg("--go-bins")
        .arg("tests/go/go_bins.tsv");
    Ok(cmd)
}

#[test]
fn command_function() -> anyhow::Result<()> {
    let output = function_cmd()?.output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert!(output.status.success());
    assert_eq!(
        stdout.lines().collect::<Vec<_>>(),
        vec![
            "gene_id\tpfam_ids\tgo_ids\tbin_id",
            // translation (1) beats transport (2)
            "gene-A\tPF00001,PF00002\tGO:0006412,GO:0055085\t1",
            // alt_id, resolved through a function anchor
            "gene-B\tPF00003\tGO:0015563\t2",
            // obsolete term reaches no anchor
            "gene-C\tPF00004\tGO:0000001\t100",
        ]
    );

    Ok(())
}

#[test]
fn command_function_parallel() -> anyhow::Result<()> {
    let single = function_cmd()?.output()?;
    let multi = function_cmd()?.arg("--parallel").arg("4").output()?;

    assert_eq!(single.stdout, multi.stdout);

    Ok(())
}

#[test]
fn command_function_unknown_transcript() -> anyhow::Result<()> {
    let mut cmd = function_cmd()?;
    cmd.arg("-v");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("rna-Z9").not())
        .stderr(predicate::str::contains("unknown transcript rna-Z9"));

    Ok(())
}

#[test]
fn command_function_missing_arg() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("genefeat")?;
    cmd.arg("function").arg("--hmmscan").arg("tests/go/hmmscan.tbl");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("--gff"));

    Ok(())
}
