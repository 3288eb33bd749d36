//! Generates the man page and shell completions from the CLI definition.

use clap::CommandFactory;
use clap_complete::Shell;
use clap::ValueEnum;
use std::path::PathBuf;

#[allow(dead_code)]
mod cli {
    include!("src/cli.rs");
}

fn main() -> std::io::Result<()> {
    println!("cargo:rerun-if-changed=src/cli.rs");

    let out_dir = match std::env::var_os("OUT_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => return Ok(()),
    };

    let mut cmd = cli::Cli::command();

    let mut page = Vec::new();
    clap_mangen::Man::new(cmd.clone()).render(&mut page)?;
    std::fs::write(out_dir.join("printquote.1"), page)?;

    for shell in Shell::value_variants() {
        clap_complete::generate_to(*shell, &mut cmd, "printquote", &out_dir)?;
    }

    Ok(())
}
