// Writes the shopclock man page to the directory given as the first argument (default: man)

use clap::CommandFactory;
use shopclock::cli::Cli;
use std::path::PathBuf;

fn main() -> std::io::Result<()> {
    let out_dir = std::env::args().nth(1).map(PathBuf::from).unwrap_or_else(|| PathBuf::from("man"));
    std::fs::create_dir_all(&out_dir)?;

    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd.clone());
    let mut buffer: Vec<u8> = Vec::new();
    man.render(&mut buffer)?;

    let path = out_dir.join("shopclock.1");
    std::fs::write(&path, buffer)?;

    for sub in cmd.get_subcommands() {
        let name = format!("shopclock-{}", sub.get_name());
        let mut buffer: Vec<u8> = Vec::new();
        clap_mangen::Man::new(sub.clone()).render(&mut buffer)?;
        std::fs::write(out_dir.join(format!("{}.1", name)), buffer)?;
    }

    println!("Wrote man pages to {}", out_dir.display());
    Ok(())
}
