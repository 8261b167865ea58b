use super::{write_erd, GenerateArgs};
use crate::adapter::{load_schema, Compression, DumpAdapter};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

pub fn run(file: PathBuf, progress: bool, args: GenerateArgs) -> anyhow::Result<()> {
    if !file.exists() {
        anyhow::bail!("input file does not exist: {}", file.display());
    }

    let config = args.generator_config()?;

    let compression = Compression::from_path(&file);
    if compression != Compression::None {
        eprintln!("Detected compression: {}", compression);
    }

    let mut adapter = if progress {
        let file_size = std::fs::metadata(&file)?.len();
        let pb = ProgressBar::new(file_size);
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({percent}%) {msg}",
            )?
            .progress_chars("█▓▒░  ")
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        pb.enable_steady_tick(std::time::Duration::from_millis(100));

        let pb_clone = pb.clone();
        let adapter = DumpAdapter::open_with_progress(
            &file,
            Some(move |bytes: u64| pb_clone.set_position(bytes)),
        )?;
        pb.finish_with_message("done");
        adapter
    } else {
        DumpAdapter::open(&file)?
    };

    let schema = load_schema(&mut adapter)?;

    write_erd(&schema, config)?;
    Ok(())
}
