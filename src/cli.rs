use crate::classify::Mode;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "binsift")]
#[command(about = "Extract identifying strings and symbols from packaged ELF binaries and classify their uniqueness")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract features from a directory of extracted binaries
    Extract {
        /// Directory of binaries laid out as <source_pkg>/<binary_pkg>-<name>
        elfs_dir: PathBuf,

        /// Directory the extraction JSON is written to
        #[arg(short, long, default_value = "extracted-strings")]
        out_dir: PathBuf,

        /// Minimum length for brute-force printable runs
        #[arg(long, default_value_t = 4)]
        scan_min_length: usize,
    },

    /// Classify extracted features by uniqueness and write aggregate reports
    Classify {
        /// from-elfs.json produced by the extract command
        from_elfs: PathBuf,

        /// Directory the reports are written to
        #[arg(short, long, default_value = "extracted-strings")]
        out_dir: PathBuf,

        /// Which occurrence-set view classification uses
        #[arg(long, value_enum, default_value_t = Mode::Local)]
        mode: Mode,

        /// Replace architecture tags in binary identities with a wildcard,
        /// unifying builds of the same package across architectures
        #[arg(long)]
        arch_wildcard: bool,
    },

    /// Report strings only the brute-force scan sees
    Missing {
        /// from-elfs.json produced by the extract command
        from_elfs: PathBuf,

        /// from-blobs.json produced by the extract command
        from_blobs: PathBuf,

        /// Directory the report is written to
        #[arg(short, long, default_value = "extracted-strings")]
        out_dir: PathBuf,
    },

    /// Report feature values occurring under more than one feature type
    Matching {
        /// from-elfs.json produced by the extract command
        from_elfs: PathBuf,

        /// Directory the reports are written to
        #[arg(short, long, default_value = "extracted-strings")]
        out_dir: PathBuf,
    },
}
