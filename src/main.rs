use clap::Parser;
use std::io::Write;
use std::path::PathBuf;

use desprite::app;
use desprite::config::Config;

/// desprite splits sprite images by CSS usage
#[derive(Parser, Debug)]
#[command(name = "desprite", version, about, long_about = None)]
#[command(after_help = "Example:\n  desprite sprite.png first.css second.css --verbose")]
struct Cli {
    /// Sprite image
    image: PathBuf,

    /// CSS files (directories are searched for *.css)
    #[arg(required = true)]
    css: Vec<PathBuf>,

    /// Output folder path [default: split/]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Consider identifiers when filtering duplicates
    #[arg(short, long)]
    named: bool,

    /// Scale ratio between the source image size and the CSS sprite size (ex. 2 for retina) [default: 1]
    #[arg(short, long, allow_negative_numbers = true)]
    ratio: Option<i32>,

    /// Print verbose progress messages
    #[arg(short, long)]
    verbose: bool,

    /// Maximum number of parts processed at once [default: open file limit]
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Worker threads [default: one per core]
    #[arg(short, long)]
    threads: Option<usize>,

    /// Exit with an error if any part could not be written
    #[arg(long)]
    strict: bool,

    /// Config file [default: <config dir>/desprite/config.toml]
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn apply_to(&self, mut config: Config) -> Config {
        if let Some(output) = &self.output {
            config.output_dir = output.clone();
        }
        if let Some(ratio) = self.ratio {
            config.ratio = ratio;
        }
        if let Some(jobs) = self.jobs {
            config.jobs = Some(jobs);
        }
        if let Some(threads) = self.threads {
            config.thread_count = threads;
        }
        config.named |= self.named;
        config.verbose |= self.verbose;
        config.strict |= self.strict;
        config
    }
}

fn init_logger(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_env("DESPRITE_LOG")
        .target(env_logger::Target::Stdout)
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();
}

fn main() {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => cli.apply_to(config),
        Err(e) => {
            println!("error reading config: {}", e);
            std::process::exit(1);
        }
    };
    init_logger(config.verbose);

    if let Err(e) = app::run(&cli.image, &cli.css, &config) {
        println!("{:#}", e);
        std::process::exit(1);
    }
}
