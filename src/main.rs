use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::error;

use corpus_bleu::{
    calculate_accuracy, calculate_bleu, check_references, evaluate_submission, read_gold_labels,
    read_label_predictions, read_predictions, read_references, BleuConfig, ScoreError,
};

#[derive(Parser, Debug)]
#[command(name = "corpus-bleu", version, about = "Scores shared-task submissions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Corpus BLEU of generated sentences against references.
    Bleu {
        /// Reference file: id and up to three references per line.
        #[arg(long, short)]
        references: PathBuf,
        /// Prediction file: id and generated sentence per line.
        #[arg(long, short)]
        predictions: PathBuf,
        /// Maximum n-gram order.
        #[arg(long, visible_alias = "max_order", default_value_t = 4, value_parser = parse_max_order)]
        max_order: usize,
        /// Apply Lin et al. 2004 add-one smoothing.
        #[arg(long)]
        smooth: bool,
        /// Also print per-order precisions, brevity penalty and lengths.
        #[arg(long)]
        details: bool,
    },
    /// Label accuracy of predictions against gold labels.
    Accuracy {
        #[arg(long = "gold-labels", short)]
        gold_labels: PathBuf,
        #[arg(long = "pred-labels", short)]
        pred_labels: PathBuf,
    },
    /// Scores every subtask file in INPUT_DIR/res against INPUT_DIR/ref.
    Evaluate {
        input_dir: PathBuf,
        output_dir: PathBuf,
    },
    /// Sanity check of a reference file.
    CheckReferences {
        #[arg(long, short)]
        references: PathBuf,
    },
}

fn parse_max_order(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("max order must be at least 1".to_string()),
        Ok(order) => Ok(order),
        Err(e) => Err(e.to_string()),
    }
}

fn run(command: Commands) -> Result<(), ScoreError> {
    match command {
        Commands::Bleu {
            references,
            predictions,
            max_order,
            smooth,
            details,
        } => {
            let references = read_references(&references)?;
            let predictions = read_predictions(&predictions)?;
            let bleu = calculate_bleu(&references, &predictions, BleuConfig { max_order, smooth })?;

            println!("BLEU score: {:.4}.", bleu.score * 100.0);
            if details {
                println!("{bleu}");
            }
        }
        Commands::Accuracy {
            gold_labels,
            pred_labels,
        } => {
            let gold = read_gold_labels(&gold_labels)?;
            let predictions = read_label_predictions(&pred_labels)?;
            let accuracy = calculate_accuracy(&gold, &predictions)?;

            println!("Accuracy: {:.4}%", accuracy * 100.0);
        }
        Commands::Evaluate {
            input_dir,
            output_dir,
        } => {
            if let Some(report) = evaluate_submission(&input_dir, &output_dir)? {
                print!("{report}");
            }
        }
        Commands::CheckReferences { references } => {
            let summary = check_references(&references)?;
            println!(
                "{} instances, {} with all references",
                summary.instances,
                summary.complete()
            );
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}
