// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and hands each command to its
// use case in Layer 2. Everything the user sees on stdout is
// printed from here.
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{ClassifierArgs, Commands, EvaluateArgs, SampleArgs, TrainArgs};

use crate::domain::sample::Sample;

#[derive(Parser, Debug)]
#[command(
    name = "mnist-pointer",
    version = "0.1.0",
    about = "Learn to point at the image whose class follows the query's class."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Route the subcommand; no computation happens here.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)           => run_train(args),
            Commands::TrainClassifier(args) => run_train_classifier(args),
            Commands::Evaluate(args)        => run_evaluate(args),
            Commands::Sample(args)          => run_sample(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Training pointer network on IDX files in: {}", args.corpus_dir);
    TrainUseCase::new(args.into()).execute()?;

    println!("Training complete. Checkpoint saved.");
    Ok(())
}

fn run_train_classifier(args: ClassifierArgs) -> Result<()> {
    use crate::application::classify_use_case::ClassifyUseCase;

    tracing::info!("Training classifier on IDX files in: {}", args.corpus_dir);
    ClassifyUseCase::new(args.into()).execute()?;

    println!("Training complete. Checkpoint saved.");
    Ok(())
}

fn run_evaluate(args: EvaluateArgs) -> Result<()> {
    use crate::application::evaluate_use_case::EvaluateUseCase;

    let summary = EvaluateUseCase::new(args.into()).execute()?;

    println!(
        "\nTest accuracy: {:.2}% over {} samples (N = {}, loss {:.4})",
        summary.accuracy * 100.0,
        summary.samples,
        summary.num_candidates,
        summary.loss
    );

    for (i, ex) in summary.examples.iter().enumerate() {
        println!(
            "\nExample {}: query class {} → looking for class {}",
            i + 1,
            ex.sample.query_label,
            ex.sample.target_class()
        );
        for (pos, (label, p)) in ex
            .sample
            .candidate_labels
            .iter()
            .zip(&ex.selection.probabilities)
            .enumerate()
        {
            let mut marks = String::new();
            if pos == ex.sample.correct_index {
                marks.push_str(" [target]");
            }
            if pos == ex.selection.index {
                marks.push_str(" [chosen]");
            }
            println!("  {:>2}: class {}  p={:.4}{}", pos, label, p, marks);
        }
        println!("  {}", if ex.is_correct() { "correct" } else { "wrong" });
    }
    Ok(())
}

fn run_sample(args: SampleArgs) -> Result<()> {
    use crate::application::sample_use_case::SampleUseCase;

    let sample = SampleUseCase::new(args.into()).execute()?;
    print_sample(&sample);
    Ok(())
}

fn print_sample(sample: &Sample) {
    println!(
        "Query class {} → successor class {}",
        sample.query_label,
        sample.target_class()
    );
    println!("Correct index: {}", sample.correct_index);
    let labels: Vec<String> = sample.candidate_labels.iter().map(|l| l.to_string()).collect();
    println!("Candidate classes: [{}]", labels.join(", "));
}
